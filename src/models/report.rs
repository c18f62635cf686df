// src/models/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Relatório enviado pelo admin. Imutável depois de criado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[schema(example = "7c9e6679-7425-40de-944b-e07fc1f90ae7")]
    pub id: String,

    // `None` apenas para registros legados cujo cliente não foi encontrado na migração.
    pub client_id: Option<String>,

    // Cópia do nome no momento do upload; não acompanha renomeações.
    #[schema(example = "Ana Souza")]
    pub client_name: String,

    #[schema(example = "Relatório de Performance - Março")]
    pub title: String,

    pub date: DateTime<Utc>,

    #[schema(example = "/api/reports/7c9e6679-7425-40de-944b-e07fc1f90ae7/file")]
    pub file_url: String,

    #[schema(example = "marco-2025.pdf")]
    pub file_name: String,

    #[schema(example = "application/pdf")]
    pub content_type: String,

    pub size: u64,
}

/// Arquivo recebido no upload, antes de virar `Report`.
#[derive(Debug, Clone)]
pub struct ReportUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Conteúdo pronto para download.
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub fn file_url_for(report_id: &str) -> String {
    format!("/api/reports/{report_id}/file")
}
