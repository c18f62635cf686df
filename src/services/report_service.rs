// src/services/report_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ReportRepository,
    models::{
        auth::{Principal, Role},
        report::{file_url_for, Report, ReportFile, ReportUpload},
    },
    services::client_service::ClientService,
};

#[derive(Clone)]
pub struct ReportService {
    repo: ReportRepository,
    client_service: ClientService,
}

impl ReportService {
    pub fn new(repo: ReportRepository, client_service: ClientService) -> Self {
        Self { repo, client_service }
    }

    pub async fn list(&self) -> Result<Vec<Report>, AppError> {
        self.repo.list().await
    }

    pub async fn list_for_client(&self, client_id: &str) -> Result<Vec<Report>, AppError> {
        self.repo.list_by_client(client_id).await
    }

    pub async fn create(
        &self,
        client_id: &str,
        title: &str,
        upload: ReportUpload,
    ) -> Result<Report, AppError> {
        let client = self
            .client_service
            .find_by_id(client_id)
            .await?
            .ok_or(AppError::ClientNotFound)?;

        let id = Uuid::new_v4().to_string();
        let report = Report {
            file_url: file_url_for(&id),
            id,
            client_id: Some(client.id),
            client_name: client.name,
            title: title.to_string(),
            date: Utc::now(),
            file_name: upload.file_name,
            content_type: upload.content_type,
            size: upload.bytes.len() as u64,
        };

        let report = self.repo.insert(report, upload.bytes).await?;
        tracing::info!("📄 Relatório {} enviado para o cliente {:?}", report.id, report.client_id);
        Ok(report)
    }

    /// Admin baixa qualquer relatório; cliente só os próprios. Para o cliente,
    /// relatório alheio responde igual a inexistente.
    pub async fn download(&self, principal: &Principal, report_id: &str) -> Result<ReportFile, AppError> {
        let report = self
            .repo
            .find_by_id(report_id)
            .await?
            .ok_or(AppError::ReportNotFound)?;

        if principal.role == Role::Client {
            let client = self.client_service.resolve_principal(principal).await?;
            if report.client_id.as_deref() != Some(client.id.as_str()) {
                return Err(AppError::ReportNotFound);
            }
        }

        let bytes = self
            .repo
            .load_file(&report.id)
            .await?
            .ok_or(AppError::ReportNotFound)?;

        Ok(ReportFile {
            file_name: report.file_name,
            content_type: report.content_type,
            bytes,
        })
    }
}
