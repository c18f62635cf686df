// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Erros de domínio. Nunca saem direto para o cliente: os handlers convertem
// em `ApiError` (já traduzido) via `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Cliente não encontrado")]
    ClientNotFound,

    #[error("Relatório não encontrado")]
    ReportNotFound,

    #[error("Upload inválido: {0}")]
    InvalidUpload(String),

    #[error("Falha de rede: {0}")]
    NetworkError(String),

    #[error("Provedor de autenticação não configurado")]
    AuthProviderUnavailable,

    #[error("Erro do provedor de autenticação: {0}")]
    AuthProviderError(String),

    #[error("Versão de esquema {found} não suportada na coleção '{key}'")]
    UnsupportedSchema { key: String, found: u32 },

    #[error("Chave de armazenamento inválida: {0}")]
    InvalidStorageKey(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de I/O: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Código estável usado como chave de tradução e devolvido ao frontend.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::Forbidden => "forbidden",
            AppError::ClientNotFound => "client_not_found",
            AppError::ReportNotFound => "report_not_found",
            AppError::InvalidUpload(_) => "invalid_upload",
            AppError::NetworkError(_) => "network_error",
            AppError::AuthProviderUnavailable => "auth_provider_unavailable",
            AppError::AuthProviderError(_) => "auth_provider_error",
            _ => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::ClientNotFound | AppError::ReportNotFound => StatusCode::NOT_FOUND,
            AppError::NetworkError(_) | AppError::AuthProviderError(_) => StatusCode::BAD_GATEWAY,
            AppError::AuthProviderUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na notificação localizada que o usuário vê.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        } else if status == StatusCode::BAD_GATEWAY || status == StatusCode::SERVICE_UNAVAILABLE {
            tracing::warn!("Falha em serviço externo: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            let key = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string());
                            i18n.translate(&locale.0, &format!("validation.{key}"))
                        })
                        .collect();
                    fields.insert(field.to_string(), messages);
                }
                Some(json!(fields))
            }
            _ => None,
        };

        ApiError {
            status,
            code: code.to_string(),
            error: i18n.translate(&locale.0, &format!("error.{code}")),
            details,
        }
    }
}

// O erro que efetivamente vira resposta HTTP.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}
