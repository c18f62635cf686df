// src/handlers/reports.rs

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::report::{Report, ReportUpload},
};

/// Limite do corpo no upload de relatórios.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

// Só documentação: o corpo real é multipart/form-data.
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportUploadForm {
    #[schema(example = "0f8fad5b-d9cb-469f-a165-70867728950e")]
    client_id: String,
    #[schema(example = "Relatório de Performance - Março")]
    title: String,
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

struct ParsedUpload {
    client_id: String,
    title: String,
    upload: ReportUpload,
}

fn required(errors: &mut ValidationErrors, field: &'static str) {
    let mut err = ValidationError::new("required");
    err.message = Some("required".into());
    errors.add(field, err);
}

async fn field_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map(|v| v.trim().to_string())
        .map_err(|e| AppError::InvalidUpload(e.to_string()))
}

async fn read_upload_form(multipart: &mut Multipart) -> Result<ParsedUpload, AppError> {
    let mut client_id = String::new();
    let mut title = String::new();
    let mut upload: Option<ReportUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("clientId") => client_id = field_text(field).await?,
            Some("title") => title = field_text(field).await?,
            Some("file") => {
                let file_name = field.file_name().unwrap_or("relatorio").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidUpload(e.to_string()))?;
                upload = Some(ReportUpload { file_name, content_type, bytes: bytes.to_vec() });
            }
            _ => tracing::debug!("Campo de upload ignorado: {:?}", name),
        }
    }

    let mut errors = ValidationErrors::new();
    if client_id.is_empty() {
        required(&mut errors, "clientId");
    }
    if title.is_empty() {
        required(&mut errors, "title");
    }
    let upload = upload.filter(|u| !u.bytes.is_empty());
    if upload.is_none() {
        required(&mut errors, "file");
    }

    match upload {
        Some(upload) if errors.is_empty() => Ok(ParsedUpload { client_id, title, upload }),
        _ => Err(AppError::ValidationError(errors)),
    }
}

// Aspas e quebras de linha quebrariam o cabeçalho.
fn attachment_header(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

// =============================================================================
//  ADMIN
// =============================================================================

// GET /api/admin/reports
#[utoipa::path(
    get,
    path = "/api/admin/reports",
    tag = "Reports",
    responses(
        (status = 200, description = "Todos os relatórios, em ordem de envio", body = Vec<Report>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_reports(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<Report>>, ApiError> {
    let reports = app_state
        .report_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(reports))
}

// POST /api/admin/reports
#[utoipa::path(
    post,
    path = "/api/admin/reports",
    tag = "Reports",
    request_body(content = ReportUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Relatório enviado", body = Report),
        (status = 400, description = "Campos ausentes ou upload inválido"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_report(
    State(app_state): State<AppState>,
    locale: Locale,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_upload_form(&mut multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let report = app_state
        .report_service
        .create(&form.client_id, &form.title, form.upload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(report)))
}

// =============================================================================
//  PORTAL DO CLIENTE
// =============================================================================

// GET /api/portal/reports
#[utoipa::path(
    get,
    path = "/api/portal/reports",
    tag = "Portal",
    responses(
        (status = 200, description = "Relatórios do cliente logado", body = Vec<Report>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_reports(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<Vec<Report>>, ApiError> {
    let client = app_state
        .client_service
        .resolve_principal(&principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let reports = app_state
        .report_service
        .list_for_client(&client.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(reports))
}

// GET /api/reports/{id}/file
#[utoipa::path(
    get,
    path = "/api/reports/{id}/file",
    tag = "Reports",
    params(("id" = String, Path, description = "ID do relatório")),
    responses(
        (status = 200, description = "Conteúdo do arquivo", content_type = "application/octet-stream"),
        (status = 404, description = "Relatório inexistente ou de outro cliente")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_report(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(principal): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let file = app_state
        .report_service
        .download(&principal, &id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let headers = [
        (header::CONTENT_TYPE, file.content_type),
        (header::CONTENT_DISPOSITION, attachment_header(&file.file_name)),
    ];
    Ok((headers, file.bytes))
}
