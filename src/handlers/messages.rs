// src/handlers/messages.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::message::{ContactPayload, ContactReceipt, Message, WhatsAppLink},
};

// =============================================================================
//  SITE PÚBLICO
// =============================================================================

// POST /api/contact
#[utoipa::path(
    post,
    path = "/api/contact",
    tag = "Contact",
    request_body = ContactPayload,
    responses(
        (status = 202, description = "Mensagem recebida", body = ContactReceipt),
        (status = 400, description = "Dados inválidos"),
        (status = 502, description = "Falha ao encaminhar o formulário")
    )
)]
pub async fn submit_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ContactPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    // O recibo é o mesmo com ou sem honeypot: o robô não sabe que foi descartado.
    app_state
        .contact_service
        .submit(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::ACCEPTED, Json(ContactReceipt { received: true })))
}

// GET /api/contact/whatsapp
#[utoipa::path(
    get,
    path = "/api/contact/whatsapp",
    tag = "Contact",
    responses(
        (status = 200, description = "Link wa.me com saudação no idioma do visitante", body = WhatsAppLink)
    )
)]
pub async fn whatsapp_link(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<WhatsAppLink>, ApiError> {
    let url = app_state
        .contact_service
        .whatsapp_link(&locale.0, &app_state.i18n_store)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(WhatsAppLink { url }))
}

// =============================================================================
//  CAIXA DE ENTRADA (ADMIN)
// =============================================================================

// GET /api/admin/messages
#[utoipa::path(
    get,
    path = "/api/admin/messages",
    tag = "Messages",
    responses(
        (status = 200, description = "Mensagens, mais recentes primeiro", body = Vec<Message>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_messages(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = app_state
        .inbox_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(messages))
}

// POST /api/admin/messages/{id}/read
#[utoipa::path(
    post,
    path = "/api/admin/messages/{id}/read",
    tag = "Messages",
    params(("id" = String, Path, description = "ID da mensagem")),
    responses(
        (status = 204, description = "Mensagem marcada como Respondido")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_message_read(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .inbox_service
        .mark_read(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/admin/messages/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/messages/{id}",
    tag = "Messages",
    params(("id" = String, Path, description = "ID da mensagem")),
    responses(
        (status = 204, description = "Mensagem removida")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_message(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .inbox_service
        .remove(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
