// src/handlers/clients.rs

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
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::client::{ClientProfile, CreateClientPayload, UpdateClientPayload},
};

// =============================================================================
//  ADMIN
// =============================================================================

// GET /api/admin/clients
#[utoipa::path(
    get,
    path = "/api/admin/clients",
    tag = "Clients",
    responses(
        (status = 200, description = "Clientes em ordem de cadastro", body = Vec<ClientProfile>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<ClientProfile>>, ApiError> {
    let clients = app_state
        .client_service
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(clients.iter().map(ClientProfile::from).collect()))
}

// POST /api/admin/clients
#[utoipa::path(
    post,
    path = "/api/admin/clients",
    tag = "Clients",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente cadastrado", body = ClientProfile),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let client = app_state
        .client_service
        .create(payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(ClientProfile::from(&client))))
}

// PUT /api/admin/clients/{id}
#[utoipa::path(
    put,
    path = "/api/admin/clients/{id}",
    tag = "Clients",
    request_body = UpdateClientPayload,
    params(("id" = String, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente atualizado", body = ClientProfile),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<Json<ClientProfile>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let client = app_state
        .client_service
        .update(&id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(ClientProfile::from(&client)))
}

// DELETE /api/admin/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/clients/{id}",
    tag = "Clients",
    params(("id" = String, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente removido (ou já inexistente)")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .client_service
        .delete(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  PORTAL DO CLIENTE
// =============================================================================

// GET /api/portal/me
#[utoipa::path(
    get,
    path = "/api/portal/me",
    tag = "Portal",
    responses(
        (status = 200, description = "Perfil do cliente logado", body = ClientProfile),
        (status = 404, description = "Sessão sem cadastro local correspondente")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<Json<ClientProfile>, ApiError> {
    let client = app_state
        .client_service
        .resolve_principal(&principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(ClientProfile::from(&client)))
}
