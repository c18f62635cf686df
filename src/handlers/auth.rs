// src/handlers/auth.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::{
        ForgotPasswordPayload, ForgotPasswordResponse, LoginPayload, LoginResponse, OAuthQuery,
        OAuthResponse, Principal,
    },
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sessão criada", body = LoginResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "E-mail ou senha inválidos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<LoginResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .auth_service
        .login(payload.identifier.trim(), &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 204, description = "Sessão encerrada"),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn logout(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .auth_service
        .logout(&principal)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Sessão atual", body = Principal),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(principal): AuthenticatedUser) -> Json<Principal> {
    Json(principal)
}

// POST /api/auth/forgot-password
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "Auth",
    request_body = ForgotPasswordPayload,
    responses(
        (status = 202, description = "Pedido de recuperação registrado", body = ForgotPasswordResponse),
        (status = 400, description = "E-mail inválido"),
        (status = 502, description = "Provedor externo recusou o pedido")
    )
)]
pub async fn forgot_password(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let channel = app_state
        .auth_service
        .forgot_password(payload.email.trim(), payload.redirect_to.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::ACCEPTED, Json(ForgotPasswordResponse { channel })))
}

// GET /api/auth/oauth/{provider}?redirectTo=...
#[utoipa::path(
    get,
    path = "/api/auth/oauth/{provider}",
    tag = "Auth",
    params(
        ("provider" = String, Path, description = "Provedor social, ex.: google"),
        ("redirectTo" = String, Query, description = "Para onde o provedor volta após o login")
    ),
    responses(
        (status = 200, description = "URL de autorização", body = OAuthResponse),
        (status = 503, description = "Provedor externo não configurado")
    )
)]
pub async fn oauth_url(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(provider): Path<String>,
    Query(query): Query<OAuthQuery>,
) -> Result<Json<OAuthResponse>, ApiError> {
    let url = app_state
        .auth_service
        .oauth_authorize_url(&provider, &query.redirect_to)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(OAuthResponse { url }))
}
