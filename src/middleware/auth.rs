// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::{Principal, Role},
};

// Quem passou pelo guard. Os handlers recebem via extractor.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Principal);

// Recebe só o token: a requisição (com o corpo) não atravessa o await.
async fn authorize(
    app_state: &AppState,
    token: Option<String>,
    required_role: Option<Role>,
) -> Result<Principal, AppError> {
    let token = token.ok_or(AppError::InvalidToken)?;
    let principal = app_state.auth_service.validate_token(&token).await?;

    match required_role {
        Some(role) if principal.role != role => Err(AppError::Forbidden),
        _ => Ok(principal),
    }
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .map(|bearer| bearer.token().to_string())
}

async fn guard(
    app_state: AppState,
    locale: Locale,
    mut request: Request,
    next: Next,
    required_role: Option<Role>,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request);
    let principal = authorize(&app_state, token, required_role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(AuthenticatedUser(principal));
    Ok(next.run(request).await)
}

/// Qualquer sessão válida (admin ou cliente).
pub async fn auth_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard(app_state, locale, request, next, None).await
}

pub async fn admin_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard(app_state, locale, request, next, Some(Role::Admin)).await
}

pub async fn client_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard(app_state, locale, request, next, Some(Role::Client)).await
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        // Rota sem guard: responde como sessão ausente.
        let app_state = AppState::from_ref(state);
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();
        Err(AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))
    }
}
