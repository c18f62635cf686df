// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::i18n::Locale,
    models::dashboard::AdminOverview,
};

// GET /api/admin/overview
#[utoipa::path(
    get,
    path = "/api/admin/overview",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Indicadores do painel do admin", body = AdminOverview),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Apenas admin")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_overview(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<AdminOverview>, ApiError> {
    let overview = app_state
        .dashboard_service
        .overview()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(overview))
}
