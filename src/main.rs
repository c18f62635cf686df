//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

use crate::{config::AppState, db::legacy::MigrationSummary};

#[tokio::main]
async fn main() {
    // RUST_LOG sobrescreve; sem ele, "info".
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // A tabela kv_store só existe no backend Postgres.
    if let Some(pool) = &app_state.db_pool {
        sqlx::migrate!()
            .run(pool)
            .await
            .expect("Falha ao rodar as migrações do banco de dados.");
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    let summary = app_state
        .run_data_migrations()
        .await
        .expect("Falha ao converter os dados no formato antigo.");
    if summary == MigrationSummary::default() {
        tracing::info!("Dados já no formato atual");
    } else {
        tracing::info!("🔄 Dados antigos convertidos: {:?}", summary);
    }

    let addr = app_state.settings.bind_addr.clone();
    let app = routes::app(app_state);

    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
