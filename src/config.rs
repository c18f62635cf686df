// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::{i18n::I18nStore, password::hash_password},
    db::{
        legacy::{migrate_legacy_collections, MigrationSummary},
        ClientRepository, FileStore, MemoryStore, MessageRepository, PgStore, ReportRepository,
        SessionRepository, SharedStore,
    },
    services::{
        auth::{AdminCredentials, AuthService},
        client_service::ClientService,
        contact_service::{ContactService, FormRelay},
        dashboard_service::DashboardService,
        external_auth::{AuthProvider, GoTrueProvider},
        inbox_service::InboxService,
        report_service::ReportService,
    },
};

const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    File(PathBuf),
    Postgres(String),
}

#[derive(Clone)]
pub struct ExternalAuthSettings {
    pub url: String,
    pub public_key: String,
}

// Tudo o que vem do ambiente (.env).
#[derive(Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub storage: StorageBackend,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub admin_username: String,
    pub admin_password: String,
    pub bcrypt_cost: u32,
    pub external_auth: Option<ExternalAuthSettings>,
    pub form_relay_url: Option<String>,
    pub whatsapp_number: String,
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let storage = match optional("STORAGE_BACKEND").as_deref().unwrap_or("file") {
            "memory" => StorageBackend::Memory,
            "file" => StorageBackend::File(
                optional("DATA_DIR").unwrap_or_else(|| "./data".to_string()).into(),
            ),
            "postgres" => StorageBackend::Postgres(
                optional("DATABASE_URL").context("DATABASE_URL deve ser definida para STORAGE_BACKEND=postgres")?,
            ),
            other => anyhow::bail!("STORAGE_BACKEND desconhecido: {other} (use memory, file ou postgres)"),
        };

        // O provedor externo só liga com os dois valores presentes.
        let external_auth = match (optional("AUTH_PROVIDER_URL"), optional("AUTH_PROVIDER_KEY")) {
            (Some(url), Some(public_key)) => Some(ExternalAuthSettings { url, public_key }),
            (None, None) => None,
            _ => {
                tracing::warn!("AUTH_PROVIDER_URL e AUTH_PROVIDER_KEY precisam estar juntas; provedor externo desativado");
                None
            }
        };

        Ok(Self {
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            storage,
            jwt_secret: optional("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            session_ttl_hours: optional("SESSION_TTL_HOURS")
                .map(|v| v.parse::<i64>())
                .transpose()
                .context("SESSION_TTL_HOURS inválido")?
                .unwrap_or(12),
            admin_username: optional("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            admin_password: optional("ADMIN_PASSWORD").context("ADMIN_PASSWORD deve ser definida")?,
            bcrypt_cost: optional("BCRYPT_COST")
                .map(|v| v.parse::<u32>())
                .transpose()
                .context("BCRYPT_COST inválido")?
                .unwrap_or(bcrypt::DEFAULT_COST),
            external_auth,
            form_relay_url: optional("FORM_RELAY_URL"),
            whatsapp_number: optional("WHATSAPP_NUMBER").unwrap_or_default(),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: Option<PgPool>,
    pub store: SharedStore,
    pub settings: Arc<Settings>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub client_service: ClientService,
    pub report_service: ReportService,
    pub inbox_service: InboxService,
    pub contact_service: ContactService,
    pub dashboard_service: DashboardService,
    client_repo: ClientRepository,
    report_repo: ReportRepository,
    message_repo: MessageRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let settings = Settings::from_env()?;

        let (store, db_pool): (SharedStore, Option<PgPool>) = match &settings.storage {
            StorageBackend::Memory => {
                tracing::warn!("⚠️ Armazenamento em memória: os dados somem ao reiniciar");
                (Arc::new(MemoryStore::new()), None)
            }
            StorageBackend::File(dir) => {
                let store = FileStore::open(dir.clone())
                    .await
                    .with_context(|| format!("Falha ao abrir o diretório de dados {}", dir.display()))?;
                tracing::info!("📁 Dados gravados em {}", store.root().display());
                (Arc::new(store), None)
            }
            StorageBackend::Postgres(database_url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
                (Arc::new(PgStore::new(pool.clone())), Some(pool))
            }
        };

        Self::from_parts(settings, store, db_pool).await
    }

    /// Monta o gráfico de dependências sobre um store já aberto.
    pub async fn from_parts(
        mut settings: Settings,
        store: SharedStore,
        db_pool: Option<PgPool>,
    ) -> anyhow::Result<Self> {
        let admin_password = std::mem::take(&mut settings.admin_password);
        let admin = AdminCredentials {
            username: settings.admin_username.clone(),
            password_hash: hash_password(&admin_password, settings.bcrypt_cost).await?,
        };

        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        let client_repo = ClientRepository::new(store.clone());
        let report_repo = ReportRepository::new(store.clone());
        let message_repo = MessageRepository::new(store.clone());
        let session_repo = SessionRepository::new(store.clone());

        let provider: Option<Arc<dyn AuthProvider>> = settings.external_auth.as_ref().map(|ext| {
            Arc::new(GoTrueProvider::new(http.clone(), &ext.url, &ext.public_key)) as Arc<dyn AuthProvider>
        });
        if provider.is_none() {
            tracing::info!("Provedor de autenticação externo não configurado: modo local");
        }

        let relay = settings
            .form_relay_url
            .as_deref()
            .map(|url| FormRelay::new(http.clone(), url));

        let inbox_service = InboxService::new(message_repo.clone());
        let client_service =
            ClientService::new(client_repo.clone(), session_repo.clone(), settings.bcrypt_cost);
        let report_service = ReportService::new(report_repo.clone(), client_service.clone());
        let auth_service = AuthService::new(
            client_repo.clone(),
            session_repo,
            inbox_service.clone(),
            provider,
            admin,
            settings.jwt_secret.clone(),
            chrono::Duration::hours(settings.session_ttl_hours),
        );
        let contact_service =
            ContactService::new(relay, inbox_service.clone(), settings.whatsapp_number.clone());
        let dashboard_service = DashboardService::new(
            client_service.clone(),
            report_service.clone(),
            inbox_service.clone(),
        );

        tracing::info!("💾 Armazenamento: {}", store.backend_name());

        Ok(Self {
            db_pool,
            store,
            settings: Arc::new(settings),
            i18n_store: Arc::new(I18nStore::new()),
            auth_service,
            client_service,
            report_service,
            inbox_service,
            contact_service,
            dashboard_service,
            client_repo,
            report_repo,
            message_repo,
        })
    }

    /// Converte coleções no formato antigo. Idempotente.
    pub async fn run_data_migrations(&self) -> anyhow::Result<MigrationSummary> {
        let summary = migrate_legacy_collections(
            &self.client_repo,
            &self.report_repo,
            &self.message_repo,
            self.settings.bcrypt_cost,
        )
        .await?;
        Ok(summary)
    }
}
