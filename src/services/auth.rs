// src/services/auth.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::{error::AppError, password::verify_password},
    db::{ClientRepository, SessionRepository},
    models::{
        auth::{Claims, LoginResponse, Principal, RecoveryChannel, Role, SessionMarker},
        client::{Client, ClientProfile},
    },
    services::{external_auth::AuthProvider, inbox_service::InboxService},
};

// Credencial fixa do administrador. A senha só existe aqui como hash bcrypt.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password_hash: String,
}

/// Resultado de `authenticate`, antes de virar sessão.
#[derive(Debug, Clone)]
pub struct Identity {
    pub role: Role,
    pub subject: String,
    pub email: Option<String>,
    pub client: Option<Client>,
}

#[derive(Clone)]
pub struct AuthService {
    clients: ClientRepository,
    sessions: SessionRepository,
    inbox: InboxService,
    provider: Option<Arc<dyn AuthProvider>>,
    admin: AdminCredentials,
    jwt_secret: String,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(
        clients: ClientRepository,
        sessions: SessionRepository,
        inbox: InboxService,
        provider: Option<Arc<dyn AuthProvider>>,
        admin: AdminCredentials,
        jwt_secret: String,
        session_ttl: Duration,
    ) -> Self {
        Self { clients, sessions, inbox, provider, admin, jwt_secret, session_ttl }
    }

    pub fn has_external_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Ordem: admin fixo, depois clientes cadastrados (ordem de inserção),
    /// depois o provedor externo se houver. Falha sempre com o mesmo erro genérico.
    pub async fn authenticate(&self, identifier: &str, secret: &str) -> Result<Identity, AppError> {
        if identifier == self.admin.username && verify_password(secret, &self.admin.password_hash).await? {
            return Ok(Identity {
                role: Role::Admin,
                subject: self.admin.username.clone(),
                email: None,
                client: None,
            });
        }

        for client in self.clients.list().await? {
            let matches_identifier =
                client.email.eq_ignore_ascii_case(identifier) || client.name == identifier;
            if matches_identifier && verify_password(secret, &client.password_hash).await? {
                return Ok(Identity {
                    role: Role::Client,
                    subject: client.id.clone(),
                    email: Some(client.email.clone()),
                    client: Some(client),
                });
            }
        }

        let Some(provider) = &self.provider else {
            return Err(AppError::InvalidCredentials);
        };

        let external = provider.sign_in_with_password(identifier, secret).await?;
        let client = self.clients.find_by_email(&external.email).await?;
        Ok(Identity {
            role: Role::Client,
            subject: client.as_ref().map(|c| c.id.clone()).unwrap_or(external.id),
            email: Some(external.email),
            client,
        })
    }

    /// Autentica, grava o marcador de sessão e emite o token.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<LoginResponse, AppError> {
        let identity = match self.authenticate(identifier, secret).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::info!("🔒 Login recusado: {}", e);
                return Err(e);
            }
        };

        let now = Utc::now();
        let marker = SessionMarker {
            id: Uuid::new_v4().to_string(),
            role: identity.role,
            subject: identity.subject.clone(),
            email: identity.email.clone(),
            client_id: identity.client.as_ref().map(|c| c.id.clone()),
            created_at: now,
            expires_at: now + self.session_ttl,
        };
        let token = self.create_token(&marker)?;
        self.sessions.insert(marker.clone()).await?;

        tracing::info!("🔐 Login de {:?} ({})", identity.role, identity.subject);

        Ok(LoginResponse {
            token,
            role: identity.role,
            redirect_to: identity.role.dashboard_route().to_string(),
            expires_at: marker.expires_at,
            client: identity.client.as_ref().map(ClientProfile::from),
        })
    }

    pub async fn validate_token(&self, token: &str) -> Result<Principal, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Token válido mas sessão encerrada (logout, cliente excluído) não passa.
        let marker = self
            .sessions
            .find_active(&token_data.claims.sid, Utc::now())
            .await?
            .ok_or(AppError::InvalidToken)?;

        Ok(marker.principal())
    }

    pub async fn logout(&self, principal: &Principal) -> Result<(), AppError> {
        self.sessions.remove(&principal.session_id).await?;
        tracing::info!("👋 Logout de {}", principal.subject);
        Ok(())
    }

    /// Com provedor: ele envia o e-mail de redefinição. Sem provedor: o pedido cai na caixa do admin.
    pub async fn forgot_password(
        &self,
        email: &str,
        redirect_to: Option<&str>,
    ) -> Result<RecoveryChannel, AppError> {
        match &self.provider {
            Some(provider) => {
                provider.send_password_reset(email, redirect_to).await?;
                Ok(RecoveryChannel::Provider)
            }
            None => {
                self.inbox.append_password_recovery(email).await?;
                Ok(RecoveryChannel::AdminInbox)
            }
        }
    }

    pub fn oauth_authorize_url(&self, provider_name: &str, redirect_to: &str) -> Result<String, AppError> {
        self.provider
            .as_ref()
            .ok_or(AppError::AuthProviderUnavailable)?
            .authorize_url(provider_name, redirect_to)
    }

    fn create_token(&self, marker: &SessionMarker) -> Result<String, AppError> {
        let claims = Claims {
            sub: marker.subject.clone(),
            sid: marker.id.clone(),
            role: marker.role,
            exp: marker.expires_at.timestamp() as usize,
            iat: marker.created_at.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        common::password::hash_password,
        db::{MemoryStore, MessageRepository, SharedStore},
        models::{
            auth::ExternalIdentity,
            client::CreateClientPayload,
            message::MessageKind,
        },
        services::client_service::ClientService,
    };

    #[derive(Default)]
    struct FakeProvider {
        resets: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AuthProvider for FakeProvider {
        async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ExternalIdentity, AppError> {
            match password {
                "ext-pass" => Ok(ExternalIdentity { id: "ext-42".into(), email: email.to_string() }),
                "boom" => Err(AppError::AuthProviderError("500: down".into())),
                _ => Err(AppError::InvalidCredentials),
            }
        }

        async fn send_password_reset(&self, email: &str, _redirect_to: Option<&str>) -> Result<(), AppError> {
            self.resets.lock().unwrap().push(email.to_string());
            Ok(())
        }

        fn authorize_url(&self, provider: &str, redirect_to: &str) -> Result<String, AppError> {
            Ok(format!("https://auth.test/authorize?provider={provider}&redirect_to={redirect_to}"))
        }
    }

    struct Fixture {
        auth: AuthService,
        clients: ClientService,
        inbox: InboxService,
    }

    async fn fixture(provider: Option<Arc<dyn AuthProvider>>) -> Fixture {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let client_repo = ClientRepository::new(store.clone());
        let sessions = SessionRepository::new(store.clone());
        let inbox = InboxService::new(MessageRepository::new(store));
        let admin = AdminCredentials {
            username: "admin".into(),
            password_hash: hash_password("mhrn#2025", 4).await.unwrap(),
        };
        let auth = AuthService::new(
            client_repo.clone(),
            sessions.clone(),
            inbox.clone(),
            provider,
            admin,
            "segredo-de-teste".into(),
            Duration::hours(1),
        );
        Fixture {
            auth,
            clients: ClientService::new(client_repo, sessions, 4),
            inbox,
        }
    }

    fn ana() -> CreateClientPayload {
        serde_json::from_value(serde_json::json!({
            "name": "Ana",
            "email": "ana@x.com",
            "password": "p1",
            "plan": "Start",
            "monthlyValue": 1500,
            "currency": "BRL"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn client_scenario() {
        let f = fixture(None).await;
        let created = f.clients.create(ana()).await.unwrap();
        assert_eq!(f.clients.list().await.unwrap().len(), 1);

        let identity = f.auth.authenticate("ana@x.com", "p1").await.unwrap();
        assert_eq!(identity.role, Role::Client);
        assert_eq!(identity.client.unwrap().id, created.id);

        let by_name = f.auth.authenticate("Ana", "p1").await.unwrap();
        assert_eq!(by_name.subject, created.id);

        let err = f.auth.authenticate("ana@x.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn admin_wins_regardless_of_registry() {
        let f = fixture(None).await;
        let mut payload = ana();
        payload.name = "admin".into();
        payload.password = "mhrn#2025".into();
        f.clients.create(payload).await.unwrap();

        let identity = f.auth.authenticate("admin", "mhrn#2025").await.unwrap();
        assert_eq!(identity.role, Role::Admin);
        assert!(identity.client.is_none());
    }

    #[tokio::test]
    async fn first_matching_client_wins() {
        let f = fixture(None).await;
        let first = f.clients.create(ana()).await.unwrap();
        let mut twin = ana();
        twin.email = "outra@x.com".into();
        f.clients.create(twin).await.unwrap();

        let identity = f.auth.authenticate("Ana", "p1").await.unwrap();
        assert_eq!(identity.subject, first.id);
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let f = fixture(None).await;
        f.clients.create(ana()).await.unwrap();
        let unknown = f.auth.authenticate("ninguem@x.com", "p1").await.unwrap_err();
        let wrong = f.auth.authenticate("ana@x.com", "p2").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn login_validate_logout_cycle() {
        let f = fixture(None).await;
        f.clients.create(ana()).await.unwrap();

        let login = f.auth.login("ana@x.com", "p1").await.unwrap();
        assert_eq!(login.redirect_to, "/client");
        assert_eq!(login.client.as_ref().unwrap().email, "ana@x.com");

        let principal = f.auth.validate_token(&login.token).await.unwrap();
        assert_eq!(principal.role, Role::Client);

        f.auth.logout(&principal).await.unwrap();
        assert!(matches!(
            f.auth.validate_token(&login.token).await,
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            f.auth.validate_token("lixo").await,
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn deleting_client_ends_their_sessions() {
        let f = fixture(None).await;
        let created = f.clients.create(ana()).await.unwrap();
        let login = f.auth.login("ana@x.com", "p1").await.unwrap();

        f.clients.delete(&created.id).await.unwrap();
        assert!(matches!(
            f.auth.validate_token(&login.token).await,
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn external_provider_is_last_resort() {
        let provider = Arc::new(FakeProvider::default());
        let f = fixture(Some(provider.clone())).await;
        let created = f.clients.create(ana()).await.unwrap();

        // Conta externa com registro local: herda o cadastro pelo e-mail.
        let identity = f.auth.authenticate("ana@x.com", "ext-pass").await.unwrap();
        assert_eq!(identity.subject, created.id);

        let outsider = f.auth.authenticate("novo@x.com", "ext-pass").await.unwrap();
        assert_eq!(outsider.subject, "ext-42");
        assert!(outsider.client.is_none());

        assert!(matches!(
            f.auth.authenticate("novo@x.com", "boom").await,
            Err(AppError::AuthProviderError(_))
        ));
        assert!(matches!(
            f.auth.authenticate("novo@x.com", "nope").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn forgot_password_channels() {
        let offline = fixture(None).await;
        let channel = offline.auth.forgot_password("ana@x.com", None).await.unwrap();
        assert_eq!(channel, RecoveryChannel::AdminInbox);
        let inbox = offline.inbox.list().await.unwrap();
        assert_eq!(inbox[0].kind, Some(MessageKind::PasswordRecovery));

        let provider = Arc::new(FakeProvider::default());
        let online = fixture(Some(provider.clone())).await;
        let channel = online.auth.forgot_password("ana@x.com", None).await.unwrap();
        assert_eq!(channel, RecoveryChannel::Provider);
        assert_eq!(provider.resets.lock().unwrap().as_slice(), ["ana@x.com"]);
        assert!(online.inbox.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oauth_needs_provider() {
        let offline = fixture(None).await;
        assert!(matches!(
            offline.auth.oauth_authorize_url("google", "/client"),
            Err(AppError::AuthProviderUnavailable)
        ));

        let online = fixture(Some(Arc::new(FakeProvider::default()))).await;
        let url = online.auth.oauth_authorize_url("google", "/client").unwrap();
        assert!(url.contains("provider=google"));
    }
}
