// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::client::ClientProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

impl Role {
    /// Rota do dashboard para onde o frontend navega após o login.
    pub fn dashboard_route(self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::Client => "/client",
        }
    }
}

// Quem está autenticado. Para clientes, `client_id` pode faltar quando o login
// veio do provedor externo e não há registro local com o mesmo e-mail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub role: Role,
    #[schema(example = "admin")]
    pub subject: String,
    pub email: Option<String>,
    pub client_id: Option<String>,
    #[serde(skip)]
    pub session_id: String,
}

// Marcador de sessão gravado em `activeSessions`. Some no logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMarker {
    pub id: String,
    pub role: Role,
    pub subject: String,
    pub email: Option<String>,
    pub client_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionMarker {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn principal(&self) -> Principal {
        Principal {
            role: self.role,
            subject: self.subject.clone(),
            email: self.email.clone(),
            client_id: self.client_id.clone(),
            session_id: self.id.clone(),
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // Subject (usuário admin ou id do cliente)
    pub sid: String,   // Session id (marcador persistido)
    pub role: Role,
    pub exp: usize,    // Expiration time
    pub iat: usize,    // Issued At
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    // E-mail ou nome do cliente, ou o usuário do admin.
    #[serde(alias = "email")]
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "ana@empresa.com.br")]
    pub identifier: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "p1")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    #[schema(example = "/client")]
    pub redirect_to: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientProfile>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "ana@empresa.com.br")]
    pub email: String,
    pub redirect_to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RecoveryChannel {
    // E-mail de redefinição enviado pelo provedor externo
    Provider,
    // Sem provedor: o pedido vira mensagem na caixa do admin
    AdminInbox,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ForgotPasswordResponse {
    pub channel: RecoveryChannel,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthQuery {
    pub redirect_to: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OAuthResponse {
    pub url: String,
}

/// Identidade devolvida pelo provedor externo após um login bem-sucedido.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalIdentity {
    pub id: String,
    pub email: String,
}
