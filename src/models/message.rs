// src/models/message.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// --- ENUMS ---

// Novo -> Respondido. Não existe caminho de volta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MessageStatus {
    #[default]
    Novo,
    Respondido,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    Contact,
    PasswordRecovery,
}

// --- REGISTRO ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[schema(example = "Carlos Lima")]
    pub name: String,
    #[schema(example = "carlos@loja.com")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[schema(example = "Gostaria de um orçamento para tráfego pago.")]
    pub message: String,
    pub date: DateTime<Utc>,
    pub status: MessageStatus,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
}

impl Message {
    /// Única transição permitida. Chamar em uma mensagem já respondida não muda nada.
    pub fn mark_answered(&mut self) {
        self.status = MessageStatus::Respondido;
    }
}

// --- PAYLOADS ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Carlos Lima")]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "carlos@loja.com")]
    pub email: String,

    #[schema(example = "(21) 98888-7777")]
    pub phone: Option<String>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Gostaria de um orçamento para tráfego pago.")]
    pub message: String,

    // Honeypot: campo escondido no formulário, humanos deixam vazio.
    #[serde(rename = "_honey", default)]
    pub honey: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactReceipt {
    pub received: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppLink {
    #[schema(example = "https://wa.me/5511999998888?text=Ol%C3%A1%21")]
    pub url: String,
}
