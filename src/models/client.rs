// src/models/client.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

// --- ENUMS ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Plan {
    #[default]
    Start,
    Pro,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum Currency {
    #[default]
    BRL,
    USD,
    EUR,
    GBP,
}

// --- REGISTRO PERSISTIDO ---

// Como o cliente fica gravado na coleção `adminClients`.
// Contém o hash da senha: nunca devolva este tipo direto na API, use `ClientProfile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub plan: Plan,
    pub currency: Currency,
    pub monthly_value: Decimal,
    pub start_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- RESPOSTA DA API ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    #[schema(example = "0f8fad5b-d9cb-469f-a165-70867728950e")]
    pub id: String,
    #[schema(example = "Ana Souza")]
    pub name: String,
    #[schema(example = "ana@empresa.com.br")]
    pub email: String,
    #[schema(example = "(11) 99999-8888")]
    pub phone: String,
    pub plan: Plan,
    pub currency: Currency,
    #[schema(value_type = f64, example = 1500.0)]
    pub monthly_value: Decimal,
    #[schema(value_type = String, format = Date, example = "2025-01-15")]
    pub start_date: NaiveDate,
}

impl From<&Client> for ClientProfile {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id.clone(),
            name: client.name.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            plan: client.plan,
            currency: client.currency,
            monthly_value: client.monthly_value,
            start_date: client.start_date,
        }
    }
}

// --- PAYLOADS ---

/// Teto do valor mensal, aceito tanto na API quanto na migração de dados antigos.
pub const MAX_MONTHLY_VALUE: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0); // 1e15

pub(crate) fn monthly_value_range(value: &Decimal) -> Result<(), ValidationError> {
    let message = if value.is_sign_negative() && !value.is_zero() {
        "non_negative"
    } else if *value > MAX_MONTHLY_VALUE {
        "too_large"
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("range");
    err.message = Some(message.into());
    Err(err)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Ana Souza")]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "ana@empresa.com.br")]
    pub email: String,

    #[serde(default)]
    #[schema(example = "(11) 99999-8888")]
    pub phone: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "p1")]
    pub password: String,

    #[serde(default)]
    pub plan: Plan,

    #[serde(default)]
    pub currency: Currency,

    #[validate(custom(function = "monthly_value_range"))]
    #[schema(value_type = f64, example = 1500.0)]
    pub monthly_value: Decimal,

    #[schema(value_type = Option<String>, format = Date, example = "2025-01-15")]
    pub start_date: Option<NaiveDate>,
}

// Todos opcionais: o que vier é mesclado no registro existente.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,

    pub phone: Option<String>,

    #[validate(length(min = 1, message = "required"))]
    pub password: Option<String>,

    pub plan: Option<Plan>,

    pub currency: Option<Currency>,

    #[validate(custom(function = "monthly_value_range"))]
    #[schema(value_type = Option<f64>)]
    pub monthly_value: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date)]
    pub start_date: Option<NaiveDate>,
}
