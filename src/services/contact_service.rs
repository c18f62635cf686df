// src/services/contact_service.rs

use reqwest::Url;

use crate::{
    common::{error::AppError, i18n::I18nStore},
    models::message::{ContactPayload, Message},
    services::inbox_service::InboxService,
};

const WHATSAPP_BASE: &str = "https://wa.me/";

// Encaminha o formulário para o serviço de relay (e-mail para a agência).
#[derive(Clone)]
pub struct FormRelay {
    http: reqwest::Client,
    endpoint: String,
}

impl FormRelay {
    pub fn new(http: reqwest::Client, endpoint: &str) -> Self {
        Self { http, endpoint: endpoint.to_string() }
    }

    /// Sem retry: uma falha volta uma vez para o usuário, que reenvia.
    pub async fn send(&self, payload: &ContactPayload) -> Result<(), AppError> {
        let params = [
            ("name", payload.name.as_str()),
            ("email", payload.email.as_str()),
            ("phone", payload.phone.as_deref().unwrap_or("")),
            ("message", payload.message.as_str()),
            ("_honey", ""),
            ("_captcha", "false"),
        ];

        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::NetworkError(format!(
                "relay respondeu {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct ContactService {
    relay: Option<FormRelay>,
    inbox: InboxService,
    whatsapp_number: String,
}

impl ContactService {
    pub fn new(relay: Option<FormRelay>, inbox: InboxService, whatsapp_number: String) -> Self {
        Self { relay, inbox, whatsapp_number }
    }

    /// Relay primeiro, caixa de entrada depois: uma falha não deixa registro pela metade.
    /// Retorna `None` quando o honeypot veio preenchido (descartado sem avisar o remetente).
    pub async fn submit(&self, payload: &ContactPayload) -> Result<Option<Message>, AppError> {
        if payload.honey.as_deref().is_some_and(|h| !h.is_empty()) {
            tracing::info!("🍯 Envio de contato descartado pelo honeypot");
            return Ok(None);
        }

        if let Some(relay) = &self.relay {
            relay.send(payload).await?;
        }

        let message = self
            .inbox
            .append(
                &payload.name,
                &payload.email,
                payload.phone.as_deref(),
                &payload.message,
            )
            .await?;
        tracing::info!("✉️ Nova mensagem de contato {}", message.id);
        Ok(Some(message))
    }

    pub fn whatsapp_link(&self, lang: &str, i18n: &I18nStore) -> Result<String, AppError> {
        let number: String = self.whatsapp_number.chars().filter(char::is_ascii_digit).collect();
        let greeting = i18n.translate(lang, "whatsapp.greeting");

        let url = Url::parse_with_params(&format!("{WHATSAPP_BASE}{number}"), &[("text", greeting)])
            .map_err(|e| anyhow::anyhow!("URL do WhatsApp inválida: {}", e))?;
        Ok(url.to_string())
    }
}
