// src/services/external_auth.rs

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use crate::{common::error::AppError, models::auth::ExternalIdentity};

/// Provedor de contas externo. Só existe quando URL e chave pública estão configuradas.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ExternalIdentity, AppError>;

    async fn send_password_reset(&self, email: &str, redirect_to: Option<&str>) -> Result<(), AppError>;

    fn authorize_url(&self, provider: &str, redirect_to: &str) -> Result<String, AppError>;
}

// API REST compatível com GoTrue (/auth/v1/...).
#[derive(Clone)]
pub struct GoTrueProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: String,
    email: Option<String>,
}

impl GoTrueProvider {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }
}

fn network_error(e: reqwest::Error) -> AppError {
    AppError::NetworkError(e.to_string())
}

async fn provider_error(response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    AppError::AuthProviderError(format!("{status}: {body}"))
}

#[async_trait]
impl AuthProvider for GoTrueProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<ExternalIdentity, AppError> {
        let response = self
            .http
            .post(self.endpoint("token?grant_type=password"))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if status.is_success() {
            let token: TokenResponse = response.json().await.map_err(network_error)?;
            return Ok(ExternalIdentity {
                id: token.user.id,
                email: token.user.email.unwrap_or_else(|| email.to_string()),
            });
        }

        // Credenciais recusadas pelo provedor: mesmo erro genérico do login local.
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(AppError::InvalidCredentials);
        }
        Err(provider_error(response).await)
    }

    async fn send_password_reset(&self, email: &str, redirect_to: Option<&str>) -> Result<(), AppError> {
        let mut url = Url::parse(&self.endpoint("recover"))
            .map_err(|e| AppError::AuthProviderError(e.to_string()))?;
        if let Some(redirect) = redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", redirect);
        }

        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(network_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(provider_error(response).await)
        }
    }

    fn authorize_url(&self, provider: &str, redirect_to: &str) -> Result<String, AppError> {
        let url = Url::parse_with_params(
            &self.endpoint("authorize"),
            &[("provider", provider), ("redirect_to", redirect_to)],
        )
        .map_err(|e| AppError::AuthProviderError(e.to_string()))?;
        Ok(url.to_string())
    }
}
