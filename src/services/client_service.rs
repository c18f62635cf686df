// src/services/client_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::{error::AppError, password::hash_password},
    db::{ClientRepository, SessionRepository},
    models::{
        auth::Principal,
        client::{Client, CreateClientPayload, UpdateClientPayload},
    },
};

// Cadastro de clientes. Não valida campos: quem chama (os handlers) valida antes.
#[derive(Clone)]
pub struct ClientService {
    repo: ClientRepository,
    sessions: SessionRepository,
    bcrypt_cost: u32,
}

impl ClientService {
    pub fn new(repo: ClientRepository, sessions: SessionRepository, bcrypt_cost: u32) -> Self {
        Self { repo, sessions, bcrypt_cost }
    }

    pub async fn list(&self) -> Result<Vec<Client>, AppError> {
        self.repo.list().await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Client>, AppError> {
        self.repo.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Client>, AppError> {
        self.repo.find_by_email(email).await
    }

    pub async fn create(&self, payload: CreateClientPayload) -> Result<Client, AppError> {
        let password_hash = hash_password(&payload.password, self.bcrypt_cost).await?;
        let now = Utc::now();

        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            password_hash,
            plan: payload.plan,
            currency: payload.currency,
            monthly_value: payload.monthly_value,
            start_date: payload.start_date.unwrap_or_else(|| now.date_naive()),
            created_at: now,
            updated_at: now,
        };

        let client = self.repo.insert(client).await?;
        tracing::info!("👤 Cliente {} criado", client.id);
        Ok(client)
    }

    pub async fn update(&self, id: &str, payload: UpdateClientPayload) -> Result<Client, AppError> {
        // Hash antes de pegar o lock da coleção.
        let password_hash = match &payload.password {
            Some(password) => Some(hash_password(password, self.bcrypt_cost).await?),
            None => None,
        };

        self.repo
            .update(id, move |client| {
                if let Some(name) = payload.name {
                    client.name = name;
                }
                if let Some(email) = payload.email {
                    client.email = email;
                }
                if let Some(phone) = payload.phone {
                    client.phone = phone;
                }
                if let Some(hash) = password_hash {
                    client.password_hash = hash;
                }
                if let Some(plan) = payload.plan {
                    client.plan = plan;
                }
                if let Some(currency) = payload.currency {
                    client.currency = currency;
                }
                if let Some(value) = payload.monthly_value {
                    client.monthly_value = value;
                }
                if let Some(start_date) = payload.start_date {
                    client.start_date = start_date;
                }
                client.updated_at = Utc::now();
            })
            .await
    }

    /// Idempotente: excluir um id que não existe não faz nada.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if self.repo.delete(id).await? {
            let dropped = self.sessions.remove_for_client(id).await?;
            tracing::info!("🗑️ Cliente {} excluído ({} sessões encerradas)", id, dropped);
        }
        Ok(())
    }

    /// O registro do cliente autenticado: pelo id da sessão ou, se veio do provedor externo, pelo e-mail.
    pub async fn resolve_principal(&self, principal: &Principal) -> Result<Client, AppError> {
        if let Some(id) = &principal.client_id {
            if let Some(client) = self.find_by_id(id).await? {
                return Ok(client);
            }
        }
        if let Some(email) = &principal.email {
            if let Some(client) = self.find_by_email(email).await? {
                return Ok(client);
            }
        }
        Err(AppError::ClientNotFound)
    }
}
