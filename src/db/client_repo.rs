// src/db/client_repo.rs

use crate::{
    common::error::AppError,
    db::{collection::Collection, store::SharedStore},
    models::client::Client,
};

pub const CLIENTS_KEY: &str = "adminClients";

// O repositório de clientes: a coleção `adminClients`, em ordem de inserção.
#[derive(Clone)]
pub struct ClientRepository {
    clients: Collection<Client>,
}

impl ClientRepository {
    pub fn new(store: SharedStore) -> Self {
        Self {
            clients: Collection::new(store, CLIENTS_KEY),
        }
    }

    pub fn collection(&self) -> &Collection<Client> {
        &self.clients
    }

    pub async fn list(&self) -> Result<Vec<Client>, AppError> {
        self.clients.load().await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Client>, AppError> {
        Ok(self.list().await?.into_iter().find(|c| c.id == id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Client>, AppError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|c| c.email.eq_ignore_ascii_case(email)))
    }

    pub async fn insert(&self, client: Client) -> Result<Client, AppError> {
        self.clients
            .mutate(move |clients| {
                clients.push(client.clone());
                Ok(client)
            })
            .await
    }

    /// Aplica `change` ao registro com o id informado. `ClientNotFound` se não existir.
    pub async fn update<F>(&self, id: &str, change: F) -> Result<Client, AppError>
    where
        F: FnOnce(&mut Client),
    {
        self.clients
            .mutate(|clients| {
                let client = clients
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or(AppError::ClientNotFound)?;
                change(client);
                Ok(client.clone())
            })
            .await
    }

    /// Retorna se algo foi removido. Id ausente não é erro.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        self.clients
            .mutate(|clients| {
                let before = clients.len();
                clients.retain(|c| c.id != id);
                Ok(clients.len() != before)
            })
            .await
    }
}
