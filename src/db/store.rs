// src/db/store.rs

use std::sync::Arc;

use async_trait::async_trait;

use crate::common::error::AppError;

/// Armazenamento chave-valor de bytes. É a única coisa que o resto do sistema
/// sabe sobre persistência; trocar o backend não mexe nos repositórios.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), AppError>;

    /// Remover uma chave inexistente não é erro.
    async fn remove(&self, key: &str) -> Result<(), AppError>;

    fn backend_name(&self) -> &'static str;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

// Chaves aceitas: segmentos de [A-Za-z0-9_-] separados por '/'.
pub fn validate_key(key: &str) -> Result<(), AppError> {
    let valid = !key.is_empty()
        && key.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        });

    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidStorageKey(key.to_string()))
    }
}
