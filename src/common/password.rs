// src/common/password.rs

use crate::common::error::AppError;

// bcrypt é CPU-bound: roda fora do executor assíncrono.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(&password_clone, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

/// Hashes malformados (ex.: registro corrompido) contam como senha errada.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let hash_clone = hash.to_owned();

    let result = tokio::task::spawn_blocking(move || bcrypt::verify(&password_clone, &hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?;

    match result {
        Ok(valid) => Ok(valid),
        Err(e) => {
            tracing::warn!("Hash de senha ilegível, tratando como inválido: {}", e);
            Ok(false)
        }
    }
}
