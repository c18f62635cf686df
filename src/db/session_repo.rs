// src/db/session_repo.rs

use chrono::{DateTime, Utc};

use crate::{
    common::error::AppError,
    db::{collection::Collection, store::SharedStore},
    models::auth::SessionMarker,
};

pub const SESSIONS_KEY: &str = "activeSessions";

#[derive(Clone)]
pub struct SessionRepository {
    sessions: Collection<SessionMarker>,
}

impl SessionRepository {
    pub fn new(store: SharedStore) -> Self {
        Self {
            sessions: Collection::new(store, SESSIONS_KEY),
        }
    }

    // Aproveita a escrita para descartar marcadores vencidos.
    pub async fn insert(&self, marker: SessionMarker) -> Result<(), AppError> {
        let now = marker.created_at;
        self.sessions
            .mutate(move |sessions| {
                sessions.retain(|s| !s.is_expired(now));
                sessions.push(marker);
                Ok(())
            })
            .await
    }

    pub async fn find_active(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionMarker>, AppError> {
        Ok(self
            .sessions
            .load()
            .await?
            .into_iter()
            .find(|s| s.id == id && !s.is_expired(now)))
    }

    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        self.sessions
            .mutate(|sessions| {
                sessions.retain(|s| s.id != id);
                Ok(())
            })
            .await
    }

    /// Usado quando um cliente é excluído: derruba as sessões dele.
    pub async fn remove_for_client(&self, client_id: &str) -> Result<usize, AppError> {
        self.sessions
            .mutate(|sessions| {
                let before = sessions.len();
                sessions.retain(|s| s.client_id.as_deref() != Some(client_id));
                Ok(before - sessions.len())
            })
            .await
    }
}
