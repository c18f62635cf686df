// src/db/message_repo.rs

use crate::{
    common::error::AppError,
    db::{collection::Collection, store::SharedStore},
    models::message::{Message, MessageStatus},
};

pub const MESSAGES_KEY: &str = "formMessages";

// Mais recente primeiro.
#[derive(Clone)]
pub struct MessageRepository {
    messages: Collection<Message>,
}

impl MessageRepository {
    pub fn new(store: SharedStore) -> Self {
        Self {
            messages: Collection::new(store, MESSAGES_KEY),
        }
    }

    pub fn collection(&self) -> &Collection<Message> {
        &self.messages
    }

    pub async fn list(&self) -> Result<Vec<Message>, AppError> {
        self.messages.load().await
    }

    pub async fn count_with_status(&self, status: MessageStatus) -> Result<usize, AppError> {
        Ok(self.list().await?.iter().filter(|m| m.status == status).count())
    }

    pub async fn prepend(&self, message: Message) -> Result<Message, AppError> {
        self.messages
            .mutate(move |messages| {
                messages.insert(0, message.clone());
                Ok(message)
            })
            .await
    }

    /// Retorna `false` se o id não existe.
    pub async fn mark_answered(&self, id: &str) -> Result<bool, AppError> {
        self.messages
            .mutate(|messages| {
                Ok(messages
                    .iter_mut()
                    .find(|m| m.id == id)
                    .map(|m| m.mark_answered())
                    .is_some())
            })
            .await
    }

    pub async fn remove(&self, id: &str) -> Result<bool, AppError> {
        self.messages
            .mutate(|messages| {
                let before = messages.len();
                messages.retain(|m| m.id != id);
                Ok(messages.len() != before)
            })
            .await
    }
}
