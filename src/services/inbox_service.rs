// src/services/inbox_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::MessageRepository,
    models::message::{Message, MessageKind, MessageStatus},
};

// Caixa de entrada do admin: formulário de contato e pedidos de recuperação de senha.
#[derive(Clone)]
pub struct InboxService {
    repo: MessageRepository,
}

impl InboxService {
    pub fn new(repo: MessageRepository) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Message>, AppError> {
        self.repo.list().await
    }

    pub async fn unread_count(&self) -> Result<usize, AppError> {
        self.repo.count_with_status(MessageStatus::Novo).await
    }

    pub async fn append(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        message: &str,
    ) -> Result<Message, AppError> {
        self.push(name, email, phone, message, Some(MessageKind::Contact)).await
    }

    pub async fn append_password_recovery(&self, email: &str) -> Result<Message, AppError> {
        let body = format!(
            "Solicitação de recuperação de senha para o e-mail {email}. \
             Entre em contato com o cliente para redefinir o acesso."
        );
        self.push(email, email, None, &body, Some(MessageKind::PasswordRecovery)).await
    }

    /// Novo -> Respondido. Id desconhecido é ignorado em silêncio.
    pub async fn mark_read(&self, id: &str) -> Result<(), AppError> {
        if !self.repo.mark_answered(id).await? {
            tracing::debug!("mark_read: mensagem {} não encontrada", id);
        }
        Ok(())
    }

    pub async fn remove(&self, id: &str) -> Result<(), AppError> {
        self.repo.remove(id).await?;
        Ok(())
    }

    async fn push(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        message: &str,
        kind: Option<MessageKind>,
    ) -> Result<Message, AppError> {
        let message = Message {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.filter(|p| !p.trim().is_empty()).map(str::to_string),
            message: message.to_string(),
            date: Utc::now(),
            status: MessageStatus::Novo,
            kind,
        };
        self.repo.prepend(message).await
    }
}
