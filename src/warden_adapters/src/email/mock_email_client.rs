use std::sync::Arc;

use tokio::sync::RwLock;
use warden_core::{EmailClient, EmailDeliveryError, OutgoingEmail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub content: String,
    pub tag: &'static str,
}

/// Keeps every message in memory instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct MockEmailClient {
    sent: Arc<RwLock<Vec<SentEmail>>>,
}

impl MockEmailClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.read().await.clone()
    }
}

#[async_trait::async_trait]
impl EmailClient for MockEmailClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailDeliveryError> {
        tracing::debug!(tag = email.tag, "Capturing email instead of sending it");
        self.sent.write().await.push(SentEmail {
            recipient: email.recipient.as_str().to_owned(),
            subject: email.subject.clone(),
            content: email.html_body.clone(),
            tag: email.tag,
        });
        Ok(())
    }
}
