use async_trait::async_trait;

use crate::errors::ServiceError;

pub mod openai;

/// Capability to answer a prompt with a language-model completion.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError>;
}
