pub mod client;

pub use client::*;

use crate::errors::MessagingResult;
use crate::models::{Template, TemplateStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One component of a provider-ready template message payload. The provider
/// binds BODY parameters positionally, so parameter order matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<MessageParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageParameter {
    #[serde(rename = "type")]
    pub parameter_type: String,
    pub text: String,
}

impl MessageParameter {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            parameter_type: "text".to_string(),
            text: value.into(),
        }
    }
}

/// Outcome of a successful remote template registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTemplate {
    pub provider_id: String,
    pub provider_name: String,
}

/// A template as reported by the provider's list endpoint. Field order in
/// the provider's JSON is not assumed.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl RemoteTemplate {
    pub fn status(&self) -> TemplateStatus {
        TemplateStatus::from(self.status.clone())
    }
}

/// Typed client surface over the external messaging provider.
///
/// Implementations make one remote call per method with an explicit timeout
/// and surface errors rather than retrying; they never touch local storage.
/// The trait exists so tests and offline callers can substitute a fake
/// instead of reaching for a process-global client.
#[async_trait]
pub trait ProviderApi: Send + Sync {
    async fn create_template(&self, template: &Template) -> MessagingResult<CreatedTemplate>;

    async fn list_templates(&self) -> MessagingResult<Vec<RemoteTemplate>>;

    async fn get_template_status(&self, provider_id: &str) -> MessagingResult<TemplateStatus>;

    async fn delete_template(&self, provider_id: &str) -> MessagingResult<()>;

    async fn send_template_message(
        &self,
        destination: &str,
        provider_name: &str,
        language: &str,
        components: &[MessageComponent],
    ) -> MessagingResult<serde_json::Value>;

    async fn send_text_message(
        &self,
        destination: &str,
        text: &str,
    ) -> MessagingResult<serde_json::Value>;
}
