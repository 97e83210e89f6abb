use async_trait::async_trait;
use feedbackdesk::errors::{MessagingError, MessagingResult};
use feedbackdesk::models::{Template, TemplateStatus};
use feedbackdesk::provider::{CreatedTemplate, MessageComponent, ProviderApi, RemoteTemplate};
use std::collections::HashMap;
use std::sync::Mutex;

/// Failure a fake call should produce.
#[derive(Debug, Clone)]
pub enum FakeFailure {
    Network,
    Rejected(u16, String),
}

impl FakeFailure {
    fn to_error(&self) -> MessagingError {
        match self {
            FakeFailure::Network => {
                MessagingError::Network("simulated transport failure".to_string())
            }
            FakeFailure::Rejected(status, message) => MessagingError::Provider {
                status: *status,
                message: message.clone(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentCall {
    pub destination: String,
    pub provider_name: String,
    pub language: String,
    pub components: Vec<MessageComponent>,
}

/// Scripted in-memory `ProviderApi` for tests; the real client is swapped
/// out at the trait seam, never via globals.
#[derive(Default)]
pub struct FakeProvider {
    pub remote: Mutex<Vec<RemoteTemplate>>,
    pub statuses: Mutex<HashMap<String, TemplateStatus>>,
    pub create_failure: Mutex<Option<FakeFailure>>,
    pub list_failure: Mutex<Option<FakeFailure>>,
    pub status_failure: Mutex<Option<FakeFailure>>,
    pub send_failure: Mutex<Option<FakeFailure>>,
    pub sent: Mutex<Vec<SentCall>>,
    pub texts: Mutex<Vec<(String, String)>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_remote(&self, name: &str, id: &str, status: &str) {
        self.remote.lock().unwrap().push(RemoteTemplate {
            id: id.to_string(),
            name: name.to_string(),
            language: "en_US".to_string(),
            status: status.to_string(),
            category: Some("UTILITY".to_string()),
        });
        self.statuses.lock().unwrap().insert(
            id.to_string(),
            TemplateStatus::from(status.to_string()),
        );
    }

    pub fn fail_create(&self, failure: FakeFailure) {
        *self.create_failure.lock().unwrap() = Some(failure);
    }

    pub fn fail_list(&self, failure: FakeFailure) {
        *self.list_failure.lock().unwrap() = Some(failure);
    }

    pub fn fail_status(&self, failure: FakeFailure) {
        *self.status_failure.lock().unwrap() = Some(failure);
    }

    pub fn fail_send(&self, failure: FakeFailure) {
        *self.send_failure.lock().unwrap() = Some(failure);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl ProviderApi for FakeProvider {
    async fn create_template(&self, template: &Template) -> MessagingResult<CreatedTemplate> {
        if let Some(failure) = self.create_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }
        let provider_id = format!("pid-{}", template.name);
        self.add_remote(&template.name, &provider_id, "APPROVED");
        Ok(CreatedTemplate {
            provider_id,
            provider_name: template.name.clone(),
        })
    }

    async fn list_templates(&self) -> MessagingResult<Vec<RemoteTemplate>> {
        if let Some(failure) = self.list_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }
        Ok(self.remote.lock().unwrap().clone())
    }

    async fn get_template_status(&self, provider_id: &str) -> MessagingResult<TemplateStatus> {
        if let Some(failure) = self.status_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }
        self.statuses
            .lock()
            .unwrap()
            .get(provider_id)
            .copied()
            .ok_or_else(|| MessagingError::NotFound(format!("provider id '{}'", provider_id)))
    }

    async fn delete_template(&self, provider_id: &str) -> MessagingResult<()> {
        self.remote
            .lock()
            .unwrap()
            .retain(|r| r.id != provider_id);
        Ok(())
    }

    async fn send_template_message(
        &self,
        destination: &str,
        provider_name: &str,
        language: &str,
        components: &[MessageComponent],
    ) -> MessagingResult<serde_json::Value> {
        if let Some(failure) = self.send_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }
        self.sent.lock().unwrap().push(SentCall {
            destination: destination.to_string(),
            provider_name: provider_name.to_string(),
            language: language.to_string(),
            components: components.to_vec(),
        });
        Ok(serde_json::json!({"messages": [{"id": "wamid.test"}]}))
    }

    async fn send_text_message(
        &self,
        destination: &str,
        text: &str,
    ) -> MessagingResult<serde_json::Value> {
        if let Some(failure) = self.send_failure.lock().unwrap().as_ref() {
            return Err(failure.to_error());
        }
        self.texts
            .lock()
            .unwrap()
            .push((destination.to_string(), text.to_string()));
        Ok(serde_json::json!({"messages": [{"id": "wamid.text"}]}))
    }
}
