use crate::config::Config;
use crate::errors::{MessagingError, MessagingResult};
use crate::models::{Template, TemplateStatus};
use crate::provider::{CreatedTemplate, MessageComponent, ProviderApi, RemoteTemplate};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

/// Timeout for template creation calls; the provider runs validation on
/// create, which is slower than its other endpoints.
const CREATE_TIMEOUT: Duration = Duration::from_secs(15);
const CALL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ProviderCredentials {
    pub token: String,
    pub account_id: String,
    pub phone_id: String,
}

impl ProviderCredentials {
    pub fn from_config(config: &Config) -> Self {
        Self {
            token: config.provider_token.clone(),
            account_id: config.provider_account_id.clone(),
            phone_id: config.provider_phone_id.clone(),
        }
    }
}

/// Thin typed client over the provider's HTTP API.
///
/// Explicitly constructed and passed by reference; credentials and timeouts
/// live here, not in globals, so tests can substitute a `ProviderApi` fake.
#[derive(Clone)]
pub struct ProviderClient {
    http_client: Client,
    base_url: String,
    credentials: ProviderCredentials,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: Option<ProviderErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    data: Vec<RemoteTemplate>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: String,
}

impl ProviderClient {
    pub fn new(base_url: String, credentials: ProviderCredentials) -> Self {
        let http_client = Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.provider_base_url.clone(),
            ProviderCredentials::from_config(config),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, builder: RequestBuilder, timeout: Duration) -> RequestBuilder {
        builder
            .bearer_auth(&self.credentials.token)
            .header("Content-Type", "application/json")
            .timeout(timeout)
    }

    /// Map a transport failure to `Network`; the provider never saw or never
    /// answered the request.
    fn network_error(e: reqwest::Error) -> MessagingError {
        let message = if e.is_timeout() {
            format!("Provider call timed out: {}", e)
        } else if e.is_connect() {
            format!("Connection to provider failed: {}", e)
        } else {
            format!("Network error: {}", e)
        };
        MessagingError::Network(message)
    }

    /// Turn a non-2xx provider response into `Provider`, pulling the message
    /// out of the `error.message` convention when present.
    async fn rejection(response: Response) -> MessagingError {
        let status = response.status().as_u16();
        let message = match response.text().await {
            Ok(body) => match serde_json::from_str::<ProviderErrorBody>(&body) {
                Ok(parsed) => parsed
                    .error
                    .and_then(|e| e.message)
                    .or(parsed.message)
                    .unwrap_or(body),
                Err(_) => body,
            },
            Err(_) => format!("HTTP {} error", status),
        };
        let message = if message.len() > 500 {
            message[..500].to_string()
        } else {
            message
        };
        MessagingError::Provider { status, message }
    }

    async fn check(response: Response) -> MessagingResult<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::rejection(response).await)
        }
    }

    /// Build the definition-style component list the provider expects when
    /// registering a template. Placeholder tokens are passed through; the
    /// provider stores them as positional parameters.
    fn definition_components(template: &Template) -> Vec<serde_json::Value> {
        let mut components = Vec::new();
        if let Some(header) = &template.header {
            components.push(json!({"type": "HEADER", "format": "TEXT", "text": header}));
        }
        components.push(json!({"type": "BODY", "text": template.body}));
        if let Some(footer) = &template.footer {
            components.push(json!({"type": "FOOTER", "text": footer}));
        }
        if !template.buttons.is_empty() {
            let buttons: Vec<_> = template
                .buttons
                .iter()
                .map(|b| json!({"type": "URL", "text": b.text, "url": b.url}))
                .collect();
            components.push(json!({"type": "BUTTONS", "buttons": buttons}));
        }
        components
    }
}

#[async_trait]
impl ProviderApi for ProviderClient {
    async fn create_template(&self, template: &Template) -> MessagingResult<CreatedTemplate> {
        let url = self.url(&format!("{}/message_templates", self.credentials.account_id));
        let payload = json!({
            "name": template.name,
            "language": template.language,
            "category": template.category.as_str(),
            "components": Self::definition_components(template),
        });

        info!(name = %template.name, "Registering template with provider");

        let response = self
            .authorized(self.http_client.post(&url), CREATE_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(Self::network_error)?;

        let response = Self::check(response).await?;
        let created: CreateResponse = response
            .json()
            .await
            .map_err(|e| MessagingError::Network(format!("Malformed provider response: {}", e)))?;

        Ok(CreatedTemplate {
            provider_id: created.id,
            provider_name: template.name.clone(),
        })
    }

    async fn list_templates(&self) -> MessagingResult<Vec<RemoteTemplate>> {
        let url = self.url(&format!("{}/message_templates", self.credentials.account_id));

        let response = self
            .authorized(self.http_client.get(&url), CALL_TIMEOUT)
            .send()
            .await
            .map_err(Self::network_error)?;

        let response = Self::check(response).await?;
        let envelope: ListEnvelope = response
            .json()
            .await
            .map_err(|e| MessagingError::Network(format!("Malformed provider response: {}", e)))?;

        Ok(envelope.data)
    }

    async fn get_template_status(&self, provider_id: &str) -> MessagingResult<TemplateStatus> {
        let url = self.url(provider_id);

        let response = self
            .authorized(self.http_client.get(&url), CALL_TIMEOUT)
            .query(&[("fields", "status")])
            .send()
            .await
            .map_err(Self::network_error)?;

        let response = Self::check(response).await?;
        let status: StatusResponse = response
            .json()
            .await
            .map_err(|e| MessagingError::Network(format!("Malformed provider response: {}", e)))?;

        Ok(TemplateStatus::from(status.status))
    }

    async fn delete_template(&self, provider_id: &str) -> MessagingResult<()> {
        let url = self.url(&format!("{}/message_templates", self.credentials.account_id));

        let response = self
            .authorized(self.http_client.delete(&url), CALL_TIMEOUT)
            .query(&[("hsm_id", provider_id)])
            .send()
            .await
            .map_err(Self::network_error)?;

        Self::check(response).await?;
        Ok(())
    }

    async fn send_template_message(
        &self,
        destination: &str,
        provider_name: &str,
        language: &str,
        components: &[MessageComponent],
    ) -> MessagingResult<serde_json::Value> {
        let url = self.url(&format!("{}/messages", self.credentials.phone_id));
        let payload = json!({
            "messaging_product": "whatsapp",
            "to": destination,
            "type": "template",
            "template": {
                "name": provider_name,
                "language": {"code": language},
                "components": components,
            },
        });

        info!(to = %destination, template = %provider_name, "Sending template message");

        let response = self
            .authorized(self.http_client.post(&url), CALL_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                warn!(to = %destination, "Template send failed in transport: {}", e);
                Self::network_error(e)
            })?;

        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| MessagingError::Network(format!("Malformed provider response: {}", e)))
    }

    async fn send_text_message(
        &self,
        destination: &str,
        text: &str,
    ) -> MessagingResult<serde_json::Value> {
        let url = self.url(&format!("{}/messages", self.credentials.phone_id));
        let payload = json!({
            "messaging_product": "whatsapp",
            "to": destination,
            "type": "text",
            "text": {"body": text},
        });

        let response = self
            .authorized(self.http_client.post(&url), CALL_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .map_err(Self::network_error)?;

        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| MessagingError::Network(format!("Malformed provider response: {}", e)))
    }
}
