use crate::database::Database;
use crate::errors::{MessagingError, MessagingResult};
use crate::models::{SendRecord, Template, TemplateStatus};
use crate::provider::ProviderApi;
use crate::services::composer::build_components;
use crate::services::sync::StatusSyncer;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Orchestrates one send attempt: validate, optionally confirm remotely,
/// compose, send, log. Every attempt that runs to completion writes exactly
/// one `SendRecord`, success or failure; a cancelled attempt writes none.
#[derive(Clone)]
pub struct SendPipeline {
    db: Database,
    provider: Arc<dyn ProviderApi>,
    syncer: StatusSyncer,
}

impl SendPipeline {
    pub fn new(db: Database, provider: Arc<dyn ProviderApi>) -> Self {
        let syncer = StatusSyncer::new(db.clone(), provider.clone());
        Self {
            db,
            provider,
            syncer,
        }
    }

    /// Send a template message. `confirm_remote` re-checks the template's
    /// provider status before sending; a network failure during that check
    /// falls back to the trusted local status rather than failing the send.
    pub async fn send_template(
        &self,
        number: &str,
        template_name: &str,
        values: &HashMap<String, String>,
        confirm_remote: bool,
    ) -> MessagingResult<SendRecord> {
        // Until composition succeeds the logged payload is the request shape.
        let mut payload = json!({"to": number, "template": template_name}).to_string();

        match self
            .try_send_template(number, template_name, values, confirm_remote, &mut payload)
            .await
        {
            Ok(response) => {
                let record = SendRecord::sent(
                    number.to_string(),
                    Some(template_name.to_string()),
                    payload,
                    Some(response.to_string()),
                );
                self.db.insert_send_record(&record).await?;
                info!(to = %number, template = %template_name, "Template message sent");
                Ok(record)
            }
            Err(e) => {
                let record = SendRecord::failed(
                    number.to_string(),
                    Some(template_name.to_string()),
                    payload,
                    classify_send_error(&e),
                );
                if let Err(db_err) = self.db.insert_send_record(&record).await {
                    error!("Failed to log send attempt: {}", db_err);
                }
                warn!(to = %number, template = %template_name, "Template send failed: {}", e);
                Err(e)
            }
        }
    }

    /// Send a freeform text message, logged like any other attempt but with
    /// no template name.
    pub async fn send_text(&self, number: &str, text: &str) -> MessagingResult<SendRecord> {
        let payload = json!({"to": number, "text": text}).to_string();

        match self.provider.send_text_message(number, text).await {
            Ok(response) => {
                let record = SendRecord::sent(
                    number.to_string(),
                    None,
                    payload,
                    Some(response.to_string()),
                );
                self.db.insert_send_record(&record).await?;
                info!(to = %number, "Text message sent");
                Ok(record)
            }
            Err(e) => {
                let record = SendRecord::failed(
                    number.to_string(),
                    None,
                    payload,
                    classify_send_error(&e),
                );
                if let Err(db_err) = self.db.insert_send_record(&record).await {
                    error!("Failed to log send attempt: {}", db_err);
                }
                warn!(to = %number, "Text send failed: {}", e);
                Err(e)
            }
        }
    }

    async fn try_send_template(
        &self,
        number: &str,
        template_name: &str,
        values: &HashMap<String, String>,
        confirm_remote: bool,
        payload: &mut String,
    ) -> MessagingResult<serde_json::Value> {
        // Validating
        let mut template = self.db.require_template(template_name).await?;

        if template.provider_template_name.is_none() {
            self.syncer.repair_one(template_name).await;
            template = self.db.require_template(template_name).await?;
        }

        if template.status != TemplateStatus::Approved {
            return Err(MessagingError::Status {
                name: template.name,
                status: template.status,
            });
        }

        if confirm_remote {
            self.confirm_remote_status(&template).await?;
        }

        // Composing
        let provider_name = template
            .provider_template_name
            .clone()
            .unwrap_or_else(|| template.name.clone());
        let components = build_components(&template, values);
        *payload = json!({
            "to": number,
            "template": provider_name,
            "language": template.language,
            "components": components,
        })
        .to_string();

        // Sending
        self.provider
            .send_template_message(number, &provider_name, &template.language, &components)
            .await
    }

    /// Re-check the template against the provider. A confirmed non-approved
    /// or absent template fails the send; a transport failure does not,
    /// because the local status was already verified approved.
    async fn confirm_remote_status(&self, template: &Template) -> MessagingResult<()> {
        let confirmed = match &template.provider_template_id {
            Some(provider_id) => match self.provider.get_template_status(provider_id).await {
                Ok(status) => Some(status),
                Err(e) if e.is_network() => {
                    warn!(
                        template = %template.name,
                        "Status confirmation unreachable, trusting local approval: {}", e
                    );
                    None
                }
                Err(e) => return Err(e),
            },
            None => {
                // No provider id recorded; fall back to an existence check
                // against the provider's list.
                let provider_name = template
                    .provider_template_name
                    .as_deref()
                    .unwrap_or(&template.name);
                match self.provider.list_templates().await {
                    Ok(remote) => match remote.iter().find(|r| r.name == provider_name) {
                        Some(found) => Some(found.status()),
                        None => {
                            return Err(MessagingError::NotFound(format!(
                                "Template '{}' is not registered with the provider",
                                template.name
                            )))
                        }
                    },
                    Err(e) if e.is_network() => {
                        warn!(
                            template = %template.name,
                            "Existence check unreachable, trusting local approval: {}", e
                        );
                        None
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        match confirmed {
            Some(TemplateStatus::Approved) | None => Ok(()),
            Some(status) => Err(MessagingError::Status {
                name: template.name.clone(),
                status,
            }),
        }
    }
}

/// Collapse provider and pipeline errors into the small set of user-facing
/// messages the dashboard shows, instead of raw provider error text.
pub fn classify_send_error(error: &MessagingError) -> String {
    match error {
        MessagingError::NotFound(_) => "Template not found".to_string(),
        MessagingError::Status { status, .. } => match status {
            TemplateStatus::Pending => {
                "Template is pending provider approval; wait for approval".to_string()
            }
            TemplateStatus::Rejected => {
                "Template was rejected by the provider; edit and recreate it".to_string()
            }
            _ => "Template has no provider status yet".to_string(),
        },
        MessagingError::Provider { status, message } => {
            let lowered = message.to_lowercase();
            if *status == 404 || lowered.contains("not exist") || lowered.contains("not found") {
                "Template does not exist at the provider".to_string()
            } else if *status == 401 || *status == 403 {
                "Provider credentials are misconfigured".to_string()
            } else {
                "Provider rejected the message".to_string()
            }
        }
        MessagingError::Network(message) => {
            format!("Network failure talking to the provider: {}", message)
        }
        MessagingError::Config(_) => "Messaging provider is not configured".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_provider_rejections() {
        let missing = MessagingError::Provider {
            status: 404,
            message: "template does not exist".to_string(),
        };
        assert_eq!(
            classify_send_error(&missing),
            "Template does not exist at the provider"
        );

        let auth = MessagingError::Provider {
            status: 401,
            message: "bad token".to_string(),
        };
        assert_eq!(
            classify_send_error(&auth),
            "Provider credentials are misconfigured"
        );

        let other = MessagingError::Provider {
            status: 400,
            message: "parameter count mismatch".to_string(),
        };
        assert_eq!(classify_send_error(&other), "Provider rejected the message");
    }

    #[test]
    fn classifies_status_failures_with_actionable_messages() {
        let pending = MessagingError::Status {
            name: "t".to_string(),
            status: TemplateStatus::Pending,
        };
        assert!(classify_send_error(&pending).contains("wait for approval"));

        let rejected = MessagingError::Status {
            name: "t".to_string(),
            status: TemplateStatus::Rejected,
        };
        assert!(classify_send_error(&rejected).contains("edit and recreate"));
    }
}
