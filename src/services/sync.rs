use crate::database::{Database, TemplateFilter};
use crate::errors::{MessagingError, MessagingResult};
use crate::models::{Template, TemplateStatus};
use crate::provider::{ProviderApi, RemoteTemplate};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Per-template result of a sync or repair pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub name: String,
    pub outcome: SyncResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncResult {
    Updated,
    NotFoundInProvider,
    Repaired,
    Error,
}

/// Reconciles provider state into the local template store.
///
/// This is the only component that transitions `status` or touches the
/// provider linkage fields after a template has been created; the provider
/// is authoritative for both.
#[derive(Clone)]
pub struct StatusSyncer {
    db: Database,
    provider: Arc<dyn ProviderApi>,
}

impl StatusSyncer {
    pub fn new(db: Database, provider: Arc<dyn ProviderApi>) -> Self {
        Self { db, provider }
    }

    /// Post-creation reconciliation: register the template remotely and
    /// record the outcome. A successful registration links the template and
    /// marks it approved (the provider accepting creation is treated as
    /// tentative approval); on failure the template stays `Pending` with no
    /// provider name recorded, so a partial or wrong linkage is never
    /// persisted. Returns the updated template together with the provider
    /// error, if any.
    pub async fn register_with_provider(
        &self,
        name: &str,
    ) -> MessagingResult<(Template, Option<MessagingError>)> {
        let template = self.db.require_template(name).await?;

        match self.provider.create_template(&template).await {
            Ok(created) => {
                info!(name = %name, provider_id = %created.provider_id, "Template registered with provider");
                let updated = self
                    .db
                    .set_provider_state(
                        name,
                        Some(&created.provider_name),
                        Some(&created.provider_id),
                        TemplateStatus::Approved,
                    )
                    .await?;
                Ok((updated, None))
            }
            Err(e) => {
                warn!(name = %name, "Provider registration failed: {}", e);
                let updated = self
                    .db
                    .set_provider_state(name, None, None, TemplateStatus::Pending)
                    .await?;
                Ok((updated, Some(e)))
            }
        }
    }

    /// Bulk reconciliation against the provider's template list.
    ///
    /// Fetches the list once, then walks local templates sequentially so a
    /// rate-limited provider is not hammered. Matches by provider name
    /// first, then by local name. On match the provider's status, id and
    /// name overwrite the local values. Individual failures are captured in
    /// the result list; only total failure to reach the provider errors.
    pub async fn sync_all(&self) -> MessagingResult<Vec<SyncOutcome>> {
        let remote = self.provider.list_templates().await?;
        let local = self.db.list_templates(TemplateFilter::default()).await?;

        let mut outcomes = Vec::with_capacity(local.len());
        for template in local {
            let matched = find_remote(&remote, &template);

            let outcome = match matched {
                Some(remote_template) => {
                    let status = remote_template.status();
                    match self
                        .db
                        .set_provider_state(
                            &template.name,
                            Some(&remote_template.name),
                            Some(&remote_template.id),
                            status,
                        )
                        .await
                    {
                        Ok(_) => SyncOutcome {
                            name: template.name,
                            outcome: SyncResult::Updated,
                            detail: Some(status.to_string()),
                        },
                        Err(e) => SyncOutcome {
                            name: template.name,
                            outcome: SyncResult::Error,
                            detail: Some(e.to_string()),
                        },
                    }
                }
                None => SyncOutcome {
                    name: template.name,
                    outcome: SyncResult::NotFoundInProvider,
                    detail: None,
                },
            };
            outcomes.push(outcome);
        }

        info!(total = outcomes.len(), "Template sync pass complete");
        Ok(outcomes)
    }

    /// Heuristic repair for templates created before a confirmed remote
    /// round trip: any template with no provider name gets linked to its own
    /// local name and marked approved. This is a recovery convenience, not a
    /// confirmation of real provider approval, so every repair is logged at
    /// warn level.
    pub async fn repair_missing_linkage(&self) -> MessagingResult<Vec<SyncOutcome>> {
        let local = self.db.list_templates(TemplateFilter::default()).await?;

        let mut outcomes = Vec::new();
        for template in local {
            if template.provider_template_name.is_some() {
                continue;
            }
            outcomes.push(self.repair_one(&template.name).await);
        }
        Ok(outcomes)
    }

    /// Repair a single template's missing linkage (see
    /// `repair_missing_linkage`). Used by the send pipeline before
    /// validating sendability.
    pub async fn repair_one(&self, name: &str) -> SyncOutcome {
        warn!(name = %name, "Repairing missing provider linkage; approval is assumed, not confirmed");
        match self
            .db
            .set_provider_state(name, Some(name), None, TemplateStatus::Approved)
            .await
        {
            Ok(_) => SyncOutcome {
                name: name.to_string(),
                outcome: SyncResult::Repaired,
                detail: None,
            },
            Err(e) => SyncOutcome {
                name: name.to_string(),
                outcome: SyncResult::Error,
                detail: Some(e.to_string()),
            },
        }
    }
}

fn find_remote<'a>(remote: &'a [RemoteTemplate], template: &Template) -> Option<&'a RemoteTemplate> {
    if let Some(provider_name) = &template.provider_template_name {
        if let Some(found) = remote.iter().find(|r| &r.name == provider_name) {
            return Some(found);
        }
    }
    remote.iter().find(|r| r.name == template.name)
}
