use crate::database::Database;
use crate::errors::{MessagingError, MessagingResult};
use crate::models::{SendRecord, Template};
use crate::services::send_pipeline::SendPipeline;
use std::collections::HashMap;
use tracing::info;

/// Lookup view over the store's `automation_trigger` column, so event
/// producers can send by symbolic trigger key without knowing template
/// names.
#[derive(Clone)]
pub struct TriggerRegistry {
    db: Database,
}

impl TriggerRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn resolve(&self, trigger: &str) -> MessagingResult<Template> {
        self.db
            .get_template_by_trigger(trigger)
            .await?
            .ok_or_else(|| {
                MessagingError::NotFound(format!("No template mapped to trigger '{}'", trigger))
            })
    }

    /// Resolve the trigger and run the send pipeline for it. Returns the
    /// send record together with the template that was used.
    pub async fn send_for_trigger(
        &self,
        pipeline: &SendPipeline,
        trigger: &str,
        destination: &str,
        values: &HashMap<String, String>,
    ) -> MessagingResult<(SendRecord, String)> {
        let template = self.resolve(trigger).await?;
        info!(trigger = %trigger, template = %template.name, "Automation trigger resolved");

        let record = pipeline
            .send_template(destination, &template.name, values, false)
            .await?;
        Ok((record, template.name))
    }
}
