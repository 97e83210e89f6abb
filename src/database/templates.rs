use crate::database::Database;
use crate::errors::{MessagingError, MessagingResult};
use crate::models::{
    NewTemplate, Template, TemplateButton, TemplateCategory, TemplatePatch, TemplateStatus,
};
use crate::services::language::normalize_language;
use sqlx::any::AnyRow;
use sqlx::Row;

const TEMPLATE_COLUMNS: &str = "id, name, provider_template_name, provider_template_id, \
     language, category, header, body, footer, buttons, variables, status, \
     automation_trigger, created_at, updated_at";

/// Optional filter for template listings.
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub status: Option<TemplateStatus>,
    pub category: Option<TemplateCategory>,
}

fn row_to_template(row: &AnyRow) -> MessagingResult<Template> {
    let buttons_json: String = row.try_get("buttons")?;
    let buttons: Vec<TemplateButton> = serde_json::from_str(&buttons_json)
        .map_err(|e| MessagingError::Internal(format!("Corrupt buttons column: {}", e)))?;

    let variables_json: String = row.try_get("variables")?;
    let variables: Vec<String> = serde_json::from_str(&variables_json)
        .map_err(|e| MessagingError::Internal(format!("Corrupt variables column: {}", e)))?;

    // Handle Option<String> columns: the Any driver reports NULL as a type
    // mismatch, so nullable columns read through `.ok()`.
    Ok(Template {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        provider_template_name: row.try_get("provider_template_name").ok(),
        provider_template_id: row.try_get("provider_template_id").ok(),
        language: row.try_get("language")?,
        category: TemplateCategory::from(row.try_get::<String, _>("category")?),
        header: row.try_get("header").ok(),
        body: row.try_get("body")?,
        footer: row.try_get("footer").ok(),
        buttons,
        variables,
        status: TemplateStatus::from(row.try_get::<String, _>("status")?),
        automation_trigger: row.try_get("automation_trigger").ok(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> MessagingResult<String> {
    serde_json::to_string(value)
        .map_err(|e| MessagingError::Internal(format!("JSON encoding failed: {}", e)))
}

impl Database {
    /// Create a local template record. Name format and uniqueness are
    /// enforced here; `variables` is derived, never accepted as input.
    /// Returns the created entity so callers never need a second read.
    pub async fn create_template(&self, spec: NewTemplate) -> MessagingResult<Template> {
        let template = Template::new(spec)?;

        // Explicit existence branch; the UNIQUE constraint backstops races.
        if self.get_template(&template.name).await?.is_some() {
            return Err(MessagingError::DuplicateName(template.name));
        }
        if let Some(trigger) = &template.automation_trigger {
            self.ensure_trigger_unclaimed(trigger, &template.name).await?;
        }

        let result = sqlx::query(
            "INSERT INTO templates (id, name, provider_template_name, provider_template_id,
                 language, category, header, body, footer, buttons, variables, status,
                 automation_trigger, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&template.id)
        .bind(&template.name)
        .bind(template.provider_template_name.as_deref())
        .bind(template.provider_template_id.as_deref())
        .bind(&template.language)
        .bind(template.category.as_str())
        .bind(template.header.as_deref())
        .bind(&template.body)
        .bind(template.footer.as_deref())
        .bind(to_json(&template.buttons)?)
        .bind(to_json(&template.variables)?)
        .bind(template.status.as_str())
        .bind(template.automation_trigger.as_deref())
        .bind(&template.created_at)
        .bind(&template.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(template),
            Err(sqlx::Error::Database(db_err))
                if db_err.message().to_lowercase().contains("unique") =>
            {
                Err(MessagingError::DuplicateName(template.name))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_template(&self, name: &str) -> MessagingResult<Option<Template>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM templates WHERE name = ?",
            TEMPLATE_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_template(&row)?)),
            None => Ok(None),
        }
    }

    /// Like `get_template` but absence is an error, for callers that need
    /// the record to exist.
    pub async fn require_template(&self, name: &str) -> MessagingResult<Template> {
        self.get_template(name)
            .await?
            .ok_or_else(|| MessagingError::NotFound(format!("Template '{}'", name)))
    }

    /// Apply a partial update. Any change to header, body, footer or buttons
    /// recomputes `variables`. A non-null `provider_template_name` can only
    /// be repaired from NULL, never overwritten with a different value.
    pub async fn update_template(
        &self,
        name: &str,
        patch: TemplatePatch,
    ) -> MessagingResult<Template> {
        let mut template = self.require_template(name).await?;

        if let Some(language) = patch.language {
            template.language = normalize_language(&language).to_string();
        }
        if let Some(category) = patch.category {
            template.category = category;
        }

        let mut text_changed = false;
        if let Some(header) = patch.header {
            template.header = if header.is_empty() { None } else { Some(header) };
            text_changed = true;
        }
        if let Some(body) = patch.body {
            template.body = body;
            text_changed = true;
        }
        if let Some(footer) = patch.footer {
            template.footer = if footer.is_empty() { None } else { Some(footer) };
            text_changed = true;
        }
        if let Some(buttons) = patch.buttons {
            template.buttons = buttons;
            text_changed = true;
        }
        if let Some(trigger) = patch.automation_trigger {
            if trigger.is_empty() {
                template.automation_trigger = None;
            } else {
                self.ensure_trigger_unclaimed(&trigger, &template.name).await?;
                template.automation_trigger = Some(trigger);
            }
        }
        if let Some(provider_name) = patch.provider_template_name {
            match &template.provider_template_name {
                Some(existing) if *existing != provider_name => {
                    return Err(MessagingError::Validation(format!(
                        "provider_template_name is already '{}' and cannot be changed",
                        existing
                    )));
                }
                _ => template.provider_template_name = Some(provider_name),
            }
        }

        if text_changed {
            template.recompute_variables();
        }
        template.validate()?;
        template.touch();

        self.persist_template(&template).await?;
        Ok(template)
    }

    /// Delete the local record, returning it so the caller can attempt the
    /// best-effort remote deregistration.
    pub async fn delete_template(&self, name: &str) -> MessagingResult<Template> {
        let template = self.require_template(name).await?;

        sqlx::query("DELETE FROM templates WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(template)
    }

    pub async fn list_templates(&self, filter: TemplateFilter) -> MessagingResult<Vec<Template>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM templates ORDER BY created_at",
            TEMPLATE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut templates = Vec::with_capacity(rows.len());
        for row in &rows {
            let template = row_to_template(row)?;
            if let Some(status) = filter.status {
                if template.status != status {
                    continue;
                }
            }
            if let Some(category) = filter.category {
                if template.category != category {
                    continue;
                }
            }
            templates.push(template);
        }
        Ok(templates)
    }

    /// A trigger key maps to exactly one template. Rejects a key already
    /// claimed by a different template; the unique index backstops races.
    async fn ensure_trigger_unclaimed(&self, trigger: &str, name: &str) -> MessagingResult<()> {
        match self.get_template_by_trigger(trigger).await? {
            Some(existing) if existing.name != name => Err(MessagingError::Validation(format!(
                "Automation trigger '{}' is already mapped to template '{}'",
                trigger, existing.name
            ))),
            _ => Ok(()),
        }
    }

    pub async fn get_template_by_trigger(&self, trigger: &str) -> MessagingResult<Option<Template>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM templates WHERE automation_trigger = ?",
            TEMPLATE_COLUMNS
        ))
        .bind(trigger)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_template(&row)?)),
            None => Ok(None),
        }
    }

    /// Overwrite status and provider linkage. Reserved for the status
    /// syncer, which is the only component allowed to transition these
    /// fields after creation.
    pub(crate) async fn set_provider_state(
        &self,
        name: &str,
        provider_template_name: Option<&str>,
        provider_template_id: Option<&str>,
        status: TemplateStatus,
    ) -> MessagingResult<Template> {
        let mut template = self.require_template(name).await?;

        if let Some(provider_name) = provider_template_name {
            template.provider_template_name = Some(provider_name.to_string());
        }
        if let Some(provider_id) = provider_template_id {
            template.provider_template_id = Some(provider_id.to_string());
        }
        template.status = status;
        template.touch();

        self.persist_template(&template).await?;
        Ok(template)
    }

    async fn persist_template(&self, template: &Template) -> MessagingResult<()> {
        sqlx::query(
            "UPDATE templates
             SET provider_template_name = ?, provider_template_id = ?, language = ?,
                 category = ?, header = ?, body = ?, footer = ?, buttons = ?,
                 variables = ?, status = ?, automation_trigger = ?, updated_at = ?
             WHERE name = ?",
        )
        .bind(template.provider_template_name.as_deref())
        .bind(template.provider_template_id.as_deref())
        .bind(&template.language)
        .bind(template.category.as_str())
        .bind(template.header.as_deref())
        .bind(&template.body)
        .bind(template.footer.as_deref())
        .bind(to_json(&template.buttons)?)
        .bind(to_json(&template.variables)?)
        .bind(template.status.as_str())
        .bind(template.automation_trigger.as_deref())
        .bind(&template.updated_at)
        .bind(&template.name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
