use crate::errors::{MessagingError, MessagingResult};
use crate::services::language::normalize_language;
use crate::services::variables::extract_variables;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use uuid::Uuid;

pub const MAX_HEADER_LEN: usize = 60;
pub const MAX_BODY_LEN: usize = 1024;
pub const MAX_FOOTER_LEN: usize = 60;

fn name_pattern() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9_]+$").unwrap())
}

// ============================================================================
// TemplateStatus Enum
// ============================================================================

/// Approval state as last seen from the provider. The provider owns the
/// authoritative value; the local copy is a cache that can be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateStatus {
    Unset,
    Pending,
    Approved,
    Rejected,
}

impl TemplateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStatus::Unset => "UNSET",
            TemplateStatus::Pending => "PENDING",
            TemplateStatus::Approved => "APPROVED",
            TemplateStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Convert from string (for SQLx and provider responses)
impl From<String> for TemplateStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => TemplateStatus::Pending,
            "APPROVED" => TemplateStatus::Approved,
            "REJECTED" => TemplateStatus::Rejected,
            _ => TemplateStatus::Unset,
        }
    }
}

// ============================================================================
// TemplateCategory Enum
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateCategory {
    Utility,
    Marketing,
    Authentication,
}

impl TemplateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateCategory::Utility => "UTILITY",
            TemplateCategory::Marketing => "MARKETING",
            TemplateCategory::Authentication => "AUTHENTICATION",
        }
    }

    pub fn parse(s: &str) -> MessagingResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "UTILITY" => Ok(TemplateCategory::Utility),
            "MARKETING" => Ok(TemplateCategory::Marketing),
            "AUTHENTICATION" => Ok(TemplateCategory::Authentication),
            other => Err(MessagingError::Validation(format!(
                "Unknown template category '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for TemplateCategory {
    fn from(s: String) -> Self {
        TemplateCategory::parse(&s).unwrap_or(TemplateCategory::Utility)
    }
}

// ============================================================================
// Template Model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateButton {
    pub text: String,
    pub url: String,
}

/// Caller-supplied fields for creating a template. Everything derived
/// (`id`, `variables`, timestamps) is computed by `Template::new`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub language: Option<String>,
    pub category: TemplateCategory,
    pub header: Option<String>,
    pub body: String,
    pub footer: Option<String>,
    #[serde(default)]
    pub buttons: Vec<TemplateButton>,
    pub automation_trigger: Option<String>,
}

/// Partial update. `variables` is never accepted from callers; it is
/// recomputed whenever any text field changes. The local `name` is not
/// patchable at all, and a non-null `provider_template_name` can never be
/// changed to a different value. For the optional text fields an empty
/// string clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatePatch {
    pub language: Option<String>,
    pub category: Option<TemplateCategory>,
    pub header: Option<String>,
    pub body: Option<String>,
    pub footer: Option<String>,
    pub buttons: Option<Vec<TemplateButton>>,
    pub automation_trigger: Option<String>,
    pub provider_template_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub provider_template_name: Option<String>,
    pub provider_template_id: Option<String>,
    pub language: String,
    pub category: TemplateCategory,
    pub header: Option<String>,
    pub body: String,
    pub footer: Option<String>,
    pub buttons: Vec<TemplateButton>,
    pub variables: Vec<String>,
    pub status: TemplateStatus,
    pub automation_trigger: Option<String>,
    pub created_at: String, // ISO 8601
    pub updated_at: String, // ISO 8601
}

impl Template {
    /// Create a new local template record with generated ID, normalized
    /// language and derived variables. Remote registration happens later.
    pub fn new(spec: NewTemplate) -> MessagingResult<Self> {
        let now = chrono::Utc::now().to_rfc3339();
        let language = normalize_language(spec.language.as_deref().unwrap_or("")).to_string();

        let mut template = Self {
            id: Uuid::new_v4().to_string(),
            name: spec.name,
            provider_template_name: None,
            provider_template_id: None,
            language,
            category: spec.category,
            header: spec.header,
            body: spec.body,
            footer: spec.footer,
            buttons: spec.buttons,
            variables: Vec::new(),
            status: TemplateStatus::Unset,
            automation_trigger: spec.automation_trigger,
            created_at: now.clone(),
            updated_at: now,
        };
        template.recompute_variables();
        template.validate()?;
        Ok(template)
    }

    /// Validate name format and field lengths.
    pub fn validate(&self) -> MessagingResult<()> {
        if self.name.is_empty() || !name_pattern().is_match(&self.name) {
            return Err(MessagingError::Validation(format!(
                "Template name '{}' must contain only lowercase letters, digits and underscores",
                self.name
            )));
        }

        if self.body.trim().is_empty() {
            return Err(MessagingError::Validation(
                "Template body is required".to_string(),
            ));
        }

        if self.body.chars().count() > MAX_BODY_LEN {
            return Err(MessagingError::Validation(format!(
                "Template body exceeds {} characters",
                MAX_BODY_LEN
            )));
        }

        if let Some(header) = &self.header {
            if header.chars().count() > MAX_HEADER_LEN {
                return Err(MessagingError::Validation(format!(
                    "Template header exceeds {} characters",
                    MAX_HEADER_LEN
                )));
            }
        }

        if let Some(footer) = &self.footer {
            if footer.chars().count() > MAX_FOOTER_LEN {
                return Err(MessagingError::Validation(format!(
                    "Template footer exceeds {} characters",
                    MAX_FOOTER_LEN
                )));
            }
        }

        for button in &self.buttons {
            if button.text.trim().is_empty() || button.url.trim().is_empty() {
                return Err(MessagingError::Validation(
                    "Template buttons require both text and url".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Recompute the derived `variables` list from header, body, footer and
    /// button URLs, in first-seen order with duplicates removed.
    pub fn recompute_variables(&mut self) {
        let mut fragments: Vec<&str> = Vec::new();
        if let Some(header) = &self.header {
            fragments.push(header);
        }
        fragments.push(&self.body);
        if let Some(footer) = &self.footer {
            fragments.push(footer);
        }
        for button in &self.buttons {
            fragments.push(&button.url);
        }
        self.variables = extract_variables(fragments);
    }

    /// A template may reach the provider's send endpoint only once it is
    /// linked and approved.
    pub fn is_sendable(&self) -> bool {
        self.provider_template_name.is_some() && self.status == TemplateStatus::Approved
    }

    /// Update timestamp to current time
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
