use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// SendStatus Enum
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Sent,
    Failed,
}

impl SendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendStatus::Sent => "sent",
            SendStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for SendStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "sent" => SendStatus::Sent,
            _ => SendStatus::Failed,
        }
    }
}

// ============================================================================
// SendRecord Model
// ============================================================================

/// Audit log entry for one send attempt. Append-only: created once per
/// attempt and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRecord {
    pub id: String,
    pub number: String,
    /// None for freeform text sends.
    pub template_name: Option<String>,
    /// The payload as actually sent to the provider, serialized JSON.
    pub payload: String,
    pub status: SendStatus,
    pub provider_response: Option<String>,
    pub error_message: Option<String>,
    pub created_at: String, // ISO 8601
}

impl SendRecord {
    pub fn sent(
        number: String,
        template_name: Option<String>,
        payload: String,
        provider_response: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            number,
            template_name,
            payload,
            status: SendStatus::Sent,
            provider_response,
            error_message: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn failed(
        number: String,
        template_name: Option<String>,
        payload: String,
        error_message: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            number,
            template_name,
            payload,
            status: SendStatus::Failed,
            provider_response: None,
            error_message: Some(error_message),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
