use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const USER_CREATED_EVENT: &str = "user.created";

/// Envelope posted by the identity provider when an account changes.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct IdentityEvent {
    #[serde(default)]
    pub data: Option<IdentityEventData>,
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct IdentityEventData {
    #[serde(default)]
    pub id: Option<String>,
}

impl IdentityEvent {
    pub fn user_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|d| d.id.as_deref())
            .filter(|id| !id.trim().is_empty())
    }

    /// Envelopes without a type are treated as account creation.
    pub fn is_user_created(&self) -> bool {
        self.event_type
            .as_deref()
            .map_or(true, |t| t == USER_CREATED_EVENT)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
