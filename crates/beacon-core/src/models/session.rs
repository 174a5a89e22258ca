use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies one page lifetime. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

impl SessionDescriptor {
    /// Start a fresh session with a random v4 UUID.
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        }
    }
}

impl Default for SessionDescriptor {
    fn default() -> Self {
        Self::new()
    }
}
