use serde::{Deserialize, Serialize};

use super::SessionDescriptor;
use crate::constants::{FALLBACK_ID_PREFIX, LOCAL_ID_PREFIX};

/// Where a user identifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserIdType {
    /// Issued by the fingerprint provider.
    Fingerprint,
    /// Derived on the client from environment attributes.
    Local,
    /// Throwaway identifier scoped to the current session.
    Fallback,
}

impl UserIdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserIdType::Fingerprint => "fingerprint",
            UserIdType::Local => "local",
            UserIdType::Fallback => "fallback",
        }
    }
}

/// The durable user identity of a tracker instance. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub user_id: String,
    pub user_id_type: UserIdType,
}

impl IdentityRecord {
    pub fn new(user_id: impl Into<String>, user_id_type: UserIdType) -> Self {
        Self {
            user_id: user_id.into(),
            user_id_type,
        }
    }

    /// Classify an identifier read back from storage.
    ///
    /// Stored values carry no type tag; the `local_` prefix is the only marker.
    pub fn from_stored(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let user_id_type = if user_id.starts_with(LOCAL_ID_PREFIX) {
            UserIdType::Local
        } else {
            UserIdType::Fingerprint
        };
        Self {
            user_id,
            user_id_type,
        }
    }

    /// Last-resort identity used when every resolution step failed.
    pub fn fallback(session: &SessionDescriptor) -> Self {
        Self {
            user_id: format!("{FALLBACK_ID_PREFIX}{}", session.session_id),
            user_id_type: UserIdType::Fallback,
        }
    }

    /// Whether this identity may be written to storage.
    pub fn is_persistable(&self) -> bool {
        self.user_id_type != UserIdType::Fallback
    }
}
