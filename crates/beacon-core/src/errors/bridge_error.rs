/// Command bridge errors.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("unknown command action: {action:?}")]
    UnknownAction { action: String },

    #[error("malformed {action} command: {reason}")]
    MalformedCommand { action: String, reason: String },

    #[error("mailbox for site {site_id} already replayed")]
    AlreadyReplayed { site_id: String },

    #[error("mailbox for site {site_id} is closed")]
    Closed { site_id: String },

    #[error("site {site_id} already registered")]
    AlreadyRegistered { site_id: String },
}
