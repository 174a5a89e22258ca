/// Cross-tab storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage not connected")]
    NotConnected,

    #[error("storage operation {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("storage backend failure: {reason}")]
    Backend { reason: String },
}
