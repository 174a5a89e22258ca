/// HTTP transport errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {reason}")]
    Network { reason: String },

    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("failed to build request: {reason}")]
    InvalidRequest { reason: String },
}
