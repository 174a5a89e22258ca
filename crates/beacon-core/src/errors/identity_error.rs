/// Identity resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("fingerprint provider failed to load: {reason}")]
    FingerprintLoadFailed { reason: String },

    #[error("fingerprint lookup failed: {reason}")]
    FingerprintFailed { reason: String },

    #[error("environment attributes unavailable: {reason}")]
    EnvironmentUnavailable { reason: String },

    #[error("all identity sources exhausted: {reason}")]
    Exhausted { reason: String },
}
