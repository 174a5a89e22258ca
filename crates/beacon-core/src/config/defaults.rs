// Single source of truth for all default values.

// --- Endpoints ---
pub const DEFAULT_API_BASE: &str = "https://events.data.platformance.io";
pub const DEFAULT_CONFIG_BASE: &str = "https://config.data.platformance.io";

// --- Delivery ---
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 5_000;

// --- Batching ---
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_BATCH_TIMEOUT_MS: u64 = 1_000;

// --- Initialization ---
pub const DEFAULT_CONFIG_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_FINGERPRINT_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_FINGERPRINT_REGION: &str = "eu";

// --- Site config failure defaults ---
pub const DEFAULT_FINGERPRINT_ON_PARSE_FAILURE: bool = false;
pub const DEFAULT_FINGERPRINT_ON_NETWORK_FAILURE: bool = true;

// --- Observability ---
pub const DEFAULT_DEBUG: bool = false;
