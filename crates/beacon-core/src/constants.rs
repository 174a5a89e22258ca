/// Beacon library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Storage key under which the durable user identifier is persisted.
pub const USER_ID_STORAGE_KEY: &str = "platformance_user_id";

/// Prefix marking a locally derived identifier.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Prefix marking a throwaway, session-scoped identifier.
pub const FALLBACK_ID_PREFIX: &str = "fallback_";

/// Prefix applied to event types outside the built-in taxonomy.
pub const CUSTOM_EVENT_PREFIX: &str = "custom_";

/// Wire field carrying the stringified custom data map.
pub const ARBITRARY_DATA_FIELD: &str = "arbitrary_data";

/// Delimiter joining environment attributes before hashing.
pub const FINGERPRINT_ATTRIBUTE_DELIMITER: &str = "|";

/// Maximum number of characters kept from a clicked element's text.
pub const MAX_ELEMENT_TEXT_CHARS: usize = 100;
