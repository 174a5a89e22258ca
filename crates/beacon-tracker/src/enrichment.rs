//! `browser_*` metadata attached to every event.

use beacon_core::models::{EnrichedFields, IdentityRecord, Scalar, SessionDescriptor};
use beacon_core::EnvironmentSnapshot;

/// Fields derived from the environment, the session and the identity.
pub fn browser_fields(
    snapshot: &EnvironmentSnapshot,
    session: &SessionDescriptor,
    identity: &IdentityRecord,
) -> EnrichedFields {
    let mut fields = EnrichedFields::new();
    let mut put = |key: &str, value: Scalar| {
        fields.insert(key.to_string(), value);
    };

    put("browser_screen_width", snapshot.screen_width.into());
    put("browser_screen_height", snapshot.screen_height.into());
    put("browser_viewport_width", snapshot.viewport_width.into());
    put("browser_viewport_height", snapshot.viewport_height.into());
    put("browser_page_height", snapshot.page_height.into());
    put("browser_device_pixel_ratio", snapshot.device_pixel_ratio.into());
    put("browser_language", snapshot.language.as_str().into());
    put("browser_platform", snapshot.platform.as_str().into());
    put("browser_cpu_cores", snapshot.cpu_cores.into());
    put("browser_connection_type", snapshot.connection_type.clone().into());
    put("browser_cookie_enabled", snapshot.cookie_enabled.into());
    put("browser_referrer", snapshot.referrer.as_str().into());
    put("browser_url", snapshot.url.as_str().into());
    put("browser_hostname", snapshot.hostname.as_str().into());
    put("browser_pathname", snapshot.pathname.as_str().into());
    put("browser_query_string", snapshot.query_string.as_str().into());
    put("browser_session_id", session.session_id.as_str().into());
    put("browser_user_id", identity.user_id.as_str().into());

    put("browser_scroll_percent", snapshot.scroll_percent().into());
    put("browser_scroll_position_px", snapshot.scroll_top.into());
    put("browser_total_page_height", snapshot.page_height.into());

    fields
}
