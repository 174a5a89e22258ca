//! Read-only view of the client environment.
//!
//! The host integration fills an [`EnvironmentSnapshot`] from the page; the
//! pipeline only reads it. [`StaticEnvironment`] serves fixed values for
//! headless embeddings and tests.

use serde::{Deserialize, Serialize};

use crate::constants::FINGERPRINT_ATTRIBUTE_DELIMITER;
use crate::errors::BeaconResult;
use crate::traits::Environment;

/// Page and device metadata captured at the time an event is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSnapshot {
    pub screen_width: u32,
    pub screen_height: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub page_height: u32,
    pub device_pixel_ratio: f64,
    pub language: String,
    pub platform: String,
    pub cpu_cores: Option<u32>,
    pub connection_type: Option<String>,
    pub cookie_enabled: bool,
    pub referrer: String,
    pub url: String,
    pub hostname: String,
    pub pathname: String,
    pub query_string: String,
    pub scroll_top: f64,
    pub visible: bool,
}

impl Default for EnvironmentSnapshot {
    fn default() -> Self {
        Self {
            screen_width: 0,
            screen_height: 0,
            viewport_width: 0,
            viewport_height: 0,
            page_height: 0,
            device_pixel_ratio: 1.0,
            language: String::new(),
            platform: String::new(),
            cpu_cores: None,
            connection_type: None,
            cookie_enabled: false,
            referrer: String::new(),
            url: String::new(),
            hostname: String::new(),
            pathname: String::new(),
            query_string: String::new(),
            scroll_top: 0.0,
            visible: false,
        }
    }
}

impl EnvironmentSnapshot {
    /// Percentage of the scrollable distance covered, clamped to [0, 100].
    ///
    /// A page no taller than the viewport counts as fully scrolled.
    pub fn scroll_percent(&self) -> f64 {
        let total = f64::from(self.page_height);
        let viewport = f64::from(self.viewport_height);
        if total <= viewport {
            return 100.0;
        }
        let percent = self.scroll_top / (total - viewport) * 100.0;
        percent.clamp(0.0, 100.0)
    }
}

/// The fixed, ordered attribute list hashed into a local identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintAttributes {
    pub user_agent: String,
    pub language: String,
    pub platform: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub color_depth: u32,
    pub pixel_ratio: f64,
    pub timezone_offset_minutes: i32,
    pub hardware_concurrency: u32,
    pub max_touch_points: u32,
}

impl FingerprintAttributes {
    /// Join the attributes in their canonical order.
    pub fn canonical_string(&self) -> String {
        [
            self.user_agent.clone(),
            self.language.clone(),
            self.platform.clone(),
            format!("{}x{}", self.screen_width, self.screen_height),
            self.color_depth.to_string(),
            self.pixel_ratio.to_string(),
            self.timezone_offset_minutes.to_string(),
            self.hardware_concurrency.to_string(),
            self.max_touch_points.to_string(),
        ]
        .join(FINGERPRINT_ATTRIBUTE_DELIMITER)
    }
}

impl Default for FingerprintAttributes {
    fn default() -> Self {
        Self {
            user_agent: String::new(),
            language: String::new(),
            platform: String::new(),
            screen_width: 0,
            screen_height: 0,
            color_depth: 24,
            pixel_ratio: 1.0,
            timezone_offset_minutes: 0,
            hardware_concurrency: 1,
            max_touch_points: 0,
        }
    }
}

/// An environment that always reports the same values.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    pub snapshot: EnvironmentSnapshot,
    pub attributes: FingerprintAttributes,
}

impl StaticEnvironment {
    pub fn new(snapshot: EnvironmentSnapshot, attributes: FingerprintAttributes) -> Self {
        Self {
            snapshot,
            attributes,
        }
    }
}

impl Environment for StaticEnvironment {
    fn snapshot(&self) -> EnvironmentSnapshot {
        self.snapshot.clone()
    }

    fn fingerprint_attributes(&self) -> BeaconResult<FingerprintAttributes> {
        Ok(self.attributes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_page_counts_as_fully_scrolled() {
        let snapshot = EnvironmentSnapshot {
            page_height: 500,
            viewport_height: 800,
            ..Default::default()
        };
        assert_eq!(snapshot.scroll_percent(), 100.0);
    }

    #[test]
    fn scroll_percent_is_clamped() {
        let snapshot = EnvironmentSnapshot {
            page_height: 2000,
            viewport_height: 1000,
            scroll_top: 5000.0,
            ..Default::default()
        };
        assert_eq!(snapshot.scroll_percent(), 100.0);

        let halfway = EnvironmentSnapshot {
            scroll_top: 500.0,
            ..snapshot
        };
        assert!((halfway.scroll_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn canonical_string_keeps_attribute_order() {
        let attrs = FingerprintAttributes {
            user_agent: "UA".into(),
            language: "en".into(),
            platform: "Linux".into(),
            screen_width: 1920,
            screen_height: 1080,
            color_depth: 24,
            pixel_ratio: 2.0,
            timezone_offset_minutes: -60,
            hardware_concurrency: 8,
            max_touch_points: 0,
        };
        assert_eq!(attrs.canonical_string(), "UA|en|Linux|1920x1080|24|2|-60|8|0");
    }
}
