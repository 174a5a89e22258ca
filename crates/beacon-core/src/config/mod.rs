//! Tracker options and per-site configuration.

pub mod defaults;
pub mod site_config;
pub mod tracker_options;

pub use site_config::{SiteConfig, SiteConfigDefaults, SiteConfigFailure};
pub use tracker_options::TrackerOptions;
