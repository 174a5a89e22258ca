//! HTTP clients for the collector and the site-configuration service.

pub mod http_client;
pub mod site_config;

pub use http_client::{HttpSiteConfigSource, HttpTransport};
pub use site_config::{LoadedSiteConfig, SiteConfigLoader};
