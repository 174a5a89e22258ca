//! Zero-config start from the loader script URL.

use beacon_core::errors::{BeaconResult, ConfigError};
use beacon_core::TrackerOptions;
use beacon_observability::init_tracing;
use reqwest::Url;

use crate::tracker::{Tracker, TrackerBuilder};

/// Parameters read from `…/tracker.js?siteid=…&debug=…`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptTagParams {
    pub site_id: Option<String>,
    pub debug: bool,
}

impl ScriptTagParams {
    pub fn from_src(src: &str) -> BeaconResult<Self> {
        let url = Url::parse(src).map_err(|e| ConfigError::ParseFailed {
            reason: format!("script src {src:?}: {e}"),
        })?;
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "siteid" if !value.is_empty() => params.site_id = Some(value.into_owned()),
                "debug" => params.debug = matches!(value.as_ref(), "true" | "1"),
                _ => {}
            }
        }
        Ok(params)
    }

    /// A builder for the discovered site, or `None` without a `siteid`.
    pub fn builder(&self) -> Option<TrackerBuilder> {
        let site_id = self.site_id.as_deref()?;
        let options = TrackerOptions {
            debug: self.debug,
            ..TrackerOptions::default()
        };
        Some(Tracker::builder(site_id).options(options))
    }

    /// Script-tag auto-start: install the JSON log subscriber unless one is
    /// already set, then build and initialize a tracker with the production
    /// collaborators. `None` without a `siteid`.
    pub async fn start(&self) -> Option<BeaconResult<Tracker>> {
        let builder = self.builder()?;
        init_tracing(self.debug);
        Some(launch(builder).await)
    }
}

async fn launch(builder: TrackerBuilder) -> BeaconResult<Tracker> {
    let tracker = builder.build()?;
    tracker.initialize().await?;
    Ok(tracker)
}
