//! Typed commands accepted from page code.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use beacon_core::errors::{BeaconResult, BridgeError};
use beacon_core::models::ArbitraryData;
use serde_json::{Map, Value};

/// Callback fired once the first impression is confirmed delivered.
///
/// Shared rather than owned so that a broadcast can hand the same callback
/// to every live instance.
pub type ImpressionCallback = Arc<dyn Fn() + Send + Sync>;

/// Command names as page code spells them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Track,
    Config,
    OnFirstImpression,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Track => "track",
            Action::Config => "config",
            Action::OnFirstImpression => "onFirstImpression",
        }
    }
}

impl FromStr for Action {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "track" => Ok(Action::Track),
            "config" => Ok(Action::Config),
            "onFirstImpression" => Ok(Action::OnFirstImpression),
            other => Err(BridgeError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}

/// One unit of work for a tracker instance.
#[derive(Clone)]
pub enum Command {
    /// Track an event. The name is validated when the command executes.
    Track {
        event_type: String,
        data: ArbitraryData,
    },
    /// Shallow-merge into the tracker options.
    Config { patch: Map<String, Value> },
    /// Register a first-impression callback.
    OnFirstImpression(ImpressionCallback),
}

impl Command {
    pub fn track(event_type: impl Into<String>, data: ArbitraryData) -> Self {
        Command::Track {
            event_type: event_type.into(),
            data,
        }
    }

    pub fn config(patch: Map<String, Value>) -> Self {
        Command::Config { patch }
    }

    pub fn on_first_impression(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Command::OnFirstImpression(Arc::new(callback))
    }

    pub fn action(&self) -> Action {
        match self {
            Command::Track { .. } => Action::Track,
            Command::Config { .. } => Action::Config,
            Command::OnFirstImpression(_) => Action::OnFirstImpression,
        }
    }

    /// Build a command from the untyped `(action, argument, data)` triple the
    /// page-level queue accepts.
    ///
    /// Callbacks cannot travel as JSON, so `onFirstImpression` is rejected
    /// here; page integrations register it through [`Command::on_first_impression`].
    pub fn from_raw(action: &str, argument: Value, data: Option<Value>) -> BeaconResult<Self> {
        let action: Action = action.parse()?;
        match action {
            Action::Track => {
                let Value::String(event_type) = argument else {
                    return Err(malformed(action, "event type must be a string"));
                };
                let data = match data {
                    None | Some(Value::Null) => ArbitraryData::new(),
                    Some(Value::Object(map)) => map,
                    Some(_) => return Err(malformed(action, "data must be an object")),
                };
                Ok(Command::track(event_type, data))
            }
            Action::Config => match argument {
                Value::Object(patch) => Ok(Command::config(patch)),
                _ => Err(malformed(action, "patch must be an object")),
            },
            Action::OnFirstImpression => Err(malformed(action, "callback must be a function")),
        }
    }
}

fn malformed(action: Action, reason: &str) -> beacon_core::BeaconError {
    BridgeError::MalformedCommand {
        action: action.as_str().to_string(),
        reason: reason.to_string(),
    }
    .into()
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Track { event_type, data } => f
                .debug_struct("Track")
                .field("event_type", event_type)
                .field("data", data)
                .finish(),
            Command::Config { patch } => f.debug_struct("Config").field("patch", patch).finish(),
            Command::OnFirstImpression(_) => f.write_str("OnFirstImpression(<callback>)"),
        }
    }
}

/// Executes commands against a ready tracker instance.
pub trait CommandHandler: Send + Sync {
    fn handle(&self, command: Command);
}
