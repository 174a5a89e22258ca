//! Tracker lifecycle states.

use serde::{Deserialize, Serialize};

/// Initialization progresses strictly forward through these states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Created,
    LoadingConfig,
    LoadingStorage,
    ResolvingIdentity,
    Ready,
    /// Ready with a throwaway session-scoped identity.
    ReadyFallback,
}

impl LifecycleState {
    /// Valid forward transitions.
    pub fn valid_next(&self) -> &'static [LifecycleState] {
        match self {
            Self::Created => &[Self::LoadingConfig],
            Self::LoadingConfig => &[Self::LoadingStorage],
            Self::LoadingStorage => &[Self::ResolvingIdentity],
            Self::ResolvingIdentity => &[Self::Ready, Self::ReadyFallback],
            Self::Ready | Self::ReadyFallback => &[],
        }
    }

    pub fn can_transition_to(&self, target: LifecycleState) -> bool {
        self.valid_next().contains(&target)
    }

    /// Whether the tracker accepts events in this state.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready | Self::ReadyFallback)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::LoadingConfig => "loading_config",
            Self::LoadingStorage => "loading_storage",
            Self::ResolvingIdentity => "resolving_identity",
            Self::Ready => "ready",
            Self::ReadyFallback => "ready_fallback",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
