mod degradation_event;
mod event;
mod event_type;
mod identity;
mod scalar;
mod session;

pub use degradation_event::DegradationEvent;
pub use event::{ArbitraryData, EnrichedFields, Event};
pub use event_type::EventType;
pub use identity::{IdentityRecord, UserIdType};
pub use scalar::Scalar;
pub use session::SessionDescriptor;
