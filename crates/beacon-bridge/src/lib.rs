//! # beacon-bridge
//!
//! Lets page code issue tracking commands before any tracker is ready.
//!
//! Each tracker instance owns a [`Mailbox`]. Until the instance finishes
//! initialization the mailbox buffers commands; the lifecycle controller then
//! calls [`Mailbox::drain_and_replay`] exactly once, after which commands run
//! immediately. The process-wide [`BridgeRegistry`] routes commands to one
//! named instance or broadcasts them, and holds commands for instances that
//! do not exist yet.

mod command;
mod mailbox;
mod registry;

pub use command::{Action, Command, CommandHandler, ImpressionCallback};
pub use mailbox::Mailbox;
pub use registry::{global, BridgeRegistry};
