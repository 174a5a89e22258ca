//! Storage implementations usable without a cross-tab hub.

mod memory;

pub use memory::MemoryStorage;
