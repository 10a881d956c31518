//! Storage backends for the TTL cache.

pub mod memory;

pub use memory::MemoryStore;
