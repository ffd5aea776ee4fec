//! Storage Implementations
//!
//! Concrete implementations of the `Storage` port.

mod glob;
mod local;
mod memory;

pub use glob::GlobMatcher;
pub use local::LocalStorage;
pub use memory::MemoryStorage;
