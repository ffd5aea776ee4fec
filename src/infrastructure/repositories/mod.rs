//! Repository Implementations
//!
//! Concrete implementations of domain repository ports.

mod project;

pub use project::YamlProjectRepository;
