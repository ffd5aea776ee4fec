//! Automation Implementations
//!
//! - `ShellAutomation` - runs hook scripts through `sh -c`
//! - `NoopAutomation` - leaves trees untouched, always passes

mod noop;
mod shell;

pub use noop::NoopAutomation;
pub use shell::ShellAutomation;
