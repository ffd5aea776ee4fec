//! Behavior language
//!
//! A service's `behavior` key holds a small script, one statement per line:
//!
//! ```text
//! <zone> forward|stub|hint <target>[,<target>...]
//! <zone-file> master <name> <TYPE> [<ttl>] <target>[,<target>...]
//! ```
//!
//! Parsing yields typed [`Behavior`](crate::domain::entities::Behavior)
//! values. Rendering turns them into config lines, generated files and,
//! for `master`, resource records, with one table per software family.

mod parser;
mod records;
mod render;

pub use parser::{parse_behavior, parse_script, BehaviorSyntaxError, Statement};
pub use records::synthesize_records;
pub use render::{master_config_line, render_behavior, RenderContext};
