//! CI Triage Core
//!
//! Explains why a CI build failed by scanning the log lines of its failed
//! steps against an ordered catalog of known failure signatures.
//!
//! - [`RuleCatalog`]: ordered, immutable list of [`Rule`]s
//! - [`Classifier`]: the line-by-line matcher producing one
//!   [`ClassificationResult`] per step
//!
//! Classification is pure: no I/O, no shared mutable state. Fetching logs
//! and deciding what to do with an unmatched verdict belong to the caller.

pub mod catalog;
pub mod engine;
pub mod error;
pub mod log_line;
pub mod result;
pub mod rule;
pub mod telemetry;

pub use catalog::RuleCatalog;
pub use engine::{classify, Classifier};
pub use error::{CatalogError, Result};
pub use log_line::LogLine;
pub use result::ClassificationResult;
pub use rule::{EvidenceSource, Matcher, Rule};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
