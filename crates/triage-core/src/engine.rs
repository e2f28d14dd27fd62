//! Classification engine.
//!
//! Walks a step's log in emission order. On each line the catalog's rules
//! are tried in priority order and the first one that matches decides the
//! line's outcome:
//!
//! - terminal rule: stop and report it
//! - non-terminal rule: record it and keep scanning; a later match
//!   replaces the record
//!
//! When the log is exhausted the last recorded match is reported, or an
//! unmatched verdict when nothing fired.

use tracing::{debug, trace};

use crate::catalog::RuleCatalog;
use crate::log_line::LogLine;
use crate::result::ClassificationResult;

/// Classify `logs` against `catalog`.
pub fn classify(catalog: &RuleCatalog, logs: &[LogLine]) -> ClassificationResult {
    let mut recorded: Option<ClassificationResult> = None;

    for i in 0..logs.len() {
        let Some(rule) = catalog.rules().iter().find(|rule| rule.matches(logs, i)) else {
            continue;
        };

        let hit = ClassificationResult::from_match(rule, logs, i, i + 1);
        if rule.terminal {
            debug!(rule = %rule.name, line = i, "terminal signature matched");
            return hit;
        }

        trace!(rule = %rule.name, line = i, "non-terminal signature recorded");
        recorded = Some(hit);
    }

    match recorded {
        Some(mut last) => {
            last.lines_scanned = logs.len();
            last
        }
        None => {
            debug!(lines = logs.len(), "no known signature matched");
            ClassificationResult::unmatched(logs.len())
        }
    }
}

/// A rule catalog bound to scanning options.
///
/// Immutable after construction, so one instance can be shared (e.g. in an
/// `Arc`) by concurrent classifications.
#[derive(Debug, Clone)]
pub struct Classifier {
    catalog: RuleCatalog,
    max_lines: Option<usize>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(RuleCatalog::builtin())
    }
}

impl Classifier {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self {
            catalog,
            max_lines: None,
        }
    }

    /// Only scan the first `max_lines` lines of each log.
    ///
    /// Lines past the ceiling are invisible to the engine, including as
    /// lookahead targets.
    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = Some(max_lines);
        self
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn max_lines(&self) -> Option<usize> {
        self.max_lines
    }

    /// Classify one step's log.
    pub fn classify(&self, logs: &[LogLine]) -> ClassificationResult {
        let logs = match self.max_lines {
            Some(max) if logs.len() > max => {
                debug!(lines = logs.len(), max, "log truncated to scan ceiling");
                &logs[..max]
            }
            _ => logs,
        };
        classify(&self.catalog, logs)
    }
}
