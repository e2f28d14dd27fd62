//! Outcome of classifying one step's log.

use serde::{Deserialize, Serialize};

use crate::log_line::LogLine;
use crate::rule::Rule;

/// Verdict for one failed step.
///
/// `matched == false` is a first-class outcome: no known signature explains
/// the failure and the caller should fall back to showing the full log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassificationResult {
    pub matched: bool,
    /// Label of the deciding rule; empty when unmatched.
    pub reason_label: String,
    /// Text of the line that justifies the label; empty when unmatched.
    pub evidence_line: String,
    /// Name of the deciding rule.
    pub rule: Option<String>,
    /// Position of the evidence line in the scanned log.
    pub evidence_index: Option<usize>,
    /// Number of lines the engine inspected before deciding.
    pub lines_scanned: usize,
}

impl ClassificationResult {
    /// No rule explained the log.
    pub fn unmatched(lines_scanned: usize) -> Self {
        Self {
            matched: false,
            reason_label: String::new(),
            evidence_line: String::new(),
            rule: None,
            evidence_index: None,
            lines_scanned,
        }
    }

    /// `rule` fired on the line at position `i`.
    pub(crate) fn from_match(rule: &Rule, logs: &[LogLine], i: usize, lines_scanned: usize) -> Self {
        let evidence_index = rule.evidence_index(logs, i);
        Self {
            matched: true,
            reason_label: rule.label.clone(),
            evidence_line: logs[evidence_index].message.clone(),
            rule: Some(rule.name.clone()),
            evidence_index: Some(evidence_index),
            lines_scanned,
        }
    }

    /// One-line human summary, e.g. `bad code: undefined: fooBar`.
    pub fn summary(&self) -> String {
        if !self.matched {
            return "unknown error".to_string();
        }
        let evidence = self.evidence_line.trim_end();
        if evidence.is_empty() {
            self.reason_label.clone()
        } else {
            format!("{}: {}", self.reason_label, evidence)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatched_is_empty() {
        let r = ClassificationResult::unmatched(4);
        assert!(!r.matched);
        assert!(r.reason_label.is_empty());
        assert!(r.evidence_line.is_empty());
        assert_eq!(r.rule, None);
        assert_eq!(r.lines_scanned, 4);
        assert_eq!(r.summary(), "unknown error");
    }

    #[test]
    fn summary_joins_label_and_evidence() {
        let logs = LogLine::from_messages(["undefined: fooBar\n"]);
        let rule = Rule::substring("go-undefined", "bad code", "undefined: ");
        let r = ClassificationResult::from_match(&rule, &logs, 0, 1);
        assert_eq!(r.summary(), "bad code: undefined: fooBar");
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let value = serde_json::to_value(ClassificationResult::unmatched(0)).unwrap();
        assert_eq!(value["matched"], false);
        assert_eq!(value["reason_label"], "");
        assert!(value["rule"].is_null());
    }
}
