//! Classification rules: one known failure signature each.
//!
//! A [`Rule`] pairs a [`Matcher`] with the label reported when it fires.
//! Rules carry no behaviour beyond their matcher, so adding a signature
//! to a catalog never touches the scanning loop.

use serde::{Deserialize, Serialize};

use crate::log_line::LogLine;

// ---------------------------------------------------------------------------
// Matchers
// ---------------------------------------------------------------------------

/// How a rule recognises its signature in a log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Matcher {
    /// Line contains `fragment` anywhere.
    Substring { fragment: String },
    /// Line starts with `prefix` and ends with `suffix`.
    ///
    /// A trailing line terminator is ignored when checking the suffix.
    PrefixSuffix { prefix: String, suffix: String },
    /// Line starts with `prefix` and contains `fragment` after it.
    PrefixContains { prefix: String, fragment: String },
    /// Current line contains `current` and the following line contains
    /// `next`. An empty `next` accepts any following line, but one must
    /// still exist.
    Lookahead { current: String, next: String },
}

impl Matcher {
    /// Evaluate against the line at position `i` of `logs`.
    ///
    /// Out-of-range positions, including a lookahead past the last line,
    /// are a non-match.
    pub fn matches(&self, logs: &[LogLine], i: usize) -> bool {
        let Some(line) = logs.get(i) else {
            return false;
        };
        let message = line.message.as_str();

        match self {
            Matcher::Substring { fragment } => message.contains(fragment.as_str()),
            Matcher::PrefixSuffix { prefix, suffix } => {
                message.starts_with(prefix.as_str())
                    && strip_terminator(message).ends_with(suffix.as_str())
            }
            Matcher::PrefixContains { prefix, fragment } => message
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.contains(fragment.as_str())),
            Matcher::Lookahead { current, next } => {
                message.contains(current.as_str())
                    && logs
                        .get(i + 1)
                        .is_some_and(|following| following.message.contains(next.as_str()))
            }
        }
    }

    /// Short name of the matcher kind, as used in catalog files.
    pub fn kind(&self) -> &'static str {
        match self {
            Matcher::Substring { .. } => "substring",
            Matcher::PrefixSuffix { .. } => "prefix_suffix",
            Matcher::PrefixContains { .. } => "prefix_contains",
            Matcher::Lookahead { .. } => "lookahead",
        }
    }

    /// Fragments that must be non-empty for the matcher to be selective.
    pub(crate) fn required_fragments(&self) -> Vec<(&'static str, &str)> {
        match self {
            Matcher::Substring { fragment } => vec![("substring", fragment.as_str())],
            Matcher::PrefixSuffix { prefix, suffix } => {
                vec![("prefix", prefix.as_str()), ("suffix", suffix.as_str())]
            }
            Matcher::PrefixContains { prefix, fragment } => {
                vec![("prefix", prefix.as_str()), ("contains", fragment.as_str())]
            }
            Matcher::Lookahead { current, .. } => vec![("current", current.as_str())],
        }
    }
}

fn strip_terminator(message: &str) -> &str {
    message.trim_end_matches(['\r', '\n'])
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Which line's text is reported as evidence when a rule fires.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    /// The line whose matcher triggered.
    #[default]
    MatchedLine,
    /// The line after the one whose matcher triggered.
    NextLine,
}

/// One classification signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    /// Stable identifier, unique within a catalog.
    pub name: String,
    pub matcher: Matcher,
    /// Human-readable reason reported when the rule fires.
    pub label: String,
    #[serde(default)]
    pub evidence: EvidenceSource,
    /// A terminal match ends the scan; a non-terminal one is recorded and
    /// scanning continues.
    #[serde(default = "default_terminal")]
    pub terminal: bool,
}

fn default_terminal() -> bool {
    true
}

impl Rule {
    fn build(name: &str, label: &str, matcher: Matcher, evidence: EvidenceSource) -> Self {
        Self {
            name: name.to_string(),
            matcher,
            label: label.to_string(),
            evidence,
            terminal: true,
        }
    }

    /// Terminal rule firing on any line containing `fragment`.
    pub fn substring(name: &str, label: &str, fragment: &str) -> Self {
        Self::build(
            name,
            label,
            Matcher::Substring {
                fragment: fragment.to_string(),
            },
            EvidenceSource::MatchedLine,
        )
    }

    /// Terminal rule firing on lines framed by `prefix` and `suffix`.
    pub fn prefix_suffix(name: &str, label: &str, prefix: &str, suffix: &str) -> Self {
        Self::build(
            name,
            label,
            Matcher::PrefixSuffix {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            },
            EvidenceSource::MatchedLine,
        )
    }

    /// Terminal rule firing on lines starting with `prefix` that also
    /// contain `fragment`.
    pub fn prefix_contains(name: &str, label: &str, prefix: &str, fragment: &str) -> Self {
        Self::build(
            name,
            label,
            Matcher::PrefixContains {
                prefix: prefix.to_string(),
                fragment: fragment.to_string(),
            },
            EvidenceSource::MatchedLine,
        )
    }

    /// Terminal two-line rule. Evidence defaults to the next line; use
    /// [`Rule::evidence_from`] to report the matched line instead.
    pub fn lookahead(name: &str, label: &str, current: &str, next: &str) -> Self {
        Self::build(
            name,
            label,
            Matcher::Lookahead {
                current: current.to_string(),
                next: next.to_string(),
            },
            EvidenceSource::NextLine,
        )
    }

    /// Record the match and keep scanning.
    pub fn non_terminal(mut self) -> Self {
        self.terminal = false;
        self
    }

    /// Override which line is reported as evidence.
    pub fn evidence_from(mut self, evidence: EvidenceSource) -> Self {
        self.evidence = evidence;
        self
    }

    /// Whether the rule fires on the line at position `i`.
    pub fn matches(&self, logs: &[LogLine], i: usize) -> bool {
        self.matcher.matches(logs, i)
    }

    /// Position of the evidence line for a match at `i`.
    ///
    /// Falls back to `i` when the evidence line does not exist, which can
    /// only happen for a non-lookahead rule configured with
    /// [`EvidenceSource::NextLine`] firing on the last line.
    pub fn evidence_index(&self, logs: &[LogLine], i: usize) -> usize {
        match self.evidence {
            EvidenceSource::MatchedLine => i,
            EvidenceSource::NextLine if i + 1 < logs.len() => i + 1,
            EvidenceSource::NextLine => i,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(messages: &[&str]) -> Vec<LogLine> {
        LogLine::from_messages(messages.iter().copied())
    }

    #[test]
    fn substring_matches_anywhere() {
        let m = Matcher::Substring {
            fragment: "undefined: ".to_string(),
        };
        let logs = lines(&["pkg/foo.go:12: undefined: fooBar", "ok"]);
        assert!(m.matches(&logs, 0));
        assert!(!m.matches(&logs, 1));
    }

    #[test]
    fn prefix_suffix_requires_both_ends() {
        let rule = Rule::prefix_suffix("p", "p", "./scripts/run: line 13:", "run_rancher");
        let logs = lines(&[
            "./scripts/run: line 13: 42 Killed run_rancher",
            "./scripts/run: line 13: 42 Killed run_other",
            "prefix missing run_rancher",
        ]);
        assert!(rule.matches(&logs, 0));
        assert!(!rule.matches(&logs, 1));
        assert!(!rule.matches(&logs, 2));
    }

    #[test]
    fn prefix_suffix_ignores_trailing_newline() {
        let rule = Rule::prefix_suffix("p", "p", "start", "end");
        let logs = lines(&["start middle end\n", "start middle end\r\n"]);
        assert!(rule.matches(&logs, 0));
        assert!(rule.matches(&logs, 1));
    }

    #[test]
    fn prefix_contains_looks_after_prefix() {
        let rule = Rule::prefix_contains("p", "p", "The command 'mkdir", "non-zero code: ");
        let logs = lines(&[
            "The command 'mkdir -p /x' returned a non-zero code: 1",
            "The command 'mkdir -p /x' succeeded",
            "returned a non-zero code: 1 The command 'mkdir",
        ]);
        assert!(rule.matches(&logs, 0));
        assert!(!rule.matches(&logs, 1));
        assert!(!rule.matches(&logs, 2));
    }

    #[test]
    fn lookahead_checks_following_line() {
        let rule = Rule::lookahead("l", "l", "webhook was not available", "Stopping");
        let logs = lines(&["webhook was not available after 300s", "Stopping rancher"]);
        assert!(rule.matches(&logs, 0));
        assert!(!rule.matches(&logs, 1));
    }

    #[test]
    fn lookahead_on_last_line_is_not_a_match() {
        let rule = Rule::lookahead("l", "l", "=== FAILURES ===", "");
        let logs = lines(&["collected 3 items", "=== FAILURES ==="]);
        assert!(!rule.matches(&logs, 1));
    }

    #[test]
    fn out_of_range_position_is_not_a_match() {
        let rule = Rule::substring("s", "s", "x");
        assert!(!rule.matches(&[], 0));
        assert!(!rule.matches(&lines(&["x"]), 5));
    }

    #[test]
    fn lookahead_defaults_to_next_line_evidence() {
        let rule = Rule::lookahead("l", "l", "a", "");
        assert_eq!(rule.evidence, EvidenceSource::NextLine);
        let logs = lines(&["a", "b"]);
        assert_eq!(rule.evidence_index(&logs, 0), 1);

        let same_line = rule.evidence_from(EvidenceSource::MatchedLine);
        assert_eq!(same_line.evidence_index(&logs, 0), 0);
    }

    #[test]
    fn rule_deserializes_with_defaults() {
        let json = r#"{
            "name": "oom",
            "label": "out of memory",
            "matcher": { "kind": "substring", "fragment": "OOMKilled" }
        }"#;
        let rule: Rule = serde_json::from_str(json).unwrap();
        assert!(rule.terminal);
        assert_eq!(rule.evidence, EvidenceSource::MatchedLine);
        assert_eq!(rule, Rule::substring("oom", "out of memory", "OOMKilled"));
    }
}
