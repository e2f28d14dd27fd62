//! Drone API wire models.
//!
//! Only the fields triage needs are modelled; unknown fields are ignored.

use serde::{Deserialize, Serialize};
use triage_core::LogLine;

/// Lifecycle status shared by builds, stages and steps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Failure,
    Error,
    Killed,
    Running,
    Pending,
    Skipped,
    Blocked,
    Declined,
    WaitingOnDependencies,
    #[serde(other)]
    Unknown,
}

impl Status {
    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Failure)
    }
}

/// One pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Build {
    #[serde(default)]
    pub id: i64,
    pub number: u64,
    pub status: Status,
    /// Present on build detail responses, absent from build lists.
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl Build {
    pub fn failed_stages(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter().filter(|stage| stage.status.is_failure())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stage {
    pub number: u32,
    #[serde(default)]
    pub name: String,
    pub status: Status,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Stage {
    pub fn failed_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|step| step.status.is_failure())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Step {
    pub number: u32,
    #[serde(default)]
    pub name: String,
    pub status: Status,
}

/// A log line as served by `GET .../builds/{build}/logs/{stage}/{step}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireLine {
    pub pos: usize,
    pub out: String,
    #[serde(default)]
    pub time: i64,
}

impl WireLine {
    /// Convert a fetched log into indexed lines in received order.
    ///
    /// Indices are reassigned from the received order, so a gap in `pos`
    /// cannot break lookahead.
    pub fn into_log_lines(lines: Vec<WireLine>) -> Vec<LogLine> {
        lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| LogLine::new(index, line.out))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_detail_deserializes() {
        let json = r#"{
            "id": 9001, "number": 42, "status": "failure", "event": "pull_request",
            "stages": [
                {"number": 1, "name": "default-linux-amd64", "status": "failure",
                 "steps": [
                    {"number": 1, "name": "clone", "status": "success"},
                    {"number": 2, "name": "build", "status": "failure"}
                 ]},
                {"number": 2, "name": "fossa", "status": "success", "steps": []}
            ]
        }"#;
        let build: Build = serde_json::from_str(json).unwrap();

        assert_eq!(build.number, 42);
        assert!(build.status.is_failure());
        let failed: Vec<_> = build.failed_stages().collect();
        assert_eq!(failed.len(), 1);
        let steps: Vec<_> = failed[0].failed_steps().map(|s| s.name.as_str()).collect();
        assert_eq!(steps, vec!["build"]);
    }

    #[test]
    fn build_list_entry_has_no_stages() {
        let build: Build =
            serde_json::from_str(r#"{"id": 1, "number": 7, "status": "success"}"#).unwrap();
        assert!(build.stages.is_empty());
        assert_eq!(build.status, Status::Success);
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let status: Status = serde_json::from_str(r#""paused""#).unwrap();
        assert_eq!(status, Status::Unknown);
        assert!(!status.is_failure());
    }

    #[test]
    fn waiting_status_uses_snake_case() {
        let status: Status = serde_json::from_str(r#""waiting_on_dependencies""#).unwrap();
        assert_eq!(status, Status::WaitingOnDependencies);
    }

    #[test]
    fn wire_lines_become_indexed_log_lines() {
        let wire: Vec<WireLine> = serde_json::from_str(
            r#"[{"pos": 0, "out": "+ make\n", "time": 1}, {"pos": 2, "out": "undefined: x\n", "time": 2}]"#,
        )
        .unwrap();
        let lines = WireLine::into_log_lines(wire);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], LogLine::new(1, "undefined: x\n"));
    }
}
