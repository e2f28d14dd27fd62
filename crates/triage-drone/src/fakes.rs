//! In-memory [`BuildSource`] (testing only)
//!
//! Holds builds with their stage detail and per-step logs, and answers the
//! same queries a Drone server would.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use triage_core::LogLine;

use crate::error::{DroneError, Result};
use crate::model::{Build, Stage, Status, Step};
use crate::source::BuildSource;

/// In-memory build source backed by a list of builds and a log map.
#[derive(Debug, Default)]
pub struct MemoryBuildSource {
    builds: Vec<Build>,
    logs: HashMap<(u64, u32, u32), Vec<LogLine>>,
    log_fetches: AtomicUsize,
}

impl MemoryBuildSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a build; list order follows insertion order.
    pub fn with_build(mut self, build: Build) -> Self {
        self.builds.push(build);
        self
    }

    /// Register the log of one step.
    pub fn with_logs<I, S>(mut self, build: u64, stage: u32, step: u32, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.logs
            .insert((build, stage, step), LogLine::from_messages(messages));
        self
    }

    /// Number of `logs` calls answered so far.
    pub fn log_fetches(&self) -> usize {
        self.log_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildSource for MemoryBuildSource {
    async fn list_builds(&self, page: u32, per_page: u32) -> Result<Vec<Build>> {
        let skip = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
        Ok(self
            .builds
            .iter()
            .skip(skip)
            .take(per_page as usize)
            .map(|build| Build {
                stages: Vec::new(),
                ..build.clone()
            })
            .collect())
    }

    async fn build(&self, number: u64) -> Result<Build> {
        self.builds
            .iter()
            .find(|build| build.number == number)
            .cloned()
            .ok_or(DroneError::BuildNotFound(number))
    }

    async fn logs(&self, build: u64, stage: u32, step: u32) -> Result<Vec<LogLine>> {
        self.log_fetches.fetch_add(1, Ordering::SeqCst);
        self.logs
            .get(&(build, stage, step))
            .cloned()
            .ok_or_else(|| DroneError::Status {
                status: 404,
                url: format!("memory://builds/{build}/logs/{stage}/{step}"),
            })
    }
}

// ---------------------------------------------------------------------------
// Builders for test fixtures
// ---------------------------------------------------------------------------

pub fn step(number: u32, name: &str, status: Status) -> Step {
    Step {
        number,
        name: name.to_string(),
        status,
    }
}

pub fn stage(number: u32, name: &str, status: Status, steps: Vec<Step>) -> Stage {
    Stage {
        number,
        name: name.to_string(),
        status,
        steps,
    }
}

pub fn build(number: u64, status: Status, stages: Vec<Stage>) -> Build {
    Build {
        id: number as i64,
        number,
        status,
        stages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_builds_pages_and_hides_stages() {
        let source = MemoryBuildSource::new()
            .with_build(build(3, Status::Failure, vec![stage(1, "s", Status::Failure, vec![])]))
            .with_build(build(2, Status::Success, vec![]))
            .with_build(build(1, Status::Failure, vec![]));

        let first = source.list_builds(1, 2).await.unwrap();
        assert_eq!(first.iter().map(|b| b.number).collect::<Vec<_>>(), vec![3, 2]);
        assert!(first[0].stages.is_empty());

        let second = source.list_builds(2, 2).await.unwrap();
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn missing_build_and_logs_are_errors() {
        let source = MemoryBuildSource::new();
        assert!(matches!(
            source.build(5).await,
            Err(DroneError::BuildNotFound(5))
        ));
        assert!(matches!(
            source.logs(5, 1, 1).await,
            Err(DroneError::Status { status: 404, .. })
        ));
        assert_eq!(source.log_fetches(), 1);
    }
}
