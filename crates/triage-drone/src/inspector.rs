//! Failed-step inspector.
//!
//! Lists recent builds, narrows down to failed builds → failed stages →
//! failed steps, fetches each step's log and classifies it. Steps are
//! processed concurrently up to [`InspectOptions::concurrency`], but
//! verdicts come back in discovery order.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use triage_core::{ClassificationResult, Classifier, LogLine};

use crate::error::Result;
use crate::source::BuildSource;

/// Paging and parallelism for an inspection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectOptions {
    pub page: u32,
    pub per_page: u32,
    /// Maximum number of step logs fetched and classified at once.
    pub concurrency: usize,
}

impl Default for InspectOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 100,
            concurrency: 4,
        }
    }
}

/// Classification of one failed step, with the log it was drawn from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepVerdict {
    pub build: u64,
    pub stage: u32,
    pub step: u32,
    pub step_name: String,
    pub logs: Vec<LogLine>,
    pub result: ClassificationResult,
}

impl StepVerdict {
    /// No known signature explained this step.
    pub fn needs_triage(&self) -> bool {
        !self.result.matched
    }
}

#[derive(Debug, Clone)]
struct FailedStep {
    build: u64,
    stage: u32,
    step: u32,
    name: String,
}

/// Walks a [`BuildSource`] and classifies every failed step it finds.
pub struct Inspector<S> {
    source: S,
    classifier: Arc<Classifier>,
    options: InspectOptions,
}

impl<S: BuildSource> Inspector<S> {
    pub fn new(source: S, classifier: Arc<Classifier>) -> Self {
        Self {
            source,
            classifier,
            options: InspectOptions::default(),
        }
    }

    pub fn with_options(mut self, options: InspectOptions) -> Self {
        self.options = options;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Inspect the configured page of builds.
    ///
    /// The first fetch error aborts the run.
    pub async fn run(&self) -> Result<Vec<StepVerdict>> {
        let failed = self.failed_steps().await?;
        info!(steps = failed.len(), "classifying failed steps");

        let concurrency = self.options.concurrency.max(1);
        stream::iter(failed)
            .map(|step| self.classify_step(step))
            .buffered(concurrency)
            .try_collect()
            .await
    }

    async fn failed_steps(&self) -> Result<Vec<FailedStep>> {
        let builds = self
            .source
            .list_builds(self.options.page, self.options.per_page)
            .await?;
        debug!(builds = builds.len(), "listed builds");

        let mut failed = Vec::new();
        for summary in builds.iter().filter(|b| b.status.is_failure()) {
            let build = self.source.build(summary.number).await?;
            for stage in build.failed_stages() {
                for step in stage.failed_steps() {
                    failed.push(FailedStep {
                        build: build.number,
                        stage: stage.number,
                        step: step.number,
                        name: step.name.clone(),
                    });
                }
            }
        }
        Ok(failed)
    }

    async fn classify_step(&self, step: FailedStep) -> Result<StepVerdict> {
        let logs = self.source.logs(step.build, step.stage, step.step).await?;
        let result = self.classifier.classify(&logs);
        debug!(
            build = step.build,
            stage = step.stage,
            step = step.step,
            matched = result.matched,
            "classified step"
        );

        Ok(StepVerdict {
            build: step.build,
            stage: step.stage,
            step: step.step,
            step_name: step.name,
            logs,
            result,
        })
    }
}
