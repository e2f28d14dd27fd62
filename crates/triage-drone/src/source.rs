//! The read-only view of a CI server the inspector needs.

use async_trait::async_trait;
use triage_core::LogLine;

use crate::error::Result;
use crate::model::Build;

/// Source of builds, build detail and step logs.
#[async_trait]
pub trait BuildSource: Send + Sync {
    /// One page of recent builds (newest first, no stage detail).
    async fn list_builds(&self, page: u32, per_page: u32) -> Result<Vec<Build>>;

    /// Full build including stages and steps.
    async fn build(&self, number: u64) -> Result<Build>;

    /// Log of one step, in emission order.
    async fn logs(&self, build: u64, stage: u32, step: u32) -> Result<Vec<LogLine>>;
}
