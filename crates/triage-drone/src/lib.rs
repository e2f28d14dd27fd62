//! Drone CI integration for ci-triage
//!
//! Fetches failed builds, their failed steps and step logs from a Drone
//! server, then hands each step's log to the [`triage_core::Classifier`].
//!
//! - [`DroneClient`]: thin REST client (bearer token auth, no retries)
//! - [`BuildSource`]: the seam the [`Inspector`] reads through
//! - [`fakes::MemoryBuildSource`]: in-memory source for tests

pub mod client;
pub mod config;
pub mod error;
pub mod fakes;
pub mod inspector;
pub mod model;
pub mod source;

pub use client::DroneClient;
pub use config::DroneConfig;
pub use error::{DroneError, Result};
pub use inspector::{InspectOptions, Inspector, StepVerdict};
pub use model::{Build, Stage, Status, Step, WireLine};
pub use source::BuildSource;
