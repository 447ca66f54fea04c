//! Provisioning orchestration for cumulus
//!
//! A single sequential pipeline: resolve config and identity, finalize user
//! data, pre-flight DNS, create the instance, wait for running, register
//! records, summarize. Compute and DNS backends are injected behind the
//! `cumulus-cloud` traits.

pub mod context;
pub mod error;
pub mod orchestrator;
pub mod summary;

pub use context::RunContext;
pub use error::{ProvisionError, Result};
pub use orchestrator::{Orchestrator, Phase};
pub use summary::ProvisionSummary;
