//! Cloud provider abstraction for cumulus
//!
//! Defines the instance and DNS service traits the orchestrator drives,
//! the instance model and launch parameters, and the bounded running-state
//! waiter. Concrete backends live in provider crates (see
//! `cumulus-cloud-aws`).

pub mod error;
pub mod instance;
pub mod params;
pub mod provider;
pub mod waiter;

pub use error::{CloudError, Result};
pub use instance::{Instance, InstanceState};
pub use params::InstanceParams;
pub use provider::{DnsService, InstanceService, RecordType};
pub use waiter::{PollConfig, wait_for_running};
