//! Provider trait definitions
//!
//! The compute and DNS backends are opaque collaborators behind these two
//! traits so the orchestration logic can be exercised against test doubles.

use crate::error::Result;
use crate::instance::{Instance, InstanceState};
use crate::params::InstanceParams;
use async_trait::async_trait;

/// DNS record types we create or check for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    Cname,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Cname => "CNAME",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute instance lifecycle operations.
#[async_trait]
pub trait InstanceService: Send + Sync {
    /// Launch a single instance. No retry on failure.
    async fn create(&self, params: &InstanceParams) -> Result<Instance>;

    /// Current state of a previously created instance.
    async fn status(&self, id: &str) -> Result<InstanceState>;

    /// Re-read the instance, picking up addresses assigned after launch.
    async fn describe(&self, id: &str) -> Result<Instance>;
}

/// DNS record operations against the configured zone.
#[async_trait]
pub trait DnsService: Send + Sync {
    async fn record_exists(&self, name: &str, record_type: RecordType) -> Result<bool>;

    async fn create_record(
        &self,
        name: &str,
        record_type: RecordType,
        ttl: i64,
        value: &str,
    ) -> Result<()>;
}
