//! Compute instance model

use serde::{Deserialize, Serialize};

/// Lifecycle state of a compute instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    Pending,
    Running,
    /// Any other provider-reported state. Terminal for our purposes: an
    /// instance that leaves pending without reaching running will not
    /// recover within a provisioning run.
    Terminal(String),
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceState::Pending => write!(f, "pending"),
            InstanceState::Running => write!(f, "running"),
            InstanceState::Terminal(label) => write!(f, "{label}"),
        }
    }
}

/// A created compute instance, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub state: InstanceState,
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
    pub public_dns_name: Option<String>,
    pub private_dns_name: Option<String>,
}

impl Instance {
    /// Best public address for DNS registration: IP first, then the
    /// provider's DNS name. VPC instances may have neither.
    pub fn public_address(&self) -> Option<&str> {
        self.public_ip
            .as_deref()
            .or(self.public_dns_name.as_deref())
    }

    /// Best private address for DNS registration.
    pub fn private_address(&self) -> Option<&str> {
        self.private_ip
            .as_deref()
            .or(self.private_dns_name.as_deref())
    }
}
