//! AWS backends for cumulus
//!
//! Implements `InstanceService` over EC2 and `DnsService` over Route53.
//! Region and static credentials are passed through from the relevant
//! config section; everything else uses the SDK default provider chain.

pub mod ec2;
pub mod route53;
mod session;

pub use ec2::Ec2InstanceService;
pub use route53::Route53DnsService;
