//! Layered configuration for cumulus
//!
//! Loads the YAML config file, merges CLI overrides with documented
//! precedence, and resolves the hostname/domain identity used for DNS
//! record creation.

pub mod error;
pub mod identity;
pub mod model;
pub mod overrides;

pub use error::{ConfigError, Result};
pub use identity::{DnsRecord, DnsRecordPair, IdentityDiagnostic, ResolvedIdentity};
pub use model::{CliOverrides, Config, Section, SectionMap, value_to_string};
pub use overrides::parse_override_expr;
