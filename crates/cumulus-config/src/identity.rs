//! Hostname/domain resolution and DNS alias derivation
//!
//! The effective hostname and domain are picked by scanning the
//! `template_variables` and `dns` sections in that order; each key is
//! resolved independently and the last section that defines it wins. Both
//! lookups honor the `common` fallback. DNS aliases are derived once when
//! both values are known; a missing half downgrades DNS integration to a
//! no-op with a warning, never an error.

use crate::model::{Config, Section, value_to_string};

const SCAN_ORDER: [Section; 2] = [Section::TemplateVariables, Section::Dns];

/// The hostname/domain pair in effect for a provisioning run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedIdentity {
    pub hostname: Option<String>,
    pub domain: Option<String>,
}

/// Which parts of the identity were found. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityDiagnostic {
    BothFound,
    HostnameOnly,
    DomainOnly,
    NeitherFound,
}

impl std::fmt::Display for IdentityDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentityDiagnostic::BothFound => write!(f, "hostname and domain found"),
            IdentityDiagnostic::HostnameOnly => {
                write!(f, "hostname found but domain missing, DNS records will not be created")
            }
            IdentityDiagnostic::DomainOnly => {
                write!(f, "domain found but hostname missing, DNS records will not be created")
            }
            IdentityDiagnostic::NeitherFound => {
                write!(f, "hostname and domain missing, DNS records will not be created")
            }
        }
    }
}

impl ResolvedIdentity {
    /// Resolve hostname and domain from the config sections.
    pub fn resolve(config: &Config) -> ResolvedIdentity {
        let mut identity = ResolvedIdentity::default();

        for section in SCAN_ORDER {
            if let Some(value) = config.get(section, "hostname") {
                identity.hostname = Some(value_to_string(value));
            }
            if let Some(value) = config.get(section, "domain") {
                identity.domain = Some(value_to_string(value));
            }
        }

        let diagnostic = identity.diagnostic();
        match diagnostic {
            IdentityDiagnostic::BothFound => tracing::debug!(
                hostname = identity.hostname.as_deref(),
                domain = identity.domain.as_deref(),
                "resolved identity"
            ),
            other => tracing::warn!("{other}"),
        }

        identity
    }

    pub fn diagnostic(&self) -> IdentityDiagnostic {
        match (&self.hostname, &self.domain) {
            (Some(_), Some(_)) => IdentityDiagnostic::BothFound,
            (Some(_), None) => IdentityDiagnostic::HostnameOnly,
            (None, Some(_)) => IdentityDiagnostic::DomainOnly,
            (None, None) => IdentityDiagnostic::NeitherFound,
        }
    }
}

/// A DNS record to be created for the instance.
///
/// The alias is fixed at derivation time; the target is set once after the
/// instance is running.
#[derive(Debug, Clone, PartialEq)]
pub struct DnsRecord {
    alias: String,
    target: Option<String>,
}

impl DnsRecord {
    fn new(alias: String) -> Self {
        Self { alias, target: None }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Set the record target. Write-once: later calls are ignored.
    pub fn set_target(&mut self, target: impl Into<String>) {
        if self.target.is_none() {
            self.target = Some(target.into());
        }
    }
}

/// The public/private alias pair derived from a resolved identity.
#[derive(Debug, Clone, PartialEq)]
pub struct DnsRecordPair {
    pub public: DnsRecord,
    pub private: DnsRecord,
}

impl DnsRecordPair {
    /// Derive the alias pair, or `None` when either half of the identity is
    /// missing.
    pub fn from_identity(identity: &ResolvedIdentity) -> Option<DnsRecordPair> {
        let hostname = identity.hostname.as_deref()?;
        let domain = identity.domain.as_deref()?;

        Some(DnsRecordPair {
            public: DnsRecord::new(format!("{hostname}.{domain}.")),
            private: DnsRecord::new(format!("{hostname}-private.{domain}.")),
        })
    }

    pub fn aliases(&self) -> [&str; 2] {
        [self.public.alias(), self.private.alias()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(dns: &[(&str, &str)], template_vars: &[(&str, &str)]) -> Config {
        let mut config = Config::default();
        for (k, v) in dns {
            config.dns.insert(k.to_string(), (*v).into());
        }
        for (k, v) in template_vars {
            config.template_variables.insert(k.to_string(), (*v).into());
        }
        config
    }

    #[test]
    fn test_neither_found() {
        let identity = ResolvedIdentity::resolve(&Config::default());
        assert_eq!(identity, ResolvedIdentity::default());
        assert_eq!(identity.diagnostic(), IdentityDiagnostic::NeitherFound);
        assert!(DnsRecordPair::from_identity(&identity).is_none());
    }

    #[test]
    fn test_dns_section_wins_over_template_variables() {
        let config = config_with(
            &[("hostname", "from-dns"), ("domain", "dns.test")],
            &[("hostname", "from-tpl"), ("domain", "tpl.test")],
        );

        let identity = ResolvedIdentity::resolve(&config);
        assert_eq!(identity.hostname.as_deref(), Some("from-dns"));
        assert_eq!(identity.domain.as_deref(), Some("dns.test"));
    }

    #[test]
    fn test_keys_resolve_independently() {
        let config = config_with(&[("domain", "dns.test")], &[("hostname", "web1")]);

        let identity = ResolvedIdentity::resolve(&config);
        assert_eq!(identity.hostname.as_deref(), Some("web1"));
        assert_eq!(identity.domain.as_deref(), Some("dns.test"));
        assert_eq!(identity.diagnostic(), IdentityDiagnostic::BothFound);
    }

    #[test]
    fn test_common_fallback_applies() {
        let mut config = Config::default();
        config.common.insert("domain".into(), "shared.test".into());
        config.template_variables.insert("hostname".into(), "web1".into());

        let identity = ResolvedIdentity::resolve(&config);
        assert_eq!(identity.domain.as_deref(), Some("shared.test"));
        assert_eq!(identity.hostname.as_deref(), Some("web1"));
    }

    #[test]
    fn test_partial_identity_is_a_warning_not_an_error() {
        let config = config_with(&[("hostname", "web1")], &[]);
        let identity = ResolvedIdentity::resolve(&config);

        assert_eq!(identity.diagnostic(), IdentityDiagnostic::HostnameOnly);
        assert!(DnsRecordPair::from_identity(&identity).is_none());
    }

    #[test]
    fn test_alias_derivation() {
        let identity = ResolvedIdentity {
            hostname: Some("web1".into()),
            domain: Some("example.com".into()),
        };

        let pair = DnsRecordPair::from_identity(&identity).unwrap();
        assert_eq!(pair.public.alias(), "web1.example.com.");
        assert_eq!(pair.private.alias(), "web1-private.example.com.");
        assert!(pair.public.target().is_none());
        assert!(pair.private.target().is_none());
    }

    #[test]
    fn test_target_is_write_once() {
        let identity = ResolvedIdentity {
            hostname: Some("web1".into()),
            domain: Some("example.com".into()),
        };

        let mut pair = DnsRecordPair::from_identity(&identity).unwrap();
        pair.public.set_target("1.2.3.4");
        pair.public.set_target("5.6.7.8");
        assert_eq!(pair.public.target(), Some("1.2.3.4"));
    }
}
