//! Configuration model and merge rules
//!
//! A config file is a YAML document of named sections, each a flat map of
//! keys to values. Every section inherits keys from `common` unless it
//! defines its own value for that key (section overrides common). Lookups
//! resolve the fallback; the merge never copies `common` into other
//! sections, so merging with no overrides leaves the config untouched.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// A single config section: key to YAML/JSON value.
pub type SectionMap = BTreeMap<String, Value>;

/// Recognized config sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Common,
    General,
    Compute,
    Dns,
    TemplateVariables,
    UserDataTemplate,
}

impl Section {
    pub fn name(&self) -> &'static str {
        match self {
            Section::Common => "common",
            Section::General => "general",
            Section::Compute => "compute",
            Section::Dns => "dns",
            Section::TemplateVariables => "template_variables",
            Section::UserDataTemplate => "user_data_template",
        }
    }
}

/// Layered configuration for a provisioning run.
///
/// `ec2` and `route53` are accepted as section names for compatibility with
/// older config files and map onto `compute` and `dns`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub common: SectionMap,

    #[serde(default)]
    pub general: SectionMap,

    #[serde(default, alias = "ec2")]
    pub compute: SectionMap,

    #[serde(default, alias = "route53")]
    pub dns: SectionMap,

    #[serde(default)]
    pub template_variables: SectionMap,

    #[serde(default)]
    pub user_data_template: SectionMap,
}

/// CLI-supplied overrides, applied on top of the config file.
///
/// Bulk maps come from `--*-variables` expressions; convenience flags each
/// set exactly one key and are applied last so they always win.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub common: Option<SectionMap>,
    pub general: Option<SectionMap>,
    pub compute: Option<SectionMap>,
    pub dns: Option<SectionMap>,
    pub template_variables: Option<SectionMap>,

    /// Convenience flags targeting the compute section (e.g. `--image-id`).
    pub compute_flags: SectionMap,

    /// Convenience flags targeting the user_data_template section.
    pub user_data_template_flags: SectionMap,
}

impl CliOverrides {
    pub fn is_empty(&self) -> bool {
        self.common.is_none()
            && self.general.is_none()
            && self.compute.is_none()
            && self.dns.is_none()
            && self.template_variables.is_none()
            && self.compute_flags.is_empty()
            && self.user_data_template_flags.is_empty()
    }
}

impl Config {
    /// Load a config file from disk.
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let config: Config = serde_yaml::from_str(&content).map_err(|e| ConfigError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn section(&self, section: Section) -> &SectionMap {
        match section {
            Section::Common => &self.common,
            Section::General => &self.general,
            Section::Compute => &self.compute,
            Section::Dns => &self.dns,
            Section::TemplateVariables => &self.template_variables,
            Section::UserDataTemplate => &self.user_data_template,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut SectionMap {
        match section {
            Section::Common => &mut self.common,
            Section::General => &mut self.general,
            Section::Compute => &mut self.compute,
            Section::Dns => &mut self.dns,
            Section::TemplateVariables => &mut self.template_variables,
            Section::UserDataTemplate => &mut self.user_data_template,
        }
    }

    /// Look up a key in a section, falling back to `common`.
    pub fn get(&self, section: Section, key: &str) -> Option<&Value> {
        self.section(section)
            .get(key)
            .or_else(|| self.common.get(key))
    }

    /// String form of a key, with common fallback.
    pub fn get_str(&self, section: Section, key: &str) -> Option<String> {
        self.get(section, key).map(value_to_string)
    }

    /// Boolean form of a key. Accepts native booleans and "true"/"false".
    pub fn get_bool(&self, section: Section, key: &str) -> Option<bool> {
        match self.get(section, key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Apply CLI overrides, producing a new configuration.
    ///
    /// Precedence per section, lowest first: file value, bulk override map,
    /// convenience flag. `--common-variables` merges into `common` and so
    /// reaches every section through the lookup fallback.
    pub fn merge_overrides(mut self, overrides: &CliOverrides) -> Config {
        let bulk = [
            (Section::Common, &overrides.common),
            (Section::General, &overrides.general),
            (Section::Compute, &overrides.compute),
            (Section::Dns, &overrides.dns),
            (Section::TemplateVariables, &overrides.template_variables),
        ];

        for (section, map) in bulk {
            if let Some(map) = map {
                tracing::debug!(section = section.name(), keys = map.len(), "applying bulk overrides");
                self.section_mut(section)
                    .extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        // Convenience flags win over everything else.
        self.compute.extend(
            overrides
                .compute_flags
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.user_data_template.extend(
            overrides
                .user_data_template_flags
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        self
    }

    /// Check that the keys required for DNS record creation are present.
    pub fn validate_dns(&self) -> Result<()> {
        if self.get(Section::Dns, "zone").is_none() {
            return Err(ConfigError::MissingDnsKey { key: "zone" });
        }
        if self.get(Section::Dns, "ttl").is_none() {
            return Err(ConfigError::MissingDnsKey { key: "ttl" });
        }
        Ok(())
    }

    /// The configured record TTL in seconds.
    pub fn dns_ttl(&self) -> Result<i64> {
        let value = self
            .get(Section::Dns, "ttl")
            .ok_or(ConfigError::MissingDnsKey { key: "ttl" })?;

        match value {
            Value::Number(n) => n.as_i64().ok_or_else(|| ConfigError::InvalidValue {
                key: "ttl".to_string(),
                message: format!("not an integer: {n}"),
            }),
            Value::String(s) => s.parse().map_err(|_| ConfigError::InvalidValue {
                key: "ttl".to_string(),
                message: format!("not an integer: {s}"),
            }),
            other => Err(ConfigError::InvalidValue {
                key: "ttl".to_string(),
                message: format!("unexpected type: {other}"),
            }),
        }
    }
}

/// Render a config value as a plain string (unquoted for strings).
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
