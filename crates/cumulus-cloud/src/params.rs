//! Instance launch parameters
//!
//! Typed view over the `compute` config section. Every key honors the
//! `common` fallback. Only the parameters the provider actually forwards
//! are represented; unknown section keys are ignored.

use cumulus_config::{Config, Section, value_to_string};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceParams {
    pub region: Option<String>,
    pub image_id: Option<String>,
    pub instance_type: Option<String>,
    pub key_name: Option<String>,
    pub availability_zone: Option<String>,
    pub iam_instance_profile: Option<String>,
    pub security_groups: Vec<String>,
    pub security_group_ids: Vec<String>,
    pub subnet: Option<String>,
    pub private_ip_address: Option<String>,
    pub instance_initiated_shutdown_behavior: Option<String>,
    pub monitoring_enabled: Option<bool>,
    pub disable_api_termination: Option<bool>,
    pub dedicated_tenancy: Option<bool>,
    pub ebs_optimized: Option<bool>,
    /// Finalized cloud-init payload, set after user data resolution.
    pub user_data: Option<String>,
}

impl InstanceParams {
    pub fn from_config(config: &Config) -> InstanceParams {
        let s = Section::Compute;
        InstanceParams {
            region: config.get_str(s, "region"),
            image_id: config.get_str(s, "image_id"),
            instance_type: config.get_str(s, "instance_type"),
            key_name: config.get_str(s, "key_name"),
            availability_zone: config.get_str(s, "availability_zone"),
            iam_instance_profile: config.get_str(s, "iam_instance_profile"),
            security_groups: get_list(config, "security_groups"),
            security_group_ids: get_list(config, "security_group_ids"),
            subnet: config.get_str(s, "subnet"),
            private_ip_address: config.get_str(s, "private_ip_address"),
            instance_initiated_shutdown_behavior: config
                .get_str(s, "instance_initiated_shutdown_behavior"),
            monitoring_enabled: config.get_bool(s, "monitoring_enabled"),
            disable_api_termination: config.get_bool(s, "disable_api_termination"),
            dedicated_tenancy: config.get_bool(s, "dedicated_tenancy"),
            ebs_optimized: config.get_bool(s, "ebs_optimized"),
            user_data: None,
        }
    }
}

/// List-valued keys accept a YAML sequence or a comma-separated string.
fn get_list(config: &Config, key: &str) -> Vec<String> {
    match config.get(Section::Compute, key) {
        Some(Value::Array(items)) => items.iter().map(value_to_string).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
