//! Shared AWS SDK session setup
//!
//! Region and static credentials are read from a config section (with the
//! usual `common` fallback) and passed through to the SDK loader. Anything
//! not configured falls back to the SDK's default provider chain.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use cumulus_config::{Config, Section};

#[derive(Debug, Clone, Default)]
pub(crate) struct SessionSettings {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl SessionSettings {
    pub fn from_config(config: &Config, section: Section) -> Self {
        Self {
            region: config.get_str(section, "region"),
            access_key_id: config.get_str(section, "access_key_id"),
            secret_access_key: config.get_str(section, "secret_access_key"),
        }
    }
}

pub(crate) async fn load_sdk_config(settings: &SessionSettings) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let (Some(key), Some(secret)) = (
        &settings.access_key_id,
        &settings.secret_access_key,
    ) {
        tracing::debug!("using static credentials from config");
        let credentials = aws_sdk_ec2::config::Credentials::new(
            key.as_str(),
            secret.as_str(),
            None,
            None,
            "cumulus-config",
        );
        loader = loader.credentials_provider(credentials);
    }

    loader.load().await
}
