//! Route53 DNS backend
//!
//! Existence checks use a one-item ListResourceRecordSets scan starting at
//! the queried name; creation goes through ChangeResourceRecordSets with a
//! single Create change.

use crate::session::{SessionSettings, load_sdk_config};
use async_trait::async_trait;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use cumulus_cloud::{CloudError, DnsService, RecordType, Result};
use cumulus_config::{Config, ConfigError, Section};

pub struct Route53DnsService {
    client: aws_sdk_route53::Client,
    zone_id: String,
}

impl Route53DnsService {
    /// Build a Route53 session from the `dns` section. Requires `zone`.
    pub async fn from_config(
        config: &Config,
    ) -> std::result::Result<Route53DnsService, ConfigError> {
        let zone_id = config
            .get_str(Section::Dns, "zone")
            .ok_or(ConfigError::MissingDnsKey { key: "zone" })?;

        let settings = SessionSettings::from_config(config, Section::Dns);
        let sdk_config = load_sdk_config(&settings).await;

        Ok(Route53DnsService {
            client: aws_sdk_route53::Client::new(&sdk_config),
            zone_id,
        })
    }
}

fn rr_type(record_type: RecordType) -> RrType {
    match record_type {
        RecordType::A => RrType::A,
        RecordType::Cname => RrType::Cname,
    }
}

/// Route53 reports record names with a trailing dot.
fn normalize(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    }
}

#[async_trait]
impl DnsService for Route53DnsService {
    async fn record_exists(&self, name: &str, record_type: RecordType) -> Result<bool> {
        let wanted = normalize(name);
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(&self.zone_id)
            .start_record_name(&wanted)
            .start_record_type(rr_type(record_type))
            .max_items(1)
            .send()
            .await
            .map_err(|e| CloudError::Api(DisplayErrorContext(e).to_string()))?;

        let exists = output.resource_record_sets().iter().any(|record_set| {
            normalize(record_set.name()) == wanted && *record_set.r#type() == rr_type(record_type)
        });

        tracing::debug!(name = %wanted, %record_type, exists, "record existence check");
        Ok(exists)
    }

    async fn create_record(
        &self,
        name: &str,
        record_type: RecordType,
        ttl: i64,
        value: &str,
    ) -> Result<()> {
        let record = ResourceRecord::builder()
            .value(value)
            .build()
            .map_err(|e| CloudError::Api(e.to_string()))?;

        let record_set = ResourceRecordSet::builder()
            .name(normalize(name))
            .r#type(rr_type(record_type))
            .ttl(ttl)
            .resource_records(record)
            .build()
            .map_err(|e| CloudError::Api(e.to_string()))?;

        let change = Change::builder()
            .action(ChangeAction::Create)
            .resource_record_set(record_set)
            .build()
            .map_err(|e| CloudError::Api(e.to_string()))?;

        let batch = ChangeBatch::builder()
            .changes(change)
            .build()
            .map_err(|e| CloudError::Api(e.to_string()))?;

        self.client
            .change_resource_record_sets()
            .hosted_zone_id(&self.zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| CloudError::Api(DisplayErrorContext(e).to_string()))?;

        tracing::info!(name = %normalize(name), %record_type, ttl, value, "record created");
        Ok(())
    }
}
