//! EC2 instance backend
//!
//! Launches a single instance via RunInstances and reads its state through
//! DescribeInstances. User data is base64-encoded as the API requires.

use crate::session::{SessionSettings, load_sdk_config};
use async_trait::async_trait;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::{
    IamInstanceProfileSpecification, InstanceStateName, InstanceType, Placement,
    RunInstancesMonitoringEnabled, ShutdownBehavior, Tenancy,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use cumulus_cloud::{
    CloudError, Instance, InstanceParams, InstanceService, InstanceState, Result,
};
use cumulus_config::{Config, Section};

pub struct Ec2InstanceService {
    client: aws_sdk_ec2::Client,
}

impl Ec2InstanceService {
    /// Build an EC2 session from the `compute` section.
    pub async fn from_config(config: &Config) -> Ec2InstanceService {
        let settings = SessionSettings::from_config(config, Section::Compute);
        let sdk_config = load_sdk_config(&settings).await;
        Ec2InstanceService {
            client: aws_sdk_ec2::Client::new(&sdk_config),
        }
    }

    async fn find_instance(&self, id: &str) -> Result<aws_sdk_ec2::types::Instance> {
        let output = self
            .client
            .describe_instances()
            .instance_ids(id)
            .send()
            .await
            .map_err(|e| CloudError::Api(DisplayErrorContext(e).to_string()))?;

        output
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .next()
            .cloned()
            .ok_or_else(|| CloudError::Api(format!("instance not found: {id}")))
    }
}

#[async_trait]
impl InstanceService for Ec2InstanceService {
    async fn create(&self, params: &InstanceParams) -> Result<Instance> {
        let image_id = params.image_id.as_deref().ok_or_else(|| {
            CloudError::InvalidConfig("compute: no image_id configured".to_string())
        })?;

        let mut request = self
            .client
            .run_instances()
            .image_id(image_id)
            .min_count(1)
            .max_count(1);

        if let Some(instance_type) = &params.instance_type {
            request = request.instance_type(InstanceType::from(instance_type.as_str()));
        }
        if let Some(key_name) = &params.key_name {
            request = request.key_name(key_name);
        }
        for group in &params.security_groups {
            request = request.security_groups(group);
        }
        for group_id in &params.security_group_ids {
            request = request.security_group_ids(group_id);
        }
        if let Some(subnet) = &params.subnet {
            request = request.subnet_id(subnet);
        }
        if let Some(private_ip) = &params.private_ip_address {
            request = request.private_ip_address(private_ip);
        }
        if let Some(profile) = &params.iam_instance_profile {
            request = request.iam_instance_profile(
                IamInstanceProfileSpecification::builder()
                    .name(profile)
                    .build(),
            );
        }
        if let Some(enabled) = params.monitoring_enabled {
            request = request.monitoring(
                RunInstancesMonitoringEnabled::builder()
                    .enabled(enabled)
                    .build()
                    .map_err(|e| CloudError::Api(e.to_string()))?,
            );
        }
        if let Some(disable) = params.disable_api_termination {
            request = request.disable_api_termination(disable);
        }
        if let Some(behavior) = &params.instance_initiated_shutdown_behavior {
            request = request
                .instance_initiated_shutdown_behavior(ShutdownBehavior::from(behavior.as_str()));
        }
        if let Some(optimized) = params.ebs_optimized {
            request = request.ebs_optimized(optimized);
        }
        if params.availability_zone.is_some() || params.dedicated_tenancy == Some(true) {
            let mut placement = Placement::builder();
            if let Some(zone) = &params.availability_zone {
                placement = placement.availability_zone(zone);
            }
            if params.dedicated_tenancy == Some(true) {
                placement = placement.tenancy(Tenancy::Dedicated);
            }
            request = request.placement(placement.build());
        }
        if let Some(user_data) = &params.user_data {
            if !user_data.is_empty() {
                request = request.user_data(BASE64.encode(user_data));
            }
        }

        let output = request
            .send()
            .await
            .map_err(|e| CloudError::InstanceCreation(DisplayErrorContext(e).to_string()))?;

        let instance = output
            .instances()
            .first()
            .ok_or_else(|| {
                CloudError::InstanceCreation("provider returned no instances".to_string())
            })?;

        tracing::info!(id = instance.instance_id(), "instance created");
        Ok(convert_instance(instance))
    }

    async fn status(&self, id: &str) -> Result<InstanceState> {
        let instance = self.find_instance(id).await?;
        Ok(convert_state(&instance))
    }

    async fn describe(&self, id: &str) -> Result<Instance> {
        let instance = self.find_instance(id).await?;
        Ok(convert_instance(&instance))
    }
}

fn convert_state(instance: &aws_sdk_ec2::types::Instance) -> InstanceState {
    match instance.state().and_then(|s| s.name()) {
        Some(InstanceStateName::Pending) | None => InstanceState::Pending,
        Some(InstanceStateName::Running) => InstanceState::Running,
        Some(other) => InstanceState::Terminal(other.as_str().to_string()),
    }
}

fn convert_instance(instance: &aws_sdk_ec2::types::Instance) -> Instance {
    Instance {
        id: instance.instance_id().unwrap_or_default().to_string(),
        state: convert_state(instance),
        public_ip: instance.public_ip_address().map(str::to_string),
        private_ip: instance.private_ip_address().map(str::to_string),
        public_dns_name: instance
            .public_dns_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string),
        private_dns_name: instance
            .private_dns_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string),
    }
}
