//! `cumulus create`
//!
//! Turns CLI flags into config overrides, builds the run context and the
//! AWS-backed services, and hands control to the orchestrator.

use clap::Args;
use colored::Colorize;
use cumulus_cloud::{DnsService, InstanceService, PollConfig};
use cumulus_cloud_aws::{Ec2InstanceService, Route53DnsService};
use cumulus_config::{CliOverrides, Config, Result as ConfigResult, parse_override_expr};
use cumulus_provision::{Orchestrator, Phase, RunContext};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct CreateArgs {
    // user data options
    /// User data template file
    #[arg(long, value_name = "FILE")]
    pub user_data_template: Option<PathBuf>,

    /// User data template variables (JSON object or key=value list)
    #[arg(long, value_name = "EXPR")]
    pub user_data_template_variables: Option<String>,

    /// Print the finalized user data payload
    #[arg(long)]
    pub show_parsed_template: bool,

    /// Raw user data, appended to the rendered template if both are given
    #[arg(long, value_name = "STRING")]
    pub user_data: Option<String>,

    // compute convenience flags
    /// Region to launch the instance in
    #[arg(long)]
    pub region: Option<String>,

    /// ID of the image to launch
    #[arg(long)]
    pub image_id: Option<String>,

    /// Type of instance to launch, for example "m1.small"
    #[arg(long)]
    pub instance_type: Option<String>,

    /// Name of the key pair to use
    #[arg(long)]
    pub key_name: Option<String>,

    /// IAM instance profile name
    #[arg(long)]
    pub iam_instance_profile: Option<String>,

    /// Enable detailed monitoring
    #[arg(long, value_name = "BOOL")]
    pub monitoring_enabled: Option<bool>,

    /// Availability zone placement
    #[arg(long)]
    pub availability_zone: Option<String>,

    /// Security group names
    #[arg(long, value_delimiter = ',', value_name = "LIST")]
    pub security_groups: Vec<String>,

    /// Security group ids
    #[arg(long, value_delimiter = ',', value_name = "LIST")]
    pub security_group_ids: Vec<String>,

    /// Lock the instance against API termination
    #[arg(long, value_name = "BOOL")]
    pub disable_api_termination: Option<bool>,

    /// Shutdown behavior, "stop" or "terminate"
    #[arg(long)]
    pub instance_initiated_shutdown_behavior: Option<String>,

    /// Subnet to launch into
    #[arg(long)]
    pub subnet: Option<String>,

    /// Fixed private IP address
    #[arg(long)]
    pub private_ip_address: Option<String>,

    /// Launch on dedicated hardware
    #[arg(long, value_name = "BOOL")]
    pub dedicated_tenancy: Option<bool>,

    /// Enable EBS optimization
    #[arg(long, value_name = "BOOL")]
    pub ebs_optimized: Option<bool>,

    // per-section bulk overrides
    /// Common variables (JSON object or key=value list)
    #[arg(long, value_name = "EXPR")]
    pub common_variables: Option<String>,

    /// General variables
    #[arg(long, value_name = "EXPR")]
    pub general_variables: Option<String>,

    /// Compute section overrides
    #[arg(long, value_name = "EXPR", alias = "ec2-variables")]
    pub compute_variables: Option<String>,

    /// DNS section overrides
    #[arg(long, value_name = "EXPR", alias = "route53-variables")]
    pub dns_variables: Option<String>,
}

pub async fn handle(config: Config, args: &CreateArgs, verbose: bool) -> anyhow::Result<()> {
    tracing::info!(phase = %Phase::Configuring, "merging CLI overrides");
    let overrides = build_overrides(args)?;
    let template_variables = overrides.template_variables.clone();
    let config = config.merge_overrides(&overrides);

    tracing::info!(phase = %Phase::Resolving, "resolving identity");
    let ctx = RunContext::new(config, verbose).with_template_variables(template_variables);

    let instances: Arc<dyn InstanceService> =
        Arc::new(Ec2InstanceService::from_config(&ctx.config).await);
    let dns: Option<Arc<dyn DnsService>> = if ctx.dns_planned() {
        ctx.config.validate_dns()?;
        Some(Arc::new(Route53DnsService::from_config(&ctx.config).await?))
    } else {
        None
    };

    let orchestrator = Orchestrator::new(instances, dns, PollConfig::default());
    let summary = orchestrator.run(&ctx).await?;

    if args.show_parsed_template || verbose {
        println!("{}", "# --- beginning of user data ---".cyan());
        println!("{}", summary.user_data);
        println!("{}", "# --- end of user data ---".cyan());
        println!();
    }

    println!("{summary}");
    println!("{}", "✓ instance provisioned".green());
    Ok(())
}

fn build_overrides(args: &CreateArgs) -> ConfigResult<CliOverrides> {
    let parse = |expr: &Option<String>| -> ConfigResult<_> {
        expr.as_deref().map(parse_override_expr).transpose()
    };

    let mut overrides = CliOverrides {
        common: parse(&args.common_variables)?,
        general: parse(&args.general_variables)?,
        compute: parse(&args.compute_variables)?,
        dns: parse(&args.dns_variables)?,
        template_variables: parse(&args.user_data_template_variables)?,
        ..Default::default()
    };

    // Convenience flags, applied after the bulk maps so they win.
    let strings = [
        ("region", &args.region),
        ("image_id", &args.image_id),
        ("instance_type", &args.instance_type),
        ("key_name", &args.key_name),
        ("user_data", &args.user_data),
        ("iam_instance_profile", &args.iam_instance_profile),
        ("availability_zone", &args.availability_zone),
        (
            "instance_initiated_shutdown_behavior",
            &args.instance_initiated_shutdown_behavior,
        ),
        ("subnet", &args.subnet),
        ("private_ip_address", &args.private_ip_address),
    ];
    for (key, value) in strings {
        if let Some(value) = value {
            overrides
                .compute_flags
                .insert(key.to_string(), Value::String(value.clone()));
        }
    }

    let booleans = [
        ("monitoring_enabled", args.monitoring_enabled),
        ("disable_api_termination", args.disable_api_termination),
        ("dedicated_tenancy", args.dedicated_tenancy),
        ("ebs_optimized", args.ebs_optimized),
    ];
    for (key, value) in booleans {
        if let Some(value) = value {
            overrides
                .compute_flags
                .insert(key.to_string(), Value::Bool(value));
        }
    }

    if !args.security_groups.is_empty() {
        overrides.compute_flags.insert(
            "security_groups".to_string(),
            Value::Array(
                args.security_groups
                    .iter()
                    .map(|g| Value::String(g.clone()))
                    .collect(),
            ),
        );
    }
    if !args.security_group_ids.is_empty() {
        overrides.compute_flags.insert(
            "security_group_ids".to_string(),
            Value::Array(
                args.security_group_ids
                    .iter()
                    .map(|g| Value::String(g.clone()))
                    .collect(),
            ),
        );
    }

    if let Some(path) = &args.user_data_template {
        overrides.user_data_template_flags.insert(
            "file".to_string(),
            Value::String(path.to_string_lossy().into_owned()),
        );
    }

    Ok(overrides)
}
