//! Provisioning state machine
//!
//! Drives a single run end to end: finalize user data, pre-flight the DNS
//! aliases, create the instance, wait for running, register records, and
//! summarize. The pre-flight check runs before the instance exists so a
//! taken DNS name never leaves an instance behind; any failure after
//! creation is wrapped with the instance id instead.

use crate::context::RunContext;
use crate::error::{ProvisionError, Result};
use crate::summary::ProvisionSummary;
use cumulus_cloud::{
    CloudError, DnsService, Instance, InstanceParams, InstanceService, PollConfig, RecordType,
    wait_for_running,
};
use cumulus_config::DnsRecordPair;
use std::sync::Arc;

/// Phases of a provisioning run, in order. Used for progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configuring,
    Resolving,
    Templating,
    CheckingDns,
    Creating,
    AwaitingRunning,
    UpdatingDns,
    Summarizing,
    Done,
    Aborted,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Phase::Configuring => "configuring",
            Phase::Resolving => "resolving",
            Phase::Templating => "templating",
            Phase::CheckingDns => "checking-dns",
            Phase::Creating => "creating",
            Phase::AwaitingRunning => "awaiting-running",
            Phase::UpdatingDns => "updating-dns",
            Phase::Summarizing => "summarizing",
            Phase::Done => "done",
            Phase::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

pub struct Orchestrator {
    instances: Arc<dyn InstanceService>,
    dns: Option<Arc<dyn DnsService>>,
    poll: PollConfig,
}

impl Orchestrator {
    pub fn new(
        instances: Arc<dyn InstanceService>,
        dns: Option<Arc<dyn DnsService>>,
        poll: PollConfig,
    ) -> Orchestrator {
        Orchestrator {
            instances,
            dns,
            poll,
        }
    }

    /// Run the full provisioning sequence.
    pub async fn run(&self, ctx: &RunContext) -> Result<ProvisionSummary> {
        let result = self.run_inner(ctx).await;
        if let Err(error) = &result {
            tracing::error!(phase = %Phase::Aborted, %error, "provisioning aborted");
        }
        result
    }

    async fn run_inner(&self, ctx: &RunContext) -> Result<ProvisionSummary> {
        // Templating: finalize the user data payload before touching any API.
        enter(Phase::Templating);
        let user_data = cumulus_userdata::resolve_user_data(
            &ctx.config,
            ctx.template_variables_override.as_ref(),
        )?;

        let mut records = ctx.records.clone();
        let dns = match &records {
            Some(_) => {
                ctx.config.validate_dns()?;
                Some(self.dns.as_deref().ok_or_else(|| {
                    CloudError::InvalidConfig(
                        "DNS records planned but no DNS service configured".to_string(),
                    )
                })?)
            }
            None => {
                tracing::debug!("hostname/domain not resolved, DNS integration disabled");
                None
            }
        };

        // CheckingDns: refuse to create an instance whose name is taken.
        if let (Some(records), Some(dns)) = (&records, dns) {
            enter(Phase::CheckingDns);
            for alias in records.aliases() {
                if dns.record_exists(alias, RecordType::A).await? {
                    return Err(ProvisionError::DnsRecordConflict {
                        alias: alias.to_string(),
                    });
                }
            }
        }

        // Creating: single attempt, no retry.
        enter(Phase::Creating);
        let mut params = InstanceParams::from_config(&ctx.config);
        params.user_data = Some(user_data.clone());
        let instance = self.instances.create(&params).await?;

        // From here on the instance exists; wrap failures with its id.
        match self
            .after_create(ctx, instance.clone(), &mut records, dns)
            .await
        {
            Ok(instance) => {
                enter(Phase::Done);
                Ok(ProvisionSummary {
                    instance,
                    records,
                    user_data,
                })
            }
            Err(source) => Err(ProvisionError::OrphanedInstance {
                instance_id: instance.id,
                source: Box::new(source),
            }),
        }
    }

    async fn after_create(
        &self,
        ctx: &RunContext,
        instance: Instance,
        records: &mut Option<DnsRecordPair>,
        dns: Option<&dyn DnsService>,
    ) -> Result<Instance> {
        enter(Phase::AwaitingRunning);
        wait_for_running(self.instances.as_ref(), &instance.id, &self.poll).await?;

        // Addresses are often assigned only once the instance is running.
        let instance = self.instances.describe(&instance.id).await?;

        if let (Some(records), Some(dns)) = (records.as_mut(), dns) {
            enter(Phase::UpdatingDns);
            self.update_dns(ctx, &instance, records, dns).await?;
        }

        enter(Phase::Summarizing);
        Ok(instance)
    }

    async fn update_dns(
        &self,
        ctx: &RunContext,
        instance: &Instance,
        records: &mut DnsRecordPair,
        dns: &dyn DnsService,
    ) -> Result<()> {
        if let Some(address) = instance.public_address() {
            records.public.set_target(address);
        } else {
            tracing::warn!(
                alias = records.public.alias(),
                "instance has no public address, public record will be skipped"
            );
        }
        if let Some(address) = instance.private_address() {
            records.private.set_target(address);
        }

        // Re-check for a race: someone may have claimed an alias between the
        // pre-flight check and now.
        for alias in records.aliases() {
            if dns.record_exists(alias, RecordType::A).await? {
                return Err(CloudError::RecordConflict {
                    alias: alias.to_string(),
                }
                .into());
            }
        }

        let ttl = ctx.config.dns_ttl()?;
        for record in [&records.public, &records.private] {
            let Some(target) = record.target() else {
                continue;
            };
            dns.create_record(record.alias(), RecordType::A, ttl, target)
                .await?;
        }

        Ok(())
    }
}

fn enter(phase: Phase) {
    tracing::info!(phase = %phase, "entering phase");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cumulus_cloud::InstanceState;
    use cumulus_config::Config;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubInstances {
        instance: Instance,
        create_calls: AtomicUsize,
    }

    impl StubInstances {
        fn running(public_ip: Option<&str>) -> StubInstances {
            StubInstances {
                instance: Instance {
                    id: "i-0abc".into(),
                    state: InstanceState::Running,
                    public_ip: public_ip.map(str::to_string),
                    private_ip: Some("10.0.0.4".into()),
                    public_dns_name: None,
                    private_dns_name: None,
                },
                create_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl InstanceService for StubInstances {
        async fn create(&self, _params: &InstanceParams) -> cumulus_cloud::Result<Instance> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.instance.clone())
        }

        async fn status(&self, _id: &str) -> cumulus_cloud::Result<InstanceState> {
            Ok(self.instance.state.clone())
        }

        async fn describe(&self, _id: &str) -> cumulus_cloud::Result<Instance> {
            Ok(self.instance.clone())
        }
    }

    struct StubDns {
        /// record_exists returns true once this many calls have been made.
        exists_after: usize,
        exist_calls: AtomicUsize,
        created: Mutex<Vec<(String, i64, String)>>,
    }

    impl StubDns {
        fn empty() -> StubDns {
            StubDns {
                exists_after: usize::MAX,
                exist_calls: AtomicUsize::new(0),
                created: Mutex::new(Vec::new()),
            }
        }

        fn existing() -> StubDns {
            StubDns {
                exists_after: 0,
                ..StubDns::empty()
            }
        }
    }

    #[async_trait]
    impl DnsService for StubDns {
        async fn record_exists(
            &self,
            _name: &str,
            _record_type: RecordType,
        ) -> cumulus_cloud::Result<bool> {
            let call = self.exist_calls.fetch_add(1, Ordering::SeqCst);
            Ok(call >= self.exists_after)
        }

        async fn create_record(
            &self,
            name: &str,
            _record_type: RecordType,
            ttl: i64,
            value: &str,
        ) -> cumulus_cloud::Result<()> {
            self.created
                .lock()
                .unwrap()
                .push((name.to_string(), ttl, value.to_string()));
            Ok(())
        }
    }

    fn dns_config() -> Config {
        let mut config = Config::default();
        config.dns.insert("hostname".into(), "api".into());
        config.dns.insert("domain".into(), "internal.test".into());
        config.dns.insert("zone".into(), "Z1".into());
        config.dns.insert("ttl".into(), 300.into());
        config
    }

    fn fast_poll() -> PollConfig {
        PollConfig {
            interval: std::time::Duration::from_millis(1),
            max_attempts: 5,
        }
    }

    fn orchestrator(
        instances: Arc<StubInstances>,
        dns: Option<Arc<StubDns>>,
    ) -> Orchestrator {
        Orchestrator::new(
            instances,
            dns.map(|d| d as Arc<dyn DnsService>),
            fast_poll(),
        )
    }

    #[tokio::test]
    async fn test_preflight_conflict_aborts_before_create() {
        let instances = Arc::new(StubInstances::running(Some("1.2.3.4")));
        let dns = Arc::new(StubDns::existing());
        let ctx = RunContext::new(dns_config(), false);

        let err = orchestrator(instances.clone(), Some(dns))
            .run(&ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::DnsRecordConflict { .. }));
        assert_eq!(instances.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_creates_both_records() {
        let instances = Arc::new(StubInstances::running(Some("1.2.3.4")));
        let dns = Arc::new(StubDns::empty());
        let ctx = RunContext::new(dns_config(), false);

        let summary = orchestrator(instances.clone(), Some(dns.clone()))
            .run(&ctx)
            .await
            .unwrap();

        let created = dns.created.lock().unwrap();
        assert_eq!(
            *created,
            vec![
                ("api.internal.test.".to_string(), 300, "1.2.3.4".to_string()),
                (
                    "api-private.internal.test.".to_string(),
                    300,
                    "10.0.0.4".to_string()
                ),
            ]
        );

        let text = summary.to_string();
        assert!(text.contains("i-0abc"));
        assert!(text.contains("api.internal.test."));
        assert!(text.contains("api-private.internal.test."));
    }

    #[tokio::test]
    async fn test_run_without_identity_skips_dns_entirely() {
        let instances = Arc::new(StubInstances::running(Some("1.2.3.4")));
        let dns = Arc::new(StubDns::empty());
        let ctx = RunContext::new(Config::default(), false);

        let summary = orchestrator(instances.clone(), Some(dns.clone()))
            .run(&ctx)
            .await
            .unwrap();

        assert_eq!(dns.exist_calls.load(Ordering::SeqCst), 0);
        assert!(dns.created.lock().unwrap().is_empty());
        assert!(summary.records.is_none());
        assert_eq!(instances.create_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_race_conflict_reports_orphaned_instance() {
        let instances = Arc::new(StubInstances::running(Some("1.2.3.4")));
        // Pre-flight (two aliases) passes, the re-check hits a conflict.
        let dns = Arc::new(StubDns {
            exists_after: 2,
            ..StubDns::empty()
        });
        let ctx = RunContext::new(dns_config(), false);

        let err = orchestrator(instances, Some(dns.clone()))
            .run(&ctx)
            .await
            .unwrap_err();

        match err {
            ProvisionError::OrphanedInstance {
                instance_id,
                source,
            } => {
                assert_eq!(instance_id, "i-0abc");
                assert!(matches!(
                    *source,
                    ProvisionError::Cloud(CloudError::RecordConflict { .. })
                ));
            }
            other => panic!("expected orphaned instance error, got: {other}"),
        }
        assert!(dns.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_zone_fails_before_any_api_call() {
        let instances = Arc::new(StubInstances::running(Some("1.2.3.4")));
        let dns = Arc::new(StubDns::empty());
        let mut config = dns_config();
        config.dns.remove("zone");
        let ctx = RunContext::new(config, false);

        let err = orchestrator(instances.clone(), Some(dns.clone()))
            .run(&ctx)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::Config(_)));
        assert_eq!(dns.exist_calls.load(Ordering::SeqCst), 0);
        assert_eq!(instances.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_instance_without_public_address_skips_public_record() {
        let instances = Arc::new(StubInstances::running(None));
        let dns = Arc::new(StubDns::empty());
        let ctx = RunContext::new(dns_config(), false);

        let summary = orchestrator(instances, Some(dns.clone()))
            .run(&ctx)
            .await
            .unwrap();

        let created = dns.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].0, "api-private.internal.test.");

        let records = summary.records.as_ref().unwrap();
        assert!(records.public.target().is_none());
        assert_eq!(records.private.target(), Some("10.0.0.4"));
    }

    #[tokio::test]
    async fn test_launch_failure_reports_orphaned_instance() {
        let mut stub = StubInstances::running(Some("1.2.3.4"));
        stub.instance.state = InstanceState::Terminal("terminated".into());
        let instances = Arc::new(stub);
        let ctx = RunContext::new(Config::default(), false);

        let err = orchestrator(instances, None).run(&ctx).await.unwrap_err();

        match err {
            ProvisionError::OrphanedInstance { source, .. } => {
                assert!(matches!(
                    *source,
                    ProvisionError::Cloud(CloudError::LaunchFailed { .. })
                ));
            }
            other => panic!("expected orphaned instance error, got: {other}"),
        }
    }
}
