//! Bounded wait for an instance to reach the running state
//!
//! Polls on a fixed interval with a hard attempt limit. A terminal state
//! other than running fails immediately; exhausting the attempts fails with
//! a timeout. There is no unbounded wait path.

use crate::error::{CloudError, Result};
use crate::instance::InstanceState;
use crate::provider::InstanceService;
use std::time::Duration;
use tokio::time::sleep;

/// Polling parameters for the running-state wait.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        // 2s * 150 = five minutes, comfortably above a normal EC2 launch.
        Self {
            interval: Duration::from_secs(2),
            max_attempts: 150,
        }
    }
}

/// Wait until the instance reports running.
pub async fn wait_for_running(
    service: &dyn InstanceService,
    id: &str,
    config: &PollConfig,
) -> Result<()> {
    for attempt in 0..config.max_attempts {
        match service.status(id).await? {
            InstanceState::Running => {
                tracing::debug!(id, attempt, "instance is running");
                return Ok(());
            }
            InstanceState::Pending => {
                tracing::trace!(id, attempt, "instance still pending");
            }
            InstanceState::Terminal(label) => {
                return Err(CloudError::LaunchFailed {
                    id: id.to_string(),
                    state: label,
                });
            }
        }

        if attempt + 1 < config.max_attempts {
            sleep(config.interval).await;
        }
    }

    Err(CloudError::Timeout {
        id: id.to_string(),
        attempts: config.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Instance;
    use crate::params::InstanceParams;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedStatus {
        states: Vec<InstanceState>,
        calls: AtomicUsize,
    }

    impl ScriptedStatus {
        fn new(states: Vec<InstanceState>) -> Self {
            Self {
                states,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl InstanceService for ScriptedStatus {
        async fn create(&self, _params: &InstanceParams) -> Result<Instance> {
            unimplemented!("not used by the waiter")
        }

        async fn status(&self, _id: &str) -> Result<InstanceState> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let state = self
                .states
                .get(call)
                .cloned()
                .unwrap_or_else(|| self.states.last().cloned().unwrap());
            Ok(state)
        }

        async fn describe(&self, _id: &str) -> Result<Instance> {
            unimplemented!("not used by the waiter")
        }
    }

    fn fast_poll(max_attempts: u32) -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(1),
            max_attempts,
        }
    }

    #[tokio::test]
    async fn test_pending_then_running() {
        let service = ScriptedStatus::new(vec![
            InstanceState::Pending,
            InstanceState::Pending,
            InstanceState::Running,
        ]);

        wait_for_running(&service, "i-0abc", &fast_poll(10))
            .await
            .unwrap();
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_terminal_state_fails_immediately() {
        let service = ScriptedStatus::new(vec![
            InstanceState::Pending,
            InstanceState::Terminal("terminated".into()),
        ]);

        let err = wait_for_running(&service, "i-0abc", &fast_poll(10))
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::LaunchFailed { state, .. } if state == "terminated"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_when_never_running() {
        let service = ScriptedStatus::new(vec![InstanceState::Pending]);

        let err = wait_for_running(&service, "i-0abc", &fast_poll(5))
            .await
            .unwrap_err();
        assert!(matches!(err, CloudError::Timeout { attempts: 5, .. }));
        assert_eq!(service.calls.load(Ordering::SeqCst), 5);
    }
}
