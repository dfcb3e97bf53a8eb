use crate::scanner::ping::ReachabilityChecker;
use crate::scanner::result::{ProbeResult, Status};
use crate::target::TargetSet;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub mod ping;
pub mod result;

/// Slack granted on top of the per-probe timeout before a probe is given up.
pub const PROBE_MARGIN: Duration = Duration::from_secs(2);

/// Probes every target concurrently and collects one status per address.
pub struct ProbeEngine {
    checker: Arc<dyn ReachabilityChecker>,
    timeout: Duration,
    concurrency: Option<usize>,
    progress: ProgressBar,
}

impl ProbeEngine {
    pub fn new(checker: Arc<dyn ReachabilityChecker>, timeout: Duration) -> Self {
        Self {
            checker,
            timeout,
            concurrency: None,
            progress: ProgressBar::hidden(),
        }
    }

    /// Caps the number of probes in flight. `None` spawns all at once.
    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Returns once every address of `targets` has a status.
    pub async fn run(&self, targets: &TargetSet) -> ProbeResult {
        let semaphore = self
            .concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));
        let timeout = self.timeout;
        let deadline = timeout + PROBE_MARGIN;

        let mut pending = targets
            .iter()
            .map(|&addr| {
                let checker = self.checker.clone();
                let semaphore = semaphore.clone();
                tokio::spawn(async move {
                    let _permit = match semaphore {
                        Some(semaphore) => semaphore.acquire_owned().await.ok(),
                        None => None,
                    };
                    tokio::time::timeout(deadline, checker.is_reachable(addr, timeout)).await
                })
                .map(move |joined| (addr, joined))
            })
            .collect::<FuturesUnordered<_>>();
        tracing::debug!("spawned {} probes", pending.len());

        let mut result = ProbeResult::default();
        while let Some((addr, joined)) = pending.next().await {
            let replied = match joined {
                Ok(Ok(replied)) => replied,
                Ok(Err(_)) => {
                    tracing::debug!("ping {} gave no answer within {:?}", addr, deadline);
                    false
                }
                Err(error) => {
                    tracing::warn!("ping {} failed: {}", addr, error);
                    false
                }
            };
            result.record(addr, Status::from_reply(replied));
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();
        result
    }
}
