use crate::jobs::{Outcome, RunSummary};
use std::{fmt::Display, future::Future, sync::Arc};
use tokio::{signal, sync::Semaphore, task::JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

/// Worker pool configuration
#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Runs one task per work item with a bounded number in flight.
///
/// Cancelling the shutdown token stops new items from starting; items
/// already running are allowed to finish.
pub struct WorkerPool {
    config: WorkerConfig,
    shutdown_token: CancellationToken,
}

impl WorkerPool {
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config: WorkerConfig {
                concurrency: config.concurrency.max(1),
            },
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Cancel the pool on Ctrl-C.
    pub fn with_ctrl_c(self) -> Self {
        let shutdown_token = self.shutdown_token.clone();
        tokio::spawn(async move {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            info!("Received shutdown signal, finishing in-flight work...");
            shutdown_token.cancel();
        });
        self
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    pub fn concurrency(&self) -> usize {
        self.config.concurrency
    }

    /// Process every item with `handler` and tally the outcomes.
    pub async fn run<I, F, Fut>(&self, items: Vec<I>, handler: F) -> RunSummary
    where
        I: Display + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Outcome>> + Send + 'static,
    {
        let total = items.len();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let handler = Arc::new(handler);
        let mut tasks = JoinSet::new();
        let mut summary = RunSummary::default();
        let mut started = 0;

        for item in items {
            let permit = tokio::select! {
                biased;
                _ = self.shutdown_token.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            started += 1;
            let handler = handler.clone();
            let span = info_span!("item", n = started, of = total, id = %item);
            tasks.spawn(
                async move {
                    let _permit = permit; // Hold permit until the item completes
                    let result = handler(item).await;
                    if let Err(e) = &result {
                        error!("{:#}", e);
                    }
                    result
                }
                .instrument(span),
            );

            // Reap finished tasks as we go so results don't pile up
            while let Some(joined) = tasks.try_join_next() {
                record_joined(&mut summary, joined);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            record_joined(&mut summary, joined);
        }

        summary.cancelled = total - started;
        if summary.cancelled > 0 {
            warn!("Interrupted: {} items were not started", summary.cancelled);
        }
        summary
    }
}

fn record_joined(
    summary: &mut RunSummary,
    joined: Result<anyhow::Result<Outcome>, tokio::task::JoinError>,
) {
    match joined {
        Ok(result) => summary.record(&result),
        Err(e) => {
            error!("Worker task panicked: {}", e);
            summary.failed += 1;
        }
    }
}
