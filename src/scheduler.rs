//! The single writer for every edit chain.
//!
//! Explicit refresh requests and the periodic stale sweep both funnel into one
//! loop, so at most one poll cycle ever runs and every mutation of the store is
//! totally ordered.

use std::time::Duration;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::fetch::{FetchOutcome, Fetcher};
use crate::registry;
use crate::revision::{self, ResponseMeta};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// A new edit was appended.
    Updated,
    /// Fetched fine, nothing new to record.
    Unchanged,
}

impl PollOutcome {
    pub fn updated(self) -> bool {
        self == PollOutcome::Updated
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub polled: usize,
    pub updated: usize,
    pub failed: usize,
}

struct RefreshRequest {
    resource_id: i32,
    accepted: oneshot::Sender<()>,
    report: Option<oneshot::Sender<Result<PollOutcome>>>,
}

/// Runs poll cycles against the store. Owned by the [`Scheduler`] loop.
pub struct Poller<F> {
    db: DatabaseConnection,
    fetcher: F,
    config: SchedulerConfig,
}

impl<F: Fetcher> Poller<F> {
    pub fn new(db: DatabaseConnection, fetcher: F, config: SchedulerConfig) -> Self {
        Poller { db, fetcher, config }
    }

    /// One fetch, diff and commit cycle for resource `resource_id`.
    ///
    /// A failed fetch leaves the resource untouched so the next sweep picks it
    /// up again. Once fetched, the edit append and the poll bookkeeping commit
    /// or roll back together.
    pub async fn poll(&self, resource_id: i32) -> Result<PollOutcome> {
        let result = self.poll_cycle(resource_id).await;
        match &result {
            Ok(PollOutcome::Updated) => info!("Resource {} updated", resource_id),
            Ok(PollOutcome::Unchanged) => info!("Resource {} unchanged", resource_id),
            Err(e) => warn!("Abandoned poll of resource {}: {}", resource_id, e),
        }
        result
    }

    async fn poll_cycle(&self, resource_id: i32) -> Result<PollOutcome> {
        let resource = registry::get(&self.db, resource_id).await?;
        info!("Polling resource {} ({})", resource.id, resource.url);

        let token = Some(resource.conditional_token.as_str()).filter(|t| !t.is_empty());
        let fetched = self.fetcher.fetch(&resource.url, token).await?;

        let txn = self.db.begin().await.map_err(Error::Transaction)?;
        match record(&txn, resource.id, &fetched).await {
            Ok(updated) => {
                txn.commit().await.map_err(Error::Transaction)?;
                Ok(if updated {
                    PollOutcome::Updated
                } else {
                    PollOutcome::Unchanged
                })
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    error!("Unable to roll back poll of resource {}: {}", resource_id, rollback);
                }
                Err(e)
            }
        }
    }

    /// Poll every resource that has gone stale, up to the configured limit.
    ///
    /// Stops before the next poll once `shutdown` fires. Whatever was left
    /// stays stale for a later sweep.
    pub async fn sweep(&self, shutdown: &CancellationToken) -> Result<SweepSummary> {
        let stale =
            registry::find_stale(&self.db, self.config.stale_after, self.config.sweep_limit).await?;
        if !stale.is_empty() {
            info!("Sweeping {} stale resources", stale.len());
        }

        let mut summary = SweepSummary::default();
        for resource in stale {
            if shutdown.is_cancelled() {
                info!("Sweep interrupted after {} polls", summary.polled);
                break;
            }
            summary.polled += 1;
            match self.poll(resource.id).await {
                Ok(PollOutcome::Updated) => summary.updated += 1,
                Ok(PollOutcome::Unchanged) => {}
                Err(_) => summary.failed += 1,
            }
        }
        Ok(summary)
    }
}

async fn record(txn: &DatabaseTransaction, resource_id: i32, fetched: &FetchOutcome) -> Result<bool> {
    let updated = match fetched {
        FetchOutcome::Fetched {
            body,
            token,
            content_type,
        } => {
            let meta = ResponseMeta {
                content_type: content_type.clone(),
                etag: token.clone(),
            };
            revision::commit_response(txn, resource_id, body, &meta).await?
        }
        FetchOutcome::NotModified { .. } => false,
    };
    registry::record_poll(txn, resource_id, fetched.token()).await?;
    Ok(updated)
}

/// The worker loop. Build one with [`Scheduler::new`] and drive it with
/// [`Scheduler::run`].
pub struct Scheduler<F> {
    poller: Poller<F>,
    requests: mpsc::Receiver<RefreshRequest>,
}

/// Submits explicit refreshes to a running [`Scheduler`].
#[derive(Clone)]
pub struct SchedulerHandle {
    requests: mpsc::Sender<RefreshRequest>,
}

impl<F: Fetcher> Scheduler<F> {
    pub fn new(
        db: DatabaseConnection,
        fetcher: F,
        config: SchedulerConfig,
    ) -> (Self, SchedulerHandle) {
        let (tx, rx) = mpsc::channel(1);
        let scheduler = Scheduler {
            poller: Poller::new(db, fetcher, config),
            requests: rx,
        };
        (scheduler, SchedulerHandle { requests: tx })
    }

    /// Serve refresh requests and periodic sweeps until `shutdown` fires or
    /// every handle is dropped.
    ///
    /// Shutdown is only observed between poll cycles, including the cycles of
    /// a sweep in progress.
    pub async fn run(self, shutdown: CancellationToken) {
        let Scheduler {
            poller,
            mut requests,
        } = self;

        // tokio rejects a zero period
        let period = poller.config.poll_interval.max(Duration::from_millis(1));
        let mut sweep = time::interval_at(Instant::now() + period, period);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Scheduler started");
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                // a due sweep runs before any queued refresh
                _ = sweep.tick() => {
                    if let Err(e) = poller.sweep(&shutdown).await {
                        error!("Failed to find stale resources: {}", e);
                    }
                }
                request = requests.recv() => match request {
                    Some(request) => handle(&poller, request).await,
                    None => break,
                },
            }
        }
        info!("Scheduler stopped");
    }
}

async fn handle<F: Fetcher>(poller: &Poller<F>, request: RefreshRequest) {
    let RefreshRequest {
        resource_id,
        accepted,
        report,
    } = request;

    // The caller may have given up waiting; the refresh still happens.
    let _ = accepted.send(());
    let result = poller.poll(resource_id).await;
    if let Some(report) = report {
        let _ = report.send(result);
    }
}

impl SchedulerHandle {
    /// Queue a refresh of `resource_id`, returning once the worker has taken
    /// it. The poll itself completes later.
    pub async fn refresh(&self, resource_id: i32) -> Result<()> {
        let (accepted, acceptance) = oneshot::channel();
        self.submit(RefreshRequest {
            resource_id,
            accepted,
            report: None,
        })
        .await?;
        acceptance.await.map_err(|_| Error::SchedulerClosed)
    }

    /// Like [`refresh`](Self::refresh), but waits for the poll cycle to finish
    /// and returns its outcome.
    pub async fn refresh_and_wait(&self, resource_id: i32) -> Result<PollOutcome> {
        let (accepted, acceptance) = oneshot::channel();
        let (report, outcome) = oneshot::channel();
        self.submit(RefreshRequest {
            resource_id,
            accepted,
            report: Some(report),
        })
        .await?;
        acceptance.await.map_err(|_| Error::SchedulerClosed)?;
        outcome.await.map_err(|_| Error::SchedulerClosed)?
    }

    async fn submit(&self, request: RefreshRequest) -> Result<()> {
        self.requests
            .send(request)
            .await
            .map_err(|_| Error::SchedulerClosed)
    }
}
