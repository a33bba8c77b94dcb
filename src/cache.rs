//! The published page and the worker that rebuilds it.
//!
//! Refresh triggers go through a one-slot queue: a trigger that finds the slot taken is
//! dropped, because the queued request already guarantees a rebuild after the running one.
//! Readers only take the snapshot lock long enough to clone an `Arc`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use crate::aggregator::Aggregator;
use crate::errors::RefreshError;
use crate::models::Snapshot;
use crate::render::{render_page, PageContext};
use crate::teamcity::Upstream;

/// Produces the bytes of a new snapshot.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn build_page(&self) -> Result<Vec<u8>, RefreshError>;
}

/// Aggregation followed by rendering.
pub struct Pipeline<U: ?Sized> {
    aggregator: Aggregator<U>,
    base: String,
    title: Option<String>,
}

impl<U: Upstream + ?Sized> Pipeline<U> {
    pub fn new(aggregator: Aggregator<U>, base: impl Into<String>, title: Option<String>) -> Self {
        Self {
            aggregator,
            base: base.into(),
            title,
        }
    }
}

#[async_trait]
impl<U: Upstream + ?Sized> PageSource for Pipeline<U> {
    async fn build_page(&self) -> Result<Vec<u8>, RefreshError> {
        let projects = self.aggregator.collect().await?;
        let page = render_page(&PageContext {
            branch: self.aggregator.branch(),
            base: &self.base,
            title: self.title.as_deref(),
            projects: &projects,
            generated_at: chrono::Utc::now(),
        })?;

        let shown = projects.iter().filter(|p| p.is_visible()).count();
        tracing::debug!(projects = projects.len(), shown, "Aggregated build list");
        Ok(page.into_bytes())
    }
}

/// Receiving end of the refresh slot, consumed by [`CacheCoordinator::run_refresh_loop`].
pub struct RefreshQueue {
    rx: mpsc::Receiver<()>,
}

pub struct CacheCoordinator {
    snapshot: RwLock<Arc<Snapshot>>,
    pending: mpsc::Sender<()>,
    max_age: Duration,
}

impl CacheCoordinator {
    pub fn new(max_age: Duration) -> (Arc<Self>, RefreshQueue) {
        let (tx, rx) = mpsc::channel(1);
        let coordinator = Arc::new(Self {
            snapshot: RwLock::new(Arc::new(Snapshot::placeholder())),
            pending: tx,
            max_age,
        });
        (coordinator, RefreshQueue { rx })
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Asks for a rebuild without waiting. Returns false when one was already queued.
    pub fn request_refresh(&self) -> bool {
        match self.pending.try_send(()) {
            Ok(()) => {
                tracing::debug!("Refresh requested");
                true
            }
            Err(mpsc::error::TrySendError::Full(())) => {
                tracing::debug!("Refresh already pending, request coalesced");
                false
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                tracing::warn!("Refresh worker is not running, request dropped");
                false
            }
        }
    }

    pub async fn current_snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    pub async fn publish(&self, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        *self.snapshot.write().await = snapshot;
    }

    /// Serves refresh requests one at a time for as long as the coordinator lives.
    pub async fn run_refresh_loop<S>(self: Arc<Self>, mut queue: RefreshQueue, source: S)
    where
        S: PageSource + 'static,
    {
        while queue.rx.recv().await.is_some() {
            let started = Instant::now();
            tracing::info!("Refreshing cache");

            match source.build_page().await {
                Ok(body) => {
                    let snapshot = Snapshot::new(body);
                    tracing::info!(
                        bytes = snapshot.body.len(),
                        elapsed = ?started.elapsed(),
                        "Published new snapshot"
                    );
                    self.publish(snapshot).await;
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        elapsed = ?started.elapsed(),
                        "Refresh failed, keeping previous snapshot"
                    );
                }
            }
        }
        tracing::debug!("Refresh loop stopped");
    }

    /// Triggers a refresh every `interval`, starting immediately.
    pub fn spawn_refresh_timer(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        let mut ticks = IntervalStream::new(tokio::time::interval(interval));
        tokio::spawn(async move {
            while ticks.next().await.is_some() {
                coordinator.request_refresh();
            }
        })
    }
}
