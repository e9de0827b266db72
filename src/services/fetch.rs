//! Repository fetcher: periodic listing refresh with signature deduplication
//!
//! The fetcher owns the published state. Observers never see it mutably; they
//! get [`GallerySnapshot`] values through a `tokio::sync::watch` channel, and
//! are only notified when something they render actually changed.

use std::sync::Arc;

use anyhow::{Result, ensure};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::github::{FetchError, ListingResponse, RepositoryLister};
use crate::services::transform;
use crate::types::{
    AccountName, GroupedView, LanguageFilter, RepositorySet, Signature, ViewSelection,
};

/// Immutable view of the published state at one point in time
#[derive(Debug, Clone)]
pub struct GallerySnapshot {
    pub repositories: Arc<RepositorySet>,
    /// Signature of `repositories`, i.e. of the last accepted listing
    pub signature: Signature,
    /// True until the first refresh attempt completes, whatever its result
    pub loading: bool,
    /// Most recent refresh failure; cleared by the next successful response
    pub last_error: Option<String>,
    /// When `repositories` was last replaced
    pub last_replaced_at: Option<DateTime<Utc>>,
    /// Number of accepted replacements so far
    pub generation: u64,
}

impl Default for GallerySnapshot {
    fn default() -> Self {
        Self {
            repositories: Arc::new(RepositorySet::default()),
            signature: Signature::default(),
            loading: true,
            last_error: None,
            last_replaced_at: None,
            generation: 0,
        }
    }
}

impl GallerySnapshot {
    /// Nothing to show yet: still loading and no repositories
    pub fn is_initial_loading(&self) -> bool {
        self.loading && self.repositories.is_empty()
    }

    pub fn languages(&self) -> Vec<LanguageFilter> {
        transform::available_languages(&self.repositories)
    }

    pub fn grouped(&self, selection: &ViewSelection) -> GroupedView {
        transform::transform(&self.repositories, selection)
    }
}

/// What one refresh did to the published state
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// A listing with a new signature replaced the published set
    Replaced { count: usize },
    /// The listing had the same signature as the published one
    Unchanged,
    /// The response was valid JSON but not a list
    NotAList,
    /// The request failed; published repositories were kept
    Failed(FetchError),
}

/// Apply one listing result to the published state.
///
/// Subscribers are notified only when the repository set is replaced or the
/// initial loading flag is cleared.
pub fn apply_listing(
    state: &watch::Sender<GallerySnapshot>,
    result: std::result::Result<ListingResponse, FetchError>,
) -> RefreshOutcome {
    let mut outcome = RefreshOutcome::Unchanged;

    state.send_if_modified(|snapshot| {
        let was_loading = snapshot.loading;
        snapshot.loading = false;

        match result {
            Ok(ListingResponse::Repositories(repositories)) => {
                snapshot.last_error = None;
                let signature = repositories.signature();
                if signature == snapshot.signature {
                    debug!("Listing unchanged ({} repositories)", repositories.len());
                    outcome = RefreshOutcome::Unchanged;
                    return was_loading;
                }

                info!(
                    "Accepted new listing with {} repositories",
                    repositories.len()
                );
                outcome = RefreshOutcome::Replaced {
                    count: repositories.len(),
                };
                snapshot.repositories = Arc::new(repositories);
                snapshot.signature = signature;
                snapshot.last_replaced_at = Some(Utc::now());
                snapshot.generation += 1;
                true
            }
            Ok(ListingResponse::NotAList(body)) => {
                snapshot.last_error = None;
                warn!("Ignoring listing response that is not a list: {}", body);
                outcome = RefreshOutcome::NotAList;
                was_loading
            }
            Err(e) => {
                error!("Error fetching repositories: {}", e);
                snapshot.last_error = Some(e.to_string());
                outcome = RefreshOutcome::Failed(e);
                was_loading
            }
        }
    });

    outcome
}

/// Owns the published repository state for one account
pub struct RepositoryFetcher<L: RepositoryLister> {
    lister: Arc<L>,
    account: AccountName,
    state: Arc<watch::Sender<GallerySnapshot>>,
}

impl<L: RepositoryLister> RepositoryFetcher<L> {
    pub fn new(lister: L, account: AccountName) -> Self {
        let (state, _) = watch::channel(GallerySnapshot::default());
        Self {
            lister: Arc::new(lister),
            account,
            state: Arc::new(state),
        }
    }

    pub fn account(&self) -> &AccountName {
        &self.account
    }

    /// Receiver that observes every notifying state change
    pub fn subscribe(&self) -> watch::Receiver<GallerySnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> GallerySnapshot {
        self.state.borrow().clone()
    }

    /// Issue one listing request and apply its result
    pub async fn refresh(&self) -> RefreshOutcome {
        let result = self.lister.list_repositories(&self.account).await;
        apply_listing(&self.state, result)
    }

    /// Start the periodic refresh.
    ///
    /// The first request goes out immediately, then one per `interval`. Every
    /// tick spawns its own request, so a slow response may still be in flight
    /// when the next one starts; whichever completes last is applied last.
    /// Dropping the returned handle stops the timer and aborts requests still
    /// in flight.
    pub fn start(&self, interval: Duration) -> Result<PollerHandle> {
        ensure!(!interval.is_zero(), "Refresh interval must be greater than zero");

        let lister = self.lister.clone();
        let account = self.account.clone();
        let state = self.state.clone();

        info!("Refreshing repositories of {} every {:?}", account, interval);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut in_flight: JoinSet<()> = JoinSet::new();

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let lister = lister.clone();
                        let account = account.clone();
                        let state = state.clone();
                        in_flight.spawn(async move {
                            let result = lister.list_repositories(&account).await;
                            apply_listing(&state, result);
                        });
                    }
                    Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                        if let Err(e) = joined {
                            error!("Refresh task failed: {}", e);
                        }
                    }
                }
            }
        });

        Ok(PollerHandle { task: Some(task) })
    }
}

/// Running periodic refresh; stops when shut down or dropped
#[derive(Debug)]
pub struct PollerHandle {
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the timer and wait until the polling task has ended
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            info!("Repository refresh stopped");
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
