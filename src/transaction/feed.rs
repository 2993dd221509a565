//! Transaction lists that refresh themselves on a timer.
//!
//! A [TransactionFeed] polls the API for the latest transactions, optionally
//! restricted to one merchant, and keeps the last response for the pages to
//! render. [TransactionFeeds] shares one feed per merchant filter and
//! interval between all requests, and stops the feeds nobody polls.

use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};

use tokio::time::Instant;

use crate::{
    Error,
    merchant::MerchantId,
    polling::{FeedState, FetchStatus, Poller, RequestTicket},
    transaction::TransactionSummary,
    transport::{TransactionQuery, Transport},
};

/// How many of the latest transactions a feed keeps.
pub const FEED_PAGE_SIZE: u64 = 100;

type SharedFeedState = Mutex<FeedState<Vec<TransactionSummary>>>;

/// A copy of a feed's data and fetch status at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    pub transactions: Vec<TransactionSummary>,
    pub status: FetchStatus,
}

/// Runs a single fetch and applies the response to the feed state.
///
/// Only a weak reference to the state is held so that a response arriving
/// after the feed is dropped is discarded.
#[derive(Debug)]
struct FeedFetcher<T> {
    api: T,
    merchant_id: Option<MerchantId>,
    state: Weak<SharedFeedState>,
}

impl<T: Transport> FeedFetcher<T> {
    async fn fetch(&self) {
        let Some(ticket) = self.begin() else {
            return;
        };

        let query = TransactionQuery {
            merchant_id: self.merchant_id.clone(),
            page: 1,
            size: FEED_PAGE_SIZE,
        };
        let result = self
            .api
            .list_transactions(query)
            .await
            .map(|page| page.content)
            .map_err(|error| {
                tracing::error!("could not fetch transactions: {error}");
                error.to_string()
            });

        let Some(state) = self.state.upgrade() else {
            tracing::debug!("transaction feed was stopped, dropping response");
            return;
        };

        match lock_state(&state) {
            Ok(mut state) => {
                state.resolve(ticket, result);
            }
            Err(error) => tracing::error!("could not apply transactions: {error}"),
        }
    }

    fn begin(&self) -> Option<RequestTicket> {
        let state = self.state.upgrade()?;
        let mut state = lock_state(&state).ok()?;

        Some(state.begin())
    }
}

fn lock_state(
    state: &SharedFeedState,
) -> Result<MutexGuard<'_, FeedState<Vec<TransactionSummary>>>, Error> {
    state
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire transaction feed lock: {error}"))
        .map_err(|_| Error::StoreLockError)
}

type FetchFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

fn fetch_task<T: Transport>(
    fetcher: &Arc<FeedFetcher<T>>,
) -> impl Fn() -> FetchFuture + Send + Sync + 'static {
    let fetcher = Arc::clone(fetcher);

    move || {
        let fetcher = Arc::clone(&fetcher);
        Box::pin(async move { fetcher.fetch().await })
    }
}

/// The latest transactions, refreshed every interval until the feed is
/// stopped or dropped.
#[derive(Debug)]
pub struct TransactionFeed<T> {
    fetcher: Arc<FeedFetcher<T>>,
    state: Arc<SharedFeedState>,
    poller: Mutex<Poller>,
}

impl<T: Transport> TransactionFeed<T> {
    /// Start polling `api` for the transactions of `merchant_id`, or for
    /// every transaction if it is `None`.
    ///
    /// The first fetch is issued immediately.
    ///
    /// # Errors
    /// Returns [Error::InvalidRefreshInterval] if `interval` is zero.
    pub fn start(
        api: T,
        merchant_id: Option<MerchantId>,
        interval: Duration,
    ) -> Result<Self, Error> {
        let state = Arc::new(Mutex::new(FeedState::loading(Vec::new())));
        let fetcher = Arc::new(FeedFetcher {
            api,
            merchant_id,
            state: Arc::downgrade(&state),
        });
        let poller = Poller::start(fetch_task(&fetcher), interval)?;

        Ok(Self {
            fetcher,
            state,
            poller: Mutex::new(poller),
        })
    }

    /// Fetch once now without resetting the timer.
    pub async fn refresh(&self) {
        self.fetcher.fetch().await;
    }

    pub fn snapshot(&self) -> Result<FeedSnapshot, Error> {
        let state = lock_state(&self.state)?;

        Ok(FeedSnapshot {
            transactions: state.data().clone(),
            status: state.status().clone(),
        })
    }

    pub fn interval(&self) -> Result<Duration, Error> {
        Ok(self.lock_poller()?.interval())
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.lock_poller()
            .map(|poller| poller.is_running())
            .unwrap_or(false)
    }

    /// Poll every `interval` from now on.
    ///
    /// The schedule is restarted, which also fetches immediately, unless
    /// the feed is already running with this interval.
    ///
    /// # Errors
    /// Returns [Error::InvalidRefreshInterval] if `interval` is zero.
    pub fn set_interval(&self, interval: Duration) -> Result<(), Error> {
        let mut poller = self.lock_poller()?;

        if poller.is_running() && poller.interval() == interval {
            return Ok(());
        }

        poller.restart(fetch_task(&self.fetcher), interval)
    }

    pub fn stop(&self) {
        match self.lock_poller() {
            Ok(mut poller) => poller.stop(),
            Err(error) => tracing::error!("could not stop transaction feed: {error}"),
        }
    }

    fn lock_poller(&self) -> Result<MutexGuard<'_, Poller>, Error> {
        self.poller
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire poller lock: {error}"))
            .map_err(|_| Error::StoreLockError)
    }
}

/// The longest refresh interval a feed accepts.
pub const MAX_REFRESH_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// A feed that nobody has asked for during this many of its intervals is
/// stopped and removed.
const IDLE_INTERVALS: u32 = 3;

/// Feeds are shared by requests that want the same merchant filter at the
/// same refresh interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FeedKey {
    merchant_id: Option<MerchantId>,
    interval: Duration,
}

#[derive(Debug)]
struct FeedEntry<T> {
    feed: Arc<TransactionFeed<T>>,
    last_polled: Instant,
}

type FeedMap<T> = Mutex<HashMap<FeedKey, FeedEntry<T>>>;

/// The transaction feeds that pages are currently polling.
///
/// A feed is started on first use and kept while its panel keeps polling.
/// Once a feed goes unpolled for [IDLE_INTERVALS] of its intervals, a sweep
/// that runs every default interval stops it and forgets it.
#[derive(Debug)]
pub struct TransactionFeeds<T> {
    api: T,
    default_interval: Duration,
    feeds: Arc<FeedMap<T>>,
    sweeper: Mutex<Option<Poller>>,
}

impl<T: Transport + Clone> TransactionFeeds<T> {
    pub fn new(api: T, default_interval: Duration) -> Self {
        Self {
            api,
            default_interval,
            feeds: Arc::new(Mutex::new(HashMap::new())),
            sweeper: Mutex::new(None),
        }
    }

    /// Get the running feed for `merchant_id` at `interval`, or the default
    /// interval if it is `None`, and mark it as polled.
    ///
    /// # Errors
    /// Returns [Error::InvalidRefreshInterval] if the interval is zero or
    /// longer than [MAX_REFRESH_INTERVAL], or [Error::StoreLockError] if the
    /// registry lock is poisoned.
    pub fn get(
        &self,
        merchant_id: Option<MerchantId>,
        interval: Option<Duration>,
    ) -> Result<Option<Arc<TransactionFeed<T>>>, Error> {
        let key = self.key(merchant_id, interval)?;
        let mut feeds = lock_feeds(&self.feeds)?;

        Ok(feeds.get_mut(&key).map(|entry| {
            entry.last_polled = Instant::now();
            Arc::clone(&entry.feed)
        }))
    }

    /// Get the feed for `merchant_id` at `interval`, starting it if needed,
    /// and mark it as polled.
    ///
    /// An invalid interval is rejected before any feed is touched.
    ///
    /// # Errors
    /// Returns [Error::InvalidRefreshInterval] if the interval is zero or
    /// longer than [MAX_REFRESH_INTERVAL], or [Error::StoreLockError] if a
    /// lock is poisoned.
    pub fn get_or_start(
        &self,
        merchant_id: Option<MerchantId>,
        interval: Option<Duration>,
    ) -> Result<Arc<TransactionFeed<T>>, Error> {
        let key = self.key(merchant_id, interval)?;
        let mut feeds = lock_feeds(&self.feeds)?;

        if let Some(entry) = feeds.get_mut(&key) {
            entry.last_polled = Instant::now();
            return Ok(Arc::clone(&entry.feed));
        }

        self.start_sweeper()?;

        tracing::info!(
            "starting transaction feed for {} every {:?}",
            key.merchant_id.as_deref().unwrap_or("all merchants"),
            key.interval
        );
        let feed = Arc::new(TransactionFeed::start(
            self.api.clone(),
            key.merchant_id.clone(),
            key.interval,
        )?);
        feeds.insert(
            key,
            FeedEntry {
                feed: Arc::clone(&feed),
                last_polled: Instant::now(),
            },
        );

        Ok(feed)
    }

    /// Stop and forget every feed, and the sweep. Fetches that are in
    /// flight are ignored when they resolve.
    pub fn stop_all(&self) {
        match self.sweeper.lock() {
            Ok(mut sweeper) => {
                if let Some(mut sweeper) = sweeper.take() {
                    sweeper.stop();
                }
            }
            Err(error) => tracing::error!("could not stop feed sweep: {error}"),
        }

        let feeds = match lock_feeds(&self.feeds) {
            Ok(mut feeds) => std::mem::take(&mut *feeds),
            Err(error) => {
                tracing::error!("could not stop transaction feeds: {error}");
                return;
            }
        };

        for entry in feeds.values() {
            entry.feed.stop();
        }

        tracing::info!("stopped {} transaction feed(s)", feeds.len());
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        lock_feeds(&self.feeds).map(|feeds| feeds.len()).unwrap_or(0)
    }

    fn key(
        &self,
        merchant_id: Option<MerchantId>,
        interval: Option<Duration>,
    ) -> Result<FeedKey, Error> {
        let interval = interval.unwrap_or(self.default_interval);
        if interval.is_zero() || interval > MAX_REFRESH_INTERVAL {
            return Err(Error::InvalidRefreshInterval);
        }

        Ok(FeedKey {
            merchant_id,
            interval,
        })
    }

    /// Start sweeping idle feeds unless the sweep is already running.
    fn start_sweeper(&self) -> Result<(), Error> {
        let mut sweeper = self
            .sweeper
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire feed sweep lock: {error}"))
            .map_err(|_| Error::StoreLockError)?;

        if sweeper.is_none() {
            let feeds = Arc::downgrade(&self.feeds);
            let sweep = move || {
                let feeds = Weak::clone(&feeds);
                async move {
                    if let Some(feeds) = feeds.upgrade() {
                        evict_idle_feeds(&feeds, Instant::now());
                    }
                }
            };
            *sweeper = Some(Poller::start(sweep, self.default_interval)?);
        }

        Ok(())
    }
}

/// Stop and remove the feeds that have not been polled for
/// [IDLE_INTERVALS] of their intervals at `now`.
fn evict_idle_feeds<T: Transport>(feeds: &FeedMap<T>, now: Instant) {
    let Ok(mut feeds) = lock_feeds(feeds) else {
        return;
    };

    feeds.retain(|key, entry| {
        let idle_for = now.saturating_duration_since(entry.last_polled);
        if idle_for <= key.interval.saturating_mul(IDLE_INTERVALS) {
            return true;
        }

        tracing::info!(
            "stopping idle transaction feed for {} every {:?}",
            key.merchant_id.as_deref().unwrap_or("all merchants"),
            key.interval
        );
        entry.feed.stop();
        false
    });
}

fn lock_feeds<T>(
    feeds: &FeedMap<T>,
) -> Result<MutexGuard<'_, HashMap<FeedKey, FeedEntry<T>>>, Error> {
    feeds
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire feed registry lock: {error}"))
        .map_err(|_| Error::StoreLockError)
}

#[cfg(test)]
mod transaction_feed_tests {
    use std::time::Duration;

    use crate::{
        Error,
        polling::FetchStatus,
        test_utils::{CountingTransport, test_api},
        transaction::feed::TransactionFeed,
    };

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn starts_loading_then_shows_transactions() {
        let feed = TransactionFeed::start(test_api(), None, Duration::from_secs(5))
            .expect("could not start feed");

        let snapshot = feed.snapshot().unwrap();
        assert_eq!(snapshot.status, FetchStatus::Loading);
        assert!(snapshot.transactions.is_empty());

        settle().await;

        let snapshot = feed.snapshot().unwrap();
        assert_eq!(snapshot.status, FetchStatus::Success);
        let ids: Vec<_> = snapshot
            .transactions
            .iter()
            .map(|row| row.transaction.id.as_str())
            .collect();
        assert_eq!(ids, ["TXN-00001-2", "TXN-00002-1", "TXN-00001-1"]);
        assert_eq!(snapshot.transactions[0].merchant_name, "Acme");
    }

    #[tokio::test(start_paused = true)]
    async fn merchant_feed_only_has_that_merchants_transactions() {
        let feed = TransactionFeed::start(
            test_api(),
            Some("MCH-00002".to_owned()),
            Duration::from_secs(5),
        )
        .expect("could not start feed");

        settle().await;

        let snapshot = feed.snapshot().unwrap();
        assert_eq!(snapshot.transactions.len(), 1);
        assert_eq!(snapshot.transactions[0].merchant_name, "Globex");
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_polling_and_recovers() {
        let api = test_api();
        api.set_offline(true);
        let feed = TransactionFeed::start(api.clone(), None, Duration::from_secs(5))
            .expect("could not start feed");
        settle().await;

        assert_eq!(
            feed.snapshot().unwrap().status,
            FetchStatus::Error("Network error. Please check your connection.".to_owned())
        );
        assert!(feed.is_running());

        api.set_offline(false);
        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;

        let snapshot = feed.snapshot().unwrap();
        assert_eq!(snapshot.status, FetchStatus::Success);
        assert_eq!(snapshot.transactions.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_fetches_once_without_resetting_the_timer() {
        let api = CountingTransport::new(test_api());
        let feed = TransactionFeed::start(api.clone(), None, Duration::from_secs(5))
            .expect("could not start feed");
        settle().await;
        assert_eq!(api.calls(), 1);

        tokio::time::advance(Duration::from_secs(3)).await;
        feed.refresh().await;
        assert_eq!(api.calls(), 2);

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(api.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_after_stop_is_ignored() {
        let api = test_api().with_latency(Duration::from_secs(1));
        let feed = TransactionFeed::start(api, None, Duration::from_secs(5))
            .expect("could not start feed");
        settle().await;

        drop(feed);
        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn set_interval_restarts_only_when_it_changes() {
        let api = CountingTransport::new(test_api());
        let feed = TransactionFeed::start(api.clone(), None, Duration::from_secs(5))
            .expect("could not start feed");
        settle().await;

        feed.set_interval(Duration::from_secs(5)).unwrap();
        settle().await;
        assert_eq!(api.calls(), 1);

        feed.set_interval(Duration::from_secs(1)).unwrap();
        settle().await;
        assert_eq!(api.calls(), 2);
        assert_eq!(feed.interval(), Ok(Duration::from_secs(1)));

        assert_eq!(
            feed.set_interval(Duration::ZERO),
            Err(Error::InvalidRefreshInterval)
        );
        assert!(!feed.is_running());
    }
}
