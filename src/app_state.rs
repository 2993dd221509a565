//! Implements a struct that holds the state of the server.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rand::{SeedableRng, rngs::StdRng};
use time::OffsetDateTime;

use crate::{
    list_view::MemoizedView,
    merchant::Merchant,
    pagination::PaginationConfig,
    seed::{sample_merchants, sample_transactions},
    transaction::TransactionFeeds,
    transport::MockApi,
};

/// The settings the server is started with.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// How long the mock API waits before answering each request.
    pub latency: Duration,
    /// The probability that a mock API request fails, from 0 to 1.
    pub failure_rate: f64,
    /// How often transaction feeds refresh unless a page asks otherwise.
    pub refresh_interval: Duration,
    /// The number of merchants per page.
    pub page_size: u64,
    /// Seeds the sample data and the failure injection.
    pub seed: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(500),
            failure_rate: 0.0,
            refresh_interval: Duration::from_millis(5000),
            page_size: 10,
            seed: 42,
        }
    }
}

/// The state of the server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The merchant API that every page goes through.
    pub api: MockApi,

    /// The auto-refreshing transaction lists that pages are polling.
    pub transaction_feeds: Arc<TransactionFeeds<MockApi>>,

    /// The last filtered, sorted and paged merchant list, reused while
    /// neither the merchants nor the list parameters change.
    pub merchant_views: Arc<Mutex<MemoizedView<Merchant>>>,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create the state with a mock API serving sample merchants and their
    /// transactions, generated from `config.seed`.
    pub fn new(config: &AppConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let merchants = sample_merchants();
        let transactions = sample_transactions(&merchants, &mut rng, OffsetDateTime::now_utc());
        tracing::info!(
            "seeded {} merchants and {} transactions",
            merchants.len(),
            transactions.len()
        );

        let api = MockApi::new(merchants, transactions)
            .with_latency(config.latency)
            .with_failure_rate(config.failure_rate, config.seed);

        Self::with_api(api, config)
    }

    /// Create the state around an existing `api`.
    ///
    /// Only the refresh interval and page size are taken from `config`, the
    /// API keeps its own latency and failure rate.
    pub fn with_api(api: MockApi, config: &AppConfig) -> Self {
        Self {
            transaction_feeds: Arc::new(TransactionFeeds::new(
                api.clone(),
                config.refresh_interval,
            )),
            api,
            merchant_views: Arc::new(Mutex::new(MemoizedView::new())),
            pagination_config: PaginationConfig {
                page_size: config.page_size,
                ..Default::default()
            },
        }
    }

    /// Stop every transaction feed, e.g. when the server shuts down.
    pub fn stop_feeds(&self) {
        self.transaction_feeds.stop_all();
    }
}

#[cfg(test)]
mod app_state_tests {
    use std::time::Duration;

    use crate::{AppConfig, AppState, seed::TRANSACTIONS_PER_MERCHANT, transport::Transport};

    #[tokio::test]
    async fn new_state_serves_seeded_data() {
        let config = AppConfig {
            latency: Duration::ZERO,
            ..Default::default()
        };

        let state = AppState::new(&config);

        let merchants = state.api.list_merchants(Default::default()).await.unwrap();
        assert!(!merchants.is_empty());
        let transactions = state
            .api
            .merchant_transactions(&merchants[0].id)
            .await
            .unwrap();
        assert_eq!(transactions.total, TRANSACTIONS_PER_MERCHANT as u64);
        assert_eq!(state.pagination_config.page_size, 10);
        assert_eq!(state.pagination_config.default_page, 1);
    }

    #[tokio::test]
    async fn same_seed_gives_same_transactions() {
        let config = AppConfig {
            latency: Duration::ZERO,
            ..Default::default()
        };

        let first = AppState::new(&config);
        let second = AppState::new(&config);

        let first = first.api.merchant_transactions("MCH-00001").await.unwrap();
        let second = second.api.merchant_transactions("MCH-00001").await.unwrap();
        let amounts = |transactions: &crate::transport::MerchantTransactions| {
            transactions
                .data
                .iter()
                .map(|transaction| transaction.amount)
                .collect::<Vec<_>>()
        };
        assert_eq!(amounts(&first), amounts(&second));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_feeds_stops_every_feed() {
        let state = AppState::new(&AppConfig::default());
        let feed = state.transaction_feeds.get_or_start(None, None).unwrap();

        state.stop_feeds();

        assert!(!feed.is_running());
        assert_eq!(state.transaction_feeds.len(), 0);
    }
}
