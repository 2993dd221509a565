//! The in-memory merchant API.

use std::{
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Error,
    list_view::{ListParams, filter_and_sort, page_bounds, page_count},
    merchant::{Merchant, MerchantRepository, MerchantStats, MerchantUpdate, NewMerchant},
    transaction::{Transaction, TransactionRepository, TransactionSummary},
    transport::{
        MerchantQuery, MerchantTransactions, TransactionPage, TransactionQuery, Transport,
    },
};

const NETWORK_ERROR: &str = "Network error. Please check your connection.";
const SERVER_ERROR: &str = "Server error. Please try again later.";

/// An in-memory merchant API.
///
/// Every request waits for the configured latency and then fails with
/// probability `failure_rate`, or always fails while the API is set
/// offline. Cloning the API shares its data.
#[derive(Debug, Clone)]
pub struct MockApi {
    merchants: Arc<Mutex<MerchantRepository>>,
    transactions: Arc<Mutex<TransactionRepository>>,
    latency: Duration,
    failure_rate: f64,
    rng: Arc<Mutex<StdRng>>,
    offline: Arc<AtomicBool>,
}

impl MockApi {
    /// Create an API that serves `merchants` and `transactions` without
    /// delay or failures.
    pub fn new(merchants: Vec<Merchant>, transactions: Vec<Transaction>) -> Self {
        Self {
            merchants: Arc::new(Mutex::new(MerchantRepository::new(merchants))),
            transactions: Arc::new(Mutex::new(TransactionRepository::new(transactions))),
            latency: Duration::ZERO,
            failure_rate: 0.0,
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(0))),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Wait for `latency` before answering each request.
    pub fn with_latency(self, latency: Duration) -> Self {
        Self { latency, ..self }
    }

    /// Fail each request with probability `failure_rate`, which is clamped
    /// to the range 0 to 1. `seed` makes the failures reproducible.
    pub fn with_failure_rate(self, failure_rate: f64, seed: u64) -> Self {
        Self {
            failure_rate: failure_rate.clamp(0.0, 1.0),
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            ..self
        }
    }

    /// Make every request fail until set back online.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
        tracing::info!(
            "mock API is now {}",
            if offline { "offline" } else { "online" }
        );
    }

    /// Simulate the network for one request.
    async fn round_trip(&self, request: &str) -> Result<(), Error> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.offline.load(Ordering::SeqCst) {
            tracing::warn!("[mock API] {request} failed: offline");
            return Err(Error::Transport(NETWORK_ERROR.to_owned()));
        }

        if self.failure_rate > 0.0 {
            let failed = self
                .rng
                .lock()
                .map_err(|_| Error::StoreLockError)?
                .gen_bool(self.failure_rate);

            if failed {
                tracing::warn!("[mock API] {request} failed: injected failure");
                return Err(Error::Transport(SERVER_ERROR.to_owned()));
            }
        }

        tracing::debug!("[mock API] {request}");

        Ok(())
    }

    fn merchants(&self) -> Result<MutexGuard<'_, MerchantRepository>, Error> {
        self.merchants
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire merchant store lock: {error}"))
            .map_err(|_| Error::StoreLockError)
    }

    fn transactions(&self) -> Result<MutexGuard<'_, TransactionRepository>, Error> {
        self.transactions
            .lock()
            .inspect_err(|error| {
                tracing::error!("could not acquire transaction store lock: {error}")
            })
            .map_err(|_| Error::StoreLockError)
    }
}

impl Transport for MockApi {
    async fn list_merchants(&self, query: MerchantQuery) -> Result<Vec<Merchant>, Error> {
        self.round_trip("GET /merchants").await?;

        let params = ListParams::new(None)
            .with_search(query.search.as_deref().unwrap_or_default())
            .with_sort(query.parsed_sort()?);
        let merchants = self.merchants()?;

        Ok(filter_and_sort(merchants.all(), &params))
    }

    async fn get_merchant(&self, id: &str) -> Result<Merchant, Error> {
        self.round_trip(&format!("GET /merchants/{id}")).await?;

        self.merchants()?.get(id).cloned()
    }

    async fn create_merchant(&self, merchant: NewMerchant) -> Result<Merchant, Error> {
        self.round_trip("POST /merchants").await?;

        let merchant = self.merchants()?.insert(merchant)?;
        tracing::info!("created merchant {}", merchant.id);

        Ok(merchant)
    }

    async fn update_merchant(&self, id: &str, update: MerchantUpdate) -> Result<Merchant, Error> {
        self.round_trip(&format!("PUT /merchants/{id}")).await?;

        let merchant = self.merchants()?.update(id, update)?;
        tracing::info!("updated merchant {}", merchant.id);

        Ok(merchant)
    }

    async fn merchant_stats(&self, id: &str) -> Result<MerchantStats, Error> {
        self.round_trip(&format!("GET /merchants/{id}/stats")).await?;

        self.merchants()?.get(id)?;

        Ok(self.transactions()?.stats(id))
    }

    async fn merchant_transactions(&self, id: &str) -> Result<MerchantTransactions, Error> {
        self.round_trip(&format!("GET /merchants/{id}/transactions"))
            .await?;

        self.merchants()?.get(id)?;

        let data: Vec<Transaction> = self
            .transactions()?
            .matching(Some(id))
            .into_iter()
            .cloned()
            .collect();
        let total = data.len() as u64;

        Ok(MerchantTransactions {
            data,
            total,
            page: 1,
            limit: total,
        })
    }

    async fn list_transactions(&self, query: TransactionQuery) -> Result<TransactionPage, Error> {
        self.round_trip("GET /transactions").await?;

        // Always lock merchants before transactions.
        let merchants = self.merchants()?;
        let transactions = self.transactions()?;

        let matching = transactions.matching(query.merchant_id.as_deref());
        let page = query.page.max(1);
        let bounds = page_bounds(page, query.size, matching.len());

        let content = matching[bounds]
            .iter()
            .map(|transaction| TransactionSummary {
                merchant_name: merchants
                    .get(&transaction.merchant_id)
                    .map(|merchant| merchant.name.clone())
                    .unwrap_or_else(|_| transaction.merchant_id.clone()),
                transaction: (*transaction).clone(),
            })
            .collect();

        Ok(TransactionPage {
            content,
            total_elements: matching.len() as u64,
            total_pages: page_count(matching.len(), query.size),
            page,
            size: query.size,
        })
    }
}
