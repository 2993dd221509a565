use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use time::macros::datetime;

use crate::{
    Error,
    merchant::{Merchant, MerchantStats, MerchantStatus, MerchantUpdate, NewMerchant},
    transaction::{Transaction, TransactionStatus},
    transport::{
        MerchantQuery, MerchantTransactions, MockApi, TransactionPage, TransactionQuery,
        Transport,
    },
};

pub(crate) fn acme() -> Merchant {
    Merchant {
        id: "MCH-00001".to_owned(),
        name: "Acme".to_owned(),
        category: "Retail".to_owned(),
        address: "1 Main St".to_owned(),
        status: MerchantStatus::Active,
        email: "ops@acme.test".to_owned(),
        phone: "555-0100".to_owned(),
    }
}

pub(crate) fn globex() -> Merchant {
    Merchant {
        id: "MCH-00002".to_owned(),
        name: "Globex".to_owned(),
        category: "Wholesale".to_owned(),
        address: "2 Side St".to_owned(),
        status: MerchantStatus::Pending,
        email: "hello@globex.test".to_owned(),
        phone: "555-0101".to_owned(),
    }
}

pub(crate) fn test_transactions() -> Vec<Transaction> {
    vec![
        Transaction {
            id: "TXN-00001-1".to_owned(),
            merchant_id: "MCH-00001".to_owned(),
            amount: 10.0,
            currency: "USD".to_owned(),
            status: TransactionStatus::Success,
            date: datetime!(2025-06-01 09:00 UTC),
            description: Some("Card payment".to_owned()),
        },
        Transaction {
            id: "TXN-00001-2".to_owned(),
            merchant_id: "MCH-00001".to_owned(),
            amount: 30.5,
            currency: "USD".to_owned(),
            status: TransactionStatus::Failed,
            date: datetime!(2025-06-03 09:00 UTC),
            description: None,
        },
        Transaction {
            id: "TXN-00002-1".to_owned(),
            merchant_id: "MCH-00002".to_owned(),
            amount: 99.99,
            currency: "USD".to_owned(),
            status: TransactionStatus::Pending,
            date: datetime!(2025-06-02 09:00 UTC),
            description: Some("Online order".to_owned()),
        },
    ]
}

/// An API with two merchants and three transactions that answers at once.
pub(crate) fn test_api() -> MockApi {
    MockApi::new(vec![acme(), globex()], test_transactions())
}

/// Wraps [MockApi] and counts the requests made through it.
#[derive(Debug, Clone)]
pub(crate) struct CountingTransport {
    pub(crate) inner: MockApi,
    calls: Arc<AtomicUsize>,
}

impl CountingTransport {
    pub(crate) fn new(inner: MockApi) -> Self {
        Self {
            inner,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Transport for CountingTransport {
    async fn list_merchants(&self, query: MerchantQuery) -> Result<Vec<Merchant>, Error> {
        self.count();
        self.inner.list_merchants(query).await
    }

    async fn get_merchant(&self, id: &str) -> Result<Merchant, Error> {
        self.count();
        self.inner.get_merchant(id).await
    }

    async fn create_merchant(&self, merchant: NewMerchant) -> Result<Merchant, Error> {
        self.count();
        self.inner.create_merchant(merchant).await
    }

    async fn update_merchant(&self, id: &str, update: MerchantUpdate) -> Result<Merchant, Error> {
        self.count();
        self.inner.update_merchant(id, update).await
    }

    async fn merchant_stats(&self, id: &str) -> Result<MerchantStats, Error> {
        self.count();
        self.inner.merchant_stats(id).await
    }

    async fn merchant_transactions(&self, id: &str) -> Result<MerchantTransactions, Error> {
        self.count();
        self.inner.merchant_transactions(id).await
    }

    async fn list_transactions(&self, query: TransactionQuery) -> Result<TransactionPage, Error> {
        self.count();
        self.inner.list_transactions(query).await
    }
}
