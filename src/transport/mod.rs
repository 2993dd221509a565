//! The merchant API that the pages read from and write to.
//!
//! Every page talks to the API through the [Transport] trait. The only
//! implementation is [MockApi], an in-memory stand-in with simulated latency
//! and failures that is also served as JSON under `/api`.

mod mock;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    list_view::{Sort, SortDirection},
    merchant::{Merchant, MerchantColumn, MerchantId, MerchantStats, MerchantUpdate, NewMerchant},
    transaction::{Transaction, TransactionSummary},
};

pub use mock::MockApi;

/// The page size used when a transaction query does not specify one.
pub const DEFAULT_TRANSACTION_PAGE_SIZE: u64 = 20;

/// The operations offered by the merchant API.
///
/// Each method corresponds to one HTTP request, and each may fail with
/// [Error::Transport] if the API cannot be reached.
pub trait Transport: Send + Sync + 'static {
    /// `GET /merchants?sort=&search=`
    fn list_merchants(
        &self,
        query: MerchantQuery,
    ) -> impl Future<Output = Result<Vec<Merchant>, Error>> + Send;

    /// `GET /merchants/{id}`, fails with [Error::NotFound] for an unknown ID.
    fn get_merchant(&self, id: &str) -> impl Future<Output = Result<Merchant, Error>> + Send;

    /// `POST /merchants`, the API assigns the ID.
    fn create_merchant(
        &self,
        merchant: NewMerchant,
    ) -> impl Future<Output = Result<Merchant, Error>> + Send;

    /// `PUT /merchants/{id}`, merges the fields present in `update`.
    fn update_merchant(
        &self,
        id: &str,
        update: MerchantUpdate,
    ) -> impl Future<Output = Result<Merchant, Error>> + Send;

    /// `GET /merchants/{id}/stats`
    fn merchant_stats(&self, id: &str)
    -> impl Future<Output = Result<MerchantStats, Error>> + Send;

    /// `GET /merchants/{id}/transactions`
    fn merchant_transactions(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<MerchantTransactions, Error>> + Send;

    /// `GET /transactions?merchantId=&page=&size=`
    fn list_transactions(
        &self,
        query: TransactionQuery,
    ) -> impl Future<Output = Result<TransactionPage, Error>> + Send;
}

/// The query parameters for listing merchants.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantQuery {
    /// Only include merchants whose ID or name contains this text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// The column to sort by, prefixed with "-" for descending order, e.g. "-name".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl MerchantQuery {
    /// Parse the `sort` parameter.
    ///
    /// # Errors
    /// Returns [Error::InvalidSortColumn] if it does not name a merchant column.
    pub fn parsed_sort(&self) -> Result<Option<Sort<MerchantColumn>>, Error> {
        let Some(sort) = self.sort.as_deref().map(str::trim) else {
            return Ok(None);
        };

        if sort.is_empty() {
            return Ok(None);
        }

        let (direction, column) = match sort.strip_prefix('-') {
            Some(column) => (SortDirection::Desc, column),
            None => (SortDirection::Asc, sort),
        };

        Ok(Some(Sort {
            column: column.parse()?,
            direction,
        }))
    }
}

/// The query parameters for listing transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    /// Only include transactions of this merchant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<MerchantId>,
    /// The 1-based page number.
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_size() -> u64 {
    DEFAULT_TRANSACTION_PAGE_SIZE
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            merchant_id: None,
            page: default_page(),
            size: default_size(),
        }
    }
}

/// One page of transactions, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub content: Vec<TransactionSummary>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub page: u64,
    pub size: u64,
}

/// Every transaction of one merchant, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantTransactions {
    pub data: Vec<Transaction>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}
