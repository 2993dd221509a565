//! Transactions: the domain types, the in-memory store, the auto-refreshing
//! feeds and the pages and routes that show them.

mod api;
mod core;
mod feed;
mod list_page;
mod repository;

pub use api::list_transactions_endpoint;
pub use core::{Transaction, TransactionColumn, TransactionStatus, TransactionSummary};
pub use feed::{FeedSnapshot, TransactionFeed, TransactionFeeds};
pub use list_page::{get_transactions_page, get_transactions_panel, retry_transactions_endpoint};
pub use repository::TransactionRepository;
