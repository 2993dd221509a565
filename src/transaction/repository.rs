//! In-memory storage for transactions.

use crate::{merchant::MerchantStats, transaction::Transaction};

/// Holds every transaction known to the mock transport, newest first.
#[derive(Debug, Default, Clone)]
pub struct TransactionRepository {
    transactions: Vec<Transaction>,
}

impl TransactionRepository {
    pub fn new(mut transactions: Vec<Transaction>) -> Self {
        transactions.sort_by(|a, b| b.date.cmp(&a.date));

        Self { transactions }
    }

    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The transactions of `merchant_id`, or every transaction if it is `None`.
    pub fn matching(&self, merchant_id: Option<&str>) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|transaction| {
                merchant_id.is_none_or(|merchant_id| transaction.merchant_id == merchant_id)
            })
            .collect()
    }

    /// Count and sum the transactions of `merchant_id`.
    pub fn stats(&self, merchant_id: &str) -> MerchantStats {
        let transactions = self.matching(Some(merchant_id));
        let total_transactions = transactions.len() as u64;
        let total_volume: f64 = transactions
            .iter()
            .map(|transaction| transaction.amount)
            .sum();
        let average_transaction_value = if total_transactions == 0 {
            0.0
        } else {
            total_volume / total_transactions as f64
        };

        MerchantStats {
            total_transactions,
            total_volume,
            average_transaction_value,
        }
    }
}
