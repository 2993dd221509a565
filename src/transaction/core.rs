//! The transaction domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    list_view::{Listable, SortValue},
    merchant::MerchantId,
};

/// The outcome of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
    Pending,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 3] = [
        TransactionStatus::Success,
        TransactionStatus::Failed,
        TransactionStatus::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Pending => "pending",
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidTransactionStatus(s.to_owned()))
    }
}

/// A single payment attributed to a merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub merchant_id: MerchantId,
    pub amount: f64,
    pub currency: String,
    pub status: TransactionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A transaction together with the name of its merchant, as shown in the transactions list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub merchant_name: String,
}

/// The fields a list of transactions can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionColumn {
    Id,
    Merchant,
    Amount,
    Status,
    Date,
    Description,
}

fn transaction_sort_value(
    transaction: &Transaction,
    column: TransactionColumn,
) -> Option<SortValue<'_>> {
    match column {
        TransactionColumn::Id => Some(SortValue::Text(&transaction.id)),
        TransactionColumn::Merchant => Some(SortValue::Text(&transaction.merchant_id)),
        TransactionColumn::Amount => Some(SortValue::Number(transaction.amount)),
        TransactionColumn::Status => Some(SortValue::Text(transaction.status.as_str())),
        TransactionColumn::Date => Some(SortValue::Number(
            transaction.date.unix_timestamp_nanos() as f64,
        )),
        TransactionColumn::Description => {
            transaction.description.as_deref().map(SortValue::Text)
        }
    }
}

impl Listable for Transaction {
    type Column = TransactionColumn;

    fn matches_search(&self, needle: &str) -> bool {
        self.id.to_lowercase().contains(needle) || self.merchant_id.to_lowercase().contains(needle)
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn sort_value(&self, column: TransactionColumn) -> Option<SortValue<'_>> {
        transaction_sort_value(self, column)
    }
}

impl Listable for TransactionSummary {
    type Column = TransactionColumn;

    fn matches_search(&self, needle: &str) -> bool {
        self.merchant_name.to_lowercase().contains(needle)
            || self.transaction.id.to_lowercase().contains(needle)
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.transaction.status.as_str())
    }

    fn sort_value(&self, column: TransactionColumn) -> Option<SortValue<'_>> {
        match column {
            TransactionColumn::Merchant => Some(SortValue::Text(&self.merchant_name)),
            column => transaction_sort_value(&self.transaction, column),
        }
    }
}
