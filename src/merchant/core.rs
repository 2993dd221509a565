//! The merchant domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    list_view::{Listable, SortValue},
};

/// The opaque, server-assigned identifier of a merchant, e.g. "MCH-00001".
pub type MerchantId = String;

/// The lifecycle status of a merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MerchantStatus {
    Active,
    Inactive,
    Pending,
}

impl MerchantStatus {
    /// All statuses in the order they are shown in selection controls.
    pub const ALL: [MerchantStatus; 3] = [
        MerchantStatus::Active,
        MerchantStatus::Inactive,
        MerchantStatus::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MerchantStatus::Active => "Active",
            MerchantStatus::Inactive => "Inactive",
            MerchantStatus::Pending => "Pending",
        }
    }
}

impl Display for MerchantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MerchantStatus {
    type Err = Error;

    /// Parse a status, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MerchantStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidMerchantStatus(s.to_owned()))
    }
}

/// A business that can submit transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: MerchantId,
    pub name: String,
    pub category: String,
    pub address: String,
    pub status: MerchantStatus,
    pub email: String,
    pub phone: String,
}

/// The fields needed to create a merchant. The ID is assigned by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMerchant {
    pub name: String,
    pub category: String,
    pub address: String,
    pub status: MerchantStatus,
    pub email: String,
    pub phone: String,
}

impl NewMerchant {
    /// Attach an identifier to the new merchant.
    pub fn with_id(self, id: MerchantId) -> Merchant {
        Merchant {
            id,
            name: self.name,
            category: self.category,
            address: self.address,
            status: self.status,
            email: self.email,
            phone: self.phone,
        }
    }
}

/// A partial update to a merchant.
///
/// Fields set to `None` keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MerchantUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MerchantStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl MerchantUpdate {
    /// Merge the present fields of the update into `merchant`.
    ///
    /// The merchant's ID is never changed.
    pub fn apply_to(self, merchant: &mut Merchant) {
        if let Some(name) = self.name {
            merchant.name = name;
        }
        if let Some(category) = self.category {
            merchant.category = category;
        }
        if let Some(address) = self.address {
            merchant.address = address;
        }
        if let Some(status) = self.status {
            merchant.status = status;
        }
        if let Some(email) = self.email {
            merchant.email = email;
        }
        if let Some(phone) = self.phone {
            merchant.phone = phone;
        }
    }
}

impl From<NewMerchant> for MerchantUpdate {
    fn from(merchant: NewMerchant) -> Self {
        Self {
            name: Some(merchant.name),
            category: Some(merchant.category),
            address: Some(merchant.address),
            status: Some(merchant.status),
            email: Some(merchant.email),
            phone: Some(merchant.phone),
        }
    }
}

/// Aggregate figures about a merchant's transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantStats {
    pub total_transactions: u64,
    pub total_volume: f64,
    pub average_transaction_value: f64,
}

/// The merchant fields that a merchant list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantColumn {
    Id,
    Name,
    Category,
    Email,
    Phone,
    Status,
}

impl MerchantColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            MerchantColumn::Id => "id",
            MerchantColumn::Name => "name",
            MerchantColumn::Category => "category",
            MerchantColumn::Email => "email",
            MerchantColumn::Phone => "phone",
            MerchantColumn::Status => "status",
        }
    }
}

impl FromStr for MerchantColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(MerchantColumn::Id),
            "name" => Ok(MerchantColumn::Name),
            "category" => Ok(MerchantColumn::Category),
            "email" => Ok(MerchantColumn::Email),
            "phone" => Ok(MerchantColumn::Phone),
            "status" => Ok(MerchantColumn::Status),
            other => Err(Error::InvalidSortColumn(other.to_owned())),
        }
    }
}

impl Listable for Merchant {
    type Column = MerchantColumn;

    fn matches_search(&self, needle: &str) -> bool {
        self.id.to_lowercase().contains(needle) || self.name.to_lowercase().contains(needle)
    }

    fn status_label(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn sort_value(&self, column: MerchantColumn) -> Option<SortValue<'_>> {
        let text = match column {
            MerchantColumn::Id => &self.id,
            MerchantColumn::Name => &self.name,
            MerchantColumn::Category => &self.category,
            MerchantColumn::Email => &self.email,
            MerchantColumn::Phone => &self.phone,
            MerchantColumn::Status => return Some(SortValue::Text(self.status.as_str())),
        };

        Some(SortValue::Text(text))
    }
}
