//! Merchant management.
//!
//! This module contains everything related to merchants:
//! - The `Merchant` model, the create and update payloads, and the in-memory
//!   repository used by the mock API
//! - The form validators and the add and edit flows
//! - The list, details, add and edit pages, and the JSON API routes

mod api;
mod core;
mod create;
mod details;
mod edit;
mod form;
mod list_page;
mod repository;
pub mod validation;

pub use api::{
    get_merchant_endpoint, list_merchants_endpoint, merchant_stats_endpoint,
    merchant_transactions_endpoint, post_merchant_endpoint, put_merchant_endpoint,
};
pub use core::{
    Merchant, MerchantColumn, MerchantId, MerchantStats, MerchantStatus, MerchantUpdate,
    NewMerchant,
};
pub use create::{create_merchant_endpoint, get_new_merchant_page};
pub use details::get_merchant_page;
pub use edit::{get_edit_merchant_page, update_merchant_endpoint};
pub use form::merchant_form_field_endpoint;
pub use list_page::{get_merchants_page, get_merchants_table};
pub use repository::MerchantRepository;
