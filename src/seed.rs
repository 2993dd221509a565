//! Sample data for the mock merchant API.

use rand::Rng;
use time::{Duration, OffsetDateTime};

use crate::{
    merchant::{Merchant, MerchantStatus},
    transaction::{Transaction, TransactionStatus},
};

/// How many transactions are generated for each sample merchant.
pub const TRANSACTIONS_PER_MERCHANT: usize = 15;

/// Generated transactions are spread over this many days before now.
const TRANSACTION_HISTORY_DAYS: i64 = 30;

const DESCRIPTIONS: [&str; 6] = [
    "Card payment",
    "Online order",
    "Subscription renewal",
    "In-store purchase",
    "Refund adjustment",
    "Invoice settlement",
];

/// The merchants the mock API starts with.
pub fn sample_merchants() -> Vec<Merchant> {
    let merchants = [
        ("Blue Bottle Coffee", "Food & Beverage", "300 Webster St, Oakland", MerchantStatus::Active),
        ("Northwind Traders", "Wholesale", "12 Harbour Rd, Seattle", MerchantStatus::Active),
        ("Contoso Electronics", "Electronics", "88 Market St, San Francisco", MerchantStatus::Pending),
        ("Fabrikam Apparel", "Retail", "5 Fashion Ave, New York", MerchantStatus::Active),
        ("Tailspin Toys", "Retail", "41 Elm St, Portland", MerchantStatus::Inactive),
        ("Wide World Importers", "Wholesale", "7 Dock Rd, Long Beach", MerchantStatus::Active),
        ("Adventure Works Cycles", "Sporting Goods", "19 Trail Way, Denver", MerchantStatus::Pending),
        ("Coho Vineyard", "Food & Beverage", "1 Vine Ln, Napa", MerchantStatus::Active),
        ("Litware Books", "Media", "230 Reading Rd, Boston", MerchantStatus::Inactive),
        ("Proseware Health", "Healthcare", "64 Clinic Dr, Austin", MerchantStatus::Active),
        ("Margie's Travel", "Travel", "9 Airport Blvd, Chicago", MerchantStatus::Pending),
        ("Alpine Ski House", "Sporting Goods", "3 Summit Rd, Aspen", MerchantStatus::Active),
    ];

    merchants
        .into_iter()
        .enumerate()
        .map(|(i, (name, category, address, status))| {
            let slug: String = name
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect::<String>()
                .to_lowercase();

            Merchant {
                id: format!("MCH-{:05}", i + 1),
                name: name.to_owned(),
                category: category.to_owned(),
                address: address.to_owned(),
                status,
                email: format!("contact@{slug}.example"),
                phone: format!("555-01{:02}", i + 1),
            }
        })
        .collect()
}

/// Generate [TRANSACTIONS_PER_MERCHANT] random transactions for each merchant,
/// dated within the month before `now`.
pub fn sample_transactions(
    merchants: &[Merchant],
    rng: &mut impl Rng,
    now: OffsetDateTime,
) -> Vec<Transaction> {
    let mut transactions = Vec::with_capacity(merchants.len() * TRANSACTIONS_PER_MERCHANT);

    for merchant in merchants {
        let suffix = merchant
            .id
            .split('-')
            .nth(1)
            .unwrap_or(merchant.id.as_str());

        for i in 0..TRANSACTIONS_PER_MERCHANT {
            let amount = (rng.gen_range(1.0..500.0_f64) * 100.0).round() / 100.0;
            let status = TransactionStatus::ALL[rng.gen_range(0..TransactionStatus::ALL.len())];
            let age = Duration::seconds(rng.gen_range(0..TRANSACTION_HISTORY_DAYS * 24 * 3600));
            let description = rng
                .gen_bool(0.8)
                .then(|| DESCRIPTIONS[rng.gen_range(0..DESCRIPTIONS.len())].to_owned());

            transactions.push(Transaction {
                id: format!("TXN-{suffix}-{}", i + 1),
                merchant_id: merchant.id.clone(),
                amount,
                currency: "USD".to_owned(),
                status,
                date: now - age,
                description,
            });
        }
    }

    transactions
}
