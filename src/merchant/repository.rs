//! In-memory storage for merchants.

use crate::{
    Error,
    merchant::{Merchant, MerchantId, MerchantUpdate, NewMerchant},
};

/// The prefix of generated merchant IDs.
const ID_PREFIX: &str = "MCH";

/// Holds every merchant known to the mock transport.
///
/// IDs are generated from the largest numeric suffix in the repository, so
/// every call that inserts must have exclusive access (the transport keeps
/// the repository behind a mutex).
#[derive(Debug, Default, Clone)]
pub struct MerchantRepository {
    merchants: Vec<Merchant>,
}

impl MerchantRepository {
    pub fn new(merchants: Vec<Merchant>) -> Self {
        Self { merchants }
    }

    pub fn all(&self) -> &[Merchant] {
        &self.merchants
    }

    /// Get a merchant by ID.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no merchant with `id`.
    pub fn get(&self, id: &str) -> Result<&Merchant, Error> {
        self.merchants
            .iter()
            .find(|merchant| merchant.id == id)
            .ok_or(Error::NotFound)
    }

    /// Store a new merchant under the next free ID.
    ///
    /// # Errors
    /// Returns [Error::MerchantIdsExhausted] if no ID is left.
    pub fn insert(&mut self, new_merchant: NewMerchant) -> Result<Merchant, Error> {
        let merchant = new_merchant.with_id(self.next_id()?);
        self.merchants.push(merchant.clone());

        Ok(merchant)
    }

    /// Merge `update` into the merchant with `id` and return the result.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no merchant with `id`.
    pub fn update(&mut self, id: &str, update: MerchantUpdate) -> Result<Merchant, Error> {
        let merchant = self
            .merchants
            .iter_mut()
            .find(|merchant| merchant.id == id)
            .ok_or(Error::NotFound)?;

        update.apply_to(merchant);

        Ok(merchant.clone())
    }

    /// The ID the next inserted merchant gets, e.g. "MCH-00013".
    ///
    /// The number is one more than the largest numeric suffix in use.
    /// IDs without a numeric suffix count as zero.
    ///
    /// # Errors
    /// Returns [Error::MerchantIdsExhausted] if the largest suffix is
    /// already `u64::MAX`.
    pub fn next_id(&self) -> Result<MerchantId, Error> {
        let max_suffix = self
            .merchants
            .iter()
            .filter_map(|merchant| merchant.id.split('-').nth(1))
            .map(|suffix| suffix.parse::<u64>().unwrap_or(0))
            .max()
            .unwrap_or(0);

        let next = max_suffix
            .checked_add(1)
            .ok_or(Error::MerchantIdsExhausted)?;

        Ok(format!("{ID_PREFIX}-{next:05}"))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        merchant::{Merchant, MerchantStatus, MerchantUpdate, NewMerchant, MerchantRepository},
    };

    fn new_merchant(name: &str) -> NewMerchant {
        NewMerchant {
            name: name.to_owned(),
            category: "Retail".to_owned(),
            address: "1 Main St".to_owned(),
            status: MerchantStatus::Pending,
            email: "ops@example.com".to_owned(),
            phone: "555-0100".to_owned(),
        }
    }

    fn with_ids(ids: &[&str]) -> MerchantRepository {
        MerchantRepository::new(
            ids.iter()
                .map(|id| new_merchant("Existing").with_id((*id).to_owned()))
                .collect::<Vec<Merchant>>(),
        )
    }

    #[test]
    fn first_id_is_one() {
        let mut repository = MerchantRepository::default();

        let merchant = repository.insert(new_merchant("Acme")).unwrap();

        assert_eq!(merchant.id, "MCH-00001");
        assert_eq!(repository.all(), [merchant]);
    }

    #[test]
    fn next_id_follows_the_largest_suffix() {
        let repository = with_ids(&["MCH-00002", "MCH-00010", "MCH-00007"]);

        assert_eq!(repository.next_id(), Ok("MCH-00011".to_owned()));
    }

    #[test]
    fn ids_without_numeric_suffix_count_as_zero() {
        let repository = with_ids(&["mock-abc", "legacy"]);

        assert_eq!(repository.next_id(), Ok("MCH-00001".to_owned()));
    }

    #[test]
    fn next_id_fails_when_suffixes_run_out() {
        let mut repository = with_ids(&["MCH-18446744073709551615"]);

        assert_eq!(repository.next_id(), Err(Error::MerchantIdsExhausted));
        assert_eq!(
            repository.insert(new_merchant("Acme")),
            Err(Error::MerchantIdsExhausted)
        );
        assert_eq!(repository.all().len(), 1);
    }

    #[test]
    fn update_merges_into_existing_merchant() {
        let mut repository = MerchantRepository::default();
        let created = repository.insert(new_merchant("Acme")).unwrap();

        let updated = repository
            .update(
                &created.id,
                MerchantUpdate {
                    phone: Some("555-0199".to_owned()),
                    ..Default::default()
                },
            )
            .expect("could not update merchant");

        assert_eq!(updated.phone, "555-0199");
        assert_eq!(updated.name, "Acme");
        assert_eq!(repository.get(&created.id), Ok(&updated));
    }

    #[test]
    fn update_missing_merchant_is_not_found() {
        let mut repository = MerchantRepository::default();

        let result = repository.update("MCH-00042", MerchantUpdate::default());

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_missing_merchant_is_not_found() {
        let repository = with_ids(&["MCH-00001"]);

        assert_eq!(repository.get("MCH-00002"), Err(Error::NotFound));
    }
}
