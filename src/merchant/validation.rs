//! Field-level checks for the merchant create and edit forms.

use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use serde::Deserialize;

use crate::{
    Error,
    merchant::{Merchant, MerchantStatus, NewMerchant},
};

/// The fields of the merchant form that are checked before submitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantField {
    Name,
    Email,
    Phone,
    Category,
    Address,
}

impl MerchantField {
    /// The fields in the order they appear in the form.
    pub const ALL: [MerchantField; 5] = [
        MerchantField::Name,
        MerchantField::Email,
        MerchantField::Phone,
        MerchantField::Category,
        MerchantField::Address,
    ];

    /// The name of the form input for this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            MerchantField::Name => "name",
            MerchantField::Email => "email",
            MerchantField::Phone => "phone",
            MerchantField::Category => "category",
            MerchantField::Address => "address",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MerchantField::Name => "Merchant Name",
            MerchantField::Email => "Email",
            MerchantField::Phone => "Phone No.",
            MerchantField::Category => "Category",
            MerchantField::Address => "Address",
        }
    }

    fn required_message(&self) -> &'static str {
        match self {
            MerchantField::Name => "Merchant Name is required",
            MerchantField::Email => "Email is required",
            MerchantField::Phone => "Phone Number is required",
            MerchantField::Category => "Category is required",
            MerchantField::Address => "Address is required",
        }
    }
}

impl Display for MerchantField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MerchantField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MerchantField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::InvalidFormField(s.to_owned()))
    }
}

/// The values submitted with the merchant form.
///
/// Missing inputs deserialize to their empty defaults so that the
/// validator, not the extractor, reports them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MerchantFormData {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub category: String,
    pub address: String,
    pub status: MerchantStatus,
}

impl Default for MerchantFormData {
    /// The empty form shown when adding a merchant.
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            category: String::new(),
            address: String::new(),
            status: MerchantStatus::Pending,
        }
    }
}

impl MerchantFormData {
    pub fn value(&self, field: MerchantField) -> &str {
        match field {
            MerchantField::Name => &self.name,
            MerchantField::Email => &self.email,
            MerchantField::Phone => &self.phone,
            MerchantField::Category => &self.category,
            MerchantField::Address => &self.address,
        }
    }

    pub fn into_new_merchant(self) -> NewMerchant {
        NewMerchant {
            name: self.name,
            category: self.category,
            address: self.address,
            status: self.status,
            email: self.email,
            phone: self.phone,
        }
    }
}

impl From<&Merchant> for MerchantFormData {
    /// The form pre-filled with the stored values of `merchant`.
    fn from(merchant: &Merchant) -> Self {
        Self {
            name: merchant.name.clone(),
            email: merchant.email.clone(),
            phone: merchant.phone.clone(),
            category: merchant.category.clone(),
            address: merchant.address.clone(),
            status: merchant.status,
        }
    }
}

/// Error messages keyed by field. A field without an entry is valid.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<MerchantField, String>);

impl FieldErrors {
    pub fn get(&self, field: MerchantField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: MerchantField, message: &str) {
        self.0.insert(field, message.to_owned());
    }

    /// Remove the error for `field`, e.g. after the user edits it.
    pub fn clear(&mut self, field: MerchantField) {
        self.0.remove(&field);
    }

    pub fn fields(&self) -> impl Iterator<Item = MerchantField> + '_ {
        self.0.keys().copied()
    }

    /// The whole form is valid when there are no errors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Check the merchant form, returning an error for each invalid field.
///
/// Every field is required, and the email must look like `local@domain.tld`.
pub fn validate_merchant_form(form: &MerchantFormData) -> FieldErrors {
    let mut errors = FieldErrors::default();

    for field in MerchantField::ALL {
        if form.value(field).is_empty() {
            errors.insert(field, field.required_message());
        }
    }

    if !form.email.is_empty() && !looks_like_email(&form.email) {
        errors.insert(MerchantField::Email, "Email is invalid");
    }

    errors
}

/// A permissive email check.
///
/// Accepts any value that contains a run of non-whitespace characters, an
/// "@", non-whitespace characters, a "." and at least one more
/// non-whitespace character.
pub fn looks_like_email(value: &str) -> bool {
    value
        .char_indices()
        .filter(|&(_, c)| c == '@')
        .any(|(at, _)| {
            let has_local_part = value[..at]
                .chars()
                .next_back()
                .is_some_and(|c| !c.is_whitespace());
            let domain = value[at + 1..]
                .split(char::is_whitespace)
                .next()
                .unwrap_or_default();
            let has_dotted_domain = domain
                .char_indices()
                .any(|(dot, c)| c == '.' && dot > 0 && dot + 1 < domain.len());

            has_local_part && has_dotted_domain
        })
}

#[cfg(test)]
mod tests {
    use crate::merchant::{
        MerchantStatus,
        validation::{MerchantField, MerchantFormData, looks_like_email, validate_merchant_form},
    };

    fn complete_form() -> MerchantFormData {
        MerchantFormData {
            name: "Acme".to_owned(),
            email: "a@b.c".to_owned(),
            phone: "555-0100".to_owned(),
            category: "Retail".to_owned(),
            address: "1 Main St".to_owned(),
            status: MerchantStatus::Active,
        }
    }

    #[test]
    fn complete_form_is_valid() {
        let errors = validate_merchant_form(&complete_form());

        assert!(errors.is_empty(), "want no errors, got {errors:?}");
    }

    #[test]
    fn missing_email_only_flags_email() {
        let form = MerchantFormData {
            email: String::new(),
            ..complete_form()
        };

        let errors = validate_merchant_form(&form);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(MerchantField::Email), Some("Email is required"));
    }

    #[test]
    fn blank_name_and_invalid_email_are_both_flagged() {
        let form = MerchantFormData {
            name: String::new(),
            email: "foo".to_owned(),
            ..complete_form()
        };

        let errors = validate_merchant_form(&form);

        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            [MerchantField::Name, MerchantField::Email]
        );
        assert_eq!(
            errors.get(MerchantField::Name),
            Some("Merchant Name is required")
        );
        assert_eq!(errors.get(MerchantField::Email), Some("Email is invalid"));
    }

    #[test]
    fn empty_form_flags_every_field() {
        let errors = validate_merchant_form(&MerchantFormData::default());

        assert_eq!(errors.len(), MerchantField::ALL.len());
        assert_eq!(
            errors.get(MerchantField::Phone),
            Some("Phone Number is required")
        );
    }

    #[test]
    fn clearing_one_error_leaves_the_others() {
        let mut errors = validate_merchant_form(&MerchantFormData::default());

        errors.clear(MerchantField::Email);

        assert_eq!(errors.get(MerchantField::Email), None);
        assert_eq!(errors.len(), MerchantField::ALL.len() - 1);
    }

    #[test]
    fn email_check_is_permissive() {
        assert!(looks_like_email("a@b.c"));
        assert!(looks_like_email("first.last@mail.example.com"));
        assert!(looks_like_email("say hi to a@b.co today"));
        assert!(looks_like_email("a@b@c.d"));

        assert!(!looks_like_email("foo"));
        assert!(!looks_like_email("@b.c"));
        assert!(!looks_like_email("a@.c"));
        assert!(!looks_like_email("a@b."));
        assert!(!looks_like_email("a @b.c"));
        assert!(!looks_like_email("a@b .c"));
    }

    #[test]
    fn parses_field_names() {
        assert_eq!("email".parse(), Ok(MerchantField::Email));
        assert!("id".parse::<MerchantField>().is_err());
    }
}
