//! Checkout form validation
//!
//! Rules run in order and the first failure wins:
//!
//! 1. every field is filled in
//! 2. the email looks like `local@domain.tld`
//! 3. the phone number has at least ten digits
//! 4. the address passes the configured [`AddressCheck`]

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::customer::{CustomerInfo, Field};

pub mod address;

pub use address::{
    AddressCheck, Coordinates, Geocoder, KeywordMatch, RadiusCheck, StaticGeocoder,
};

/// Minimum number of digits in a phone number.
pub const MIN_PHONE_DIGITS: usize = 10;

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Why the checkout form was rejected. The display text is shown to the customer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("Please fill in all required fields")]
    MissingField(Field),

    /// The email address is malformed.
    #[error("Please enter a valid email address")]
    InvalidEmail,

    /// The phone number has too few digits.
    #[error("Please enter a valid phone number")]
    InvalidPhone {
        /// Digits found after stripping formatting
        digits: usize,
    },

    /// The address failed the delivery area check.
    #[error(
        "Unable to verify delivery address. Please ensure you're within our {radius_miles}-mile delivery radius from {restaurant_address}"
    )]
    UndeliverableAddress {
        /// Advertised delivery radius
        radius_miles: f64,
        /// Restaurant street address
        restaurant_address: String,
    },
}

/// Validates checkout details. Never touches cart or catalog state.
#[derive(Debug)]
pub struct OrderFormValidator {
    address_check: Box<dyn AddressCheck>,
    restaurant_address: String,
    radius_miles: f64,
}

impl OrderFormValidator {
    /// Validator using `address_check` for rule 4. The restaurant address and radius only feed the
    /// rejection message.
    pub fn new(
        address_check: impl AddressCheck + 'static,
        restaurant_address: impl Into<String>,
        radius_miles: f64,
    ) -> Self {
        Self {
            address_check: Box::new(address_check),
            restaurant_address: restaurant_address.into(),
            radius_miles,
        }
    }

    /// Validate `info`, returning it unchanged on success.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule as a [`ValidationError`].
    pub fn validate<'i>(&self, info: &'i CustomerInfo) -> Result<&'i CustomerInfo, ValidationError> {
        if let Some(field) = Field::ALL
            .into_iter()
            .find(|field| info.field(*field).is_empty())
        {
            return Err(ValidationError::MissingField(field));
        }

        if !is_valid_email(&info.email) {
            return Err(ValidationError::InvalidEmail);
        }

        let digits = phone_digits(&info.phone);

        if digits < MIN_PHONE_DIGITS {
            return Err(ValidationError::InvalidPhone { digits });
        }

        if !self.address_check.accepts(&info.address) {
            return Err(ValidationError::UndeliverableAddress {
                radius_miles: self.radius_miles,
                restaurant_address: self.restaurant_address.clone(),
            });
        }

        Ok(info)
    }
}

/// Whether `email` has a `local@domain.tld` shape with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Number of ASCII digits in `phone`.
pub fn phone_digits(phone: &str) -> usize {
    phone.chars().filter(char::is_ascii_digit).count()
}
