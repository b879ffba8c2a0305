//! Store configuration
//!
//! Read from a YAML file; every field is optional and falls back to the Houston storefront
//! defaults.
//!
//! ```yaml
//! restaurant:
//!   name: DnD Catering
//!   address: 4515 Dewberry St, Houston, TX 77021
//!   origin: { lat: 29.6844, lng: -95.3137 }
//! delivery:
//!   fee: 10.00 USD
//!   estimated_minutes: 45
//!   policy: radius
//!   max_radius_miles: 12
//!   known_addresses:
//!     - address: 100 Main St, Houston, TX 77002
//!       lat: 29.7604
//!       lng: -95.3698
//! timeline:
//!   - { status: pending, after_secs: 0, minutes_remaining: 45 }
//!   # ...one entry per status
//! ```

use std::{fs, path::Path};

use jiff::SignedDuration;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    catalog::Catalog,
    lifecycle::{LifecycleError, StatusTimeline, TimelineStep},
    notifications::NotificationSink,
    orders::OrderStatus,
    pricing::{Price, PricingError, parse_price},
    storefront::Storefront,
    validation::{Coordinates, KeywordMatch, OrderFormValidator, RadiusCheck, StaticGeocoder},
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The delivery fee is not a valid price
    #[error("Invalid delivery fee: {0}")]
    DeliveryFee(#[from] PricingError),

    /// The delivery fee is below zero
    #[error("Delivery fee cannot be negative: {0}")]
    NegativeFee(String),

    /// The delivery fee and menu use different currencies
    #[error("Delivery fee is in {fee}, but the menu is priced in {menu}")]
    CurrencyMismatch {
        /// Fee currency
        fee: &'static str,
        /// Menu currency
        menu: &'static str,
    },

    /// The status timeline is inconsistent
    #[error("Invalid status timeline: {0}")]
    Timeline(#[from] LifecycleError),
}

/// Top-level store configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Where orders are cooked
    pub restaurant: RestaurantConfig,

    /// Delivery pricing and area
    pub delivery: DeliveryConfig,

    /// Status progression for new orders
    pub timeline: Vec<TimelineEntry>,
}

/// Restaurant details.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RestaurantConfig {
    /// Display name
    pub name: String,

    /// Street address, shown when an address is rejected
    pub address: String,

    /// Location used by the radius policy
    pub origin: Coordinates,
}

impl Default for RestaurantConfig {
    fn default() -> Self {
        Self {
            name: "DnD Catering".to_string(),
            address: "4515 Dewberry St, Houston, TX 77021".to_string(),
            origin: Coordinates::new(29.6844, -95.3137),
        }
    }
}

/// How delivery addresses are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressPolicy {
    /// Accept addresses that mention a local keyword
    #[default]
    Keywords,

    /// Accept known addresses within the delivery radius
    Radius,
}

/// A geocoded address for the radius policy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KnownAddress {
    /// Address as typed by customers
    pub address: String,

    /// Latitude
    pub lat: f64,

    /// Longitude
    pub lng: f64,
}

/// Delivery settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Flat fee, e.g. `10.00 USD`
    pub fee: String,

    /// Minutes from placement to delivery
    pub estimated_minutes: u32,

    /// Address check to use
    pub policy: AddressPolicy,

    /// Keywords for [`AddressPolicy::Keywords`]
    pub keywords: Vec<String>,

    /// Advertised delivery radius, also enforced by [`AddressPolicy::Radius`]
    pub max_radius_miles: f64,

    /// Address book for [`AddressPolicy::Radius`]
    pub known_addresses: Vec<KnownAddress>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            fee: "10.00 USD".to_string(),
            estimated_minutes: 45,
            policy: AddressPolicy::default(),
            keywords: Vec::from(KeywordMatch::HOUSTON.map(String::from)),
            max_radius_miles: 12.0,
            known_addresses: Vec::new(),
        }
    }
}

/// One timeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimelineEntry {
    /// Status reached
    pub status: OrderStatus,

    /// Seconds after placement
    pub after_secs: u32,

    /// Estimated minutes until delivery
    pub minutes_remaining: u32,
}

impl From<TimelineEntry> for TimelineStep {
    fn from(entry: TimelineEntry) -> Self {
        TimelineStep::new(
            entry.status,
            i64::from(entry.after_secs),
            entry.minutes_remaining,
        )
    }
}

impl StoreConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML. Empty input gives the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or has unknown fields.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_norway::from_str(contents)?)
    }

    /// Parsed delivery fee.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DeliveryFee`] if the fee is not `AMOUNT CURRENCY`, or
    /// [`ConfigError::NegativeFee`] if it is below zero.
    pub fn delivery_fee(&self) -> Result<Price, ConfigError> {
        let fee = parse_price(&self.delivery.fee)?;

        if fee.is_negative() {
            return Err(ConfigError::NegativeFee(self.delivery.fee.clone()));
        }

        Ok(fee)
    }

    /// Placement-to-delivery estimate.
    pub fn delivery_window(&self) -> SignedDuration {
        SignedDuration::from_mins(i64::from(self.delivery.estimated_minutes))
    }

    /// Status timeline, or the default one if none is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Timeline`] if the configured steps are inconsistent.
    pub fn timeline(&self) -> Result<StatusTimeline, ConfigError> {
        if self.timeline.is_empty() {
            return Ok(StatusTimeline::default());
        }

        let steps: Vec<TimelineStep> = self.timeline.iter().copied().map(Into::into).collect();

        Ok(StatusTimeline::new(steps)?)
    }

    /// Checkout validator using the configured address policy.
    pub fn validator(&self) -> OrderFormValidator {
        let address = self.restaurant.address.clone();
        let radius = self.delivery.max_radius_miles;

        match self.delivery.policy {
            AddressPolicy::Keywords => OrderFormValidator::new(
                KeywordMatch::new(&self.delivery.keywords),
                address,
                radius,
            ),
            AddressPolicy::Radius => {
                let geocoder = self.delivery.known_addresses.iter().fold(
                    StaticGeocoder::new(),
                    |geocoder, known| {
                        geocoder.with(&known.address, Coordinates::new(known.lat, known.lng))
                    },
                );

                OrderFormValidator::new(
                    RadiusCheck::new(self.restaurant.origin, radius, geocoder),
                    address,
                    radius,
                )
            }
        }
    }

    /// A storefront for `catalog` configured from these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the fee or timeline is invalid, or the fee is in a different currency
    /// from the menu.
    pub fn storefront<S: NotificationSink>(
        &self,
        catalog: Catalog,
        sink: S,
    ) -> Result<Storefront<S>, ConfigError> {
        let fee = self.delivery_fee()?;

        if fee.currency() != catalog.currency() {
            return Err(ConfigError::CurrencyMismatch {
                fee: fee.currency().iso_alpha_code,
                menu: catalog.currency().iso_alpha_code,
            });
        }

        let timeline = self.timeline()?;
        let validator = self.validator();

        Ok(Storefront::new(catalog, validator, sink)
            .with_delivery_fee(fee)
            .with_delivery_window(self.delivery_window())
            .with_timeline(timeline))
    }
}
