//! Delivery address checks
//!
//! Two policies are available. [`KeywordMatch`] looks for local place names in the address text;
//! it accepts plenty of addresses outside the delivery area and rejects some inside it.
//! [`RadiusCheck`] resolves the address through a [`Geocoder`] and compares its great-circle
//! distance from the restaurant against a maximum radius.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::debug;

/// Mean Earth radius in miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    /// Latitude
    pub lat: f64,

    /// Longitude
    pub lng: f64,
}

impl Coordinates {
    /// Create coordinates from latitude and longitude.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Great-circle distance between two points, in miles (haversine formula).
pub fn haversine_miles(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Decides whether an address can be delivered to.
pub trait AddressCheck: fmt::Debug {
    /// Returns true if the address is deliverable.
    fn accepts(&self, address: &str) -> bool;
}

/// Accepts any address containing one of a fixed set of keywords, ignoring case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    keywords: Vec<String>,
}

impl KeywordMatch {
    /// Keywords for the Houston delivery area: city, state abbreviation, state name and the
    /// local ZIP prefix.
    pub const HOUSTON: [&'static str; 4] = ["houston", "tx", "texas", "77"];

    /// Match against the given keywords.
    pub fn new<S: AsRef<str>>(keywords: impl IntoIterator<Item = S>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.as_ref().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        }
    }

    /// The Houston keyword set.
    pub fn houston() -> Self {
        Self::new(Self::HOUSTON)
    }

    /// Keywords, lowercased.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl AddressCheck for KeywordMatch {
    fn accepts(&self, address: &str) -> bool {
        let address = address.to_lowercase();

        self.keywords
            .iter()
            .any(|keyword| address.contains(keyword.as_str()))
    }
}

/// Resolves free-text addresses to coordinates.
pub trait Geocoder: fmt::Debug {
    /// Coordinates for `address`, or `None` if it cannot be resolved.
    fn locate(&self, address: &str) -> Option<Coordinates>;
}

/// A fixed address book. Lookups ignore case and collapse whitespace.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    entries: FxHashMap<String, Coordinates>,
}

impl StaticGeocoder {
    /// Empty address book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    pub fn insert(&mut self, address: &str, coordinates: Coordinates) {
        self.entries.insert(normalize(address), coordinates);
    }

    /// Add an entry, builder style.
    #[must_use]
    pub fn with(mut self, address: &str, coordinates: Coordinates) -> Self {
        self.insert(address, coordinates);
        self
    }

    /// Number of known addresses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the address book is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Geocoder for StaticGeocoder {
    fn locate(&self, address: &str) -> Option<Coordinates> {
        self.entries.get(&normalize(address)).copied()
    }
}

fn normalize(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Accepts addresses that geocode to within `max_miles` of `origin`.
#[derive(Debug, Clone)]
pub struct RadiusCheck<G> {
    origin: Coordinates,
    max_miles: f64,
    geocoder: G,
}

impl<G: Geocoder> RadiusCheck<G> {
    /// Check distance from `origin` using `geocoder`.
    pub fn new(origin: Coordinates, max_miles: f64, geocoder: G) -> Self {
        Self {
            origin,
            max_miles,
            geocoder,
        }
    }

    /// Distance in miles from the origin, if the address resolves.
    pub fn distance(&self, address: &str) -> Option<f64> {
        self.geocoder
            .locate(address)
            .map(|point| haversine_miles(self.origin, point))
    }
}

impl<G: Geocoder> AddressCheck for RadiusCheck<G> {
    fn accepts(&self, address: &str) -> bool {
        let Some(miles) = self.distance(address) else {
            debug!("delivery address could not be geocoded");
            return false;
        };

        debug!(miles, max_miles = self.max_miles, "geocoded delivery address");

        miles <= self.max_miles
    }
}
