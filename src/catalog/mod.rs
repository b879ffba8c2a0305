//! Catalog
//!
//! The menu is read once at startup and never mutated. Items are stored in a [`SlotMap`] and
//! addressed either by [`CatalogKey`] or by their slug; iteration follows menu order.

use std::{fmt, fs, path::Path};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;
use thiserror::Error;

use crate::pricing::{Price, PricingError};

pub mod menu;

new_key_type! {
    /// Catalog Key
    pub struct CatalogKey;
}

const BUILTIN_MENU: &str = include_str!("../../fixtures/menu.yml");

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the menu file
    #[error("Failed to read menu file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price on a menu item
    #[error("Invalid price for {slug}: {source}")]
    Price {
        /// Item slug
        slug: String,
        /// Underlying parse error
        source: PricingError,
    },

    /// A menu item is priced below zero
    #[error("Negative price for {slug}")]
    NegativePrice {
        /// Item slug
        slug: String,
    },

    /// Currency mismatch between items
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Two items share a slug
    #[error("Duplicate menu item: {0}")]
    DuplicateSlug(String),

    /// An option group offers nothing to choose from
    #[error("Option group {kind} on {slug} has no choices")]
    EmptyOptionGroup {
        /// Item slug
        slug: String,
        /// Group kind
        kind: OptionKind,
    },

    /// An item declares the same option group twice
    #[error("Option group {kind} declared twice on {slug}")]
    DuplicateOptionGroup {
        /// Item slug
        slug: String,
        /// Group kind
        kind: OptionKind,
    },

    /// The menu has no items, so its currency is unknown
    #[error("Menu has no items")]
    Empty,
}

/// Kind of customization an item offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    /// Choose one pizza type
    PizzaType,

    /// Choose one soda
    Soda,

    /// Choose exactly two sodas
    SodaPair,
}

impl OptionKind {
    /// Label shown next to the chosen value.
    pub fn label(self) -> &'static str {
        match self {
            OptionKind::PizzaType => "Pizza",
            OptionKind::Soda => "Soda",
            OptionKind::SodaPair => "Sodas",
        }
    }

    /// Number of selections the group requires when chosen.
    pub fn selections(self) -> usize {
        match self {
            OptionKind::PizzaType | OptionKind::Soda => 1,
            OptionKind::SodaPair => 2,
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::PizzaType => "pizza_type",
            OptionKind::Soda => "soda",
            OptionKind::SodaPair => "soda_pair",
        };

        f.write_str(name)
    }
}

/// A named group of allowed choices on a menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionGroup {
    /// What is being chosen
    pub kind: OptionKind,

    /// Allowed values, in display order
    pub choices: Vec<String>,
}

impl OptionGroup {
    /// Finds the allowed choice matching `value`, ignoring case.
    pub fn find_choice(&self, value: &str) -> Option<&str> {
        let value = value.trim();

        self.choices
            .iter()
            .map(String::as_str)
            .find(|choice| choice.eq_ignore_ascii_case(value))
    }
}

/// Menu item
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    /// Stable identifier, e.g. `cheese-pizza`
    pub slug: String,

    /// Display name
    pub name: String,

    /// Description shown under the name
    pub description: String,

    /// Unit price
    pub price: Price,

    /// Highlighted as a special offer
    pub special: bool,

    /// Customization schema
    pub options: SmallVec<[OptionGroup; 2]>,
}

impl CatalogItem {
    /// Looks up the option group of the given kind.
    pub fn option_group(&self, kind: OptionKind) -> Option<&OptionGroup> {
        self.options.iter().find(|group| group.kind == kind)
    }

    /// Whether the item offers any customization.
    pub fn is_customizable(&self) -> bool {
        !self.options.is_empty()
    }
}

/// The restaurant menu.
#[derive(Debug)]
pub struct Catalog {
    items: SlotMap<CatalogKey, CatalogItem>,
    slugs: FxHashMap<String, CatalogKey>,
    order: Vec<CatalogKey>,
    currency: &'static Currency,
}

impl Catalog {
    /// The menu bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the bundled menu fails to parse.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml(BUILTIN_MENU)
    }

    /// Load a menu from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the menu is inconsistent.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse a menu from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, a price is invalid, items disagree on
    /// currency, or a slug is repeated.
    pub fn from_yaml(contents: &str) -> Result<Self, CatalogError> {
        let fixture: menu::MenuFixture = serde_norway::from_str(contents)?;

        Self::from_items(
            fixture
                .items
                .into_iter()
                .map(CatalogItem::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        )
    }

    /// Build a catalog from already-constructed items, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no items, items disagree on currency, or a slug repeats.
    pub fn from_items(items: impl IntoIterator<Item = CatalogItem>) -> Result<Self, CatalogError> {
        let mut catalog_items = SlotMap::with_key();
        let mut slugs = FxHashMap::default();
        let mut order = Vec::new();
        let mut currency: Option<&'static Currency> = None;

        for item in items {
            let item_currency = item.price.currency();

            match currency {
                Some(existing) if existing != item_currency => {
                    return Err(CatalogError::CurrencyMismatch(
                        existing.iso_alpha_code,
                        item_currency.iso_alpha_code,
                    ));
                }
                Some(_) => {}
                None => currency = Some(item_currency),
            }

            if slugs.contains_key(&item.slug) {
                return Err(CatalogError::DuplicateSlug(item.slug));
            }

            let slug = item.slug.clone();
            let key = catalog_items.insert(item);

            slugs.insert(slug, key);
            order.push(key);
        }

        let currency = currency.ok_or(CatalogError::Empty)?;

        Ok(Self {
            items: catalog_items,
            slugs,
            order,
            currency,
        })
    }

    /// Look up an item by slug.
    pub fn get(&self, slug: &str) -> Option<&CatalogItem> {
        self.slugs.get(slug).and_then(|key| self.items.get(*key))
    }

    /// Look up an item by key.
    pub fn item(&self, key: CatalogKey) -> Option<&CatalogItem> {
        self.items.get(key)
    }

    /// Iterate over items in menu order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> {
        self.order.iter().filter_map(|key| self.items.get(*key))
    }

    /// Number of items on the menu.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the menu is empty. Always false for a constructed catalog.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Currency every item is priced in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
