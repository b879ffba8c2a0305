//! Cart
//!
//! Ordered, in-memory collection of line items. Lines keep the order they were added in and
//! always have a quantity of at least one; any edit that would take a line to zero removes it.

use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::CatalogItem,
    pricing::{Price, PricingError, Totals, subtotal},
};

pub mod customization;
pub mod line;

pub use customization::{Customization, CustomizationError};
pub use line::{CartLine, LineId, LineOptions, LineUpdate};

/// Errors related to adding items to the cart or pricing it.
#[derive(Debug, Error)]
pub enum CartError {
    /// The item's currency differs from the cart currency.
    #[error("{slug} is priced in {item}, but the cart uses {cart}")]
    CurrencyMismatch {
        /// Item slug
        slug: String,
        /// Item currency
        item: &'static str,
        /// Cart currency
        cart: &'static str,
    },

    /// A customization does not match the item.
    #[error(transparent)]
    Customization(#[from] CustomizationError),

    /// Money arithmetic failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// What an edit did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The line was changed in place.
    Updated,

    /// The quantity reached zero, so the line was removed.
    Removed,

    /// No line has the given id; nothing changed.
    NotFound,
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
        }
    }

    /// Add one unit of `item` as a new line at the end of the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the item is priced in another currency or a customization is
    /// not offered by the item.
    pub fn add(&mut self, item: &CatalogItem, options: LineOptions) -> Result<LineId, CartError> {
        let item_currency = item.price.currency();

        if item_currency != self.currency {
            return Err(CartError::CurrencyMismatch {
                slug: item.slug.clone(),
                item: item_currency.iso_alpha_code,
                cart: self.currency.iso_alpha_code,
            });
        }

        let customizations = customization::validate_selections(item, options.customizations)?;

        let line = CartLine::new(
            item.slug.clone(),
            item.name.clone(),
            item.price,
            LineOptions {
                customizations,
                special_instructions: options.special_instructions,
            },
        );

        let id = line.id();

        debug!(line = %id, slug = %item.slug, "added line to cart");

        self.lines.push(line);

        Ok(id)
    }

    /// Remove a line. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: LineId) -> Option<CartLine> {
        let position = self.position(id)?;
        let line = self.lines.remove(position);

        debug!(line = %id, slug = %line.slug(), "removed line from cart");

        Some(line)
    }

    /// Merge `update` into a line. A quantity of zero removes the line.
    pub fn update(&mut self, id: LineId, update: LineUpdate) -> UpdateOutcome {
        if update.quantity == Some(0) {
            return self.remove_outcome(id);
        }

        let Some(line) = self.lines.iter_mut().find(|line| line.id() == id) else {
            return UpdateOutcome::NotFound;
        };

        line.apply(update);

        debug!(line = %id, quantity = line.quantity(), "updated cart line");

        UpdateOutcome::Updated
    }

    /// Set a line's quantity; zero or below removes the line.
    ///
    /// Quantities above `u32::MAX` are clamped to `u32::MAX`.
    pub fn set_quantity(&mut self, id: LineId, quantity: i64) -> UpdateOutcome {
        if quantity <= 0 {
            return self.remove_outcome(id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        self.update(id, LineUpdate::quantity(quantity))
    }

    /// Add one to a line's quantity.
    pub fn increment(&mut self, id: LineId) -> UpdateOutcome {
        match self.get(id) {
            Some(line) => {
                let quantity = line.quantity().saturating_add(1);
                self.update(id, LineUpdate::quantity(quantity))
            }
            None => UpdateOutcome::NotFound,
        }
    }

    /// Take one from a line's quantity, removing the line when it reaches zero.
    pub fn decrement(&mut self, id: LineId) -> UpdateOutcome {
        match self.get(id) {
            Some(line) => {
                let quantity = i64::from(line.quantity()) - 1;
                self.set_quantity(id, quantity)
            }
            None => UpdateOutcome::NotFound,
        }
    }

    fn remove_outcome(&mut self, id: LineId) -> UpdateOutcome {
        if self.remove(id).is_some() {
            UpdateOutcome::Removed
        } else {
            UpdateOutcome::NotFound
        }
    }

    fn position(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|line| line.id() == id)
    }

    /// Look up a line by id.
    pub fn get(&self, id: LineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id() == id)
    }

    /// Lines in the order they were added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Iterate over the lines in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Sum of `unit price * quantity` over all lines.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line total overflows.
    pub fn subtotal(&self) -> Result<Price, PricingError> {
        subtotal(&self.lines, self.currency)
    }

    /// Subtotal plus `flat_fee`, with the fee waived for an empty cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow or if the fee is in another currency.
    pub fn totals(&self, flat_fee: &Price) -> Result<Totals, PricingError> {
        Totals::compute(&self.lines, flat_fee)
    }

    /// Amount due including delivery.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow or if the fee is in another currency.
    pub fn total(&self, flat_fee: &Price) -> Result<Price, PricingError> {
        Ok(self.totals(flat_fee)?.total)
    }

    /// Remove every line, returning them in order.
    pub fn take(&mut self) -> Vec<CartLine> {
        std::mem::take(&mut self.lines)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
