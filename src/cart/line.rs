//! Cart lines

use std::{fmt, str::FromStr};

use smallvec::SmallVec;
use uuid::Uuid;

use crate::{
    cart::customization::Customization,
    pricing::{Price, Priced, PricingError, line_total},
};

/// Identifier of a cart line. A fresh one is generated on every add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(Uuid);

impl LineId {
    /// Generate a new, time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for LineId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One entry in the cart.
///
/// Name and price are copied from the catalog when the line is created, so later menu changes
/// never reach an existing line.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    id: LineId,
    slug: String,
    name: String,
    unit_price: Price,
    quantity: u32,
    special_instructions: Option<String>,
    customizations: SmallVec<[Customization; 2]>,
}

impl CartLine {
    pub(crate) fn new(
        slug: String,
        name: String,
        unit_price: Price,
        options: LineOptions,
    ) -> Self {
        Self {
            id: LineId::generate(),
            slug,
            name,
            unit_price,
            quantity: 1,
            special_instructions: non_blank(options.special_instructions),
            customizations: options.customizations,
        }
    }

    /// Line identifier
    pub fn id(&self) -> LineId {
        self.id
    }

    /// Catalog slug the line was created from
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Item name at the time it was added
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price at the time it was added
    pub fn unit_price(&self) -> &Price {
        &self.unit_price
    }

    /// Quantity, always at least one
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Special instructions, if any
    pub fn special_instructions(&self) -> Option<&str> {
        self.special_instructions.as_deref()
    }

    /// Chosen customizations
    pub fn customizations(&self) -> &[Customization] {
        &self.customizations
    }

    /// Customizations joined for display, e.g. `Pizza: cheese • Sodas: coke, sprite`.
    pub fn customization_summary(&self) -> Option<String> {
        if self.customizations.is_empty() {
            return None;
        }

        Some(
            self.customizations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" • "),
        )
    }

    /// `unit_price * quantity`
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total does not fit in minor units.
    pub fn line_total(&self) -> Result<Price, PricingError> {
        line_total(&self.unit_price, self.quantity)
    }

    pub(crate) fn apply(&mut self, update: LineUpdate) {
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }

        if let Some(instructions) = update.special_instructions {
            self.special_instructions = non_blank(instructions);
        }
    }
}

impl Priced for CartLine {
    fn unit_price(&self) -> &Price {
        &self.unit_price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|text| !text.trim().is_empty())
}

/// Optional extras supplied when adding an item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineOptions {
    /// Customizations, validated against the item's schema on insertion
    pub customizations: SmallVec<[Customization; 2]>,

    /// Free-text instructions for the kitchen
    pub special_instructions: Option<String>,
}

impl LineOptions {
    /// Add a customization.
    #[must_use]
    pub fn with_customization(mut self, customization: Customization) -> Self {
        self.customizations.push(customization);
        self
    }

    /// Set special instructions.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.special_instructions = Some(instructions.into());
        self
    }
}

/// Fields to merge into an existing line. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineUpdate {
    /// New quantity. Zero removes the line.
    pub quantity: Option<u32>,

    /// New instructions; `Some(None)` clears them.
    pub special_instructions: Option<Option<String>>,
}

impl LineUpdate {
    /// Update only the quantity.
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    /// Update only the special instructions.
    pub fn instructions(instructions: Option<String>) -> Self {
        Self {
            special_instructions: Some(instructions),
            ..Self::default()
        }
    }
}
