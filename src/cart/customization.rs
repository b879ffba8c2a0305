//! Customizations

use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

use crate::catalog::{CatalogItem, OptionGroup, OptionKind};

/// A choice made against one of an item's option groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Customization {
    /// A single pizza type
    PizzaType(String),

    /// A single soda
    Soda(String),

    /// Exactly two sodas
    SodaPair([String; 2]),
}

/// Errors raised when a customization does not fit the item's schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CustomizationError {
    /// The item has no option group of this kind.
    #[error("{item} does not offer a {kind} option")]
    Unsupported {
        /// Item slug
        item: String,
        /// Requested kind
        kind: OptionKind,
    },

    /// The value is not one of the group's choices.
    #[error("{choice:?} is not a {kind} choice for {item}")]
    NotAllowed {
        /// Item slug
        item: String,
        /// Group kind
        kind: OptionKind,
        /// Rejected value
        choice: String,
    },

    /// The same group was chosen twice.
    #[error("{kind} chosen more than once for {item}")]
    Duplicate {
        /// Item slug
        item: String,
        /// Group kind
        kind: OptionKind,
    },
}

impl Customization {
    /// The option group this customization answers.
    pub fn kind(&self) -> OptionKind {
        match self {
            Customization::PizzaType(_) => OptionKind::PizzaType,
            Customization::Soda(_) => OptionKind::Soda,
            Customization::SodaPair(_) => OptionKind::SodaPair,
        }
    }

    /// Checks the choice against `item` and rewrites it to the catalog's lowercased spelling.
    ///
    /// # Errors
    ///
    /// Returns a [`CustomizationError`] if the item has no such group or a value is not offered.
    pub fn normalize(self, item: &CatalogItem) -> Result<Self, CustomizationError> {
        let kind = self.kind();

        let group = item
            .option_group(kind)
            .ok_or_else(|| CustomizationError::Unsupported {
                item: item.slug.clone(),
                kind,
            })?;

        Ok(match self {
            Customization::PizzaType(value) => {
                Customization::PizzaType(choose(group, item, &value)?)
            }
            Customization::Soda(value) => Customization::Soda(choose(group, item, &value)?),
            Customization::SodaPair([first, second]) => Customization::SodaPair([
                choose(group, item, &first)?,
                choose(group, item, &second)?,
            ]),
        })
    }
}

fn choose(group: &OptionGroup, item: &CatalogItem, value: &str) -> Result<String, CustomizationError> {
    group
        .find_choice(value)
        .map(str::to_lowercase)
        .ok_or_else(|| CustomizationError::NotAllowed {
            item: item.slug.clone(),
            kind: group.kind,
            choice: value.to_string(),
        })
}

/// Normalizes every selection and rejects repeated groups. Selections may leave groups unset.
///
/// # Errors
///
/// Returns the first [`CustomizationError`] encountered.
pub fn validate_selections(
    item: &CatalogItem,
    selections: impl IntoIterator<Item = Customization>,
) -> Result<SmallVec<[Customization; 2]>, CustomizationError> {
    let mut chosen: SmallVec<[Customization; 2]> = SmallVec::new();

    for selection in selections {
        let kind = selection.kind();

        if chosen.iter().any(|existing| existing.kind() == kind) {
            return Err(CustomizationError::Duplicate {
                item: item.slug.clone(),
                kind,
            });
        }

        chosen.push(selection.normalize(item)?);
    }

    Ok(chosen)
}

impl fmt::Display for Customization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.kind().label();

        match self {
            Customization::PizzaType(value) | Customization::Soda(value) => {
                write!(f, "{label}: {value}")
            }
            Customization::SodaPair([first, second]) => write!(f, "{label}: {first}, {second}"),
        }
    }
}
