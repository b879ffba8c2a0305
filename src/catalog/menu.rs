//! Menu Fixtures

use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    catalog::{CatalogError, CatalogItem, OptionGroup, OptionKind},
    pricing::parse_price,
};

/// Wrapper for menu items in YAML
#[derive(Debug, Deserialize)]
pub struct MenuFixture {
    /// Items in display order
    pub items: Vec<MenuItemFixture>,
}

/// Menu Item Fixture
#[derive(Debug, Deserialize)]
pub struct MenuItemFixture {
    /// Item slug
    pub slug: String,

    /// Display name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Unit price (e.g., "15.00 USD")
    pub price: String,

    /// Special offer flag
    #[serde(default)]
    pub special: bool,

    /// Customization groups
    #[serde(default)]
    pub options: Vec<OptionGroupFixture>,
}

/// Option Group Fixture
#[derive(Debug, Deserialize)]
pub struct OptionGroupFixture {
    /// Group kind
    pub kind: OptionKind,

    /// Allowed choices
    pub choices: Vec<String>,
}

impl TryFrom<MenuItemFixture> for CatalogItem {
    type Error = CatalogError;

    fn try_from(fixture: MenuItemFixture) -> Result<Self, Self::Error> {
        let price = parse_price(&fixture.price).map_err(|source| CatalogError::Price {
            slug: fixture.slug.clone(),
            source,
        })?;

        if price.is_negative() {
            return Err(CatalogError::NegativePrice { slug: fixture.slug });
        }

        let mut options: SmallVec<[OptionGroup; 2]> = SmallVec::new();

        for group in fixture.options {
            if group.choices.is_empty() {
                return Err(CatalogError::EmptyOptionGroup {
                    slug: fixture.slug,
                    kind: group.kind,
                });
            }

            if options.iter().any(|existing| existing.kind == group.kind) {
                return Err(CatalogError::DuplicateOptionGroup {
                    slug: fixture.slug,
                    kind: group.kind,
                });
            }

            options.push(OptionGroup {
                kind: group.kind,
                choices: group.choices,
            });
        }

        Ok(CatalogItem {
            slug: fixture.slug,
            name: fixture.name,
            description: fixture.description,
            price,
            special: fixture.special,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingError;

    fn fixture(price: &str, options: Vec<OptionGroupFixture>) -> MenuItemFixture {
        MenuItemFixture {
            slug: "soda".to_string(),
            name: "Soda".to_string(),
            description: String::new(),
            price: price.to_string(),
            special: false,
            options,
        }
    }

    #[test]
    fn invalid_price_names_the_item() {
        let result = CatalogItem::try_from(fixture("three dollars", Vec::new()));

        assert!(matches!(
            result,
            Err(CatalogError::Price { slug, source: PricingError::InvalidPrice(_) }) if slug == "soda"
        ));
    }

    #[test]
    fn negative_price_is_rejected() {
        let result = CatalogItem::try_from(fixture("-50.00 USD", Vec::new()));

        assert!(matches!(
            result,
            Err(CatalogError::NegativePrice { slug }) if slug == "soda"
        ));
    }

    #[test]
    fn free_items_are_allowed() -> Result<(), CatalogError> {
        let item = CatalogItem::try_from(fixture("0.00 USD", Vec::new()))?;

        assert!(item.price.is_zero());

        Ok(())
    }

    #[test]
    fn empty_option_group_is_rejected() {
        let result = CatalogItem::try_from(fixture(
            "3.00 USD",
            vec![OptionGroupFixture {
                kind: OptionKind::Soda,
                choices: Vec::new(),
            }],
        ));

        assert!(matches!(
            result,
            Err(CatalogError::EmptyOptionGroup {
                kind: OptionKind::Soda,
                ..
            })
        ));
    }

    #[test]
    fn repeated_option_group_is_rejected() {
        let group = || OptionGroupFixture {
            kind: OptionKind::Soda,
            choices: vec!["Coke".to_string()],
        };

        let result = CatalogItem::try_from(fixture("3.00 USD", vec![group(), group()]));

        assert!(matches!(
            result,
            Err(CatalogError::DuplicateOptionGroup {
                kind: OptionKind::Soda,
                ..
            })
        ));
    }
}
