//! Pricing

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money, MoneyError,
    iso::{Currency, EUR, GBP, USD},
};
use thiserror::Error;

/// A monetary amount in one of the supported ISO currencies.
pub type Price = Money<'static, Currency>;

/// Errors that can occur while pricing lines, carts and orders.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// A line total does not fit in the minor unit range.
    #[error("line total overflows: {quantity} x {unit_minor} minor units")]
    Overflow {
        /// Quantity on the line
        quantity: u32,
        /// Unit price in minor units
        unit_minor: i64,
    },

    /// Price string is not of the form `AMOUNT CURRENCY`.
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Currency code is not supported.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),
}

/// Anything priced per unit and bought in some quantity.
pub trait Priced {
    /// Price of a single unit
    fn unit_price(&self) -> &Price;

    /// Number of units
    fn quantity(&self) -> u32;
}

/// Calculates `unit_price * quantity`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the total does not fit in minor units.
pub fn line_total(unit_price: &Price, quantity: u32) -> Result<Price, PricingError> {
    let unit_minor = unit_price.to_minor_units();

    let minor = unit_minor
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow {
            quantity,
            unit_minor,
        })?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Sums the line totals of `lines`. An empty iterator yields zero in `currency`.
///
/// # Errors
///
/// - [`PricingError::Overflow`]: a line total overflowed.
/// - [`PricingError::Money`]: a line was priced in a different currency.
pub fn subtotal<'l, L>(
    lines: impl IntoIterator<Item = &'l L>,
    currency: &'static Currency,
) -> Result<Price, PricingError>
where
    L: Priced + 'l,
{
    lines
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            Ok(acc.add(line_total(line.unit_price(), line.quantity())?)?)
        })
}

/// The flat fee is only charged on a non-empty order.
pub fn delivery_fee(subtotal: &Price, flat_fee: &Price) -> Price {
    if subtotal.to_minor_units() > 0 {
        *flat_fee
    } else {
        Money::from_minor(0, subtotal.currency())
    }
}

/// Subtotal, delivery fee and total for a set of lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    /// Sum of line totals
    pub subtotal: Price,

    /// Delivery fee charged on top of the subtotal
    pub delivery_fee: Price,

    /// Amount due
    pub total: Price,
}

impl Totals {
    /// Computes totals for `lines` with the given flat delivery fee.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow or currency mismatch.
    pub fn compute<'l, L>(
        lines: impl IntoIterator<Item = &'l L>,
        flat_fee: &Price,
    ) -> Result<Self, PricingError>
    where
        L: Priced + 'l,
    {
        let subtotal = subtotal(lines, flat_fee.currency())?;
        let delivery_fee = delivery_fee(&subtotal, flat_fee);
        let total = subtotal.add(delivery_fee)?;

        Ok(Self {
            subtotal,
            delivery_fee,
            total,
        })
    }
}

/// Parse price string (e.g., "2.99 USD") into a [`Price`]
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<Price, PricingError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(PricingError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| PricingError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| PricingError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(PricingError::UnknownCurrency(other.to_string())),
    };

    Ok(Money::from_minor(minor_units, currency))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    struct Line(Price, u32);

    impl Priced for Line {
        fn unit_price(&self) -> &Price {
            &self.0
        }

        fn quantity(&self) -> u32 {
            self.1
        }
    }

    #[test]
    fn line_total_multiplies_by_quantity() -> TestResult {
        let total = line_total(&Money::from_minor(300, USD), 2)?;

        assert_eq!(total, Money::from_minor(600, USD));

        Ok(())
    }

    #[test]
    fn line_total_reports_overflow() {
        let result = line_total(&Money::from_minor(i64::MAX, USD), 2);

        assert!(matches!(
            result,
            Err(PricingError::Overflow { quantity: 2, .. })
        ));
    }

    #[test]
    fn subtotal_of_no_lines_is_zero() -> TestResult {
        let lines: [Line; 0] = [];

        assert_eq!(subtotal(&lines, USD)?, Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn subtotal_rejects_mixed_currencies() {
        let lines = [
            Line(Money::from_minor(100, USD), 1),
            Line(Money::from_minor(100, GBP), 1),
        ];

        assert!(matches!(
            subtotal(&lines, USD),
            Err(PricingError::Money(MoneyError::CurrencyMismatch { .. }))
        ));
    }

    #[test]
    fn totals_add_fee_to_non_empty_orders() -> TestResult {
        let lines = [
            Line(Money::from_minor(1500, USD), 1),
            Line(Money::from_minor(300, USD), 2),
        ];

        let totals = Totals::compute(&lines, &Money::from_minor(1000, USD))?;

        assert_eq!(totals.subtotal, Money::from_minor(2100, USD));
        assert_eq!(totals.delivery_fee, Money::from_minor(1000, USD));
        assert_eq!(totals.total, Money::from_minor(3100, USD));

        Ok(())
    }

    #[test]
    fn totals_waive_fee_when_empty() -> TestResult {
        let lines: [Line; 0] = [];

        let totals = Totals::compute(&lines, &Money::from_minor(1000, USD))?;

        assert_eq!(totals.delivery_fee, Money::from_minor(0, USD));
        assert_eq!(totals.total, Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn parse_price_reads_amount_and_currency() -> TestResult {
        assert_eq!(parse_price("10.00 USD")?, Money::from_minor(1000, USD));
        assert_eq!(parse_price("2.50 EUR")?, Money::from_minor(250, EUR));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99USD");

        assert!(matches!(result, Err(PricingError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(PricingError::UnknownCurrency(code)) if code == "ABC"));
    }
}
