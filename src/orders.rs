//! Orders

use std::{fmt, str::FromStr};

use jiff::{SignedDuration, Timestamp};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    cart::CartLine,
    customer::CustomerInfo,
    pricing::{Price, PricingError, Totals},
};

/// Default time from placement to delivery.
pub const DEFAULT_DELIVERY_WINDOW: SignedDuration = SignedDuration::from_secs(45 * 60);

/// Order identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generate a new, time-ordered identifier.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for OrderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Where an order is, from placement to the door. Statuses only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Received, not yet confirmed
    Pending,

    /// Accepted by the kitchen
    Confirmed,

    /// Being cooked
    Preparing,

    /// Out for delivery
    Ready,

    /// Handed over
    Delivered,
}

impl OrderStatus {
    /// Every status, in order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
    ];

    /// Position in [`OrderStatus::ALL`].
    pub fn index(self) -> usize {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Confirmed => 1,
            OrderStatus::Preparing => 2,
            OrderStatus::Ready => 3,
            OrderStatus::Delivered => 4,
        }
    }

    /// The following status, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Preparing),
            OrderStatus::Preparing => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    /// Short label used on the progress steps.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Order Received",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::Ready => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
        }
    }

    /// Headline shown while the order is in this status.
    pub fn headline(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Order Received",
            OrderStatus::Confirmed => "Order Confirmed",
            OrderStatus::Preparing => "Preparing Your Order",
            OrderStatus::Ready => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
        };

        f.write_str(name)
    }
}

/// Errors raised while placing an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// There is nothing to order.
    #[error("cannot place an order with an empty cart")]
    EmptyCart,

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The estimated delivery time is out of range.
    #[error("estimated delivery time out of range: {0}")]
    Timestamp(#[from] jiff::Error),
}

/// An immutable snapshot of a checked-out cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    lines: Vec<CartLine>,
    customer: CustomerInfo,
    totals: Totals,
    placed_at: Timestamp,
    estimated_delivery: Timestamp,
}

impl Order {
    /// Place an order for `lines`.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`]: `lines` is empty.
    /// - [`OrderError::Pricing`]: totals overflowed or currencies disagree.
    /// - [`OrderError::Timestamp`]: `placed_at + delivery_window` is out of range.
    pub fn place(
        lines: Vec<CartLine>,
        customer: CustomerInfo,
        delivery_fee: &Price,
        placed_at: Timestamp,
        delivery_window: SignedDuration,
    ) -> Result<Self, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let totals = Totals::compute(&lines, delivery_fee)?;
        let estimated_delivery = placed_at.checked_add(delivery_window)?;

        Ok(Self {
            id: OrderId::generate(),
            lines,
            customer,
            totals,
            placed_at,
            estimated_delivery,
        })
    }

    /// Order identifier
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Lines as they were at checkout
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Customer details
    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    /// Subtotal, delivery fee and total
    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Amount due
    pub fn total(&self) -> Price {
        self.totals.total
    }

    /// When the order was placed
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }

    /// When the order should arrive
    pub fn estimated_delivery(&self) -> Timestamp {
        self.estimated_delivery
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use super::*;
    use crate::{
        cart::{Cart, LineOptions},
        catalog::Catalog,
    };

    fn customer() -> CustomerInfo {
        CustomerInfo::new(
            "Jane Doe",
            "(555) 123-4567",
            "jane@example.com",
            "100 Main St, Houston, TX 77002",
        )
    }

    #[test]
    fn statuses_are_ordered() {
        assert!(OrderStatus::ALL.windows(2).all(|pair| match pair {
            [a, b] => a < b && a.next() == Some(*b),
            _ => false,
        }));
        assert_eq!(OrderStatus::Delivered.next(), None);
        assert_eq!(OrderStatus::Ready.index(), 3);
    }

    #[test]
    fn place_snapshots_lines_and_totals() -> TestResult {
        let catalog = Catalog::builtin()?;
        let mut cart = Cart::new(USD);

        cart.add(catalog.get("cheese-pizza").ok_or("missing")?, LineOptions::default())?;

        let placed_at: Timestamp = "2026-10-19T18:00:00Z".parse()?;
        let order = Order::place(
            cart.take(),
            customer(),
            &Money::from_minor(1000, USD),
            placed_at,
            DEFAULT_DELIVERY_WINDOW,
        )?;

        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.total(), Money::from_minor(2500, USD));
        assert_eq!(
            order.estimated_delivery(),
            "2026-10-19T18:45:00Z".parse::<Timestamp>()?
        );
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn place_rejects_empty_cart() {
        let result = Order::place(
            Vec::new(),
            customer(),
            &Money::from_minor(1000, USD),
            Timestamp::UNIX_EPOCH,
            DEFAULT_DELIVERY_WINDOW,
        );

        assert!(matches!(result, Err(OrderError::EmptyCart)));
    }

    #[test]
    fn order_ids_are_unique() {
        assert_ne!(OrderId::generate(), OrderId::generate());
    }
}
