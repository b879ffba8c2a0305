//! Receipt
//!
//! Plain-text renderings of the menu, the cart and an order's progress.

use std::{io, time::Duration};

use humanize_duration::{Truncate, prelude::DurationExt};
use jiff::Timestamp;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    catalog::Catalog,
    lifecycle::OrderTracker,
    orders::{Order, OrderStatus},
    pricing::{PricingError, Totals},
};

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// A line total could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Writes the menu as a table, one row per item in menu order.
///
/// # Errors
///
/// Returns [`ReceiptError::Io`] if `out` cannot be written.
pub fn write_menu(mut out: impl io::Write, catalog: &Catalog) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Slug", "Item", "Price", "Options"]);

    for item in catalog.iter() {
        let name = if item.special {
            format!("★ {}", item.name)
        } else {
            item.name.clone()
        };

        let options = item
            .options
            .iter()
            .map(|group| format!("{}: {}", group.kind, group.choices.join(" / ")))
            .collect::<Vec<_>>()
            .join("\n");

        builder.push_record([
            item.slug.clone(),
            format!("{name}\n{}", item.description),
            item.price.to_string(),
            options,
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..3), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}

/// Writes the cart lines followed by subtotal, delivery fee and total.
///
/// # Errors
///
/// Returns a [`ReceiptError`] if a line total overflows or `out` cannot be written.
pub fn write_cart(
    mut out: impl io::Write,
    cart: &Cart,
    totals: &Totals,
) -> Result<(), ReceiptError> {
    if cart.is_empty() {
        writeln!(out, "Your cart is empty")?;

        return Ok(());
    }

    write_lines(out, cart.iter(), totals)
}

/// Writes the status of `order` as seen at `now`, then what was ordered and where it goes.
///
/// # Errors
///
/// Returns a [`ReceiptError`] if a line total overflows or `out` cannot be written.
pub fn write_order_status(
    mut out: impl io::Write,
    order: &Order,
    tracker: &OrderTracker,
    now: Timestamp,
) -> Result<(), ReceiptError> {
    writeln!(out, "Order {}", order.id())?;
    write_progress(&mut out, tracker, now)?;
    writeln!(out)?;
    write_lines(&mut out, order.lines(), order.totals())?;

    let customer = order.customer();

    writeln!(out)?;
    writeln!(out, "Deliver to:")?;
    writeln!(out, "  {}", customer.name)?;
    writeln!(out, "  {}", customer.phone)?;
    writeln!(out, "  {}", customer.email)?;
    writeln!(out, "  {}", customer.address)?;

    Ok(())
}

fn write_lines<'a>(
    mut out: impl io::Write,
    lines: impl IntoIterator<Item = &'a CartLine>,
    totals: &Totals,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Qty", "Item", "Each", "Total"]);

    for line in lines {
        let details = [
            line.customization_summary(),
            line.special_instructions()
                .map(|instructions| format!("Note: {instructions}")),
        ];

        let item = std::iter::once(line.name().to_string())
            .chain(details.into_iter().flatten().map(|detail| format!("  {detail}")))
            .collect::<Vec<_>>()
            .join("\n");

        builder.push_record([
            format!("{}x", line.quantity()),
            item,
            line.unit_price().to_string(),
            line.line_total()?.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::first(), Alignment::right());
    table.modify(Columns::new(2..4), Alignment::right());

    writeln!(out, "{table}")?;
    writeln!(out, "  Subtotal:     {}", totals.subtotal)?;
    writeln!(out, "  Delivery Fee: {}", totals.delivery_fee)?;
    writeln!(out, "  Total:        {}", totals.total)?;

    Ok(())
}

/// Writes a checklist of steps, the headline and the delivery estimate.
///
/// # Errors
///
/// Returns [`ReceiptError::Io`] if `out` cannot be written.
pub fn write_progress(
    mut out: impl io::Write,
    tracker: &OrderTracker,
    now: Timestamp,
) -> Result<(), ReceiptError> {
    let progress = tracker.progress();

    writeln!(out, "{} ({}%)", progress.headline, progress.percent)?;

    for status in OrderStatus::ALL {
        let mark = if status <= progress.status { "✔" } else { "·" };

        writeln!(out, "  {mark} {}", status.label())?;
    }

    if progress.status == OrderStatus::Delivered {
        writeln!(out, "Your order has been delivered. Enjoy!")?;
    } else {
        writeln!(
            out,
            "Estimated delivery in {} minutes",
            progress.minutes_remaining
        )?;
    }

    if let Some(next) = tracker.next_change_at() {
        let wait = Duration::try_from(next.duration_since(now)).unwrap_or(Duration::ZERO);

        writeln!(out, "Next update in {}", wait.human(Truncate::Second))?;
    }

    Ok(())
}
