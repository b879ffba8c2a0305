//! Storefront
//!
//! Storefront is the ordering core of a single-restaurant delivery shop: a static menu, an
//! in-memory cart with frozen line prices, checkout validation, and an order tracker whose
//! status is derived from the time elapsed since the order was placed.

pub mod cart;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod customer;
pub mod lifecycle;
pub mod logging;
pub mod notifications;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod storefront;
pub mod validation;
