//! Storefront
//!
//! Owns everything a customer session touches: the catalog, the cart, the checkout validator,
//! the order in progress and the view being shown. Every operation checks the current [`View`]
//! first; an operation that is not allowed in the current view returns
//! [`ViewError::InvalidTransition`] and changes nothing.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use rusty_money::Money;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::info;

use crate::{
    cart::{Cart, CartError, CartLine, LineId, LineOptions, LineUpdate, UpdateOutcome},
    catalog::Catalog,
    customer::CustomerInfo,
    lifecycle::{OrderTracker, Progress, StatusTimeline, Transition},
    notifications::{Notification, NotificationSink, TracingSink},
    orders::{DEFAULT_DELIVERY_WINDOW, Order, OrderError},
    pricing::{Price, PricingError, Totals},
    validation::{OrderFormValidator, ValidationError},
};

/// Default flat delivery fee in minor units of the catalog currency.
pub const DEFAULT_DELIVERY_FEE_MINOR: i64 = 1000;

/// The screen currently shown. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    /// Menu
    #[default]
    Browsing,

    /// Cart drawer over the menu
    CartOpen,

    /// Customer details form
    Checkout,

    /// Progress of a placed order
    OrderStatus,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            View::Browsing => "browsing",
            View::CartOpen => "cart",
            View::Checkout => "checkout",
            View::OrderStatus => "order status",
        })
    }
}

/// Operations gated by the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Open the cart drawer
    OpenCart,

    /// Close the cart drawer
    CloseCart,

    /// Proceed to the checkout form
    Checkout,

    /// Leave checkout without ordering
    Back,

    /// Submit the checkout form
    PlaceOrder,

    /// Start over after an order
    NewOrder,

    /// Add a menu item to the cart
    AddToCart,

    /// Change or remove a cart line
    EditCart,
}

impl Action {
    /// Whether the action is allowed while `view` is shown.
    pub fn allowed_in(self, view: View) -> bool {
        match self {
            Action::OpenCart | Action::AddToCart => {
                matches!(view, View::Browsing | View::CartOpen)
            }
            Action::CloseCart | Action::Checkout => view == View::CartOpen,
            Action::Back | Action::PlaceOrder => view == View::Checkout,
            Action::NewOrder => view == View::OrderStatus,
            Action::EditCart => matches!(view, View::Browsing | View::CartOpen | View::Checkout),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::OpenCart => "open cart",
            Action::CloseCart => "close cart",
            Action::Checkout => "checkout",
            Action::Back => "back",
            Action::PlaceOrder => "place order",
            Action::NewOrder => "new order",
            Action::AddToCart => "add to cart",
            Action::EditCart => "edit cart",
        })
    }
}

/// Errors returned by [`Storefront`] operations.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The action is not available in the current view.
    #[error("cannot {action} while in {view}")]
    InvalidTransition {
        /// Attempted action
        action: Action,
        /// View at the time
        view: View,
    },

    /// Checkout needs at least one line.
    #[error("your cart is empty")]
    EmptyCart,

    /// No menu item has this slug.
    #[error("unknown menu item: {0}")]
    UnknownItem(String),

    /// The checkout form was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The cart rejected an edit.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The order could not be created.
    #[error(transparent)]
    Order(#[from] OrderError),
}

/// An order together with the tracker following it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    order: Order,
    tracker: OrderTracker,
}

impl PlacedOrder {
    /// Order as placed
    pub fn order(&self) -> &Order {
        &self.order
    }

    /// Status tracker
    pub fn tracker(&self) -> &OrderTracker {
        &self.tracker
    }
}

/// A single customer session.
#[derive(Debug)]
pub struct Storefront<S: NotificationSink = TracingSink> {
    catalog: Catalog,
    cart: Cart,
    validator: OrderFormValidator,
    delivery_fee: Price,
    delivery_window: SignedDuration,
    timeline: StatusTimeline,
    view: View,
    placed: Option<PlacedOrder>,
    sink: S,
}

impl<S: NotificationSink> Storefront<S> {
    /// New session in the browsing view with an empty cart, the default delivery fee and window,
    /// and the default status timeline.
    pub fn new(catalog: Catalog, validator: OrderFormValidator, sink: S) -> Self {
        let currency = catalog.currency();

        Self {
            cart: Cart::new(currency),
            catalog,
            validator,
            delivery_fee: Money::from_minor(DEFAULT_DELIVERY_FEE_MINOR, currency),
            delivery_window: DEFAULT_DELIVERY_WINDOW,
            timeline: StatusTimeline::default(),
            view: View::Browsing,
            placed: None,
            sink,
        }
    }

    /// Use a different flat delivery fee.
    #[must_use]
    pub fn with_delivery_fee(mut self, fee: Price) -> Self {
        self.delivery_fee = fee;
        self
    }

    /// Use a different placement-to-delivery estimate.
    #[must_use]
    pub fn with_delivery_window(mut self, window: SignedDuration) -> Self {
        self.delivery_window = window;
        self
    }

    /// Use a different status timeline for new orders.
    #[must_use]
    pub fn with_timeline(mut self, timeline: StatusTimeline) -> Self {
        self.timeline = timeline;
        self
    }

    /// Current view
    pub fn view(&self) -> View {
        self.view
    }

    /// Menu
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Cart contents
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Flat delivery fee
    pub fn delivery_fee(&self) -> &Price {
        &self.delivery_fee
    }

    /// Totals for the current cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow.
    pub fn totals(&self) -> Result<Totals, PricingError> {
        self.cart.totals(&self.delivery_fee)
    }

    /// The order being tracked, if one was placed.
    pub fn placed(&self) -> Option<&PlacedOrder> {
        self.placed.as_ref()
    }

    /// Shortcut for the order being tracked.
    pub fn order(&self) -> Option<&Order> {
        self.placed.as_ref().map(PlacedOrder::order)
    }

    /// Status display data for the order being tracked.
    pub fn progress(&self) -> Option<Progress> {
        self.placed.as_ref().map(|placed| placed.tracker.progress())
    }

    /// Notification sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable notification sink
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Add one unit of the item with `slug` to the cart.
    ///
    /// # Errors
    ///
    /// Fails if the cart cannot be edited in the current view, the slug is unknown, or the
    /// options do not fit the item.
    pub fn add_to_cart(&mut self, slug: &str, options: LineOptions) -> Result<LineId, ViewError> {
        self.ensure(Action::AddToCart)?;

        let item = self
            .catalog
            .get(slug)
            .ok_or_else(|| ViewError::UnknownItem(slug.to_string()))?;

        let id = self.cart.add(item, options)?;

        self.sink.notify(Notification::added_to_cart(&item.name));

        Ok(id)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Fails if the cart cannot be edited in the current view.
    pub fn remove_line(&mut self, id: LineId) -> Result<Option<CartLine>, ViewError> {
        self.edit_cart(|cart| cart.remove(id))
    }

    /// Apply an edit to a line.
    ///
    /// # Errors
    ///
    /// Fails if the cart cannot be edited in the current view.
    pub fn update_line(&mut self, id: LineId, update: LineUpdate) -> Result<UpdateOutcome, ViewError> {
        self.edit_cart(|cart| cart.update(id, update))
    }

    /// Set a line's quantity; zero or less removes it, and anything above `u32::MAX` is clamped.
    ///
    /// # Errors
    ///
    /// Fails if the cart cannot be edited in the current view.
    pub fn set_quantity(&mut self, id: LineId, quantity: i64) -> Result<UpdateOutcome, ViewError> {
        self.edit_cart(|cart| cart.set_quantity(id, quantity))
    }

    /// Add one to a line's quantity.
    ///
    /// # Errors
    ///
    /// Fails if the cart cannot be edited in the current view.
    pub fn increment(&mut self, id: LineId) -> Result<UpdateOutcome, ViewError> {
        self.edit_cart(|cart| cart.increment(id))
    }

    /// Take one from a line's quantity, removing the line at zero.
    ///
    /// # Errors
    ///
    /// Fails if the cart cannot be edited in the current view.
    pub fn decrement(&mut self, id: LineId) -> Result<UpdateOutcome, ViewError> {
        self.edit_cart(|cart| cart.decrement(id))
    }

    /// Browsing to cart.
    ///
    /// # Errors
    ///
    /// Fails unless browsing. Opening an already open cart is a no-op.
    pub fn open_cart(&mut self) -> Result<(), ViewError> {
        self.transition(Action::OpenCart, View::CartOpen)
    }

    /// Cart to browsing.
    ///
    /// # Errors
    ///
    /// Fails unless the cart is open.
    pub fn close_cart(&mut self) -> Result<(), ViewError> {
        self.transition(Action::CloseCart, View::Browsing)
    }

    /// Cart to checkout.
    ///
    /// # Errors
    ///
    /// Fails unless the cart is open and has at least one line.
    pub fn checkout(&mut self) -> Result<(), ViewError> {
        self.ensure(Action::Checkout)?;

        if self.cart.is_empty() {
            return Err(ViewError::EmptyCart);
        }

        self.view = View::Checkout;

        Ok(())
    }

    /// Checkout back to browsing, keeping the cart.
    ///
    /// # Errors
    ///
    /// Fails unless in checkout.
    pub fn back(&mut self) -> Result<(), ViewError> {
        self.transition(Action::Back, View::Browsing)
    }

    /// Order status to browsing, discarding the tracked order.
    ///
    /// # Errors
    ///
    /// Fails unless showing an order's status.
    pub fn new_order(&mut self) -> Result<(), ViewError> {
        self.transition(Action::NewOrder, View::Browsing)?;
        self.placed = None;

        Ok(())
    }

    /// Submit the checkout form now.
    ///
    /// # Errors
    ///
    /// See [`Storefront::place_order_at`].
    pub fn place_order(&mut self, customer: CustomerInfo) -> Result<&PlacedOrder, ViewError> {
        self.place_order_at(customer, Timestamp::now())
    }

    /// Submit the checkout form as if at `now`.
    ///
    /// On success the cart is emptied, the view switches to order status and a tracker starts
    /// at pending. A rejected form sends an "Order Error" notification and stays in checkout.
    ///
    /// # Errors
    ///
    /// - [`ViewError::InvalidTransition`]: not in checkout.
    /// - [`ViewError::EmptyCart`]: every line was removed during checkout.
    /// - [`ViewError::Validation`]: the customer details were rejected.
    /// - [`ViewError::Order`]: totals or the delivery estimate could not be computed.
    pub fn place_order_at(
        &mut self,
        customer: CustomerInfo,
        now: Timestamp,
    ) -> Result<&PlacedOrder, ViewError> {
        self.ensure(Action::PlaceOrder)?;

        if self.cart.is_empty() {
            return Err(ViewError::EmptyCart);
        }

        if let Err(err) = self.validator.validate(&customer) {
            info!(reason = %err, "checkout rejected");
            self.sink.notify(Notification::order_error(&err));

            return Err(err.into());
        }

        let order = match Order::place(
            self.cart.lines().to_vec(),
            customer,
            &self.delivery_fee,
            now,
            self.delivery_window,
        ) {
            Ok(order) => order,
            Err(err) => {
                self.sink.notify(Notification::order_error(&err));

                return Err(err.into());
            }
        };

        info!(
            order = %order.id(),
            total = %order.total(),
            lines = order.lines().len(),
            "order placed"
        );

        self.cart.clear();
        self.view = View::OrderStatus;
        self.sink.notify(Notification::order_placed());

        let tracker = OrderTracker::new(order.id(), now, self.timeline.clone());

        Ok(&*self.placed.insert(PlacedOrder { order, tracker }))
    }

    /// Advance the tracked order to the status implied by `now`.
    pub fn refresh(&mut self, now: Timestamp) -> SmallVec<[Transition; 4]> {
        self.placed
            .as_mut()
            .map(|placed| placed.tracker.observe(now))
            .unwrap_or_default()
    }

    /// Checkout is only open over a non-empty cart, so emptying it there returns to browsing.
    fn edit_cart<T>(&mut self, edit: impl FnOnce(&mut Cart) -> T) -> Result<T, ViewError> {
        self.ensure(Action::EditCart)?;

        let edited = edit(&mut self.cart);

        if self.view == View::Checkout && self.cart.is_empty() {
            info!("cart emptied during checkout");
            self.view = View::Browsing;
        }

        Ok(edited)
    }

    fn ensure(&self, action: Action) -> Result<(), ViewError> {
        if action.allowed_in(self.view) {
            Ok(())
        } else {
            Err(ViewError::InvalidTransition {
                action,
                view: self.view,
            })
        }
    }

    fn transition(&mut self, action: Action, to: View) -> Result<(), ViewError> {
        self.ensure(action)?;
        self.view = to;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;
    use crate::{
        notifications::{Level, RecordingSink},
        orders::OrderStatus,
        validation::KeywordMatch,
    };

    fn storefront() -> Result<Storefront<RecordingSink>, crate::catalog::CatalogError> {
        let validator = OrderFormValidator::new(
            KeywordMatch::houston(),
            "4515 Dewberry St, Houston, TX 77021",
            12.0,
        );

        Ok(Storefront::new(
            Catalog::builtin()?,
            validator,
            RecordingSink::new(),
        ))
    }

    fn customer() -> CustomerInfo {
        CustomerInfo::new(
            "Jane Doe",
            "(555) 123-4567",
            "jane@example.com",
            "100 Main St, Houston, TX 77002",
        )
    }

    fn usd(minor: i64) -> Price {
        Money::from_minor(minor, USD)
    }

    #[test]
    fn starts_browsing_with_empty_cart() -> TestResult {
        let store = storefront()?;

        assert_eq!(store.view(), View::Browsing);
        assert!(store.cart().is_empty());
        assert!(store.order().is_none());
        assert_eq!(store.totals()?.total, usd(0));

        Ok(())
    }

    #[test]
    fn add_to_cart_notifies() -> TestResult {
        let mut store = storefront()?;

        store.add_to_cart("cheese-pizza", LineOptions::default())?;

        assert_eq!(
            store.sink().last(),
            Some(&Notification::added_to_cart("12\" Cheese Pizza"))
        );
        assert_eq!(store.totals()?.total, usd(2500));

        Ok(())
    }

    #[test]
    fn add_unknown_item_fails() -> TestResult {
        let mut store = storefront()?;

        let result = store.add_to_cart("lasagna", LineOptions::default());

        assert!(matches!(result, Err(ViewError::UnknownItem(slug)) if slug == "lasagna"));
        assert!(store.sink().received().is_empty());

        Ok(())
    }

    #[test]
    fn checkout_requires_items() -> TestResult {
        let mut store = storefront()?;

        store.open_cart()?;

        assert!(matches!(store.checkout(), Err(ViewError::EmptyCart)));
        assert_eq!(store.view(), View::CartOpen);

        Ok(())
    }

    #[test]
    fn invalid_transitions_leave_view_unchanged() -> TestResult {
        let mut store = storefront()?;

        assert!(matches!(
            store.checkout(),
            Err(ViewError::InvalidTransition {
                action: Action::Checkout,
                view: View::Browsing,
            })
        ));
        assert!(store.close_cart().is_err());
        assert!(store.back().is_err());
        assert!(store.new_order().is_err());
        assert!(store.place_order(customer()).is_err());
        assert_eq!(store.view(), View::Browsing);

        Ok(())
    }

    #[test]
    fn cannot_add_items_during_checkout() -> TestResult {
        let mut store = storefront()?;

        let line = store.add_to_cart("soda", LineOptions::default())?;
        store.open_cart()?;
        store.checkout()?;

        assert!(store.add_to_cart("soda", LineOptions::default()).is_err());
        assert_eq!(store.increment(line)?, UpdateOutcome::Updated);
        assert_eq!(store.cart().item_count(), 2);

        Ok(())
    }

    #[test]
    fn back_returns_to_browsing_and_keeps_cart() -> TestResult {
        let mut store = storefront()?;

        store.add_to_cart("soda", LineOptions::default())?;
        store.open_cart()?;
        store.checkout()?;
        store.back()?;

        assert_eq!(store.view(), View::Browsing);
        assert_eq!(store.cart().len(), 1);

        Ok(())
    }

    #[test]
    fn rejected_checkout_stays_in_checkout() -> TestResult {
        let mut store = storefront()?;

        store.add_to_cart("cheese-pizza", LineOptions::default())?;
        store.open_cart()?;
        store.checkout()?;

        let result = store.place_order(CustomerInfo {
            phone: "123".to_string(),
            ..customer()
        });

        assert!(matches!(
            result,
            Err(ViewError::Validation(ValidationError::InvalidPhone { digits: 3 }))
        ));
        assert_eq!(store.view(), View::Checkout);
        assert_eq!(store.cart().len(), 1);

        let last = store.sink().last().ok_or("no notification")?;

        assert_eq!(last.title, "Order Error");
        assert_eq!(last.description, "Please enter a valid phone number");
        assert_eq!(last.level, Level::Error);

        Ok(())
    }

    #[test]
    fn emptying_cart_during_checkout_returns_to_browsing() -> TestResult {
        let mut store = storefront()?;

        let line = store.add_to_cart("soda", LineOptions::default())?;
        store.open_cart()?;
        store.checkout()?;
        store.decrement(line)?;

        assert_eq!(store.view(), View::Browsing);
        assert!(matches!(
            store.place_order(customer()),
            Err(ViewError::InvalidTransition {
                action: Action::PlaceOrder,
                view: View::Browsing,
            })
        ));

        Ok(())
    }

    #[test]
    fn removing_one_of_several_lines_stays_in_checkout() -> TestResult {
        let mut store = storefront()?;

        let soda = store.add_to_cart("soda", LineOptions::default())?;
        let pizza = store.add_to_cart("cheese-pizza", LineOptions::default())?;
        store.open_cart()?;
        store.checkout()?;

        store.remove_line(soda)?;
        assert_eq!(store.view(), View::Checkout);

        store.set_quantity(pizza, 0)?;
        assert_eq!(store.view(), View::Browsing);
        assert!(store.cart().is_empty());

        Ok(())
    }

    #[test]
    fn place_order_clears_cart_and_tracks_status() -> TestResult {
        let mut store = storefront()?;
        let now: Timestamp = "2026-10-19T18:00:00Z".parse()?;

        store.add_to_cart("fettuccine-alfredo", LineOptions::default())?;
        store.open_cart()?;
        store.checkout()?;

        let placed = store.place_order_at(customer(), now)?;

        assert_eq!(placed.order().total(), usd(2200));
        assert_eq!(placed.tracker().status(), OrderStatus::Pending);

        assert_eq!(store.view(), View::OrderStatus);
        assert!(store.cart().is_empty());
        assert_eq!(
            store.sink().last(),
            Some(&Notification::order_placed())
        );

        let transitions = store.refresh(now.checked_add(SignedDuration::from_secs(10))?);

        assert_eq!(transitions.len(), 2);
        assert_eq!(
            store.progress().map(|p| p.status),
            Some(OrderStatus::Preparing)
        );

        store.new_order()?;

        assert_eq!(store.view(), View::Browsing);
        assert!(store.order().is_none());
        assert!(store.refresh(now).is_empty());

        Ok(())
    }

    #[test]
    fn custom_delivery_fee() -> TestResult {
        let mut store = storefront()?.with_delivery_fee(usd(500));

        store.add_to_cart("soda", LineOptions::default())?;

        assert_eq!(store.totals()?.total, usd(800));
        assert_eq!(store.delivery_fee(), &usd(500));

        Ok(())
    }
}
