//! Customer-facing notifications

use std::fmt;

use tracing::{error, info};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Confirmation of something the customer did
    Info,

    /// Something the customer needs to fix
    Error,
}

/// A toast-style message with a title and a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short title
    pub title: String,

    /// Longer explanation
    pub description: String,

    /// Severity
    pub level: Level,
}

impl Notification {
    /// Informational notification.
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: Level::Info,
        }
    }

    /// Error notification.
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            level: Level::Error,
        }
    }

    /// An item was added to the cart.
    pub fn added_to_cart(name: &str) -> Self {
        Self::info("Added to cart", format!("{name} has been added to your cart."))
    }

    /// The order could not be placed.
    pub fn order_error(reason: impl fmt::Display) -> Self {
        Self::error("Order Error", reason.to_string())
    }

    /// The order went through.
    pub fn order_placed() -> Self {
        Self::info(
            "Order placed successfully!",
            "You will receive updates about your order status.",
        )
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Receives notifications.
pub trait NotificationSink {
    /// Deliver a notification.
    fn notify(&mut self, notification: Notification);
}

impl<S: NotificationSink + ?Sized> NotificationSink for &mut S {
    fn notify(&mut self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Emits notifications as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&mut self, notification: Notification) {
        match notification.level {
            Level::Info => info!(
                title = %notification.title,
                description = %notification.description,
                "notification"
            ),
            Level::Error => error!(
                title = %notification.title,
                description = %notification.description,
                "notification"
            ),
        }
    }
}

/// Keeps every notification it receives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSink {
    received: Vec<Notification>,
}

impl RecordingSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far, oldest first.
    pub fn received(&self) -> &[Notification] {
        &self.received
    }

    /// Most recent notification.
    pub fn last(&self) -> Option<&Notification> {
        self.received.last()
    }

    /// Remove and return everything received so far.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.received)
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, notification: Notification) {
        self.received.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn added_to_cart_message() {
        let notification = Notification::added_to_cart("Cheese Pizza");

        assert_eq!(notification.title, "Added to cart");
        assert_eq!(
            notification.description,
            "Cheese Pizza has been added to your cart."
        );
        assert_eq!(notification.level, Level::Info);
    }

    #[test]
    fn order_error_uses_reason_as_description() {
        let notification = Notification::order_error("Please enter a valid phone number");

        assert_eq!(notification.level, Level::Error);
        assert_eq!(
            notification.to_string(),
            "Order Error: Please enter a valid phone number"
        );
    }

    #[test]
    fn recording_sink_collects_through_references() {
        let mut sink = RecordingSink::new();

        {
            let by_ref = &mut sink;
            by_ref.notify(Notification::order_placed());
            by_ref.notify(Notification::added_to_cart("Soda"));
        }

        assert_eq!(sink.received().len(), 2);
        assert_eq!(
            sink.last().map(|n| n.title.as_str()),
            Some("Added to cart")
        );
        assert_eq!(sink.drain().len(), 2);
        assert!(sink.received().is_empty());
    }
}
