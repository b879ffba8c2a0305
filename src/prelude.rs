//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        Cart, CartError, CartLine, Customization, CustomizationError, LineId, LineOptions,
        LineUpdate, UpdateOutcome,
    },
    catalog::{Catalog, CatalogError, CatalogItem, CatalogKey, OptionGroup, OptionKind},
    config::{ConfigError, StoreConfig},
    customer::{CustomerInfo, Field},
    lifecycle::{
        LifecycleError, OrderTracker, Progress, StatusTimeline, TimelineStep, Transition,
    },
    notifications::{Level, Notification, NotificationSink, RecordingSink, TracingSink},
    orders::{Order, OrderError, OrderId, OrderStatus},
    pricing::{Price, Priced, PricingError, Totals, parse_price},
    receipt::{ReceiptError, write_cart, write_menu, write_order_status, write_progress},
    storefront::{Action, PlacedOrder, Storefront, View, ViewError},
    validation::{
        AddressCheck, Coordinates, Geocoder, KeywordMatch, OrderFormValidator, RadiusCheck,
        StaticGeocoder, ValidationError,
    },
};
