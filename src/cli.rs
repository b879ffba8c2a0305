//! Command-line interface

use std::{
    io,
    path::{Path, PathBuf},
    str::FromStr,
    thread,
    time::Duration,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;
use thiserror::Error;
use tracing::debug;

use crate::{
    cart::{Customization, LineOptions, LineUpdate},
    catalog::Catalog,
    config::StoreConfig,
    customer::CustomerInfo,
    lifecycle::OrderTracker,
    logging::LoggingConfig,
    notifications::RecordingSink,
    orders::OrderId,
    receipt::{write_cart, write_menu, write_order_status, write_progress},
    storefront::Storefront,
};

/// Storefront command-line interface
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Browse the menu and place delivery orders", long_about = None)]
pub struct Cli {
    /// Store configuration file (YAML)
    #[arg(long, env = "STOREFRONT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Menu file (YAML); the bundled menu is used when omitted
    #[arg(long, env = "STOREFRONT_MENU", global = true)]
    pub menu: Option<PathBuf>,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the menu
    Menu,

    /// Build a cart, check out and follow the order
    Order(OrderArgs),

    /// Show the status of an order placed at a given time
    Status(StatusArgs),
}

#[derive(Debug, Args)]
struct OrderArgs {
    /// Item to add, as `slug[xQTY][:group=choice,...]`, e.g. `soda x2:soda=coke`
    #[arg(long = "item", required = true)]
    items: Vec<ItemSpec>,

    /// Customer name
    #[arg(long, default_value = "")]
    name: String,

    /// Customer phone number
    #[arg(long, default_value = "")]
    phone: String,

    /// Customer email address
    #[arg(long, default_value = "")]
    email: String,

    /// Delivery address
    #[arg(long, default_value = "")]
    address: String,

    /// Keep printing status updates until the order is delivered
    #[arg(long)]
    follow: bool,

    /// Seconds between status checks when following
    #[arg(long, default_value_t = 1)]
    poll_secs: u64,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// When the order was placed, e.g. `2026-10-19T18:00:00Z`
    #[arg(long)]
    placed_at: Timestamp,

    /// Point in time to evaluate; defaults to now
    #[arg(long)]
    at: Option<Timestamp>,
}

/// Errors in an `--item` argument.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ItemSpecError {
    /// Nothing before the options.
    #[error("item spec has no slug")]
    MissingSlug,

    /// The quantity suffix is zero or out of range.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// An option is not `group=choice`.
    #[error("expected group=choice, got {0:?}")]
    MalformedOption(String),

    /// The option group is not known.
    #[error("unknown option group: {0}")]
    UnknownGroup(String),

    /// A soda pair did not name exactly two sodas.
    #[error("sodas takes two choices joined by '+', got {0:?}")]
    SodaPair(String),
}

/// One `--item` argument: a menu slug, a quantity and the options for the line.
///
/// Groups are `pizza`, `soda` and `sodas` (or their full names `pizza_type` and `soda_pair`);
/// `note` sets special instructions. A soda pair is written `sodas=coke+sprite`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    /// Menu item slug
    pub slug: String,

    /// Number of units
    pub quantity: u32,

    /// Customizations and instructions
    pub options: LineOptions,
}

impl FromStr for ItemSpec {
    type Err = ItemSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (head, options) = s
            .split_once(':')
            .map_or((s, None), |(head, options)| (head, Some(options)));

        let (slug, quantity) = split_quantity(head.trim())?;

        if slug.is_empty() {
            return Err(ItemSpecError::MissingSlug);
        }

        let mut line_options = LineOptions::default();

        for option in options
            .into_iter()
            .flat_map(|options| options.split(','))
            .map(str::trim)
            .filter(|option| !option.is_empty())
        {
            let (group, value) = option
                .split_once('=')
                .map(|(group, value)| (group.trim(), value.trim()))
                .filter(|(_, value)| !value.is_empty())
                .ok_or_else(|| ItemSpecError::MalformedOption(option.to_string()))?;

            line_options = match group.to_ascii_lowercase().as_str() {
                "pizza" | "pizza_type" => {
                    line_options.with_customization(Customization::PizzaType(value.to_string()))
                }
                "soda" => line_options.with_customization(Customization::Soda(value.to_string())),
                "sodas" | "soda_pair" => {
                    let Some((first, second)) = value.split_once('+') else {
                        return Err(ItemSpecError::SodaPair(value.to_string()));
                    };

                    if first.trim().is_empty() || second.trim().is_empty() || second.contains('+') {
                        return Err(ItemSpecError::SodaPair(value.to_string()));
                    }

                    line_options.with_customization(Customization::SodaPair([
                        first.trim().to_string(),
                        second.trim().to_string(),
                    ]))
                }
                "note" => line_options.with_instructions(value),
                _ => return Err(ItemSpecError::UnknownGroup(group.to_string())),
            };
        }

        Ok(Self {
            slug: slug.to_string(),
            quantity,
            options: line_options,
        })
    }
}

fn split_quantity(head: &str) -> Result<(&str, u32), ItemSpecError> {
    let Some((slug, suffix)) = head.rsplit_once('x') else {
        return Ok((head, 1));
    };

    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_digit()) {
        return Ok((head, 1));
    }

    match suffix.parse::<u32>() {
        Ok(quantity) if quantity > 0 => Ok((slug.trim(), quantity)),
        _ => Err(ItemSpecError::InvalidQuantity(suffix.to_string())),
    }
}

impl Cli {
    /// Run the selected command, writing human-readable output to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the menu cannot be loaded, an item cannot be added,
    /// the checkout form is rejected, or `out` cannot be written.
    pub fn run(self, mut out: impl io::Write) -> anyhow::Result<()> {
        let config = if let Some(path) = &self.config {
            StoreConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?
        } else {
            StoreConfig::default()
        };

        debug!(config = ?self.config, menu = ?self.menu, "configuration loaded");

        match self.command {
            Commands::Menu => {
                let catalog = load_catalog(self.menu.as_deref())?;
                write_menu(&mut out, &catalog)?;
            }
            Commands::Order(args) => {
                let catalog = load_catalog(self.menu.as_deref())?;
                place_order(&mut out, &config, catalog, args)?;
            }
            Commands::Status(args) => {
                let now = args.at.unwrap_or_else(Timestamp::now);
                let tracker =
                    OrderTracker::resume(OrderId::generate(), args.placed_at, config.timeline()?, now);

                write_progress(&mut out, &tracker, now)?;
            }
        }

        Ok(())
    }
}

fn load_catalog(path: Option<&Path>) -> anyhow::Result<Catalog> {
    if let Some(path) = path {
        Catalog::load(path).with_context(|| format!("loading menu from {}", path.display()))
    } else {
        Ok(Catalog::builtin()?)
    }
}

fn place_order(
    out: &mut impl io::Write,
    config: &StoreConfig,
    catalog: Catalog,
    args: OrderArgs,
) -> anyhow::Result<()> {
    let mut store = config.storefront(catalog, RecordingSink::new())?;

    for spec in args.items {
        let id = store
            .add_to_cart(&spec.slug, spec.options)
            .with_context(|| format!("adding {}", spec.slug))?;

        if spec.quantity > 1 {
            store.update_line(id, LineUpdate::quantity(spec.quantity))?;
        }
    }

    store.open_cart()?;
    write_cart(&mut *out, store.cart(), &store.totals()?)?;
    store.checkout()?;

    let customer = CustomerInfo::new(args.name, args.phone, args.email, args.address);
    let result = store.place_order(customer).map(|_placed| ());

    for notification in store.sink_mut().drain() {
        writeln!(out, "{notification}")?;
    }

    result?;

    let now = Timestamp::now();
    print_status(out, &store, now)?;

    while args.follow && !store.placed().is_some_and(|p| p.tracker().is_delivered()) {
        thread::sleep(Duration::from_secs(args.poll_secs.max(1)));

        let now = Timestamp::now();

        if !store.refresh(now).is_empty() {
            writeln!(out)?;
            print_status(out, &store, now)?;
        }
    }

    Ok(())
}

fn print_status(
    out: &mut impl io::Write,
    store: &Storefront<RecordingSink>,
    now: Timestamp,
) -> anyhow::Result<()> {
    if let Some(placed) = store.placed() {
        write_order_status(out, placed.order(), placed.tracker(), now)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_bare_slug() -> TestResult {
        let spec: ItemSpec = "cheese-pizza".parse()?;

        assert_eq!(spec.slug, "cheese-pizza");
        assert_eq!(spec.quantity, 1);
        assert_eq!(spec.options, LineOptions::default());

        Ok(())
    }

    #[test]
    fn parses_quantity_and_options() -> TestResult {
        let spec: ItemSpec = "grand-opening-special x2: pizza=Pepperoni, sodas=coke+dr. pepper, note=ring twice"
            .parse()?;

        assert_eq!(spec.slug, "grand-opening-special");
        assert_eq!(spec.quantity, 2);
        assert_eq!(
            spec.options.customizations.as_slice(),
            [
                Customization::PizzaType("Pepperoni".to_string()),
                Customization::SodaPair(["coke".to_string(), "dr. pepper".to_string()]),
            ]
        );
        assert_eq!(spec.options.special_instructions.as_deref(), Some("ring twice"));

        Ok(())
    }

    #[test]
    fn x_inside_slug_is_not_a_quantity() -> TestResult {
        let spec: ItemSpec = "extra-box".parse()?;

        assert_eq!((spec.slug.as_str(), spec.quantity), ("extra-box", 1));

        Ok(())
    }

    #[test]
    fn rejects_bad_specs() {
        assert_eq!("sodax0".parse::<ItemSpec>(), Err(ItemSpecError::InvalidQuantity("0".into())));
        assert_eq!(":soda=coke".parse::<ItemSpec>(), Err(ItemSpecError::MissingSlug));
        assert_eq!(
            "soda:coke".parse::<ItemSpec>(),
            Err(ItemSpecError::MalformedOption("coke".into()))
        );
        assert_eq!(
            "soda:size=large".parse::<ItemSpec>(),
            Err(ItemSpecError::UnknownGroup("size".into()))
        );
        assert_eq!(
            "grand-opening-special:sodas=coke".parse::<ItemSpec>(),
            Err(ItemSpecError::SodaPair("coke".into()))
        );
    }

    #[test]
    fn menu_command_prints_table() -> TestResult {
        let cli = Cli::try_parse_from(["storefront", "menu"])?;
        let mut out = Vec::new();

        cli.run(&mut out)?;

        assert!(String::from_utf8(out)?.contains("fettuccine-alfredo"));

        Ok(())
    }

    #[test]
    fn status_command_derives_from_elapsed_time() -> TestResult {
        let cli = Cli::try_parse_from([
            "storefront",
            "status",
            "--placed-at",
            "2026-10-19T18:00:00Z",
            "--at",
            "2026-10-19T18:00:16Z",
        ])?;
        let mut out = Vec::new();

        cli.run(&mut out)?;

        assert!(String::from_utf8(out)?.starts_with("Out for Delivery (75%)"));

        Ok(())
    }

    #[test]
    fn order_command_places_order() -> TestResult {
        let cli = Cli::try_parse_from([
            "storefront",
            "order",
            "--item",
            "cheese-pizza",
            "--item",
            "soda x2:soda=sprite",
            "--name",
            "Jane Doe",
            "--phone",
            "(555) 123-4567",
            "--email",
            "jane@example.com",
            "--address",
            "100 Main St, Houston, TX 77002",
        ])?;
        let mut out = Vec::new();

        cli.run(&mut out)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Total:        $31.00"));
        assert!(text.contains("Order placed successfully!"));
        assert!(text.contains("Order Received (0%)"));

        Ok(())
    }

    #[test]
    fn order_command_reports_validation_error() -> TestResult {
        let cli = Cli::try_parse_from([
            "storefront",
            "order",
            "--item",
            "soda",
            "--name",
            "Jane Doe",
            "--phone",
            "123",
            "--email",
            "jane@example.com",
            "--address",
            "Houston",
        ])?;
        let mut out = Vec::new();

        let err = cli.run(&mut out).err().ok_or("expected an error")?;

        assert_eq!(err.to_string(), "Please enter a valid phone number");
        assert!(String::from_utf8(out)?.contains("Order Error: Please enter a valid phone number"));

        Ok(())
    }
}
