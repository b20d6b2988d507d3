//! Fixtures

use std::{fs, io, path::PathBuf};

use jiff::{SignedDuration, Timestamp};
use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use rusty_money::Money;

use crate::{
    cart::{Cart, CartError},
    catalog::{Catalog, ProductFilter},
    checkout::FeeSchedule,
    fixtures::{
        notifications::NotificationsFixture, orders::OrdersFixture, products::ProductsFixture,
    },
    fulfillment::UnknownStatus,
    ingest::IngestError,
    notifications::Notification,
    orders::{Order, OrderError},
    products::{Product, ProductId, VendorId},
    promos::Promo,
};

pub mod notifications;
pub mod orders;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid timestamp
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Invalid promo duration
    #[error("Invalid promo duration: {0}")]
    InvalidDuration(String),

    /// Invalid fulfillment status
    #[error(transparent)]
    InvalidStatus(#[from] UnknownStatus),

    /// Invalid wire name in a fixture field
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between fixture entries
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Not enough products in fixture
    #[error("Not enough products in fixture, available: {available}, requested: {requested}")]
    NotEnoughProducts {
        /// Number of products defined in the fixture
        available: usize,

        /// Number of products requested
        requested: usize,
    },

    /// Cart building error
    #[error("Failed to build cart: {0}")]
    Cart(#[from] CartError),

    /// Order building error
    #[error("Failed to build order: {0}")]
    Order(#[from] OrderError),
}

/// Parsed promo configuration from a fixture set.
#[derive(Debug, Clone)]
pub struct PromoConfig {
    vendors: Vec<VendorId>,
    duration: SignedDuration,
}

#[derive(Debug, Deserialize)]
struct PromoFixture {
    vendors: Vec<String>,
    duration: String,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Interned products
    catalog: Catalog<'a>,

    /// Pre-built orders
    orders: Vec<Order<'a>>,

    /// Pre-built notifications, newest first
    notifications: Vec<Notification>,

    /// Promo configuration, activated on demand
    promo: Option<PromoConfig>,

    /// Flat delivery fee from the orders fixture
    delivery_fee: Option<String>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(),
            orders: Vec::new(),
            notifications: Vec::new(),
            promo: None,
            delivery_fee: None,
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are
    /// currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (id, product_fixture) in fixture.products {
            let product = product_fixture.into_product(&id)?;
            let currency = product.price.currency();

            if let Some(existing) = self.currency {
                if existing != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.catalog.upsert(product);
        }

        Ok(self)
    }

    /// Load orders from a YAML fixture file
    ///
    /// Product titles on order items are resolved against the products
    /// already loaded; unresolved references degrade to a missing title, the
    /// same way deleted products do in production payloads.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_orders(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("orders").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: OrdersFixture = serde_norway::from_str(&contents)?;

        let catalog = &self.catalog;

        for order_fixture in fixture.orders {
            let order = order_fixture.into_order(&fixture.delivery_fee, |id| {
                catalog
                    .get(&ProductId::from(id))
                    .map(|product| product.title.clone())
            })?;

            self.orders.push(order);
        }

        self.delivery_fee = Some(fixture.delivery_fee);

        Ok(self)
    }

    /// Load notifications from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_notifications(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("notifications")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;
        let fixture: NotificationsFixture = serde_norway::from_str(&contents)?;

        for notification_fixture in fixture.notifications {
            self.notifications
                .push(Notification::try_from(notification_fixture)?);
        }

        Ok(self)
    }

    /// Load a promo configuration from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_promo(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("promo").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: PromoFixture = serde_norway::from_str(&contents)?;

        let duration: SignedDuration = fixture
            .duration
            .parse()
            .map_err(|_err| FixtureError::InvalidDuration(fixture.duration.clone()))?;

        self.promo = Some(PromoConfig {
            vendors: fixture.vendors.into_iter().map(VendorId::from).collect(),
            duration,
        });

        Ok(self)
    }

    /// Load a complete fixture set: products plus whichever of orders,
    /// notifications and promo files exist under the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if a present fixture file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_products(name)?;

        optional(fixture.load_orders(name))?;
        optional(fixture.load_notifications(name))?;
        optional(fixture.load_promo(name))?;

        Ok(fixture)
    }

    /// The loaded products.
    #[must_use]
    pub fn catalog(&self) -> &Catalog<'a> {
        &self.catalog
    }

    /// Get a product by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, id: &str) -> Result<&Product<'a>, FixtureError> {
        self.catalog
            .get(&ProductId::from(id))
            .ok_or_else(|| FixtureError::ProductNotFound(id.to_owned()))
    }

    /// The loaded orders.
    #[must_use]
    pub fn orders(&self) -> &[Order<'a>] {
        &self.orders
    }

    /// The loaded orders, mutably, for driving fulfillment in tests/demos.
    pub fn orders_mut(&mut self) -> &mut [Order<'a>] {
        &mut self.orders
    }

    /// Take ownership of the loaded orders, leaving the fixture empty.
    pub fn take_orders(&mut self) -> Vec<Order<'a>> {
        std::mem::take(&mut self.orders)
    }

    /// The loaded notifications, newest first.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Clone the loaded notifications for feeding into a
    /// [`Feed`](crate::notifications::Feed).
    #[must_use]
    pub fn notifications_vec(&self) -> Vec<Notification> {
        self.notifications.clone()
    }

    /// Activate the configured promo as of `now`.
    #[must_use]
    pub fn promo(&self, now: Timestamp) -> Option<Promo> {
        self.promo.as_ref().map(|config| {
            Promo::activate(config.vendors.iter().cloned(), now, config.duration)
        })
    }

    /// Fee schedule from the orders fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if no orders fixture was loaded or its fee fails to
    /// parse.
    pub fn fee_schedule(&self) -> Result<FeeSchedule<'a>, FixtureError> {
        let raw = self.delivery_fee.as_deref().ok_or(FixtureError::NoCurrency)?;
        let (minor, currency) = products::parse_price(raw)?;

        Ok(FeeSchedule::new(Money::from_minor(minor, currency)))
    }

    /// Currency of the fixture set.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCurrency`] before any products are loaded.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Build a cart holding the first `n` products (all of them when `None`),
    /// one unit each, in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or `n` exceeds the set.
    pub fn cart(&self, n: Option<usize>) -> Result<Cart<'a>, FixtureError> {
        let currency = self.currency()?;

        let mut products = self.catalog.search(&ProductFilter::any());

        products.sort_by(|a, b| a.id.cmp(&b.id));

        let requested = n.unwrap_or(products.len());

        if requested > products.len() {
            return Err(FixtureError::NotEnoughProducts {
                available: products.len(),
                requested,
            });
        }

        let mut cart = Cart::new(currency);

        for product in products.into_iter().take(requested) {
            cart.add_item(product.clone())?;
        }

        Ok(cart)
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Treat a missing fixture file as "nothing to load".
fn optional<T>(result: Result<T, FixtureError>) -> Result<(), FixtureError> {
    match result {
        Ok(_) => Ok(()),
        Err(FixtureError::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
