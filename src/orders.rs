//! Orders

use jiff::Timestamp;
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    fulfillment::{
        self, FulfillmentAction, ItemStatus, OrderStatus, TransitionError, VendorStatus,
    },
    ids::string_id,
    products::{ProductId, VendorId},
};

string_id! {
    /// Opaque backend-assigned order identifier.
    pub struct OrderId;
}

string_id! {
    /// Opaque backend-assigned order item identifier.
    pub struct OrderItemId;
}

string_id! {
    /// Opaque backend-assigned customer identifier.
    pub struct CustomerId;
}

/// How the customer receives the order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FulfillmentType {
    /// Customer collects from the vendor; no delivery fee
    Pickup,

    /// Courier delivery; the flat delivery fee applies
    Delivery,
}

/// How the customer pays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Cash handed over on delivery or pickup
    CashOnDelivery,

    /// Mobile money transfer
    MobileMoney,
}

/// Errors related to order construction or totals.
#[derive(Debug, Error)]
pub enum OrderError {
    /// An item total or the order total left the representable range.
    #[error("order arithmetic overflowed on item `{0}`")]
    Overflow(OrderItemId),

    /// An item's currency differs from the order currency.
    #[error("item `{item}` is priced in {item_currency}, but the order holds {order_currency}")]
    CurrencyMismatch {
        /// Item that failed validation
        item: OrderItemId,

        /// Currency of the item price
        item_currency: &'static str,

        /// Currency of the order
        order_currency: &'static str,
    },

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Errors applying a fulfillment action to one item of an order.
#[derive(Debug, Error)]
pub enum OrderApplyError {
    /// The order has no item with the given identifier.
    #[error("order has no item `{0}`")]
    ItemNotFound(OrderItemId),

    /// The transition itself was invalid.
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Reference to the product an order item was created from.
///
/// Products can be deleted after an order is placed; the reference keeps the
/// identifier and, when still known, the title, so boards degrade to a
/// placeholder instead of failing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductRef {
    /// Backend product identifier
    pub id: ProductId,

    /// Display title, if the product still resolves
    pub title: Option<String>,
}

/// One fulfillable line of an order, owned by a single vendor.
#[derive(Clone, Debug)]
pub struct OrderItem<'a> {
    /// Backend identifier
    pub id: OrderItemId,

    /// Product the item was created from; `None` once the product is deleted
    pub product: Option<ProductRef>,

    /// Vendor responsible for fulfilling the item
    pub vendor: VendorId,

    /// Units ordered
    pub quantity: u32,

    /// Price per unit at order time
    pub unit_price: Money<'a, Currency>,

    status: ItemStatus,
}

impl<'a> OrderItem<'a> {
    /// Create an item in the given status.
    #[must_use]
    pub fn new(
        id: OrderItemId,
        product: Option<ProductRef>,
        vendor: VendorId,
        quantity: u32,
        unit_price: Money<'a, Currency>,
        status: ItemStatus,
    ) -> Self {
        Self {
            id,
            product,
            vendor,
            quantity,
            unit_price,
            status,
        }
    }

    /// Create a freshly placed item in `Pending`.
    #[must_use]
    pub fn placed(
        id: OrderItemId,
        product: Option<ProductRef>,
        vendor: VendorId,
        quantity: u32,
        unit_price: Money<'a, Currency>,
    ) -> Self {
        Self::new(id, product, vendor, quantity, unit_price, ItemStatus::Pending)
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// Title to display on boards, with a placeholder for deleted products.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.product
            .as_ref()
            .and_then(|product| product.title.as_deref())
            .unwrap_or("(product no longer available)")
    }

    /// Price of this item: unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Overflow`] if the multiplication leaves the
    /// representable minor-unit range.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, OrderError> {
        let minor = self
            .unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or_else(|| OrderError::Overflow(self.id.clone()))?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }

    fn apply(&mut self, action: FulfillmentAction) -> Result<ItemStatus, TransitionError> {
        self.status = self.status.apply(action)?;

        Ok(self.status)
    }
}

/// A placed order, possibly spanning several vendors.
#[derive(Debug)]
pub struct Order<'a> {
    /// Backend identifier
    pub id: OrderId,

    /// Customer who placed the order
    pub customer: CustomerId,

    /// How the order is handed over
    pub fulfillment: FulfillmentType,

    /// How the order is paid
    pub payment: PaymentMethod,

    /// Placement time
    pub created_at: Timestamp,

    items: Vec<OrderItem<'a>>,
    delivery_fee: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

impl<'a> Order<'a> {
    /// Assemble an order, computing its total from the items and fee.
    ///
    /// The stored total always satisfies `total = Σ line totals +
    /// delivery_fee`; callers holding a backend-declared total validate it
    /// against [`Order::total`] at the ingestion edge.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderError`] on a currency mismatch between items and
    /// fee, or on arithmetic overflow.
    pub fn new(
        id: OrderId,
        customer: CustomerId,
        items: Vec<OrderItem<'a>>,
        fulfillment: FulfillmentType,
        payment: PaymentMethod,
        delivery_fee: Money<'a, Currency>,
        created_at: Timestamp,
    ) -> Result<Self, OrderError> {
        let currency = delivery_fee.currency();

        for item in &items {
            let item_currency = item.unit_price.currency();

            if item_currency != currency {
                return Err(OrderError::CurrencyMismatch {
                    item: item.id.clone(),
                    item_currency: item_currency.iso_alpha_code,
                    order_currency: currency.iso_alpha_code,
                });
            }
        }

        let total = items
            .iter()
            .try_fold(delivery_fee, |acc, item| Ok(acc.add(item.line_total()?)?))?;

        Ok(Self {
            id,
            customer,
            fulfillment,
            payment,
            created_at,
            items,
            delivery_fee,
            total,
        })
    }

    /// Items of the order.
    #[must_use]
    pub fn items(&self) -> &[OrderItem<'a>] {
        &self.items
    }

    /// Flat delivery fee included in the total.
    #[must_use]
    pub fn delivery_fee(&self) -> Money<'a, Currency> {
        self.delivery_fee
    }

    /// Order total: item line totals plus the delivery fee.
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Order-level status, folded from the item statuses on every read.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        fulfillment::order_status(self.items.iter().map(OrderItem::status))
    }

    /// Distinct vendors across the order, in first-appearance order.
    #[must_use]
    pub fn vendors(&self) -> Vec<VendorId> {
        let mut vendors: Vec<VendorId> = Vec::new();

        for item in &self.items {
            if !vendors.contains(&item.vendor) {
                vendors.push(item.vendor.clone());
            }
        }

        vendors
    }

    /// The items belonging to one vendor.
    #[must_use]
    pub fn items_for(&self, vendor: &VendorId) -> SmallVec<[&OrderItem<'a>; 4]> {
        self.items
            .iter()
            .filter(|item| item.vendor == *vendor)
            .collect()
    }

    /// Board status for one vendor's slice of the order.
    #[must_use]
    pub fn vendor_status(&self, vendor: &VendorId) -> VendorStatus {
        fulfillment::vendor_status(
            self.items
                .iter()
                .filter(|item| item.vendor == *vendor)
                .map(OrderItem::status),
        )
    }

    /// Apply a fulfillment action to one item.
    ///
    /// Returns the item's new status. The item is untouched when the
    /// transition is invalid.
    ///
    /// # Errors
    ///
    /// - [`OrderApplyError::ItemNotFound`]: no item with that identifier.
    /// - [`OrderApplyError::Transition`]: the action has no edge from the
    ///   item's current status.
    pub fn apply(
        &mut self,
        item: &OrderItemId,
        action: FulfillmentAction,
    ) -> Result<ItemStatus, OrderApplyError> {
        let item = self
            .items
            .iter_mut()
            .find(|candidate| candidate.id == *item)
            .ok_or_else(|| OrderApplyError::ItemNotFound(item.clone()))?;

        Ok(item.apply(action)?)
    }

    /// Accept every pending item. Returns how many changed.
    pub fn auto_pass(&mut self) -> usize {
        fulfillment::auto_pass(self.items.iter_mut().map(|item| &mut item.status))
    }

    /// Advance every in-flight item one step. Returns how many changed.
    pub fn advance_fulfilled(&mut self) -> usize {
        fulfillment::advance_fulfilled(self.items.iter_mut().map(|item| &mut item.status))
    }
}
