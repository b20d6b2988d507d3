//! Checkout

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    orders::{FulfillmentType, PaymentMethod},
    products::{ProductId, VendorId},
};

/// Errors building an order draft from a cart.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines; there is nothing to order.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// Wrapped cart error while pricing lines.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Non-fatal conditions the UI must put in front of the shopper before
/// placing the order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutWarning {
    /// A pickup order spans several vendors, so the customer has several
    /// collection points.
    MultiVendorPickup {
        /// How many vendors the order spans
        vendors: usize,
    },
}

/// Flat fee schedule injected by the caller.
///
/// Real fee policy lives on the backend; the core only needs enough to hold
/// the order total invariant.
#[derive(Clone, Debug)]
pub struct FeeSchedule<'a> {
    delivery: Money<'a, Currency>,
}

impl<'a> FeeSchedule<'a> {
    /// Create a schedule with the given flat delivery fee.
    #[must_use]
    pub fn new(delivery: Money<'a, Currency>) -> Self {
        Self { delivery }
    }

    /// The fee for a fulfillment type. Pickup is always free.
    #[must_use]
    pub fn fee_for(&self, fulfillment: FulfillmentType) -> Money<'a, Currency> {
        match fulfillment {
            FulfillmentType::Pickup => Money::from_minor(0, self.delivery.currency()),
            FulfillmentType::Delivery => self.delivery,
        }
    }
}

/// One line of an order draft, snapshotted from a cart line.
#[derive(Clone, Debug)]
pub struct DraftLine<'a> {
    /// Product the line orders
    pub product: ProductId,

    /// Display title at draft time
    pub title: String,

    /// Vendor that will fulfil the line
    pub vendor: VendorId,

    /// Units ordered
    pub quantity: u32,

    /// Price per unit at draft time
    pub unit_price: Money<'a, Currency>,
}

/// Everything the order gateway needs to place an order.
///
/// Drafts are value snapshots: later cart edits do not affect a draft
/// already handed to the gateway.
#[derive(Debug)]
pub struct OrderDraft<'a> {
    lines: Vec<DraftLine<'a>>,
    fulfillment: FulfillmentType,
    payment: PaymentMethod,
    subtotal: Money<'a, Currency>,
    delivery_fee: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

impl<'a> OrderDraft<'a> {
    /// Snapshot a cart into a draft, pricing it under the given schedule.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: the cart has no lines.
    /// - [`CheckoutError::Cart`] / [`CheckoutError::Money`]: pricing failed.
    pub fn from_cart(
        cart: &Cart<'a>,
        fulfillment: FulfillmentType,
        payment: PaymentMethod,
        fees: &FeeSchedule<'a>,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let lines = cart
            .iter()
            .map(|line| DraftLine {
                product: line.snapshot().id.clone(),
                title: line.snapshot().title.clone(),
                vendor: line.snapshot().vendor.clone(),
                quantity: line.quantity(),
                unit_price: line.snapshot().price,
            })
            .collect();

        let subtotal = cart.subtotal()?;
        let delivery_fee = fees.fee_for(fulfillment);
        let total = subtotal.add(delivery_fee)?;

        Ok(Self {
            lines,
            fulfillment,
            payment,
            subtotal,
            delivery_fee,
            total,
        })
    }

    /// Lines of the draft.
    #[must_use]
    pub fn lines(&self) -> &[DraftLine<'a>] {
        &self.lines
    }

    /// How the order will be handed over.
    #[must_use]
    pub fn fulfillment(&self) -> FulfillmentType {
        self.fulfillment
    }

    /// How the order will be paid.
    #[must_use]
    pub fn payment(&self) -> PaymentMethod {
        self.payment
    }

    /// Item subtotal, before the fee.
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Fee resolved for the chosen fulfillment type.
    #[must_use]
    pub fn delivery_fee(&self) -> Money<'a, Currency> {
        self.delivery_fee
    }

    /// Total the customer will be charged.
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Distinct vendors across the draft.
    #[must_use]
    pub fn vendor_count(&self) -> usize {
        let mut vendors: Vec<&VendorId> = Vec::new();

        for line in &self.lines {
            if !vendors.contains(&&line.vendor) {
                vendors.push(&line.vendor);
            }
        }

        vendors.len()
    }

    /// Warnings the UI must surface before placing this draft.
    ///
    /// A multi-vendor pickup order is legal but means several collection
    /// points; the decision to proceed stays with the shopper.
    #[must_use]
    pub fn warnings(&self) -> Vec<CheckoutWarning> {
        let vendors = self.vendor_count();

        if self.fulfillment == FulfillmentType::Pickup && vendors > 1 {
            vec![CheckoutWarning::MultiVendorPickup { vendors }]
        } else {
            vec![]
        }
    }
}
