//! Summary
//!
//! Terminal-renderable projections of a cart at checkout and of a vendor's
//! slice of an order board.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Color, Style, object::{Columns, Rows}},
};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    checkout::FeeSchedule,
    orders::{FulfillmentType, Order, OrderError},
    products::VendorId,
};

/// Errors that can occur when building or writing a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Error pricing the cart.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Error pricing the order.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("summary write failed")]
    Io,
}

struct SummaryRow {
    title: String,
    quantity: u32,
    unit_price: String,
    line_total: String,
}

/// Checkout-time view of a cart: line rows, fee, totals and savings.
pub struct CheckoutSummary<'a> {
    rows: Vec<SummaryRow>,
    subtotal: Money<'a, Currency>,
    compare_at_subtotal: Money<'a, Currency>,
    delivery_fee: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

impl std::fmt::Debug for CheckoutSummary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutSummary")
            .field("lines", &self.rows.len())
            .field("subtotal", &self.subtotal)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

impl<'a> CheckoutSummary<'a> {
    /// Build a summary of the cart under the given fee schedule.
    ///
    /// # Errors
    ///
    /// Returns a [`SummaryError`] if the cart cannot be priced.
    pub fn from_cart(
        cart: &Cart<'a>,
        fulfillment: FulfillmentType,
        fees: &FeeSchedule<'a>,
    ) -> Result<Self, SummaryError> {
        let mut rows = Vec::with_capacity(cart.len());
        let mut compare_at_subtotal = Money::from_minor(0, cart.currency());

        for line in cart.iter() {
            let snapshot = line.snapshot();

            rows.push(SummaryRow {
                title: snapshot.title.clone(),
                quantity: line.quantity(),
                unit_price: snapshot.price.to_string(),
                line_total: line.line_total()?.to_string(),
            });

            let was = snapshot.compare_at_price.unwrap_or(snapshot.price);
            let was_minor = was
                .to_minor_units()
                .checked_mul(i64::from(line.quantity()))
                .ok_or_else(|| CartError::Overflow(snapshot.id.clone()))?;

            compare_at_subtotal =
                compare_at_subtotal.add(Money::from_minor(was_minor, cart.currency()))?;
        }

        let subtotal = cart.subtotal()?;
        let delivery_fee = fees.fee_for(fulfillment);
        let total = subtotal.add(delivery_fee)?;

        Ok(Self {
            rows,
            subtotal,
            compare_at_subtotal,
            delivery_fee,
            total,
        })
    }

    /// Item subtotal, before the fee.
    #[must_use]
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// Fee for the chosen fulfillment type.
    #[must_use]
    pub fn delivery_fee(&self) -> Money<'a, Currency> {
        self.delivery_fee
    }

    /// Total the customer will be charged.
    #[must_use]
    pub fn total(&self) -> Money<'a, Currency> {
        self.total
    }

    /// Amount saved against compare-at prices.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.compare_at_subtotal.sub(self.subtotal)
    }

    /// Savings as a fraction of the compare-at subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if the subtraction operation fails.
    pub fn savings_percent(&self) -> Result<Percentage, MoneyError> {
        let savings_minor = self.savings()?.to_minor_units();
        let compare_at_minor = self.compare_at_subtotal.to_minor_units();

        if compare_at_minor == 0 {
            return Ok(Percentage::from(0.0));
        }

        // Ratio in decimal space; integer division would truncate to zero.
        let savings_dec = Decimal::from_i64(savings_minor).unwrap_or(Decimal::ZERO);
        let compare_at_dec = Decimal::from_i64(compare_at_minor).unwrap_or(Decimal::ZERO);

        Ok(Percentage::from(savings_dec / compare_at_dec))
    }

    /// Render the summary as a table.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Io`] if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit", "Total"]);

        for row in &self.rows {
            builder.push_record([
                row.title.clone(),
                row.quantity.to_string(),
                row.unit_price.clone(),
                row.line_total.clone(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| SummaryError::Io)?;

        writeln!(out, " Subtotal:     {}", self.subtotal).map_err(|_err| SummaryError::Io)?;
        writeln!(out, " Delivery fee: {}", self.delivery_fee).map_err(|_err| SummaryError::Io)?;

        let savings = self.savings()?;
        if savings.to_minor_units() > 0 {
            let points = percent_points(self.savings_percent()?);

            writeln!(out, " Savings:      {savings} ({points}%)")
                .map_err(|_err| SummaryError::Io)?;
        }

        writeln!(out, " Total:        {}", self.total).map_err(|_err| SummaryError::Io)?;

        Ok(())
    }
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    // `Percentage` is a fraction (e.g. 0.25), so multiply by 100 to print percent points.
    ((percentage * Decimal::ONE) * Decimal::from_i64(100).unwrap_or(Decimal::ZERO)).round_dp(1)
}

/// One vendor's slice of an order, rendered for the vendor board.
#[derive(Debug)]
pub struct VendorBoard<'a, 'o> {
    vendor: VendorId,
    order: &'o Order<'a>,
}

impl<'a, 'o> VendorBoard<'a, 'o> {
    /// Scope an order to one vendor.
    #[must_use]
    pub fn new(order: &'o Order<'a>, vendor: VendorId) -> Self {
        Self { vendor, order }
    }

    /// Render the vendor's items and scoped status as a table.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Io`] if the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Qty", "Unit", "Status"]);

        for item in self.order.items_for(&self.vendor) {
            builder.push_record([
                item.display_title().to_owned(),
                item.quantity.to_string(),
                item.unit_price.to_string(),
                item.status().to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..3), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| SummaryError::Io)?;

        writeln!(
            out,
            " Order {} · vendor {} · {}",
            self.order.id,
            self.vendor,
            self.order.vendor_status(&self.vendor)
        )
        .map_err(|_err| SummaryError::Io)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{
        fulfillment::ItemStatus,
        orders::{CustomerId, OrderId, OrderItem, OrderItemId, PaymentMethod, ProductRef},
        products::{Product, ProductId},
    };

    use super::*;

    fn product(id: &str, minor: i64, compare_at: Option<i64>) -> Product<'static> {
        Product {
            id: ProductId::from(id),
            vendor: VendorId::from("v1"),
            title: format!("Product {id}"),
            price: Money::from_minor(minor, GBP),
            compare_at_price: compare_at.map(|m| Money::from_minor(m, GBP)),
            image: None,
            tags: vec![],
        }
    }

    fn fees() -> FeeSchedule<'static> {
        FeeSchedule::new(Money::from_minor(400, GBP))
    }

    #[test]
    fn summary_totals_include_the_fee() -> TestResult {
        let mut cart = Cart::new(GBP);
        cart.add_item(product("a", 1000, None))?;
        cart.add_item(product("b", 500, None))?;

        let summary =
            CheckoutSummary::from_cart(&cart, FulfillmentType::Delivery, &fees())?;

        assert_eq!(summary.subtotal(), Money::from_minor(1500, GBP));
        assert_eq!(summary.delivery_fee(), Money::from_minor(400, GBP));
        assert_eq!(summary.total(), Money::from_minor(1900, GBP));

        Ok(())
    }

    #[test]
    fn savings_come_from_compare_at_prices() -> TestResult {
        let mut cart = Cart::new(GBP);
        cart.add_item(product("a", 750, Some(1000)))?;
        cart.add_item(product("b", 500, None))?;

        let summary = CheckoutSummary::from_cart(&cart, FulfillmentType::Pickup, &fees())?;

        assert_eq!(summary.savings()?, Money::from_minor(250, GBP));

        Ok(())
    }

    #[test]
    fn savings_percent_is_zero_for_an_empty_cart() -> TestResult {
        let cart = Cart::new(GBP);

        let summary = CheckoutSummary::from_cart(&cart, FulfillmentType::Pickup, &fees())?;

        assert_eq!(summary.savings_percent()?, Percentage::from(0.0));

        Ok(())
    }

    #[test]
    fn summary_renders_every_line() -> TestResult {
        let mut cart = Cart::new(GBP);
        cart.add_item(product("a", 750, Some(1000)))?;
        cart.add_item(product("b", 500, None))?;

        let summary =
            CheckoutSummary::from_cart(&cart, FulfillmentType::Delivery, &fees())?;

        let mut rendered = Vec::new();
        summary.write_to(&mut rendered)?;
        let text = String::from_utf8(rendered)?;

        assert!(text.contains("Product a"), "missing first line: {text}");
        assert!(text.contains("Product b"), "missing second line: {text}");
        assert!(text.contains("Savings"), "missing savings row: {text}");

        Ok(())
    }

    #[test]
    fn vendor_board_shows_only_the_vendors_items() -> TestResult {
        let order = Order::new(
            OrderId::from("o-1"),
            CustomerId::from("c-1"),
            vec![
                OrderItem::new(
                    OrderItemId::from("i-1"),
                    Some(ProductRef {
                        id: ProductId::from("p-1"),
                        title: Some("Honey".to_owned()),
                    }),
                    VendorId::from("v1"),
                    1,
                    Money::from_minor(300, GBP),
                    ItemStatus::Preparing,
                ),
                OrderItem::new(
                    OrderItemId::from("i-2"),
                    Some(ProductRef {
                        id: ProductId::from("p-2"),
                        title: Some("Olive Oil".to_owned()),
                    }),
                    VendorId::from("v2"),
                    1,
                    Money::from_minor(800, GBP),
                    ItemStatus::Pending,
                ),
            ],
            FulfillmentType::Pickup,
            PaymentMethod::CashOnDelivery,
            Money::from_minor(0, GBP),
            jiff::Timestamp::UNIX_EPOCH,
        )?;

        let mut rendered = Vec::new();
        VendorBoard::new(&order, VendorId::from("v1")).write_to(&mut rendered)?;
        let text = String::from_utf8(rendered)?;

        assert!(text.contains("Honey"), "missing vendor item: {text}");
        assert!(!text.contains("Olive Oil"), "foreign item leaked: {text}");
        assert!(text.contains("preparing"), "missing status: {text}");

        Ok(())
    }
}
