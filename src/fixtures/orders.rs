//! Order Fixtures

use jiff::Timestamp;
use rusty_money::Money;
use serde::Deserialize;

use crate::{
    fixtures::{FixtureError, products::parse_price},
    fulfillment::ItemStatus,
    ingest,
    orders::{CustomerId, FulfillmentType, Order, OrderId, OrderItem, OrderItemId, ProductRef},
    products::{ProductId, VendorId},
};

/// Wrapper for orders in YAML
#[derive(Debug, Deserialize)]
pub struct OrdersFixture {
    /// Flat delivery fee (e.g., "1.50 GBP")
    pub delivery_fee: String,

    /// Orders in the fixture set
    pub orders: Vec<OrderFixture>,
}

/// Order Fixture
#[derive(Debug, Deserialize)]
pub struct OrderFixture {
    /// Backend order id
    pub id: String,

    /// Customer id
    pub customer: String,

    /// `pickup` or `delivery`
    pub fulfillment: String,

    /// `cash_on_delivery` or `mobile_money`
    pub payment: String,

    /// RFC 3339 placement time
    pub created_at: String,

    /// Items of the order
    pub items: Vec<OrderItemFixture>,
}

/// Order Item Fixture
#[derive(Debug, Deserialize)]
pub struct OrderItemFixture {
    /// Backend item id
    pub id: String,

    /// Product id; omitted to model a deleted product
    #[serde(default)]
    pub product: Option<String>,

    /// Fulfilling vendor id
    pub vendor: String,

    /// Units ordered
    pub quantity: u32,

    /// Unit price (e.g., "4.50 GBP")
    pub price: String,

    /// Fulfillment status wire name
    pub status: String,
}

impl OrderFixture {
    /// Convert to an [`Order`], resolving product titles through `resolve`.
    ///
    /// # Errors
    ///
    /// Returns an error if a price, status, or name cannot be parsed.
    pub fn into_order(
        self,
        delivery_fee: &str,
        resolve: impl Fn(&str) -> Option<String>,
    ) -> Result<Order<'static>, FixtureError> {
        let fulfillment = ingest::fulfillment_type(&self.fulfillment)?;
        let payment = ingest::payment_method(&self.payment)?;

        let created_at: Timestamp = self
            .created_at
            .parse()
            .map_err(|_err| FixtureError::InvalidTimestamp(self.created_at.clone()))?;

        let mut items = Vec::with_capacity(self.items.len());

        for item in self.items {
            let (minor, currency) = parse_price(&item.price)?;
            let status: ItemStatus = item.status.parse()?;

            let product = item.product.map(|id| ProductRef {
                title: resolve(&id),
                id: ProductId::from(id),
            });

            items.push(OrderItem::new(
                OrderItemId::from(item.id),
                product,
                VendorId::from(item.vendor),
                item.quantity,
                Money::from_minor(minor, currency),
                status,
            ));
        }

        let (fee_minor, fee_currency) = parse_price(delivery_fee)?;

        let fee = match fulfillment {
            FulfillmentType::Pickup => Money::from_minor(0, fee_currency),
            FulfillmentType::Delivery => Money::from_minor(fee_minor, fee_currency),
        };

        Ok(Order::new(
            OrderId::from(self.id),
            CustomerId::from(self.customer),
            items,
            fulfillment,
            payment,
            fee,
            created_at,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money as M, iso::GBP};
    use testresult::TestResult;

    use crate::fulfillment::OrderStatus;

    use super::*;

    fn fixture() -> OrderFixture {
        OrderFixture {
            id: "o-1".to_owned(),
            customer: "c-1".to_owned(),
            fulfillment: "delivery".to_owned(),
            payment: "cash_on_delivery".to_owned(),
            created_at: "2024-03-01T12:00:00Z".to_owned(),
            items: vec![OrderItemFixture {
                id: "i-1".to_owned(),
                product: Some("p-honey".to_owned()),
                vendor: "v-1".to_owned(),
                quantity: 2,
                price: "4.50 GBP".to_owned(),
                status: "pending".to_owned(),
            }],
        }
    }

    #[test]
    fn into_order_prices_items_and_fee() -> TestResult {
        let order = fixture().into_order("1.50 GBP", |_id| Some("Honey".to_owned()))?;

        assert_eq!(order.total(), M::from_minor(1050, GBP));
        assert_eq!(order.status(), OrderStatus::Pending);

        let first = order.items().first().ok_or("missing item")?;
        assert_eq!(first.display_title(), "Honey");

        Ok(())
    }

    #[test]
    fn pickup_orders_take_no_fee() -> TestResult {
        let mut pickup = fixture();
        pickup.fulfillment = "pickup".to_owned();

        let order = pickup.into_order("1.50 GBP", |_id| None)?;

        assert_eq!(order.delivery_fee(), M::from_minor(0, GBP));
        assert_eq!(order.total(), M::from_minor(900, GBP));

        Ok(())
    }

    #[test]
    fn unknown_status_is_rejected() {
        let mut broken = fixture();
        if let Some(item) = broken.items.first_mut() {
            item.status = "vanished".to_owned();
        }

        let result = broken.into_order("1.50 GBP", |_id| None);

        assert!(matches!(result, Err(FixtureError::InvalidStatus(_))));
    }
}
