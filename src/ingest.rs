//! Ingest
//!
//! Typed, validated boundary between raw backend payloads and the domain
//! records the rest of the crate works with. Nothing past this module sees
//! untyped JSON: payloads are parsed into the structs below, validated, and
//! converted, or rejected with an [`IngestError`].

use jiff::Timestamp;
use rusty_money::{Findable, Money, MoneyError, iso};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    checkout::FeeSchedule,
    fulfillment::{ItemStatus, UnknownStatus},
    notifications::{Audience, Notification, NotificationId, Role, UserId},
    orders::{
        CustomerId, FulfillmentType, Order, OrderError, OrderId, OrderItem, OrderItemId,
        PaymentMethod, ProductRef,
    },
    products::{Product, ProductId, VendorId},
};

/// Errors rejecting a backend payload at the ingestion boundary.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The payload was not valid JSON for the expected shape.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The ISO currency code is not recognised.
    #[error("unknown currency code `{0}`")]
    UnknownCurrency(String),

    /// A price was negative.
    #[error("invalid price {minor} on `{context}`")]
    InvalidPrice {
        /// Identifier of the offending record
        context: String,

        /// The rejected minor-unit amount
        minor: i64,
    },

    /// A quantity was not a positive integer in range.
    #[error("invalid quantity {0}")]
    InvalidQuantity(i64),

    /// A fulfillment status name was not recognised.
    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),

    /// A fulfillment type name was not recognised.
    #[error("unknown fulfillment type `{0}`")]
    UnknownFulfillment(String),

    /// A payment method name was not recognised.
    #[error("unknown payment method `{0}`")]
    UnknownPayment(String),

    /// A notification audience name was not recognised.
    #[error("unknown audience `{0}`")]
    UnknownAudience(String),

    /// A user role name was not recognised.
    #[error("unknown role `{0}`")]
    UnknownRole(String),

    /// A timestamp failed to parse as RFC 3339.
    #[error("invalid timestamp `{0}`")]
    InvalidTimestamp(String),

    /// The backend-declared order total disagrees with the recomputed one.
    #[error("order total {declared} does not match computed {computed} (minor units)")]
    TotalMismatch {
        /// Total the payload declared
        declared: i64,

        /// Total recomputed from the items and fee
        computed: i64,
    },

    /// Order assembly failed after field validation.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Wire shape of a product listing.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ProductPayload {
    /// Backend identifier
    pub id: String,

    /// Owning vendor identifier
    pub vendor: String,

    /// Display title
    pub title: String,

    /// Selling price in minor units
    pub price_minor: i64,

    /// ISO 4217 currency code
    pub currency: String,

    /// Pre-sale price in minor units, when discounted
    #[serde(default)]
    pub compare_at_minor: Option<i64>,

    /// Hosted image reference
    #[serde(default)]
    pub image: Option<String>,

    /// Search tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&Product<'_>> for ProductPayload {
    fn from(product: &Product<'_>) -> Self {
        Self {
            id: product.id.as_str().to_owned(),
            vendor: product.vendor.as_str().to_owned(),
            title: product.title.clone(),
            price_minor: product.price.to_minor_units(),
            currency: product.price.currency().iso_alpha_code.to_owned(),
            compare_at_minor: product.compare_at_price.map(|m| m.to_minor_units()),
            image: product.image.clone(),
            tags: product.tags.clone(),
        }
    }
}

/// Wire shape of one order item.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OrderItemPayload {
    /// Backend identifier
    pub id: String,

    /// Product reference; absent once the product was deleted
    #[serde(default)]
    pub product_id: Option<String>,

    /// Product title, when it still resolves
    #[serde(default)]
    pub product_title: Option<String>,

    /// Fulfilling vendor identifier
    pub vendor: String,

    /// Units ordered
    pub quantity: i64,

    /// Price per unit in minor units
    pub unit_price_minor: i64,

    /// Fulfillment status wire name
    pub status: String,
}

/// Wire shape of a placed order.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct OrderPayload {
    /// Backend identifier
    pub id: String,

    /// Customer identifier
    pub customer: String,

    /// ISO 4217 currency code
    pub currency: String,

    /// `pickup` or `delivery`
    pub fulfillment: String,

    /// `cash_on_delivery` or `mobile_money`
    pub payment: String,

    /// Backend-declared total in minor units
    pub total_minor: i64,

    /// RFC 3339 placement time
    pub created_at: String,

    /// Items of the order
    pub items: Vec<OrderItemPayload>,
}

/// Wire shape of a notification.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NotificationPayload {
    /// Backend identifier
    pub id: String,

    /// Announcement body
    pub message: String,

    /// `vendor`, `customer` or `both`
    pub target: String,

    /// RFC 3339 publication time
    pub created_at: String,

    /// Users who have already read the notification
    #[serde(default)]
    pub read_by: Vec<String>,
}

/// Resolve an ISO 4217 code to a currency.
///
/// # Errors
///
/// Returns [`IngestError::UnknownCurrency`] for unrecognised codes.
pub fn currency(code: &str) -> Result<&'static iso::Currency, IngestError> {
    iso::Currency::find(code).ok_or_else(|| IngestError::UnknownCurrency(code.to_owned()))
}

/// Parse a fulfillment type wire name.
///
/// # Errors
///
/// Returns [`IngestError::UnknownFulfillment`] for unrecognised names.
pub fn fulfillment_type(name: &str) -> Result<FulfillmentType, IngestError> {
    match name {
        "pickup" => Ok(FulfillmentType::Pickup),
        "delivery" => Ok(FulfillmentType::Delivery),
        other => Err(IngestError::UnknownFulfillment(other.to_owned())),
    }
}

/// Parse a payment method wire name.
///
/// # Errors
///
/// Returns [`IngestError::UnknownPayment`] for unrecognised names.
pub fn payment_method(name: &str) -> Result<PaymentMethod, IngestError> {
    match name {
        "cash_on_delivery" => Ok(PaymentMethod::CashOnDelivery),
        "mobile_money" => Ok(PaymentMethod::MobileMoney),
        other => Err(IngestError::UnknownPayment(other.to_owned())),
    }
}

/// Parse a notification audience wire name.
///
/// # Errors
///
/// Returns [`IngestError::UnknownAudience`] for unrecognised names.
pub fn audience(name: &str) -> Result<Audience, IngestError> {
    match name {
        "vendor" => Ok(Audience::Vendor),
        "customer" => Ok(Audience::Customer),
        "both" => Ok(Audience::Both),
        other => Err(IngestError::UnknownAudience(other.to_owned())),
    }
}

/// Parse a user role wire name.
///
/// # Errors
///
/// Returns [`IngestError::UnknownRole`] for unrecognised names.
pub fn role(name: &str) -> Result<Role, IngestError> {
    match name {
        "customer" => Ok(Role::Customer),
        "vendor" => Ok(Role::Vendor),
        "admin" => Ok(Role::Admin),
        other => Err(IngestError::UnknownRole(other.to_owned())),
    }
}

fn timestamp(raw: &str) -> Result<Timestamp, IngestError> {
    raw.parse()
        .map_err(|_err| IngestError::InvalidTimestamp(raw.to_owned()))
}

fn positive_quantity(raw: i64) -> Result<u32, IngestError> {
    if raw < 1 {
        return Err(IngestError::InvalidQuantity(raw));
    }

    u32::try_from(raw).map_err(|_err| IngestError::InvalidQuantity(raw))
}

fn non_negative_price(context: &str, minor: i64) -> Result<i64, IngestError> {
    if minor < 0 {
        return Err(IngestError::InvalidPrice {
            context: context.to_owned(),
            minor,
        });
    }

    Ok(minor)
}

/// Convert a product payload into a domain product.
///
/// # Errors
///
/// Returns an [`IngestError`] for unknown currencies or negative prices.
pub fn product(payload: ProductPayload) -> Result<Product<'static>, IngestError> {
    let currency = currency(&payload.currency)?;
    let price_minor = non_negative_price(&payload.id, payload.price_minor)?;

    let compare_at_price = payload
        .compare_at_minor
        .map(|minor| Ok(Money::from_minor(non_negative_price(&payload.id, minor)?, currency)))
        .transpose()?;

    Ok(Product {
        id: ProductId::from(payload.id),
        vendor: VendorId::from(payload.vendor),
        title: payload.title,
        price: Money::from_minor(price_minor, currency),
        compare_at_price,
        image: payload.image,
        tags: payload.tags,
    })
}

/// Parse and convert a JSON product payload.
///
/// # Errors
///
/// Returns an [`IngestError`] on malformed JSON or failed validation.
pub fn product_json(raw: &str) -> Result<Product<'static>, IngestError> {
    product(serde_json::from_str(raw)?)
}

/// Convert an order payload into a domain order, revalidating the total.
///
/// The declared total must equal the recomputed `Σ unit price × quantity +
/// delivery fee`; a disagreement means the collaborator handed over a
/// partially-applied mutation, which the core refuses to hold.
///
/// # Errors
///
/// Returns an [`IngestError`] for unknown names, invalid quantities or
/// prices, or a total mismatch.
pub fn order(
    payload: OrderPayload,
    fees: &FeeSchedule<'static>,
) -> Result<Order<'static>, IngestError> {
    let currency = currency(&payload.currency)?;
    let fulfillment = fulfillment_type(&payload.fulfillment)?;
    let payment = payment_method(&payload.payment)?;
    let created_at = timestamp(&payload.created_at)?;

    let mut items = Vec::with_capacity(payload.items.len());

    for item in payload.items {
        let quantity = positive_quantity(item.quantity)?;
        let unit_minor = non_negative_price(&item.id, item.unit_price_minor)?;
        let status: ItemStatus = item.status.parse()?;

        let product = item.product_id.map(|id| ProductRef {
            id: ProductId::from(id),
            title: item.product_title,
        });

        items.push(OrderItem::new(
            OrderItemId::from(item.id),
            product,
            VendorId::from(item.vendor),
            quantity,
            Money::from_minor(unit_minor, currency),
            status,
        ));
    }

    let order = Order::new(
        OrderId::from(payload.id),
        CustomerId::from(payload.customer),
        items,
        fulfillment,
        payment,
        fees.fee_for(fulfillment),
        created_at,
    )?;

    let computed = order.total().to_minor_units();

    if computed != payload.total_minor {
        return Err(IngestError::TotalMismatch {
            declared: payload.total_minor,
            computed,
        });
    }

    Ok(order)
}

/// Parse and convert a JSON order payload.
///
/// # Errors
///
/// Returns an [`IngestError`] on malformed JSON or failed validation.
pub fn order_json(raw: &str, fees: &FeeSchedule<'static>) -> Result<Order<'static>, IngestError> {
    order(serde_json::from_str(raw)?, fees)
}

/// Convert a notification payload into a domain notification.
///
/// # Errors
///
/// Returns an [`IngestError`] for unknown audiences or bad timestamps.
pub fn notification(payload: NotificationPayload) -> Result<Notification, IngestError> {
    let target = audience(&payload.target)?;
    let created_at = timestamp(&payload.created_at)?;

    Ok(Notification::with_read_by(
        NotificationId::from(payload.id),
        payload.message,
        target,
        created_at,
        payload.read_by.into_iter().map(UserId::from).collect(),
    ))
}

/// Parse and convert a JSON notification payload.
///
/// # Errors
///
/// Returns an [`IngestError`] on malformed JSON or failed validation.
pub fn notification_json(raw: &str) -> Result<Notification, IngestError> {
    notification(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::fulfillment::OrderStatus;

    use super::*;

    fn fees() -> FeeSchedule<'static> {
        FeeSchedule::new(Money::from_minor(500, GBP))
    }

    fn order_payload() -> OrderPayload {
        OrderPayload {
            id: "o-1".to_owned(),
            customer: "c-1".to_owned(),
            currency: "GBP".to_owned(),
            fulfillment: "delivery".to_owned(),
            payment: "mobile_money".to_owned(),
            total_minor: 2500,
            created_at: "2024-03-01T12:00:00Z".to_owned(),
            items: vec![OrderItemPayload {
                id: "i-1".to_owned(),
                product_id: Some("p-1".to_owned()),
                product_title: Some("Honey".to_owned()),
                vendor: "v-1".to_owned(),
                quantity: 2,
                unit_price_minor: 1000,
                status: "pending".to_owned(),
            }],
        }
    }

    #[test]
    fn product_payload_converts_and_round_trips() -> TestResult {
        let payload = ProductPayload {
            id: "p-1".to_owned(),
            vendor: "v-1".to_owned(),
            title: "Honey".to_owned(),
            price_minor: 350,
            currency: "GBP".to_owned(),
            compare_at_minor: Some(400),
            image: None,
            tags: vec!["sweet".to_owned()],
        };

        let product = product(payload)?;

        assert_eq!(product.price, Money::from_minor(350, GBP));
        assert!(product.on_sale());

        let back = ProductPayload::from(&product);
        assert_eq!(back.price_minor, 350);
        assert_eq!(back.currency, "GBP");
        assert_eq!(back.compare_at_minor, Some(400));

        Ok(())
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let result = currency("WAT");

        assert!(matches!(
            result,
            Err(IngestError::UnknownCurrency(code)) if code == "WAT"
        ));
    }

    #[test]
    fn negative_price_is_rejected() {
        let payload = ProductPayload {
            id: "p-1".to_owned(),
            vendor: "v-1".to_owned(),
            title: "Broken".to_owned(),
            price_minor: -5,
            currency: "GBP".to_owned(),
            compare_at_minor: None,
            image: None,
            tags: vec![],
        };

        assert!(matches!(
            product(payload),
            Err(IngestError::InvalidPrice { minor: -5, .. })
        ));
    }

    #[test]
    fn order_converts_when_the_total_checks_out() -> TestResult {
        let order = order(order_payload(), &fees())?;

        assert_eq!(order.total(), Money::from_minor(2500, GBP));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.items().len(), 1);

        Ok(())
    }

    #[test]
    fn order_total_mismatch_is_rejected() {
        let mut payload = order_payload();
        payload.total_minor = 9999;

        let result = order(payload, &fees());

        assert!(matches!(
            result,
            Err(IngestError::TotalMismatch {
                declared: 9999,
                computed: 2500,
            })
        ));
    }

    #[test]
    fn order_rejects_bad_quantity_and_status() {
        let mut bad_quantity = order_payload();
        if let Some(item) = bad_quantity.items.first_mut() {
            item.quantity = 0;
        }
        assert!(matches!(
            order(bad_quantity, &fees()),
            Err(IngestError::InvalidQuantity(0))
        ));

        let mut bad_status = order_payload();
        if let Some(item) = bad_status.items.first_mut() {
            item.status = "shipped".to_owned();
        }
        assert!(matches!(
            order(bad_status, &fees()),
            Err(IngestError::UnknownStatus(_))
        ));
    }

    #[test]
    fn deleted_product_degrades_to_none() -> TestResult {
        let mut payload = order_payload();
        if let Some(item) = payload.items.first_mut() {
            item.product_id = None;
            item.product_title = None;
        }

        let order = order(payload, &fees())?;
        let first = order.items().first().ok_or("missing item")?;

        assert!(first.product.is_none());
        assert_eq!(first.display_title(), "(product no longer available)");

        Ok(())
    }

    #[test]
    fn notification_json_parses_audience_and_read_set() -> TestResult {
        let raw = r#"{
            "id": "n-1",
            "message": "Market closes early on Friday",
            "target": "both",
            "created_at": "2024-03-01T08:00:00Z",
            "read_by": ["u-1"]
        }"#;

        let notification = notification_json(raw)?;

        assert_eq!(notification.target, Audience::Both);
        assert!(notification.is_read_by(&UserId::from("u-1")));
        assert!(!notification.is_read_by(&UserId::from("u-2")));

        Ok(())
    }

    #[test]
    fn unknown_audience_is_rejected() {
        let result = audience("everyone");

        assert!(matches!(
            result,
            Err(IngestError::UnknownAudience(name)) if name == "everyone"
        ));
    }
}
