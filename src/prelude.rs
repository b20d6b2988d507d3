//! Bazaar prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine},
    catalog::{Catalog, ProductFilter},
    checkout::{CheckoutError, CheckoutWarning, DraftLine, FeeSchedule, OrderDraft},
    fulfillment::{
        FulfillmentAction, ItemStatus, OrderStatus, TransitionError, UnknownStatus, VendorStatus,
        advance_fulfilled, auto_pass, order_status, vendor_status,
    },
    gateway::{
        GatewayError, MemoryStore, NotificationChannel, OrderGateway, PersistentStore,
        ProductCatalog, StoreError,
    },
    ingest::IngestError,
    notifications::{
        Audience, Feed, FeedEvent, Notification, NotificationId, Role, User, UserId,
        audience_matches, unread_count_for,
    },
    orders::{
        CustomerId, FulfillmentType, Order, OrderApplyError, OrderError, OrderId, OrderItem,
        OrderItemId, PaymentMethod, ProductRef,
    },
    poll::Poller,
    products::{Product, ProductId, ProductKey, VendorId},
    promos::{Promo, PromoBoard},
    session::Session,
    summary::{CheckoutSummary, SummaryError, VendorBoard},
};
