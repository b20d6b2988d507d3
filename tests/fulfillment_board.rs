//! Integration tests for the order fulfillment lifecycle over the `market`
//! fixture set.
//!
//! The fixture holds three orders:
//!
//! - `o-1001`: two pending items from two vendors (delivery)
//! - `o-1002`: accepted + preparing dairy items and one rejected grove item
//!   (pickup)
//! - `o-1003`: two delivered items (delivery)

use testresult::TestResult;

use bazaar::{
    fixtures::Fixture,
    fulfillment::{FulfillmentAction, OrderStatus, VendorStatus},
    notifications::{Feed, Role, User, UserId},
    orders::OrderItemId,
    products::VendorId,
};

#[test]
fn fixture_orders_fold_to_the_expected_statuses() -> TestResult {
    let fixture = Fixture::from_set("market")?;

    let statuses: Vec<OrderStatus> = fixture.orders().iter().map(|order| order.status()).collect();

    assert_eq!(
        statuses,
        vec![
            OrderStatus::Pending,
            OrderStatus::Pending,
            OrderStatus::Completed,
        ]
    );

    Ok(())
}

#[test]
fn vendor_slices_fold_independently() -> TestResult {
    let fixture = Fixture::from_set("market")?;

    let mixed = fixture.orders().get(1).ok_or("missing order o-1002")?;

    assert_eq!(
        mixed.vendor_status(&VendorId::from("v-dairy")),
        VendorStatus::Pending
    );
    assert_eq!(
        mixed.vendor_status(&VendorId::from("v-grove")),
        VendorStatus::Rejected
    );

    Ok(())
}

#[test]
fn auto_pass_then_stepwise_advance_completes_an_order() -> TestResult {
    let mut fixture = Fixture::from_set("market")?;

    let order = fixture
        .orders_mut()
        .first_mut()
        .ok_or("missing order o-1001")?;

    assert_eq!(order.auto_pass(), 2);
    assert_eq!(order.auto_pass(), 0, "auto-pass must not re-accept");

    // accepted -> preparing -> ready -> delivered, one step per call
    assert_eq!(order.advance_fulfilled(), 2);
    assert_eq!(order.advance_fulfilled(), 2);
    assert_eq!(order.advance_fulfilled(), 2);
    assert_eq!(order.advance_fulfilled(), 0);

    assert_eq!(order.status(), OrderStatus::Completed);

    Ok(())
}

#[test]
fn bulk_advance_skips_pending_and_rejected_items() -> TestResult {
    let mut fixture = Fixture::from_set("market")?;

    let order = fixture
        .orders_mut()
        .get_mut(1)
        .ok_or("missing order o-1002")?;

    // accepted and preparing move; the rejected item is silently skipped
    assert_eq!(order.advance_fulfilled(), 2);

    assert_eq!(
        order.vendor_status(&VendorId::from("v-grove")),
        VendorStatus::Rejected
    );

    Ok(())
}

#[test]
fn explicit_transition_against_terminal_item_errors() -> TestResult {
    let mut fixture = Fixture::from_set("market")?;

    let order = fixture
        .orders_mut()
        .get_mut(1)
        .ok_or("missing order o-1002")?;

    let result = order.apply(&OrderItemId::from("i-5"), FulfillmentAction::Advance);

    assert!(result.is_err(), "advance from rejected must fail");

    Ok(())
}

#[test]
fn deleted_product_renders_a_placeholder_title() -> TestResult {
    let fixture = Fixture::from_set("market")?;

    let order = fixture.orders().get(1).ok_or("missing order o-1002")?;

    let orphan = order
        .items()
        .iter()
        .find(|item| item.id.as_str() == "i-5")
        .ok_or("missing item i-5")?;

    assert!(orphan.product.is_none());
    assert_eq!(orphan.display_title(), "(product no longer available)");

    Ok(())
}

#[test]
fn unread_counts_respect_audience_and_read_sets() -> TestResult {
    let fixture = Fixture::from_set("market")?;
    let feed = Feed::from_entries(fixture.notifications_vec());

    // n-3 targets both (unread); n-2 targets vendors but u-meadow read it
    let vendor = User {
        id: UserId::from("u-meadow"),
        role: Role::Vendor,
    };
    assert_eq!(feed.unread_count_for(&vendor), 1);

    // n-3 (both) and n-1 (customer) are unread for a customer
    let customer = User {
        id: UserId::from("c-ade"),
        role: Role::Customer,
    };
    assert_eq!(feed.unread_count_for(&customer), 2);

    // another vendor has not read n-2 yet
    let other_vendor = User {
        id: UserId::from("u-hearth"),
        role: Role::Vendor,
    };
    assert_eq!(feed.unread_count_for(&other_vendor), 2);

    Ok(())
}
