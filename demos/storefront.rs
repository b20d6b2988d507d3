//! Storefront Example
//!
//! Browses a fixture catalog with the configured promo boost applied, fills
//! a session cart, and prints the checkout summary.
//!
//! Use `-f` to load a fixture set by name
//! Use `-n` to limit how many products go into the cart
//! Use `-d` to check out for delivery instead of pickup

use std::io;

use anyhow::Result;
use clap::Parser;
use jiff::Timestamp;

use bazaar::{
    cart::CartError,
    catalog::ProductFilter,
    checkout::OrderDraft,
    fixtures::Fixture,
    gateway::MemoryStore,
    orders::{FulfillmentType, PaymentMethod},
    session::Session,
    summary::CheckoutSummary,
    utils::DemoArgs,
};

/// Storefront Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = DemoArgs::parse();
    let now = Timestamp::now();

    let fixture = Fixture::from_set(&args.fixture)?;
    let promo = fixture.promo(now);

    println!("Storefront listing:");

    let listing = fixture
        .catalog()
        .boosted_first(&ProductFilter::any(), promo.as_ref(), now);

    for product in &listing {
        let boosted = promo
            .as_ref()
            .is_some_and(|promo| promo.boosts(&product.vendor, now));

        let badge = if boosted { "*" } else { " " };

        println!(" {badge} {}  {}", product.price, product.title);
    }

    let mut session = Session::start(MemoryStore::new(), fixture.currency()?);
    let take = args.n.unwrap_or(listing.len());
    let picked: Vec<_> = listing.into_iter().take(take).cloned().collect();

    session.with_cart(|cart| -> Result<(), CartError> {
        for product in picked {
            cart.add_item(product)?;
        }

        Ok(())
    })??;

    let fulfillment = if args.delivery {
        FulfillmentType::Delivery
    } else {
        FulfillmentType::Pickup
    };

    let fees = fixture.fee_schedule()?;
    let draft = OrderDraft::from_cart(
        session.cart(),
        fulfillment,
        PaymentMethod::MobileMoney,
        &fees,
    )?;

    for warning in draft.warnings() {
        println!("\nwarning: {warning:?}");
    }

    println!();

    let summary = CheckoutSummary::from_cart(session.cart(), fulfillment, &fees)?;
    summary.write_to(io::stdout().lock())?;

    Ok(())
}
