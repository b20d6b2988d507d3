//! Vendor Board Example
//!
//! Loads fixture orders, lets a short-lived auto-pass poller accept the
//! pending items, then prints each vendor's board, the unread notification
//! counts, and the promo countdown.
//!
//! Use `-f` to load a fixture set by name

use std::{
    io,
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use anyhow::{Result, bail};
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};
use jiff::Timestamp;

use bazaar::{
    fixtures::Fixture,
    notifications::{Feed, Role, User, UserId},
    poll::Poller,
    summary::VendorBoard,
    utils::DemoArgs,
};

/// Vendor Board Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = DemoArgs::parse();
    let now = Timestamp::now();

    let mut fixture = Fixture::from_set(&args.fixture)?;

    let orders = Arc::new(Mutex::new(fixture.take_orders()));
    let worker = Arc::clone(&orders);

    let mut poller = Poller::spawn(Duration::from_millis(150), move || {
        if let Ok(mut orders) = worker.lock() {
            for order in orders.iter_mut() {
                order.auto_pass();
            }
        }
    });

    thread::sleep(Duration::from_millis(500));
    poller.stop();

    let Ok(orders) = orders.lock() else {
        bail!("auto-pass poller poisoned the order list");
    };

    for order in orders.iter() {
        for vendor in order.vendors() {
            VendorBoard::new(order, vendor).write_to(io::stdout().lock())?;
        }

        println!(" order-level status: {}\n", order.status());
    }

    let feed = Feed::from_entries(fixture.notifications_vec());

    for (name, role) in [("u-meadow", Role::Vendor), ("c-ade", Role::Customer)] {
        let user = User {
            id: UserId::from(name),
            role,
        };

        println!("unread for {name}: {}", feed.unread_count_for(&user));
    }

    if let Some(promo) = fixture.promo(now) {
        let remaining = promo.remaining(now).unsigned_abs();

        println!("promo ends in {}", remaining.human(Truncate::Second));
    }

    Ok(())
}
