//! Session
//!
//! The injected scope tying a cart and a signed-in user to a
//! [`PersistentStore`]: the cart is loaded once when the session starts,
//! written back after every mutation, and cleared on logout or after a
//! successful order. Views receive the session rather than reading ambient
//! storage themselves.

use std::num::NonZeroU32;

use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::{
    cart::{Cart, CartLine},
    gateway::{PersistentStore, StoreError},
    ingest::{self, ProductPayload},
    notifications::{Role, User, UserId},
};

/// Store key under which the cart survives reloads.
pub const CART_KEY: &str = "cart";

/// Store key under which the signed-in user survives until logout.
pub const USER_KEY: &str = "session/user";

/// Stored shape of one cart line.
#[derive(Debug, Deserialize, Serialize)]
struct StoredLine {
    product: ProductPayload,
    quantity: u32,
}

/// Stored shape of the whole cart.
#[derive(Debug, Deserialize, Serialize)]
struct StoredCart {
    lines: Vec<StoredLine>,
}

/// Stored shape of the signed-in user.
#[derive(Debug, Deserialize, Serialize)]
struct StoredUser {
    id: String,
    role: String,
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Customer => "customer",
        Role::Vendor => "vendor",
        Role::Admin => "admin",
    }
}

/// A device-scoped storefront session.
#[derive(Debug)]
pub struct Session<S: PersistentStore> {
    store: S,
    cart: Cart<'static>,
    user: Option<User>,
}

impl<S: PersistentStore> Session<S> {
    /// Start a session, restoring the cart and user from the store.
    ///
    /// Absent or corrupt stored state degrades to an empty cart and a
    /// signed-out user; starting a session never fails.
    pub fn start(store: S, currency: &'static Currency) -> Self {
        let cart = store
            .get(CART_KEY)
            .and_then(|raw| restore_cart(&raw, currency))
            .unwrap_or_else(|| Cart::new(currency));

        let user = store.get(USER_KEY).and_then(|raw| restore_user(&raw));

        Self { store, cart, user }
    }

    /// The live cart.
    #[must_use]
    pub fn cart(&self) -> &Cart<'static> {
        &self.cart
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Mutate the cart and persist the result.
    ///
    /// Every cart mutation goes through here so the stored copy can never
    /// lag behind the live one.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the write-back fails; the in-memory
    /// cart keeps the mutation either way.
    pub fn with_cart<T>(
        &mut self,
        mutate: impl FnOnce(&mut Cart<'static>) -> T,
    ) -> Result<T, StoreError> {
        let outcome = mutate(&mut self.cart);

        self.persist_cart()?;

        Ok(outcome)
    }

    /// Sign a user in and persist them.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the write fails.
    pub fn login(&mut self, user: User) -> Result<(), StoreError> {
        let stored = StoredUser {
            id: user.id.as_str().to_owned(),
            role: role_name(user.role).to_owned(),
        };

        let raw = serde_json::to_string(&stored)
            .map_err(|err| StoreError::Write(err.to_string()))?;

        self.store.put(USER_KEY, raw)?;
        self.user = Some(user);

        Ok(())
    }

    /// Sign out: clears the user and the cart, in memory and in the store.
    pub fn logout(&mut self) {
        self.user = None;
        self.cart.clear();
        self.store.remove(USER_KEY);
        self.store.remove(CART_KEY);
    }

    /// Clear the cart after a successfully placed order.
    ///
    /// The signed-in user is untouched.
    pub fn complete_order(&mut self) {
        self.cart.clear();
        self.store.remove(CART_KEY);
    }

    /// Give the store back, ending the session.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    fn persist_cart(&mut self) -> Result<(), StoreError> {
        let stored = StoredCart {
            lines: self
                .cart
                .iter()
                .map(|line| StoredLine {
                    product: ProductPayload::from(line.snapshot()),
                    quantity: line.quantity(),
                })
                .collect(),
        };

        let raw = serde_json::to_string(&stored)
            .map_err(|err| StoreError::Write(err.to_string()))?;

        self.store.put(CART_KEY, raw)
    }
}

fn restore_cart(raw: &str, currency: &'static Currency) -> Option<Cart<'static>> {
    let stored: StoredCart = serde_json::from_str(raw).ok()?;
    let mut cart = Cart::new(currency);

    for line in stored.lines {
        let quantity = NonZeroU32::new(line.quantity)?;
        let product = ingest::product(line.product).ok()?;

        cart.restore_line(CartLine::with_quantity(product, quantity))
            .ok()?;
    }

    Some(cart)
}

fn restore_user(raw: &str) -> Option<User> {
    let stored: StoredUser = serde_json::from_str(raw).ok()?;
    let role = ingest::role(&stored.role).ok()?;

    Some(User {
        id: UserId::from(stored.id),
        role,
    })
}
