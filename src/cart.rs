//! Cart

use std::{collections::hash_map::Entry, num::NonZeroU32};

use rustc_hash::{FxHashMap, FxHashSet};
use rusty_money::{Money, MoneyError, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::products::{Product, ProductId, VendorId};

/// Errors related to cart mutation or totals.
#[derive(Debug, Error)]
pub enum CartError {
    /// A mutation referenced a product with no line in the cart.
    #[error("no cart line for product `{0}`")]
    MissingLine(ProductId),

    /// A product's currency differs from the cart currency.
    #[error(
        "product `{product}` is priced in {product_currency}, but the cart holds {cart_currency}"
    )]
    CurrencyMismatch {
        /// Product that failed to add
        product: ProductId,

        /// Currency of the product price
        product_currency: &'static str,

        /// Currency of the cart
        cart_currency: &'static str,
    },

    /// A quantity or total left the representable range.
    #[error("cart arithmetic overflowed on product `{0}`")]
    Overflow(ProductId),

    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// One product entry in a cart: a display snapshot plus a quantity.
///
/// The quantity is a [`NonZeroU32`]; a line that would drop to zero is
/// removed from the cart instead (see [`Cart::decrease`]).
#[derive(Clone, Debug, PartialEq)]
pub struct CartLine<'a> {
    snapshot: Product<'a>,
    quantity: NonZeroU32,
}

impl<'a> CartLine<'a> {
    pub(crate) fn with_quantity(snapshot: Product<'a>, quantity: NonZeroU32) -> Self {
        Self { snapshot, quantity }
    }

    /// The product display data captured when the line was added.
    ///
    /// Later catalog edits never reprice lines already in a cart.
    #[must_use]
    pub fn snapshot(&self) -> &Product<'a> {
        &self.snapshot
    }

    /// Units of the product in the cart.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    /// Price of this line: snapshot price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the multiplication leaves the
    /// representable minor-unit range.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, CartError> {
        let minor = self
            .snapshot
            .price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity.get()))
            .ok_or_else(|| CartError::Overflow(self.snapshot.id.clone()))?;

        Ok(Money::from_minor(minor, self.snapshot.price.currency()))
    }
}

/// Client-held shopping cart: a mapping from product identity to a line.
///
/// Derived figures (subtotal, item count, vendor groups) are recomputed on
/// every read; nothing is cached. Persistence between visits belongs to the
/// caller (see [`Session`](crate::session::Session)).
#[derive(Clone, Debug)]
pub struct Cart<'a> {
    lines: FxHashMap<ProductId, CartLine<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart priced in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: FxHashMap::default(),
            currency,
        }
    }

    /// Add a product to the cart.
    ///
    /// A product not yet in the cart gets a fresh line with quantity 1. A
    /// product already present has its quantity incremented: adding merges
    /// with the existing line, it never resets a count the shopper already
    /// built up.
    ///
    /// Returns the quantity of the affected line.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`]: the product is priced in a
    ///   different currency than the cart.
    /// - [`CartError::Overflow`]: the merged quantity would overflow.
    pub fn add_item(&mut self, product: Product<'a>) -> Result<u32, CartError> {
        let product_currency = product.price.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch {
                product: product.id.clone(),
                product_currency: product_currency.iso_alpha_code,
                cart_currency: self.currency.iso_alpha_code,
            });
        }

        match self.lines.entry(product.id.clone()) {
            Entry::Occupied(mut entry) => {
                let line = entry.get_mut();

                line.quantity = line
                    .quantity
                    .checked_add(1)
                    .ok_or_else(|| CartError::Overflow(product.id))?;

                Ok(line.quantity.get())
            }
            Entry::Vacant(slot) => {
                slot.insert(CartLine::with_quantity(product, NonZeroU32::MIN));

                Ok(1)
            }
        }
    }

    /// Increment the quantity of an existing line.
    ///
    /// No upper bound is enforced here; stock limits are an external
    /// concern.
    ///
    /// Returns the new quantity.
    ///
    /// # Errors
    ///
    /// - [`CartError::MissingLine`]: the product has no line in the cart.
    /// - [`CartError::Overflow`]: the quantity would overflow.
    pub fn increase(&mut self, product: &ProductId) -> Result<u32, CartError> {
        let line = self
            .lines
            .get_mut(product)
            .ok_or_else(|| CartError::MissingLine(product.clone()))?;

        line.quantity = line
            .quantity
            .checked_add(1)
            .ok_or_else(|| CartError::Overflow(product.clone()))?;

        Ok(line.quantity.get())
    }

    /// Decrement the quantity of an existing line.
    ///
    /// A line at quantity 1 is removed from the cart entirely rather than
    /// kept at zero. Returns the new quantity, or `None` when the line was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MissingLine`] if the product has no line in the
    /// cart.
    pub fn decrease(&mut self, product: &ProductId) -> Result<Option<u32>, CartError> {
        let line = self
            .lines
            .get_mut(product)
            .ok_or_else(|| CartError::MissingLine(product.clone()))?;

        match NonZeroU32::new(line.quantity.get() - 1) {
            Some(next) => {
                line.quantity = next;

                Ok(Some(next.get()))
            }
            None => {
                self.lines.remove(product);

                Ok(None)
            }
        }
    }

    /// Remove a line unconditionally. A no-op when the product is absent.
    pub fn remove_item(&mut self, product: &ProductId) {
        self.lines.remove(product);
    }

    /// Set a line's quantity from direct numeric entry.
    ///
    /// Requests below 1 are coerced to 1 rather than rejected: manual entry
    /// of zero, a blank, or a negative number leaves the shopper with a
    /// single unit, never a phantom line.
    ///
    /// Returns the quantity actually stored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MissingLine`] if the product has no line in the
    /// cart.
    pub fn set_quantity(&mut self, product: &ProductId, requested: i64) -> Result<u32, CartError> {
        let line = self
            .lines
            .get_mut(product)
            .ok_or_else(|| CartError::MissingLine(product.clone()))?;

        let clamped = u32::try_from(requested.max(1)).unwrap_or(u32::MAX);
        line.quantity = NonZeroU32::new(clamped).unwrap_or(NonZeroU32::MIN);

        Ok(line.quantity.get())
    }

    /// Drop every line. Used on logout and after a successful order.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Reinsert a persisted line, validating its currency.
    ///
    /// Used when restoring a stored cart at session start; a line priced in
    /// another currency fails the whole restore rather than mixing
    /// currencies.
    pub(crate) fn restore_line(&mut self, line: CartLine<'a>) -> Result<(), CartError> {
        let line_currency = line.snapshot.price.currency();

        if line_currency != self.currency {
            return Err(CartError::CurrencyMismatch {
                product: line.snapshot.id.clone(),
                product_currency: line_currency.iso_alpha_code,
                cart_currency: self.currency.iso_alpha_code,
            });
        }

        self.lines.insert(line.snapshot.id.clone(), line);

        Ok(())
    }

    /// Calculate the subtotal of the cart: the sum of every line total.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] on money arithmetic or overflow errors.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, CartError> {
        self.lines
            .values()
            .try_fold(Money::from_minor(0, self.currency), |acc, line| {
                Ok(acc.add(line.line_total()?)?)
            })
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines
            .values()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Group cart lines by the vendor of their snapshot.
    ///
    /// Checkout uses the group count to detect pickup orders spanning more
    /// than one vendor.
    #[must_use]
    pub fn group_by_vendor(&self) -> FxHashMap<VendorId, SmallVec<[&CartLine<'a>; 4]>> {
        let mut groups: FxHashMap<VendorId, SmallVec<[&CartLine<'a>; 4]>> = FxHashMap::default();

        for line in self.lines.values() {
            groups
                .entry(line.snapshot.vendor.clone())
                .or_default()
                .push(line);
        }

        groups
    }

    /// Number of distinct vendors across the cart.
    #[must_use]
    pub fn vendor_count(&self) -> usize {
        self.lines
            .values()
            .map(|line| &line.snapshot.vendor)
            .collect::<FxHashSet<_>>()
            .len()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product: &ProductId) -> Option<&CartLine<'a>> {
        self.lines.get(product)
    }

    /// Iterate over the lines in the cart. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.values()
    }

    /// Number of lines (not units) in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
