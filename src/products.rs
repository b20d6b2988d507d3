//! Products

use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;

use crate::ids::string_id;

new_key_type! {
    /// Key for products interned in a [`Catalog`](crate::catalog::Catalog).
    pub struct ProductKey;
}

string_id! {
    /// Opaque backend-assigned product identifier.
    pub struct ProductId;
}

string_id! {
    /// Opaque backend-assigned vendor identifier.
    pub struct VendorId;
}

/// Display snapshot of a product as the storefront lists it.
#[derive(Clone, Debug, PartialEq)]
pub struct Product<'a> {
    /// Backend identifier, unique across the marketplace
    pub id: ProductId,

    /// Vendor that owns the listing
    pub vendor: VendorId,

    /// Display title
    pub title: String,

    /// Current selling price
    pub price: Money<'a, Currency>,

    /// Pre-sale price, present while the listing is discounted
    pub compare_at_price: Option<Money<'a, Currency>>,

    /// Hosted image reference
    pub image: Option<String>,

    /// Search tags
    pub tags: Vec<String>,
}

impl Product<'_> {
    /// Whether the listing is currently priced below its compare-at price.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.compare_at_price
            .is_some_and(|was| was.to_minor_units() > self.price.to_minor_units())
    }
}
