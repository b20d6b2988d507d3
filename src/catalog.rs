//! Catalog

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::{
    products::{Product, ProductId, ProductKey, VendorId},
    promos::Promo,
};

/// Filter for storefront browsing and search.
///
/// An empty filter matches everything.
#[derive(Clone, Debug, Default)]
pub struct ProductFilter {
    /// Case-insensitive title substring
    pub query: Option<String>,

    /// Restrict to one vendor
    pub vendor: Option<VendorId>,

    /// Require a tag
    pub tag: Option<String>,
}

impl ProductFilter {
    /// A filter that matches every product.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Whether a product passes the filter.
    #[must_use]
    pub fn matches(&self, product: &Product<'_>) -> bool {
        if let Some(query) = &self.query {
            if !product
                .title
                .to_lowercase()
                .contains(&query.to_lowercase())
            {
                return false;
            }
        }

        if let Some(vendor) = &self.vendor {
            if product.vendor != *vendor {
                return false;
            }
        }

        if let Some(tag) = &self.tag {
            if !product.tags.iter().any(|candidate| candidate == tag) {
                return false;
            }
        }

        true
    }
}

/// Client-local cache of products fetched from the backend.
///
/// Products are interned in a [`SlotMap`] with secondary indexes by backend
/// id and by vendor, so views can hold cheap [`ProductKey`]s instead of
/// cloned records.
#[derive(Debug, Default)]
pub struct Catalog<'a> {
    products: SlotMap<ProductKey, Product<'a>>,
    by_id: FxHashMap<ProductId, ProductKey>,
    by_vendor: FxHashMap<VendorId, Vec<ProductKey>>,
}

impl<'a> Catalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a product, returning its key.
    ///
    /// A product already present (same backend id) is updated in place and
    /// keeps its key; its vendor index entry moves if the listing changed
    /// hands.
    pub fn upsert(&mut self, product: Product<'a>) -> ProductKey {
        if let Some(&key) = self.by_id.get(&product.id) {
            if let Some(slot) = self.products.get_mut(key) {
                if slot.vendor != product.vendor {
                    if let Some(keys) = self.by_vendor.get_mut(&slot.vendor) {
                        keys.retain(|&candidate| candidate != key);
                    }

                    self.by_vendor
                        .entry(product.vendor.clone())
                        .or_default()
                        .push(key);
                }

                *slot = product;
            }

            return key;
        }

        let id = product.id.clone();
        let vendor = product.vendor.clone();
        let key = self.products.insert(product);

        self.by_id.insert(id, key);
        self.by_vendor.entry(vendor).or_default().push(key);

        key
    }

    /// Refresh the catalog from a fetched batch.
    pub fn extend(&mut self, products: impl IntoIterator<Item = Product<'a>>) {
        for product in products {
            self.upsert(product);
        }
    }

    /// Look up a product by backend id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product<'a>> {
        self.by_id
            .get(id)
            .and_then(|&key| self.products.get(key))
    }

    /// Look up a product by its interned key.
    #[must_use]
    pub fn get_key(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// The products of one vendor, in insertion order.
    pub fn by_vendor(&self, vendor: &VendorId) -> impl Iterator<Item = &Product<'a>> {
        self.by_vendor
            .get(vendor)
            .into_iter()
            .flatten()
            .filter_map(|&key| self.products.get(key))
    }

    /// Products passing a filter, in unspecified order.
    #[must_use]
    pub fn search(&self, filter: &ProductFilter) -> Vec<&Product<'a>> {
        self.products
            .values()
            .filter(|product| filter.matches(product))
            .collect()
    }

    /// Products passing a filter, promo-boosted vendors first.
    ///
    /// Within the boosted and unboosted partitions the relative order is
    /// unchanged.
    #[must_use]
    pub fn boosted_first(
        &self,
        filter: &ProductFilter,
        promo: Option<&Promo>,
        now: Timestamp,
    ) -> Vec<&Product<'a>> {
        let mut matches = self.search(filter);

        if let Some(promo) = promo {
            matches.sort_by_key(|product| !promo.boosts(&product.vendor, now));
        }

        matches
    }

    /// Number of products cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
