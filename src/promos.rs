//! Promos

use jiff::{SignedDuration, Timestamp};
use rustc_hash::FxHashSet;

use crate::products::VendorId;

/// An admin-activated storefront boost for a set of vendors.
///
/// While active, the listed vendors' products are ordered first on the
/// storefront (see [`Catalog::boosted_first`](crate::catalog::Catalog::boosted_first)).
/// Promos carry no discount; they only affect visibility.
#[derive(Clone, Debug)]
pub struct Promo {
    vendors: FxHashSet<VendorId>,
    activated_at: Timestamp,
    duration: SignedDuration,
}

impl Promo {
    /// Activate a promo for the given vendors.
    #[must_use]
    pub fn activate(
        vendors: impl IntoIterator<Item = VendorId>,
        activated_at: Timestamp,
        duration: SignedDuration,
    ) -> Self {
        Self {
            vendors: vendors.into_iter().collect(),
            activated_at,
            duration,
        }
    }

    /// When the promo stops boosting.
    #[must_use]
    pub fn expires_at(&self) -> Timestamp {
        self.activated_at.saturating_add(self.duration)
    }

    /// Whether the promo is still running at `now`.
    #[must_use]
    pub fn is_active(&self, now: Timestamp) -> bool {
        now >= self.activated_at && now < self.expires_at()
    }

    /// Whether the promo currently boosts a vendor.
    #[must_use]
    pub fn boosts(&self, vendor: &VendorId, now: Timestamp) -> bool {
        self.is_active(now) && self.vendors.contains(vendor)
    }

    /// Time left before expiry, floored at zero.
    #[must_use]
    pub fn remaining(&self, now: Timestamp) -> SignedDuration {
        let left = now.duration_until(self.expires_at());

        if left.is_negative() {
            SignedDuration::ZERO
        } else {
            left
        }
    }

    /// The boosted vendors.
    pub fn vendors(&self) -> impl Iterator<Item = &VendorId> {
        self.vendors.iter()
    }
}

/// Admin-side holder for the current promo activation.
///
/// The marketplace runs at most one activation at a time; activating again
/// replaces the previous one.
#[derive(Debug, Default)]
pub struct PromoBoard {
    current: Option<Promo>,
}

impl PromoBoard {
    /// Create a board with no active promo.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate a promo, replacing any previous activation.
    pub fn activate(
        &mut self,
        vendors: impl IntoIterator<Item = VendorId>,
        activated_at: Timestamp,
        duration: SignedDuration,
    ) -> &Promo {
        self.current
            .insert(Promo::activate(vendors, activated_at, duration))
    }

    /// Drop the current activation, if any.
    pub fn deactivate(&mut self) {
        self.current = None;
    }

    /// The current activation, whether or not it is still running.
    #[must_use]
    pub fn current(&self) -> Option<&Promo> {
        self.current.as_ref()
    }

    /// The current activation, only while it is still running.
    #[must_use]
    pub fn active(&self, now: Timestamp) -> Option<&Promo> {
        self.current
            .as_ref()
            .filter(|promo| promo.is_active(now))
    }

    /// Whether a vendor is boosted right now.
    #[must_use]
    pub fn boosts(&self, vendor: &VendorId, now: Timestamp) -> bool {
        self.active(now)
            .is_some_and(|promo| promo.boosts(vendor, now))
    }
}
