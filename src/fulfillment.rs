//! Fulfillment
//!
//! Status lifecycle for order items and the derived order-level and
//! vendor-level projections. Transitions are pure functions over
//! [`ItemStatus`]; every consumer derives aggregate status through
//! [`order_status`] so vendor boards and admin boards can never drift apart.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Lifecycle status of a single order item.
///
/// `Pending` is the unique initial state. `Delivered` and `Rejected` are
/// terminal: no action transitions out of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    /// Placed, awaiting vendor review
    Pending,

    /// Vendor agreed to fulfil the item
    Accepted,

    /// Being prepared
    Preparing,

    /// Ready for pickup or dispatch
    Ready,

    /// Handed over to the customer (terminal)
    Delivered,

    /// Declined by the vendor or admin (terminal)
    Rejected,
}

/// Vendor/admin action requested against an item.
///
/// Customers never transition items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FulfillmentAction {
    /// Take on a pending item
    Accept,

    /// Decline a pending item
    Reject,

    /// Move an accepted item one step towards delivery
    Advance,
}

/// Errors raised by item status transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The requested action has no edge from the item's current status.
    #[error("cannot {action} an item in status `{from}`")]
    InvalidTransition {
        /// Status the item was in when the action was requested
        from: ItemStatus,

        /// The rejected action
        action: FulfillmentAction,
    },
}

/// Error parsing a status name received from the backend.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown fulfillment status `{0}`")]
pub struct UnknownStatus(pub String);

impl ItemStatus {
    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemStatus::Delivered | ItemStatus::Rejected)
    }

    /// Apply a vendor/admin action, returning the successor status.
    ///
    /// The full edge set:
    ///
    /// | From      | Action  | To        |
    /// |-----------|---------|-----------|
    /// | Pending   | Accept  | Accepted  |
    /// | Pending   | Reject  | Rejected  |
    /// | Accepted  | Advance | Preparing |
    /// | Preparing | Advance | Ready     |
    /// | Ready     | Advance | Delivered |
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTransition`] for every other
    /// `(status, action)` pair; the input status is never silently kept.
    pub fn apply(self, action: FulfillmentAction) -> Result<Self, TransitionError> {
        match (self, action) {
            (ItemStatus::Pending, FulfillmentAction::Accept) => Ok(ItemStatus::Accepted),
            (ItemStatus::Pending, FulfillmentAction::Reject) => Ok(ItemStatus::Rejected),
            (ItemStatus::Accepted, FulfillmentAction::Advance) => Ok(ItemStatus::Preparing),
            (ItemStatus::Preparing, FulfillmentAction::Advance) => Ok(ItemStatus::Ready),
            (ItemStatus::Ready, FulfillmentAction::Advance) => Ok(ItemStatus::Delivered),
            (from, action) => Err(TransitionError::InvalidTransition { from, action }),
        }
    }

    /// Accept a pending item.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTransition`] unless the item is
    /// `Pending`.
    pub fn accept(self) -> Result<Self, TransitionError> {
        self.apply(FulfillmentAction::Accept)
    }

    /// Reject a pending item.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTransition`] unless the item is
    /// `Pending`.
    pub fn reject(self) -> Result<Self, TransitionError> {
        self.apply(FulfillmentAction::Reject)
    }

    /// Move an accepted item one step towards delivery.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::InvalidTransition`] for `Pending` and the
    /// terminal states.
    pub fn advance(self) -> Result<Self, TransitionError> {
        self.apply(FulfillmentAction::Advance)
    }

    /// Wire name of the status, as exchanged with the backend.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Accepted => "accepted",
            ItemStatus::Preparing => "preparing",
            ItemStatus::Ready => "ready",
            ItemStatus::Delivered => "delivered",
            ItemStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ItemStatus::Pending),
            "accepted" => Ok(ItemStatus::Accepted),
            "preparing" => Ok(ItemStatus::Preparing),
            "ready" => Ok(ItemStatus::Ready),
            "delivered" => Ok(ItemStatus::Delivered),
            "rejected" => Ok(ItemStatus::Rejected),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for FulfillmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FulfillmentAction::Accept => "accept",
            FulfillmentAction::Reject => "reject",
            FulfillmentAction::Advance => "advance",
        };

        f.write_str(name)
    }
}

/// Order-level status, derived by folding item statuses.
///
/// Never stored; recomputed on every read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderStatus {
    /// At least one item is still in flight
    Pending,

    /// Every item reached a terminal state, at least one delivered
    Completed,

    /// Every item was rejected
    Rejected,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Rejected => "Rejected",
        };

        f.write_str(name)
    }
}

/// Per-vendor slice of an order's status.
///
/// The fold is identical to [`order_status`]; the all-terminal case is
/// labelled `Accepted` on vendor boards instead of `Completed`. A display
/// nuance, not a distinct state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VendorStatus {
    /// At least one of the vendor's items is still in flight
    Pending,

    /// Every one of the vendor's items reached a terminal state
    Accepted,

    /// Every one of the vendor's items was rejected
    Rejected,
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VendorStatus::Pending => "Pending",
            VendorStatus::Accepted => "Accepted",
            VendorStatus::Rejected => "Rejected",
        };

        f.write_str(name)
    }
}

impl From<OrderStatus> for VendorStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => VendorStatus::Pending,
            OrderStatus::Completed => VendorStatus::Accepted,
            OrderStatus::Rejected => VendorStatus::Rejected,
        }
    }
}

/// Fold item statuses into an order-level status.
///
/// All-rejected is checked before all-terminal, so a fully rejected order
/// reads `Rejected` rather than `Completed`. An empty iterator folds to
/// `Pending`.
pub fn order_status(items: impl IntoIterator<Item = ItemStatus>) -> OrderStatus {
    let mut any = false;
    let mut all_rejected = true;
    let mut all_terminal = true;

    for status in items {
        any = true;
        all_rejected &= status == ItemStatus::Rejected;
        all_terminal &= status.is_terminal();
    }

    if !any {
        return OrderStatus::Pending;
    }

    if all_rejected {
        OrderStatus::Rejected
    } else if all_terminal {
        OrderStatus::Completed
    } else {
        OrderStatus::Pending
    }
}

/// Fold one vendor's item statuses into a vendor-board status.
pub fn vendor_status(items: impl IntoIterator<Item = ItemStatus>) -> VendorStatus {
    order_status(items).into()
}

/// Accept every pending item in place.
///
/// This is the "auto-pass" policy trigger: a batch application of the same
/// accept transition, fired on a timer instead of a click. Items in any
/// other status are untouched. Returns how many items changed.
pub fn auto_pass<'a>(items: impl IntoIterator<Item = &'a mut ItemStatus>) -> usize {
    let mut accepted = 0;

    for status in items {
        if let Ok(next) = status.accept() {
            *status = next;
            accepted += 1;
        }
    }

    accepted
}

/// Advance every in-flight item one step towards delivery.
///
/// The "update all to delivered" bulk action: one `advance` per item per
/// invocation, never looped to terminal in a single call. Pending items are
/// skipped (they need an explicit accept or reject first) and terminal items
/// are skipped silently. Returns how many items changed.
pub fn advance_fulfilled<'a>(items: impl IntoIterator<Item = &'a mut ItemStatus>) -> usize {
    let mut advanced = 0;

    for status in items {
        if matches!(*status, ItemStatus::Pending | ItemStatus::Rejected) {
            continue;
        }

        if let Ok(next) = status.advance() {
            *status = next;
            advanced += 1;
        }
    }

    advanced
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn happy_path_reaches_delivered_step_by_step() -> TestResult {
        let status = ItemStatus::Pending.accept()?;
        assert_eq!(status, ItemStatus::Accepted);

        let status = status.advance()?;
        assert_eq!(status, ItemStatus::Preparing);

        let status = status.advance()?;
        assert_eq!(status, ItemStatus::Ready);

        let status = status.advance()?;
        assert_eq!(status, ItemStatus::Delivered);

        Ok(())
    }

    #[test]
    fn reject_is_only_valid_from_pending() -> TestResult {
        assert_eq!(ItemStatus::Pending.reject()?, ItemStatus::Rejected);

        for status in [
            ItemStatus::Accepted,
            ItemStatus::Preparing,
            ItemStatus::Ready,
            ItemStatus::Delivered,
            ItemStatus::Rejected,
        ] {
            assert_eq!(
                status.reject(),
                Err(TransitionError::InvalidTransition {
                    from: status,
                    action: FulfillmentAction::Reject,
                }),
                "reject from {status} should be invalid"
            );
        }

        Ok(())
    }

    #[test]
    fn advance_from_pending_or_terminal_is_invalid() {
        for status in [
            ItemStatus::Pending,
            ItemStatus::Delivered,
            ItemStatus::Rejected,
        ] {
            let result = status.advance();

            assert_eq!(
                result,
                Err(TransitionError::InvalidTransition {
                    from: status,
                    action: FulfillmentAction::Advance,
                }),
                "advance from {status} should be invalid"
            );
        }
    }

    #[test]
    fn terminal_states_refuse_every_action() {
        for status in [ItemStatus::Delivered, ItemStatus::Rejected] {
            for action in [
                FulfillmentAction::Accept,
                FulfillmentAction::Reject,
                FulfillmentAction::Advance,
            ] {
                assert!(
                    status.apply(action).is_err(),
                    "{action} from {status} should be invalid"
                );
            }
        }
    }

    #[test]
    fn order_status_reports_rejected_before_completed() {
        assert_eq!(
            order_status([ItemStatus::Rejected, ItemStatus::Rejected]),
            OrderStatus::Rejected
        );

        assert_eq!(
            order_status([ItemStatus::Delivered, ItemStatus::Rejected]),
            OrderStatus::Completed
        );

        assert_eq!(
            order_status([ItemStatus::Pending, ItemStatus::Accepted]),
            OrderStatus::Pending
        );
    }

    #[test]
    fn order_status_of_no_items_is_pending() {
        assert_eq!(order_status([]), OrderStatus::Pending);
    }

    #[test]
    fn vendor_status_labels_all_terminal_as_accepted() {
        assert_eq!(
            vendor_status([ItemStatus::Delivered, ItemStatus::Delivered]),
            VendorStatus::Accepted
        );

        assert_eq!(
            vendor_status([ItemStatus::Rejected]),
            VendorStatus::Rejected
        );

        assert_eq!(
            vendor_status([ItemStatus::Preparing, ItemStatus::Delivered]),
            VendorStatus::Pending
        );
    }

    #[test]
    fn auto_pass_accepts_only_pending_items() {
        let mut statuses = [
            ItemStatus::Pending,
            ItemStatus::Preparing,
            ItemStatus::Pending,
            ItemStatus::Rejected,
        ];

        let accepted = auto_pass(statuses.iter_mut());

        assert_eq!(accepted, 2);
        assert_eq!(
            statuses,
            [
                ItemStatus::Accepted,
                ItemStatus::Preparing,
                ItemStatus::Accepted,
                ItemStatus::Rejected,
            ]
        );
    }

    #[test]
    fn advance_fulfilled_moves_each_item_one_step() {
        let mut statuses = [
            ItemStatus::Pending,
            ItemStatus::Accepted,
            ItemStatus::Ready,
            ItemStatus::Delivered,
            ItemStatus::Rejected,
        ];

        let advanced = advance_fulfilled(statuses.iter_mut());

        assert_eq!(advanced, 2);
        assert_eq!(
            statuses,
            [
                ItemStatus::Pending,
                ItemStatus::Preparing,
                ItemStatus::Delivered,
                ItemStatus::Delivered,
                ItemStatus::Rejected,
            ]
        );
    }

    #[test]
    fn advance_fulfilled_twice_drains_to_terminal() {
        let mut statuses = [ItemStatus::Accepted, ItemStatus::Preparing];

        advance_fulfilled(statuses.iter_mut());
        advance_fulfilled(statuses.iter_mut());
        let advanced = advance_fulfilled(statuses.iter_mut());

        assert_eq!(advanced, 1);
        assert_eq!(statuses, [ItemStatus::Delivered, ItemStatus::Delivered]);
    }

    #[test]
    fn status_names_round_trip() -> TestResult {
        for status in [
            ItemStatus::Pending,
            ItemStatus::Accepted,
            ItemStatus::Preparing,
            ItemStatus::Ready,
            ItemStatus::Delivered,
            ItemStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<ItemStatus>()?, status);
        }

        assert!(matches!(
            "shipped".parse::<ItemStatus>(),
            Err(UnknownStatus(name)) if name == "shipped"
        ));

        Ok(())
    }
}
