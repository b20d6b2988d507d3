//! Notifications

use jiff::Timestamp;
use rustc_hash::FxHashSet;

use crate::ids::string_id;

string_id! {
    /// Opaque backend-assigned user identifier.
    pub struct UserId;
}

string_id! {
    /// Opaque backend-assigned notification identifier.
    pub struct NotificationId;
}

/// Role a signed-in user acts under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Shops the storefront
    Customer,

    /// Manages a catalog and fulfils orders
    Vendor,

    /// Moderates the marketplace
    Admin,
}

/// Who a notification is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Audience {
    /// All vendors
    Vendor,

    /// All customers
    Customer,

    /// Everyone
    Both,
}

/// Whether a notification audience reaches a user role.
#[must_use]
pub fn audience_matches(target: Audience, role: Role) -> bool {
    match target {
        Audience::Both => true,
        Audience::Vendor => role == Role::Vendor,
        Audience::Customer => role == Role::Customer,
    }
}

/// A signed-in user, as the notification layer sees one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// Backend identifier
    pub id: UserId,

    /// Role the user acts under
    pub role: Role,
}

/// An admin-published announcement with per-user read tracking.
#[derive(Clone, Debug)]
pub struct Notification {
    /// Backend identifier
    pub id: NotificationId,

    /// Announcement body
    pub message: String,

    /// Who the announcement is addressed to
    pub target: Audience,

    /// Publication time
    pub created_at: Timestamp,

    read_by: FxHashSet<UserId>,
}

impl Notification {
    /// Create an unread notification.
    #[must_use]
    pub fn new(
        id: NotificationId,
        message: impl Into<String>,
        target: Audience,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            message: message.into(),
            target,
            created_at,
            read_by: FxHashSet::default(),
        }
    }

    /// Restore a notification with an existing read set.
    #[must_use]
    pub fn with_read_by(
        id: NotificationId,
        message: impl Into<String>,
        target: Audience,
        created_at: Timestamp,
        read_by: FxHashSet<UserId>,
    ) -> Self {
        Self {
            id,
            message: message.into(),
            target,
            created_at,
            read_by,
        }
    }

    /// Record that a user has seen this notification.
    ///
    /// Idempotent; returns `true` only when the user was newly added.
    pub fn mark_read(&mut self, user: &UserId) -> bool {
        self.read_by.insert(user.clone())
    }

    /// Whether the user has already seen this notification.
    #[must_use]
    pub fn is_read_by(&self, user: &UserId) -> bool {
        self.read_by.contains(user)
    }

    /// Whether this notification counts as unread for the user: the
    /// audience reaches their role and they have not read it yet.
    #[must_use]
    pub fn is_unread_for(&self, user: &User) -> bool {
        audience_matches(self.target, user.role) && !self.is_read_by(&user.id)
    }
}

/// Count the notifications a user still has to see.
pub fn unread_count_for<'a>(
    notifications: impl IntoIterator<Item = &'a Notification>,
    user: &User,
) -> usize {
    notifications
        .into_iter()
        .filter(|notification| notification.is_unread_for(user))
        .count()
}

/// A push event from the notification channel.
#[derive(Clone, Debug)]
pub enum FeedEvent {
    /// A newly published notification
    New(Notification),

    /// A notification withdrawn by the admin
    Deleted(NotificationId),
}

/// Client-local notification list, newest first.
///
/// The two reducers ([`Feed::push_latest`], [`Feed::remove`]) are all any
/// delivery transport needs, whether events arrive over a socket or a poll.
#[derive(Debug, Default)]
pub struct Feed {
    entries: Vec<Notification>,
}

impl Feed {
    /// Create an empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a feed from an already-fetched list, assumed newest first.
    #[must_use]
    pub fn from_entries(entries: Vec<Notification>) -> Self {
        Self { entries }
    }

    /// Insert a notification at the head of the feed.
    ///
    /// A redelivered notification (same id already present) is dropped;
    /// returns `true` only when the feed changed.
    pub fn push_latest(&mut self, notification: Notification) -> bool {
        if self
            .entries
            .iter()
            .any(|existing| existing.id == notification.id)
        {
            return false;
        }

        self.entries.insert(0, notification);

        true
    }

    /// Remove a notification by id, returning it when present.
    pub fn remove(&mut self, id: &NotificationId) -> Option<Notification> {
        let index = self.entries.iter().position(|entry| entry.id == *id)?;

        Some(self.entries.remove(index))
    }

    /// Apply a push event. Returns `true` when the feed changed.
    pub fn apply(&mut self, event: FeedEvent) -> bool {
        match event {
            FeedEvent::New(notification) => self.push_latest(notification),
            FeedEvent::Deleted(id) => self.remove(&id).is_some(),
        }
    }

    /// Mark one entry read for a user. Returns `true` when newly marked.
    pub fn mark_read(&mut self, id: &NotificationId, user: &UserId) -> bool {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == *id)
            .is_some_and(|entry| entry.mark_read(user))
    }

    /// Unread count for a user across the feed.
    #[must_use]
    pub fn unread_count_for(&self, user: &User) -> usize {
        unread_count_for(&self.entries, user)
    }

    /// Iterate newest-first over the feed.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Number of notifications held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the feed is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
