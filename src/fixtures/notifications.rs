//! Notification Fixtures

use jiff::Timestamp;
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    ingest,
    notifications::{Notification, NotificationId, UserId},
};

/// Wrapper for notifications in YAML
#[derive(Debug, Deserialize)]
pub struct NotificationsFixture {
    /// Notifications in the fixture set, newest first
    pub notifications: Vec<NotificationFixture>,
}

/// Notification Fixture
#[derive(Debug, Deserialize)]
pub struct NotificationFixture {
    /// Backend id
    pub id: String,

    /// Announcement body
    pub message: String,

    /// `vendor`, `customer` or `both`
    pub target: String,

    /// RFC 3339 publication time
    pub created_at: String,

    /// Users who have already read the notification
    #[serde(default)]
    pub read_by: Vec<String>,
}

impl TryFrom<NotificationFixture> for Notification {
    type Error = FixtureError;

    fn try_from(fixture: NotificationFixture) -> Result<Self, Self::Error> {
        let target = ingest::audience(&fixture.target)?;

        let created_at: Timestamp = fixture
            .created_at
            .parse()
            .map_err(|_err| FixtureError::InvalidTimestamp(fixture.created_at.clone()))?;

        Ok(Notification::with_read_by(
            NotificationId::from(fixture.id),
            fixture.message,
            target,
            created_at,
            fixture.read_by.into_iter().map(UserId::from).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::notifications::Audience;

    use super::*;

    #[test]
    fn fixture_converts_with_read_set() -> Result<(), FixtureError> {
        let fixture = NotificationFixture {
            id: "n-1".to_owned(),
            message: "Market closes early".to_owned(),
            target: "vendor".to_owned(),
            created_at: "2024-03-01T08:00:00Z".to_owned(),
            read_by: vec!["u-1".to_owned()],
        };

        let notification = Notification::try_from(fixture)?;

        assert_eq!(notification.target, Audience::Vendor);
        assert!(notification.is_read_by(&UserId::from("u-1")));

        Ok(())
    }

    #[test]
    fn bad_timestamp_is_rejected() {
        let fixture = NotificationFixture {
            id: "n-1".to_owned(),
            message: "broken".to_owned(),
            target: "both".to_owned(),
            created_at: "yesterday".to_owned(),
            read_by: vec![],
        };

        let result = Notification::try_from(fixture);

        assert!(matches!(result, Err(FixtureError::InvalidTimestamp(_))));
    }
}
