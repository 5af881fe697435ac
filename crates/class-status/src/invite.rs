//! Meetup invites to a fixed set of locations.
//!
//! An invite is only delivered when the receiver is free at the moment it is
//! sent and the sender follows the receiver.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, StatusError};
use crate::memory::MemoryStore;
use crate::resolver;
use crate::schedule::{DayOfWeek, TimeOfDay, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "MA cigarette")]
    MaCigarette,
    #[serde(rename = "B cigarette")]
    BCigarette,
    #[serde(rename = "78 cigarette")]
    SeventyEightCigarette,
    #[serde(rename = "FF cigarette")]
    FfCigarette,
    #[serde(rename = "74 cigarette")]
    SeventyFourCigarette,
}

impl Location {
    pub const ALL: [Location; 5] = [
        Location::MaCigarette,
        Location::BCigarette,
        Location::SeventyEightCigarette,
        Location::FfCigarette,
        Location::SeventyFourCigarette,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Location::MaCigarette => "MA cigarette",
            Location::BCigarette => "B cigarette",
            Location::SeventyEightCigarette => "78 cigarette",
            Location::FfCigarette => "FF cigarette",
            Location::SeventyFourCigarette => "74 cigarette",
        }
    }
}

impl FromStr for Location {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self> {
        Location::ALL
            .into_iter()
            .find(|l| l.label() == s)
            .ok_or_else(|| StatusError::InvalidLocation(s.to_string()))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub sender_id: UserId,
    pub sender_username: String,
    pub receiver_id: UserId,
    pub location: Location,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

impl MemoryStore {
    /// Invite `receiver` to meet at `location`, judged free-or-busy at `instant`.
    ///
    /// Membership, friendship and the free check run under the same write lock
    /// as the insert, so a concurrent `delete_user` either wins outright or
    /// removes the new notification along with the rest of the user's rows.
    pub fn send_invite(
        &self,
        sender: UserId,
        receiver: UserId,
        location: Location,
        instant: NaiveDateTime,
    ) -> Result<Notification> {
        let mut t = self.tables.write();
        t.user(receiver)?;
        if !t.is_following(sender, receiver) {
            return Err(StatusError::NotFriends(receiver));
        }
        let sender_username = t.user(sender)?.username.clone();

        let blocks = t.blocks_on(receiver, DayOfWeek::of(instant));
        if !resolver::verdict_for(&blocks, TimeOfDay::of(instant)).is_free {
            return Err(StatusError::ReceiverInClass(receiver));
        }

        t.next_notification += 1;
        let notification = Notification {
            id: t.next_notification,
            sender_id: sender,
            sender_username,
            receiver_id: receiver,
            location,
            timestamp: Utc::now(),
            is_read: false,
        };
        t.notifications.insert(notification.id, notification.clone());
        info!(sender, receiver, %location, "invite sent");
        Ok(notification)
    }

    pub fn unread_notifications(&self, user: UserId) -> Vec<Notification> {
        self.tables
            .read()
            .notifications
            .values()
            .filter(|n| n.receiver_id == user && !n.is_read)
            .cloned()
            .collect()
    }

    /// Mark one of `user`'s notifications as read.
    pub fn mark_read(&self, user: UserId, notification_id: i64) -> Result<()> {
        let mut t = self.tables.write();
        match t.notifications.get_mut(&notification_id) {
            Some(n) if n.receiver_id == user => {
                n.is_read = true;
                Ok(())
            }
            _ => Err(StatusError::NotificationNotFound(notification_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_parse_from_exact_labels() {
        for location in Location::ALL {
            assert_eq!(location.label().parse::<Location>().unwrap(), location);
            assert_eq!(
                serde_json::to_value(location).unwrap(),
                serde_json::Value::from(location.label())
            );
        }
        assert!("ma cigarette".parse::<Location>().is_err());
        assert!("Library".parse::<Location>().is_err());
    }
}
