//! Free/busy resolution for a single moment in time.
//!
//! A user is "In Class" at an instant when any of their blocks for that weekday
//! covers the instant's minute, endpoints inclusive. Everything else is "Free",
//! including users the store knows nothing about.
//!
//! The resolver holds no state and takes no locks. It performs exactly one store
//! read per user and then compares minute-of-day integers in memory.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, StatusError};
use crate::schedule::{DayOfWeek, ScheduleBlock, TimeOfDay, UserId};

/// Source of persisted schedule blocks.
pub trait ScheduleStore: Send + Sync {
    /// All blocks for `user_id` on `day`, in any order. An unknown user yields
    /// an empty list, not an error.
    fn fetch_blocks(&self, user_id: UserId, day: DayOfWeek) -> Result<Vec<ScheduleBlock>>;
}

/// Source of friend membership.
pub trait SocialGraph: Send + Sync {
    /// The users `user_id` follows.
    fn list_friends(&self, user_id: UserId) -> Result<Vec<UserId>>;
}

/// Lookup of display names for presenting batch results.
pub trait UserDirectory: Send + Sync {
    fn username(&self, user_id: UserId) -> Result<Option<String>>;
}

/// Outward-facing label for a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "Free")]
    Free,
    #[serde(rename = "In Class")]
    InClass,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Free => "Free",
            Status::InClass => "In Class",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Free/busy result of resolving one user at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_free: bool,
}

impl Verdict {
    pub const FREE: Verdict = Verdict { is_free: true };
    pub const IN_CLASS: Verdict = Verdict { is_free: false };

    pub fn status(self) -> Status {
        if self.is_free {
            Status::Free
        } else {
            Status::InClass
        }
    }
}

/// Decide a verdict from one day's blocks, without touching a store.
pub fn verdict_for(blocks: &[ScheduleBlock], time: TimeOfDay) -> Verdict {
    if blocks.iter().any(|block| block.covers(time)) {
        Verdict::IN_CLASS
    } else {
        Verdict::FREE
    }
}

/// Resolve whether `user_id` is free at `instant`.
///
/// # Errors
/// Propagates the store's error unchanged. A failed lookup is never reported as
/// "free".
pub fn resolve(
    store: &dyn ScheduleStore,
    user_id: UserId,
    instant: NaiveDateTime,
) -> Result<Verdict> {
    let day = DayOfWeek::of(instant);
    let time = TimeOfDay::of(instant);
    let blocks = store.fetch_blocks(user_id, day)?;
    let verdict = verdict_for(&blocks, time);
    debug!(
        user_id,
        %day,
        %time,
        blocks = blocks.len(),
        status = %verdict.status(),
        "resolved availability"
    );
    Ok(verdict)
}

/// Resolve each user independently at the same instant.
///
/// Returns one entry per input id, in input order. Duplicate ids produce
/// duplicate entries. A lookup failure is recorded against that id alone.
pub fn resolve_many(
    store: &dyn ScheduleStore,
    user_ids: &[UserId],
    instant: NaiveDateTime,
) -> Vec<(UserId, Result<Verdict>)> {
    user_ids
        .iter()
        .map(|&user_id| {
            let verdict = resolve(store, user_id, instant);
            if let Err(e) = &verdict {
                warn!(user_id, error = %e, "availability lookup failed");
            }
            (user_id, verdict)
        })
        .collect()
}

/// One friend's row in a "status of all my friends" answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendStatus {
    pub id: UserId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_free: Option<bool>,
    /// Set instead of `status`/`is_free` when this friend could not be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FriendStatus {
    fn resolved(id: UserId, username: String, verdict: Verdict) -> Self {
        Self {
            id,
            username,
            status: Some(verdict.status()),
            is_free: Some(verdict.is_free),
            error: None,
        }
    }

    fn failed(id: UserId, username: String, error: &StatusError) -> Self {
        Self {
            id,
            username,
            status: None,
            is_free: None,
            error: Some(error.to_string()),
        }
    }
}

/// Resolve every user that `user_id` follows.
///
/// # Errors
/// Fails only when the friend list itself cannot be read. Per-friend failures
/// (schedule or username lookup) are reported in that friend's `error` field.
pub fn friend_statuses(
    store: &dyn ScheduleStore,
    graph: &dyn SocialGraph,
    directory: &dyn UserDirectory,
    user_id: UserId,
    instant: NaiveDateTime,
) -> Result<Vec<FriendStatus>> {
    let friends = graph.list_friends(user_id)?;

    let statuses = resolve_many(store, &friends, instant)
        .into_iter()
        .map(|(friend_id, verdict)| {
            let username = match directory.username(friend_id) {
                Ok(name) => name.unwrap_or_default(),
                Err(e) => return FriendStatus::failed(friend_id, String::new(), &e),
            };
            match verdict {
                Ok(v) => FriendStatus::resolved(friend_id, username, v),
                Err(e) => FriendStatus::failed(friend_id, username, &e),
            }
        })
        .collect();

    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(start: &str, end: &str) -> ScheduleBlock {
        ScheduleBlock {
            id: 1,
            user_id: 1,
            day_of_week: DayOfWeek::MONDAY,
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            course_name: None,
        }
    }

    #[test]
    fn no_blocks_is_free() {
        assert_eq!(verdict_for(&[], "12:00".parse().unwrap()), Verdict::FREE);
    }

    #[test]
    fn overlapping_blocks_any_match_is_busy() {
        let blocks = [block("09:00", "10:00"), block("09:30", "11:00")];
        assert_eq!(verdict_for(&blocks, "10:30".parse().unwrap()), Verdict::IN_CLASS);
        assert_eq!(verdict_for(&blocks, "11:01".parse().unwrap()), Verdict::FREE);
    }

    #[test]
    fn inverted_block_never_matches() {
        let blocks = [block("23:00", "01:00")];
        for t in ["23:30", "00:30", "12:00", "23:00", "01:00"] {
            assert_eq!(verdict_for(&blocks, t.parse().unwrap()), Verdict::FREE, "{t}");
        }
    }

    #[test]
    fn status_labels_are_fixed() {
        assert_eq!(serde_json::to_value(Status::Free).unwrap(), "Free");
        assert_eq!(serde_json::to_value(Status::InClass).unwrap(), "In Class");
        assert_eq!(Verdict::IN_CLASS.status().to_string(), "In Class");
    }
}
