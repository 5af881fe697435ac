//! Tests for single and batch free/busy resolution.

use chrono::{NaiveDate, NaiveDateTime};
use class_status::{
    friend_statuses, resolve, resolve_many, DayOfWeek, MemoryStore, NewBlock, ScheduleBlock,
    ScheduleStore, SocialGraph, Status, StatusError, UserDirectory, UserId, Verdict,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// 2026-03-16 is a Monday; offset by `day` to reach other weekdays.
fn at(day: u32, time: &str) -> NaiveDateTime {
    let date = NaiveDate::from_ymd_opt(2026, 3, 16 + day).unwrap();
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").unwrap()
}

fn new_block(day: i64, start: &str, end: &str) -> NewBlock {
    NewBlock {
        day_of_week: DayOfWeek::new(day).unwrap(),
        start_time: start.parse().unwrap(),
        end_time: end.parse().unwrap(),
        course_name: None,
    }
}

fn store_with_monday_class() -> (MemoryStore, UserId) {
    let store = MemoryStore::new();
    let user = store.create_user("ana", "ana@example.com").unwrap();
    store
        .add_block(user.id, new_block(0, "10:00", "12:00"))
        .unwrap();
    (store, user.id)
}

/// Wraps a store and fails every lookup for one user.
struct FlakyStore<'a> {
    inner: &'a MemoryStore,
    broken: UserId,
}

impl ScheduleStore for FlakyStore<'_> {
    fn fetch_blocks(
        &self,
        user_id: UserId,
        day: DayOfWeek,
    ) -> class_status::error::Result<Vec<ScheduleBlock>> {
        if user_id == self.broken {
            return Err(StatusError::Store("connection reset".to_string()));
        }
        self.inner.fetch_blocks(user_id, day)
    }
}

// ---------------------------------------------------------------------------
// Concrete scenario
// ---------------------------------------------------------------------------

#[test]
fn monday_class_scenario() {
    let (store, user) = store_with_monday_class();

    assert_eq!(resolve(&store, user, at(0, "11:00:00")).unwrap(), Verdict::IN_CLASS);
    assert_eq!(resolve(&store, user, at(0, "13:00:00")).unwrap(), Verdict::FREE);
    assert_eq!(resolve(&store, user, at(0, "10:00:00")).unwrap(), Verdict::IN_CLASS);
    // Same time on Tuesday: wrong weekday.
    assert_eq!(resolve(&store, user, at(1, "11:00:00")).unwrap(), Verdict::FREE);
}

#[test]
fn both_endpoints_are_inclusive() {
    let (store, user) = store_with_monday_class();

    assert!(!resolve(&store, user, at(0, "10:00:00")).unwrap().is_free);
    assert!(!resolve(&store, user, at(0, "12:00:00")).unwrap().is_free);
    assert!(resolve(&store, user, at(0, "09:59:00")).unwrap().is_free);
    assert!(resolve(&store, user, at(0, "12:01:00")).unwrap().is_free);
}

#[test]
fn seconds_are_ignored() {
    let (store, user) = store_with_monday_class();

    // 12:00:59 is still minute 12:00, which the block covers.
    assert!(!resolve(&store, user, at(0, "12:00:59")).unwrap().is_free);
    assert!(resolve(&store, user, at(0, "09:59:59")).unwrap().is_free);
}

#[test]
fn unknown_user_is_free() {
    let store = MemoryStore::new();
    assert_eq!(resolve(&store, 404, at(2, "10:30:00")).unwrap(), Verdict::FREE);
}

#[test]
fn sunday_blocks_match_sunday_instants() {
    let store = MemoryStore::new();
    let user = store.create_user("ben", "ben@example.com").unwrap();
    store.add_block(user.id, new_block(6, "00:00", "23:59")).unwrap();

    assert!(!resolve(&store, user.id, at(6, "00:00:00")).unwrap().is_free);
    assert!(!resolve(&store, user.id, at(6, "23:59:59")).unwrap().is_free);
    assert!(resolve(&store, user.id, at(5, "12:00:00")).unwrap().is_free);
}

#[test]
fn store_failure_is_not_free() {
    let (store, user) = store_with_monday_class();
    let flaky = FlakyStore { inner: &store, broken: user };

    assert!(matches!(
        resolve(&flaky, user, at(0, "13:00:00")),
        Err(StatusError::Store(_))
    ));
}

#[test]
fn resolve_is_idempotent() {
    let (store, user) = store_with_monday_class();
    let instant = at(0, "11:30:00");
    assert_eq!(
        resolve(&store, user, instant).unwrap(),
        resolve(&store, user, instant).unwrap()
    );
}

// ---------------------------------------------------------------------------
// Batch resolution
// ---------------------------------------------------------------------------

#[test]
fn resolve_many_matches_single_resolution_in_input_order() {
    let (store, busy) = store_with_monday_class();
    let free = store.create_user("cai", "cai@example.com").unwrap().id;
    let instant = at(0, "11:00:00");

    let results = resolve_many(&store, &[free, busy, free], instant);

    let ids: Vec<UserId> = results.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![free, busy, free]);
    for (id, verdict) in &results {
        assert_eq!(verdict.as_ref().unwrap(), &resolve(&store, *id, instant).unwrap());
    }
    assert_eq!(results[0].1, results[2].1);
}

#[test]
fn resolve_many_isolates_failures() {
    let (store, busy) = store_with_monday_class();
    let other = store.create_user("dee", "dee@example.com").unwrap().id;
    let flaky = FlakyStore { inner: &store, broken: busy };

    let results = resolve_many(&flaky, &[busy, other], at(0, "11:00:00"));

    assert!(results[0].1.is_err());
    assert_eq!(results[1].1.as_ref().unwrap(), &Verdict::FREE);
}

#[test]
fn resolve_many_of_nothing_is_empty() {
    let store = MemoryStore::new();
    assert!(resolve_many(&store, &[], at(0, "11:00:00")).is_empty());
}

// ---------------------------------------------------------------------------
// Friend statuses
// ---------------------------------------------------------------------------

#[test]
fn friend_statuses_cover_only_followed_users() {
    let store = MemoryStore::new();
    let me = store.create_user("me", "me@example.com").unwrap();
    let busy = store.create_user("busy", "busy@example.com").unwrap();
    let idle = store.create_user("idle", "idle@example.com").unwrap();
    let stranger = store.create_user("stranger", "s@example.com").unwrap();
    store.add_block(busy.id, new_block(0, "10:00", "12:00")).unwrap();

    for friend in ["busy", "idle"] {
        let request = store.send_request(me.id, friend).unwrap();
        let receiver = store.find_user(friend).unwrap();
        store.accept_request(receiver.id, request.id).unwrap();
    }

    let statuses = friend_statuses(&store, &store, &store, me.id, at(0, "11:00:00")).unwrap();

    assert_eq!(statuses.len(), 2);
    assert!(statuses.iter().all(|s| s.id != stranger.id));
    let busy_row = statuses.iter().find(|s| s.id == busy.id).unwrap();
    assert_eq!(busy_row.username, "busy");
    assert_eq!(busy_row.status, Some(Status::InClass));
    assert_eq!(busy_row.is_free, Some(false));
    let idle_row = statuses.iter().find(|s| s.id == idle.id).unwrap();
    assert_eq!(idle_row.status, Some(Status::Free));
    assert_eq!(idle_row.is_free, Some(true));
}

#[test]
fn friend_statuses_mark_failed_friends() {
    let store = MemoryStore::new();
    let me = store.create_user("me", "me@example.com").unwrap();
    let a = store.create_user("a", "a@example.com").unwrap();
    let b = store.create_user("b", "b@example.com").unwrap();
    for friend in ["a", "b"] {
        let request = store.send_request(me.id, friend).unwrap();
        let receiver = store.find_user(friend).unwrap();
        store.accept_request(receiver.id, request.id).unwrap();
    }
    let flaky = FlakyStore { inner: &store, broken: a.id };

    let statuses = friend_statuses(&flaky, &store, &store, me.id, at(0, "11:00:00")).unwrap();

    let failed = statuses.iter().find(|s| s.id == a.id).unwrap();
    assert_eq!(failed.username, "a");
    assert!(failed.error.as_deref().unwrap().contains("connection reset"));
    assert_eq!(failed.status, None);
    let ok = statuses.iter().find(|s| s.id == b.id).unwrap();
    assert_eq!(ok.status, Some(Status::Free));
    assert_eq!(ok.error, None);

    let json = serde_json::to_value(ok).unwrap();
    assert_eq!(json["status"], "Free");
    assert_eq!(json["is_free"], true);
    assert!(json.get("error").is_none());
}

#[test]
fn friend_statuses_fail_when_graph_is_unreachable() {
    struct DownGraph;
    impl SocialGraph for DownGraph {
        fn list_friends(&self, _: UserId) -> class_status::error::Result<Vec<UserId>> {
            Err(StatusError::Store("graph offline".to_string()))
        }
    }
    struct NoNames;
    impl UserDirectory for NoNames {
        fn username(&self, _: UserId) -> class_status::error::Result<Option<String>> {
            Ok(None)
        }
    }

    let store = MemoryStore::new();
    assert!(friend_statuses(&store, &DownGraph, &NoNames, 1, at(0, "11:00:00")).is_err());
}

#[test]
fn friend_statuses_survive_a_failed_name_lookup() {
    /// Directory that cannot name one user.
    struct PartialDirectory<'a> {
        inner: &'a MemoryStore,
        missing: UserId,
    }
    impl UserDirectory for PartialDirectory<'_> {
        fn username(&self, user_id: UserId) -> class_status::error::Result<Option<String>> {
            if user_id == self.missing {
                return Err(StatusError::Store("directory timeout".to_string()));
            }
            self.inner.username(user_id)
        }
    }

    let store = MemoryStore::new();
    let me = store.create_user("me", "me@example.com").unwrap();
    let a = store.create_user("a", "a@example.com").unwrap();
    let b = store.create_user("b", "b@example.com").unwrap();
    store.add_block(b.id, new_block(0, "10:00", "12:00")).unwrap();
    for friend in ["a", "b"] {
        let request = store.send_request(me.id, friend).unwrap();
        let receiver = store.find_user(friend).unwrap();
        store.accept_request(receiver.id, request.id).unwrap();
    }
    let directory = PartialDirectory { inner: &store, missing: a.id };

    let statuses =
        friend_statuses(&store, &store, &directory, me.id, at(0, "11:00:00")).unwrap();

    assert_eq!(statuses.len(), 2);
    let unnamed = statuses.iter().find(|s| s.id == a.id).unwrap();
    assert_eq!(unnamed.username, "");
    assert_eq!(unnamed.status, None);
    assert_eq!(unnamed.is_free, None);
    assert!(unnamed.error.as_deref().unwrap().contains("directory timeout"));

    let named = statuses.iter().find(|s| s.id == b.id).unwrap();
    assert_eq!(named.username, "b");
    assert_eq!(named.status, Some(Status::InClass));
    assert_eq!(named.error, None);
}
