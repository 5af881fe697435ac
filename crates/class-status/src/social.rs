//! Friend requests and the follow graph they build.
//!
//! Accepting a request makes the two users follow each other. "Friends" of a
//! user are exactly the users they follow; no shortcut treats everyone as a
//! friend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, StatusError};
use crate::memory::{MemoryStore, Tables};
use crate::schedule::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: i64,
    pub sender_id: UserId,
    pub sender_username: String,
    pub receiver_id: UserId,
    pub receiver_username: String,
    pub status: RequestStatus,
    pub timestamp: DateTime<Utc>,
}

impl MemoryStore {
    /// Send a friend request to the user called `receiver_username`.
    pub fn send_request(&self, sender: UserId, receiver_username: &str) -> Result<FriendRequest> {
        let mut t = self.tables.write();
        let sender_name = t.user(sender)?.username.clone();
        let receiver = t
            .user_by_name(receiver_username)
            .map(|u| u.id)
            .ok_or_else(|| StatusError::UserNotFound(receiver_username.to_string()))?;

        if receiver == sender {
            return Err(StatusError::SelfRequest);
        }
        if t.is_following(sender, receiver) {
            return Err(StatusError::AlreadyFriends(receiver_username.to_string()));
        }
        let duplicate = t.requests.values().any(|r| {
            r.sender_id == sender && r.receiver_id == receiver && r.status == RequestStatus::Pending
        });
        if duplicate {
            return Err(StatusError::DuplicateRequest(receiver_username.to_string()));
        }

        t.next_request += 1;
        let request = FriendRequest {
            id: t.next_request,
            sender_id: sender,
            sender_username: sender_name,
            receiver_id: receiver,
            receiver_username: receiver_username.to_string(),
            status: RequestStatus::Pending,
            timestamp: Utc::now(),
        };
        t.requests.insert(request.id, request.clone());
        info!(request_id = request.id, sender, receiver, "friend request sent");
        Ok(request)
    }

    /// Pending requests addressed to `user`.
    pub fn pending_requests(&self, user: UserId) -> Vec<FriendRequest> {
        self.tables
            .read()
            .requests
            .values()
            .filter(|r| r.receiver_id == user && r.status == RequestStatus::Pending)
            .cloned()
            .collect()
    }

    /// Accept a request addressed to `user`, making both sides follow each other.
    pub fn accept_request(&self, user: UserId, request_id: i64) -> Result<FriendRequest> {
        let mut t = self.tables.write();
        let accepted = settle(&mut t, user, request_id, RequestStatus::Accepted)?;
        t.follows.insert((accepted.sender_id, accepted.receiver_id));
        t.follows.insert((accepted.receiver_id, accepted.sender_id));
        info!(request_id, "friend request accepted");
        Ok(accepted)
    }

    pub fn reject_request(&self, user: UserId, request_id: i64) -> Result<FriendRequest> {
        let rejected = settle(&mut self.tables.write(), user, request_id, RequestStatus::Rejected)?;
        info!(request_id, "friend request rejected");
        Ok(rejected)
    }
}

/// Record the outcome of a request. Only its receiver may settle it.
fn settle(
    t: &mut Tables,
    user: UserId,
    request_id: i64,
    outcome: RequestStatus,
) -> Result<FriendRequest> {
    match t.requests.get_mut(&request_id) {
        Some(r) if r.receiver_id == user => {
            r.status = outcome;
            Ok(r.clone())
        }
        _ => Err(StatusError::RequestNotFound(request_id)),
    }
}
