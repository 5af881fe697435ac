//! In-memory backend implementing every collaborator trait.
//!
//! All tables sit behind one `RwLock`, so each operation sees a consistent view
//! and check-then-insert sequences (unique usernames, pending requests) are
//! atomic. Ids are assigned sequentially from 1 per table.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, StatusError};
use crate::invite::Notification;
use crate::resolver::{ScheduleStore, SocialGraph, UserDirectory};
use crate::schedule::{BlockId, DayOfWeek, NewBlock, ScheduleBlock, UserId};
use crate::social::FriendRequest;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Tables {
    next_user: UserId,
    next_block: BlockId,
    pub(crate) next_request: i64,
    pub(crate) next_notification: i64,
    pub(crate) users: BTreeMap<UserId, User>,
    pub(crate) blocks: BTreeMap<BlockId, ScheduleBlock>,
    /// Directed (follower, followed) edges.
    pub(crate) follows: BTreeSet<(UserId, UserId)>,
    pub(crate) requests: BTreeMap<i64, FriendRequest>,
    pub(crate) notifications: BTreeMap<i64, Notification>,
}

impl Tables {
    pub(crate) fn user(&self, id: UserId) -> Result<&User> {
        self.users
            .get(&id)
            .ok_or_else(|| StatusError::UserNotFound(id.to_string()))
    }

    pub(crate) fn user_by_name(&self, username: &str) -> Option<&User> {
        self.users.values().find(|u| u.username == username)
    }

    pub(crate) fn is_following(&self, follower: UserId, followed: UserId) -> bool {
        self.follows.contains(&(follower, followed))
    }

    pub(crate) fn blocks_on(&self, user_id: UserId, day: DayOfWeek) -> Vec<ScheduleBlock> {
        self.blocks
            .values()
            .filter(|b| b.user_id == user_id && b.day_of_week == day)
            .cloned()
            .collect()
    }

    fn insert_block(&mut self, user_id: UserId, block: NewBlock) -> ScheduleBlock {
        self.next_block += 1;
        let block = block.into_block(self.next_block, user_id);
        self.blocks.insert(block.id, block.clone());
        block
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Register a user. Usernames and emails are unique.
    pub fn create_user(&self, username: &str, email: &str) -> Result<User> {
        let mut t = self.tables.write();
        if t.user_by_name(username).is_some() {
            return Err(StatusError::UsernameTaken(username.to_string()));
        }
        if t.users.values().any(|u| u.email == email) {
            return Err(StatusError::EmailTaken(email.to_string()));
        }
        t.next_user += 1;
        let user = User {
            id: t.next_user,
            username: username.to_string(),
            email: email.to_string(),
            is_active: true,
        };
        t.users.insert(user.id, user.clone());
        info!(user_id = user.id, username, "user created");
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> Result<User> {
        self.tables.read().user(id).cloned()
    }

    pub fn find_user(&self, username: &str) -> Option<User> {
        self.tables.read().user_by_name(username).cloned()
    }

    /// Remove a user together with everything they own or appear in.
    pub fn delete_user(&self, id: UserId) -> Result<()> {
        let mut t = self.tables.write();
        if t.users.remove(&id).is_none() {
            return Err(StatusError::UserNotFound(id.to_string()));
        }
        t.blocks.retain(|_, b| b.user_id != id);
        t.follows.retain(|&(a, b)| a != id && b != id);
        t.requests.retain(|_, r| r.sender_id != id && r.receiver_id != id);
        t.notifications.retain(|_, n| n.sender_id != id && n.receiver_id != id);
        info!(user_id = id, "user deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Schedule
    // -----------------------------------------------------------------------

    pub fn add_block(&self, user_id: UserId, block: NewBlock) -> Result<ScheduleBlock> {
        let mut t = self.tables.write();
        t.user(user_id)?;
        let block = t.insert_block(user_id, block);
        debug!(user_id, block_id = block.id, "schedule block added");
        Ok(block)
    }

    /// Insert a batch of blocks. Nothing is inserted if the owner is unknown.
    pub fn add_blocks(&self, user_id: UserId, blocks: Vec<NewBlock>) -> Result<Vec<ScheduleBlock>> {
        let mut t = self.tables.write();
        t.user(user_id)?;
        let added: Vec<ScheduleBlock> = blocks
            .into_iter()
            .map(|b| t.insert_block(user_id, b))
            .collect();
        debug!(user_id, count = added.len(), "schedule blocks added");
        Ok(added)
    }

    /// Every block a user owns, across all days, in id order.
    pub fn blocks_for_user(&self, user_id: UserId) -> Vec<ScheduleBlock> {
        self.tables
            .read()
            .blocks
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Blocks of `target` as seen by `viewer`: allowed for oneself and for
    /// users the viewer follows.
    pub fn visible_blocks(&self, viewer: UserId, target: UserId) -> Result<Vec<ScheduleBlock>> {
        {
            let t = self.tables.read();
            if viewer != target && !t.is_following(viewer, target) {
                return Err(StatusError::NotFriends(target));
            }
        }
        Ok(self.blocks_for_user(target))
    }

    /// Delete one of the caller's own blocks.
    pub fn delete_block(&self, user_id: UserId, block_id: BlockId) -> Result<()> {
        let mut t = self.tables.write();
        let owned = t
            .blocks
            .get(&block_id)
            .is_some_and(|b| b.user_id == user_id);
        if !owned {
            return Err(StatusError::BlockNotFound(block_id));
        }
        t.blocks.remove(&block_id);
        debug!(user_id, block_id, "schedule block deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Seeding
    // -----------------------------------------------------------------------

    /// Load users, their schedules and mutual friendships.
    ///
    /// Returns username → assigned id. Friendships naming a user missing from
    /// the seed are rejected before anything is inserted. A username or email
    /// that clashes with an existing user still fails part-way through.
    pub fn load_seed(&self, seed: &Seed) -> Result<BTreeMap<String, UserId>> {
        let names: BTreeSet<&str> = seed.users.iter().map(|u| u.username.as_str()).collect();
        if let Some(unknown) = seed
            .friendships
            .iter()
            .flat_map(|(a, b)| [a, b])
            .find(|name| !names.contains(name.as_str()))
        {
            return Err(StatusError::UserNotFound(unknown.clone()));
        }

        let mut ids = BTreeMap::new();
        for entry in &seed.users {
            let user = self.create_user(&entry.username, &entry.email)?;
            self.add_blocks(user.id, entry.schedule.clone())?;
            ids.insert(user.username, user.id);
        }
        let mut t = self.tables.write();
        for (a, b) in &seed.friendships {
            let lookup = |name: &String| {
                ids.get(name)
                    .copied()
                    .ok_or_else(|| StatusError::UserNotFound(name.clone()))
            };
            let (a, b) = (lookup(a)?, lookup(b)?);
            t.follows.insert((a, b));
            t.follows.insert((b, a));
        }
        info!(users = ids.len(), friendships = seed.friendships.len(), "seed loaded");
        Ok(ids)
    }
}

impl ScheduleStore for MemoryStore {
    fn fetch_blocks(&self, user_id: UserId, day: DayOfWeek) -> Result<Vec<ScheduleBlock>> {
        Ok(self.tables.read().blocks_on(user_id, day))
    }
}

impl SocialGraph for MemoryStore {
    fn list_friends(&self, user_id: UserId) -> Result<Vec<UserId>> {
        Ok(self
            .tables
            .read()
            .follows
            .iter()
            .filter(|(follower, _)| *follower == user_id)
            .map(|&(_, followed)| followed)
            .collect())
    }
}

impl UserDirectory for MemoryStore {
    fn username(&self, user_id: UserId) -> Result<Option<String>> {
        Ok(self
            .tables
            .read()
            .users
            .get(&user_id)
            .map(|u| u.username.clone()))
    }
}

/// Initial data for a store, as read from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    /// Pairs of usernames that follow each other.
    #[serde(default)]
    pub friendships: Vec<(String, String)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    /// Bearer token the HTTP layer accepts for this user.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub schedule: Vec<NewBlock>,
}

impl Seed {
    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
