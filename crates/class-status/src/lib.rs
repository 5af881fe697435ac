//! # class-status
//!
//! Who among my friends is free right now, and who is in class?
//!
//! Users keep a weekly timetable of class blocks. Given a moment in local wall-clock
//! time, the resolver decides whether a user is "Free" or "In Class", singly or
//! across a friend list. Around that core sit the pieces a small social
//! scheduling service needs: friend requests, meetup invites, and validation of
//! schedule rows produced by an external image-extraction service.
//!
//! ## Modules
//!
//! - [`schedule`]: `DayOfWeek`, `TimeOfDay`, `ScheduleBlock`
//! - [`resolver`]: `resolve`, `resolve_many`, `friend_statuses` and the collaborator traits
//! - [`clock`]: wall-clock sources
//! - [`memory`]: in-memory backend implementing every collaborator
//! - [`social`]: friend requests and the follow graph
//! - [`invite`]: meetup locations and notifications
//! - [`extract`]: parsing extraction output into blocks
//! - [`error`]: Error types

pub mod clock;
pub mod error;
pub mod extract;
pub mod invite;
pub mod memory;
pub mod resolver;
pub mod schedule;
pub mod social;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::StatusError;
pub use extract::{import_image, parse_rows, ScheduleExtractor};
pub use invite::{Location, Notification};
pub use memory::{MemoryStore, Seed, SeedUser, User};
pub use resolver::{
    friend_statuses, resolve, resolve_many, FriendStatus, ScheduleStore, SocialGraph, Status,
    UserDirectory, Verdict,
};
pub use schedule::{BlockId, DayOfWeek, NewBlock, ScheduleBlock, TimeOfDay, UserId};
pub use social::{FriendRequest, RequestStatus};
