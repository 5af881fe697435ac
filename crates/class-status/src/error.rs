//! Error types for class-status operations.

use thiserror::Error;

use crate::schedule::{BlockId, UserId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("Invalid time of day: {0} (expected zero-padded 24-hour HH:MM)")]
    InvalidTime(String),

    #[error("Invalid day of week: {0} (expected 0=Monday through 6=Sunday)")]
    InvalidDay(i64),

    #[error("Invalid schedule row {index}: {message}")]
    InvalidRow { index: usize, message: String },

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// The backing store could not answer. Never treated as "free".
    #[error("Schedule store unavailable: {0}")]
    Store(String),

    #[error("Schedule extraction failed: {0}")]
    Extraction(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error("Email already exists: {0}")]
    EmailTaken(String),

    #[error("Schedule block {0} not found")]
    BlockNotFound(BlockId),

    #[error("You cannot add yourself")]
    SelfRequest,

    #[error("Already friends with {0}")]
    AlreadyFriends(String),

    #[error("Request already sent to {0}")]
    DuplicateRequest(String),

    #[error("Friend request {0} not found")]
    RequestNotFound(i64),

    #[error("User {0} is not in your friend list")]
    NotFriends(UserId),

    #[error("User {0} is currently in class")]
    ReceiverInClass(UserId),

    #[error("Notification {0} not found")]
    NotificationNotFound(i64),
}

pub type Result<T> = std::result::Result<T, StatusError>;
