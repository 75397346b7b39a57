//! Persisted storage keys.
//!
//! Key strings are shared with earlier app releases; renaming one orphans
//! the data already on devices. Value formats follow the same rule: a format
//! change must keep reading what earlier releases wrote (see
//! [`crate::service::score::parse_last_report`]).

pub const USER_DATA: &str = "userData";
pub const SELECTED_DATA: &str = "selectedData";
pub const HOUSEHOLD_AVATARS: &str = "householdAvatars";
pub const USER_AVATAR: &str = "userAvatar";
pub const USER_SCORE: &str = "userScore";
/// Epoch milliseconds; earlier releases wrote JavaScript `Date.toString()`.
pub const LAST_REPORT: &str = "lastReport";

/// Secure-namespace credential keys.
pub const USER_EMAIL: &str = "userEmail";
pub const USER_PASSWORD: &str = "userPwd";

/// Local keys dropped on sign-out. Score, streak timestamp and the personal
/// avatar belong to the device and survive.
pub const SESSION_KEYS: &[&str] = &[USER_DATA, SELECTED_DATA, HOUSEHOLD_AVATARS];

pub const CREDENTIAL_KEYS: &[&str] = &[USER_EMAIL, USER_PASSWORD];
