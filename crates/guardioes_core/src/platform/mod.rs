//! Ports to services outside the core.
//!
//! # Responsibility
//! - Define contracts for remote auth, push tagging, device location and time.
//! - Keep device and network SDKs out of session logic.
//!
//! # Invariants
//! - Port errors are data; implementations must not panic.
//! - Ports never receive more user data than their call needs.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod auth;
pub mod clock;
pub mod location;
pub mod push;

/// Failure reported by a platform port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// Request never produced a response (offline, DNS, TLS, timeout).
    Transport(String),
    /// Response arrived but could not be decoded.
    InvalidResponse(String),
    /// Device SDK refused or failed the call.
    Device(String),
}

impl Display for PlatformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport failure: {message}"),
            Self::InvalidResponse(message) => write!(f, "invalid response: {message}"),
            Self::Device(message) => write!(f, "device failure: {message}"),
        }
    }
}

impl Error for PlatformError {}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Mobile operating system the shell runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Android,
    Ios,
}

impl Os {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "android" => Some(Self::Android),
            "ios" => Some(Self::Ios),
            _ => None,
        }
    }

    /// Whether location access needs an explicit runtime permission request
    /// before asking for a fix.
    pub fn requires_location_prompt(self) -> bool {
        matches!(self, Self::Android)
    }
}

/// Host platform identity used for push tags and permission flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub os: Os,
    /// OS version as reported by the shell (API level on Android).
    pub version: String,
}

impl PlatformInfo {
    pub fn new(os: Os, version: impl Into<String>) -> Self {
        Self {
            os,
            version: version.into(),
        }
    }
}
