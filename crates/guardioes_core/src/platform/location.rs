//! Device location port.

use crate::platform::PlatformResult;

/// Fixed timeout for one position request.
pub const POSITION_TIMEOUT_MS: u64 = 50_000;

/// Runtime permission answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Denied and the OS will not ask again.
    Blocked,
}

impl PermissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Blocked => "never_ask_again",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "granted" => Some(Self::Granted),
            "denied" => Some(Self::Denied),
            "never_ask_again" | "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// Localized rationale dialog shown with the permission request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionPrompt {
    pub title: String,
    pub message: String,
    pub button_negative: String,
    pub button_positive: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout_ms: u64,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: POSITION_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Position failure carrying the platform error code (never `0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionError {
    pub code: i32,
}

pub trait LocationProvider: Send + Sync {
    fn request_permission(&self, prompt: &PermissionPrompt) -> PlatformResult<PermissionStatus>;
    fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, PositionError>;
}
