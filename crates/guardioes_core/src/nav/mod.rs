//! Declarative screen routing.
//!
//! # Responsibility
//! - Map route names to screens and localized titles.
//! - Track the back stack and the shared header chrome.
//! - Pick the root view (loader, sign-in, app) from session flags.
//!
//! # Invariants
//! - The stack is never empty; its bottom is always the initial route.
//! - Back navigation pops exactly one level.

use crate::model::session::Session;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod route;
pub mod stack;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    UnknownRoute(String),
}

impl Display for NavError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRoute(name) => write!(f, "unknown route: `{name}`"),
        }
    }
}

impl Error for NavError {}

/// Top-level view chosen before the app stack is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootView {
    /// Startup phase 1 still running.
    Loader,
    SignIn,
    AppStack,
}

impl RootView {
    pub fn for_session(session: &Session) -> Self {
        if session.is_loading() {
            Self::Loader
        } else if session.is_logged_in() {
            Self::AppStack
        } else {
            Self::SignIn
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loader => "loader",
            Self::SignIn => "sign_in",
            Self::AppStack => "app_stack",
        }
    }
}
