//! Session and navigation core for the Guardiões da Saúde mobile app.
//! The mobile shell renders; this crate owns session state and routing rules.

pub mod config;
pub mod db;
pub mod i18n;
pub mod logging;
pub mod model;
pub mod nav;
pub mod platform;
pub mod service;
pub mod store;

pub use config::{CoreConfig, SessionConfig};
pub use i18n::Translator;
pub use logging::{init_logging, logging_status, LogLevel, LoggingError};
pub use model::profile::{AuthenticatedUser, Household, LooseId, Profile, UserRecord};
pub use model::session::{CurrentUserInfo, Location, Selection, Session};
pub use nav::route::{resolve, ResolvedScreen, RouteName, APP_STACK, INITIAL_ROUTE};
pub use nav::stack::{HeaderChrome, StackNavigator};
pub use nav::{NavError, RootView};
pub use platform::auth::{AuthClient, AuthRequest, AuthResponse, HttpAuthClient};
pub use platform::clock::{Clock, SystemClock};
pub use platform::location::{
    Coordinates, LocationProvider, PermissionPrompt, PermissionStatus, PositionError,
    PositionOptions,
};
pub use platform::push::{PushTagger, PushTags};
pub use platform::{Os, PlatformError, PlatformInfo};
pub use service::score::StreakStep;
pub use service::session_service::{
    ScoreUpdate, SessionError, SessionPorts, SessionResult, SessionService, SignInOutcome,
};
pub use store::{KeyValueStore, KvNamespace, MemoryKvStore, SqliteKvStore, StoreError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
