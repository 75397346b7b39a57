//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve storage path, API base URL, auth timeout and locale from the
//!   environment.
//! - Carry per-session platform settings supplied by the mobile shell.

use crate::i18n::DEFAULT_LOCALE;
use crate::platform::location::PositionOptions;
use crate::platform::PlatformInfo;
use log::warn;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "GUARDIOES_DB_PATH";
pub const ENV_API_URL: &str = "GUARDIOES_API_URL";
pub const ENV_LOCALE: &str = "GUARDIOES_LOCALE";
pub const ENV_AUTH_TIMEOUT_MS: &str = "GUARDIOES_AUTH_TIMEOUT_MS";

const DEFAULT_DB_FILE_NAME: &str = "guardioes_session.sqlite3";
const DEFAULT_API_URL: &str = "https://api.guardioesdasaude.org";
/// Time limit of the single sign-in attempt.
pub const DEFAULT_AUTH_TIMEOUT_MS: u64 = 30_000;

/// Process-level settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub api_url: String,
    pub auth_timeout_ms: u64,
    pub locale: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            api_url: DEFAULT_API_URL.to_string(),
            auth_timeout_ms: DEFAULT_AUTH_TIMEOUT_MS,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl CoreConfig {
    /// Reads overrides from `GUARDIOES_*` variables; blank values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();
        Self {
            db_path: read(ENV_DB_PATH).map_or(defaults.db_path, PathBuf::from),
            api_url: read(ENV_API_URL).unwrap_or(defaults.api_url),
            auth_timeout_ms: read(ENV_AUTH_TIMEOUT_MS)
                .and_then(|raw| positive_ms(&raw))
                .unwrap_or(defaults.auth_timeout_ms),
            locale: read(ENV_LOCALE).unwrap_or(defaults.locale),
        }
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_millis(self.auth_timeout_ms)
    }
}

fn positive_ms(raw: &str) -> Option<u64> {
    match raw.parse::<u64>() {
        Ok(ms) if ms > 0 => Some(ms),
        _ => {
            warn!("event=config_load module=config status=error key={ENV_AUTH_TIMEOUT_MS} error_code=invalid_duration");
            None
        }
    }
}

/// Settings for one session service instance.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub platform: PlatformInfo,
    pub locale: String,
    pub position: PositionOptions,
}

impl SessionConfig {
    pub fn new(platform: PlatformInfo) -> Self {
        Self {
            platform,
            locale: DEFAULT_LOCALE.to_string(),
            position: PositionOptions::default(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CoreConfig, SessionConfig, DEFAULT_AUTH_TIMEOUT_MS, ENV_API_URL, ENV_AUTH_TIMEOUT_MS,
        ENV_DB_PATH,
    };
    use crate::platform::{Os, PlatformInfo};
    use log::warn;
use std::path::PathBuf;
use std::time::Duration;

    #[test]
    fn from_lookup_applies_non_blank_overrides() {
        let config = CoreConfig::from_lookup(|name| match name {
            ENV_DB_PATH => Some(" /data/session.db ".to_string()),
            ENV_API_URL => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.db_path, PathBuf::from("/data/session.db"));
        assert_eq!(config.api_url, CoreConfig::default().api_url);
        assert_eq!(config.locale, "pt-BR");
        assert_eq!(config.auth_timeout_ms, DEFAULT_AUTH_TIMEOUT_MS);
    }

    #[test]
    fn auth_timeout_reads_positive_millis_only() {
        let config = CoreConfig::from_lookup(|name| {
            (name == ENV_AUTH_TIMEOUT_MS).then(|| "8000".to_string())
        });
        assert_eq!(config.auth_timeout(), std::time::Duration::from_secs(8));

        for raw in ["0", "soon"] {
            let config = CoreConfig::from_lookup(|name| {
                (name == ENV_AUTH_TIMEOUT_MS).then(|| raw.to_string())
            });
            assert_eq!(config.auth_timeout_ms, DEFAULT_AUTH_TIMEOUT_MS);
        }
    }

    #[test]
    fn session_config_defaults_to_high_accuracy_fixed_timeout() {
        let config = SessionConfig::new(PlatformInfo::new(Os::Android, "33"));
        assert!(config.position.enable_high_accuracy);
        assert_eq!(config.position.timeout_ms, 50_000);
    }
}
