//! Bundled translation catalogs.
//!
//! # Responsibility
//! - Resolve dotted keys (`badReport.title`) to localized strings.
//! - Ship the catalogs inside the binary; no runtime file access.
//!
//! # Invariants
//! - Lookup never fails: requested locale, then `pt-BR`, then the key itself.
//! - Locale tags are matched case-insensitively with `_` treated as `-`.

use crate::platform::location::PermissionPrompt;
use log::error;
use once_cell::sync::Lazy;
use serde_json::Value;

pub const DEFAULT_LOCALE: &str = "pt-BR";

const BUNDLED: &[(&str, &str)] = &[
    (DEFAULT_LOCALE, include_str!("locales/pt-BR.json")),
    ("en", include_str!("locales/en.json")),
];

static CATALOGS: Lazy<Vec<(&'static str, Value)>> = Lazy::new(|| {
    BUNDLED
        .iter()
        .filter_map(|(tag, raw)| match serde_json::from_str::<Value>(raw) {
            Ok(catalog) => Some((*tag, catalog)),
            Err(err) => {
                error!("event=i18n_load module=i18n status=error locale={tag} error={err}");
                None
            }
        })
        .collect()
});

/// Returns bundled locale tags, default first.
pub fn available_locales() -> Vec<&'static str> {
    CATALOGS.iter().map(|(tag, _)| *tag).collect()
}

/// Translator bound to one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translator {
    locale: &'static str,
}

impl Default for Translator {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE,
        }
    }
}

impl Translator {
    /// Picks the best bundled catalog for `requested`.
    ///
    /// `en-US` falls back to `en`; unknown locales use the default.
    pub fn new(requested: &str) -> Self {
        let normalized = requested.trim().replace('_', "-");
        let language = normalized.split('-').next().unwrap_or_default();
        let locale = CATALOGS
            .iter()
            .map(|(tag, _)| *tag)
            .find(|tag| tag.eq_ignore_ascii_case(&normalized))
            .or_else(|| {
                CATALOGS
                    .iter()
                    .map(|(tag, _)| *tag)
                    .find(|tag| tag.eq_ignore_ascii_case(language))
            })
            .unwrap_or(DEFAULT_LOCALE);
        Self { locale }
    }

    pub fn locale(&self) -> &'static str {
        self.locale
    }

    pub fn translate(&self, key: &str) -> String {
        lookup(self.locale, key)
            .or_else(|| lookup(DEFAULT_LOCALE, key))
            .unwrap_or_else(|| key.to_string())
    }

    /// Rationale dialog for the location permission request.
    pub fn location_prompt(&self) -> PermissionPrompt {
        PermissionPrompt {
            title: self.translate("locationRequest.permissionTitle"),
            message: format!(
                "{}{}",
                self.translate("locationRequest.permissionMessage"),
                self.translate("locationRequest.permissionMessage2")
            ),
            button_negative: self.translate("locationRequest.cancelText"),
            button_positive: self.translate("locationRequest.okText"),
        }
    }
}

fn lookup(locale: &str, key: &str) -> Option<String> {
    let (_, catalog) = CATALOGS.iter().find(|(tag, _)| *tag == locale)?;
    key.split('.')
        .try_fold(catalog, |node, segment| node.get(segment))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{available_locales, Translator, DEFAULT_LOCALE};

    #[test]
    fn bundled_catalogs_parse() {
        assert_eq!(available_locales(), vec![DEFAULT_LOCALE, "en"]);
    }

    #[test]
    fn resolves_locale_variants() {
        assert_eq!(Translator::new("en_US").locale(), "en");
        assert_eq!(Translator::new("PT-br").locale(), "pt-BR");
        assert_eq!(Translator::new("fr").locale(), DEFAULT_LOCALE);
        assert_eq!(Translator::new("").locale(), DEFAULT_LOCALE);
    }

    #[test]
    fn translate_walks_nested_keys() {
        let translator = Translator::new("en");
        assert_eq!(translator.translate("profiles.title"), "Profiles");
        assert_eq!(Translator::default().translate("profiles.title"), "Perfis");
    }

    #[test]
    fn missing_key_falls_back_to_key() {
        let translator = Translator::new("en");
        assert_eq!(translator.translate("nope.title"), "nope.title");
        assert_eq!(translator.translate("profiles"), "profiles");
    }

    #[test]
    fn location_prompt_concatenates_message_parts() {
        let prompt = Translator::new("en").location_prompt();
        assert_eq!(prompt.title, "Location permission");
        assert!(prompt.message.starts_with("Guardiões da Saúde needs"));
        assert!(prompt.message.ends_with("your region."));
        assert_eq!(prompt.button_negative, "Cancel");
    }
}
