//! App stack route table.

use crate::i18n::Translator;
use crate::nav::NavError;

/// Named screens of the app stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    HomeDrawer,
    BadReport,
    NovoPerfil,
    Perfis,
    Rumor,
    EditarPerfil,
    Vigilancia,
    Ajuda,
    TermosPoliticas,
    Tutorial,
    Sobre,
    Faq,
}

/// Route every stack starts from.
pub const INITIAL_ROUTE: RouteName = RouteName::HomeDrawer;

/// Static description of one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSpec {
    pub route: RouteName,
    /// Translation key of the header title; `None` for headerless screens.
    pub title_key: Option<&'static str>,
}

impl ScreenSpec {
    pub fn header_shown(&self) -> bool {
        self.title_key.is_some()
    }
}

/// Declaration order of the app stack.
pub const APP_STACK: [RouteName; 12] = [
    RouteName::HomeDrawer,
    RouteName::BadReport,
    RouteName::NovoPerfil,
    RouteName::Perfis,
    RouteName::Rumor,
    RouteName::EditarPerfil,
    RouteName::Vigilancia,
    RouteName::Ajuda,
    RouteName::TermosPoliticas,
    RouteName::Tutorial,
    RouteName::Sobre,
    RouteName::Faq,
];

impl RouteName {
    /// Route name as used by the shell's navigator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HomeDrawer => "HomeDrawer",
            Self::BadReport => "BadReport",
            Self::NovoPerfil => "NovoPerfil",
            Self::Perfis => "Perfis",
            Self::Rumor => "Rumor",
            Self::EditarPerfil => "EditarPerfil",
            Self::Vigilancia => "Vigilancia",
            Self::Ajuda => "Ajuda",
            Self::TermosPoliticas => "TermosPoliticas",
            Self::Tutorial => "Tutorial",
            Self::Sobre => "Sobre",
            Self::Faq => "FAQ",
        }
    }

    /// Parses an exact, case-sensitive route name.
    pub fn parse(name: &str) -> Result<Self, NavError> {
        APP_STACK
            .into_iter()
            .find(|route| route.as_str() == name)
            .ok_or_else(|| NavError::UnknownRoute(name.to_string()))
    }

    pub fn spec(self) -> ScreenSpec {
        let title_key = match self {
            Self::HomeDrawer => None,
            Self::BadReport => Some("badReport.title"),
            Self::NovoPerfil => Some("home.addProfile"),
            Self::Perfis => Some("profiles.title"),
            Self::Rumor => Some("rumor.title"),
            Self::EditarPerfil => Some("register.editProfile"),
            Self::Vigilancia => Some("drawer.toSurveillance"),
            Self::Ajuda => Some("ajuda.title"),
            Self::TermosPoliticas => Some("useTerms.title"),
            Self::Tutorial => Some("tutorial.title"),
            Self::Sobre => Some("about.title"),
            Self::Faq => Some("faq.title"),
        };
        ScreenSpec {
            route: self,
            title_key,
        }
    }
}

/// Screen resolved against a translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScreen {
    pub route: RouteName,
    pub title: Option<String>,
    pub header_shown: bool,
}

/// Resolves a route name to its screen and localized title.
pub fn resolve(name: &str, translator: &Translator) -> Result<ResolvedScreen, NavError> {
    Ok(resolve_route(RouteName::parse(name)?, translator))
}

pub fn resolve_route(route: RouteName, translator: &Translator) -> ResolvedScreen {
    let spec = route.spec();
    ResolvedScreen {
        route,
        title: spec.title_key.map(|key| translator.translate(key)),
        header_shown: spec.header_shown(),
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve, RouteName, APP_STACK, INITIAL_ROUTE};
    use crate::i18n::Translator;
    use crate::nav::NavError;

    #[test]
    fn every_route_round_trips_through_its_name() {
        for route in APP_STACK {
            assert_eq!(RouteName::parse(route.as_str()), Ok(route));
            assert_eq!(route.spec().route, route);
        }
    }

    #[test]
    fn only_initial_route_hides_header() {
        for route in APP_STACK {
            assert_eq!(route.spec().header_shown(), route != INITIAL_ROUTE);
        }
    }

    #[test]
    fn every_title_key_is_translated() {
        let translator = Translator::default();
        for route in APP_STACK {
            if let Some(key) = route.spec().title_key {
                assert_ne!(translator.translate(key), key, "missing translation for {key}");
            }
        }
    }

    #[test]
    fn resolve_returns_localized_title() {
        let screen = resolve("FAQ", &Translator::new("en")).unwrap();
        assert_eq!(screen.route, RouteName::Faq);
        assert_eq!(screen.title.as_deref(), Some("FAQ"));
        assert!(screen.header_shown);
    }

    #[test]
    fn resolve_rejects_unknown_and_miscased_names() {
        let translator = Translator::default();
        assert_eq!(
            resolve("Settings", &translator),
            Err(NavError::UnknownRoute("Settings".to_string()))
        );
        assert!(resolve("faq", &translator).is_err());
    }
}
