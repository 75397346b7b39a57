//! Stack navigator with shared header chrome.

use crate::i18n::Translator;
use crate::nav::route::{resolve_route, RouteName, INITIAL_ROUTE};
use crate::nav::NavError;
use log::debug;

/// Header rendered above every screen that shows one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderChrome {
    /// Back control is shown whenever there is a screen to return to.
    pub back_visible: bool,
    pub title: String,
}

/// Back stack of app routes, bottom first.
#[derive(Debug, Clone)]
pub struct StackNavigator {
    stack: Vec<RouteName>,
    translator: Translator,
}

impl StackNavigator {
    /// Starts at [`INITIAL_ROUTE`].
    pub fn new(translator: Translator) -> Self {
        Self {
            stack: vec![INITIAL_ROUTE],
            translator,
        }
    }

    pub fn current(&self) -> RouteName {
        self.stack.last().copied().unwrap_or(INITIAL_ROUTE)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn routes(&self) -> &[RouteName] {
        &self.stack
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }

    /// Goes to `name`: pops back to it if already stacked, pushes otherwise.
    pub fn navigate(&mut self, name: &str) -> Result<RouteName, NavError> {
        let route = RouteName::parse(name)?;
        match self.stack.iter().rposition(|stacked| *stacked == route) {
            Some(index) => self.stack.truncate(index + 1),
            None => self.stack.push(route),
        }
        debug!(
            "event=navigate module=nav status=ok route={} depth={}",
            route.as_str(),
            self.stack.len()
        );
        Ok(route)
    }

    /// Pushes `name` even when it is already on the stack.
    pub fn push(&mut self, name: &str) -> Result<RouteName, NavError> {
        let route = RouteName::parse(name)?;
        self.stack.push(route);
        debug!(
            "event=push module=nav status=ok route={} depth={}",
            route.as_str(),
            self.stack.len()
        );
        Ok(route)
    }

    /// Pops exactly one screen. Returns `false` at the root.
    pub fn go_back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.stack.pop();
        true
    }

    pub fn reset(&mut self) {
        self.stack.truncate(1);
    }

    /// Header for the current screen; `None` when the screen hides it.
    pub fn header(&self) -> Option<HeaderChrome> {
        let screen = resolve_route(self.current(), &self.translator);
        if !screen.header_shown {
            return None;
        }
        Some(HeaderChrome {
            back_visible: self.can_go_back(),
            title: screen.title.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::StackNavigator;
    use crate::i18n::Translator;
    use crate::nav::route::RouteName;

    fn navigator() -> StackNavigator {
        StackNavigator::new(Translator::new("en"))
    }

    #[test]
    fn starts_at_home_without_header() {
        let nav = navigator();
        assert_eq!(nav.current(), RouteName::HomeDrawer);
        assert_eq!(nav.depth(), 1);
        assert_eq!(nav.header(), None);
    }

    #[test]
    fn go_back_pops_one_level_and_stops_at_root() {
        let mut nav = navigator();
        nav.navigate("Perfis").unwrap();
        nav.navigate("NovoPerfil").unwrap();

        assert!(nav.go_back());
        assert_eq!(nav.current(), RouteName::Perfis);
        assert!(nav.go_back());
        assert_eq!(nav.current(), RouteName::HomeDrawer);
        assert!(!nav.go_back());
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn navigate_to_stacked_route_pops_back_to_it() {
        let mut nav = navigator();
        nav.navigate("Perfis").unwrap();
        nav.navigate("EditarPerfil").unwrap();
        nav.navigate("Perfis").unwrap();
        assert_eq!(nav.routes(), &[RouteName::HomeDrawer, RouteName::Perfis]);

        nav.navigate("HomeDrawer").unwrap();
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn push_allows_duplicates() {
        let mut nav = navigator();
        nav.push("Tutorial").unwrap();
        nav.push("Tutorial").unwrap();
        assert_eq!(nav.depth(), 3);
    }

    #[test]
    fn unknown_route_leaves_stack_untouched() {
        let mut nav = navigator();
        nav.navigate("Sobre").unwrap();
        assert!(nav.navigate("Nowhere").is_err());
        assert!(nav.push("Nowhere").is_err());
        assert_eq!(nav.routes(), &[RouteName::HomeDrawer, RouteName::Sobre]);
    }

    #[test]
    fn header_shows_translated_title_and_back_control() {
        let mut nav = navigator();
        nav.navigate("Vigilancia").unwrap();
        let header = nav.header().unwrap();
        assert_eq!(header.title, "Active surveillance");
        assert!(header.back_visible);
    }

    #[test]
    fn reset_returns_to_initial_route() {
        let mut nav = navigator();
        nav.navigate("Ajuda").unwrap();
        nav.navigate("FAQ").unwrap();
        nav.reset();
        assert_eq!(nav.routes(), &[RouteName::HomeDrawer]);
    }
}
