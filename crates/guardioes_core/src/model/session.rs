//! In-memory session state.
//!
//! # Responsibility
//! - Hold identity, selection, streak and location for the running app.
//! - Expose read-only views; only the session service mutates fields.
//!
//! # Invariants
//! - `score` is never negative (typed as `u32`).
//! - A selection is `Individual` unless a household was explicitly selected.

use crate::model::profile::{Household, UserRecord};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Currently active profile for reports and actions.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Selection {
    /// The signed-in user acts for themselves.
    #[default]
    Individual,
    Household(Household),
}

impl Selection {
    pub fn household(&self) -> Option<&Household> {
        match self {
            Self::Household(household) => Some(household),
            Self::Individual => None,
        }
    }
}

/// Device position snapshot.
///
/// `error_code == 0` marks a successful fix; on failure coordinates are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub error_code: i32,
}

impl Location {
    pub fn fix(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            error_code: 0,
        }
    }

    pub fn unavailable(error_code: i32) -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            error_code,
        }
    }

    pub fn is_fix(&self) -> bool {
        self.error_code == 0
    }
}

/// Display record for whichever profile is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentUserInfo {
    pub id: Option<i64>,
    pub is_household: bool,
    pub name: Option<String>,
    pub avatar: Option<String>,
    /// Remaining profile fields of the active entity.
    pub fields: Map<String, Value>,
}

/// Session state owned by [`crate::SessionService`].
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub(crate) token: Option<String>,
    pub(crate) user: Option<UserRecord>,
    pub(crate) avatar: Option<String>,
    pub(crate) households: Vec<Household>,
    pub(crate) household_avatars: BTreeMap<String, String>,
    pub(crate) selection: Selection,
    pub(crate) surveys: Vec<Value>,
    pub(crate) app: Option<Value>,
    pub(crate) score: u32,
    pub(crate) last_report_ms: Option<i64>,
    pub(crate) location: Option<Location>,
    pub(crate) is_loading: bool,
    pub(crate) is_logged_in: bool,
}

impl Default for Session {
    /// Fresh launch state: loading, and optimistically logged in until the
    /// stored credentials are re-validated.
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            avatar: None,
            households: Vec::new(),
            household_avatars: BTreeMap::new(),
            selection: Selection::Individual,
            surveys: Vec::new(),
            app: None,
            score: 0,
            last_report_ms: None,
            location: None,
            is_loading: true,
            is_logged_in: true,
        }
    }
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn households(&self) -> &[Household] {
        &self.households
    }

    pub fn household_avatars(&self) -> &BTreeMap<String, String> {
        &self.household_avatars
    }

    pub fn household_avatar(&self, household_id: i64) -> Option<&str> {
        self.household_avatars
            .get(&household_id.to_string())
            .map(String::as_str)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn surveys(&self) -> &[Value] {
        &self.surveys
    }

    pub fn app(&self) -> Option<&Value> {
        self.app.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn last_report_ms(&self) -> Option<i64> {
        self.last_report_ms
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    /// Derives the display record of the active profile.
    pub fn current_user_info(&self) -> CurrentUserInfo {
        match &self.selection {
            Selection::Household(household) => CurrentUserInfo {
                id: Some(household.id),
                is_household: true,
                name: Some(household.description.clone()),
                avatar: self.household_avatar(household.id).map(str::to_string),
                fields: household.profile.clone(),
            },
            Selection::Individual => {
                let fields = self.user.as_ref().map(individual_fields).unwrap_or_default();
                CurrentUserInfo {
                    id: self.user.as_ref().map(|user| user.id),
                    is_household: false,
                    name: self.user.as_ref().and_then(|user| user.user_name.clone()),
                    avatar: self.avatar.clone(),
                    fields,
                }
            }
        }
    }

    /// Drops identity and selection; streak fields and the personal avatar stay.
    pub(crate) fn clear_identity(&mut self) {
        self.token = None;
        self.user = None;
        self.households.clear();
        self.household_avatars.clear();
        self.selection = Selection::Individual;
        self.surveys.clear();
        self.app = None;
    }
}

fn individual_fields(user: &UserRecord) -> Map<String, Value> {
    let mut fields = match serde_json::to_value(user) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    fields.remove("id");
    fields.remove("user_name");
    fields
}

#[cfg(test)]
mod tests {
    use super::{Location, Selection, Session};
    use crate::model::profile::{Household, UserRecord};
    use serde_json::json;

    fn signed_in_session() -> Session {
        let mut user = UserRecord::new(42);
        user.user_name = Some("Ana".to_string());
        user.city = Some("Brasília".to_string());

        let mut session = Session::default();
        session.user = Some(user);
        session.avatar = Some("avatar_personal".to_string());
        session
            .household_avatars
            .insert("7".to_string(), "avatar_house".to_string());
        session
    }

    #[test]
    fn current_user_info_uses_individual_branch_without_selection() {
        let info = signed_in_session().current_user_info();
        assert!(!info.is_household);
        assert_eq!(info.id, Some(42));
        assert_eq!(info.name.as_deref(), Some("Ana"));
        assert_eq!(info.avatar.as_deref(), Some("avatar_personal"));
        assert_eq!(info.fields.get("city"), Some(&json!("Brasília")));
        assert!(info.fields.get("user_name").is_none());
    }

    #[test]
    fn current_user_info_uses_household_branch_when_selected() {
        let mut session = signed_in_session();
        let mut household = Household::new(7, "Avó");
        household
            .profile
            .insert("kinship".to_string(), json!("avó"));
        session.selection = Selection::Household(household);

        let info = session.current_user_info();
        assert!(info.is_household);
        assert_eq!(info.id, Some(7));
        assert_eq!(info.name.as_deref(), Some("Avó"));
        assert_eq!(info.avatar.as_deref(), Some("avatar_house"));
        assert!(info.fields.get("description").is_none());
        assert_eq!(info.fields.get("kinship"), Some(&json!("avó")));
    }

    #[test]
    fn household_without_avatar_has_no_avatar() {
        let mut session = signed_in_session();
        session.selection = Selection::Household(Household::new(8, "Tio"));
        assert_eq!(session.current_user_info().avatar, None);
    }

    #[test]
    fn unavailable_location_is_zeroed() {
        let location = Location::unavailable(3);
        assert_eq!((location.latitude, location.longitude), (0.0, 0.0));
        assert!(!location.is_fix());
        assert!(Location::fix(-15.8, -47.9).is_fix());
    }
}
