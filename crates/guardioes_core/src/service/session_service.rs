//! Session store service.
//!
//! # Responsibility
//! - Single source of truth for authentication and profile state.
//! - Mediate between device storage, the remote auth endpoint, push tagging
//!   and device location.
//!
//! # Invariants
//! - Session fields change only through methods on [`SessionService`].
//! - Read failures of persisted entries degrade to "absent", never to errors.
//! - Remote auth is attempted once per call.
//! - Sign-out is idempotent.
//! - Log events never carry credentials, tokens or coordinates.

use crate::config::SessionConfig;
use crate::i18n::Translator;
use crate::model::profile::{AuthenticatedUser, Household, Profile, UserRecord};
use crate::model::session::{CurrentUserInfo, Location, Selection, Session};
use crate::platform::auth::{AuthClient, AuthRequest, STATUS_OK, STATUS_UNAUTHORIZED};
use crate::platform::clock::Clock;
use crate::platform::location::{LocationProvider, PermissionStatus};
use crate::platform::push::{identity_tags, score_tags, PushTagger, USER_TAGS};
use crate::service::score::{next_step, parse_last_report, StreakStep};
use crate::store::{keys, read_json, read_text, KeyValueStore, StoreError};
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type SessionResult<T> = Result<T, SessionError>;

/// Failure of a mutating session operation.
#[derive(Debug)]
pub enum SessionError {
    Store(StoreError),
    Encode(serde_json::Error),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "session storage failed: {err}"),
            Self::Encode(err) => write!(f, "session value encoding failed: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Result of one sign-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    SignedIn,
    /// Server rejected the credentials (401); the session was signed out.
    Rejected,
    /// Any other status, or no response. Local data is left untouched.
    Unavailable { status: Option<u16> },
    /// Startup refresh found no stored credentials; the session was signed out.
    MissingCredentials,
}

impl SignInOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignedIn => "signed_in",
            Self::Rejected => "rejected",
            Self::Unavailable { .. } => "unavailable",
            Self::MissingCredentials => "missing_credentials",
        }
    }
}

/// Result of one streak update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub step: StreakStep,
    pub score: u32,
}

/// External collaborators of the session store.
pub struct SessionPorts {
    /// Durable local storage (`userData`, `selectedData`, ...).
    pub storage: Box<dyn KeyValueStore>,
    /// Credential storage (`userEmail`, `userPwd`).
    pub secure_storage: Box<dyn KeyValueStore>,
    pub auth: Arc<dyn AuthClient>,
    pub push: Arc<dyn PushTagger>,
    pub location: Arc<dyn LocationProvider>,
    pub clock: Arc<dyn Clock>,
}

/// Session context handle passed explicitly to consumers.
pub struct SessionService {
    ports: SessionPorts,
    config: SessionConfig,
    translator: Translator,
    session: Session,
}

impl SessionService {
    /// Creates a service in the fresh-launch state (loading).
    pub fn new(ports: SessionPorts, config: SessionConfig) -> Self {
        let translator = Translator::new(&config.locale);
        Self {
            ports,
            config,
            translator,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Startup phase 1: restores the cached user and selection, then clears
    /// the loading flag so the first screen can render.
    pub fn load_stored_data(&mut self) {
        let storage = self.ports.storage.as_ref();
        let user = read_json::<UserRecord>(storage, keys::USER_DATA);
        let selected = read_json::<Household>(storage, keys::SELECTED_DATA)
            .filter(|household| !household.description.is_empty());

        info!(
            "event=session_load module=session status=ok phase=stored user_restored={} selection={}",
            user.is_some(),
            if selected.is_some() { "household" } else { "individual" }
        );

        if let Some(user) = user {
            self.session.user = Some(user);
        }
        if let Some(household) = selected {
            self.session.selection = Selection::Household(household);
        }
        self.session.is_loading = false;
    }

    /// Startup phase 2: restores avatar, streak and household avatars, then
    /// re-validates the session by signing in with the stored credentials.
    ///
    /// Absent or empty credentials force a sign-out.
    pub fn load_secondary_data(&mut self) -> SignInOutcome {
        let storage = self.ports.storage.as_ref();
        let avatar = read_text(storage, keys::USER_AVATAR);
        let score = read_text(storage, keys::USER_SCORE)
            .and_then(|raw| parse_or_warn::<u32>(keys::USER_SCORE, &raw));
        let last_report_ms = read_text(storage, keys::LAST_REPORT).and_then(|raw| {
            let parsed = parse_last_report(&raw);
            if parsed.is_none() {
                warn!("event=store_decode module=session status=error key={} error_code=not_a_timestamp", keys::LAST_REPORT);
            }
            parsed
        });
        let household_avatars =
            read_json::<BTreeMap<String, String>>(storage, keys::HOUSEHOLD_AVATARS);

        if let Some(avatar) = avatar {
            self.session.avatar = Some(avatar);
        }
        if let Some(score) = score {
            self.session.score = score;
        }
        if let Some(last_report_ms) = last_report_ms {
            self.session.last_report_ms = Some(last_report_ms);
        }
        if let Some(household_avatars) = household_avatars {
            self.session.household_avatars = household_avatars;
        }

        let secure = self.ports.secure_storage.as_ref();
        let email = read_text(secure, keys::USER_EMAIL);
        let password = read_text(secure, keys::USER_PASSWORD);
        match (email, password) {
            (Some(email), Some(password)) => {
                info!("event=session_load module=session status=ok phase=secondary credentials=present");
                self.sign_in(&email, &password)
            }
            _ => {
                info!("event=session_load module=session status=ok phase=secondary credentials=missing");
                self.sign_out();
                SignInOutcome::MissingCredentials
            }
        }
    }

    /// Authenticates against the remote endpoint, once.
    ///
    /// - `200`: stores token, households and app data, persists the user
    ///   record and credentials, tags the push service.
    /// - `401`: signs out.
    /// - anything else (or no response): marks the session logged out and
    ///   leaves stored data as it is.
    pub fn sign_in(&mut self, email: &str, password: &str) -> SignInOutcome {
        let request = AuthRequest::new(email, password);
        let response = match self.ports.auth.authenticate(&request) {
            Ok(response) => response,
            Err(err) => {
                warn!("event=sign_in module=session status=error error_code=auth_unreachable error={err}");
                self.session.is_logged_in = false;
                return SignInOutcome::Unavailable { status: None };
            }
        };

        match (response.status, response.body) {
            (STATUS_OK, Some(body)) => {
                self.store_user_data(body.user, response.token);
                self.store_credentials(&request);
                self.send_identity_tags();
                self.session.is_logged_in = true;
                info!("event=sign_in module=session status=ok");
                SignInOutcome::SignedIn
            }
            (STATUS_UNAUTHORIZED, _) => {
                info!("event=sign_in module=session status=rejected http_status=401");
                self.sign_out();
                SignInOutcome::Rejected
            }
            (status, _) => {
                warn!("event=sign_in module=session status=error error_code=auth_unavailable http_status={status}");
                self.session.is_logged_in = false;
                SignInOutcome::Unavailable {
                    status: Some(status),
                }
            }
        }
    }

    /// Drops session keys, credentials and push identity; marks logged out.
    ///
    /// Score, last report and the personal avatar stay on the device.
    pub fn sign_out(&mut self) {
        if let Err(err) = self.ports.storage.multi_remove(keys::SESSION_KEYS) {
            warn!("event=sign_out module=session status=error error_code=storage_remove_failed error={err}");
        }
        if let Err(err) = self.ports.secure_storage.multi_remove(keys::CREDENTIAL_KEYS) {
            warn!("event=sign_out module=session status=error error_code=credentials_remove_failed error={err}");
        }
        if let Err(err) = self.ports.push.remove_external_user_id() {
            warn!("event=sign_out module=session status=error error_code=push_untag_failed error={err}");
        }
        if let Err(err) = self.ports.push.delete_tags(USER_TAGS) {
            warn!("event=sign_out module=session status=error error_code=push_untag_failed error={err}");
        }

        self.session.clear_identity();
        self.session.is_logged_in = false;
        info!("event=sign_out module=session status=ok");
    }

    /// Makes `profile` the active entity.
    ///
    /// Households are persisted without their `user` back-reference; selecting
    /// the individual clears the persisted selection.
    pub fn select_user(&mut self, profile: &Profile) -> SessionResult<()> {
        match profile {
            Profile::Household(household) => {
                let persisted = household.to_persisted();
                write_json(self.ports.storage.as_ref(), keys::SELECTED_DATA, &persisted)?;
                self.session.selection = Selection::Household(persisted);
                info!("event=select_user module=session status=ok selection=household");
            }
            Profile::Individual(_) => {
                self.ports.storage.remove_item(keys::SELECTED_DATA)?;
                self.session.selection = Selection::Individual;
                info!("event=select_user module=session status=ok selection=individual");
            }
        }
        Ok(())
    }

    pub fn current_user_info(&self) -> CurrentUserInfo {
        self.session.current_user_info()
    }

    pub fn store_households(&mut self, households: Vec<Household>) {
        self.session.households = households;
    }

    /// Sets one household avatar and persists the whole map.
    pub fn update_household_avatar(
        &mut self,
        household_id: i64,
        source: impl Into<String>,
    ) -> SessionResult<()> {
        let mut avatars = self.session.household_avatars.clone();
        avatars.insert(household_id.to_string(), source.into());
        write_json(self.ports.storage.as_ref(), keys::HOUSEHOLD_AVATARS, &avatars)?;
        self.session.household_avatars = avatars;
        Ok(())
    }

    /// Sets and persists the personal avatar.
    pub fn set_avatar(&mut self, source: impl Into<String>) -> SessionResult<()> {
        let source = source.into();
        self.ports.storage.set_item(keys::USER_AVATAR, &source)?;
        self.session.avatar = Some(source);
        Ok(())
    }

    pub fn store_surveys(&mut self, surveys: Vec<Value>) {
        self.session.surveys = surveys;
    }

    /// Advances the daily reporting streak.
    ///
    /// Same day: no change. Next day: `score + 1`. Otherwise: `0`. The two
    /// mutating branches persist score and timestamp before updating memory.
    /// The resulting score is pushed as a tag in every case.
    pub fn update_user_score(&mut self) -> SessionResult<ScoreUpdate> {
        let now_ms = self.ports.clock.now_epoch_ms();
        let step = next_step(self.session.last_report_ms, now_ms);
        let score = step.apply(self.session.score);

        if step.mutates() {
            let storage = self.ports.storage.as_ref();
            storage.set_item(keys::USER_SCORE, &score.to_string())?;
            storage.set_item(keys::LAST_REPORT, &now_ms.to_string())?;
            self.session.score = score;
            self.session.last_report_ms = Some(now_ms);
        }

        if let Err(err) = self.ports.push.send_tags(&score_tags(score)) {
            warn!("event=score_update module=session status=error error_code=push_tag_failed error={err}");
        }
        info!(
            "event=score_update module=session status=ok step={} score={}",
            step.as_str(),
            score
        );
        Ok(ScoreUpdate { step, score })
    }

    /// Requests permission (where the platform needs it) and one position fix.
    ///
    /// Returns the stored location, or `None` when permission was denied and
    /// no fix was attempted. Permission errors are logged and the fix is
    /// still attempted.
    pub fn get_current_location(&mut self) -> Option<Location> {
        if self.config.platform.os.requires_location_prompt() {
            let prompt = self.translator.location_prompt();
            match self.ports.location.request_permission(&prompt) {
                Ok(PermissionStatus::Granted) => {
                    info!("event=location_permission module=session status=ok result=granted");
                }
                Ok(status) => {
                    info!(
                        "event=location_permission module=session status=denied result={}",
                        status.as_str()
                    );
                    return None;
                }
                Err(err) => {
                    warn!("event=location_permission module=session status=error error={err}");
                }
            }
        }

        let location = match self.ports.location.current_position(&self.config.position) {
            Ok(coordinates) => Location::fix(coordinates.latitude, coordinates.longitude),
            Err(err) => {
                warn!(
                    "event=location_fix module=session status=error error_code={}",
                    err.code
                );
                Location::unavailable(err.code)
            }
        };
        if location.is_fix() {
            info!("event=location_fix module=session status=ok");
        }
        self.session.location = Some(location);
        Some(location)
    }

    fn store_user_data(&mut self, payload: AuthenticatedUser, token: Option<String>) {
        let AuthenticatedUser {
            households,
            app,
            user,
        } = payload;

        if let Err(err) = write_json(self.ports.storage.as_ref(), keys::USER_DATA, &user) {
            warn!("event=sign_in module=session status=error error_code=user_persist_failed error={err}");
        }

        self.session.token = token;
        self.session.households = households;
        self.session.app = app;
        self.session.user = Some(user);
    }

    fn store_credentials(&self, request: &AuthRequest) {
        let secure = self.ports.secure_storage.as_ref();
        let result = secure
            .set_item(keys::USER_EMAIL, &request.email)
            .and_then(|()| secure.set_item(keys::USER_PASSWORD, &request.password));
        if let Err(err) = result {
            warn!("event=sign_in module=session status=error error_code=credentials_persist_failed error={err}");
        }
    }

    fn send_identity_tags(&self) {
        let Some(user) = self.session.user.as_ref() else {
            return;
        };
        let push = self.ports.push.as_ref();
        let result = push
            .set_external_user_id(&user.id.to_string())
            .and_then(|()| push.send_tags(&identity_tags(user, &self.config.platform)));
        if let Err(err) = result {
            warn!("event=sign_in module=session status=error error_code=push_tag_failed error={err}");
        }
    }
}

fn write_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> SessionResult<()> {
    let encoded = serde_json::to_string(value)?;
    store.set_item(key, &encoded)?;
    Ok(())
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("event=store_decode module=session status=error key={key} error_code=not_a_number");
            None
        }
    }
}
