//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose session and navigation use-cases to Dart via FRB.
//! - Hand the shell explicit handles instead of process-global state.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures come back as `{ ok: false, message }` envelopes.
//! - JSON strings are the wire shape for free-form profile data.

use crate::shell::{
    KeystoreCommand, PushCommand, PushOutbox, ShellKeystore, ShellLocation, ShellObservation,
};
use guardioes_core::store::keys;
use guardioes_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Coordinates, CoreConfig, Household, HttpAuthClient, KvNamespace, Location, Os,
    PermissionStatus, PlatformInfo, PositionError, Profile, RootView, SessionConfig,
    SessionPorts, SessionResult, SessionService, SignInOutcome, SqliteKvStore, StackNavigator,
    SystemClock, Translator,
};
use log::warn;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Session context owned by the shell.
#[flutter_rust_bridge::frb(opaque)]
pub struct SessionHandle {
    service: Mutex<SessionService>,
    push: Arc<PushOutbox>,
    location: Arc<ShellLocation>,
    keystore: ShellKeystore,
}

/// Navigation stack owned by the shell.
#[flutter_rust_bridge::frb(opaque)]
pub struct NavigatorHandle {
    navigator: Mutex<StackNavigator>,
}

/// Shell-supplied settings for [`session_open`]. Blank fields fall back to
/// the `GUARDIOES_*` environment or built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOpenRequest {
    /// `android` or `ios`.
    pub os: String,
    pub os_version: String,
    pub db_path: String,
    pub api_url: String,
    pub locale: String,
}

pub struct SessionOpenResponse {
    pub ok: bool,
    pub message: String,
    pub handle: Option<SessionHandle>,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionActionResponse {
    pub ok: bool,
    pub message: String,
}

impl SessionActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Flags the shell needs to pick and render its root view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// `loader|sign_in|app_stack`.
    pub root_view: String,
    pub is_loading: bool,
    pub is_logged_in: bool,
    pub has_token: bool,
    pub score: u32,
    pub last_report_ms: Option<i64>,
    pub household_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInResponse {
    /// `signed_in|rejected|unavailable|missing_credentials`.
    pub outcome: String,
    pub http_status: Option<u16>,
    pub snapshot: SessionSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUserInfoDto {
    pub id: Option<i64>,
    pub is_household: bool,
    pub name: Option<String>,
    pub avatar: Option<String>,
    /// Remaining profile fields as a JSON object string.
    pub fields_json: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreResponse {
    pub ok: bool,
    pub message: String,
    /// `already_reported|continued|reset`, empty on failure.
    pub step: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionPromptDto {
    pub title: String,
    pub message: String,
    pub button_negative: String,
    pub button_positive: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationDto {
    pub latitude: f64,
    pub longitude: f64,
    pub error_code: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTagDto {
    pub key: String,
    pub value: String,
}

/// One push SDK call to replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushCommandDto {
    /// `set_external_user_id|remove_external_user_id|send_tags|delete_tags`.
    pub kind: String,
    pub external_id: Option<String>,
    pub tags: Vec<PushTagDto>,
    pub tag_keys: Vec<String>,
}

/// One platform-keystore write to apply.
#[derive(Clone, PartialEq, Eq)]
pub struct KeystoreCommandDto {
    /// `set|remove`.
    pub kind: String,
    pub key: String,
    /// Present for `set` only.
    pub value: Option<String>,
}

impl std::fmt::Debug for KeystoreCommandDto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystoreCommandDto")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDto {
    pub back_visible: bool,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavResponse {
    pub ok: bool,
    pub message: String,
    pub route: String,
    pub depth: u32,
    /// `None` when the current screen hides the header.
    pub header: Option<HeaderDto>,
}

/// Opens the session store over the on-device database.
///
/// Credentials are never written to `db_path`. The shell keeps them in the
/// platform keystore: it hands them over with [`session_restore_credentials`]
/// before startup phase 2 and applies [`session_drain_keystore_commands`]
/// after every session call.
///
/// # FFI contract
/// - Sync call; opens SQLite and applies migrations.
/// - Never panics; `handle` is `None` when `ok` is false.
#[flutter_rust_bridge::frb(sync)]
pub fn session_open(request: SessionOpenRequest) -> SessionOpenResponse {
    match open_session(&request) {
        Ok(handle) => SessionOpenResponse {
            ok: true,
            message: "Session opened.".to_string(),
            handle: Some(handle),
        },
        Err(message) => SessionOpenResponse {
            ok: false,
            message: format!("session_open failed: {message}"),
            handle: None,
        },
    }
}

/// Startup phase 1: restores cached user and selection.
#[flutter_rust_bridge::frb(sync)]
pub fn session_load_stored_data(handle: &SessionHandle) -> SessionSnapshot {
    with_service(handle, |service| {
        service.load_stored_data();
        snapshot(service)
    })
    .unwrap_or_else(|_| poisoned_snapshot())
}

/// Loads credentials the shell read from the platform keystore.
///
/// Blank values are skipped, so phase 2 then signs out for missing
/// credentials.
#[flutter_rust_bridge::frb(sync)]
pub fn session_restore_credentials(
    handle: &SessionHandle,
    email: Option<String>,
    password: Option<String>,
) -> SessionActionResponse {
    let entries = [(keys::USER_EMAIL, email), (keys::USER_PASSWORD, password)];
    for (key, value) in entries {
        let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
            continue;
        };
        if let Err(err) = handle.keystore.seed(key, &value) {
            return SessionActionResponse::failure(format!("restore_credentials failed: {err}"));
        }
    }
    SessionActionResponse::success("OK")
}

/// Takes queued keystore writes for the shell to apply in order.
#[flutter_rust_bridge::frb(sync)]
pub fn session_drain_keystore_commands(handle: &SessionHandle) -> Vec<KeystoreCommandDto> {
    handle
        .keystore
        .drain()
        .into_iter()
        .map(to_keystore_command_dto)
        .collect()
}

/// Startup phase 2: restores device fields and re-validates credentials.
///
/// # FFI contract
/// - Async call; performs one network request.
pub fn session_load_secondary_data(handle: &SessionHandle) -> SignInResponse {
    sign_in_response(handle, SessionService::load_secondary_data)
}

/// Signs in once with the given credentials.
///
/// # FFI contract
/// - Async call; performs one network request, no retry.
pub fn session_sign_in(handle: &SessionHandle, email: String, password: String) -> SignInResponse {
    sign_in_response(handle, |service| {
        service.sign_in(email.trim(), password.as_str())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_sign_out(handle: &SessionHandle) -> SessionSnapshot {
    with_service(handle, |service| {
        service.sign_out();
        snapshot(service)
    })
    .unwrap_or_else(|_| poisoned_snapshot())
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_snapshot(handle: &SessionHandle) -> SessionSnapshot {
    with_service(handle, |service| snapshot(service)).unwrap_or_else(|_| poisoned_snapshot())
}

/// Selects a household (object with non-empty `description`) or the user.
#[flutter_rust_bridge::frb(sync)]
pub fn session_select_user(handle: &SessionHandle, profile_json: String) -> SessionActionResponse {
    let profile = match serde_json::from_str::<Value>(&profile_json)
        .ok()
        .as_ref()
        .and_then(Profile::from_json)
    {
        Some(profile) => profile,
        None => return SessionActionResponse::failure("select_user failed: unrecognized profile"),
    };
    action(handle, "select_user", |service| service.select_user(&profile))
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_current_user_info(handle: &SessionHandle) -> Option<CurrentUserInfoDto> {
    with_service(handle, |service| {
        let info = service.current_user_info();
        CurrentUserInfoDto {
            id: info.id,
            is_household: info.is_household,
            name: info.name,
            avatar: info.avatar,
            fields_json: Value::Object(info.fields).to_string(),
        }
    })
    .ok()
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_store_households(
    handle: &SessionHandle,
    households_json: String,
) -> SessionActionResponse {
    let households = match serde_json::from_str::<Vec<Household>>(&households_json) {
        Ok(households) => households,
        Err(err) => {
            return SessionActionResponse::failure(format!("store_households failed: {err}"))
        }
    };
    action(handle, "store_households", |service| {
        service.store_households(households);
        Ok(())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_store_surveys(handle: &SessionHandle, surveys_json: String) -> SessionActionResponse {
    let surveys = match serde_json::from_str::<Vec<Value>>(&surveys_json) {
        Ok(surveys) => surveys,
        Err(err) => return SessionActionResponse::failure(format!("store_surveys failed: {err}")),
    };
    action(handle, "store_surveys", |service| {
        service.store_surveys(surveys);
        Ok(())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_update_household_avatar(
    handle: &SessionHandle,
    household_id: i64,
    source: String,
) -> SessionActionResponse {
    action(handle, "update_household_avatar", |service| {
        service.update_household_avatar(household_id, source)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn session_set_avatar(handle: &SessionHandle, source: String) -> SessionActionResponse {
    action(handle, "set_avatar", |service| service.set_avatar(source))
}

/// Advances the daily reporting streak.
#[flutter_rust_bridge::frb(sync)]
pub fn session_update_user_score(handle: &SessionHandle) -> ScoreResponse {
    let result = with_service(handle, |service| service.update_user_score());
    match result {
        Ok(Ok(update)) => ScoreResponse {
            ok: true,
            message: "Score updated.".to_string(),
            step: update.step.as_str().to_string(),
            score: update.score,
        },
        Ok(Err(err)) => ScoreResponse {
            ok: false,
            message: format!("update_user_score failed: {err}"),
            step: String::new(),
            score: 0,
        },
        Err(message) => ScoreResponse {
            ok: false,
            message,
            step: String::new(),
            score: 0,
        },
    }
}

/// Localized rationale to show with the OS location permission dialog.
#[flutter_rust_bridge::frb(sync)]
pub fn session_location_prompt(handle: &SessionHandle) -> Option<PermissionPromptDto> {
    with_service(handle, |service| {
        let prompt = service.translator().location_prompt();
        PermissionPromptDto {
            title: prompt.title,
            message: prompt.message,
            button_negative: prompt.button_negative,
            button_positive: prompt.button_positive,
        }
    })
    .ok()
}

/// Records what the shell observed from the OS and updates session location.
///
/// Input semantics:
/// - `permission`: `granted|denied|never_ask_again`; unknown values count as
///   denied.
/// - `latitude + longitude` set: successful fix; otherwise `error_code`
///   (defaulting to `2`, position unavailable) describes the failure.
///
/// Returns `None` when permission was denied and location stays unset.
#[flutter_rust_bridge::frb(sync)]
pub fn session_apply_location(
    handle: &SessionHandle,
    permission: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    error_code: Option<i32>,
) -> Option<LocationDto> {
    let permission = PermissionStatus::parse(&permission).unwrap_or(PermissionStatus::Denied);
    let fix = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(Coordinates {
            latitude,
            longitude,
        }),
        _ => Err(PositionError {
            code: error_code.filter(|code| *code != 0).unwrap_or(2),
        }),
    };
    handle
        .location
        .observe(ShellObservation { permission, fix });
    with_service(handle, |service| service.get_current_location())
        .ok()
        .flatten()
        .map(to_location_dto)
}

/// Takes queued push SDK calls for the shell to replay in order.
#[flutter_rust_bridge::frb(sync)]
pub fn session_drain_push_commands(handle: &SessionHandle) -> Vec<PushCommandDto> {
    handle
        .push
        .drain()
        .into_iter()
        .map(to_push_command_dto)
        .collect()
}

/// Opens a navigator at the home screen.
#[flutter_rust_bridge::frb(sync)]
pub fn nav_open(locale: String) -> NavigatorHandle {
    NavigatorHandle {
        navigator: Mutex::new(StackNavigator::new(Translator::new(&locale))),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn nav_navigate(handle: &NavigatorHandle, route: String) -> NavResponse {
    with_navigator(handle, |navigator| {
        navigator
            .navigate(route.trim())
            .map(|_| ())
            .map_err(|err| err.to_string())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn nav_push(handle: &NavigatorHandle, route: String) -> NavResponse {
    with_navigator(handle, |navigator| {
        navigator
            .push(route.trim())
            .map(|_| ())
            .map_err(|err| err.to_string())
    })
}

/// Pops one screen; `ok` is false at the root.
#[flutter_rust_bridge::frb(sync)]
pub fn nav_go_back(handle: &NavigatorHandle) -> NavResponse {
    with_navigator(handle, |navigator| {
        if navigator.go_back() {
            Ok(())
        } else {
            Err("already at the initial route".to_string())
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn nav_state(handle: &NavigatorHandle) -> NavResponse {
    with_navigator(handle, |_| Ok(()))
}

fn open_session(request: &SessionOpenRequest) -> Result<SessionHandle, String> {
    let os = Os::parse(&request.os).ok_or_else(|| format!("unsupported os `{}`", request.os))?;
    let env = CoreConfig::from_env();
    let auth_timeout = env.auth_timeout();
    let db_path = non_blank(&request.db_path).map_or(env.db_path, PathBuf::from);
    let api_url = non_blank(&request.api_url).map_or(env.api_url, str::to_string);
    let locale = non_blank(&request.locale).map_or(env.locale, str::to_string);

    let storage =
        SqliteKvStore::open(&db_path, KvNamespace::Local).map_err(|err| err.to_string())?;
    let auth = HttpAuthClient::new(api_url, auth_timeout).map_err(|err| err.to_string())?;
    let push = Arc::new(PushOutbox::default());
    let location = Arc::new(ShellLocation::default());
    let keystore = ShellKeystore::default();

    let ports = SessionPorts {
        storage: Box::new(storage),
        secure_storage: Box::new(keystore.clone()),
        auth: Arc::new(auth),
        push: push.clone(),
        location: location.clone(),
        clock: Arc::new(SystemClock),
    };
    let config =
        SessionConfig::new(PlatformInfo::new(os, request.os_version.trim())).with_locale(locale);

    Ok(SessionHandle {
        service: Mutex::new(SessionService::new(ports, config)),
        push,
        location,
        keystore,
    })
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn with_service<T>(
    handle: &SessionHandle,
    f: impl FnOnce(&mut SessionService) -> T,
) -> Result<T, String> {
    let mut service = handle.service.lock().map_err(|_| {
        warn!("event=ffi_call module=ffi status=error error_code=session_poisoned");
        "session handle is poisoned".to_string()
    })?;
    Ok(f(&mut service))
}

fn action(
    handle: &SessionHandle,
    name: &str,
    f: impl FnOnce(&mut SessionService) -> SessionResult<()>,
) -> SessionActionResponse {
    match with_service(handle, f) {
        Ok(Ok(())) => SessionActionResponse::success("OK"),
        Ok(Err(err)) => SessionActionResponse::failure(format!("{name} failed: {err}")),
        Err(message) => SessionActionResponse::failure(format!("{name} failed: {message}")),
    }
}

fn sign_in_response(
    handle: &SessionHandle,
    f: impl FnOnce(&mut SessionService) -> SignInOutcome,
) -> SignInResponse {
    let result = with_service(handle, |service| {
        let outcome = f(service);
        (outcome, snapshot(service))
    });
    match result {
        Ok((outcome, snapshot)) => SignInResponse {
            outcome: outcome.as_str().to_string(),
            http_status: match outcome {
                SignInOutcome::Unavailable { status } => status,
                SignInOutcome::Rejected => Some(401),
                SignInOutcome::SignedIn => Some(200),
                SignInOutcome::MissingCredentials => None,
            },
            snapshot,
        },
        Err(_) => SignInResponse {
            outcome: SignInOutcome::Unavailable { status: None }.as_str().to_string(),
            http_status: None,
            snapshot: poisoned_snapshot(),
        },
    }
}

fn snapshot(service: &SessionService) -> SessionSnapshot {
    let session = service.session();
    SessionSnapshot {
        root_view: RootView::for_session(session).as_str().to_string(),
        is_loading: session.is_loading(),
        is_logged_in: session.is_logged_in(),
        has_token: session.token().is_some(),
        score: session.score(),
        last_report_ms: session.last_report_ms(),
        household_selected: session.selection().household().is_some(),
    }
}

fn poisoned_snapshot() -> SessionSnapshot {
    SessionSnapshot {
        root_view: RootView::SignIn.as_str().to_string(),
        is_loading: false,
        is_logged_in: false,
        has_token: false,
        score: 0,
        last_report_ms: None,
        household_selected: false,
    }
}

fn with_navigator(
    handle: &NavigatorHandle,
    f: impl FnOnce(&mut StackNavigator) -> Result<(), String>,
) -> NavResponse {
    let Ok(mut navigator) = handle.navigator.lock() else {
        return NavResponse {
            ok: false,
            message: "navigator handle is poisoned".to_string(),
            route: String::new(),
            depth: 0,
            header: None,
        };
    };
    let (ok, message) = match f(&mut navigator) {
        Ok(()) => (true, String::new()),
        Err(message) => (false, message),
    };
    NavResponse {
        ok,
        message,
        route: navigator.current().as_str().to_string(),
        depth: navigator.depth() as u32,
        header: navigator.header().map(|header| HeaderDto {
            back_visible: header.back_visible,
            title: header.title,
        }),
    }
}

fn to_location_dto(location: Location) -> LocationDto {
    LocationDto {
        latitude: location.latitude,
        longitude: location.longitude,
        error_code: location.error_code,
    }
}

fn to_keystore_command_dto(command: KeystoreCommand) -> KeystoreCommandDto {
    match command {
        KeystoreCommand::Set { key, value } => KeystoreCommandDto {
            kind: "set".to_string(),
            key,
            value: Some(value),
        },
        KeystoreCommand::Remove { key } => KeystoreCommandDto {
            kind: "remove".to_string(),
            key,
            value: None,
        },
    }
}

fn to_push_command_dto(command: PushCommand) -> PushCommandDto {
    let mut dto = PushCommandDto {
        kind: String::new(),
        external_id: None,
        tags: Vec::new(),
        tag_keys: Vec::new(),
    };
    match command {
        PushCommand::SetExternalUserId(external_id) => {
            dto.kind = "set_external_user_id".to_string();
            dto.external_id = Some(external_id);
        }
        PushCommand::RemoveExternalUserId => {
            dto.kind = "remove_external_user_id".to_string();
        }
        PushCommand::SendTags(tags) => {
            dto.kind = "send_tags".to_string();
            dto.tags = tags
                .into_iter()
                .map(|(key, value)| PushTagDto { key, value })
                .collect();
        }
        PushCommand::DeleteTags(keys) => {
            dto.kind = "delete_tags".to_string();
            dto.tag_keys = keys;
        }
    }
    dto
}

#[cfg(test)]
mod tests {
    use super::{
        nav_go_back, nav_navigate, nav_open, nav_state, ping, session_apply_location,
        session_current_user_info, session_drain_keystore_commands, session_drain_push_commands,
        session_load_secondary_data, session_load_stored_data, session_open,
        session_restore_credentials, session_select_user, session_sign_out, session_snapshot,
        session_update_user_score, SessionHandle, SessionOpenRequest,
    };
    use guardioes_core::store::keys;
    use guardioes_core::{KeyValueStore, KvNamespace, SqliteKvStore};

    fn open(os: &str) -> (tempfile::TempDir, SessionHandle) {
        let dir = tempfile::tempdir().unwrap();
        let response = session_open(SessionOpenRequest {
            os: os.to_string(),
            os_version: "33".to_string(),
            db_path: dir.path().join("session.db").display().to_string(),
            api_url: "http://127.0.0.1:9".to_string(),
            locale: "en".to_string(),
        });
        assert!(response.ok, "{}", response.message);
        (dir, response.handle.expect("handle on success"))
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn session_open_rejects_unknown_os() {
        let response = session_open(SessionOpenRequest {
            os: "symbian".to_string(),
            os_version: String::new(),
            db_path: String::new(),
            api_url: String::new(),
            locale: String::new(),
        });
        assert!(!response.ok);
        assert!(response.handle.is_none());
        assert!(response.message.contains("symbian"));
    }

    #[test]
    fn load_then_sign_out_moves_root_view_to_sign_in() {
        let (_dir, handle) = open("android");
        assert_eq!(session_snapshot(&handle).root_view, "loader");

        let loaded = session_load_stored_data(&handle);
        assert_eq!(loaded.root_view, "app_stack");

        let signed_out = session_sign_out(&handle);
        assert_eq!(signed_out.root_view, "sign_in");
        let kinds = session_drain_push_commands(&handle)
            .into_iter()
            .map(|command| command.kind)
            .collect::<Vec<_>>();
        assert_eq!(kinds, vec!["remove_external_user_id", "delete_tags"]);
    }

    #[test]
    fn select_user_reports_unrecognized_profile() {
        let (_dir, handle) = open("ios");
        let response = session_select_user(&handle, "[1,2]".to_string());
        assert!(!response.ok);

        let response =
            session_select_user(&handle, r#"{"id":7,"description":"Avó"}"#.to_string());
        assert!(response.ok, "{}", response.message);
        let info = session_current_user_info(&handle).unwrap();
        assert!(info.is_household);
        assert_eq!(info.name.as_deref(), Some("Avó"));
    }

    #[test]
    fn apply_location_respects_denied_permission() {
        let (_dir, handle) = open("android");
        assert_eq!(
            session_apply_location(&handle, "denied".to_string(), Some(1.0), Some(2.0), None),
            None
        );

        let location =
            session_apply_location(&handle, "granted".to_string(), None, None, Some(3)).unwrap();
        assert_eq!(location.error_code, 3);
        assert_eq!(location.latitude, 0.0);
    }

    #[test]
    fn update_user_score_starts_streak_at_zero() {
        let (_dir, handle) = open("ios");
        let response = session_update_user_score(&handle);
        assert!(response.ok, "{}", response.message);
        assert_eq!(response.step, "reset");
        assert_eq!(response.score, 0);
        assert_eq!(session_drain_push_commands(&handle)[0].kind, "send_tags");
    }

    #[test]
    fn navigator_reports_header_and_back_at_root() {
        let navigator = nav_open("en".to_string());
        let root = nav_state(&navigator);
        assert_eq!(root.route, "HomeDrawer");
        assert!(root.header.is_none());

        let profiles = nav_navigate(&navigator, "Perfis".to_string());
        assert!(profiles.ok);
        assert_eq!(profiles.header.unwrap().title, "Profiles");

        assert!(nav_go_back(&navigator).ok);
        let at_root = nav_go_back(&navigator);
        assert!(!at_root.ok);
        assert_eq!(at_root.depth, 1);

        let unknown = nav_navigate(&navigator, "Nowhere".to_string());
        assert!(!unknown.ok);
        assert!(unknown.message.contains("Nowhere"));
    }

    #[test]
    fn missing_keystore_credentials_sign_out_without_network() {
        let (_dir, handle) = open("android");
        session_load_stored_data(&handle);

        let response = session_load_secondary_data(&handle);

        assert_eq!(response.outcome, "missing_credentials");
        assert_eq!(response.snapshot.root_view, "sign_in");
        let kinds = session_drain_keystore_commands(&handle)
            .into_iter()
            .map(|command| (command.kind, command.key))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                ("remove".to_string(), keys::USER_EMAIL.to_string()),
                ("remove".to_string(), keys::USER_PASSWORD.to_string()),
            ]
        );
    }

    #[test]
    fn restored_credentials_stay_out_of_the_database() {
        let (dir, handle) = open("ios");
        let restored = session_restore_credentials(
            &handle,
            Some("ana@example.org".to_string()),
            Some("pw".to_string()),
        );
        assert!(restored.ok, "{}", restored.message);
        assert!(session_drain_keystore_commands(&handle).is_empty());

        session_sign_out(&handle);
        let drained = session_drain_keystore_commands(&handle);
        assert_eq!(drained.len(), 2);
        assert!(drained.iter().all(|command| command.value.is_none()));

        let secure =
            SqliteKvStore::open(dir.path().join("session.db"), KvNamespace::Secure).unwrap();
        for key in keys::CREDENTIAL_KEYS {
            assert_eq!(secure.get_item(key).unwrap(), None);
        }
    }
}
