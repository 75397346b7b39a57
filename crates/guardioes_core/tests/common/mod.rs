#![allow(dead_code)]

use guardioes_core::platform::auth::AuthBody;
use guardioes_core::platform::PlatformResult;
use guardioes_core::store::StoreResult;
use guardioes_core::{
    AuthClient, AuthRequest, AuthResponse, AuthenticatedUser, Clock, Coordinates, KeyValueStore,
    KvNamespace, LocationProvider, MemoryKvStore, Os, PermissionPrompt, PermissionStatus,
    PlatformError, PlatformInfo, PositionError, PositionOptions, PushTagger, PushTags,
    SessionConfig, SessionPorts, SessionService,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
pub const NOW_MS: i64 = 1_760_000_000_000;

/// Store handle the test keeps while the service owns a clone.
#[derive(Clone)]
pub struct SharedStore(pub Arc<MemoryKvStore>);

impl SharedStore {
    pub fn new(namespace: KvNamespace) -> Self {
        Self(Arc::new(MemoryKvStore::new(namespace)))
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.0.get_item(key).unwrap()
    }

    pub fn put(&self, key: &str, value: &str) {
        self.0.set_item(key, value).unwrap();
    }

    pub fn get_json(&self, key: &str) -> Option<Value> {
        self.get(key).map(|raw| serde_json::from_str(&raw).unwrap())
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.keys().unwrap()
    }
}

impl KeyValueStore for SharedStore {
    fn namespace(&self) -> KvNamespace {
        self.0.namespace()
    }

    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        self.0.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.0.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.0.remove_item(key)
    }
}

/// Auth endpoint answering from a script, one response per call.
#[derive(Default)]
pub struct ScriptedAuth {
    responses: Mutex<VecDeque<PlatformResult<AuthResponse>>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedAuth {
    pub fn push(&self, response: PlatformResult<AuthResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

impl AuthClient for ScriptedAuth {
    fn authenticate(&self, request: &AuthRequest) -> PlatformResult<AuthResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((request.email.clone(), request.password.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PlatformError::Transport("no scripted response".into())))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PushCall {
    SetExternalId(String),
    RemoveExternalId,
    SendTags(PushTags),
    DeleteTags(Vec<String>),
}

#[derive(Default)]
pub struct RecordingPush {
    calls: Mutex<Vec<PushCall>>,
}

impl RecordingPush {
    pub fn calls(&self) -> Vec<PushCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: PushCall) -> PlatformResult<()> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl PushTagger for RecordingPush {
    fn set_external_user_id(&self, external_id: &str) -> PlatformResult<()> {
        self.record(PushCall::SetExternalId(external_id.to_string()))
    }

    fn remove_external_user_id(&self) -> PlatformResult<()> {
        self.record(PushCall::RemoveExternalId)
    }

    fn send_tags(&self, tags: &PushTags) -> PlatformResult<()> {
        self.record(PushCall::SendTags(tags.clone()))
    }

    fn delete_tags(&self, keys: &[&str]) -> PlatformResult<()> {
        self.record(PushCall::DeleteTags(
            keys.iter().map(|key| key.to_string()).collect(),
        ))
    }
}

pub struct FakeLocation {
    pub permission: Mutex<PlatformResult<PermissionStatus>>,
    pub position: Mutex<Result<Coordinates, PositionError>>,
    pub prompts: Mutex<Vec<PermissionPrompt>>,
    pub fix_requests: Mutex<Vec<PositionOptions>>,
}

impl Default for FakeLocation {
    fn default() -> Self {
        Self {
            permission: Mutex::new(Ok(PermissionStatus::Granted)),
            position: Mutex::new(Ok(Coordinates {
                latitude: -15.79,
                longitude: -47.88,
            })),
            prompts: Mutex::new(Vec::new()),
            fix_requests: Mutex::new(Vec::new()),
        }
    }
}

impl LocationProvider for FakeLocation {
    fn request_permission(&self, prompt: &PermissionPrompt) -> PlatformResult<PermissionStatus> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.permission.lock().unwrap().clone()
    }

    fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, PositionError> {
        self.fix_requests.lock().unwrap().push(*options);
        *self.position.lock().unwrap()
    }
}

pub struct FixedClock(pub AtomicI64);

impl FixedClock {
    pub fn at(epoch_ms: i64) -> Self {
        Self(AtomicI64::new(epoch_ms))
    }

    pub fn set(&self, epoch_ms: i64) {
        self.0.store(epoch_ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_epoch_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Service plus handles on every fake it was built with.
pub struct Harness {
    pub service: SessionService,
    pub storage: SharedStore,
    pub secure: SharedStore,
    pub auth: Arc<ScriptedAuth>,
    pub push: Arc<RecordingPush>,
    pub location: Arc<FakeLocation>,
    pub clock: Arc<FixedClock>,
}

pub fn harness(os: Os) -> Harness {
    let storage = SharedStore::new(KvNamespace::Local);
    let secure = SharedStore::new(KvNamespace::Secure);
    let auth = Arc::new(ScriptedAuth::default());
    let push = Arc::new(RecordingPush::default());
    let location = Arc::new(FakeLocation::default());
    let clock = Arc::new(FixedClock::at(NOW_MS));

    let ports = SessionPorts {
        storage: Box::new(storage.clone()),
        secure_storage: Box::new(secure.clone()),
        auth: auth.clone(),
        push: push.clone(),
        location: location.clone(),
        clock: clock.clone(),
    };
    let version = match os {
        Os::Android => "33",
        Os::Ios => "17.4",
    };
    let config = SessionConfig::new(PlatformInfo::new(os, version)).with_locale("en");

    Harness {
        service: SessionService::new(ports, config),
        storage,
        secure,
        auth,
        push,
        location,
        clock,
    }
}

/// User payload as the API returns it.
pub fn api_user() -> Value {
    json!({
        "id": 42,
        "user_name": "Ana",
        "city": "Brasília",
        "group": "/brasil/df/unb/fga",
        "school_unit_id": 1203,
        "birthdate": "1990-05-01",
        "households": [
            { "id": 7, "description": "Avó", "kinship": "avó", "user": { "id": 42 } }
        ],
        "app": { "app_name": "guardioes", "id": 1 }
    })
}

pub fn ok_response(user: Value) -> PlatformResult<AuthResponse> {
    let user: AuthenticatedUser = serde_json::from_value(user).unwrap();
    Ok(AuthResponse {
        status: 200,
        token: Some("Bearer token-1".to_string()),
        body: Some(AuthBody { user }),
    })
}

pub fn status_response(status: u16) -> PlatformResult<AuthResponse> {
    Ok(AuthResponse::status_only(status))
}
