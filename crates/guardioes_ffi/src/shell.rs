//! Port adapters backed by the mobile shell.
//!
//! # Responsibility
//! - Queue push-tagging commands for the shell's push SDK to replay.
//! - Feed location answers observed by the shell into the core port.
//! - Keep credentials in the platform keystore, never in the SQLite file.
//!
//! # Invariants
//! - Queued push and keystore commands keep call order.
//! - Adapters never panic on poisoned locks; they report an error instead.
//! - Keystore values are never printed by `Debug`.

use guardioes_core::platform::PlatformResult;
use guardioes_core::store::StoreResult;
use guardioes_core::{
    Coordinates, KeyValueStore, KvNamespace, LocationProvider, PermissionPrompt,
    PermissionStatus, PlatformError, PositionError, PositionOptions, PushTagger, PushTags,
    StoreError,
};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

/// One push SDK call for the shell to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PushCommand {
    SetExternalUserId(String),
    RemoveExternalUserId,
    SendTags(PushTags),
    DeleteTags(Vec<String>),
}

#[derive(Debug, Default)]
pub(crate) struct PushOutbox {
    queue: Mutex<Vec<PushCommand>>,
}

impl PushOutbox {
    /// Takes every queued command, oldest first.
    pub(crate) fn drain(&self) -> Vec<PushCommand> {
        match self.queue.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => Vec::new(),
        }
    }

    fn enqueue(&self, command: PushCommand) -> PlatformResult<()> {
        self.queue
            .lock()
            .map_err(|_| PlatformError::Device("push outbox poisoned".to_string()))?
            .push(command);
        Ok(())
    }
}

impl PushTagger for PushOutbox {
    fn set_external_user_id(&self, external_id: &str) -> PlatformResult<()> {
        self.enqueue(PushCommand::SetExternalUserId(external_id.to_string()))
    }

    fn remove_external_user_id(&self) -> PlatformResult<()> {
        self.enqueue(PushCommand::RemoveExternalUserId)
    }

    fn send_tags(&self, tags: &PushTags) -> PlatformResult<()> {
        self.enqueue(PushCommand::SendTags(tags.clone()))
    }

    fn delete_tags(&self, keys: &[&str]) -> PlatformResult<()> {
        self.enqueue(PushCommand::DeleteTags(
            keys.iter().map(|key| (*key).to_string()).collect(),
        ))
    }
}

/// What the shell observed when it asked the OS for location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ShellObservation {
    pub(crate) permission: PermissionStatus,
    pub(crate) fix: Result<Coordinates, PositionError>,
}

/// Location port answering from the latest shell observation.
#[derive(Debug, Default)]
pub(crate) struct ShellLocation {
    observation: Mutex<Option<ShellObservation>>,
}

impl ShellLocation {
    pub(crate) fn observe(&self, observation: ShellObservation) {
        if let Ok(mut slot) = self.observation.lock() {
            *slot = Some(observation);
        }
    }

    fn current(&self) -> PlatformResult<ShellObservation> {
        self.observation
            .lock()
            .map_err(|_| PlatformError::Device("location slot poisoned".to_string()))?
            .ok_or_else(|| PlatformError::Device("no location observation".to_string()))
    }
}

impl LocationProvider for ShellLocation {
    fn request_permission(&self, _prompt: &PermissionPrompt) -> PlatformResult<PermissionStatus> {
        Ok(self.current()?.permission)
    }

    fn current_position(&self, _options: &PositionOptions) -> Result<Coordinates, PositionError> {
        // Code 2 is POSITION_UNAVAILABLE in the geolocation error space.
        self.current()
            .map_err(|_| PositionError { code: 2 })?
            .fix
    }
}

/// One platform-keystore write for the shell to perform.
#[derive(Clone, PartialEq, Eq)]
pub(crate) enum KeystoreCommand {
    Set { key: String, value: String },
    Remove { key: String },
}

impl Debug for KeystoreCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Set { key, .. } => f
                .debug_struct("Set")
                .field("key", key)
                .field("value", &"<redacted>")
                .finish(),
            Self::Remove { key } => f.debug_struct("Remove").field("key", key).finish(),
        }
    }
}

#[derive(Default)]
struct KeystoreState {
    entries: BTreeMap<String, String>,
    pending: Vec<KeystoreCommand>,
}

/// `secure` store mirrored from the platform keystore.
///
/// Values live in memory only. The shell seeds them from its keystore at
/// startup and applies drained commands back to it.
#[derive(Clone, Default)]
pub(crate) struct ShellKeystore {
    state: Arc<Mutex<KeystoreState>>,
}

impl ShellKeystore {
    /// Loads a value read from the platform keystore; queues nothing.
    pub(crate) fn seed(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock()?.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Takes every queued keystore write, oldest first.
    pub(crate) fn drain(&self) -> Vec<KeystoreCommand> {
        match self.lock() {
            Ok(mut state) => std::mem::take(&mut state.pending),
            Err(_) => Vec::new(),
        }
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, KeystoreState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Poisoned(KvNamespace::Secure))
    }
}

impl Debug for ShellKeystore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellKeystore").finish_non_exhaustive()
    }
}

impl KeyValueStore for ShellKeystore {
    fn namespace(&self) -> KvNamespace {
        KvNamespace::Secure
    }

    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut state = self.lock()?;
        state.entries.insert(key.to_string(), value.to_string());
        state.pending.push(KeystoreCommand::Set {
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        let mut state = self.lock()?;
        state.entries.remove(key);
        state.pending.push(KeystoreCommand::Remove {
            key: key.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        KeystoreCommand, PushCommand, PushOutbox, ShellKeystore, ShellLocation, ShellObservation,
    };
    use guardioes_core::store::keys;
    use guardioes_core::{
        Coordinates, KeyValueStore, LocationProvider, PermissionPrompt, PermissionStatus,
        PositionError, PositionOptions, PushTagger, PushTags,
    };

    fn prompt() -> PermissionPrompt {
        PermissionPrompt {
            title: String::new(),
            message: String::new(),
            button_negative: String::new(),
            button_positive: String::new(),
        }
    }

    #[test]
    fn outbox_drains_in_call_order() {
        let outbox = PushOutbox::default();
        outbox.set_external_user_id("42").unwrap();
        outbox.send_tags(&PushTags::new()).unwrap();
        outbox.delete_tags(&["city"]).unwrap();

        let drained = outbox.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0], PushCommand::SetExternalUserId("42".to_string()));
        assert_eq!(drained[2], PushCommand::DeleteTags(vec!["city".to_string()]));
        assert!(outbox.drain().is_empty());
    }

    #[test]
    fn shell_location_without_observation_reports_unavailable() {
        let location = ShellLocation::default();
        assert!(location.request_permission(&prompt()).is_err());
        assert_eq!(
            location.current_position(&PositionOptions::default()),
            Err(PositionError { code: 2 })
        );
    }

    #[test]
    fn shell_location_replays_observation() {
        let location = ShellLocation::default();
        location.observe(ShellObservation {
            permission: PermissionStatus::Granted,
            fix: Ok(Coordinates {
                latitude: 1.0,
                longitude: 2.0,
            }),
        });
        assert_eq!(
            location.request_permission(&prompt()),
            Ok(PermissionStatus::Granted)
        );
        assert!(location.current_position(&PositionOptions::default()).is_ok());
    }

    #[test]
    fn keystore_serves_seeded_values_without_queuing() {
        let keystore = ShellKeystore::default();
        keystore.seed(keys::USER_EMAIL, "ana@example.org").unwrap();

        assert_eq!(
            keystore.get_item(keys::USER_EMAIL).unwrap().as_deref(),
            Some("ana@example.org")
        );
        assert!(keystore.drain().is_empty());
    }

    #[test]
    fn keystore_queues_writes_for_the_shell_in_order() {
        let keystore = ShellKeystore::default();
        let shared = keystore.clone();
        keystore.set_item(keys::USER_PASSWORD, "pw").unwrap();
        keystore.multi_remove(keys::CREDENTIAL_KEYS).unwrap();

        assert_eq!(shared.get_item(keys::USER_PASSWORD).unwrap(), None);
        assert_eq!(
            shared.drain(),
            vec![
                KeystoreCommand::Set {
                    key: keys::USER_PASSWORD.to_string(),
                    value: "pw".to_string(),
                },
                KeystoreCommand::Remove {
                    key: keys::USER_EMAIL.to_string(),
                },
                KeystoreCommand::Remove {
                    key: keys::USER_PASSWORD.to_string(),
                },
            ]
        );
    }

    #[test]
    fn keystore_debug_hides_values() {
        let command = KeystoreCommand::Set {
            key: keys::USER_PASSWORD.to_string(),
            value: "secret".to_string(),
        };
        assert!(!format!("{command:?}").contains("secret"));
    }
}
