//! Persisted session state and the global invalidation path.
//!
//! The web client this replaces kept three local-storage keys: `authToken`,
//! `apiKey`, and `user` (a JSON profile snapshot used as an optimistic cache
//! before revalidation). Here they live in one JSON session file with the
//! same key names. All reads go through an in-memory copy; writes persist
//! immediately so a crashed process never loses a login.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use inkpress_api_models::User;
use inkpress_events::{Event, EventBus};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ClientResult;

/// Serialized shape of the session file. Key names match the web client's
/// local-storage keys for compatibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
struct SessionData {
    #[serde(rename = "authToken", default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
    #[serde(rename = "apiKey", default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

impl SessionData {
    const fn is_empty(&self) -> bool {
        self.auth_token.is_none() && self.api_key.is_none() && self.user.is_none()
    }
}

struct Inner {
    path: PathBuf,
    state: Mutex<SessionData>,
    bus: EventBus,
}

/// Store for persisted credentials with explicit `get`/`set`/`clear`
/// operations and an invalidation broadcast.
///
/// Cloning is cheap; all clones share the same state and file.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Open (or create) a session store backed by the given file. A missing
    /// or unreadable file yields an empty session rather than an error: a
    /// corrupt cache should cost the user a login, not break the tool.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>, bus: EventBus) -> Self {
        let path = path.into();
        let state = load(&path);
        Self {
            inner: Arc::new(Inner {
                path,
                state: Mutex::new(state),
                bus,
            }),
        }
    }

    /// Path of the backing session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Bus that receives [`Event::SessionInvalidated`] broadcasts.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    /// Current bearer token, if a login is persisted.
    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        self.lock().auth_token.clone()
    }

    /// Current API key, if one was created and persisted.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.lock().api_key.clone()
    }

    /// Cached profile snapshot, used optimistically before revalidation.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    /// Whether any credential is currently persisted.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().auth_token.is_some()
    }

    /// Persist the bearer token after a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    pub fn set_auth_token(&self, token: impl Into<String>) -> ClientResult<()> {
        self.update(|state| state.auth_token = Some(token.into()))
    }

    /// Persist the API key after a successful key creation.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    pub fn set_api_key(&self, key: impl Into<String>) -> ClientResult<()> {
        self.update(|state| state.api_key = Some(key.into()))
    }

    /// Persist (or refresh) the cached profile snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    pub fn set_user(&self, user: User) -> ClientResult<()> {
        self.update(|state| state.user = Some(user))
    }

    /// Drop the bearer token and profile snapshot after a logout. A created
    /// API key outlives the login session, matching the original client.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    pub fn clear_login(&self) -> ClientResult<()> {
        self.update(|state| {
            state.auth_token = None;
            state.user = None;
        })
    }

    /// Drop every persisted credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written.
    pub fn clear_all(&self) -> ClientResult<()> {
        self.update(|state| *state = SessionData::default())
    }

    /// Global 401 side effect: clear all persisted auth state and broadcast
    /// [`Event::SessionInvalidated`]. The broadcast fires only when there
    /// was something to clear, so racing 401s from parallel calls collapse
    /// into one notification.
    pub fn invalidate(&self) {
        let had_credentials = {
            let mut state = self.lock();
            let had = !state.is_empty();
            *state = SessionData::default();
            had
        };

        if had_credentials {
            if let Err(err) = self.persist() {
                warn!(error = %err, "failed to remove invalidated session file");
            }
            debug!("session invalidated; credentials cleared");
            self.inner.bus.publish(Event::SessionInvalidated);
        }
    }

    fn update(&self, apply: impl FnOnce(&mut SessionData)) -> ClientResult<()> {
        {
            let mut state = self.lock();
            apply(&mut state);
        }
        self.persist()
    }

    fn persist(&self) -> ClientResult<()> {
        let state = self.lock().clone();
        if state.is_empty() {
            match std::fs::remove_file(&self.inner.path) {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
                Err(err) => return Err(err.into()),
            }
        }
        if let Some(parent) = self.inner.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(&state).map_err(std::io::Error::other)?;
        std::fs::write(&self.inner.path, payload)?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.inner.state.lock().expect("session mutex poisoned")
    }
}

fn load(path: &Path) -> SessionData {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "discarding unreadable session file");
            SessionData::default()
        }),
        Err(_) => SessionData::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u-1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            role: "user".into(),
            is_email_verified: Some(true),
            balance: None,
            free_operations_used: None,
            free_operations_remaining: None,
            created_at: None,
        }
    }

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SessionStore::open(dir.path().join("session.json"), EventBus::new());
        (dir, store)
    }

    #[test]
    fn round_trips_through_the_session_file() {
        let (dir, store) = temp_store();
        store.set_auth_token("tok-1").expect("persist token");
        store.set_api_key("key-1").expect("persist key");
        store.set_user(sample_user()).expect("persist user");

        let reopened = SessionStore::open(store.path(), EventBus::new());
        assert_eq!(reopened.auth_token().as_deref(), Some("tok-1"));
        assert_eq!(reopened.api_key().as_deref(), Some("key-1"));
        assert_eq!(reopened.user().expect("cached user").name, "Ada");
        drop(dir);
    }

    #[test]
    fn session_file_uses_the_compat_key_names() {
        let (dir, store) = temp_store();
        store.set_auth_token("tok-1").expect("persist token");
        store.set_api_key("key-1").expect("persist key");

        let raw = std::fs::read_to_string(store.path()).expect("session file exists");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid JSON");
        assert_eq!(value["authToken"], "tok-1");
        assert_eq!(value["apiKey"], "key-1");
        drop(dir);
    }

    #[test]
    fn logout_keeps_the_api_key() {
        let (dir, store) = temp_store();
        store.set_auth_token("tok-1").expect("persist token");
        store.set_api_key("key-1").expect("persist key");
        store.set_user(sample_user()).expect("persist user");

        store.clear_login().expect("clear login");
        assert!(store.auth_token().is_none());
        assert!(store.user().is_none());
        assert_eq!(store.api_key().as_deref(), Some("key-1"));
        drop(dir);
    }

    #[tokio::test]
    async fn invalidate_clears_everything_and_broadcasts_once() {
        let (dir, store) = temp_store();
        let mut stream = store.bus().subscribe(None);
        store.set_auth_token("tok-1").expect("persist token");
        store.set_api_key("key-1").expect("persist key");

        store.invalidate();
        store.invalidate();

        assert!(store.auth_token().is_none());
        assert!(store.api_key().is_none());
        assert!(!store.path().exists());

        let first = stream.try_next().expect("one broadcast");
        assert_eq!(first.event, Event::SessionInvalidated);
        assert!(stream.try_next().is_none(), "second invalidate is silent");
        drop(dir);
    }

    #[test]
    fn corrupt_session_file_degrades_to_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").expect("write garbage");

        let store = SessionStore::open(&path, EventBus::new());
        assert!(store.auth_token().is_none());
        assert!(!store.is_authenticated());
    }
}
