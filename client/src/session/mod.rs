//! Client-side session: the auth token and the cached user profile
//!
//! The session lives in memory for fast reads and is mirrored into a
//! [`KeyValueStore`] so that it survives restarts. The token and the user are
//! always written and cleared together; a user is never held without a token.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use common_types::User;
use session_storage::{KeyValueStore, StorageError};
use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Errors that can occur while updating the persisted session
#[derive(Debug, Error)]
pub enum SessionError {
    /// The durable storage rejected the new session
    #[error("Failed to persist session: {0}")]
    Persist(StorageError),

    /// The durable storage could not forget the session
    #[error("Failed to clear session: {0}")]
    Clear(StorageError),

    /// The user profile could not be encoded for storage
    #[error("Failed to encode user profile: {0}")]
    Encode(String),
}

/// Keys under which the session is persisted
#[derive(Debug, Clone, Copy, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SessionKey {
    /// Raw token string
    Token,
    /// JSON-encoded [`User`]
    User,
}

impl SessionKey {
    /// Storage key as a string
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Snapshot of the authentication state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    /// Credential for authenticated requests
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Last-known profile of the logged-in user
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether a token is held
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Owner of the current session, shared by reference between the gateway and its callers
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<Session>,
}

impl SessionStore {
    /// Restores the persisted session, if any
    ///
    /// Unreadable storage is not an error: the session simply starts
    /// unauthenticated.
    #[must_use]
    pub fn initialize(storage: Arc<dyn KeyValueStore>) -> Self {
        let session = load(storage.as_ref()).unwrap_or_else(|err| {
            tracing::warn!("Failed to load persisted session, starting unauthenticated: {err}");
            Session::default()
        });

        if session.is_authenticated() {
            tracing::debug!(
                username = session.user().map(|u| u.username.as_str()),
                "Restored persisted session"
            );
        }

        Self {
            storage,
            state: RwLock::new(session),
        }
    }

    /// Current token, if authenticated
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// Cached profile of the logged-in user
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Whether a token is held
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    /// Copy of the whole session
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    /// Replaces the session with `token` and `user` and persists both
    ///
    /// Storage is written first in a single atomic step; the in-memory session
    /// only changes once that succeeded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session cannot be persisted, in which case
    /// the previous session stays in place
    pub fn set_session(&self, token: String, user: User) -> Result<(), SessionError> {
        let encoded_user =
            serde_json::to_string(&user).map_err(|e| SessionError::Encode(e.to_string()))?;

        let mut state = self.write();
        self.storage
            .put_all(&[
                (SessionKey::Token.as_str(), token.clone()),
                (SessionKey::User.as_str(), encoded_user),
            ])
            .map_err(SessionError::Persist)?;

        *state = Session {
            token: Some(token),
            user: Some(user),
        };
        Ok(())
    }

    /// Forgets the session in memory and in storage; safe to repeat
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the persisted copy cannot be removed. The
    /// in-memory session is cleared regardless.
    pub fn clear(&self) -> Result<(), SessionError> {
        let mut state = self.write();
        *state = Session::default();

        self.storage
            .remove_all(&[SessionKey::Token.as_str(), SessionKey::User.as_str()])
            .map_err(SessionError::Clear)?;
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load(storage: &dyn KeyValueStore) -> Result<Session, StorageError> {
    let token = storage
        .get(SessionKey::Token.as_str())?
        .filter(|token| !token.is_empty());

    // A user without a token is discarded
    let Some(token) = token else {
        return Ok(Session::default());
    };

    let user = storage
        .get(SessionKey::User.as_str())?
        .and_then(|raw| match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!("Ignoring unreadable cached user profile: {err}");
                None
            }
        });

    Ok(Session {
        token: Some(token),
        user,
    })
}
