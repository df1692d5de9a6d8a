//! Session store: who is logged in, and the token that proves it.
//!
//! SYSTEM CONTEXT
//! ==============
//! Created once at process start and handed to every page that needs to know
//! the current user. Pages read the state through `state()` or a `subscribe()`
//! receiver; only the store mutates it.
//!
//! DESIGN
//! ======
//! Three phases: `Anonymous`, `Restoring` (a stored token is being checked),
//! `Authenticated`. An identity is only ever set from a successful
//! `GET /auth/me` whose body names the user. A rejected token, a transport
//! failure and a body with no identity all clear the stored token and land
//! in `Anonymous`. Nothing is retried.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tokio::sync::watch;

use super::route::Route;
use crate::net::api;
use crate::net::http::{ApiClient, ApiError};
use crate::net::types::{Credentials, UserIdentity};
use crate::util::storage::StorageError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    #[default]
    Anonymous,
    Restoring,
    Authenticated,
}

/// Snapshot published to subscribers on every transition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub identity: Option<UserIdentity>,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    fn authenticated(identity: UserIdentity) -> Self {
        Self {
            phase: SessionPhase::Authenticated,
            identity: Some(identity),
        }
    }

    fn restoring() -> Self {
        Self {
            phase: SessionPhase::Restoring,
            identity: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("token storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Owner of the current identity and its persisted token.
#[derive(Debug)]
pub struct SessionStore {
    api: ApiClient,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    /// New anonymous store. Call [`SessionStore::restore`] once afterwards.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { api, state }
    }

    /// Client sharing this store's token storage.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    #[must_use]
    pub fn identity(&self) -> Option<UserIdentity> {
        self.state.borrow().identity.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Receiver notified on every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Re-establish identity from a token left by a previous run.
    ///
    /// With no stored token this makes no request. Any failure removes the
    /// token and leaves the session anonymous.
    pub async fn restore(&self) -> SessionPhase {
        let Some(token) = self.api.tokens().load() else {
            tracing::debug!("no stored token; session stays anonymous");
            self.publish(SessionState::default());
            return SessionPhase::Anonymous;
        };

        self.publish(SessionState::restoring());
        match api::me_with_token(&self.api, &token).await {
            Ok(identity) => {
                tracing::info!(user = identity.display_name(), "session restored");
                self.publish(SessionState::authenticated(identity));
                SessionPhase::Authenticated
            }
            Err(error) => {
                tracing::info!(%error, "stored token rejected; clearing session");
                self.discard_token();
                self.publish(SessionState::default());
                SessionPhase::Anonymous
            }
        }
    }

    /// Persist `token` and confirm it against the identity endpoint.
    ///
    /// On success the session is authenticated and the caller should navigate
    /// to [`Route::Portal`]. On failure the token is removed and the session
    /// is anonymous.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the token cannot be persisted, or the
    /// identity lookup's [`ApiError`].
    pub async fn login(&self, token: &str) -> Result<UserIdentity, SessionError> {
        if let Err(error) = self.api.tokens().save(token) {
            self.publish(SessionState::default());
            return Err(error.into());
        }

        match api::me_with_token(&self.api, token).await {
            Ok(identity) => {
                tracing::info!(user = identity.display_name(), "logged in");
                self.publish(SessionState::authenticated(identity.clone()));
                Ok(identity)
            }
            Err(error) => {
                tracing::warn!(%error, "identity lookup failed after login");
                self.discard_token();
                self.publish(SessionState::default());
                Err(error.into())
            }
        }
    }

    /// Exchange credentials for a token, then [`SessionStore::login`] with it.
    ///
    /// Wrong credentials leave storage and state untouched.
    ///
    /// # Errors
    ///
    /// Returns the login endpoint's [`ApiError`], or any error from
    /// [`SessionStore::login`].
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<UserIdentity, SessionError> {
        let credentials = Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        let token = api::login(&self.api, &credentials).await?;
        self.login(&token.access_token).await
    }

    /// Forget the token and identity. Returns where to navigate next.
    ///
    /// The in-memory session is cleared even if removing the token fails.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the token could not be removed.
    pub fn logout(&self) -> Result<Route, SessionError> {
        let cleared = self.api.tokens().clear();
        self.publish(SessionState::default());
        tracing::info!("logged out");
        cleared?;
        Ok(Route::Login)
    }

    /// Re-fetch the identity for the current token, e.g. after a profile
    /// edit. A rejected token ends the session.
    ///
    /// # Errors
    ///
    /// Returns the identity lookup's [`ApiError`].
    pub async fn reload(&self) -> Result<UserIdentity, ApiError> {
        match api::me(&self.api).await {
            Ok(identity) => {
                self.publish(SessionState::authenticated(identity.clone()));
                Ok(identity)
            }
            Err(error) => {
                self.handle_error(&error);
                Err(error)
            }
        }
    }

    /// Let a page report a failed request. A 401 means the token is no
    /// longer valid: the session is cleared and `true` is returned. Any other
    /// error leaves the session alone.
    pub fn handle_error(&self, error: &ApiError) -> bool {
        if !error.is_unauthorized() {
            return false;
        }
        tracing::info!(%error, "request rejected as unauthorized; clearing session");
        self.discard_token();
        self.publish(SessionState::default());
        true
    }

    fn publish(&self, next: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    fn discard_token(&self) {
        if let Err(error) = self.api.tokens().clear() {
            tracing::warn!(%error, "failed to remove stored token");
        }
    }
}
