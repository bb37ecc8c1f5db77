use std::sync::Arc;

use tokio::sync::RwLock;

use crate::errors::{AuthError, GatewayError};
use crate::gateway::{ApiRequest, BackendGateway, CURRENT_USER_PATH, LOGIN_PATH};
use crate::models::user_model::{LoginRequest, UserProfile};
use crate::models::user_session_model::{Session, SessionState, TokenPair};
use crate::session::store::SessionStore;

pub const LOGIN_FALLBACK_MESSAGE: &str = "Unable to sign in";

/// How a restored session ended up after boot resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    /// Nothing was persisted.
    Empty,
    Restored,
    /// The persisted credential did not resolve; the store was cleared.
    Invalidated,
    /// A logout or new login happened while resolving; the result was dropped.
    Superseded,
}

/// Negotiates credentials with the backend and fills the session store.
pub struct Authenticator {
    gateway: Arc<dyn BackendGateway>,
    session: Arc<RwLock<SessionStore>>,
}

impl Authenticator {
    pub fn new(gateway: Arc<dyn BackendGateway>, session: Arc<RwLock<SessionStore>>) -> Self {
        Self { gateway, session }
    }

    /// Exchanges `identifier`/`secret` for a token pair, then resolves the
    /// profile with the new access token.
    ///
    /// A failed profile lookup does not fail the login: the user gets in as
    /// `CLIENTE` with `identifier` as email.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Session, AuthError> {
        let credential = self.exchange(identifier, secret).await?;

        let profile = match self.fetch_profile(&credential.access).await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(
                    user = identifier,
                    "signed in with a default CLIENTE profile: {}",
                    err
                );
                UserProfile::degraded(identifier)
            }
        };

        self.session
            .write()
            .await
            .save(credential.clone(), profile.clone())?;
        tracing::info!(user = %profile.email, role = %profile.role, "signed in");
        Ok(Session::resolved(credential, profile))
    }

    /// Drops the session locally. The backend is not told.
    pub async fn logout(&self) {
        let mut store = self.session.write().await;
        let was_signed_in = store.is_authenticated();
        if let Err(err) = store.clear() {
            tracing::error!("session file could not be cleared: {}", err);
        }
        if was_signed_in {
            tracing::info!("signed out");
        }
    }

    /// Restores the persisted session and puts it in the loading state.
    pub async fn begin_boot(&self) -> Option<Session> {
        let mut store = self.session.write().await;
        match store.restore() {
            Ok(Some(session)) => {
                store.mark_resolving(session.credential.clone());
                Some(session)
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("persisted session unreadable, starting signed out: {}", err);
                if let Err(err) = store.clear() {
                    tracing::error!("session file could not be cleared: {}", err);
                }
                None
            }
        }
    }

    /// Attaches a profile to a restored session, fetching it when none was
    /// cached. Any failure signs the user out without surfacing an error.
    pub async fn finish_boot(&self, session: Option<Session>) -> BootOutcome {
        let Some(session) = session else {
            return BootOutcome::Empty;
        };
        let credential = session.credential;

        let resolved = match session.profile {
            Some(profile) => Ok(profile),
            None => self.fetch_profile(&credential.access).await,
        };

        let mut store = self.session.write().await;
        let still_pending = matches!(store.state(), SessionState::Resolving(pending) if *pending == credential);

        match resolved {
            Ok(profile) => match store.complete_resolution(&credential, profile) {
                Ok(true) => BootOutcome::Restored,
                Ok(false) => BootOutcome::Superseded,
                Err(err) => {
                    tracing::warn!("restored session could not be saved: {}", err);
                    invalidate(&mut store);
                    BootOutcome::Invalidated
                }
            },
            Err(err) if still_pending => {
                tracing::info!("{}: {}", AuthError::SessionInvalid, err);
                invalidate(&mut store);
                BootOutcome::Invalidated
            }
            Err(_) => BootOutcome::Superseded,
        }
    }

    async fn exchange(&self, identifier: &str, secret: &str) -> Result<TokenPair, AuthError> {
        let body = LoginRequest {
            username: identifier.to_string(),
            password: secret.to_string(),
        };
        let request = ApiRequest::post(LOGIN_PATH)
            .json(&body)
            .map_err(|err| AuthError::Credential(err.login_message(LOGIN_FALLBACK_MESSAGE)))?;

        let answer = self.gateway.send(request).await.map_err(|err| {
            tracing::info!(user = identifier, "credential exchange refused: {}", err);
            AuthError::Credential(err.login_message(LOGIN_FALLBACK_MESSAGE))
        })?;

        serde_json::from_value::<TokenPair>(answer).map_err(|err| {
            tracing::warn!("login answer without a token pair: {}", err);
            AuthError::Credential(LOGIN_FALLBACK_MESSAGE.to_string())
        })
    }

    async fn fetch_profile(&self, access: &str) -> Result<UserProfile, AuthError> {
        let request = ApiRequest::get(CURRENT_USER_PATH).bearer(Some(access));
        let answer = self
            .gateway
            .send(request)
            .await
            .map_err(AuthError::ProfileResolution)?;
        serde_json::from_value(answer)
            .map_err(|err| AuthError::ProfileResolution(GatewayError::Decode(err.to_string())))
    }
}

fn invalidate(store: &mut SessionStore) {
    if let Err(err) = store.clear() {
        tracing::error!("session file could not be cleared: {}", err);
    }
}
