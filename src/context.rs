use std::sync::Arc;

use tokio::sync::RwLock;

use crate::gateway::BackendGateway;
use crate::models::user_session_model::SessionState;
use crate::session::authenticator::Authenticator;
use crate::session::store::SessionStore;

/// Everything a screen needs, handed to handlers through `Extension`.
///
/// The session lives here and nowhere else; nothing reads it through a
/// global.
#[derive(Clone)]
pub struct AppContext {
    pub gateway: Arc<dyn BackendGateway>,
    pub session: Arc<RwLock<SessionStore>>,
}

impl AppContext {
    pub fn new(gateway: Arc<dyn BackendGateway>, store: SessionStore) -> Self {
        Self {
            gateway,
            session: Arc::new(RwLock::new(store)),
        }
    }

    /// Copy of the current session state. The lock is released on return.
    pub async fn session_state(&self) -> SessionState {
        self.session.read().await.state().clone()
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.gateway.clone(), self.session.clone())
    }
}
