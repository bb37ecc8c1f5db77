use serde::{Deserialize, Serialize};

use crate::models::user_model::{Role, UserProfile};

/// Token pair issued by the backend login endpoint.
///
/// Both values are opaque. The refresh token is kept alongside the access token
/// but nothing renews the access token with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// A credential and, once resolved, the profile it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub credential: TokenPair,
    pub profile: Option<UserProfile>,
}

impl Session {
    pub fn resolved(credential: TokenPair, profile: UserProfile) -> Self {
        Self {
            credential,
            profile: Some(profile),
        }
    }
}

/// In-memory session as seen by the access policy.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    /// A credential was found but its profile is not attached yet.
    Resolving(TokenPair),
    Authenticated(TokenPair, UserProfile),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(..))
    }

    pub fn role(&self) -> Option<Role> {
        self.profile().map(|profile| profile.role)
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match self {
            SessionState::Authenticated(_, profile) => Some(profile),
            _ => None,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Resolving(credential) | SessionState::Authenticated(credential, _) => {
                Some(credential.access.as_str())
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Anonymous => "anonymous",
            SessionState::Resolving(_) => "resolving",
            SessionState::Authenticated(..) => "authenticated",
        }
    }
}

/// What `GET /session` reports.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub state: &'static str,
    pub user: Option<UserProfile>,
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        Self {
            state: state.label(),
            user: state.profile().cloned(),
        }
    }
}
