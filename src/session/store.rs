use crate::errors::StoreError;
use crate::models::user_model::UserProfile;
use crate::models::user_session_model::{Session, SessionState, TokenPair};
use crate::session::storage::{SessionStorage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};

const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

/// Session held in memory plus its persisted copy.
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    state: SessionState,
}

impl SessionStore {
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        Self {
            storage,
            state: SessionState::Anonymous,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Reads the persisted session without touching the in-memory state.
    ///
    /// A cached profile that no longer parses is dropped, leaving the session
    /// to be resolved against the backend.
    pub fn restore(&self) -> Result<Option<Session>, StoreError> {
        let Some(access) = self.storage.get(ACCESS_TOKEN_KEY)? else {
            return Ok(None);
        };
        let refresh = self.storage.get(REFRESH_TOKEN_KEY)?.unwrap_or_default();
        let profile = match self.storage.get(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) => Some(profile),
                Err(err) => {
                    tracing::warn!("ignoring unreadable cached profile: {}", err);
                    None
                }
            },
            None => None,
        };
        Ok(Some(Session {
            credential: TokenPair { access, refresh },
            profile,
        }))
    }

    /// Enters the loading state for a restored credential.
    pub fn mark_resolving(&mut self, credential: TokenPair) {
        self.state = SessionState::Resolving(credential);
    }

    pub fn save(&mut self, credential: TokenPair, profile: UserProfile) -> Result<(), StoreError> {
        let user = serde_json::to_string(&profile)?;
        self.storage.set_many(&[
            (ACCESS_TOKEN_KEY, credential.access.clone()),
            (REFRESH_TOKEN_KEY, credential.refresh.clone()),
            (USER_KEY, user),
        ])?;
        self.state = SessionState::Authenticated(credential, profile);
        Ok(())
    }

    /// Attaches a profile to the credential being resolved.
    ///
    /// Returns `false` and changes nothing when the store moved on meanwhile
    /// (logout or another login), so a late answer cannot revive a session.
    pub fn complete_resolution(
        &mut self,
        credential: &TokenPair,
        profile: UserProfile,
    ) -> Result<bool, StoreError> {
        match &self.state {
            SessionState::Resolving(pending) if pending == credential => {
                self.save(credential.clone(), profile)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Forgets the session. The in-memory state is reset even when the
    /// persisted copy could not be removed; an error then means the file may
    /// still hold the credential and the next boot would restore it.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.state = SessionState::Anonymous;
        self.storage.remove_many(&SESSION_KEYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user_model::Role;
    use crate::session::storage::MemoryStorage;

    fn tokens() -> TokenPair {
        TokenPair {
            access: "T1".to_string(),
            refresh: "T2".to_string(),
        }
    }

    fn agent() -> UserProfile {
        UserProfile {
            id: Some(9),
            email: "a@x.com".to_string(),
            display_name: None,
            role: Role::Agente,
        }
    }

    #[test]
    fn restore_is_idempotent() {
        let mut store = SessionStore::new(Box::new(MemoryStorage::new()));
        store.save(tokens(), agent()).unwrap();

        let first = store.restore().unwrap();
        let second = store.restore().unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Some(Session::resolved(tokens(), agent())));
    }

    #[test]
    fn clear_leaves_nothing_behind() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::new(Box::new(storage));
        store.save(tokens(), agent()).unwrap();
        assert!(store.is_authenticated());

        store.clear().unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(store.state(), &SessionState::Anonymous);
        assert_eq!(store.restore().unwrap(), None);
    }

    #[test]
    fn token_without_profile_restores_unresolved() {
        let storage = MemoryStorage::new();
        storage
            .set_many(&[(ACCESS_TOKEN_KEY, "T1".to_string())])
            .unwrap();
        let store = SessionStore::new(Box::new(storage));

        let session = store.restore().unwrap().unwrap();
        assert!(session.profile.is_none());
        assert_eq!(session.credential.refresh, "");
        assert!(!store.is_authenticated());
    }

    #[test]
    fn unreadable_profile_is_dropped() {
        let storage = MemoryStorage::new();
        storage
            .set_many(&[
                (ACCESS_TOKEN_KEY, "T1".to_string()),
                (USER_KEY, "{\"email\":\"a@x.com\",\"rol_usuario\":\"ROOT\"}".to_string()),
            ])
            .unwrap();
        let store = SessionStore::new(Box::new(storage));
        assert_eq!(store.restore().unwrap().unwrap().profile, None);
    }

    #[test]
    fn late_resolution_after_logout_is_discarded() {
        let mut store = SessionStore::new(Box::new(MemoryStorage::new()));
        store.mark_resolving(tokens());
        store.clear().unwrap();

        let applied = store.complete_resolution(&tokens(), agent()).unwrap();
        assert!(!applied);
        assert!(!store.is_authenticated());
        assert_eq!(store.restore().unwrap(), None);
    }
}
