// src/session.rs
use crate::models::profile::{Profile, UserRole};
use crate::storage::memory::DirectoryStorage;
use crate::utils::{now_secs, RequestError};
use actix_web::HttpRequest;
use dashmap::DashMap;
use log::debug;

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub issued_at: u64,
}

/// Token-to-user map with explicit init (sign-in) and teardown (sign-out).
/// Passed down as shared state rather than living in a global.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl_secs: u64,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl_secs,
        }
    }

    pub fn issue(&self, user_id: &str) -> Session {
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            issued_at: now_secs(),
        };
        self.sessions.insert(session.token.clone(), session.clone());
        session
    }

    pub fn resolve(&self, token: &str) -> Option<Session> {
        let session = self.sessions.get(token).map(|r| r.value().clone())?;
        if now_secs() - session.issued_at >= self.ttl_secs {
            debug!("Dropping expired session for user {}", session.user_id);
            self.sessions.remove(token);
            return None;
        }
        Some(session)
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }
}

pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

/// Resolves the requesting user, or fails with Unauthorized.
pub fn current_user(
    req: &HttpRequest,
    sessions: &SessionStore,
    storage: &DirectoryStorage,
) -> Result<Profile, RequestError> {
    let token = bearer_token(req).ok_or(RequestError::Unauthorized)?;
    let session = sessions.resolve(&token).ok_or(RequestError::Unauthorized)?;
    storage
        .profile(&session.user_id)
        .ok_or(RequestError::Unauthorized)
}

/// Like `current_user` but tolerates anonymous requests.
pub fn optional_user(
    req: &HttpRequest,
    sessions: &SessionStore,
    storage: &DirectoryStorage,
) -> Option<Profile> {
    let token = bearer_token(req)?;
    let session = sessions.resolve(&token)?;
    storage.profile(&session.user_id)
}

pub fn require_admin(profile: &Profile) -> Result<(), RequestError> {
    if profile.role != UserRole::Admin {
        return Err(RequestError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn issue_resolve_revoke_roundtrip() {
        let store = SessionStore::new(3600);
        let session = store.issue("u1");
        assert_eq!(store.resolve(&session.token).unwrap().user_id, "u1");

        assert!(store.revoke(&session.token));
        assert!(store.resolve(&session.token).is_none());
        assert!(!store.revoke(&session.token));
    }

    #[test]
    fn zero_ttl_expires_immediately() {
        let store = SessionStore::new(0);
        let session = store.issue("u1");
        assert!(store.resolve(&session.token).is_none());
    }

    #[test]
    fn bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc-123"))
            .to_http_request();
        assert_eq!(bearer_token(&req).unwrap(), "abc-123");

        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic abc"))
            .to_http_request();
        assert!(bearer_token(&req).is_none());

        let req = TestRequest::default().to_http_request();
        assert!(bearer_token(&req).is_none());
    }
}
