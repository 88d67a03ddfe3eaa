use crate::models::profile::{Credential, Profile, UserRole};
use crate::session::{bearer_token, current_user, SessionStore};
use crate::storage::memory::DirectoryStorage;
use crate::utils::{extract_peer_ip, now_secs, RequestError, SubmitLimiter};
use actix_web::{web, HttpRequest, HttpResponse};
use log::{error, info};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
struct SessionResponse {
    token: String,
    profile: Profile,
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(64);
    for byte in digest {
        write!(&mut out, "{:02x}", byte).unwrap();
    }
    out
}

/// Shared by the signup handler and the startup admin bootstrap.
pub fn create_account(
    storage: &DirectoryStorage,
    username: &str,
    password: &str,
    email: Option<String>,
    role: UserRole,
) -> Result<Profile, String> {
    if username.len() < 3 || username.len() > 24 {
        return Err("Invalid username: must be 3-24 chars".to_string());
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err("Invalid username: only a-z, 0-9 and underscore".to_string());
    }
    if password.len() < 8 {
        return Err("Invalid password: must be at least 8 chars".to_string());
    }

    let profile = Profile {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        email,
        role,
        bio: None,
        created_at: now_secs(),
    };
    let salt = uuid::Uuid::new_v4().to_string();
    let credential = Credential {
        user_id: profile.id.clone(),
        password_hash: hash_password(&salt, password),
        salt,
    };
    storage.add_profile(profile.clone(), credential)?;
    Ok(profile)
}

pub async fn signup(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    body: web::Json<SignupRequest>,
    rate_limiter: web::Data<SubmitLimiter>,
) -> Result<HttpResponse, RequestError> {
    let peer_ip = extract_peer_ip(&req)?;
    if !rate_limiter.0.check_key(&peer_ip).is_ok() {
        error!("Rate limit exceeded for signup for ip: {}", peer_ip);
        return Err(RequestError::RateLimitExceeded);
    }

    let body = body.into_inner();
    let profile = match create_account(
        &storage,
        &body.username,
        &body.password,
        body.email,
        UserRole::Player,
    ) {
        Ok(profile) => profile,
        Err(e) => {
            error!("Signup rejected: {}", e);
            return Ok(HttpResponse::BadRequest().body(e));
        }
    };

    info!("Created account {} ({})", profile.username, profile.id);
    let session = sessions.issue(&profile.id);
    Ok(HttpResponse::Ok().json(SessionResponse {
        token: session.token,
        profile,
    }))
}

pub async fn signin(
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
    body: web::Json<SigninRequest>,
) -> Result<HttpResponse, RequestError> {
    let body = body.into_inner();

    let credential = match storage.credential_for(&body.username) {
        Some(credential) => credential,
        None => return Err(RequestError::Unauthorized),
    };
    if hash_password(&credential.salt, &body.password) != credential.password_hash {
        error!("Failed signin attempt for {}", body.username);
        return Err(RequestError::Unauthorized);
    }

    let profile = storage
        .profile(&credential.user_id)
        .ok_or(RequestError::Unauthorized)?;
    let session = sessions.issue(&profile.id);
    Ok(HttpResponse::Ok().json(SessionResponse {
        token: session.token,
        profile,
    }))
}

pub async fn signout(
    req: HttpRequest,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, RequestError> {
    let token = bearer_token(&req).ok_or(RequestError::Unauthorized)?;
    if !sessions.revoke(&token) {
        return Err(RequestError::Unauthorized);
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({ "signed_out": true })))
}

pub async fn me(
    req: HttpRequest,
    storage: web::Data<DirectoryStorage>,
    sessions: web::Data<SessionStore>,
) -> Result<HttpResponse, RequestError> {
    let profile = current_user(&req, &sessions, &storage)?;
    Ok(HttpResponse::Ok().json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn hashing_is_stable_and_salted() {
        let a = hash_password("salt", "hunter22");
        assert_eq!(a, hash_password("salt", "hunter22"));
        assert_ne!(a, hash_password("other", "hunter22"));
        assert_ne!(a, hash_password("salt", "hunter23"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn account_validation_rules() {
        let storage = DirectoryStorage::new(Config::default());
        assert!(create_account(&storage, "ab", "password1", None, UserRole::Player).is_err());
        assert!(create_account(&storage, "Steve", "password1", None, UserRole::Player).is_err());
        assert!(create_account(&storage, "steve", "short", None, UserRole::Player).is_err());

        let profile =
            create_account(&storage, "steve", "password1", None, UserRole::Player).unwrap();
        assert_eq!(profile.role, UserRole::Player);

        // Duplicate username is refused by storage.
        assert!(create_account(&storage, "steve", "password1", None, UserRole::Player).is_err());
    }
}
