// src/models/profile.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Player,
    Owner,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub bio: Option<String>,
    pub created_at: u64,
}

/// Salted password digest, kept out of `Profile` so it never serializes
/// into an API response.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: String,
    pub salt: String,
    pub password_hash: String,
}
