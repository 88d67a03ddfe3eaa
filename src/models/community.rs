// src/models/community.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub server_id: String,
    pub user_id: String,
    pub content: String,
    pub is_approved: bool,
    pub created_at: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentForm {
    pub content: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() || self.content.len() > 1000 {
            return Err("Invalid comment: must be 1-1000 chars".to_string());
        }
        Ok(())
    }
}
