// src/status/mod.rs
//
// Live status for listed servers: a relay to the upstream Minecraft status
// provider, a never-failing fetch adapter over it, and per-server watchers
// that overlay live results onto the curated baseline fields.
pub mod client;
pub mod display;
pub mod relay;
pub mod watch;

use serde::{Deserialize, Serialize};

pub use client::StatusClient;
pub use watch::{Badge, StatusRegistry, WatchPhase};

use crate::models::server::DEFAULT_PORT;

/// Identity of one watched endpoint. A change of host or port supersedes
/// any in-flight check for the old address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusKey {
    pub host: String,
    pub port: u16,
}

impl StatusKey {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }

    /// Canonical address: the default port is omitted.
    pub fn address(&self) -> String {
        if self.port == DEFAULT_PORT {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCounts {
    pub online: i64,
    pub max: i64,
}

/// Outcome of one status check. Never persisted; the latest result simply
/// replaces the previous one for its entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResult {
    pub online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<PlayerCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motd: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motd_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResult {
    /// "Checked, offline", as opposed to a failed check, which carries an
    /// error message.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_port_is_omitted_from_address() {
        let key = StatusKey::new("play.example.com", 25565);
        assert_eq!(key.address(), "play.example.com");
    }

    #[test]
    fn non_default_port_is_kept() {
        let key = StatusKey::new("play.example.com", 25566);
        assert_eq!(key.address(), "play.example.com:25566");
    }

    #[test]
    fn offline_and_failed_are_distinguishable() {
        assert!(StatusResult::offline().error.is_none());
        assert_eq!(
            StatusResult::failed("timeout").error.as_deref(),
            Some("timeout")
        );
    }
}
