// src/status/relay.rs
use log::{debug, error};
use serde::{Deserialize, Serialize};

/// Envelope returned by the relay: a structured success flag rather than an
/// HTTP error, so callers can always parse one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<RelayStatusData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayStatusData {
    pub online: bool,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub players: i64,
    #[serde(default)]
    pub max_players: i64,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub motd_clean: String,
    #[serde(default)]
    pub motd_html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
}

impl RelayEnvelope {
    pub fn ok(data: RelayStatusData) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Queries the upstream provider for a server's status. All transport and
/// provider failures come back as a structured envelope, never an Err.
pub async fn query_status(
    http: &reqwest::Client,
    provider_url: &str,
    address: &str,
) -> RelayEnvelope {
    let url = format!("{}/serverstatus", provider_url);
    debug!("Querying status provider for {}", address);

    let response = match http.get(&url).query(&[("server", address)]).send().await {
        Ok(response) => response,
        Err(e) => {
            error!("Status provider unreachable: {}", e);
            return RelayEnvelope::err(format!("Status provider unreachable: {}", e));
        }
    };

    // The provider answers 404 for unknown hosts; that is a confirmed
    // "nothing there", not a failed check.
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return RelayEnvelope::ok(RelayStatusData::default());
    }

    if !response.status().is_success() {
        error!("Status provider returned {}", response.status());
        return RelayEnvelope::err(format!("Status provider returned {}", response.status()));
    }

    match response.json::<RelayStatusData>().await {
        Ok(data) => RelayEnvelope::ok(data),
        Err(e) => {
            error!("Malformed status provider response: {}", e);
            RelayEnvelope::err(format!("Malformed status provider response: {}", e))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PlayerData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerData {
    pub username: String,
    pub uuid: String,
    #[serde(default)]
    pub skin_url: String,
}

/// Looks up a player profile (name, uuid, skin) by username.
pub async fn query_player(
    http: &reqwest::Client,
    provider_url: &str,
    username: &str,
) -> PlayerEnvelope {
    let url = format!("{}/profile", provider_url);

    let response = match http.get(&url).query(&[("name", username)]).send().await {
        Ok(response) => response,
        Err(e) => {
            error!("Player lookup failed: {}", e);
            return PlayerEnvelope {
                success: false,
                data: None,
                error: Some(format!("Player lookup failed: {}", e)),
            };
        }
    };

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return PlayerEnvelope {
            success: false,
            data: None,
            error: Some("Player not found".to_string()),
        };
    }

    if !response.status().is_success() {
        error!("Player lookup returned {}", response.status());
        return PlayerEnvelope {
            success: false,
            data: None,
            error: Some(format!("Player lookup returned {}", response.status())),
        };
    }

    match response.json::<PlayerData>().await {
        Ok(data) => PlayerEnvelope {
            success: true,
            data: Some(data),
            error: None,
        },
        Err(e) => PlayerEnvelope {
            success: false,
            data: None,
            error: Some(format!("Malformed player response: {}", e)),
        },
    }
}
