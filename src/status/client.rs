// src/status/client.rs
use super::relay::{self, RelayEnvelope};
use super::watch::Fetcher;
use super::{PlayerCounts, StatusResult};
use std::sync::Arc;

/// Fetch adapter over the status relay. `check` never fails: every
/// transport or provider problem degrades to an offline result carrying an
/// error message.
#[derive(Clone)]
pub struct StatusClient {
    http: reqwest::Client,
    provider_url: String,
}

impl StatusClient {
    pub fn new(provider_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            provider_url: provider_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn check(&self, address: &str) -> StatusResult {
        let envelope = relay::query_status(&self.http, &self.provider_url, address).await;
        map_envelope(envelope)
    }

    pub async fn lookup_player(&self, username: &str) -> relay::PlayerEnvelope {
        relay::query_player(&self.http, &self.provider_url, username).await
    }

    pub async fn relay_status(&self, address: &str) -> RelayEnvelope {
        relay::query_status(&self.http, &self.provider_url, address).await
    }

    /// The fetch function handed to status watchers.
    pub fn fetcher(&self) -> Fetcher {
        let client = self.clone();
        Arc::new(move |address: String| {
            let client = client.clone();
            Box::pin(async move { client.check(&address).await })
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Maps a relay envelope into a StatusResult:
/// relay failure -> offline with error, upstream-reported offline -> plain
/// offline, success -> field-for-field copy.
pub fn map_envelope(envelope: RelayEnvelope) -> StatusResult {
    if !envelope.success {
        return StatusResult::failed(
            envelope
                .error
                .unwrap_or_else(|| "Status check failed".to_string()),
        );
    }

    let data = match envelope.data {
        Some(data) => data,
        None => return StatusResult::offline(),
    };

    if !data.online {
        return StatusResult::offline();
    }

    StatusResult {
        online: true,
        players: Some(PlayerCounts {
            online: data.players,
            max: data.max_players,
        }),
        version: non_empty(data.version),
        motd: non_empty(data.motd_clean),
        motd_html: non_empty(data.motd_html),
        favicon_url: data.favicon_url,
        error: None,
    }
}
