// src/status/display.rs
use super::StatusResult;
use crate::models::server::Server;

/// Player-count string for a listing: live counts while the server is
/// confirmed online, the curated baseline otherwise.
pub fn players_display(server: &Server, live: Option<&StatusResult>) -> String {
    if let Some(live) = live {
        if live.online {
            if let Some(players) = &live.players {
                return format!("{}/{}", players.online, players.max);
            }
        }
    }
    match server.max_players {
        Some(max) => format!("{}/{}", server.online_players, max),
        None => format!("{}/∞", server.online_players),
    }
}

/// Live version string wins only while the server is online.
pub fn version_display(server: &Server, live: Option<&StatusResult>) -> String {
    if let Some(live) = live {
        if live.online {
            if let Some(version) = &live.version {
                return version.clone();
            }
        }
    }
    server.version.clone()
}

/// MOTD has no stored baseline; absent unless the live result is online.
pub fn motd_display(live: Option<&StatusResult>) -> Option<String> {
    let live = live?;
    if !live.online {
        return None;
    }
    live.motd.clone()
}

pub fn favicon_display(live: Option<&StatusResult>) -> Option<String> {
    let live = live?;
    if !live.online {
        return None;
    }
    live.favicon_url.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::server::{ReviewStatus, ServerType, DEFAULT_PORT};
    use crate::status::PlayerCounts;

    fn baseline() -> Server {
        Server {
            id: "s1".to_string(),
            owner_id: "o1".to_string(),
            name: "Example".to_string(),
            description: "desc".to_string(),
            ip_address: "play.example.com".to_string(),
            port: DEFAULT_PORT,
            version: "1.19".to_string(),
            server_type: ServerType::Survival,
            is_pure_public: false,
            requires_whitelist: false,
            requires_genuine: false,
            max_players: Some(20),
            online_players: 5,
            status: ReviewStatus::Approved,
            featured: false,
            view_count: 0,
            tags: Vec::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn no_live_result_falls_back_to_baseline() {
        let server = baseline();
        assert_eq!(players_display(&server, None), "5/20");
        assert_eq!(version_display(&server, None), "1.19");
        assert_eq!(motd_display(None), None);
    }

    #[test]
    fn online_result_overlays_baseline() {
        let server = baseline();
        let live = StatusResult {
            online: true,
            players: Some(PlayerCounts { online: 7, max: 30 }),
            version: Some("1.20".to_string()),
            motd: Some("Hi".to_string()),
            ..Default::default()
        };
        assert_eq!(players_display(&server, Some(&live)), "7/30");
        assert_eq!(version_display(&server, Some(&live)), "1.20");
        assert_eq!(motd_display(Some(&live)).as_deref(), Some("Hi"));
    }

    #[test]
    fn offline_result_falls_back_to_baseline() {
        let server = baseline();
        let live = StatusResult::offline();
        assert_eq!(players_display(&server, Some(&live)), "5/20");
        assert_eq!(version_display(&server, Some(&live)), "1.19");
    }

    #[test]
    fn missing_baseline_max_renders_infinity() {
        let mut server = baseline();
        server.max_players = None;
        assert_eq!(players_display(&server, None), "5/∞");
    }

    #[test]
    fn online_without_player_counts_still_falls_back() {
        let server = baseline();
        let live = StatusResult {
            online: true,
            ..Default::default()
        };
        assert_eq!(players_display(&server, Some(&live)), "5/20");
    }
}
