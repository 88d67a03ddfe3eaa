// src/models/server.rs
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 25565;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerType {
    Survival,
    Creative,
    Rpg,
    Minigame,
    Skyblock,
    Prison,
    Factions,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub ip_address: String,
    pub port: u16,
    pub version: String,
    pub server_type: ServerType,
    pub is_pure_public: bool,
    pub requires_whitelist: bool,
    pub requires_genuine: bool,
    // Curated baseline counts, shown when no live poll has resolved.
    pub max_players: Option<i32>,
    pub online_players: i32,
    pub status: ReviewStatus,
    pub featured: bool,
    pub view_count: u64,
    pub tags: Vec<String>,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Owner submission payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerForm {
    pub name: String,
    pub description: String,
    pub ip_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub version: String,
    pub server_type: ServerType,
    #[serde(default)]
    pub is_pure_public: bool,
    #[serde(default)]
    pub requires_whitelist: bool,
    #[serde(default)]
    pub requires_genuine: bool,
    pub max_players: Option<i32>,
    #[serde(default)]
    pub online_players: i32,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Partial edit; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    pub port: Option<u16>,
    pub version: Option<String>,
    pub server_type: Option<ServerType>,
    pub is_pure_public: Option<bool>,
    pub requires_whitelist: Option<bool>,
    pub requires_genuine: Option<bool>,
    pub max_players: Option<Option<i32>>,
    pub online_players: Option<i32>,
    pub tags: Option<Vec<String>>,
}

impl ServerForm {
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(
            &self.name,
            &self.description,
            &self.ip_address,
            self.port,
            &self.version,
            &self.tags,
        )
    }
}

pub fn validate_fields(
    name: &str,
    description: &str,
    ip_address: &str,
    port: u16,
    version: &str,
    tags: &[String],
) -> Result<(), String> {
    if name.is_empty() || name.len() > 64 {
        return Err("Invalid name: must be 1-64 chars".to_string());
    }
    if description.is_empty() || description.len() > 2000 {
        return Err("Invalid description: must be 1-2000 chars".to_string());
    }
    if ip_address.is_empty()
        || !ip_address
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err("Invalid address: hostname chars only".to_string());
    }
    if port == 0 {
        return Err("Invalid port: must be 1-65535".to_string());
    }
    if version.is_empty() || version.len() > 16 {
        return Err("Invalid version: must be 1-16 chars".to_string());
    }
    if tags.len() > 5 {
        return Err("Too many tags: max 5".to_string());
    }
    if tags.iter().any(|t| t.is_empty() || t.len() > 32) {
        return Err("Invalid tag: must be 1-32 chars".to_string());
    }
    Ok(())
}

impl Server {
    pub fn apply_edit(&mut self, edit: ServerEdit, now: u64) {
        if let Some(name) = edit.name {
            self.name = name;
        }
        if let Some(description) = edit.description {
            self.description = description;
        }
        if let Some(ip_address) = edit.ip_address {
            self.ip_address = ip_address;
        }
        if let Some(port) = edit.port {
            self.port = port;
        }
        if let Some(version) = edit.version {
            self.version = version;
        }
        if let Some(server_type) = edit.server_type {
            self.server_type = server_type;
        }
        if let Some(v) = edit.is_pure_public {
            self.is_pure_public = v;
        }
        if let Some(v) = edit.requires_whitelist {
            self.requires_whitelist = v;
        }
        if let Some(v) = edit.requires_genuine {
            self.requires_genuine = v;
        }
        if let Some(max_players) = edit.max_players {
            self.max_players = max_players;
        }
        if let Some(online_players) = edit.online_players {
            self.online_players = online_players;
        }
        if let Some(tags) = edit.tags {
            self.tags = tags;
        }
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Latest,
    Popular,
    Featured,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerFilter {
    pub version: Option<String>,
    pub server_type: Option<ServerType>,
    pub is_pure_public: Option<bool>,
    pub requires_whitelist: Option<bool>,
    pub requires_genuine: Option<bool>,
    pub search: Option<String>,
}

impl ServerFilter {
    pub fn matches(&self, server: &Server) -> bool {
        if let Some(version) = &self.version {
            if &server.version != version {
                return false;
            }
        }
        if let Some(server_type) = self.server_type {
            if server.server_type != server_type {
                return false;
            }
        }
        if let Some(v) = self.is_pure_public {
            if server.is_pure_public != v {
                return false;
            }
        }
        if let Some(v) = self.requires_whitelist {
            if server.requires_whitelist != v {
                return false;
            }
        }
        if let Some(v) = self.requires_genuine {
            if server.requires_genuine != v {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !server.name.to_lowercase().contains(&needle)
                && !server.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

pub fn sort_servers(servers: &mut [Server], sort: SortOrder) {
    match sort {
        SortOrder::Latest => servers.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOrder::Popular => servers.sort_by(|a, b| b.view_count.cmp(&a.view_count)),
        SortOrder::Featured => servers.sort_by(|a, b| {
            b.featured
                .cmp(&a.featured)
                .then(b.created_at.cmp(&a.created_at))
        }),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> PaginatedResult<T> {
    let page = page.max(1);
    let page_size = page_size.clamp(1, 100);
    let total = items.len();
    let total_pages = total.div_ceil(page_size);
    let data = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    PaginatedResult {
        data,
        total,
        page,
        page_size,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str) -> Server {
        Server {
            id: name.to_string(),
            owner_id: "owner".to_string(),
            name: name.to_string(),
            description: "A cozy survival world".to_string(),
            ip_address: "play.example.com".to_string(),
            port: DEFAULT_PORT,
            version: "1.20".to_string(),
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
    fn filter_matches_search_in_name_or_description() {
        let server = sample("SkyHaven");
        let filter = ServerFilter {
            search: Some("haven".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&server));

        let filter = ServerFilter {
            search: Some("cozy".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&server));

        let filter = ServerFilter {
            search: Some("anarchy".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&server));
    }

    #[test]
    fn filter_rejects_version_mismatch() {
        let server = sample("a");
        let filter = ServerFilter {
            version: Some("1.8".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&server));
    }

    #[test]
    fn featured_sort_puts_featured_first() {
        let mut a = sample("a");
        a.created_at = 10;
        let mut b = sample("b");
        b.created_at = 20;
        let mut c = sample("c");
        c.featured = true;
        c.created_at = 1;

        let mut servers = vec![a, b, c];
        sort_servers(&mut servers, SortOrder::Featured);
        assert_eq!(servers[0].id, "c");
        assert_eq!(servers[1].id, "b");
        assert_eq!(servers[2].id, "a");
    }

    #[test]
    fn paginate_clamps_and_counts() {
        let items: Vec<u32> = (0..25).collect();
        let result = paginate(items, 3, 10);
        assert_eq!(result.data, vec![20, 21, 22, 23, 24]);
        assert_eq!(result.total, 25);
        assert_eq!(result.total_pages, 3);

        let result = paginate(Vec::<u32>::new(), 0, 10);
        assert_eq!(result.page, 1);
        assert_eq!(result.total_pages, 0);
    }

    #[test]
    fn form_validation_rejects_bad_fields() {
        assert!(validate_fields("Name", "desc", "play.example.com", 25565, "1.20", &[]).is_ok());
        assert!(validate_fields("", "desc", "play.example.com", 25565, "1.20", &[]).is_err());
        assert!(validate_fields("Name", "desc", "bad host!", 25565, "1.20", &[]).is_err());
        assert!(validate_fields("Name", "desc", "play.example.com", 0, "1.20", &[]).is_err());
        let tags: Vec<String> = (0..6).map(|i| format!("t{}", i)).collect();
        assert!(validate_fields("Name", "desc", "play.example.com", 25565, "1.20", &tags).is_err());
    }
}
