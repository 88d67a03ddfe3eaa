// src/storage/memory.rs
use crate::config::Config;
use crate::models::community::Comment;
use crate::models::profile::{Credential, Profile, UserRole};
use crate::models::server::{ReviewStatus, Server};
use crate::utils::now_secs;
use dashmap::DashMap;

pub struct DirectoryStorage {
    servers: DashMap<String, Server>,
    profiles: DashMap<String, Profile>,
    // Keyed by lowercased username.
    credentials: DashMap<String, Credential>,
    comments: DashMap<String, Comment>,
    likes: DashMap<(String, String), u64>,
    favorites: DashMap<(String, String), u64>,
    config: Config,
}

impl DirectoryStorage {
    pub fn new(config: Config) -> Self {
        Self {
            servers: DashMap::new(),
            profiles: DashMap::new(),
            credentials: DashMap::new(),
            comments: DashMap::new(),
            likes: DashMap::new(),
            favorites: DashMap::new(),
            config,
        }
    }

    // ---- profiles ----

    pub fn add_profile(&self, profile: Profile, credential: Credential) -> Result<(), String> {
        let key = profile.username.to_lowercase();
        if self.credentials.contains_key(&key) {
            return Err("Username already taken".to_string());
        }
        self.credentials.insert(key, credential);
        self.profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    pub fn profile(&self, id: &str) -> Option<Profile> {
        self.profiles.get(id).map(|r| r.value().clone())
    }

    pub fn credential_for(&self, username: &str) -> Option<Credential> {
        self.credentials
            .get(&username.to_lowercase())
            .map(|r| r.value().clone())
    }

    pub fn set_role(&self, user_id: &str, role: UserRole) -> Result<(), String> {
        match self.profiles.get_mut(user_id) {
            Some(mut profile) => {
                profile.role = role;
                Ok(())
            }
            None => Err("User not found".to_string()),
        }
    }

    // ---- servers ----

    pub fn add_server(&self, server: Server) -> Result<(), String> {
        // One listing per address; a community directory should not carry
        // two entries for the same server.
        let duplicate = self
            .servers
            .iter()
            .any(|r| r.value().ip_address == server.ip_address && r.value().port == server.port);
        if duplicate {
            return Err("A server with this address is already listed".to_string());
        }

        let owned = self
            .servers
            .iter()
            .filter(|r| r.value().owner_id == server.owner_id)
            .count();
        if owned >= self.config.max_servers_per_owner {
            return Err(format!(
                "Maximum number of servers ({}) reached for this account",
                self.config.max_servers_per_owner
            ));
        }

        self.servers.insert(server.id.clone(), server);
        Ok(())
    }

    pub fn server(&self, id: &str) -> Option<Server> {
        self.servers.get(id).map(|r| r.value().clone())
    }

    pub fn update_server<F>(&self, id: &str, apply: F) -> Result<Server, String>
    where
        F: FnOnce(&mut Server),
    {
        match self.servers.get_mut(id) {
            Some(mut server) => {
                apply(server.value_mut());
                Ok(server.value().clone())
            }
            None => Err("Server not found".to_string()),
        }
    }

    pub fn remove_server(&self, id: &str) {
        self.servers.remove(id);
        self.comments.retain(|_, c| c.server_id != id);
        self.likes.retain(|(server_id, _), _| server_id != id);
        self.favorites.retain(|(server_id, _), _| server_id != id);
    }

    pub fn servers_with_status(&self, status: ReviewStatus) -> Vec<Server> {
        self.servers
            .iter()
            .filter(|r| r.value().status == status)
            .map(|r| r.value().clone())
            .collect()
    }

    pub fn servers_by_owner(&self, owner_id: &str) -> Vec<Server> {
        let mut servers: Vec<Server> = self
            .servers
            .iter()
            .filter(|r| r.value().owner_id == owner_id)
            .map(|r| r.value().clone())
            .collect();
        servers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        servers
    }

    pub fn increment_views(&self, id: &str) {
        if let Some(mut server) = self.servers.get_mut(id) {
            server.view_count += 1;
        }
    }

    // ---- likes and favorites ----

    pub fn like(&self, server_id: &str, user_id: &str) -> Result<(), String> {
        let key = (server_id.to_string(), user_id.to_string());
        if self.likes.contains_key(&key) {
            return Err("Already liked".to_string());
        }
        self.likes.insert(key, now_secs());
        Ok(())
    }

    pub fn unlike(&self, server_id: &str, user_id: &str) -> Result<(), String> {
        let key = (server_id.to_string(), user_id.to_string());
        match self.likes.remove(&key) {
            Some(_) => Ok(()),
            None => Err("Not liked".to_string()),
        }
    }

    pub fn favorite(&self, server_id: &str, user_id: &str) -> Result<(), String> {
        let key = (server_id.to_string(), user_id.to_string());
        if self.favorites.contains_key(&key) {
            return Err("Already favorited".to_string());
        }
        self.favorites.insert(key, now_secs());
        Ok(())
    }

    pub fn unfavorite(&self, server_id: &str, user_id: &str) -> Result<(), String> {
        let key = (server_id.to_string(), user_id.to_string());
        match self.favorites.remove(&key) {
            Some(_) => Ok(()),
            None => Err("Not favorited".to_string()),
        }
    }

    pub fn like_count(&self, server_id: &str) -> usize {
        self.likes
            .iter()
            .filter(|r| r.key().0 == server_id)
            .count()
    }

    pub fn favorite_count(&self, server_id: &str) -> usize {
        self.favorites
            .iter()
            .filter(|r| r.key().0 == server_id)
            .count()
    }

    pub fn is_liked(&self, server_id: &str, user_id: &str) -> bool {
        self.likes
            .contains_key(&(server_id.to_string(), user_id.to_string()))
    }

    pub fn is_favorited(&self, server_id: &str, user_id: &str) -> bool {
        self.favorites
            .contains_key(&(server_id.to_string(), user_id.to_string()))
    }

    pub fn favorites_of(&self, user_id: &str) -> Vec<Server> {
        let mut servers: Vec<Server> = self
            .favorites
            .iter()
            .filter(|r| r.key().1 == user_id)
            .filter_map(|r| self.server(&r.key().0))
            .filter(|s| s.status == ReviewStatus::Approved)
            .collect();
        servers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        servers
    }

    // ---- comments ----

    pub fn add_comment(&self, comment: Comment) {
        self.comments.insert(comment.id.clone(), comment);
    }

    pub fn comment(&self, id: &str) -> Option<Comment> {
        self.comments.get(id).map(|r| r.value().clone())
    }

    pub fn approve_comment(&self, id: &str) -> Result<(), String> {
        match self.comments.get_mut(id) {
            Some(mut comment) => {
                comment.is_approved = true;
                Ok(())
            }
            None => Err("Comment not found".to_string()),
        }
    }

    pub fn remove_comment(&self, id: &str) {
        self.comments.remove(id);
    }

    pub fn comments_for(&self, server_id: &str) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|r| r.value().server_id == server_id && r.value().is_approved)
            .map(|r| r.value().clone())
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        comments
    }

    pub fn pending_comments(&self) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|r| !r.value().is_approved)
            .map(|r| r.value().clone())
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        comments
    }

    pub fn comment_count(&self, server_id: &str) -> usize {
        self.comments
            .iter()
            .filter(|r| r.value().server_id == server_id && r.value().is_approved)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::server::{ServerType, DEFAULT_PORT};

    fn storage() -> DirectoryStorage {
        DirectoryStorage::new(Config::default())
    }

    fn server(id: &str, owner: &str, host: &str, port: u16) -> Server {
        Server {
            id: id.to_string(),
            owner_id: owner.to_string(),
            name: format!("Server {}", id),
            description: "desc".to_string(),
            ip_address: host.to_string(),
            port,
            version: "1.20".to_string(),
            server_type: ServerType::Survival,
            is_pure_public: false,
            requires_whitelist: false,
            requires_genuine: false,
            max_players: Some(20),
            online_players: 0,
            status: ReviewStatus::Pending,
            featured: false,
            view_count: 0,
            tags: Vec::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn enforces_per_owner_cap() {
        let store = storage();
        for i in 0..3 {
            store
                .add_server(server(&i.to_string(), "alice", &format!("h{}.example.com", i), DEFAULT_PORT))
                .unwrap();
        }
        let err = store
            .add_server(server("3", "alice", "h3.example.com", DEFAULT_PORT))
            .unwrap_err();
        assert!(err.contains("Maximum number of servers"));

        // Other owners are unaffected.
        store
            .add_server(server("4", "bob", "h4.example.com", DEFAULT_PORT))
            .unwrap();
    }

    #[test]
    fn rejects_duplicate_address() {
        let store = storage();
        store
            .add_server(server("1", "alice", "play.example.com", DEFAULT_PORT))
            .unwrap();
        let err = store
            .add_server(server("2", "bob", "play.example.com", DEFAULT_PORT))
            .unwrap_err();
        assert!(err.contains("already listed"));
    }

    #[test]
    fn duplicate_like_is_rejected_and_unlike_clears() {
        let store = storage();
        store.like("s1", "u1").unwrap();
        assert!(store.like("s1", "u1").is_err());
        assert_eq!(store.like_count("s1"), 1);
        assert!(store.is_liked("s1", "u1"));

        store.unlike("s1", "u1").unwrap();
        assert!(store.unlike("s1", "u1").is_err());
        assert_eq!(store.like_count("s1"), 0);
    }

    #[test]
    fn username_uniqueness_is_case_insensitive() {
        let store = storage();
        let profile = Profile {
            id: "u1".to_string(),
            username: "Steve".to_string(),
            email: None,
            role: UserRole::Player,
            bio: None,
            created_at: 0,
        };
        let credential = Credential {
            user_id: "u1".to_string(),
            salt: "s".to_string(),
            password_hash: "h".to_string(),
        };
        store.add_profile(profile.clone(), credential.clone()).unwrap();

        let mut other = profile;
        other.id = "u2".to_string();
        other.username = "steve".to_string();
        assert!(store.add_profile(other, credential).is_err());
    }

    #[test]
    fn removing_server_drops_engagement_rows() {
        let store = storage();
        store
            .add_server(server("s1", "alice", "play.example.com", DEFAULT_PORT))
            .unwrap();
        store.like("s1", "u1").unwrap();
        store.favorite("s1", "u1").unwrap();
        store.add_comment(Comment {
            id: "c1".to_string(),
            server_id: "s1".to_string(),
            user_id: "u1".to_string(),
            content: "hi".to_string(),
            is_approved: true,
            created_at: 0,
        });

        store.remove_server("s1");
        assert!(store.server("s1").is_none());
        assert_eq!(store.like_count("s1"), 0);
        assert_eq!(store.favorite_count("s1"), 0);
        assert_eq!(store.comment_count("s1"), 0);
    }

    #[test]
    fn comment_moderation_flow() {
        let store = storage();
        store.add_comment(Comment {
            id: "c1".to_string(),
            server_id: "s1".to_string(),
            user_id: "u1".to_string(),
            content: "great server".to_string(),
            is_approved: false,
            created_at: 0,
        });

        assert!(store.comments_for("s1").is_empty());
        assert_eq!(store.pending_comments().len(), 1);

        store.approve_comment("c1").unwrap();
        assert_eq!(store.comments_for("s1").len(), 1);
        assert!(store.pending_comments().is_empty());
    }
}
