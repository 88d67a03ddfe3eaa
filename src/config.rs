use governor::Quota;
use std::env;
use std::num::NonZeroU32;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    // Rate limiting configs
    pub list_period_secs: u64,
    pub list_burst_limit: u32,
    pub submit_period_secs: u64,
    pub submit_burst_limit: u32,
    pub status_period_secs: u64,
    pub status_burst_limit: u32,

    // Directory limits
    pub max_servers_per_owner: usize,

    // Status polling
    pub status_provider_url: String,
    pub status_jitter_ms: u64,

    // Sessions
    pub session_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            list_period_secs: 5,
            list_burst_limit: 120,
            submit_period_secs: 60,
            submit_burst_limit: 10,
            status_period_secs: 5,
            status_burst_limit: 30,
            max_servers_per_owner: 3,
            status_provider_url: "https://uapis.cn/api/v1/game/minecraft".to_string(),
            status_jitter_ms: 1000,
            session_ttl_secs: 86400,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            list_period_secs: env::var("LIST_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.list_period_secs),

            list_burst_limit: env::var("LIST_BURST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.list_burst_limit),

            submit_period_secs: env::var("SUBMIT_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.submit_period_secs),

            submit_burst_limit: env::var("SUBMIT_BURST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.submit_burst_limit),

            status_period_secs: env::var("STATUS_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.status_period_secs),

            status_burst_limit: env::var("STATUS_BURST_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.status_burst_limit),

            max_servers_per_owner: env::var("MAX_SERVERS_PER_OWNER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_servers_per_owner),

            status_provider_url: env::var("STATUS_PROVIDER_URL")
                .unwrap_or(defaults.status_provider_url),

            status_jitter_ms: env::var("STATUS_JITTER_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.status_jitter_ms),

            session_ttl_secs: env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_ttl_secs),
        }
    }

    pub fn list_quota(&self) -> Quota {
        Quota::with_period(Duration::from_secs(self.list_period_secs))
            .unwrap()
            .allow_burst(NonZeroU32::new(self.list_burst_limit).unwrap())
    }

    pub fn submit_quota(&self) -> Quota {
        Quota::with_period(Duration::from_secs(self.submit_period_secs))
            .unwrap()
            .allow_burst(NonZeroU32::new(self.submit_burst_limit).unwrap())
    }

    pub fn status_quota(&self) -> Quota {
        Quota::with_period(Duration::from_secs(self.status_period_secs))
            .unwrap()
            .allow_burst(NonZeroU32::new(self.status_burst_limit).unwrap())
    }
}
