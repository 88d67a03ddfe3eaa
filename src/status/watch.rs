// src/status/watch.rs
use super::{StatusKey, StatusResult};
use dashmap::DashMap;
use log::debug;
use parking_lot::RwLock;
use rand::Rng;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// The fetch function a watcher runs after its delay. Injected so tests can
/// substitute a stub for the real status client.
pub type Fetcher =
    Arc<dyn Fn(String) -> Pin<Box<dyn Future<Output = StatusResult> + Send>> + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum WatchPhase {
    Pending,
    Resolved(StatusResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Checking,
    Online,
    Offline,
}

impl WatchPhase {
    pub fn badge(&self) -> Badge {
        match self {
            Self::Pending => Badge::Checking,
            Self::Resolved(result) if result.online => Badge::Online,
            Self::Resolved(_) => Badge::Offline,
        }
    }
}

/// Shared slot a scheduled fetch commits into. The generation counter is the
/// liveness flag: a fetch captures the generation at schedule time and may
/// only commit while it still matches.
pub struct WatchSlot {
    generation: AtomicU64,
    phase: RwLock<WatchPhase>,
}

impl WatchSlot {
    fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            phase: RwLock::new(WatchPhase::Pending),
        }
    }

    pub fn bump(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn phase(&self) -> WatchPhase {
        self.phase.read().clone()
    }
}

/// Schedules exactly one fetch after `delay`. Returns the task handle as the
/// cancellation handle; bumping the slot's generation also suppresses a
/// fetch that is already in flight.
pub fn spawn_fetch(
    delay: Duration,
    fetch: Fetcher,
    address: String,
    slot: Arc<WatchSlot>,
    generation: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if slot.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        let result = (fetch)(address).await;
        if slot.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding stale status result (superseded watcher)");
            return;
        }
        *slot.phase.write() = WatchPhase::Resolved(result);
    })
}

struct WatchEntry {
    key: StatusKey,
    slot: Arc<WatchSlot>,
    task: JoinHandle<()>,
}

/// One watcher per displayed server. Attach schedules a single jittered
/// fetch; detach and key changes cancel or supersede it; refresh skips the
/// jitter. No automatic retries.
pub struct StatusRegistry {
    entries: DashMap<String, WatchEntry>,
    fetch: Fetcher,
    jitter_ms: u64,
}

impl StatusRegistry {
    pub fn new(jitter_ms: u64, fetch: Fetcher) -> Self {
        Self {
            entries: DashMap::new(),
            fetch,
            jitter_ms,
        }
    }

    fn jitter(&self) -> Duration {
        if self.jitter_ms == 0 {
            return Duration::ZERO;
        }
        // Spread simultaneous attaches so the provider is not hit in one
        // burst when a whole page of servers registers at once.
        Duration::from_millis(rand::thread_rng().gen_range(0..self.jitter_ms))
    }

    fn install(&self, server_id: &str, key: StatusKey, delay: Duration) {
        let slot = match self.entries.get(server_id) {
            Some(entry) => entry.slot.clone(),
            None => Arc::new(WatchSlot::new()),
        };
        let generation = slot.bump();
        *slot.phase.write() = WatchPhase::Pending;

        let task = spawn_fetch(
            delay,
            self.fetch.clone(),
            key.address(),
            slot.clone(),
            generation,
        );
        let entry = WatchEntry { key, slot, task };
        if let Some(old) = self.entries.insert(server_id.to_string(), entry) {
            old.task.abort();
        }
    }

    pub fn attach(&self, server_id: &str, key: StatusKey) {
        debug!("Attaching status watcher for {} ({})", server_id, key.address());
        self.install(server_id, key, self.jitter());
    }

    /// Reschedules only when the address actually changed.
    pub fn rekey(&self, server_id: &str, key: StatusKey) {
        let changed = match self.entries.get(server_id) {
            Some(entry) => entry.key != key,
            None => return,
        };
        if changed {
            debug!("Rekeying status watcher for {} ({})", server_id, key.address());
            self.install(server_id, key, self.jitter());
        }
    }

    /// User-initiated refresh: cancels any scheduled fetch and issues a new
    /// one immediately, without jitter.
    pub fn refresh(&self, server_id: &str) -> bool {
        let key = match self.entries.get(server_id) {
            Some(entry) => entry.key.clone(),
            None => return false,
        };
        self.install(server_id, key, Duration::ZERO);
        true
    }

    pub fn detach(&self, server_id: &str) {
        if let Some((_, entry)) = self.entries.remove(server_id) {
            debug!("Detaching status watcher for {}", server_id);
            entry.slot.bump();
            entry.task.abort();
        }
    }

    pub fn snapshot(&self, server_id: &str) -> Option<WatchPhase> {
        self.entries.get(server_id).map(|entry| entry.slot.phase())
    }

    /// Latest resolved result, if any.
    pub fn result_for(&self, server_id: &str) -> Option<StatusResult> {
        match self.snapshot(server_id) {
            Some(WatchPhase::Resolved(result)) => Some(result),
            _ => None,
        }
    }

    pub fn badge_for(&self, server_id: &str) -> Option<Badge> {
        self.snapshot(server_id).map(|phase| phase.badge())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_fetcher(count: Arc<AtomicUsize>) -> Fetcher {
        Arc::new(move |address: String| {
            let count = count.clone();
            Box::pin(async move {
                count.fetch_add(1, Ordering::SeqCst);
                StatusResult {
                    online: true,
                    version: Some(address),
                    ..Default::default()
                }
            })
        })
    }

    async fn wait_resolved(registry: &StatusRegistry, server_id: &str) -> StatusResult {
        for _ in 0..500 {
            if let Some(WatchPhase::Resolved(result)) = registry.snapshot(server_id) {
                return result;
            }
            tokio::task::yield_now().await;
        }
        panic!("watcher never resolved");
    }

    #[tokio::test(start_paused = true)]
    async fn attach_fires_exactly_one_fetch() {
        let count = Arc::new(AtomicUsize::new(0));
        let registry = StatusRegistry::new(1000, counting_fetcher(count.clone()));

        registry.attach("s1", StatusKey::new("play.example.com", 25565));
        assert_eq!(registry.badge_for("s1"), Some(Badge::Checking));

        // Let the spawned fetch task run so its jittered sleep registers with
        // the paused-time timer before we advance the clock past it.
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_millis(1000)).await;
        let result = wait_resolved(&registry, "s1").await;
        assert_eq!(result.version.as_deref(), Some("play.example.com"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(registry.badge_for("s1"), Some(Badge::Online));

        // No retries after the one-shot fetch.
        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn detach_during_jitter_issues_no_fetch() {
        let count = Arc::new(AtomicUsize::new(0));
        let registry = StatusRegistry::new(1000, counting_fetcher(count.clone()));

        registry.attach("s1", StatusKey::new("play.example.com", 25565));
        registry.detach("s1");

        tokio::time::advance(Duration::from_secs(5)).await;
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(registry.snapshot("s1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_bypasses_jitter() {
        let count = Arc::new(AtomicUsize::new(0));
        let registry = StatusRegistry::new(60_000, counting_fetcher(count.clone()));

        registry.attach("s1", StatusKey::new("play.example.com", 25565));
        assert!(registry.refresh("s1"));

        // The paused clock never advances, so only the refresh (zero delay)
        // can have fired.
        let result = wait_resolved(&registry, "s1").await;
        assert!(result.online);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_of_unknown_server_is_a_noop() {
        let count = Arc::new(AtomicUsize::new(0));
        let registry = StatusRegistry::new(1000, counting_fetcher(count.clone()));
        assert!(!registry.refresh("missing"));
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_fetch_may_not_commit() {
        // Drive spawn_fetch directly: a fetch held in flight across a
        // generation bump must discard its resolution.
        let release = Arc::new(tokio::sync::Notify::new());
        let fetch: Fetcher = {
            let release = release.clone();
            Arc::new(move |_address: String| {
                let release = release.clone();
                Box::pin(async move {
                    release.notified().await;
                    StatusResult {
                        online: true,
                        ..Default::default()
                    }
                })
            })
        };

        let slot = Arc::new(WatchSlot::new());
        let generation = slot.bump();
        let task = spawn_fetch(
            Duration::ZERO,
            fetch,
            "play.example.com".to_string(),
            slot.clone(),
            generation,
        );

        for _ in 0..20 {
            tokio::task::yield_now().await;
        }

        // Supersede while the fetch is blocked, then let it resolve.
        slot.bump();
        release.notify_one();
        let _ = task.await;

        assert_eq!(slot.phase(), WatchPhase::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn rekey_replaces_the_watched_address() {
        let count = Arc::new(AtomicUsize::new(0));
        let registry = StatusRegistry::new(0, counting_fetcher(count.clone()));

        registry.attach("s1", StatusKey::new("old.example.com", 25565));
        wait_resolved(&registry, "s1").await;

        registry.rekey("s1", StatusKey::new("new.example.com", 25565));
        let result = wait_resolved(&registry, "s1").await;
        assert_eq!(result.version.as_deref(), Some("new.example.com"));

        // Same key again: no reschedule.
        let before = count.load(Ordering::SeqCst);
        registry.rekey("s1", StatusKey::new("new.example.com", 25565));
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert_eq!(count.load(Ordering::SeqCst), before);
    }
}
