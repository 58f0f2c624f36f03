use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::{interval, Instant};
use tracing::debug;

/// Ephemeral per-user interaction state. Entries appear lazily on first
/// contact and are swept once idle past the TTL.
#[derive(Debug, Clone)]
struct Session {
    awaiting_promo: bool,
    #[allow(dead_code)]
    context: HashMap<String, serde_json::Value>,
    last_seen: Instant,
}

impl Session {
    fn fresh() -> Self {
        let mut context = HashMap::new();
        context.insert(
            "started_at".to_string(),
            serde_json::Value::from(Utc::now().to_rfc3339()),
        );
        Self {
            awaiting_promo: false,
            context,
            last_seen: Instant::now(),
        }
    }
}

#[derive(Clone)]
pub struct SessionService {
    inner: Arc<RwLock<HashMap<i64, Session>>>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Create or reset the user's session. Restarting is always safe.
    pub async fn begin_session(&self, user_id: i64) {
        let mut sessions = self.inner.write().await;
        sessions.insert(user_id, Session::fresh());
    }

    pub async fn set_awaiting_promo(&self, user_id: i64, awaiting: bool) {
        let mut sessions = self.inner.write().await;
        let session = sessions.entry(user_id).or_insert_with(Session::fresh);
        session.awaiting_promo = awaiting;
        session.last_seen = Instant::now();
    }

    #[allow(dead_code)]
    pub async fn is_awaiting_promo(&self, user_id: i64) -> bool {
        let sessions = self.inner.read().await;
        sessions
            .get(&user_id)
            .map(|session| session.awaiting_promo)
            .unwrap_or(false)
    }

    /// Read-and-clear in one critical section: whatever the redemption
    /// outcome, the user's next free-text message is plain chat again.
    pub async fn take_awaiting_promo(&self, user_id: i64) -> bool {
        let mut sessions = self.inner.write().await;
        match sessions.get_mut(&user_id) {
            Some(session) => {
                let was_awaiting = session.awaiting_promo;
                session.awaiting_promo = false;
                session.last_seen = Instant::now();
                was_awaiting
            }
            None => false,
        }
    }

    /// Additive analytics context; nothing in the bot reads it back.
    pub async fn annotate(&self, user_id: i64, key: &str, value: serde_json::Value) {
        let mut sessions = self.inner.write().await;
        let session = sessions.entry(user_id).or_insert_with(Session::fresh);
        session.context.insert(key.to_string(), value);
        session.last_seen = Instant::now();
    }

    pub async fn session_count(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Drop entries idle past the TTL.
    pub async fn evict_idle(&self) {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        let ttl = self.ttl;
        let now = Instant::now();
        sessions.retain(|_, session| now.duration_since(session.last_seen) < ttl);
        if sessions.len() != before {
            debug!("Evicted {} idle sessions", before - sessions.len());
        }
    }

    pub async fn run_evictor(self, every: Duration) {
        let mut ticker = interval(every);
        loop {
            ticker.tick().await;
            self.evict_idle().await;
            debug!("{} sessions active", self.session_count().await);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SessionService {
        SessionService::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn awaiting_promo_defaults_to_false() {
        let sessions = service();
        assert!(!sessions.is_awaiting_promo(1).await);
        assert!(!sessions.take_awaiting_promo(1).await);
    }

    #[tokio::test]
    async fn take_clears_the_flag_so_the_second_message_is_plain_chat() {
        let sessions = service();
        sessions.set_awaiting_promo(1, true).await;

        assert!(sessions.take_awaiting_promo(1).await);
        assert!(!sessions.is_awaiting_promo(1).await);
        assert!(!sessions.take_awaiting_promo(1).await);
    }

    #[tokio::test]
    async fn users_do_not_share_state() {
        let sessions = service();
        sessions.set_awaiting_promo(1, true).await;
        sessions.set_awaiting_promo(2, false).await;

        assert!(sessions.is_awaiting_promo(1).await);
        assert!(!sessions.is_awaiting_promo(2).await);
        assert!(sessions.take_awaiting_promo(1).await);
        assert!(!sessions.take_awaiting_promo(2).await);
    }

    #[tokio::test]
    async fn begin_session_resets_a_pending_prompt() {
        let sessions = service();
        sessions.set_awaiting_promo(7, true).await;
        sessions.begin_session(7).await;
        assert!(!sessions.is_awaiting_promo(7).await);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_are_evicted_and_active_ones_survive() {
        let sessions = service();
        sessions.begin_session(1).await;

        tokio::time::advance(Duration::from_secs(30)).await;
        sessions.begin_session(2).await;

        tokio::time::advance(Duration::from_secs(40)).await;
        sessions.evict_idle().await;

        assert_eq!(sessions.session_count().await, 1);
        assert!(!sessions.is_awaiting_promo(1).await);
        sessions.set_awaiting_promo(2, true).await;
        assert!(sessions.is_awaiting_promo(2).await);
    }

    #[tokio::test(start_paused = true)]
    async fn activity_refreshes_the_ttl() {
        let sessions = service();
        sessions.begin_session(1).await;

        tokio::time::advance(Duration::from_secs(50)).await;
        sessions
            .annotate(1, "last_offer", serde_json::Value::from("flash"))
            .await;

        tokio::time::advance(Duration::from_secs(50)).await;
        sessions.evict_idle().await;

        assert_eq!(sessions.session_count().await, 1);
    }
}
