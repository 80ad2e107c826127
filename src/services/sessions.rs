//! Per-client session state, keyed by the value of the session cookie

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

/// State kept for one browser session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Home page views already served in this session
    #[serde(default)]
    pub num_visits: u64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// State stored under `key`, or a fresh state when there is none
    async fn load(&self, key: &str) -> AppResult<SessionState>;

    /// Store `state` under `key`, resetting its expiry
    async fn save(&self, key: &str, state: &SessionState) -> AppResult<()>;

    /// Check that the backend is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Sessions stored in Redis as JSON strings with a TTL
#[derive(Clone)]
pub struct RedisSessionStore {
    client: Client,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Session(format!("Failed to create Redis client: {}", e)))?;

        let store = Self {
            client,
            ttl_seconds,
        };
        store.ping().await?;
        Ok(store)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Session(format!("Failed to get Redis connection: {}", e)))
    }

    fn redis_key(key: &str) -> String {
        format!("session:{}", key)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, key: &str) -> AppResult<SessionState> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(Self::redis_key(key)).await?;

        match raw {
            Some(json) => match serde_json::from_str(&json) {
                Ok(state) => Ok(state),
                Err(e) => {
                    tracing::warn!(session = key, "discarding unreadable session data: {}", e);
                    Ok(SessionState::default())
                }
            },
            None => Ok(SessionState::default()),
        }
    }

    async fn save(&self, key: &str, state: &SessionState) -> AppResult<()> {
        let json = serde_json::to_string(state)
            .map_err(|e| AppError::Internal(format!("Failed to encode session: {}", e)))?;

        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(Self::redis_key(key), json, self.ttl_seconds)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Session(format!("Redis connection test failed: {}", e)))?;
        Ok(())
    }
}

/// Sessions kept in process memory, expired lazily on access.
/// A TTL too large for `Instant` to represent never expires.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, (SessionState, Option<Instant>)>>,
}

fn is_live(expires_at: Option<Instant>, now: Instant) -> bool {
    expires_at.map_or(true, |at| at > now)
}

impl MemorySessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl: Duration::from_secs(ttl_seconds),
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, key: &str) -> AppResult<SessionState> {
        let sessions = self.sessions.read().await;
        Ok(match sessions.get(key) {
            Some((state, expires_at)) if is_live(*expires_at, Instant::now()) => *state,
            _ => SessionState::default(),
        })
    }

    async fn save(&self, key: &str, state: &SessionState) -> AppResult<()> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, (_, expires_at)| is_live(*expires_at, now));
        sessions.insert(key.to_string(), (*state, now.checked_add(self.ttl)));
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_key_starts_fresh() {
        let store = MemorySessionStore::new(60);
        assert_eq!(store.load("nobody").await.unwrap(), SessionState::default());
    }

    #[tokio::test]
    async fn saved_state_is_loaded_back() {
        let store = MemorySessionStore::new(60);
        store
            .save("abc", &SessionState { num_visits: 4 })
            .await
            .unwrap();
        assert_eq!(store.load("abc").await.unwrap().num_visits, 4);
        assert_eq!(store.load("other").await.unwrap().num_visits, 0);
    }

    #[tokio::test]
    async fn expired_state_is_dropped() {
        let store = MemorySessionStore::new(0);
        store
            .save("abc", &SessionState { num_visits: 4 })
            .await
            .unwrap();
        assert_eq!(store.load("abc").await.unwrap().num_visits, 0);
    }

    #[tokio::test]
    async fn huge_ttl_never_expires() {
        let store = MemorySessionStore::new(u64::MAX);
        store
            .save("abc", &SessionState { num_visits: 2 })
            .await
            .unwrap();
        assert_eq!(store.load("abc").await.unwrap().num_visits, 2);
    }

    #[test]
    fn missing_counter_deserializes_to_zero() {
        let state: SessionState = serde_json::from_str("{}").unwrap();
        assert_eq!(state.num_visits, 0);
    }

    #[test]
    fn redis_keys_are_namespaced() {
        assert_eq!(RedisSessionStore::redis_key("k1"), "session:k1");
    }
}
