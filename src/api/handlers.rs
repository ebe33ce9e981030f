//! API request handlers

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::models::{AddCategoryRequest, ApiError, CategoryListing, ClassifyRequest, SessionInfo};
use crate::config::ApiConfig;
use crate::controller::{ClassificationReport, DynController};
use crate::taxonomy::{CustomCategoryForm, TaxonomyStore};

#[derive(Debug, Clone)]
struct SessionEntry {
    store: TaxonomyStore,
    last_seen: DateTime<Utc>,
}

/// In-memory session table; each session owns its custom categories.
///
/// A session idle for longer than the TTL is treated as ended. Expired
/// entries are swept when a new session is created, and the table never
/// holds more than `max_sessions` entries.
#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}

impl SessionManager {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(Duration::from_secs(config.session_ttl_seconds), config.max_sessions)
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        // a clock step backwards yields a negative idle time, which is not expired
        (now - entry.last_seen)
            .to_std()
            .is_ok_and(|idle| idle > self.ttl)
    }

    pub async fn create(&self) -> Uuid {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        if sessions.len() < before {
            info!("🧹 Evicted {} idle sessions", before - sessions.len());
        }

        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
            warn!("Session table full, evicted least recently used session {}", oldest);
        }

        let id = Uuid::new_v4();
        sessions.insert(
            id,
            SessionEntry {
                store: TaxonomyStore::new(),
                last_seen: now,
            },
        );
        info!("🆕 Session {} started", id);
        id
    }

    /// Drop a session and everything it added
    pub async fn end(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!("👋 Session {} ended", id);
        }
        removed
    }

    /// Copy of the session's store, so callers never hold the lock across I/O
    pub async fn snapshot(&self, id: &Uuid) -> Option<TaxonomyStore> {
        self.update(id, |store| store.clone()).await
    }

    /// Run `f` against a live session and mark it as used
    pub async fn update<F, R>(&self, id: &Uuid, f: F) -> Option<R>
    where
        F: FnOnce(&mut TaxonomyStore) -> R,
    {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        if sessions.get(id).is_some_and(|entry| self.is_expired(entry, now)) {
            sessions.remove(id);
            info!("⌛ Session {} expired", id);
            return None;
        }

        sessions.get_mut(id).map(|entry| {
            entry.last_seen = now;
            f(&mut entry.store)
        })
    }

    /// Number of live sessions
    pub async fn count(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .values()
            .filter(|entry| !self.is_expired(entry, now))
            .count()
    }
}

fn parse_session_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::session_not_found(id))
}

fn listing(store: &TaxonomyStore) -> CategoryListing {
    CategoryListing {
        builtin: store.list_builtin().to_vec(),
        custom: store.list_custom().to_vec(),
        names: store.names(),
    }
}

/// Handle health check requests
pub async fn health_check(sessions: &SessionManager) -> Value {
    serde_json::json!({
        "status": "healthy",
        "service": "sports-classifier",
        "version": env!("CARGO_PKG_VERSION"),
        "active_sessions": sessions.count().await,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

pub async fn create_session(sessions: &SessionManager) -> SessionInfo {
    SessionInfo {
        session_id: sessions.create().await.to_string(),
    }
}

pub async fn end_session(sessions: &SessionManager, id: &str) -> Result<Value, ApiError> {
    let uuid = parse_session_id(id)?;
    if sessions.end(&uuid).await {
        Ok(serde_json::json!({ "session_id": id, "ended": true }))
    } else {
        Err(ApiError::session_not_found(id))
    }
}

pub async fn list_categories(sessions: &SessionManager, id: &str) -> Result<CategoryListing, ApiError> {
    let uuid = parse_session_id(id)?;
    let store = sessions
        .snapshot(&uuid)
        .await
        .ok_or_else(|| ApiError::session_not_found(id))?;
    Ok(listing(&store))
}

/// Add a custom category and return the refreshed listing
pub async fn add_category(
    controller: &DynController,
    sessions: &SessionManager,
    id: &str,
    request: AddCategoryRequest,
) -> Result<CategoryListing, ApiError> {
    let uuid = parse_session_id(id)?;
    let form = CustomCategoryForm::new(request.name, request.prompts);

    sessions
        .update(&uuid, |store| {
            controller.add_custom(store, &form)?;
            if store.take_freshly_added() {
                debug!("Session {} taxonomy changed, returning refreshed listing", id);
            }
            Ok::<_, ApiError>(listing(store))
        })
        .await
        .ok_or_else(|| ApiError::session_not_found(id))?
}

pub async fn classify(
    controller: &DynController,
    sessions: &SessionManager,
    id: &str,
    request: ClassifyRequest,
) -> Result<ClassificationReport, ApiError> {
    let uuid = parse_session_id(id)?;
    let store = sessions
        .snapshot(&uuid)
        .await
        .ok_or_else(|| ApiError::session_not_found(id))?;

    Ok(controller.classify(&store, &request.categories).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_idle_session_expires_to_not_found() {
        let sessions = SessionManager::new(Duration::from_millis(50), 10);
        let id = create_session(&sessions).await.session_id;
        assert!(list_categories(&sessions, &id).await.is_ok());

        tokio::time::sleep(Duration::from_millis(150)).await;

        let err = list_categories(&sessions, &id).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(sessions.count().await, 0);
        assert!(end_session(&sessions, &id).await.is_err());
    }

    #[tokio::test]
    async fn test_activity_keeps_session_alive() {
        let sessions = SessionManager::new(Duration::from_millis(500), 10);
        let id = sessions.create().await;

        for _ in 0..2 {
            tokio::time::sleep(Duration::from_millis(300)).await;
            assert!(sessions.snapshot(&id).await.is_some());
        }
    }

    #[tokio::test]
    async fn test_create_sweeps_expired_sessions() {
        let sessions = SessionManager::new(Duration::from_millis(50), 10);
        sessions.create().await;
        sessions.create().await;

        tokio::time::sleep(Duration::from_millis(150)).await;
        let fresh = sessions.create().await;

        assert_eq!(sessions.sessions.read().await.len(), 1);
        assert!(sessions.snapshot(&fresh).await.is_some());
    }

    #[tokio::test]
    async fn test_full_table_evicts_least_recently_used() {
        let sessions = SessionManager::new(Duration::from_secs(3600), 2);
        let first = sessions.create().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = sessions.create().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        // touching the first session leaves the second as the oldest
        sessions
            .update(&first, |store| store.add_custom("Foo", vec!["a".to_string()]))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let third = sessions.create().await;

        assert_eq!(sessions.count().await, 2);
        assert!(sessions.snapshot(&second).await.is_none());
        assert_eq!(sessions.snapshot(&first).await.unwrap().list_custom().len(), 1);
        assert!(sessions.snapshot(&third).await.is_some());
    }
}
