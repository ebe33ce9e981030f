//! Video id → HLS stream URL resolution
//!
//! Each id is looked up independently. A failed lookup is recorded next to
//! the successful ones and never stops the rest of the batch.

pub mod lookup;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

use crate::error::ResolveFailure;

pub use lookup::TwelveLabsVideoLookup;

/// Outcome of resolving one video id
pub type StreamResult = std::result::Result<String, ResolveFailure>;

/// Trait for per-video metadata sources
#[async_trait]
pub trait VideoLookup: Send + Sync {
    /// Fetch the HLS manifest URL for one video
    async fn stream_url(&self, index_id: &str, video_id: &str) -> StreamResult;
}

#[async_trait]
impl<T: VideoLookup + ?Sized> VideoLookup for Box<T> {
    async fn stream_url(&self, index_id: &str, video_id: &str) -> StreamResult {
        (**self).stream_url(index_id, video_id).await
    }
}

/// Resolution results covering every requested id
#[derive(Debug, Clone, Default, Serialize)]
pub struct VideoUrlMap {
    entries: BTreeMap<String, StreamResult>,
}

impl VideoUrlMap {
    pub fn get(&self, video_id: &str) -> Option<&StreamResult> {
        self.entries.get(video_id)
    }

    /// The stream URL, if the id resolved
    pub fn url(&self, video_id: &str) -> Option<&str> {
        match self.entries.get(video_id) {
            Some(Ok(url)) => Some(url.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolved_count(&self) -> usize {
        self.entries.values().filter(|r| r.is_ok()).count()
    }

    /// Ids that did not resolve, with the reason
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ResolveFailure)> {
        self.entries.iter().filter_map(|(id, result)| match result {
            Err(failure) => Some((id.as_str(), failure)),
            Ok(_) => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StreamResult)> {
        self.entries.iter().map(|(id, result)| (id.as_str(), result))
    }
}

/// Resolves video ids through a `VideoLookup` with bounded concurrency
pub struct VideoResolver<L> {
    lookup: L,
    concurrency: usize,
}

impl<L: VideoLookup> VideoResolver<L> {
    pub fn new(lookup: L, concurrency: usize) -> Self {
        Self {
            lookup,
            concurrency: concurrency.max(1),
        }
    }

    /// Resolve every distinct id. Never fails as a whole.
    pub async fn resolve(&self, video_ids: &BTreeSet<String>, index_id: &str) -> VideoUrlMap {
        if video_ids.is_empty() {
            return VideoUrlMap::default();
        }

        info!(
            "🔗 Resolving stream URLs for {} videos (concurrency {})",
            video_ids.len(),
            self.concurrency
        );

        let entries: BTreeMap<String, StreamResult> = stream::iter(video_ids.iter().cloned())
            .map(|video_id| async move {
                let result = self.lookup.stream_url(index_id, &video_id).await;
                if let Err(failure) = &result {
                    warn!("No stream URL for video {}: {}", video_id, failure);
                }
                (video_id, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let map = VideoUrlMap { entries };
        info!(
            "Resolved {}/{} stream URLs",
            map.resolved_count(),
            map.len()
        );
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted lookup: v1 resolves, v2 is malformed, v3 times out
    struct ScriptedLookup {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl VideoLookup for ScriptedLookup {
        async fn stream_url(&self, index_id: &str, video_id: &str) -> StreamResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(index_id, "idx");
            match video_id {
                "v1" => Ok("https://cdn.example.com/v1/stream.m3u8".to_string()),
                "v2" => Err(ResolveFailure::Malformed("expected value at line 1".to_string())),
                _ => Err(ResolveFailure::Transport("operation timed out".to_string())),
            }
        }
    }

    fn ids(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_partial_failure_is_isolated() {
        let resolver = VideoResolver::new(
            ScriptedLookup {
                calls: AtomicUsize::new(0),
            },
            1,
        );

        let map = resolver.resolve(&ids(&["v1", "v2", "v3"]), "idx").await;

        assert_eq!(map.len(), 3);
        assert_eq!(map.url("v1"), Some("https://cdn.example.com/v1/stream.m3u8"));
        assert_eq!(map.url("v2"), None);
        assert_eq!(map.url("v3"), None);
        assert!(matches!(map.get("v2"), Some(Err(ResolveFailure::Malformed(_)))));
        assert!(matches!(map.get("v3"), Some(Err(ResolveFailure::Transport(_)))));
        assert_eq!(map.failures().count(), 2);
        assert_eq!(resolver.lookup.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_concurrent_resolution_covers_every_id() {
        let resolver = VideoResolver::new(
            ScriptedLookup {
                calls: AtomicUsize::new(0),
            },
            8,
        );
        let requested = ids(&["v1", "v2", "v3", "v4", "v5"]);

        let map = resolver.resolve(&requested, "idx").await;

        let covered: BTreeSet<String> = map.iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(covered, requested);
        assert_eq!(map.resolved_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_request_makes_no_calls() {
        let resolver = VideoResolver::new(
            ScriptedLookup {
                calls: AtomicUsize::new(0),
            },
            4,
        );

        let map = resolver.resolve(&BTreeSet::new(), "idx").await;
        assert!(map.is_empty());
        assert_eq!(resolver.lookup.calls.load(Ordering::SeqCst), 0);
    }
}
