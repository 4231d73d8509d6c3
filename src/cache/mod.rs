//! Cache module for the post listing
//!
//! A single time-bounded slot holding the full published post collection.
//! There is no per-post invalidation: the slot expires or is cleared as a whole.

use std::sync::RwLock;
use std::time::Duration;

use tokio::time::Instant;

use crate::content::Post;

/// Default lifetime of a cached listing
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// The cached listing and when it stops being fresh
#[derive(Debug, Clone)]
struct CacheEntry {
    posts: Vec<Post>,
    expires_at: Instant,
}

/// Process-wide post cache, shared by reference between request handlers.
///
/// Concurrent refreshes are last-writer-wins.
#[derive(Debug)]
pub struct PostCache {
    ttl: Duration,
    slot: RwLock<Option<CacheEntry>>,
}

impl PostCache {
    /// Create an empty cache with the default TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Cached posts, if still fresh
    pub fn get(&self) -> Option<Vec<Post>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.as_ref()
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.posts.clone())
    }

    /// Replace the cached posts and restart the clock
    pub fn set(&self, posts: Vec<Post>) {
        let entry = CacheEntry {
            posts,
            expires_at: Instant::now() + self.ttl,
        };
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(entry);
    }

    /// Drop the cached listing
    pub fn invalidate(&self) {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
        tracing::debug!("Post cache invalidated");
    }

    pub fn is_fresh(&self) -> bool {
        self.get().is_some()
    }
}

impl Default for PostCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Author, OgImage, PostStatus};

    fn post(slug: &str) -> Post {
        Post {
            id: slug.to_string(),
            slug: slug.to_string(),
            title: slug.to_string(),
            date: chrono::Utc::now(),
            cover_image: None,
            author: Author::named("Blog Author"),
            excerpt: slug.to_string(),
            og_image: OgImage::default(),
            content: "<p>x</p>".to_string(),
            tags: Vec::new(),
            reading_time: 1,
            status: PostStatus::Published,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_within_ttl() {
        let cache = PostCache::new();
        assert!(cache.get().is_none());

        cache.set(vec![post("a")]);
        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get().unwrap()[0].slug, "a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_ttl() {
        let cache = PostCache::new();
        cache.set(vec![post("a")]);
        tokio::time::advance(DEFAULT_TTL).await;
        assert!(cache.get().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_restarts_clock() {
        let cache = PostCache::with_ttl(Duration::from_secs(10));
        cache.set(vec![post("a")]);
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set(vec![post("b")]);
        tokio::time::advance(Duration::from_secs(8)).await;
        assert_eq!(cache.get().unwrap()[0].slug, "b");
    }

    #[test]
    fn test_invalidate() {
        let cache = PostCache::new();
        cache.set(vec![post("a")]);
        assert!(cache.is_fresh());
        cache.invalidate();
        assert!(!cache.is_fresh());
    }

    #[test]
    fn test_zero_ttl_never_fresh() {
        let cache = PostCache::with_ttl(Duration::ZERO);
        cache.set(vec![post("a")]);
        assert!(cache.get().is_none());
    }
}
