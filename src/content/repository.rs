//! Content repository - the read API the site is built on
//!
//! Every operation has a `try_*` form that reports failures and a plain form that
//! never fails: errors are logged and collapse to an empty or absent result.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use super::normalize::{PostNormalizer, PostProperties, QuerySchema};
use super::post::{Post, PostStatus};
use crate::cache::PostCache;
use crate::config::StatusPropertyType;
use crate::notion::{ContentError, ContentSource, Filter, Page, Query, Sort};

const PUBLISHED: &str = "Published";

/// Body fetches in flight at once. Notion allows about three requests per second.
const BODY_FETCH_CONCURRENCY: usize = 3;

/// Read-only access to published posts
pub struct ContentRepository {
    source: ContentSource,
    cache: Arc<PostCache>,
    normalizer: PostNormalizer,
    schema: QuerySchema,
}

impl ContentRepository {
    pub fn new(
        source: ContentSource,
        cache: Arc<PostCache>,
        normalizer: PostNormalizer,
        schema: QuerySchema,
    ) -> Self {
        Self {
            source,
            cache,
            normalizer,
            schema,
        }
    }

    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    pub fn cache(&self) -> &PostCache {
        &self.cache
    }

    fn published_filter(&self) -> Filter {
        let property = self.schema.status_property.clone();
        let equals = PUBLISHED.to_string();
        match self.schema.status_property_type {
            StatusPropertyType::Status => Filter::Status { property, equals },
            StatusPropertyType::Select => Filter::Select { property, equals },
        }
    }

    fn properties_of(&self, page: &Page) -> PostProperties {
        PostProperties::from_page_with(page, &self.schema)
    }

    fn newest_first(&self) -> Sort {
        Sort::descending(self.schema.sort_property.clone())
    }

    /// Published rows' properties, without fetching any body
    async fn published_properties(&self) -> Result<Vec<PostProperties>, ContentError> {
        let query = Query::new().filter(self.published_filter());
        let pages = self.source.query(&query).await?;
        Ok(pages
            .iter()
            .map(|page| self.properties_of(page))
            .filter(|p| p.status == PostStatus::Published)
            .collect())
    }

    /// Normalize rows with bounded concurrency, keeping their order.
    /// Drafts never get a body fetch.
    async fn normalize_all(&self, pages: &[Page]) -> Vec<Post> {
        let published: Vec<PostProperties> = pages
            .iter()
            .map(|page| self.properties_of(page))
            .filter(|p| p.status == PostStatus::Published)
            .collect();

        stream::iter(published)
            .map(|props| self.normalizer.complete(&self.source, props))
            .buffered(BODY_FETCH_CONCURRENCY)
            .collect()
            .await
    }

    pub async fn try_all_posts(&self) -> Result<Vec<Post>, ContentError> {
        if !self.source.is_available() {
            return Err(ContentError::Unavailable);
        }

        if let Some(posts) = self.cache.get() {
            tracing::debug!("Serving {} posts from cache", posts.len());
            return Ok(posts);
        }

        let query = Query::new()
            .filter(self.published_filter())
            .sort(self.newest_first());
        let pages = self.source.query(&query).await?;
        let posts = self.normalize_all(&pages).await;

        tracing::info!("Fetched {} posts from Notion", posts.len());
        self.cache.set(posts.clone());
        Ok(posts)
    }

    /// All published posts, newest first
    pub async fn all_posts(&self) -> Vec<Post> {
        collapse(self.try_all_posts().await, "posts")
    }

    /// Look a post up by slug.
    ///
    /// Only metadata is queried; the body is fetched for the single match. When several
    /// posts share a slug, the earliest dated one wins, then the smallest id.
    pub async fn try_post_by_slug(&self, slug: &str) -> Result<Option<Post>, ContentError> {
        let matched = self
            .published_properties()
            .await?
            .into_iter()
            .filter(|p| p.slug == slug)
            .min_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

        match matched {
            Some(props) => Ok(Some(self.normalizer.complete(&self.source, props).await)),
            None => Ok(None),
        }
    }

    pub async fn post_by_slug(&self, slug: &str) -> Option<Post> {
        collapse(self.try_post_by_slug(slug).await, "post by slug")
    }

    pub async fn try_posts_by_tag(&self, tag: &str) -> Result<Vec<Post>, ContentError> {
        let query = Query::new()
            .filter(Filter::And(vec![
                self.published_filter(),
                Filter::MultiSelectContains {
                    property: self.schema.tags_property.clone(),
                    contains: tag.to_string(),
                },
            ]))
            .sort(self.newest_first());
        let pages = self.source.query(&query).await?;
        Ok(self.normalize_all(&pages).await)
    }

    /// Published posts carrying `tag`, newest first
    pub async fn posts_by_tag(&self, tag: &str) -> Vec<Post> {
        collapse(self.try_posts_by_tag(tag).await, "posts by tag")
    }

    pub async fn try_all_tags(&self) -> Result<Vec<String>, ContentError> {
        let tags: BTreeSet<String> = self
            .published_properties()
            .await?
            .into_iter()
            .flat_map(|p| p.tags)
            .collect();
        Ok(tags.into_iter().collect())
    }

    /// Every tag used by a published post, sorted
    pub async fn all_tags(&self) -> Vec<String> {
        collapse(self.try_all_tags().await, "tags")
    }

    pub async fn try_all_post_slugs(&self) -> Result<Vec<String>, ContentError> {
        Ok(self
            .try_all_posts()
            .await?
            .into_iter()
            .map(|p| p.slug)
            .collect())
    }

    /// Slugs of all published posts (served from the listing cache when fresh)
    pub async fn all_post_slugs(&self) -> Vec<String> {
        collapse(self.try_all_post_slugs().await, "post slugs")
    }

    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }
}

/// Turn a failed lookup into its empty default, logging why
fn collapse<T: Default>(result: Result<T, ContentError>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(ContentError::Unavailable) => {
            tracing::warn!("Notion client not available, returning no {}", what);
            T::default()
        }
        Err(e) => {
            tracing::error!("Error fetching {} from Notion: {}", what, e);
            T::default()
        }
    }
}
