//! vera-site: content layer and site backend for the Vera website
//!
//! Blog posts live in a Notion database. This crate fetches them, flattens the
//! workspace's loosely-typed properties into a fixed [`content::Post`] shape,
//! renders their bodies to HTML, and caches the listing for a few minutes. It also
//! produces the sitemap and robots.txt, serves everything over HTTP, and talks to
//! the chart calculation backend.

pub mod backend;
pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod notion;
pub mod server;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cache::PostCache;
use content::{ContentRepository, MarkdownRenderer, PostNormalizer, QuerySchema};
use notion::ContentSource;

/// The site: configuration plus the shared content repository
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Post repository, shared by all callers
    pub repository: Arc<ContentRepository>,
    backend: Arc<backend::BackendClient>,
}

impl Site {
    /// Create a site from a directory (`_config.yml` + environment)
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config = config::SiteConfig::discover(&base_dir)?;
        Self::from_config(config, base_dir)
    }

    /// Create a site from an already loaded configuration
    pub fn from_config(config: config::SiteConfig, base_dir: PathBuf) -> Result<Self> {
        let source = ContentSource::from_config(&config.notion)?;
        Ok(Self::with_source(config, base_dir, source))
    }

    /// Create a site over an explicit content source
    pub fn with_source(config: config::SiteConfig, base_dir: PathBuf, source: ContentSource) -> Self {
        let renderer = Arc::new(MarkdownRenderer::from_config(&config.highlight));
        let cache = Arc::new(PostCache::with_ttl(config.notion.cache_ttl()));
        let repository = ContentRepository::new(
            source,
            cache,
            PostNormalizer::new(renderer),
            QuerySchema::from(&config.notion),
        );

        let backend_client = backend::BackendClient::new(config.backend.url.clone());

        Self {
            config,
            base_dir,
            repository: Arc::new(repository),
            backend: Arc::new(backend_client),
        }
    }

    /// Client for the chart / location backend, shared so place lookups stay memoized
    pub fn backend(&self) -> &backend::BackendClient {
        &self.backend
    }

    /// Current sitemap.xml
    pub async fn sitemap(&self) -> String {
        let posts = self.repository.all_posts().await;
        let entries = generator::sitemap_entries(&self.config, &posts, chrono::Utc::now());
        generator::sitemap_xml(&entries)
    }

    /// robots.txt
    pub fn robots(&self) -> String {
        generator::robots_txt(&self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_client_is_shared() {
        let site = Site::with_source(
            config::SiteConfig::default(),
            PathBuf::from("."),
            ContentSource::Disabled,
        );
        let copy = site.clone();

        assert!(std::ptr::eq(site.backend(), site.backend()));
        assert!(std::ptr::eq(site.backend(), copy.backend()));
    }
}
