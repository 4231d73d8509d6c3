//! Notion API client and the capability-checked content source

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;

use super::blocks;
use super::error::ContentError;
use super::types::{ApiErrorBody, Block, BlockNode, ListResponse, Page, Query, PAGE_SIZE};
use crate::config::NotionConfig;

/// Nested blocks deeper than this are not fetched
const MAX_BLOCK_DEPTH: usize = 8;

/// Raw query primitives over the post collection
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Run a filtered, sorted query over the whole collection
    async fn query(&self, query: &Query) -> Result<Vec<Page>, ContentError>;

    /// Fetch a record's body as markdown
    async fn page_markdown(&self, page_id: &str) -> Result<String, ContentError>;
}

/// The content source as seen by the repository: either connected or switched off
#[derive(Clone)]
pub enum ContentSource {
    Connected(Arc<dyn PostSource>),
    Disabled,
}

impl ContentSource {
    /// Build from configuration.
    ///
    /// Missing credentials yield `Disabled`, unless `required` is set, in which case
    /// they are an error.
    pub fn from_config(config: &NotionConfig) -> Result<Self, ContentError> {
        match config.credentials() {
            Some(_) => Ok(Self::Connected(Arc::new(NotionClient::from_config(config)?))),
            None if config.required => {
                let missing = if config.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                    "NOTION_API_KEY"
                } else {
                    "NOTION_BLOG_DATABASE_ID"
                };
                Err(ContentError::MissingCredential(missing))
            }
            None => {
                tracing::info!("Notion credentials not set, blog content disabled");
                Ok(Self::Disabled)
            }
        }
    }

    pub fn connected<S: PostSource + 'static>(source: S) -> Self {
        Self::Connected(Arc::new(source))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    pub async fn query(&self, query: &Query) -> Result<Vec<Page>, ContentError> {
        match self {
            Self::Connected(source) => source.query(query).await,
            Self::Disabled => Err(ContentError::Unavailable),
        }
    }

    pub async fn page_markdown(&self, page_id: &str) -> Result<String, ContentError> {
        match self {
            Self::Connected(source) => source.page_markdown(page_id).await,
            Self::Disabled => Err(ContentError::Unavailable),
        }
    }
}

impl std::fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected(_) => f.write_str("ContentSource::Connected"),
            Self::Disabled => f.write_str("ContentSource::Disabled"),
        }
    }
}

/// Notion REST API client bound to one database
pub struct NotionClient {
    api_key: String,
    database_id: String,
    api_base: String,
    api_version: String,
    client: reqwest::Client,
}

impl NotionClient {
    /// Create a new client against the public API
    pub fn new(api_key: String, database_id: String) -> Self {
        let defaults = NotionConfig::default();
        Self {
            api_key,
            database_id,
            api_base: defaults.api_base,
            api_version: defaults.api_version,
            client: reqwest::Client::new(),
        }
    }

    /// Create from config
    pub fn from_config(config: &NotionConfig) -> Result<Self, ContentError> {
        let (api_key, database_id) = config.credentials().ok_or(ContentError::Unavailable)?;
        Ok(Self {
            api_key: api_key.to_string(),
            database_id: database_id.to_string(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            client: reqwest::Client::new(),
        })
    }

    /// Build API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ContentError> {
        let response = request
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.api_version)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body: ApiErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            return Err(ContentError::Api {
                status: status.as_u16(),
                code: body.code,
                message: body.message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// All direct children of a block, following pagination
    async fn block_children(&self, block_id: &str) -> Result<Vec<Block>, ContentError> {
        let url = self.api_url(&format!("blocks/{}/children", block_id));
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .query(&[("page_size", PAGE_SIZE.to_string())]);
            if let Some(c) = &cursor {
                request = request.query(&[("start_cursor", c)]);
            }

            let page: ListResponse<Block> = self.send(request).await?;
            blocks.extend(page.results);

            match page.next_cursor {
                Some(next) if page.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(blocks)
    }

    /// Fetch a block and its descendants
    fn block_tree<'a>(
        &'a self,
        block_id: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, Result<Vec<BlockNode>, ContentError>> {
        async move {
            let blocks = self.block_children(block_id).await?;
            let mut nodes = Vec::with_capacity(blocks.len());

            for block in blocks {
                let children = if block.owns_children() && depth < MAX_BLOCK_DEPTH {
                    self.block_tree(&block.id, depth + 1).await?
                } else {
                    Vec::new()
                };
                nodes.push(BlockNode { block, children });
            }

            Ok(nodes)
        }
        .boxed()
    }
}

#[async_trait]
impl PostSource for NotionClient {
    async fn query(&self, query: &Query) -> Result<Vec<Page>, ContentError> {
        let url = self.api_url(&format!("databases/{}/query", self.database_id));
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let request = self.client.post(&url).json(&query.body(cursor.as_deref()));
            let response: ListResponse<Page> = self.send(request).await?;
            pages.extend(response.results);

            match response.next_cursor {
                Some(next) if response.has_more => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!("Notion query returned {} pages", pages.len());
        Ok(pages)
    }

    async fn page_markdown(&self, page_id: &str) -> Result<String, ContentError> {
        let tree = self.block_tree(page_id, 0).await?;
        Ok(blocks::to_markdown(&tree))
    }
}
