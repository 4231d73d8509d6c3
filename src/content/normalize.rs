//! Flattening of heterogeneous database rows into `Post`s
//!
//! Workspace schemas drift: the same logical field may be called "Title" in one
//! database and "Name" in another, and status may be a `select` or a `status`
//! property. Each field is resolved through an ordered list of accepted names.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use super::markdown::{markdown_to_html, RenderMarkdown, CONTENT_PLACEHOLDER};
use super::post::{Author, OgImage, Post, PostStatus};
use crate::config::{NotionConfig, StatusPropertyType};
use crate::notion::{plain_text, ContentError, ContentSource, Page};

pub const TITLE_PROPERTIES: &[&str] = &["Title", "Name"];
pub const SLUG_PROPERTIES: &[&str] = &["Slug", "URL Slug"];
pub const DATE_PROPERTIES: &[&str] = &["Date", "Publish Date", "Published", "Created"];
pub const STATUS_PROPERTIES: &[&str] = &["Status", "Published"];
pub const EXCERPT_PROPERTIES: &[&str] = &["Excerpt", "Summary", "Description"];
pub const COVER_PROPERTIES: &[&str] = &["Cover Image", "Featured Image", "Image"];
pub const TAG_PROPERTIES: &[&str] = &["Tags", "Categories", "Category"];
pub const AUTHOR_PROPERTIES: &[&str] = &["Author Name", "Author", "Writer"];

pub const UNTITLED: &str = "Untitled";
pub const DEFAULT_AUTHOR: &str = "Blog Author";

/// Reading speed used for the reading-time estimate
pub const WORDS_PER_MINUTE: usize = 200;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new("[^a-z0-9]+").unwrap();
}

/// Property names queries filter and sort on.
///
/// When reading a row, a configured name that is not a built-in alias is tried first.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySchema {
    pub status_property: String,
    pub status_property_type: StatusPropertyType,
    pub sort_property: String,
    pub tags_property: String,
}

impl Default for QuerySchema {
    fn default() -> Self {
        Self::from(&NotionConfig::default())
    }
}

impl From<&NotionConfig> for QuerySchema {
    fn from(config: &NotionConfig) -> Self {
        Self {
            status_property: config.status_property.clone(),
            status_property_type: config.status_property_type,
            sort_property: config.sort_property.clone(),
            tags_property: config.tags_property.clone(),
        }
    }
}

/// First property among `names` that is present and non-null
pub fn resolve_property<'a>(
    properties: &'a Map<String, Value>,
    names: &[&str],
) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| properties.get(*name).filter(|v| !v.is_null()))
}

/// Alias lookup with a configured name in front of the aliases.
/// A name that already is an alias keeps its usual position.
fn resolve_preferred<'a>(
    properties: &'a Map<String, Value>,
    preferred: &str,
    aliases: &[&str],
) -> Option<&'a Value> {
    if aliases.contains(&preferred) {
        return resolve_property(properties, aliases);
    }
    properties
        .get(preferred)
        .filter(|v| !v.is_null())
        .or_else(|| resolve_property(properties, aliases))
}

/// Slug from a title: lowercase, non-alphanumeric runs collapsed to `-`, no edge hyphens
pub fn generate_slug(title: &str) -> String {
    let lower = title.to_lowercase();
    NON_ALNUM
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// URL of the first entry of a files property, preferring hosted files
pub fn extract_image_url(files: &Value) -> Option<String> {
    let first = files.as_array()?.first()?;
    first["file"]["url"]
        .as_str()
        .filter(|u| !u.is_empty())
        .or_else(|| first["external"]["url"].as_str())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

/// Minutes to read `text`, rounded up, at least one
pub fn reading_time(text: &str) -> u32 {
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// Parse an ISO-8601 timestamp or a bare date (taken as midnight UTC)
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Everything about a post that can be read without fetching its body
#[derive(Debug, Clone, PartialEq)]
pub struct PostProperties {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub cover_image: Option<String>,
    pub author: Author,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub status: PostStatus,
}

impl PostProperties {
    /// Read a row using the default property names
    pub fn from_page(page: &Page) -> Self {
        Self::from_page_with(page, &QuerySchema::default())
    }

    /// Read a row, trying the schema's property names first
    pub fn from_page_with(page: &Page, schema: &QuerySchema) -> Self {
        let props = &page.properties;

        let title = resolve_property(props, TITLE_PROPERTIES)
            .map(|p| plain_text(&p["title"]))
            .and_then(non_empty)
            .unwrap_or_else(|| UNTITLED.to_string());

        // Explicit slugs go through the same rules as generated ones so they stay URL-safe
        let slug = resolve_property(props, SLUG_PROPERTIES)
            .map(|p| generate_slug(&plain_text(&p["rich_text"])))
            .and_then(non_empty)
            .or_else(|| non_empty(generate_slug(&title)))
            .or_else(|| non_empty(generate_slug(&page.id)))
            .unwrap_or_else(|| "untitled".to_string());

        let date = resolve_preferred(props, &schema.sort_property, DATE_PROPERTIES)
            .and_then(|p| {
                p["date"]["start"]
                    .as_str()
                    .or_else(|| p["created_time"].as_str())
            })
            .and_then(parse_date)
            .unwrap_or_else(Utc::now);

        let status = resolve_preferred(props, &schema.status_property, STATUS_PROPERTIES)
            .and_then(|p| {
                p["select"]["name"]
                    .as_str()
                    .or_else(|| p["status"]["name"].as_str())
            })
            .map(PostStatus::from_name)
            .unwrap_or(PostStatus::Draft);

        let excerpt = resolve_property(props, EXCERPT_PROPERTIES)
            .map(|p| plain_text(&p["rich_text"]))
            .and_then(non_empty)
            .unwrap_or_else(|| title.clone());

        let cover_image =
            resolve_property(props, COVER_PROPERTIES).and_then(|p| extract_image_url(&p["files"]));

        let tags = resolve_preferred(props, &schema.tags_property, TAG_PROPERTIES)
            .map(extract_tags)
            .unwrap_or_default();

        let author_name = resolve_property(props, AUTHOR_PROPERTIES)
            .map(|p| {
                let text = plain_text(&p["rich_text"]);
                if text.is_empty() {
                    p["people"][0]["name"].as_str().unwrap_or("").to_string()
                } else {
                    text
                }
            })
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        Self {
            id: page.id.clone(),
            slug,
            title,
            date,
            cover_image,
            author: Author::named(author_name),
            excerpt,
            tags,
            status,
        }
    }

    /// Combine with a rendered body into a full post
    pub fn into_post(self, content: String, reading_time: u32) -> Post {
        Post {
            id: self.id,
            slug: self.slug,
            title: self.title,
            date: self.date,
            og_image: OgImage {
                url: self.cover_image.clone(),
            },
            cover_image: self.cover_image,
            author: self.author,
            excerpt: self.excerpt,
            content,
            tags: self.tags,
            reading_time: reading_time.max(1),
            status: self.status,
        }
    }
}

/// Tag names from a multi-select, or a single select used as a category
fn extract_tags(prop: &Value) -> Vec<String> {
    if let Some(options) = prop["multi_select"].as_array() {
        return options
            .iter()
            .filter_map(|o| o["name"].as_str())
            .map(str::to_string)
            .collect();
    }
    prop["select"]["name"]
        .as_str()
        .map(|name| vec![name.to_string()])
        .unwrap_or_default()
}

/// Turns source rows into posts, fetching and rendering their bodies
#[derive(Clone)]
pub struct PostNormalizer {
    renderer: Arc<dyn RenderMarkdown>,
}

impl PostNormalizer {
    pub fn new(renderer: Arc<dyn RenderMarkdown>) -> Self {
        Self { renderer }
    }

    /// HTML and reading time for a markdown body
    pub fn render_body(&self, markdown: &str) -> (String, u32) {
        if markdown.trim().is_empty() {
            return (CONTENT_PLACEHOLDER.to_string(), 1);
        }
        let html = markdown_to_html(self.renderer.as_ref(), markdown);
        (html, reading_time(markdown))
    }

    /// Full normalization of one row, including its body
    pub async fn normalize(&self, source: &ContentSource, page: &Page) -> Post {
        self.complete(source, PostProperties::from_page(page)).await
    }

    /// Fetch the body for already-extracted properties.
    ///
    /// A failing body never fails the post: it gets placeholder content instead.
    pub async fn complete(&self, source: &ContentSource, properties: PostProperties) -> Post {
        let (content, minutes) = match source.page_markdown(&properties.id).await {
            Ok(markdown) => self.render_body(&markdown),
            Err(ContentError::Unavailable) => (CONTENT_PLACEHOLDER.to_string(), 1),
            Err(e) => {
                tracing::warn!("Error converting content for page {}: {}", properties.id, e);
                (CONTENT_PLACEHOLDER.to_string(), 1)
            }
        };
        properties.into_post(content, minutes)
    }
}
