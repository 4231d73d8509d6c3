//! Content module - posts, markdown rendering, normalization and the repository

pub mod markdown;
pub mod normalize;
mod post;
pub mod repository;

pub use markdown::{markdown_to_html, MarkdownRenderer, RenderMarkdown, CONTENT_PLACEHOLDER};
pub use normalize::{generate_slug, PostNormalizer, PostProperties, QuerySchema};
pub use post::{Author, OgImage, Post, PostStatus};
pub use repository::ContentRepository;
