//! Notion content source - raw queries and block-to-markdown conversion

mod blocks;
mod client;
mod error;
mod types;

pub use blocks::{plain_text, rich_text_to_markdown, to_markdown};
pub use client::{ContentSource, NotionClient, PostSource};
pub use error::ContentError;
pub use types::{Block, BlockNode, Filter, Page, Query, Sort};
