//! Generator module - crawler-facing documents built from site config and posts

mod robots;
mod sitemap;

pub use robots::robots_txt;
pub use sitemap::{sitemap_entries, sitemap_xml, ChangeFrequency, SitemapEntry};
