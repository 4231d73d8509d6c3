//! List site content

use anyhow::Result;

use crate::helpers::{format_date, site_timezone};
use crate::Site;

/// List site content by type
pub async fn run(site: &Site, content_type: &str) -> Result<()> {
    let repository = &site.repository;

    match content_type {
        "post" | "posts" => {
            let tz = site_timezone(&site.config.timezone);
            let posts = repository.all_posts().await;
            println!("Posts ({}):", posts.len());
            for post in posts {
                println!(
                    "  {} - {} [{}] ({} min)",
                    format_date(&post.date, tz, "%Y-%m-%d"),
                    post.title,
                    post.slug,
                    post.reading_time
                );
            }
        }
        "tag" | "tags" => {
            let tags = repository.all_tags().await;
            println!("Tags ({}):", tags.len());
            for tag in tags {
                println!("  {}", tag);
            }
        }
        "slug" | "slugs" => {
            for slug in repository.all_post_slugs().await {
                println!("{}", slug);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag, slug", content_type);
        }
    }

    Ok(())
}
