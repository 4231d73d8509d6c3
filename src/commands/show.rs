//! Show a single post or the posts of a tag

use anyhow::Result;

use crate::helpers::{full_date, site_timezone};
use crate::Site;

/// Print one post by slug, as JSON or a short summary
pub async fn post(site: &Site, slug: &str, json: bool) -> Result<()> {
    let Some(post) = site.repository.post_by_slug(slug).await else {
        anyhow::bail!("No published post with slug: {}", slug);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&post)?);
        return Ok(());
    }

    let tz = site_timezone(&site.config.timezone);
    println!("{}", post.title);
    println!(
        "{} · {} min read · {}",
        full_date(&post.date, tz),
        post.reading_time,
        post.author.name
    );
    if !post.tags.is_empty() {
        println!("Tags: {}", post.tags.join(", "));
    }
    println!();
    println!("{}", post.content);

    Ok(())
}

/// Print the posts carrying a tag
pub async fn tag(site: &Site, tag: &str) -> Result<()> {
    let posts = site.repository.posts_by_tag(tag).await;
    println!("Posts tagged {:?} ({}):", tag, posts.len());
    for post in posts {
        println!("  {} [{}]", post.title, post.slug);
    }
    Ok(())
}
