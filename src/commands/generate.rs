//! Generate static files

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::generator::{robots_txt, sitemap_entries, sitemap_xml};
use crate::Site;

/// Write sitemap.xml, robots.txt and the post JSON into `out_dir`
pub async fn run(site: &Site, out_dir: &Path) -> Result<()> {
    let start = std::time::Instant::now();
    fs::create_dir_all(out_dir.join("posts"))?;

    let posts = site.repository.all_posts().await;
    tracing::info!("Loaded {} posts", posts.len());

    let entries = sitemap_entries(&site.config, &posts, chrono::Utc::now());
    fs::write(out_dir.join("sitemap.xml"), sitemap_xml(&entries))?;
    fs::write(out_dir.join("robots.txt"), robots_txt(&site.config))?;
    fs::write(
        out_dir.join("posts.json"),
        serde_json::to_string_pretty(&posts)?,
    )?;

    let mut written = 0;
    for post in &posts {
        if !is_url_safe(&post.slug) {
            tracing::warn!("Skipping post {} with unsafe slug {:?}", post.id, post.slug);
            continue;
        }
        let path = out_dir.join("posts").join(format!("{}.json", post.slug));
        fs::write(path, serde_json::to_string_pretty(post)?)?;
        written += 1;
    }

    let tags = site.repository.all_tags().await;
    fs::write(out_dir.join("tags.json"), serde_json::to_string_pretty(&tags)?)?;

    tracing::info!(
        "Generated {} files in {:.2}s",
        written + 4,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Slugs become file names: only `[a-z0-9-]` is accepted
fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
