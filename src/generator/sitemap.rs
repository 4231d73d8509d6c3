//! sitemap.xml generation

use chrono::{DateTime, Utc};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{date_xml, escape_xml, full_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// One `<url>` element
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
}

/// Static routes: (path, change frequency, priority)
const STATIC_PAGES: &[(&str, ChangeFrequency, f32)] = &[
    ("/", ChangeFrequency::Weekly, 1.0),
    ("/blog", ChangeFrequency::Daily, 0.8),
    ("/chart", ChangeFrequency::Monthly, 0.9),
    ("/pricing", ChangeFrequency::Monthly, 0.7),
    ("/privacy-policy", ChangeFrequency::Yearly, 0.3),
    ("/terms-and-conditions", ChangeFrequency::Yearly, 0.3),
    ("/refund-policy", ChangeFrequency::Yearly, 0.3),
];

const POST_PRIORITY: f32 = 0.6;

/// Static pages followed by one entry per post
pub fn sitemap_entries(config: &SiteConfig, posts: &[Post], now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let static_pages = STATIC_PAGES.iter().map(|(path, freq, priority)| SitemapEntry {
        url: full_url(&config.url, path),
        last_modified: now,
        change_frequency: *freq,
        priority: *priority,
    });

    let post_pages = posts.iter().map(|post| SitemapEntry {
        url: full_url(&config.url, &post.path()),
        last_modified: post.date,
        change_frequency: ChangeFrequency::Monthly,
        priority: POST_PRIORITY,
    });

    static_pages.chain(post_pages).collect()
}

/// Render entries as a sitemap document
pub fn sitemap_xml(entries: &[SitemapEntry]) -> String {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.url)));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            date_xml(&entry.last_modified)
        ));
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            entry.change_frequency.as_str()
        ));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Author, OgImage, PostStatus};
    use chrono::TimeZone;

    fn post(slug: &str, date: DateTime<Utc>) -> Post {
        Post {
            id: slug.to_string(),
            slug: slug.to_string(),
            title: slug.to_string(),
            date,
            cover_image: None,
            author: Author::named("Blog Author"),
            excerpt: String::new(),
            og_image: OgImage::default(),
            content: String::new(),
            tags: Vec::new(),
            reading_time: 1,
            status: PostStatus::Published,
        }
    }

    #[test]
    fn test_entries() {
        let config = SiteConfig::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let published = Utc.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();

        let entries = sitemap_entries(&config, &[post("projectors", published)], now);
        assert_eq!(entries.len(), STATIC_PAGES.len() + 1);
        assert_eq!(entries[0].url, "https://vera-new-website.vercel.app");
        assert_eq!(entries[0].priority, 1.0);
        assert_eq!(entries[1].change_frequency, ChangeFrequency::Daily);

        let last = entries.last().unwrap();
        assert_eq!(last.url, "https://vera-new-website.vercel.app/blog/projectors");
        assert_eq!(last.last_modified, published);
        assert_eq!(last.change_frequency, ChangeFrequency::Monthly);
    }

    #[test]
    fn test_xml() {
        let entry = SitemapEntry {
            url: "https://example.com/blog/a&b".to_string(),
            last_modified: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            change_frequency: ChangeFrequency::Monthly,
            priority: 0.6,
        };
        let xml = sitemap_xml(&[entry]);
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<loc>https://example.com/blog/a&amp;b</loc>"));
        assert!(xml.contains("<lastmod>2024-01-15T00:00:00.000+00:00</lastmod>"));
        assert!(xml.contains("<changefreq>monthly</changefreq>"));
        assert!(xml.contains("<priority>0.6</priority>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }
}
