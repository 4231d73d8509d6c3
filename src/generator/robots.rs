//! robots.txt generation

use crate::config::SiteConfig;
use crate::helpers::full_url;

/// Render robots.txt from the crawler rules in the site config
pub fn robots_txt(config: &SiteConfig) -> String {
    let robots = &config.robots;
    let mut lines = vec![format!("User-agent: {}", robots.user_agent)];

    lines.extend(robots.allow.iter().map(|path| format!("Allow: {}", path)));
    lines.extend(robots.disallow.iter().map(|path| format!("Disallow: {}", path)));

    lines.push(String::new());
    lines.push(format!("Sitemap: {}", full_url(&config.url, "/sitemap.xml")));
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let txt = robots_txt(&SiteConfig::default());
        assert!(txt.starts_with("User-agent: *\nAllow: /\n"));
        assert!(txt.contains("Disallow: /api/\n"));
        assert!(txt.contains("Disallow: *.json\n"));
        assert!(txt.contains("Disallow: /checkout_redirect/\n"));
        assert!(txt.contains("Sitemap: https://vera-new-website.vercel.app/sitemap.xml"));
    }
}
