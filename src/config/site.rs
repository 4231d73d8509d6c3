//! Site configuration (_config.yml + environment)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub url: String,
    pub og_image: String,
    pub timezone: String,
    pub per_page: usize,

    // Content source
    #[serde(default)]
    pub notion: NotionConfig,

    // Rendering
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Crawlers
    #[serde(default)]
    pub robots: RobotsConfig,

    // Chart / location backend
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Human Design Blog & Insights".to_string(),
            description: "Explore Human Design with Vera's expert insights. Learn about your \
                          energy type, strategy, and authority through our comprehensive \
                          guides and tips."
                .to_string(),
            url: "https://vera-new-website.vercel.app".to_string(),
            og_image: "/screenshot.png".to_string(),
            timezone: "UTC".to_string(),
            per_page: 6,

            notion: NotionConfig::default(),
            highlight: HighlightConfig::default(),
            robots: RobotsConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load `_config.yml` from a directory if present, then overlay the environment
    pub fn discover<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let mut config = if config_path.exists() {
            tracing::debug!("Loading config from {:?}", config_path);
            Self::load(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Overlay values from environment variables.
    ///
    /// The lookup is injected so tests don't have to touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("NOTION_API_KEY") {
            self.notion.api_key = Some(key);
        }
        if let Some(id) = lookup("NOTION_BLOG_DATABASE_ID") {
            self.notion.database_id = Some(id);
        }
        if let Some(required) = lookup("NOTION_REQUIRED") {
            self.notion.required = matches!(required.as_str(), "1" | "true" | "yes");
        }
        if let Some(url) = lookup("BACKEND_API_URL") {
            self.backend.url = url;
        }
    }
}

/// Notion content source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Integration token; normally supplied through `NOTION_API_KEY`
    pub api_key: Option<String>,
    /// Blog database id; normally supplied through `NOTION_BLOG_DATABASE_ID`
    pub database_id: Option<String>,
    /// Fail at startup instead of serving an empty blog when credentials are missing
    pub required: bool,
    pub api_base: String,
    pub api_version: String,
    /// Property the published filter is applied to
    pub status_property: String,
    /// Whether that property is a `status` or a `select` property
    pub status_property_type: StatusPropertyType,
    /// Property listings are sorted by
    pub sort_property: String,
    /// Property tag filters are applied to
    pub tags_property: String,
    /// Lifetime of the cached post listing, in seconds
    pub cache_ttl: u64,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            database_id: None,
            required: false,
            api_base: "https://api.notion.com/v1".to_string(),
            api_version: "2022-06-28".to_string(),
            status_property: "Status".to_string(),
            status_property_type: StatusPropertyType::Status,
            sort_property: "Publish Date".to_string(),
            tags_property: "Tags".to_string(),
            cache_ttl: 300,
        }
    }
}

impl NotionConfig {
    /// Both credentials present and non-empty
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let key = self.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
        let db = self.database_id.as_deref().filter(|d| !d.trim().is_empty())?;
        Some((key, db))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

/// Notion property type backing the publication status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPropertyType {
    #[default]
    Status,
    Select,
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: false,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// robots.txt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotsConfig {
    pub user_agent: String,
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            user_agent: "*".to_string(),
            allow: vec!["/".to_string()],
            disallow: vec![
                "/api/".to_string(),
                "/_next/".to_string(),
                "/private/".to_string(),
                "*.json".to_string(),
                "/checkout_redirect/".to_string(),
            ],
        }
    }
}

/// Chart calculation / geocoding backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "https://vera.up.railway.app".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.per_page, 6);
        assert_eq!(config.notion.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.notion.status_property, "Status");
        assert_eq!(config.notion.status_property_type, StatusPropertyType::Status);
        assert!(config.notion.credentials().is_none());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Vera Blog
per_page: 12
notion:
  sort_property: Date
  status_property_type: select
  cache_ttl: 60
highlight:
  enable: true
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Vera Blog");
        assert_eq!(config.per_page, 12);
        assert_eq!(config.notion.sort_property, "Date");
        assert_eq!(config.notion.status_property, "Status");
        assert_eq!(config.notion.status_property_type, StatusPropertyType::Select);
        assert_eq!(config.notion.cache_ttl, 60);
        assert!(config.highlight.enable);
    }

    #[test]
    fn test_env_overlay() {
        let env: HashMap<&str, &str> = [
            ("NOTION_API_KEY", "secret_abc"),
            ("NOTION_BLOG_DATABASE_ID", "db123"),
            ("NOTION_REQUIRED", "true"),
            ("BACKEND_API_URL", "http://localhost:8000"),
        ]
        .into_iter()
        .collect();

        let mut config = SiteConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.notion.credentials(), Some(("secret_abc", "db123")));
        assert!(config.notion.required);
        assert_eq!(config.backend.url, "http://localhost:8000");
    }

    #[test]
    fn test_blank_credentials_are_absent() {
        let mut config = NotionConfig::default();
        config.api_key = Some("key".to_string());
        config.database_id = Some("  ".to_string());
        assert!(config.credentials().is_none());
    }

    #[test]
    fn test_discover_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("_config.yml"), "title: From File\n").unwrap();

        let config = SiteConfig::discover(dir.path()).unwrap();
        assert_eq!(config.title, "From File");
    }
}
