//! Post model served to the page layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blog post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Source record id
    pub id: String,

    /// URL-safe name, unique across published posts
    pub slug: String,

    pub title: String,

    /// Publication date
    pub date: DateTime<Utc>,

    /// Cover image URL
    pub cover_image: Option<String>,

    pub author: Author,

    /// Short summary, falls back to the title
    pub excerpt: String,

    /// Open Graph image, mirrors the cover
    pub og_image: OgImage,

    /// Rendered HTML content
    pub content: String,

    pub tags: Vec<String>,

    /// Estimated minutes to read, at least 1
    pub reading_time: u32,

    pub status: PostStatus,
}

impl Post {
    /// Site-relative URL path
    pub fn path(&self) -> String {
        format!("/blog/{}", self.slug)
    }
}

/// Post author (denormalized onto every post)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub picture: String,
    pub bio: String,
    pub title: String,
}

impl Author {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OgImage {
    pub url: Option<String>,
}

/// Publication status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostStatus {
    Published,
    #[default]
    Draft,
}

impl PostStatus {
    /// Anything but an exact "Published" is a draft
    pub fn from_name(name: &str) -> Self {
        if name == "Published" {
            Self::Published
        } else {
            Self::Draft
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_name() {
        assert_eq!(PostStatus::from_name("Published"), PostStatus::Published);
        assert_eq!(PostStatus::from_name("In review"), PostStatus::Draft);
        assert_eq!(PostStatus::from_name(""), PostStatus::Draft);
    }

    #[test]
    fn test_serialized_shape() {
        let post = Post {
            id: "abc".to_string(),
            slug: "my-post".to_string(),
            title: "My Post".to_string(),
            date: "2024-03-01T00:00:00Z".parse().unwrap(),
            cover_image: None,
            author: Author::named("Blog Author"),
            excerpt: "My Post".to_string(),
            og_image: OgImage::default(),
            content: "<p>Hi</p>".to_string(),
            tags: vec!["Types".to_string()],
            reading_time: 1,
            status: PostStatus::Published,
        };

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["coverImage"], serde_json::Value::Null);
        assert_eq!(json["readingTime"], 1);
        assert_eq!(json["status"], "Published");
        assert_eq!(json["ogImage"]["url"], serde_json::Value::Null);
        assert_eq!(json["author"]["name"], "Blog Author");
        assert_eq!(post.path(), "/blog/my-post");
    }
}
