//! URL helper functions

/// Join a site base URL and a path without doubling slashes
///
/// # Examples
/// ```ignore
/// full_url("https://example.com/", "/blog") // -> "https://example.com/blog"
/// ```
pub fn full_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_url() {
        assert_eq!(full_url("https://example.com/", "/blog"), "https://example.com/blog");
        assert_eq!(full_url("https://example.com", "blog/a"), "https://example.com/blog/a");
        assert_eq!(full_url("https://example.com/", ""), "https://example.com");
    }
}
