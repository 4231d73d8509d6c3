//! Markdown rendering with optional syntax highlighting

use anyhow::{anyhow, Result};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;
use crate::helpers::html_escape;

/// Content shown when a post has no body or its body could not be produced
pub const CONTENT_PLACEHOLDER: &str = "<p>Content coming soon...</p>";

/// Anything able to turn markdown into HTML
pub trait RenderMarkdown: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String>;
}

/// Render, falling back to the raw input in a `<pre>` block on failure
pub fn markdown_to_html(renderer: &dyn RenderMarkdown, markdown: &str) -> String {
    match renderer.render(markdown) {
        Ok(html) => html,
        Err(e) => {
            tracing::error!("Error processing markdown: {}", e);
            format!("<pre>{}</pre>", markdown)
        }
    }
}

/// Markdown renderer (GFM, hard line breaks, raw HTML allowed)
pub struct MarkdownRenderer {
    highlighter: Option<Highlighter>,
}

struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer without highlighting
    pub fn new() -> Self {
        Self { highlighter: None }
    }

    /// Create with syntect highlighting of fenced code blocks
    pub fn with_highlighting(theme: &str, line_numbers: bool) -> Self {
        Self {
            highlighter: Some(Highlighter {
                syntax_set: SyntaxSet::load_defaults_newlines(),
                theme_set: ThemeSet::load_defaults(),
                theme_name: theme.to_string(),
                line_numbers,
            }),
        }
    }

    pub fn from_config(config: &HighlightConfig) -> Self {
        if config.enable {
            Self::with_highlighting(&config.theme, config.line_number)
        } else {
            Self::new()
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // Some(lang) while inside a fenced block that is being highlighted
        let mut code_block: Option<(String, String)> = None;

        for event in parser {
            match event {
                // Single newlines become visible breaks
                Event::SoftBreak => events.push(Event::HardBreak),
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref lang)))
                    if self.highlighter.is_some() && !lang.is_empty() =>
                {
                    code_block = Some((lang.to_string(), String::new()));
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) if code_block.is_some() => {
                    if let (Some((lang, code)), Some(highlighter)) =
                        (code_block.take(), self.highlighter.as_ref())
                    {
                        let highlighted = highlighter.highlight(&code, &lang)?;
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderMarkdown for MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String> {
        MarkdownRenderer::render(self, markdown)
    }
}

impl Highlighter {
    /// Highlight a code block
    fn highlight(&self, code: &str, lang: &str) -> Result<String> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .ok_or_else(|| anyhow!("unknown highlight theme: {}", self.theme_name))?;

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) if self.line_numbers => Ok(add_line_numbers(&highlighted, lang)),
            Ok(highlighted) => Ok(format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                lang, highlighted
            )),
            Err(e) => {
                tracing::debug!("Highlighting failed for {}: {}", lang, e);
                Ok(format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    lang,
                    html_escape(code)
                ))
            }
        }
    }
}

/// Add line numbers to highlighted code
fn add_line_numbers(code: &str, lang: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();

    let gutter = (1..=lines.len())
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        lang,
        gutter,
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl RenderMarkdown for Broken {
        fn render(&self, _markdown: &str) -> Result<String> {
            Err(anyhow!("boom"))
        }
    }

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_single_newline_is_break() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("line one\nline two").unwrap();
        assert!(html.contains("line one<br />"));
        assert!(html.contains("line two"));
    }

    #[test]
    fn test_gfm_extensions() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("| a | b |\n| --- | --- |\n| 1 | 2 |\n\n~~old~~\n\n- [x] done")
            .unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
        assert!(html.contains("checkbox"));
    }

    #[test]
    fn test_raw_html_passes_through() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("<details><summary>More</summary>\n\nHidden\n\n</details>")
            .unwrap();
        assert!(html.contains("<details><summary>More</summary>"));
    }

    #[test]
    fn test_plain_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains(r#"<pre><code class="language-rust">fn main() {}"#));
    }

    #[test]
    fn test_highlighted_code_block() {
        let renderer = MarkdownRenderer::with_highlighting("base16-ocean.dark", true);
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("highlight rust"));
        assert!(html.contains("line-number"));
    }

    #[test]
    fn test_unknown_theme_falls_back_to_pre() {
        let renderer = MarkdownRenderer::with_highlighting("no-such-theme", false);
        let markdown = "```rust\nfn main() {}\n```";
        assert!(renderer.render(markdown).is_err());
        assert_eq!(
            markdown_to_html(&renderer, markdown),
            format!("<pre>{}</pre>", markdown)
        );
    }

    #[test]
    fn test_failure_returns_original_input() {
        let html = markdown_to_html(&Broken, "**raw** input");
        assert_eq!(html, "<pre>**raw** input</pre>");
    }
}
