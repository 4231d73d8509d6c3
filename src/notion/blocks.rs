//! Block tree to markdown conversion

use serde_json::Value;

use super::types::BlockNode;

const INDENT: &str = "    ";

/// Convert a fetched block tree into a markdown document
pub fn to_markdown(nodes: &[BlockNode]) -> String {
    let mut out = String::new();
    let mut prev_kind: Option<&str> = None;
    let mut number = 0usize;

    for node in nodes {
        let kind = node.block.kind.as_str();

        number = if kind == "numbered_list_item" {
            if prev_kind == Some("numbered_list_item") {
                number + 1
            } else {
                1
            }
        } else {
            0
        };

        let rendered = render_node(node, number);
        if rendered.is_empty() {
            continue;
        }

        if let Some(prev) = prev_kind {
            // Items of the same list stay tight
            if is_list_item(prev) && is_list_item(kind) {
                out.push('\n');
            } else {
                out.push_str("\n\n");
            }
        }
        out.push_str(&rendered);
        prev_kind = Some(kind);
    }

    out
}

fn is_list_item(kind: &str) -> bool {
    matches!(kind, "bulleted_list_item" | "numbered_list_item" | "to_do")
}

fn render_node(node: &BlockNode, number: usize) -> String {
    let block = &node.block;
    let payload = block.payload();
    let text = rich_text_to_markdown(&payload["rich_text"]);

    let head = match block.kind.as_str() {
        "paragraph" => text,
        "heading_1" => format!("# {}", text),
        "heading_2" => format!("## {}", text),
        "heading_3" => format!("### {}", text),
        "bulleted_list_item" => format!("- {}", text),
        "numbered_list_item" => format!("{}. {}", number, text),
        "to_do" => {
            let checked = payload["checked"].as_bool().unwrap_or(false);
            format!("- [{}] {}", if checked { "x" } else { " " }, text)
        }
        "quote" => quote(&text),
        "callout" => {
            let icon = payload["icon"]["emoji"].as_str().unwrap_or("");
            if icon.is_empty() {
                quote(&text)
            } else {
                quote(&format!("{} {}", icon, text))
            }
        }
        "toggle" => {
            let body = to_markdown(&node.children);
            return format!(
                "<details><summary>{}</summary>\n\n{}\n\n</details>",
                text, body
            );
        }
        "code" => {
            let language = payload["language"].as_str().unwrap_or("");
            let language = if language == "plain text" { "" } else { language };
            format!("```{}\n{}\n```", language, plain_text(&payload["rich_text"]))
        }
        "divider" => "---".to_string(),
        "equation" => {
            let expression = payload["expression"].as_str().unwrap_or("");
            format!("$$\n{}\n$$", expression)
        }
        "image" => {
            let url = file_url(payload).unwrap_or_default();
            if url.is_empty() {
                return String::new();
            }
            let caption = plain_text(&payload["caption"]);
            format!("![{}]({})", caption, url)
        }
        "bookmark" | "embed" | "link_preview" => {
            let url = payload["url"].as_str().unwrap_or("");
            if url.is_empty() {
                return String::new();
            }
            let caption = plain_text(&payload["caption"]);
            let label = if caption.is_empty() { url } else { caption.as_str() };
            format!("[{}]({})", label, url)
        }
        "video" | "file" | "pdf" => match file_url(payload) {
            Some(url) => format!("[{}]({})", block.kind, url),
            None => return String::new(),
        },
        "table" => return render_table(node),
        // Child pages are separate posts and never inlined
        "child_page" | "child_database" => return String::new(),
        other => {
            tracing::debug!("Skipping unsupported block type: {}", other);
            if text.is_empty() {
                return String::new();
            }
            text
        }
    };

    if node.children.is_empty() {
        return head;
    }

    let children = to_markdown(&node.children);
    format!("{}\n{}", head, indent(&children))
}

fn render_table(node: &BlockNode) -> String {
    let rows: Vec<Vec<String>> = node
        .children
        .iter()
        .filter(|row| row.block.kind == "table_row")
        .map(|row| {
            row.block.payload()["cells"]
                .as_array()
                .map(|cells| {
                    cells
                        .iter()
                        .map(|cell| rich_text_to_markdown(cell).replace('|', "\\|"))
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();

    let Some(width) = rows.iter().map(Vec::len).max() else {
        return String::new();
    };
    if width == 0 {
        return String::new();
    }

    let line = |cells: &[String]| {
        let mut padded: Vec<&str> = cells.iter().map(String::as_str).collect();
        padded.resize(width, "");
        format!("| {} |", padded.join(" | "))
    };

    // GFM tables require a header; the first row serves as one
    let mut lines = vec![line(&rows[0])];
    lines.push(format!("|{}", " --- |".repeat(width)));
    for row in &rows[1..] {
        lines.push(line(row));
    }
    lines.join("\n")
}

fn quote(text: &str) -> String {
    text.lines()
        .map(|l| format!("> {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("{}{}", INDENT, l)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// URL of a file object, hosted or external
fn file_url(payload: &Value) -> Option<String> {
    payload["file"]["url"]
        .as_str()
        .or_else(|| payload["external"]["url"].as_str())
        .filter(|u| !u.trim().is_empty())
        .map(str::to_string)
}

/// Concatenated `plain_text` of a rich-text array, no formatting
pub fn plain_text(rich_text: &Value) -> String {
    rich_text
        .as_array()
        .map(|fragments| {
            fragments
                .iter()
                .filter_map(|f| f["plain_text"].as_str())
                .collect()
        })
        .unwrap_or_default()
}

/// Rich-text array to inline markdown, keeping annotations and links
pub fn rich_text_to_markdown(rich_text: &Value) -> String {
    let Some(fragments) = rich_text.as_array() else {
        return String::new();
    };

    let mut out = String::new();
    for fragment in fragments {
        let text = fragment["plain_text"].as_str().unwrap_or("");
        if text.is_empty() {
            continue;
        }

        if fragment["type"] == "equation" {
            out.push_str(&format!("${}$", text));
            continue;
        }

        let annotations = &fragment["annotations"];
        let flag = |name: &str| annotations[name].as_bool().unwrap_or(false);

        // Markers must hug the text, so surrounding whitespace is kept outside
        let trimmed = text.trim();
        if trimmed.is_empty() {
            out.push_str(text);
            continue;
        }
        let leading = &text[..text.len() - text.trim_start().len()];
        let trailing = &text[text.trim_end().len()..];

        let mut inner = trimmed.to_string();
        if flag("code") {
            inner = format!("`{}`", inner);
        }
        if flag("bold") {
            inner = format!("**{}**", inner);
        }
        if flag("italic") {
            inner = format!("_{}_", inner);
        }
        if flag("strikethrough") {
            inner = format!("~~{}~~", inner);
        }
        if let Some(href) = fragment["href"].as_str() {
            inner = format!("[{}]({})", inner, href);
        }

        out.push_str(leading);
        out.push_str(&inner);
        out.push_str(trailing);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::types::Block;
    use serde_json::json;

    fn text(s: &str) -> Value {
        json!({ "type": "text", "plain_text": s, "annotations": {}, "href": null })
    }

    fn node(kind: &str, payload: Value, children: Vec<BlockNode>) -> BlockNode {
        let block: Block = serde_json::from_value(json!({
            "id": format!("id-{}", kind),
            "type": kind,
            "has_children": !children.is_empty(),
            kind: payload,
        }))
        .unwrap();
        BlockNode { block, children }
    }

    fn para(s: &str) -> BlockNode {
        node("paragraph", json!({ "rich_text": [text(s)] }), vec![])
    }

    #[test]
    fn test_plain_text_concatenates_fragments() {
        let rich = json!([text("Hello, "), text("World")]);
        assert_eq!(plain_text(&rich), "Hello, World");
        assert_eq!(plain_text(&Value::Null), "");
    }

    #[test]
    fn test_annotations() {
        let rich = json!([
            { "plain_text": "bold ", "annotations": { "bold": true } },
            { "plain_text": "link", "annotations": {}, "href": "https://example.com" },
            { "plain_text": " and ", "annotations": {} },
            { "plain_text": "gone", "annotations": { "strikethrough": true } },
        ]);
        assert_eq!(
            rich_text_to_markdown(&rich),
            "**bold** [link](https://example.com) and ~~gone~~"
        );
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let nodes = vec![
            node("heading_1", json!({ "rich_text": [text("Title")] }), vec![]),
            para("Body text."),
            node("divider", json!({}), vec![]),
        ];
        assert_eq!(to_markdown(&nodes), "# Title\n\nBody text.\n\n---");
    }

    #[test]
    fn test_lists_are_tight_and_numbered() {
        let nodes = vec![
            node("numbered_list_item", json!({ "rich_text": [text("one")] }), vec![]),
            node("numbered_list_item", json!({ "rich_text": [text("two")] }), vec![]),
            para("between"),
            node("numbered_list_item", json!({ "rich_text": [text("again")] }), vec![]),
        ];
        assert_eq!(to_markdown(&nodes), "1. one\n2. two\n\nbetween\n\n1. again");
    }

    #[test]
    fn test_nested_children_are_indented() {
        let nodes = vec![node(
            "bulleted_list_item",
            json!({ "rich_text": [text("parent")] }),
            vec![node(
                "bulleted_list_item",
                json!({ "rich_text": [text("child")] }),
                vec![],
            )],
        )];
        assert_eq!(to_markdown(&nodes), "- parent\n    - child");
    }

    #[test]
    fn test_todo_code_and_image() {
        let nodes = vec![
            node("to_do", json!({ "rich_text": [text("done")], "checked": true }), vec![]),
            node(
                "code",
                json!({ "rich_text": [text("fn main() {}")], "language": "rust" }),
                vec![],
            ),
            node(
                "image",
                json!({
                    "type": "external",
                    "external": { "url": "https://img.example/a.png" },
                    "caption": [text("Chart")]
                }),
                vec![],
            ),
        ];
        assert_eq!(
            to_markdown(&nodes),
            "- [x] done\n\n```rust\nfn main() {}\n```\n\n![Chart](https://img.example/a.png)"
        );
    }

    #[test]
    fn test_table() {
        let row = |a: &str, b: &str| {
            node(
                "table_row",
                json!({ "cells": [[text(a)], [text(b)]] }),
                vec![],
            )
        };
        let table = node(
            "table",
            json!({ "table_width": 2, "has_column_header": true }),
            vec![row("Type", "Strategy"), row("Generator", "To respond")],
        );
        assert_eq!(
            to_markdown(&[table]),
            "| Type | Strategy |\n| --- | --- |\n| Generator | To respond |"
        );
    }

    #[test]
    fn test_child_pages_are_skipped() {
        let nodes = vec![
            para("before"),
            node("child_page", json!({ "title": "Other" }), vec![]),
            para("after"),
        ];
        assert_eq!(to_markdown(&nodes), "before\n\nafter");
    }
}
