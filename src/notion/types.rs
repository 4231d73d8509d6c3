//! Wire types for the Notion REST API

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Maximum page size accepted by the API
pub const PAGE_SIZE: u32 = 100;

/// A database row. Properties are kept as raw JSON since their shapes vary per workspace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// One page of a paginated list response
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Error body returned on non-success statuses
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

/// A content block. The type-specific payload lives under a key named after `kind`.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl Block {
    /// Type-specific payload, e.g. `block["paragraph"]`
    pub fn payload(&self) -> &Value {
        self.data.get(&self.kind).unwrap_or(&Value::Null)
    }

    /// Whether the block's children belong to its own body
    pub fn owns_children(&self) -> bool {
        self.has_children && !matches!(self.kind.as_str(), "child_page" | "child_database")
    }
}

/// A block together with its fetched descendants
#[derive(Debug, Clone)]
pub struct BlockNode {
    pub block: Block,
    pub children: Vec<BlockNode>,
}

/// Database filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `status`-typed property equality
    Status { property: String, equals: String },
    /// `select`-typed property equality
    Select { property: String, equals: String },
    /// `multi_select` membership
    MultiSelectContains { property: String, contains: String },
    And(Vec<Filter>),
}

impl Filter {
    pub fn to_json(&self) -> Value {
        match self {
            Filter::Status { property, equals } => json!({
                "property": property,
                "status": { "equals": equals },
            }),
            Filter::Select { property, equals } => json!({
                "property": property,
                "select": { "equals": equals },
            }),
            Filter::MultiSelectContains { property, contains } => json!({
                "property": property,
                "multi_select": { "contains": contains },
            }),
            Filter::And(filters) => json!({
                "and": filters.iter().map(Filter::to_json).collect::<Vec<_>>(),
            }),
        }
    }
}

/// Sort key. Listings are always newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub property: String,
}

impl Sort {
    pub fn descending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({ "property": self.property, "direction": "descending" })
    }
}

/// A database query: optional filter plus sort keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Option<Filter>,
    pub sorts: Vec<Sort>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    /// Request body for `POST /databases/{id}/query`
    pub fn body(&self, start_cursor: Option<&str>) -> Value {
        let mut body = Map::new();
        if let Some(filter) = &self.filter {
            body.insert("filter".to_string(), filter.to_json());
        }
        if !self.sorts.is_empty() {
            let sorts: Vec<Value> = self.sorts.iter().map(Sort::to_json).collect();
            body.insert("sorts".to_string(), Value::Array(sorts));
        }
        if let Some(cursor) = start_cursor {
            body.insert("start_cursor".to_string(), json!(cursor));
        }
        body.insert("page_size".to_string(), json!(PAGE_SIZE));
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_filter_body() {
        let query = Query::new()
            .filter(Filter::And(vec![
                Filter::Status {
                    property: "Status".to_string(),
                    equals: "Published".to_string(),
                },
                Filter::MultiSelectContains {
                    property: "Tags".to_string(),
                    contains: "Authority".to_string(),
                },
            ]))
            .sort(Sort::descending("Publish Date"));

        let body = query.body(None);
        assert_eq!(
            body["filter"]["and"][0],
            json!({"property": "Status", "status": {"equals": "Published"}})
        );
        assert_eq!(
            body["filter"]["and"][1]["multi_select"]["contains"],
            "Authority"
        );
        assert_eq!(
            body["sorts"],
            json!([{"property": "Publish Date", "direction": "descending"}])
        );
        assert!(body.get("start_cursor").is_none());
    }

    #[test]
    fn test_select_filter_body() {
        let filter = Filter::Select {
            property: "Published".to_string(),
            equals: "Published".to_string(),
        };
        assert_eq!(
            filter.to_json(),
            json!({"property": "Published", "select": {"equals": "Published"}})
        );
    }

    #[test]
    fn test_cursor_and_empty_query() {
        let body = Query::new().body(Some("abc"));
        assert_eq!(body["start_cursor"], "abc");
        assert_eq!(body["page_size"], 100);
        assert!(body.get("filter").is_none());
        assert!(body.get("sorts").is_none());
    }

    #[test]
    fn test_block_payload() {
        let block: Block = serde_json::from_value(json!({
            "object": "block",
            "id": "b1",
            "type": "paragraph",
            "has_children": false,
            "paragraph": { "rich_text": [] }
        }))
        .unwrap();
        assert_eq!(block.kind, "paragraph");
        assert!(block.payload()["rich_text"].is_array());
        assert!(!block.owns_children());
    }

    #[test]
    fn test_page_without_properties() {
        let page: Page = serde_json::from_value(json!({ "id": "p1" })).unwrap();
        assert!(page.properties.is_empty());
    }
}
