use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::file::FileRecord;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Normalized, visibility-scoped list request. Serializes to the `list` RPC payload.
///
/// Absent optional fields are omitted from the wire rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListQuery {
    pub order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    pub limit: u32,
    pub filter: Map<String, Value>,
    #[serde(rename = "criteria", skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            order: SortOrder::Desc,
            offset: None,
            limit: DEFAULT_LIMIT,
            filter: Map::new(),
            sort_by: None,
            owner: None,
            public: None,
            tags: None,
        }
    }
}

/// Pagination metadata returned by the `list` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page: u64,
    pub pages: u64,
    /// Offset of the next page. Absent when the backend did not send one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<u64>,
}

impl PageInfo {
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// Reply of the `list` operation.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(flatten)]
    pub info: PageInfo,
    #[serde(default)]
    pub files: Vec<FileRecord>,
}
