use crate::ident::Ident;
use serde::{Deserialize, Serialize};

/// One row: column name to scalar value, in column order
///
/// Booleans are written as INTEGER 0/1 and read back as the numbers `0`/`1`,
/// not as `true`/`false`; blobs are read back as base64 text.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Rows per page when the caller does not say otherwise
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Ident,
    #[serde(default)]
    pub order: SortOrder,
}

/// Pagination window for `search`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Page {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for Page {
    fn default() -> Self {
        Page {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
            order_by: None,
        }
    }
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Page {
            limit,
            offset,
            order_by: None,
        }
    }

    pub fn ordered_by(mut self, column: Ident, order: SortOrder) -> Self {
        self.order_by = Some(OrderBy { column, order });
        self
    }
}
