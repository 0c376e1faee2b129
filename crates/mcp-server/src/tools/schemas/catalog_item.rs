use rmcp::schemars;
use serde::Deserialize;

use super::{default_limit, default_true};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListCatalogItemsParams {
    /// Maximum number of catalog items to return
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Offset for pagination
    #[serde(default)]
    pub offset: u32,
    /// Filter by category
    #[serde(default)]
    pub category: Option<String>,
    /// Search query for catalog items
    #[serde(default)]
    pub query: Option<String>,
    /// Whether to only return active catalog items
    #[serde(default = "default_true")]
    pub active: bool,
}
