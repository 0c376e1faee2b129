use rmcp::schemars;
use serde::Deserialize;

use super::{default_limit, default_true};

/// At least one of the fields must be set.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct GetUserParams {
    /// User ID or sys_id
    #[serde(default)]
    pub user_id: Option<String>,
    /// Username of the user
    #[serde(default)]
    pub user_name: Option<String>,
    /// Email address of the user
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListUsersParams {
    /// Maximum number of users to return
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Offset for pagination
    #[serde(default)]
    pub offset: u32,
    /// Filter by active status
    #[serde(default = "default_true")]
    pub active: bool,
    /// Filter by department
    #[serde(default)]
    pub department: Option<String>,
    /// Case-insensitive search term that matches against name, username, or email fields
    #[serde(default)]
    pub query: Option<String>,
}
