use rmcp::schemars;
use serde::{Deserialize, Serialize};

use super::default_limit;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateCaseParams {
    /// Short description of the case
    pub short_description: String,
    /// Detailed description of the case
    #[serde(default)]
    pub description: Option<String>,
    /// Contact associated with the case
    #[serde(default)]
    pub contact: Option<String>,
    /// Account associated with the case
    #[serde(default)]
    pub account: Option<String>,
    /// Priority of the case
    #[serde(default)]
    pub priority: Option<String>,
    /// State of the case
    #[serde(default)]
    pub state: Option<String>,
    /// User assigned to the case
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Group assigned to the case
    #[serde(default)]
    pub assignment_group: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateCaseParams {
    /// Case ID or sys_id
    pub case_id: String,
    /// Short description of the case
    #[serde(default)]
    pub short_description: Option<String>,
    /// Detailed description of the case
    #[serde(default)]
    pub description: Option<String>,
    /// Contact associated with the case
    #[serde(default)]
    pub contact: Option<String>,
    /// Account associated with the case
    #[serde(default)]
    pub account: Option<String>,
    /// Priority of the case
    #[serde(default)]
    pub priority: Option<String>,
    /// State of the case
    #[serde(default)]
    pub state: Option<String>,
    /// User assigned to the case
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Group assigned to the case
    #[serde(default)]
    pub assignment_group: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListCasesParams {
    /// Maximum number of cases to return
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Offset for pagination
    #[serde(default)]
    pub offset: u32,
    /// Filter by case state
    #[serde(default)]
    pub state: Option<String>,
    /// Filter by case priority
    #[serde(default)]
    pub priority: Option<String>,
    /// Search query for cases
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetCaseParams {
    /// Case ID or sys_id
    pub case_id: String,
}

/// Result of creating or updating a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CaseResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Message describing the result
    pub message: String,
    /// ID of the affected case
    pub case_id: Option<String>,
    /// Number of the affected case
    pub case_number: Option<String>,
}

impl CaseResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            case_id: None,
            case_number: None,
        }
    }
}
