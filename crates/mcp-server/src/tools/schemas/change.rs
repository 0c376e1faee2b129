use rmcp::schemars;
use serde::{Deserialize, Serialize};

use super::default_limit;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateChangeRequestParams {
    /// Short description of the change request
    pub short_description: String,
    /// Detailed description of the change request
    #[serde(default)]
    pub description: Option<String>,
    /// Type of change (normal, standard, emergency)
    #[serde(rename = "type")]
    pub change_type: String,
    /// Risk level of the change
    #[serde(default)]
    pub risk: Option<String>,
    /// Impact of the change
    #[serde(default)]
    pub impact: Option<String>,
    /// Category of the change
    #[serde(default)]
    pub category: Option<String>,
    /// User who requested the change
    #[serde(default)]
    pub requested_by: Option<String>,
    /// Group assigned to the change
    #[serde(default)]
    pub assignment_group: Option<String>,
    /// Planned start date (YYYY-MM-DD HH:MM:SS)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Planned end date (YYYY-MM-DD HH:MM:SS)
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListChangeRequestsParams {
    /// Maximum number of records to return
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Offset to start from
    #[serde(default)]
    pub offset: u32,
    /// Filter by state
    #[serde(default)]
    pub state: Option<String>,
    /// Filter by type (normal, standard, emergency)
    #[serde(default, rename = "type")]
    pub change_type: Option<String>,
    /// Filter by category
    #[serde(default)]
    pub category: Option<String>,
    /// Filter by assignment group
    #[serde(default)]
    pub assignment_group: Option<String>,
    /// Filter by timeframe (upcoming, in-progress, completed)
    #[serde(default)]
    pub timeframe: Option<String>,
    /// Additional query string
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SubmitChangeForApprovalParams {
    /// Change request ID or sys_id
    pub change_id: String,
    /// Comments for the approval request
    #[serde(default)]
    pub approval_comments: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ApproveChangeParams {
    /// Change request ID or sys_id
    pub change_id: String,
    /// ID of the approver
    #[serde(default)]
    pub approver_id: Option<String>,
    /// Comments for the approval
    #[serde(default)]
    pub approval_comments: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RejectChangeParams {
    /// Change request ID or sys_id
    pub change_id: String,
    /// ID of the approver
    #[serde(default)]
    pub approver_id: Option<String>,
    /// Reason for rejection
    pub rejection_reason: String,
}

/// Result of creating a change request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ChangeResponse {
    pub success: bool,
    pub message: String,
    pub change_id: Option<String>,
    pub change_number: Option<String>,
}

impl ChangeResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            change_id: None,
            change_number: None,
        }
    }
}
