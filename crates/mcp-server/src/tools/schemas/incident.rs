use rmcp::schemars;
use serde::{Deserialize, Serialize};

use super::default_limit;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateIncidentParams {
    /// Short description of the incident
    pub short_description: String,
    /// Detailed description of the incident
    #[serde(default)]
    pub description: Option<String>,
    /// User who reported the incident
    #[serde(default)]
    pub caller_id: Option<String>,
    /// Category of the incident
    #[serde(default)]
    pub category: Option<String>,
    /// Subcategory of the incident
    #[serde(default)]
    pub subcategory: Option<String>,
    /// Priority of the incident
    #[serde(default)]
    pub priority: Option<String>,
    /// Impact of the incident
    #[serde(default)]
    pub impact: Option<String>,
    /// Urgency of the incident
    #[serde(default)]
    pub urgency: Option<String>,
    /// User assigned to the incident
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Group assigned to the incident
    #[serde(default)]
    pub assignment_group: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateIncidentParams {
    /// Incident ID or sys_id
    pub incident_id: String,
    /// Short description of the incident
    #[serde(default)]
    pub short_description: Option<String>,
    /// Detailed description of the incident
    #[serde(default)]
    pub description: Option<String>,
    /// State of the incident
    #[serde(default)]
    pub state: Option<String>,
    /// Category of the incident
    #[serde(default)]
    pub category: Option<String>,
    /// Subcategory of the incident
    #[serde(default)]
    pub subcategory: Option<String>,
    /// Priority of the incident
    #[serde(default)]
    pub priority: Option<String>,
    /// Impact of the incident
    #[serde(default)]
    pub impact: Option<String>,
    /// Urgency of the incident
    #[serde(default)]
    pub urgency: Option<String>,
    /// User assigned to the incident
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Group assigned to the incident
    #[serde(default)]
    pub assignment_group: Option<String>,
    /// Work notes to add to the incident
    #[serde(default)]
    pub work_notes: Option<String>,
    /// Close notes to add to the incident
    #[serde(default)]
    pub close_notes: Option<String>,
    /// Close code for the incident
    #[serde(default)]
    pub close_code: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddCommentParams {
    /// Incident ID or sys_id
    pub incident_id: String,
    /// Comment to add to the incident
    pub comment: String,
    /// Whether the comment is a work note
    #[serde(default)]
    pub is_work_note: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ResolveIncidentParams {
    /// Incident ID or sys_id
    pub incident_id: String,
    /// Resolution code for the incident
    pub resolution_code: String,
    /// Resolution notes for the incident
    pub resolution_notes: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListIncidentsParams {
    /// Maximum number of incidents to return
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Offset for pagination
    #[serde(default)]
    pub offset: u32,
    /// Filter by incident state
    #[serde(default)]
    pub state: Option<String>,
    /// Filter by assigned user
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Filter by category
    #[serde(default)]
    pub category: Option<String>,
    /// Search query for incidents
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetIncidentByNumberParams {
    /// The number of the incident to fetch
    pub incident_number: String,
}

/// Payload of `create_incident`, rendered as JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentResponse {
    pub success: bool,
    pub message: String,
    pub incident_id: Option<String>,
    pub incident_number: Option<String>,
}
