//! Incident tools (`incident` table).
//!
//! The write tools answer with confirmation text and surface backend failures as
//! execution errors; the read tools answer with JSON and report failures in-band.

use anyhow::Context as _;
use serde_json::{json, Map, Value};
use servicenow_backend::{result_array, result_object, BackendRequest};
use servicenow_protocol::serialize_json_pretty;

use super::output::RawOutput;
use super::registry::OperationContext;
use super::schemas::incident::{
    AddCommentParams, CreateIncidentParams, GetIncidentByNumberParams, IncidentResponse,
    ListIncidentsParams, ResolveIncidentParams, UpdateIncidentParams,
};
use super::table::{
    display_query, display_value, encoded_query, field, find_sys_id, record_path, set_fields,
    str_field, table_path,
};

const TABLE: &str = "incident";

/// ServiceNow's "Resolved" incident state.
const STATE_RESOLVED: &str = "6";

pub(crate) async fn create_incident(
    context: OperationContext,
    params: CreateIncidentParams,
) -> anyhow::Result<RawOutput> {
    let mut body = Map::new();
    body.insert(
        "short_description".to_string(),
        Value::String(params.short_description.clone()),
    );
    set_fields(
        &mut body,
        [
            ("description", &params.description),
            ("caller_id", &params.caller_id),
            ("category", &params.category),
            ("subcategory", &params.subcategory),
            ("priority", &params.priority),
            ("impact", &params.impact),
            ("urgency", &params.urgency),
            ("assigned_to", &params.assigned_to),
            ("assignment_group", &params.assignment_group),
        ],
    );

    let response = context
        .api
        .send(BackendRequest::post(table_path(TABLE), Value::Object(body)))
        .await
        .context("Failed to create incident")?;
    let record = result_object(&response);
    let incident = IncidentResponse {
        success: true,
        message: "Incident created successfully".to_string(),
        incident_id: str_field(&record, "sys_id"),
        incident_number: str_field(&record, "number"),
    };
    Ok(RawOutput::text(serialize_json_pretty(&incident)?))
}

pub(crate) async fn update_incident(
    context: OperationContext,
    params: UpdateIncidentParams,
) -> anyhow::Result<RawOutput> {
    let sys_id = require_sys_id(&context, &params.incident_id).await?;

    let mut body = Map::new();
    set_fields(
        &mut body,
        [
            ("short_description", &params.short_description),
            ("description", &params.description),
            ("state", &params.state),
            ("category", &params.category),
            ("subcategory", &params.subcategory),
            ("priority", &params.priority),
            ("impact", &params.impact),
            ("urgency", &params.urgency),
            ("assigned_to", &params.assigned_to),
            ("assignment_group", &params.assignment_group),
            ("work_notes", &params.work_notes),
            ("close_notes", &params.close_notes),
            ("close_code", &params.close_code),
        ],
    );

    let number = put_incident(&context, &sys_id, body)
        .await
        .context("Failed to update incident")?;
    Ok(RawOutput::text(format!(
        "Incident {} updated successfully",
        number.as_deref().unwrap_or(&params.incident_id)
    )))
}

pub(crate) async fn add_comment(
    context: OperationContext,
    params: AddCommentParams,
) -> anyhow::Result<RawOutput> {
    let sys_id = require_sys_id(&context, &params.incident_id).await?;
    let (key, label) = if params.is_work_note {
        ("work_notes", "Work note")
    } else {
        ("comments", "Comment")
    };
    let mut body = Map::new();
    body.insert(key.to_string(), Value::String(params.comment.clone()));

    let number = put_incident(&context, &sys_id, body)
        .await
        .context("Failed to add comment")?;
    Ok(RawOutput::text(format!(
        "{label} added to incident {}",
        number.as_deref().unwrap_or(&params.incident_id)
    )))
}

pub(crate) async fn resolve_incident(
    context: OperationContext,
    params: ResolveIncidentParams,
) -> anyhow::Result<RawOutput> {
    let sys_id = require_sys_id(&context, &params.incident_id).await?;
    let mut body = Map::new();
    body.insert("state".to_string(), json!(STATE_RESOLVED));
    body.insert("close_code".to_string(), json!(params.resolution_code));
    body.insert("close_notes".to_string(), json!(params.resolution_notes));
    body.insert("resolved_at".to_string(), json!("now"));

    let number = put_incident(&context, &sys_id, body)
        .await
        .context("Failed to resolve incident")?;
    Ok(RawOutput::text(format!(
        "Incident {} resolved successfully",
        number.as_deref().unwrap_or(&params.incident_id)
    )))
}

pub(crate) async fn list_incidents(
    context: OperationContext,
    params: ListIncidentsParams,
) -> anyhow::Result<RawOutput> {
    let mut filters = Vec::new();
    for (key, value) in [
        ("state", &params.state),
        ("assigned_to", &params.assigned_to),
        ("category", &params.category),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            filters.push(format!("{key}={value}"));
        }
    }
    if let Some(query) = params.query.as_deref().filter(|q| !q.is_empty()) {
        filters.push(format!("short_descriptionLIKE{query}^ORdescriptionLIKE{query}"));
    }

    let mut request = display_query(TABLE)
        .query("sysparm_limit", params.limit)
        .query("sysparm_offset", params.offset);
    if let Some(query) = encoded_query(&filters) {
        request = request.query("sysparm_query", query);
    }

    match context.api.send(request).await {
        Ok(response) => {
            let incidents: Vec<Value> = result_array(&response)
                .iter()
                .map(incident_summary)
                .collect();
            Ok(RawOutput::json(json!({
                "success": true,
                "message": format!("Found {} incidents", incidents.len()),
                "incidents": incidents,
            })))
        }
        Err(err) => {
            log::error!("Failed to list incidents: {err}");
            Ok(RawOutput::json(json!({
                "success": false,
                "message": format!("Failed to list incidents: {err}"),
                "incidents": [],
            })))
        }
    }
}

pub(crate) async fn get_incident_by_number(
    context: OperationContext,
    params: GetIncidentByNumberParams,
) -> anyhow::Result<RawOutput> {
    let number = params.incident_number.trim();
    let request = display_query(TABLE)
        .query("sysparm_query", format!("number={number}"))
        .query("sysparm_limit", 1);

    match context.api.send(request).await {
        Ok(response) => match result_array(&response).first() {
            Some(record) => Ok(RawOutput::json(json!({
                "success": true,
                "message": format!("Incident {number} found"),
                "incident": incident_summary(record),
            }))),
            None => Ok(RawOutput::json(json!({
                "success": false,
                "message": format!("Incident not found: {number}"),
            }))),
        },
        Err(err) => {
            log::error!("Failed to fetch incident: {err}");
            Ok(RawOutput::json(json!({
                "success": false,
                "message": format!("Failed to fetch incident: {err}"),
            })))
        }
    }
}

async fn require_sys_id(context: &OperationContext, incident_id: &str) -> anyhow::Result<String> {
    find_sys_id(context.api.as_ref(), TABLE, incident_id)
        .await
        .context("Failed to find incident")?
        .with_context(|| format!("Incident not found: {incident_id}"))
}

/// PUTs `body` and returns the incident number echoed by the backend.
async fn put_incident(
    context: &OperationContext,
    sys_id: &str,
    body: Map<String, Value>,
) -> servicenow_backend::Result<Option<String>> {
    let response = context
        .api
        .send(BackendRequest::put(
            record_path(TABLE, sys_id),
            Value::Object(body),
        ))
        .await?;
    Ok(str_field(&result_object(&response), "number"))
}

fn incident_summary(record: &Value) -> Value {
    json!({
        "sys_id": field(record, "sys_id"),
        "number": field(record, "number"),
        "short_description": field(record, "short_description"),
        "description": field(record, "description"),
        "state": field(record, "state"),
        "priority": field(record, "priority"),
        "assigned_to": display_value(record.get("assigned_to")),
        "category": field(record, "category"),
        "subcategory": field(record, "subcategory"),
        "created_on": field(record, "sys_created_on"),
        "updated_on": field(record, "sys_updated_on"),
    })
}
