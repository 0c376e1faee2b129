//! Change management tools (`change_request`, approvals in `sysapproval_approver`).

use anyhow::Context as _;
use serde_json::{json, Map, Value};
use servicenow_backend::{result_array, result_object, BackendRequest};

use super::output::RawOutput;
use super::registry::OperationContext;
use super::schemas::change::{
    ApproveChangeParams, ChangeResponse, CreateChangeRequestParams, ListChangeRequestsParams,
    RejectChangeParams, SubmitChangeForApprovalParams,
};
use super::table::{
    display_query, display_value, encoded_query, field, find_sys_id, record_path, set_fields,
    str_field, table_path,
};

const TABLE: &str = "change_request";
const APPROVALS: &str = "sysapproval_approver";

pub(crate) async fn create_change_request(
    context: OperationContext,
    params: CreateChangeRequestParams,
) -> anyhow::Result<RawOutput> {
    let mut body = Map::new();
    body.insert(
        "short_description".to_string(),
        json!(params.short_description),
    );
    body.insert("type".to_string(), json!(params.change_type));
    set_fields(
        &mut body,
        [
            ("description", &params.description),
            ("risk", &params.risk),
            ("impact", &params.impact),
            ("category", &params.category),
            ("requested_by", &params.requested_by),
            ("assignment_group", &params.assignment_group),
            ("start_date", &params.start_date),
            ("end_date", &params.end_date),
        ],
    );

    let request = BackendRequest::post(table_path(TABLE), Value::Object(body));
    match context.api.send(request).await {
        Ok(response) => {
            let record = result_object(&response);
            Ok(RawOutput::record(ChangeResponse {
                success: true,
                message: "Change request created successfully".to_string(),
                change_id: str_field(&record, "sys_id"),
                change_number: str_field(&record, "number"),
            }))
        }
        Err(err) => {
            log::error!("Failed to create change request: {err}");
            Ok(RawOutput::record(ChangeResponse::failure(format!(
                "Failed to create change request: {err}"
            ))))
        }
    }
}

pub(crate) async fn list_change_requests(
    context: OperationContext,
    params: ListChangeRequestsParams,
) -> anyhow::Result<RawOutput> {
    let mut filters = Vec::new();
    for (key, value) in [
        ("state", &params.state),
        ("type", &params.change_type),
        ("category", &params.category),
        ("assignment_group", &params.assignment_group),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            filters.push(format!("{key}={value}"));
        }
    }
    if let Some(clause) = params.timeframe.as_deref().and_then(timeframe_clause) {
        filters.push(clause.to_string());
    }
    if let Some(query) = params.query.as_deref().filter(|q| !q.is_empty()) {
        filters.push(query.to_string());
    }

    let mut request = display_query(TABLE)
        .query("sysparm_limit", params.limit)
        .query("sysparm_offset", params.offset);
    if let Some(query) = encoded_query(&filters) {
        request = request.query("sysparm_query", query);
    }

    match context.api.send(request).await {
        Ok(response) => {
            let changes: Vec<Value> = result_array(&response)
                .iter()
                .map(change_summary)
                .collect();
            Ok(RawOutput::json(json!({
                "success": true,
                "message": format!("Found {} change requests", changes.len()),
                "change_requests": changes,
                "count": changes.len(),
            })))
        }
        Err(err) => {
            log::error!("Failed to list change requests: {err}");
            Ok(RawOutput::json(json!({
                "success": false,
                "message": format!("Failed to list change requests: {err}"),
                "change_requests": [],
                "count": 0,
            })))
        }
    }
}

pub(crate) async fn submit_change_for_approval(
    context: OperationContext,
    params: SubmitChangeForApprovalParams,
) -> anyhow::Result<RawOutput> {
    let sys_id = require_sys_id(&context, &params.change_id).await?;

    let mut body = Map::new();
    body.insert("approval".to_string(), json!("requested"));
    set_fields(&mut body, [("work_notes", &params.approval_comments)]);
    context
        .api
        .send(BackendRequest::patch(
            record_path(TABLE, &sys_id),
            Value::Object(body),
        ))
        .await
        .context("Failed to submit change request for approval")?;

    context
        .api
        .send(BackendRequest::post(
            table_path(APPROVALS),
            json!({
                "document_id": sys_id,
                "source_table": TABLE,
                "state": "requested",
            }),
        ))
        .await
        .context("Failed to create approval request")?;

    Ok(RawOutput::text(format!(
        "Change request {} submitted for approval",
        params.change_id
    )))
}

pub(crate) async fn approve_change(
    context: OperationContext,
    params: ApproveChangeParams,
) -> anyhow::Result<RawOutput> {
    let sys_id = require_sys_id(&context, &params.change_id).await?;
    let approval_id =
        pending_approval(&context, &sys_id, params.approver_id.as_deref()).await?;

    let mut body = Map::new();
    body.insert("state".to_string(), json!("approved"));
    set_fields(&mut body, [("comments", &params.approval_comments)]);
    context
        .api
        .send(BackendRequest::patch(
            record_path(APPROVALS, &approval_id),
            Value::Object(body),
        ))
        .await
        .context("Failed to approve change request")?;

    context
        .api
        .send(BackendRequest::patch(
            record_path(TABLE, &sys_id),
            json!({"state": "implement"}),
        ))
        .await
        .context("Failed to move change request to implement")?;

    Ok(RawOutput::text(format!(
        "Change request {} approved",
        params.change_id
    )))
}

pub(crate) async fn reject_change(
    context: OperationContext,
    params: RejectChangeParams,
) -> anyhow::Result<RawOutput> {
    let sys_id = require_sys_id(&context, &params.change_id).await?;
    let approval_id =
        pending_approval(&context, &sys_id, params.approver_id.as_deref()).await?;

    context
        .api
        .send(BackendRequest::patch(
            record_path(APPROVALS, &approval_id),
            json!({"state": "rejected", "comments": params.rejection_reason}),
        ))
        .await
        .context("Failed to reject change request")?;

    context
        .api
        .send(BackendRequest::patch(
            record_path(TABLE, &sys_id),
            json!({
                "state": "canceled",
                "work_notes": format!("Change request rejected: {}", params.rejection_reason),
            }),
        ))
        .await
        .context("Failed to cancel change request")?;

    Ok(RawOutput::text(format!(
        "Change request {} rejected",
        params.change_id
    )))
}

async fn require_sys_id(context: &OperationContext, change_id: &str) -> anyhow::Result<String> {
    find_sys_id(context.api.as_ref(), TABLE, change_id)
        .await
        .context("Failed to find change request")?
        .with_context(|| format!("Change request not found: {change_id}"))
}

/// sys_id of the first open approval for the change, optionally for one approver.
async fn pending_approval(
    context: &OperationContext,
    change_sys_id: &str,
    approver: Option<&str>,
) -> anyhow::Result<String> {
    let mut query = format!("document_id={change_sys_id}^state=requested");
    if let Some(approver) = approver.filter(|a| !a.is_empty()) {
        query.push_str(&format!("^approver={approver}"));
    }
    let response = context
        .api
        .send(
            BackendRequest::get(table_path(APPROVALS))
                .query("sysparm_query", query)
                .query("sysparm_limit", 1),
        )
        .await
        .context("Failed to look up approval records")?;
    result_array(&response)
        .first()
        .and_then(|record| record.get("sys_id"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .context("No pending approval record found for this change request")
}

fn timeframe_clause(timeframe: &str) -> Option<&'static str> {
    match timeframe {
        "upcoming" => Some("start_date>javascript:gs.now()"),
        "in-progress" => Some("start_date<javascript:gs.now()^end_date>javascript:gs.now()"),
        "completed" => Some("end_date<javascript:gs.now()"),
        _ => None,
    }
}

fn change_summary(record: &Value) -> Value {
    json!({
        "sys_id": field(record, "sys_id"),
        "number": field(record, "number"),
        "short_description": field(record, "short_description"),
        "type": field(record, "type"),
        "state": field(record, "state"),
        "risk": field(record, "risk"),
        "impact": field(record, "impact"),
        "category": field(record, "category"),
        "assignment_group": display_value(record.get("assignment_group")),
        "requested_by": display_value(record.get("requested_by")),
        "start_date": field(record, "start_date"),
        "end_date": field(record, "end_date"),
    })
}
