//! Customer service case tools (`sn_customerservice_case`).
//!
//! Backend failures are reported in-band (`success: false`) rather than as
//! execution errors.

use serde_json::{json, Map, Value};
use servicenow_backend::{result_array, result_object, BackendRequest};

use super::output::RawOutput;
use super::registry::OperationContext;
use super::schemas::case::{
    CaseResponse, CreateCaseParams, GetCaseParams, ListCasesParams, UpdateCaseParams,
};
use super::table::{
    display_query, display_value, encoded_query, field, find_sys_id, record_path, set_fields,
    str_field, table_path,
};

const TABLE: &str = "sn_customerservice_case";

pub(crate) async fn create_case(
    context: OperationContext,
    params: CreateCaseParams,
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
            ("contact", &params.contact),
            ("account", &params.account),
            ("priority", &params.priority),
            ("state", &params.state),
            ("assigned_to", &params.assigned_to),
            ("assignment_group", &params.assignment_group),
        ],
    );

    let request = BackendRequest::post(table_path(TABLE), Value::Object(body));
    let response = match context.api.send(request).await {
        Ok(response) => response,
        Err(err) => {
            log::error!("Failed to create case: {err}");
            return Ok(RawOutput::record(CaseResponse::failure(format!(
                "Failed to create case: {err}"
            ))));
        }
    };
    let record = result_object(&response);
    Ok(RawOutput::record(CaseResponse {
        success: true,
        message: "Case created successfully".to_string(),
        case_id: str_field(&record, "sys_id"),
        case_number: str_field(&record, "number"),
    }))
}

pub(crate) async fn update_case(
    context: OperationContext,
    params: UpdateCaseParams,
) -> anyhow::Result<RawOutput> {
    let sys_id = match find_sys_id(context.api.as_ref(), TABLE, &params.case_id).await {
        Ok(Some(sys_id)) => sys_id,
        Ok(None) => {
            return Ok(RawOutput::record(CaseResponse::failure(format!(
                "Case not found: {}",
                params.case_id
            ))))
        }
        Err(err) => {
            log::error!("Failed to find case: {err}");
            return Ok(RawOutput::record(CaseResponse::failure(format!(
                "Failed to find case: {err}"
            ))));
        }
    };

    let mut body = Map::new();
    set_fields(
        &mut body,
        [
            ("short_description", &params.short_description),
            ("description", &params.description),
            ("contact", &params.contact),
            ("account", &params.account),
            ("priority", &params.priority),
            ("state", &params.state),
            ("assigned_to", &params.assigned_to),
            ("assignment_group", &params.assignment_group),
        ],
    );

    let request = BackendRequest::put(record_path(TABLE, &sys_id), Value::Object(body));
    match context.api.send(request).await {
        Ok(response) => {
            let record = result_object(&response);
            Ok(RawOutput::record(CaseResponse {
                success: true,
                message: "Case updated successfully".to_string(),
                case_id: str_field(&record, "sys_id"),
                case_number: str_field(&record, "number"),
            }))
        }
        Err(err) => {
            log::error!("Failed to update case: {err}");
            Ok(RawOutput::record(CaseResponse::failure(format!(
                "Failed to update case: {err}"
            ))))
        }
    }
}

pub(crate) async fn list_cases(
    context: OperationContext,
    params: ListCasesParams,
) -> anyhow::Result<RawOutput> {
    let mut filters = Vec::new();
    if let Some(state) = params.state.as_deref().filter(|s| !s.is_empty()) {
        filters.push(format!("state={state}"));
    }
    if let Some(priority) = params.priority.as_deref().filter(|s| !s.is_empty()) {
        filters.push(format!("priority={priority}"));
    }
    if let Some(query) = params.query.as_deref().filter(|s| !s.is_empty()) {
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
            let cases: Vec<Value> = result_array(&response).iter().map(case_summary).collect();
            Ok(RawOutput::json(json!({
                "success": true,
                "message": format!("Found {} cases", cases.len()),
                "cases": cases,
            })))
        }
        Err(err) => {
            log::error!("Failed to list cases: {err}");
            Ok(RawOutput::json(json!({
                "success": false,
                "message": format!("Failed to list cases: {err}"),
                "cases": [],
            })))
        }
    }
}

pub(crate) async fn get_case(
    context: OperationContext,
    params: GetCaseParams,
) -> anyhow::Result<RawOutput> {
    let failure = |message: String| RawOutput::json(json!({"success": false, "message": message}));

    let sys_id = match find_sys_id(context.api.as_ref(), TABLE, &params.case_id).await {
        Ok(Some(sys_id)) => sys_id,
        Ok(None) => return Ok(failure(format!("Case not found: {}", params.case_id))),
        Err(err) => {
            log::error!("Failed to find case: {err}");
            return Ok(failure(format!("Failed to find case: {err}")));
        }
    };

    let request = BackendRequest::get(record_path(TABLE, &sys_id))
        .query("sysparm_display_value", "true")
        .query("sysparm_exclude_reference_link", "true");
    match context.api.send(request).await {
        Ok(response) => {
            let record = result_object(&response);
            if record.is_empty() {
                return Ok(failure(format!("Case not found: {sys_id}")));
            }
            Ok(RawOutput::json(json!({
                "success": true,
                "case": case_summary(&Value::Object(record)),
            })))
        }
        Err(err) => {
            log::error!("Failed to get case: {err}");
            Ok(failure(format!("Failed to get case: {err}")))
        }
    }
}

fn case_summary(record: &Value) -> Value {
    json!({
        "sys_id": field(record, "sys_id"),
        "number": field(record, "number"),
        "short_description": field(record, "short_description"),
        "description": field(record, "description"),
        "state": field(record, "state"),
        "priority": field(record, "priority"),
        "assigned_to": display_value(record.get("assigned_to")),
        "created_on": field(record, "sys_created_on"),
        "updated_on": field(record, "sys_updated_on"),
    })
}
