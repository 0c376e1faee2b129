//! Shared helpers for the table API backed tools.

use serde_json::{Map, Value};
use servicenow_backend::{is_sys_id, result_array, BackendRequest, TableApi};

pub(crate) fn table_path(table: &str) -> String {
    format!("table/{table}")
}

pub(crate) fn record_path(table: &str, sys_id: &str) -> String {
    format!("table/{table}/{sys_id}")
}

/// GET on a table with display values instead of reference links.
pub(crate) fn display_query(table: &str) -> BackendRequest {
    BackendRequest::get(table_path(table))
        .query("sysparm_display_value", "true")
        .query("sysparm_exclude_reference_link", "true")
}

/// Maps a record number (`INC0010001`) or sys_id to the sys_id. `Ok(None)` when
/// no record has that number.
pub(crate) async fn find_sys_id(
    api: &dyn TableApi,
    table: &str,
    id: &str,
) -> servicenow_backend::Result<Option<String>> {
    if is_sys_id(id) {
        return Ok(Some(id.to_string()));
    }
    let response = api
        .send(
            BackendRequest::get(table_path(table))
                .query("sysparm_query", format!("number={id}"))
                .query("sysparm_limit", 1),
        )
        .await?;
    Ok(result_array(&response)
        .first()
        .and_then(|record| record.get("sys_id"))
        .and_then(Value::as_str)
        .map(ToString::to_string))
}

/// Reference fields come back either as plain values or as
/// `{"display_value": .., "link": ..}` objects.
pub(crate) fn display_value(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Object(reference)) => reference
            .get("display_value")
            .cloned()
            .unwrap_or(Value::Null),
        Some(value) => value.clone(),
        None => Value::Null,
    }
}

pub(crate) fn field(record: &Value, key: &str) -> Value {
    record.get(key).cloned().unwrap_or(Value::Null)
}

pub(crate) fn str_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

/// Copies the non-empty optional fields into a request body.
pub(crate) fn set_fields<'a>(
    body: &mut Map<String, Value>,
    fields: impl IntoIterator<Item = (&'a str, &'a Option<String>)>,
) {
    for (key, value) in fields {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            body.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
}

/// Joins encoded-query clauses with `^`; `None` when there are none.
pub(crate) fn encoded_query(clauses: &[String]) -> Option<String> {
    if clauses.is_empty() {
        None
    } else {
        Some(clauses.join("^"))
    }
}
