//! User lookups (`sys_user`).

use serde_json::{json, Value};
use servicenow_backend::{is_sys_id, result_array};

use super::output::RawOutput;
use super::registry::OperationContext;
use super::schemas::user::{GetUserParams, ListUsersParams};
use super::table::{display_query, display_value, encoded_query, field};

const TABLE: &str = "sys_user";

pub(crate) async fn get_user(
    context: OperationContext,
    params: GetUserParams,
) -> anyhow::Result<RawOutput> {
    let Some(clause) = user_clause(&params) else {
        return Ok(RawOutput::json(json!({
            "success": false,
            "message": "At least one search parameter is required",
        })));
    };

    let request = display_query(TABLE)
        .query("sysparm_query", clause)
        .query("sysparm_limit", 1);
    match context.api.send(request).await {
        Ok(response) => match result_array(&response).first() {
            Some(user) => Ok(RawOutput::json(json!({
                "success": true,
                "message": format!(
                    "Found user: {}",
                    user.get("name").and_then(Value::as_str).unwrap_or_default()
                ),
                "user": user_summary(user),
            }))),
            None => Ok(RawOutput::json(json!({
                "success": false,
                "message": "User not found",
            }))),
        },
        Err(err) => {
            log::error!("Failed to get user: {err}");
            Ok(RawOutput::json(json!({
                "success": false,
                "message": format!("Failed to get user: {err}"),
            })))
        }
    }
}

pub(crate) async fn list_users(
    context: OperationContext,
    params: ListUsersParams,
) -> anyhow::Result<RawOutput> {
    let mut filters = Vec::new();
    if params.active {
        filters.push("active=true".to_string());
    }
    if let Some(department) = params.department.as_deref().filter(|d| !d.is_empty()) {
        filters.push(format!("department={department}"));
    }
    if let Some(query) = params.query.as_deref().filter(|q| !q.is_empty()) {
        filters.push(format!("nameLIKE{query}^ORuser_nameLIKE{query}^ORemailLIKE{query}"));
    }

    let mut request = display_query(TABLE)
        .query("sysparm_limit", params.limit)
        .query("sysparm_offset", params.offset);
    if let Some(query) = encoded_query(&filters) {
        request = request.query("sysparm_query", query);
    }

    match context.api.send(request).await {
        Ok(response) => {
            let users: Vec<Value> = result_array(&response).iter().map(user_summary).collect();
            Ok(RawOutput::json(json!({
                "success": true,
                "message": format!("Found {} users", users.len()),
                "users": users,
                "count": users.len(),
            })))
        }
        Err(err) => {
            log::error!("Failed to list users: {err}");
            Ok(RawOutput::json(json!({
                "success": false,
                "message": format!("Failed to list users: {err}"),
                "users": [],
                "count": 0,
            })))
        }
    }
}

/// Encoded query for the first identifier given, in user_id, user_name, email order.
fn user_clause(params: &GetUserParams) -> Option<String> {
    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
    if let Some(user_id) = non_empty(&params.user_id) {
        let key = if is_sys_id(&user_id) { "sys_id" } else { "user_name" };
        return Some(format!("{key}={user_id}"));
    }
    if let Some(user_name) = non_empty(&params.user_name) {
        return Some(format!("user_name={user_name}"));
    }
    non_empty(&params.email).map(|email| format!("email={email}"))
}

fn user_summary(user: &Value) -> Value {
    json!({
        "sys_id": field(user, "sys_id"),
        "user_name": field(user, "user_name"),
        "first_name": field(user, "first_name"),
        "last_name": field(user, "last_name"),
        "name": field(user, "name"),
        "email": field(user, "email"),
        "title": field(user, "title"),
        "phone": field(user, "phone"),
        "mobile_phone": field(user, "mobile_phone"),
        "department": display_value(user.get("department")),
        "manager": display_value(user.get("manager")),
        "active": field(user, "active"),
    })
}
