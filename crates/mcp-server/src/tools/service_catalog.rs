use serde_json::{json, Value};
use servicenow_backend::result_array;

use super::output::RawOutput;
use super::registry::OperationContext;
use super::schemas::catalog_item::ListCatalogItemsParams;
use super::table::{display_query, display_value, encoded_query, field};

const TABLE: &str = "sc_cat_item";

pub(crate) async fn list_catalog_items(
    context: OperationContext,
    params: ListCatalogItemsParams,
) -> anyhow::Result<RawOutput> {
    let mut filters = Vec::new();
    if params.active {
        filters.push("active=true".to_string());
    }
    if let Some(category) = params.category.as_deref().filter(|c| !c.is_empty()) {
        filters.push(format!("category={category}"));
    }
    if let Some(query) = params.query.as_deref().filter(|q| !q.is_empty()) {
        filters.push(format!("short_descriptionLIKE{query}^ORnameLIKE{query}"));
    }

    let mut request = display_query(TABLE)
        .query("sysparm_limit", params.limit)
        .query("sysparm_offset", params.offset);
    if let Some(query) = encoded_query(&filters) {
        request = request.query("sysparm_query", query);
    }

    match context.api.send(request).await {
        Ok(response) => {
            let items: Vec<Value> = result_array(&response).iter().map(item_summary).collect();
            Ok(RawOutput::json(json!({
                "success": true,
                "message": format!("Retrieved {} catalog items", items.len()),
                "items": items,
                "total": items.len(),
                "limit": params.limit,
                "offset": params.offset,
            })))
        }
        Err(err) => {
            log::error!("Error listing catalog items: {err}");
            Ok(RawOutput::json(json!({
                "success": false,
                "message": format!("Error listing catalog items: {err}"),
                "items": [],
                "total": 0,
                "limit": params.limit,
                "offset": params.offset,
            })))
        }
    }
}

fn item_summary(item: &Value) -> Value {
    json!({
        "sys_id": field(item, "sys_id"),
        "name": field(item, "name"),
        "short_description": field(item, "short_description"),
        "category": display_value(item.get("category")),
        "price": field(item, "price"),
        "picture": field(item, "picture"),
        "active": field(item, "active"),
        "order": field(item, "order"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubTableApi;
    use pretty_assertions::assert_eq;
    use servicenow_backend::Method;

    #[tokio::test]
    async fn lists_active_items_by_default() {
        let (context, stub) = StubTableApi::new()
            .on(
                Method::Get,
                "table/sc_cat_item",
                json!({"result": [{"sys_id": "i1", "name": "Laptop", "category": {"display_value": "Hardware"}}]}),
            )
            .into_context();
        let params: ListCatalogItemsParams = serde_json::from_value(json!({})).unwrap();
        let RawOutput::Json(result) = list_catalog_items(context, params).await.unwrap() else {
            panic!("expected json");
        };
        assert_eq!(result["items"][0]["category"], json!("Hardware"));
        assert_eq!(result["limit"], json!(10));
        assert_eq!(
            stub.requests()[0].query_value("sysparm_query"),
            Some("active=true")
        );
    }

    #[tokio::test]
    async fn backend_failure_is_reported_in_band() {
        let (context, _stub) = StubTableApi::new()
            .fail(Method::Get, "table/sc_cat_item", 401, "unauthorized")
            .into_context();
        let params: ListCatalogItemsParams =
            serde_json::from_value(json!({"active": false})).unwrap();
        let RawOutput::Json(result) = list_catalog_items(context, params).await.unwrap() else {
            panic!("expected json");
        };
        assert_eq!(result["success"], json!(false));
        assert_eq!(result["total"], json!(0));
    }
}
