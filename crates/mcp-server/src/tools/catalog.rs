//! The ServiceNow tool catalog, in listing order.

use super::registry::{Operation, OutputShape, Registry, RegistryError};
use super::{case, change, incident, service_catalog, user};

pub fn build_registry() -> Result<Registry, RegistryError> {
    Registry::new(operations())
}

fn operations() -> Vec<Operation> {
    vec![
        // Incidents
        Operation::new(
            "create_incident",
            "Create a new incident in ServiceNow",
            OutputShape::Text,
            incident::create_incident,
        ),
        Operation::new(
            "update_incident",
            "Update an existing incident in ServiceNow",
            OutputShape::Text,
            incident::update_incident,
        ),
        Operation::new(
            "add_comment",
            "Add a comment to an incident in ServiceNow",
            OutputShape::Text,
            incident::add_comment,
        ),
        Operation::new(
            "resolve_incident",
            "Resolve an incident in ServiceNow",
            OutputShape::Text,
            incident::resolve_incident,
        ),
        Operation::new(
            "list_incidents",
            "List incidents from ServiceNow",
            OutputShape::Json,
            incident::list_incidents,
        ),
        Operation::new(
            "get_incident_by_number",
            "Fetch a single incident from ServiceNow by its number",
            OutputShape::Json,
            incident::get_incident_by_number,
        ),
        // Customer service cases
        Operation::new(
            "create_case",
            "Create a new customer service case in ServiceNow",
            OutputShape::Record,
            case::create_case,
        ),
        Operation::new(
            "update_case",
            "Update an existing customer service case in ServiceNow",
            OutputShape::Record,
            case::update_case,
        ),
        Operation::new(
            "list_cases",
            "List customer service cases from ServiceNow",
            OutputShape::Json,
            case::list_cases,
        ),
        Operation::new(
            "get_case",
            "Get a specific customer service case by ID or number",
            OutputShape::Json,
            case::get_case,
        ),
        // Service catalog
        Operation::new(
            "list_catalog_items",
            "List service catalog items.",
            OutputShape::Json,
            service_catalog::list_catalog_items,
        ),
        // Change management
        Operation::new(
            "create_change_request",
            "Create a new change request in ServiceNow",
            OutputShape::Record,
            change::create_change_request,
        ),
        Operation::new(
            "list_change_requests",
            "List change requests from ServiceNow",
            OutputShape::Json,
            change::list_change_requests,
        ),
        Operation::new(
            "submit_change_for_approval",
            "Submit a change request for approval",
            OutputShape::Text,
            change::submit_change_for_approval,
        ),
        Operation::new(
            "approve_change",
            "Approve a change request",
            OutputShape::Text,
            change::approve_change,
        ),
        Operation::new(
            "reject_change",
            "Reject a change request",
            OutputShape::Text,
            change::reject_change,
        ),
        // Users
        Operation::new(
            "get_user",
            "Get a specific user in ServiceNow",
            OutputShape::Json,
            user::get_user,
        ),
        Operation::new(
            "list_users",
            "List users in ServiceNow",
            OutputShape::Json,
            user::list_users,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_builds_and_every_schema_renders() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.len(), 18);
        for operation in registry.iter() {
            let schema = operation
                .input_schema()
                .unwrap_or_else(|err| panic!("{}: {err:#}", operation.name()));
            assert_eq!(schema["type"], "object", "{}", operation.name());
            assert!(!operation.description().is_empty());
        }
    }

    #[test]
    fn id_based_tools_require_their_id() {
        let registry = build_registry().unwrap();
        let schema = registry.lookup("update_case").unwrap().input_schema().unwrap();
        assert_eq!(schema["required"], serde_json::json!(["case_id"]));
        let schema = registry
            .lookup("create_change_request")
            .unwrap()
            .input_schema()
            .unwrap();
        assert!(schema["properties"].get("type").is_some());
    }

    #[test]
    fn shipped_packages_only_name_registered_tools() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../config/tool_packages.yaml");
        let text = std::fs::read_to_string(&path).unwrap();
        let definitions =
            servicenow_packages::PackageDefinitions::parse_yaml(&path, &text).unwrap();
        let registry = build_registry().unwrap();

        for package in definitions.names() {
            for tool in definitions.get(&package).unwrap() {
                assert!(registry.contains(tool), "{package}: {tool}");
            }
        }
        let full = definitions.get("full").unwrap();
        assert_eq!(full.len(), registry.len());
    }
}
