use std::collections::BTreeSet;

use crate::definitions::PackageDefinitions;

/// Default package when the operator requests nothing.
pub const FULL_PACKAGE: &str = "full";
/// Package that exposes nothing, not even package introspection.
pub const NONE_PACKAGE: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    name: String,
    enabled: BTreeSet<String>,
}

impl ResolvedPackage {
    pub fn none() -> Self {
        Self {
            name: NONE_PACKAGE.to_string(),
            enabled: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enabled(&self) -> &BTreeSet<String> {
        &self.enabled
    }

    pub fn is_enabled(&self, tool: &str) -> bool {
        self.enabled.contains(tool)
    }

    pub fn is_none(&self) -> bool {
        self.name == NONE_PACKAGE
    }
}

/// Picks the active package for `requested` (blank or unset means `full`).
///
/// An unknown name resolves to `none` with a warning instead of failing; `none`
/// never enables anything, even if the definitions list tools under it.
pub fn resolve(requested: Option<&str>, definitions: &PackageDefinitions) -> ResolvedPackage {
    let requested = requested.map(str::trim).unwrap_or_default();
    let name = if requested.is_empty() {
        log::info!("No tool package requested, defaulting to '{FULL_PACKAGE}'.");
        FULL_PACKAGE
    } else {
        requested
    };

    let resolved = match definitions.get(name) {
        Some(_) if name == NONE_PACKAGE => ResolvedPackage::none(),
        Some(tools) => ResolvedPackage {
            name: name.to_string(),
            enabled: tools.iter().cloned().collect(),
        },
        None => {
            if name != NONE_PACKAGE {
                log::warn!(
                    "Tool package '{name}' is not a valid package name. Valid packages: {:?}. Loading '{NONE_PACKAGE}' package.",
                    definitions.names()
                );
            }
            ResolvedPackage::none()
        }
    };

    log::info!(
        "Loading package '{}' with {} tools.",
        resolved.name,
        resolved.enabled.len()
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn definitions() -> PackageDefinitions {
        PackageDefinitions::new()
            .with("full", ["create_incident", "list_incidents"])
            .with("read_only", Vec::<String>::new())
    }

    #[test]
    fn unset_or_blank_defaults_to_full() {
        for requested in [None, Some(""), Some("   ")] {
            let resolved = resolve(requested, &definitions());
            assert_eq!(resolved.name(), "full");
            assert!(resolved.is_enabled("create_incident"));
        }
    }

    #[test]
    fn known_package_is_selected() {
        let resolved = resolve(Some(" read_only "), &definitions());
        assert_eq!(resolved.name(), "read_only");
        assert!(resolved.enabled().is_empty());
        assert!(!resolved.is_none());
    }

    #[test]
    fn unknown_package_degrades_to_none() {
        let resolved = resolve(Some("bogus"), &definitions());
        assert_eq!(resolved, ResolvedPackage::none());
        assert!(resolved.is_none());
    }

    #[test]
    fn empty_definitions_enable_nothing() {
        let resolved = resolve(None, &PackageDefinitions::new());
        assert_eq!(resolved.name(), "none");
        assert!(resolved.enabled().is_empty());
    }

    #[test]
    fn none_package_ignores_listed_tools() {
        let defs = definitions().with("none", ["create_incident"]);
        let resolved = resolve(Some("none"), &defs);
        assert!(resolved.is_none());
        assert!(!resolved.is_enabled("create_incident"));
    }

    #[test]
    fn duplicate_tool_names_collapse() {
        let defs = PackageDefinitions::new().with("full", ["a", "a", "b"]);
        let resolved = resolve(None, &defs);
        assert_eq!(resolved.enabled().len(), 2);
    }
}
