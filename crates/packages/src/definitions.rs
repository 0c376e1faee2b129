use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{PackageLoadError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct PackageDefinition {
    name: String,
    tools: Vec<String>,
}

/// Package name -> enabled tool names, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDefinitions {
    packages: Vec<PackageDefinition>,
}

impl PackageDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a package. Later definitions win, as in a YAML mapping.
    pub fn insert<I, S>(&mut self, name: impl Into<String>, tools: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let tools = tools.into_iter().map(Into::into).collect();
        match self.packages.iter_mut().find(|pkg| pkg.name == name) {
            Some(existing) => existing.tools = tools,
            None => self.packages.push(PackageDefinition { name, tools }),
        }
    }

    pub fn with<I, S>(mut self, name: impl Into<String>, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(name, tools);
        self
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.packages
            .iter()
            .find(|pkg| pkg.name == name)
            .map(|pkg| pkg.tools.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.packages.iter().map(|pkg| pkg.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Parses the YAML form: a top-level mapping of package name to a list of tool names.
    ///
    /// Entries whose value is not a list of strings are skipped with a warning; a
    /// `null` value is an empty package.
    pub fn parse_yaml(path: &Path, text: &str) -> Result<Self> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|source| PackageLoadError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        let mapping = match value {
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(PackageLoadError::NotAMapping {
                    path: path.to_path_buf(),
                    found: yaml_kind(&other),
                })
            }
        };

        let mut definitions = Self::new();
        for (key, value) in mapping {
            let Some(name) = key.as_str() else {
                log::warn!(
                    "Skipping tool package with non-string name ({}) in {}",
                    yaml_kind(&key),
                    path.display()
                );
                continue;
            };
            match tool_list(&value) {
                Some(tools) => definitions.insert(name, tools),
                None => log::warn!(
                    "Skipping tool package '{name}' in {}: expected a list of tool names, got {}",
                    path.display(),
                    yaml_kind(&value)
                ),
            }
        }
        Ok(definitions)
    }
}

fn tool_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => Some(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Where package definitions come from.
pub trait PackageSource {
    fn load(&self) -> Result<PackageDefinitions>;

    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct YamlFileSource {
    path: PathBuf,
}

impl YamlFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PackageSource for YamlFileSource {
    fn load(&self) -> Result<PackageDefinitions> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                PackageLoadError::NotFound(self.path.clone())
            } else {
                PackageLoadError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        PackageDefinitions::parse_yaml(&self.path, &text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Loads definitions, degrading every failure to an empty set.
pub fn load_or_empty(source: &dyn PackageSource) -> PackageDefinitions {
    match source.load() {
        Ok(definitions) => {
            log::info!(
                "Successfully loaded {} tool package(s) from {}",
                definitions.len(),
                source.describe()
            );
            definitions
        }
        Err(err) => {
            log::error!("{err}. No packages loaded.");
            PackageDefinitions::new()
        }
    }
}
