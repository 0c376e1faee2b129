//! Tool packages: named subsets of the operation catalog.
//!
//! Definitions are loaded once at startup (see [`YamlFileSource`]) and resolved
//! against the operator's requested package with [`resolve`]. Neither step can
//! abort startup: load failures degrade to an empty definition set and unknown
//! package names degrade to the `none` package.

mod definitions;
mod error;
mod resolve;

pub use definitions::{load_or_empty, PackageDefinitions, PackageSource, YamlFileSource};
pub use error::{PackageLoadError, Result};
pub use resolve::{resolve, ResolvedPackage, FULL_PACKAGE, NONE_PACKAGE};
