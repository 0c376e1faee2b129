use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PackageLoadError>;

#[derive(Error, Debug)]
pub enum PackageLoadError {
    #[error("tool package config file not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read tool package config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing tool package config {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid format in {}: expected a mapping, got {found}", path.display())]
    NotAMapping { path: PathBuf, found: &'static str },
}
