//! ServiceNow backend collaborators.
//!
//! - [`BackendConfig`]: instance URL, request timeout and resource paths.
//! - [`AuthProvider`]: outbound request headers, opaque w.r.t. the credential scheme.
//! - [`TableApi`]: one JSON request/response round trip against the REST API.

mod auth;
mod client;
mod config;
mod error;

pub use auth::{AuthConfig, AuthManager, AuthProvider, Headers, OAuthConfig, StaticHeaders};
pub use client::{
    is_sys_id, result_array, result_object, BackendRequest, HttpTableApi, Method, TableApi,
};
pub use config::{BackendConfig, DEFAULT_TIMEOUT};
pub use error::{AuthError, BackendError, Result};
