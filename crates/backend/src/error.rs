use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackendError>;

const MAX_BODY_CHARS: usize = 500;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("OAuth token request failed: {0}")]
    TokenRequest(#[source] reqwest::Error),

    #[error("OAuth token endpoint returned HTTP {status}: {body}")]
    TokenStatus { status: u16, body: String },

    #[error("OAuth token response has no access_token")]
    MissingToken,
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid JSON from backend: {0}")]
    Decode(#[from] serde_json::Error),
}

pub(crate) fn clip_body(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_BODY_CHARS {
        return body.to_string();
    }
    let mut out: String = body.chars().take(MAX_BODY_CHARS).collect();
    out.push('…');
    out
}
