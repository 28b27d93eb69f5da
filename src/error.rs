//! Error taxonomy for the document pipeline.
//!
//! Every failure is scoped to a single user action: a failed export or
//! receipt download surfaces one error and leaves everything else usable.
//! Nothing here is fatal and nothing is retried automatically.

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network or remote-API failure, already mapped to a user-facing message.
    #[error("{0}")]
    Network(String),

    /// Input rejected before any network call or drawing happened.
    #[error("{0}")]
    Validation(String),

    /// Local document generation failed (PDF assembly, QR encoding).
    #[error("failed to generate document: {0}")]
    Render(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Error::Render(msg.into())
    }
}

impl From<printpdf::Error> for Error {
    fn from(err: printpdf::Error) -> Self {
        Error::Render(err.to_string())
    }
}

/// Convert a `reqwest::Error` into a user-friendly message.
pub(crate) fn friendly_error(url: &str, err: &reqwest::Error) -> Error {
    if err.is_connect() {
        return Error::Network(format!("Cannot reach IMS backend at {url}"));
    }
    if err.is_timeout() {
        return Error::Network(format!("Connection to {url} timed out"));
    }
    if err.is_builder() {
        return Error::Network(format!("Invalid IMS backend URL: {url}"));
    }
    Error::Network(format!("Network error communicating with {url}: {err}"))
}

/// Convert an HTTP status code into a user-friendly message.
pub(crate) fn status_error(status: StatusCode) -> Error {
    let msg = match status.as_u16() {
        401 => "Not authenticated with the IMS backend".to_string(),
        403 => "Not authorized for this IMS resource".to_string(),
        404 => "IMS endpoint not found".to_string(),
        s if s >= 500 => format!("IMS backend server error (HTTP {s})"),
        s => format!("Unexpected response from IMS backend (HTTP {s})"),
    };
    Error::Network(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_maps_known_codes() {
        let e = status_error(StatusCode::UNAUTHORIZED);
        assert!(e.to_string().contains("authenticated"));
        let e = status_error(StatusCode::NOT_FOUND);
        assert!(e.to_string().contains("not found"));
        let e = status_error(StatusCode::BAD_GATEWAY);
        assert!(e.to_string().contains("502"));
    }
}
