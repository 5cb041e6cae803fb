//! Error taxonomy for the server (spec §7).
//!
//! Request-level variants ([`ServerError::NotFound`], [`ServerError::Forbidden`],
//! [`ServerError::ClientProtocol`]) are caught inside the request pipeline and
//! turned into HTTP responses; they never propagate out of [`crate::worker`].
//! Everything else is fatal and is expected to bubble up through `main` via
//! `anyhow::Context`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("startup failed: {0}")]
    Startup(String),

    #[error("accept() failed")]
    Accept(#[source] std::io::Error),

    #[error("malformed request: {0}")]
    ClientProtocol(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("CGI process failed: {0}")]
    Cgi(String),
}

pub type Result<T> = std::result::Result<T, ServerError>;
