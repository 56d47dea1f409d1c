use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error as ThisError;

use crate::views::render_error_page;

/// Message shown whenever the shop API could not be reached at all.
pub const NETWORK_ERROR_MESSAGE: &str = "Could not reach the server. Please try again.";

#[derive(ThisError, Debug)]
pub enum Error {
    /// No credentials on the request, or the shop API rejected them
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Invalid form input or query parameters
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// The shop API answered with `success: false`
    #[error("{message}")]
    Api { message: String },

    /// The shop API answered with a non-success status and no usable envelope
    #[error("Shop API returned {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    /// The shop API could not be reached
    #[error("Shop API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A template failed to render
    #[error("Failed to render template: {0}")]
    Render(#[from] minijinja::Error),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Marker placed on 401 responses so the login redirect middleware can tell them apart from
/// 401s produced elsewhere.
#[derive(Debug, Clone, Copy)]
pub struct LoginRequired;

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::BadRequest { .. } | Error::Api { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Upstream { .. } | Error::Transport(_) => StatusCode::BAD_GATEWAY,
            Error::Render(_) | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Please log in to continue".to_string()),
            Error::BadRequest { message } | Error::Api { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} with ID {id} not found"),
            Error::Upstream { status, .. } if status.is_server_error() => "The server encountered an error. Please try again later.".to_string(),
            Error::Upstream { message, .. } => message.clone(),
            Error::Transport(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Error::Render(_) | Error::Other(_) => "Internal server error".to_string(),
        }
    }

    /// Whether this error must leave the page (login redirect) instead of being shown as a banner
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Error::Unauthenticated { .. })
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Render(_) | Error::Other(_) => {
                tracing::error!("Internal error: {:#}", self);
            }
            Error::Upstream { .. } | Error::Transport(_) => {
                tracing::warn!("Shop API error: {}", self);
            }
            Error::Unauthenticated { .. } => {
                tracing::info!("Authentication error: {}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } | Error::Api { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = render_error_page(&self.user_message());

        let mut response = (status, Html(body)).into_response();
        if self.is_unauthenticated() {
            response.extensions_mut().insert(LoginRequired);
        }
        response
    }
}

/// Type alias for handler results
pub type Result<T> = std::result::Result<T, Error>;
