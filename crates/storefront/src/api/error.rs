//! Error types for the upstream API client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::notify::Toast;

/// Coarse classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never got a response.
    Network,
    /// 401.
    Unauthorized,
    /// 403.
    Forbidden,
    /// 404.
    NotFound,
    /// 5xx.
    Server,
    /// Anything else, including `success: false` envelopes.
    Generic,
}

impl ErrorKind {
    /// Classify an HTTP status.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden,
            StatusCode::NOT_FOUND => Self::NotFound,
            s if s.is_server_error() => Self::Server,
            _ => Self::Generic,
        }
    }

    /// Fixed message shown to the shopper for this class of failure.
    #[must_use]
    pub const fn default_message(&self) -> &'static str {
        match self {
            Self::Network => "Erro de conexão. Verifique sua internet.",
            Self::Unauthorized => "Sessão expirada. Faça login novamente.",
            Self::Forbidden => "Você não tem permissão para realizar esta ação.",
            Self::NotFound => "Recurso não encontrado.",
            Self::Server => "Erro no servidor. Tente novamente mais tarde.",
            Self::Generic => "Ocorreu um erro inesperado.",
        }
    }
}

/// Errors that can occur when talking to the upstream API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Status {
        /// Classification of `status`.
        kind: ErrorKind,
        /// HTTP status code.
        status: u16,
        /// Message parsed from a JSON body, empty otherwise.
        message: String,
    },

    /// The API answered 2xx with `success: false`.
    #[error("API rejected request: {0}")]
    Rejected(String),

    /// Failed to parse the response body.
    #[error("parse error: {0}")]
    Parse(String),

    /// Could not build the request URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// An id that cannot name a single path segment.
    #[error("invalid resource id: {0:?}")]
    InvalidId(String),
}

impl ApiError {
    /// Classification used for notifications and session handling.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Status { kind, .. } => *kind,
            Self::Rejected(_) | Self::Parse(_) | Self::Url(_) | Self::InvalidId(_) => {
                ErrorKind::Generic
            }
        }
    }

    /// HTTP status, when the API answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The notification shown for this error.
    ///
    /// Classified failures use their fixed message; generic failures prefer
    /// the server's own message when it sent one.
    #[must_use]
    pub fn toast(&self) -> Toast {
        let message = match self {
            Self::Status {
                kind: ErrorKind::Generic,
                message,
                ..
            }
            | Self::Rejected(message)
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            other => other.kind().default_message().to_string(),
        };
        Toast::error(message)
    }
}

/// Error body shapes the API is known to send.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Message from a JSON error body. Anything else yields an empty message,
/// so the toast falls back to the fixed text for the status.
pub(crate) fn message_from_body(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .unwrap_or_default()
}
