use crate::error_code::ErrorKind;
use crate::types::Provider;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "request.text", "openai.base_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "request_validator", "config")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the TTS runtime.
///
/// Each variant is one normalized kind; see [`ErrorKind`] for the taxonomy.
/// Remote-originated variants carry the provider tag and, when the failure was
/// observed on an HTTP response, its status code.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Unsupported provider `{provider}`: {reason}")]
    UnsupportedProvider { provider: String, reason: String },

    #[error("Authentication error ({provider}{}): {message}", format_status(.status))]
    Auth {
        provider: Provider,
        status: Option<u16>,
        message: String,
    },

    #[error("Network error ({provider}{}): {message}", format_status(.status))]
    Network {
        provider: Provider,
        status: Option<u16>,
        message: String,
    },

    #[error("Quota exceeded ({provider}{}): {message}", format_status(.status))]
    Quota {
        provider: Provider,
        status: Option<u16>,
        message: String,
    },

    #[error("Playback error ({provider}): {message}")]
    Playback { provider: Provider, message: String },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// Work abandoned because the owning session was stopped. The service turns
    /// this into a successful `Stopped` outcome; it never escapes `speak()`.
    #[error("cancelled")]
    Cancelled,
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(", HTTP {}", code),
        None => String::new(),
    }
}

/// Longest provider body excerpt kept in an error message.
const BODY_EXCERPT_LEN: usize = 512;

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn unsupported(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::UnsupportedProvider {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    pub fn auth(provider: Provider, msg: impl Into<String>) -> Self {
        Error::Auth {
            provider,
            status: None,
            message: msg.into(),
        }
    }

    pub fn network(provider: Provider, msg: impl Into<String>) -> Self {
        Error::Network {
            provider,
            status: None,
            message: msg.into(),
        }
    }

    pub fn playback(provider: Provider, msg: impl Into<String>) -> Self {
        Error::Playback {
            provider,
            message: msg.into(),
        }
    }

    /// Builds the error for a non-success HTTP response.
    ///
    /// Returns `None` when `status` is a success status.
    pub fn from_http_status(provider: Provider, status: u16, body: &str) -> Option<Self> {
        let kind = ErrorKind::from_http_status(status, body)?;
        let message = excerpt(body);
        let status = Some(status);
        Some(match kind {
            ErrorKind::Auth => Error::Auth {
                provider,
                status,
                message,
            },
            ErrorKind::Quota => Error::Quota {
                provider,
                status,
                message,
            },
            _ => Error::Network {
                provider,
                status,
                message,
            },
        })
    }

    /// Normalized kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::UnsupportedProvider { .. } => ErrorKind::UnsupportedProvider,
            Error::Auth { .. } => ErrorKind::Auth,
            Error::Network { .. } => ErrorKind::Network,
            Error::Quota { .. } => ErrorKind::Quota,
            Error::Playback { .. } => ErrorKind::Playback,
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Provider the failure is attributed to, if any.
    pub fn provider(&self) -> Option<Provider> {
        match self {
            Error::Auth { provider, .. }
            | Error::Network { provider, .. }
            | Error::Quota { provider, .. }
            | Error::Playback { provider, .. } => Some(*provider),
            _ => None,
        }
    }

    /// HTTP status the failure was observed on, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { status, .. } | Error::Network { status, .. } | Error::Quota { status, .. } => {
                *status
            }
            _ => None,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => Some(context),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Re-attributes an adapter failure to the session's provider and folds
    /// kinds an adapter has no business producing into `Playback`.
    pub(crate) fn normalize(self, provider: Provider) -> Self {
        match self {
            Error::Auth { status, message, .. } => Error::Auth {
                provider,
                status,
                message,
            },
            Error::Network { status, message, .. } => Error::Network {
                provider,
                status,
                message,
            },
            Error::Quota { status, message, .. } => Error::Quota {
                provider,
                status,
                message,
            },
            Error::Playback { message, .. } => Error::Playback { provider, message },
            Error::Cancelled => Error::Cancelled,
            other => Error::Playback {
                provider,
                message: other.to_string(),
            },
        }
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    match trimmed.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
