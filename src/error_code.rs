//! 标准错误码：定义语音合成的规范错误类别及 HTTP 状态归类。
//!
//! Normalized error kinds.
//!
//! Every failure a `speak()` call can surface belongs to exactly one of these
//! kinds, whichever backend produced it. Remote adapters classify HTTP outcomes
//! through [`ErrorKind::from_http_status`] so the three providers agree on what
//! a 401 or a 429 means.
//!
//! ## Codes
//!
//! | Code  | Kind                  | Origin                                   |
//! |-------|-----------------------|------------------------------------------|
//! | E1001 | validation            | malformed request, before any side effect |
//! | E1002 | authentication        | missing or rejected credential           |
//! | E1003 | unsupported_provider  | unknown provider or missing host facility |
//! | E2001 | quota_exhausted       | provider-signalled rate/usage limit      |
//! | E3001 | network               | transport failure or non-success status  |
//! | E3002 | playback              | decode, audio output or engine failure   |
//! | E4001 | configuration         | service construction                     |
//! | E4002 | cancelled             | internal; never returned from `speak()`  |
//!
//! ## Example
//!
//! ```rust
//! use tts_lib_rust::error_code::ErrorKind;
//!
//! let kind = ErrorKind::from_http_status(429, "").unwrap();
//! assert_eq!(kind, ErrorKind::Quota);
//! assert_eq!(kind.code(), "E2001");
//! assert!(ErrorKind::from_http_status(200, "").is_none());
//! ```

use std::fmt;

/// Normalized error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// E1001: Malformed request (empty text, non-finite rate or pitch)
    Validation,
    /// E1002: Missing, invalid, or rejected credential
    Auth,
    /// E1003: Provider not enumerated, or the host lacks the required facility
    UnsupportedProvider,
    /// E2001: Provider rate or usage limit reached
    Quota,
    /// E3001: Transport failure or non-success response
    Network,
    /// E3002: Decode, audio output, or local engine failure
    Playback,
    /// E4001: Invalid service configuration
    Configuration,
    /// E4002: Work abandoned because the session was stopped
    Cancelled,
}

impl ErrorKind {
    /// Returns the canonical code string (e.g., `"E1001"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "E1001",
            Self::Auth => "E1002",
            Self::UnsupportedProvider => "E1003",
            Self::Quota => "E2001",
            Self::Network => "E3001",
            Self::Playback => "E3002",
            Self::Configuration => "E4001",
            Self::Cancelled => "E4002",
        }
    }

    /// Returns the standard name (e.g., `"authentication"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Auth => "authentication",
            Self::UnsupportedProvider => "unsupported_provider",
            Self::Quota => "quota_exhausted",
            Self::Network => "network",
            Self::Playback => "playback",
            Self::Configuration => "configuration",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a caller may reasonably try the same request again later.
    ///
    /// The service itself never retries; this is a hint for applications.
    #[inline]
    pub fn transient(&self) -> bool {
        matches!(self, Self::Network | Self::Quota)
    }

    /// Classifies an HTTP response. Returns `None` for success statuses.
    ///
    /// ElevenLabs reports exhausted character quota as a 401 with a
    /// `quota_exceeded` detail, so the body is consulted before the status.
    pub fn from_http_status(status: u16, body: &str) -> Option<Self> {
        if (200..300).contains(&status) {
            return None;
        }
        if body.contains("quota_exceeded") || body.contains("insufficient_quota") {
            return Some(Self::Quota);
        }
        let kind = match status {
            401 | 403 => Self::Auth,
            429 => Self::Quota,
            _ => Self::Network,
        };
        Some(kind)
    }

    /// Maps a standard name back to its kind.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "validation" => Self::Validation,
            "authentication" | "auth" => Self::Auth,
            "unsupported_provider" => Self::UnsupportedProvider,
            "quota_exhausted" | "quota" => Self::Quota,
            "network" => Self::Network,
            "playback" => Self::Playback,
            "configuration" => Self::Configuration,
            "cancelled" => Self::Cancelled,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ErrorKind; 8] = [
        ErrorKind::Validation,
        ErrorKind::Auth,
        ErrorKind::UnsupportedProvider,
        ErrorKind::Quota,
        ErrorKind::Network,
        ErrorKind::Playback,
        ErrorKind::Configuration,
        ErrorKind::Cancelled,
    ];

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<_> = ALL.iter().map(|k| k.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ALL.len());
    }

    #[test]
    fn test_name_round_trip() {
        for kind in ALL {
            assert_eq!(ErrorKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ErrorKind::from_name("bogus"), None);
    }

    #[test]
    fn test_http_success_is_not_an_error() {
        assert_eq!(ErrorKind::from_http_status(200, ""), None);
        assert_eq!(ErrorKind::from_http_status(204, "quota_exceeded"), None);
    }

    #[test]
    fn test_http_status_classification() {
        assert_eq!(ErrorKind::from_http_status(401, ""), Some(ErrorKind::Auth));
        assert_eq!(ErrorKind::from_http_status(403, ""), Some(ErrorKind::Auth));
        assert_eq!(ErrorKind::from_http_status(429, ""), Some(ErrorKind::Quota));
        assert_eq!(ErrorKind::from_http_status(400, ""), Some(ErrorKind::Network));
        assert_eq!(ErrorKind::from_http_status(500, ""), Some(ErrorKind::Network));
        assert_eq!(ErrorKind::from_http_status(503, ""), Some(ErrorKind::Network));
    }

    #[test]
    fn test_quota_detail_overrides_status() {
        let body = r#"{"detail":{"status":"quota_exceeded","message":"no characters left"}}"#;
        assert_eq!(ErrorKind::from_http_status(401, body), Some(ErrorKind::Quota));
    }

    #[test]
    fn test_transient_kinds() {
        assert!(ErrorKind::Network.transient());
        assert!(ErrorKind::Quota.transient());
        assert!(!ErrorKind::Auth.transient());
        assert!(!ErrorKind::Validation.transient());
    }
}
