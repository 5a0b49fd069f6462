//! 请求校验：在任何副作用之前规范化并校验语音请求。
//!
//! Request validation.

use crate::types::{Provider, RawSpeechRequest, SpeechRequest, DEFAULT_PITCH, DEFAULT_RATE};
use crate::{Error, ErrorContext, Result};

/// Normalize a raw request into a [`SpeechRequest`].
///
/// Checks run in a fixed order and the first failure wins:
/// 1. text must be non-blank (`Validation`)
/// 2. provider must be one of the enumerated backends (`UnsupportedProvider`)
/// 3. rate and pitch, when given, must be finite numbers (`Validation`);
///    otherwise they default to 1.0 and are never clamped here
/// 4. remote providers need a non-blank credential (`Auth`), so a missing key
///    fails before any network activity
pub fn validate(raw: RawSpeechRequest) -> Result<SpeechRequest> {
    if raw.text.trim().is_empty() {
        return Err(Error::validation_with_context(
            "text must not be empty",
            ErrorContext::new()
                .with_field_path("request.text")
                .with_source("request_validator"),
        ));
    }

    let provider: Provider = raw.provider.parse()?;

    let rate = finite_or_default(raw.rate, DEFAULT_RATE, "request.rate")?;
    let pitch = finite_or_default(raw.pitch, DEFAULT_PITCH, "request.pitch")?;

    let voice = raw
        .voice
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let credential = if provider.is_remote() {
        match raw.credential.map(|c| c.trim().to_string()) {
            Some(c) if !c.is_empty() => Some(c),
            _ => {
                return Err(Error::auth(
                    provider,
                    format!("{} requires an API credential", provider),
                ))
            }
        }
    } else {
        None
    };

    Ok(SpeechRequest::new(
        raw.text, provider, voice, rate, pitch, credential,
    ))
}

fn finite_or_default(value: Option<f32>, default: f32, field: &str) -> Result<f32> {
    match value {
        None => Ok(default),
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => Err(Error::validation_with_context(
            "must be a finite number",
            ErrorContext::new()
                .with_field_path(field)
                .with_details(format!("got {}", v))
                .with_source("request_validator"),
        )),
    }
}
