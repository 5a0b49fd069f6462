//! Shared HTTP flow for the remote providers.

use super::SpeechAdapter;
use crate::audio::{decode, AudioSink, Playback};
use crate::config::{ProviderEndpoint, TtsConfig};
use crate::types::{Provider, SpeechRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Proxy;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Provider-specific request shape.
pub trait WireFormat: Send + Sync + std::fmt::Debug + 'static {
    const PROVIDER: Provider;

    fn endpoint(&self) -> &ProviderEndpoint;

    /// Build the authenticated synthesis request.
    fn request(
        &self,
        client: &reqwest::Client,
        request: &SpeechRequest,
        credential: &str,
    ) -> Result<reqwest::RequestBuilder>;

    /// Voice to send: the request's, else the endpoint default.
    fn voice<'a>(&'a self, request: &'a SpeechRequest) -> &'a str {
        request
            .voice()
            .unwrap_or(self.endpoint().default_voice.as_str())
    }
}

/// HTTP client shared by the remote adapters.
///
/// No timeout unless configured: a hung provider blocks its session until
/// `stop()` is called.
pub fn http_client(config: &TtsConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .pool_max_idle_per_host(8)
        .pool_idle_timeout(Some(Duration::from_secs(90)));

    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    if let Some(proxy_url) = &config.proxy_url {
        let proxy = Proxy::all(proxy_url)
            .map_err(|e| Error::configuration(format!("invalid proxy {}: {}", proxy_url, e)))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Remote adapter: one authenticated request, decode, hand off to the sink.
#[derive(Debug)]
pub struct RemoteAdapter<W: WireFormat> {
    wire: W,
    client: reqwest::Client,
    sink: Arc<dyn AudioSink>,
}

impl<W: WireFormat> RemoteAdapter<W> {
    pub fn new(wire: W, client: reqwest::Client, sink: Arc<dyn AudioSink>) -> Self {
        Self { wire, client, sink }
    }
}

fn transport_error(provider: Provider, e: reqwest::Error) -> Error {
    let message = if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        format!("request failed: {}", e)
    };
    Error::network(provider, message)
}

#[async_trait]
impl<W: WireFormat> SpeechAdapter for RemoteAdapter<W> {
    fn provider(&self) -> Provider {
        W::PROVIDER
    }

    async fn synthesize(
        &self,
        request: &SpeechRequest,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Playback>> {
        let provider = W::PROVIDER;
        let credential = request
            .credential()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::auth(provider, "missing credential"))?;

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if (request.pitch() - 1.0).abs() > f32::EPSILON {
            debug!(provider = %provider, pitch = request.pitch(), "pitch is not supported remotely; ignored");
        }

        let builder = self.wire.request(&self.client, request, credential)?;
        debug!(provider = %provider, chars = request.text().chars().count(), "sending synthesis request");

        // Dropping the in-flight future aborts the request.
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            sent = builder.send() => sent.map_err(|e| transport_error(provider, e))?,
        };

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            read = response.bytes() => read.map_err(|e| transport_error(provider, e))?,
        };

        if let Some(err) = Error::from_http_status(provider, status, &String::from_utf8_lossy(&body)) {
            warn!(provider = %provider, status, kind = %err.kind().name(), "synthesis request rejected");
            return Err(err);
        }

        let buffer = decode(provider, body, content_type.as_deref())?;
        debug!(provider = %provider, bytes = buffer.data.len(), format = ?buffer.format, "audio received");

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.sink.open(provider, buffer)
    }
}
