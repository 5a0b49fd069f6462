//! Local engine adapter.

use super::SpeechAdapter;
use crate::audio::Playback;
use crate::engine::{SpeechEngine, Utterance};
use crate::types::{Provider, SpeechRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Delegates straight to the host engine; there is no network phase, so the
/// handle is ready immediately.
#[derive(Debug, Clone)]
pub struct LocalAdapter {
    engine: Arc<dyn SpeechEngine>,
}

impl LocalAdapter {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl SpeechAdapter for LocalAdapter {
    fn provider(&self) -> Provider {
        Provider::Local
    }

    async fn synthesize(
        &self,
        request: &SpeechRequest,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Playback>> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let utterance = Utterance {
            text: request.text().to_string(),
            voice: request.voice().map(str::to_string),
            rate: request.rate(),
            pitch: request.pitch(),
        };
        self.engine
            .utter(utterance)
            .map_err(|e| e.normalize(Provider::Local))
    }
}
