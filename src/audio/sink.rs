//! Default audio output: a host player program reading from stdin.

use super::{AudioBuffer, AudioFormat, AudioSink, Playback, ProcessPlayback};
use crate::types::Provider;
use crate::utils::{find_first, find_program, program_stem};
use crate::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Players probed in order when no preference is configured.
const PLAYERS: &[&str] = &["ffplay", "mpv", "aplay"];

/// Pipes encoded audio into a player such as `ffplay` or `mpv`.
#[derive(Debug, Clone)]
pub struct CommandSink {
    player: Option<PathBuf>,
}

impl CommandSink {
    /// Use `preferred` when given and present, else the first known player on `PATH`.
    pub fn detect(preferred: Option<&str>) -> Self {
        let player = preferred
            .and_then(find_program)
            .or_else(|| find_first(PLAYERS).map(|(_, path)| path));
        match &player {
            Some(p) => info!(target = "tts", bin = ?p, "Detected audio player"),
            None => info!(target = "tts", "No audio player found; remote playback will fail"),
        }
        Self { player }
    }

    pub fn with_player(player: impl Into<PathBuf>) -> Self {
        Self {
            player: Some(player.into()),
        }
    }

    pub fn player(&self) -> Option<&PathBuf> {
        self.player.as_ref()
    }
}

/// Arguments that make `player` read one clip from stdin and exit.
fn player_args(player: &str, format: AudioFormat) -> Option<Vec<String>> {
    let args: &[&str] = match player {
        "ffplay" => &["-nodisp", "-autoexit", "-loglevel", "error", "-i", "-"],
        "mpv" => &["--no-video", "--really-quiet", "--no-terminal", "-"],
        // aplay only understands PCM containers
        "aplay" if format == AudioFormat::Wav => &["-q", "-"],
        "paplay" if format == AudioFormat::Wav => &[],
        _ => return None,
    };
    Some(args.iter().map(|s| s.to_string()).collect())
}

impl AudioSink for CommandSink {
    fn name(&self) -> &str {
        "command"
    }

    fn open(&self, provider: Provider, buffer: AudioBuffer) -> Result<Box<dyn Playback>> {
        let player = self
            .player
            .as_ref()
            .ok_or_else(|| Error::playback(provider, "no audio output program available"))?;
        let stem = program_stem(player);
        let args = player_args(&stem, buffer.format).ok_or_else(|| {
            Error::playback(
                provider,
                format!("{} cannot play {} audio", stem, buffer.format.mime_type()),
            )
        })?;
        Ok(Box::new(
            ProcessPlayback::new(provider, player.clone(), args).with_stdin(buffer.data),
        ))
    }
}
