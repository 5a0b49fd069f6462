//! Command-line speech engines: espeak-ng, espeak, speech-dispatcher, macOS `say`.

use super::{SpeechEngine, Utterance};
use crate::audio::{Playback, ProcessPlayback};
use crate::types::Provider;
use crate::utils::{find_first, find_program, program_stem};
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::info;

/// Engines probed in order when no preference is configured.
const ENGINES: &[&str] = &["espeak-ng", "espeak", "spd-say", "say"];

/// espeak's default speaking rate, words per minute.
const BASE_WPM: f32 = 175.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// espeak-ng or classic espeak; same command line.
    Espeak,
    /// speech-dispatcher client.
    SpdSay,
    /// macOS `say`.
    Say,
}

impl EngineKind {
    fn from_program(stem: &str) -> Option<Self> {
        match stem {
            "espeak-ng" | "espeak" => Some(Self::Espeak),
            "spd-say" => Some(Self::SpdSay),
            "say" => Some(Self::Say),
            _ => None,
        }
    }

    /// Command-line arguments for an utterance whose text arrives on stdin.
    fn utterance_args(&self, u: &Utterance) -> Vec<String> {
        // Same bounds the browser speech API enforces.
        let rate = u.rate.clamp(0.1, 10.0);
        let pitch = u.pitch.clamp(0.0, 2.0);
        let mut args = Vec::new();
        match self {
            Self::Espeak => {
                let wpm = (BASE_WPM * rate).round().clamp(80.0, 450.0) as i32;
                let pitch = (pitch * 50.0).round().clamp(0.0, 99.0) as i32;
                args.extend(["-s".to_string(), wpm.to_string()]);
                args.extend(["-p".to_string(), pitch.to_string()]);
                if let Some(v) = &u.voice {
                    args.extend(["-v".to_string(), v.clone()]);
                }
                args.push("--stdin".to_string());
            }
            Self::SpdSay => {
                let rate = ((rate - 1.0) * 100.0).round().clamp(-100.0, 100.0) as i32;
                let pitch = ((pitch - 1.0) * 100.0).round().clamp(-100.0, 100.0) as i32;
                args.push("-w".to_string());
                args.extend(["-r".to_string(), rate.to_string()]);
                args.extend(["-p".to_string(), pitch.to_string()]);
                if let Some(v) = &u.voice {
                    args.extend(["-y".to_string(), v.clone()]);
                }
                args.push("-e".to_string());
            }
            Self::Say => {
                let wpm = (BASE_WPM * rate).round() as i32;
                args.extend(["-r".to_string(), wpm.to_string()]);
                if let Some(v) = &u.voice {
                    args.extend(["-v".to_string(), v.clone()]);
                }
                args.extend(["-f".to_string(), "-".to_string()]);
            }
        }
        args
    }

    fn list_voices_args(&self) -> &'static [&'static str] {
        match self {
            Self::Espeak => &["--voices"],
            Self::SpdSay => &["-L"],
            Self::Say => &["-v", "?"],
        }
    }

    fn parse_voices(&self, listing: &str) -> Vec<String> {
        match self {
            // Pty Language Age/Gender VoiceName File Other Languages
            Self::Espeak => listing
                .lines()
                .skip(1)
                .filter_map(|l| l.split_whitespace().nth(3))
                .map(str::to_string)
                .collect(),
            // NAME LANGUAGE VARIANT
            Self::SpdSay => listing
                .lines()
                .skip(1)
                .filter_map(|l| l.split_whitespace().next())
                .map(str::to_string)
                .collect(),
            // "Alex                en_US    # Most people recognize me by my voice."
            Self::Say => listing
                .lines()
                .filter_map(|l| l.split("  ").next())
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }
}

/// Speech engine driven through a host command-line program.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: Option<(EngineKind, PathBuf)>,
}

impl CommandEngine {
    /// Use `preferred` when given and recognised, else the first known engine on `PATH`.
    pub fn detect(preferred: Option<&str>) -> Self {
        let program = preferred
            .and_then(find_program)
            .and_then(|path| EngineKind::from_program(&program_stem(&path)).map(|k| (k, path)))
            .or_else(|| {
                find_first(ENGINES).and_then(|(name, path)| {
                    EngineKind::from_program(name).map(|kind| (kind, path))
                })
            });
        match &program {
            Some((kind, path)) => {
                info!(target = "tts", bin = ?path, kind = ?kind, "Detected speech engine")
            }
            None => info!(target = "tts", "No host speech engine detected"),
        }
        Self { program }
    }

    /// An engine the host does not have.
    pub fn unavailable() -> Self {
        Self { program: None }
    }

    pub fn kind(&self) -> Option<EngineKind> {
        self.program.as_ref().map(|(k, _)| *k)
    }

    fn require(&self) -> Result<&(EngineKind, PathBuf)> {
        self.program
            .as_ref()
            .ok_or_else(|| Error::unsupported(Provider::Local.as_str(), "no host speech engine"))
    }
}

#[async_trait]
impl SpeechEngine for CommandEngine {
    fn name(&self) -> &str {
        match self.kind() {
            Some(EngineKind::Espeak) => "espeak",
            Some(EngineKind::SpdSay) => "speech-dispatcher",
            Some(EngineKind::Say) => "say",
            None => "none",
        }
    }

    fn is_available(&self) -> bool {
        self.program.is_some()
    }

    async fn voices(&self) -> Result<Vec<String>> {
        let (kind, path) = self.require()?;
        let output = Command::new(path)
            .args(kind.list_voices_args())
            .output()
            .await
            .map_err(|e| Error::playback(Provider::Local, format!("listing voices: {}", e)))?;
        if !output.status.success() {
            return Err(Error::playback(
                Provider::Local,
                format!(
                    "listing voices failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }
        Ok(kind.parse_voices(&String::from_utf8_lossy(&output.stdout)))
    }

    fn utter(&self, utterance: Utterance) -> Result<Box<dyn Playback>> {
        let (kind, path) = self.require()?;
        let args = kind.utterance_args(&utterance);
        let mut playback = ProcessPlayback::new(Provider::Local, path.clone(), args)
            .with_stdin(Bytes::from(utterance.text.into_bytes()));
        if *kind == EngineKind::SpdSay {
            // The daemon keeps speaking after the client dies.
            playback = playback.with_stop_command(path.clone(), vec!["-S".to_string()]);
        }
        Ok(Box::new(playback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_code::ErrorKind;

    fn utterance(rate: f32, pitch: f32, voice: Option<&str>) -> Utterance {
        Utterance {
            text: "hello".into(),
            voice: voice.map(String::from),
            rate,
            pitch,
        }
    }

    #[test]
    fn test_espeak_defaults() {
        let args = EngineKind::Espeak.utterance_args(&utterance(1.0, 1.0, None));
        assert_eq!(args, vec!["-s", "175", "-p", "50", "--stdin"]);
    }

    #[test]
    fn test_espeak_voice_and_scaling() {
        let args = EngineKind::Espeak.utterance_args(&utterance(2.0, 0.5, Some("ru")));
        assert_eq!(args, vec!["-s", "350", "-p", "25", "-v", "ru", "--stdin"]);
    }

    #[test]
    fn test_spd_say_relative_scale() {
        let args = EngineKind::SpdSay.utterance_args(&utterance(1.5, 0.5, Some("female1")));
        assert_eq!(args, vec!["-w", "-r", "50", "-p", "-50", "-y", "female1", "-e"]);
    }

    #[test]
    fn test_say_reads_stdin() {
        let args = EngineKind::Say.utterance_args(&utterance(1.0, 1.0, Some("Milena")));
        assert_eq!(args, vec!["-r", "175", "-v", "Milena", "-f", "-"]);
    }

    #[test]
    fn test_parse_espeak_voices() {
        let listing = "Pty Language       Age/Gender VoiceName          File                 Other Languages\n 5  af              --/M      Afrikaans          gmw/af\n 5  ru              --/M      Russian            zle/ru\n";
        assert_eq!(EngineKind::Espeak.parse_voices(listing), vec!["Afrikaans", "Russian"]);
    }

    #[test]
    fn test_parse_say_voices() {
        let listing = "Alex                en_US    # Most people recognize me by my voice.\nBad News            en_US    # The light you see\n";
        assert_eq!(EngineKind::Say.parse_voices(listing), vec!["Alex", "Bad News"]);
    }

    #[test]
    fn test_unavailable_engine() {
        let engine = CommandEngine::unavailable();
        assert!(!engine.is_available());
        let err = engine.utter(utterance(1.0, 1.0, None)).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnsupportedProvider);
    }
}
