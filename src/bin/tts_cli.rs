//! tts-cli：文本转语音命令行工具：朗读文本、查看提供商与本地语音
//!
//! Usage:
//!   tts-cli speak [OPTIONS] <text>...     Speak text with a provider
//!   tts-cli providers [--config <file>]   Show provider availability on this host
//!   tts-cli voices [--config <file>]      List voices of the local engine

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;
use tts_lib_rust::{Provider, RawSpeechRequest, SpeakOutcome, TtsConfig, TtsService};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match args[1].as_str() {
        "speak" => run(cmd_speak(&args[2..])),
        "providers" => run(cmd_providers(&args[2..])),
        "voices" => run(cmd_voices(&args[2..])),
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"tts-cli: 文本转语音命令行工具

USAGE:
    tts-cli <COMMAND> [OPTIONS]

COMMANDS:
    speak [OPTIONS] <text>...   Speak text (Ctrl-C stops playback)
    providers                   Show which providers this host supports
    voices                      List voices of the local speech engine
    version                     Show version information
    help                        Show this help message

SPEAK OPTIONS:
    -p, --provider <name>       local | openai | elevenlabs | yandex (default: local)
    -v, --voice <id>            Provider voice identifier
    -r, --rate <n>              Speaking rate multiplier (default: 1.0)
        --pitch <n>             Pitch multiplier (default: 1.0)
    -k, --key <credential>      API credential for remote providers
        --fallback              Speak locally if the remote provider fails

COMMON OPTIONS:
        --config <file>         YAML configuration file

ENVIRONMENT:
    TTS_API_KEY                 Credential used when --key is absent
    TTS_PLAYER, TTS_ENGINE      Audio player and speech engine programs
    RUST_LOG                    Log filter (default: info)"#
    );
}

fn cmd_version() {
    println!("tts-cli {}", env!("CARGO_PKG_VERSION"));
}

fn run(fut: impl std::future::Future<Output = anyhow::Result<()>>) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?
        .block_on(fut)
}

#[derive(Debug, Default)]
struct SpeakArgs {
    provider: Option<String>,
    voice: Option<String>,
    rate: Option<f32>,
    pitch: Option<f32>,
    key: Option<String>,
    config: Option<PathBuf>,
    fallback: bool,
    text: Vec<String>,
}

fn parse_speak_args(args: &[String]) -> anyhow::Result<SpeakArgs> {
    let mut parsed = SpeakArgs::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-p" | "--provider" => parsed.provider = Some(value(&mut iter, arg)?),
            "-v" | "--voice" => parsed.voice = Some(value(&mut iter, arg)?),
            "-r" | "--rate" => {
                parsed.rate = Some(value(&mut iter, arg)?.parse().context("--rate must be a number")?)
            }
            "--pitch" => {
                parsed.pitch = Some(value(&mut iter, arg)?.parse().context("--pitch must be a number")?)
            }
            "-k" | "--key" => parsed.key = Some(value(&mut iter, arg)?),
            "--config" => parsed.config = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--fallback" => parsed.fallback = true,
            "--" => {
                parsed.text.extend(iter.by_ref().cloned());
                break;
            }
            flag if flag.starts_with('-') && flag.len() > 1 => bail!("unknown option: {flag}"),
            word => parsed.text.push(word.to_string()),
        }
    }
    Ok(parsed)
}

fn value(iter: &mut std::slice::Iter<'_, String>, flag: &str) -> anyhow::Result<String> {
    iter.next()
        .cloned()
        .with_context(|| format!("{flag} requires a value"))
}

fn config_flag(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<TtsConfig> {
    match path {
        Some(path) => Ok(TtsConfig::from_yaml_file(path)?.with_env_overrides()),
        None => Ok(TtsConfig::from_env()),
    }
}

async fn cmd_speak(args: &[String]) -> anyhow::Result<()> {
    let args = parse_speak_args(args)?;
    if args.text.is_empty() {
        bail!("nothing to say; usage: tts-cli speak [OPTIONS] <text>...");
    }

    let mut config = load_config(args.config.as_ref())?;
    if args.fallback {
        config.local_fallback = true;
    }
    let tts = Arc::new(TtsService::builder().config(config).build()?);

    let mut request = RawSpeechRequest::new(
        args.text.join(" "),
        args.provider.unwrap_or_else(|| Provider::Local.to_string()),
    );
    if let Some(voice) = args.voice {
        request = request.voice(voice);
    }
    if let Some(rate) = args.rate {
        request = request.rate(rate);
    }
    if let Some(pitch) = args.pitch {
        request = request.pitch(pitch);
    }
    if let Some(key) = args.key.or_else(|| std::env::var("TTS_API_KEY").ok()) {
        request = request.credential(key);
    }

    let stopper = tts.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stopper.stop();
        }
    });

    match tts.speak(request).await? {
        SpeakOutcome::Completed => {}
        SpeakOutcome::Stopped => eprintln!("stopped"),
    }
    Ok(())
}

async fn cmd_providers(args: &[String]) -> anyhow::Result<()> {
    let config = load_config(config_flag(args).as_ref())?;
    let tts = TtsService::builder().config(config).build()?;
    let report = tts.capabilities().status_report();
    println!("{:<12} {:<30} RECOMMENDED VOICE", "PROVIDER", "STATUS");
    for provider in Provider::ALL {
        println!(
            "{:<12} {:<30} {}",
            provider.as_str(),
            report[&provider].to_string(),
            provider.recommended_voice()
        );
    }
    Ok(())
}

async fn cmd_voices(args: &[String]) -> anyhow::Result<()> {
    let config = load_config(config_flag(args).as_ref())?;
    let tts = TtsService::builder().config(config).build()?;
    if !tts.is_provider_supported(Provider::Local) {
        bail!("no local speech engine found on this host");
    }
    let voices = tts.local_voices().await?;
    if voices.is_empty() {
        println!("(the engine reported no voices)");
    }
    for voice in voices {
        println!("{voice}");
    }
    Ok(())
}
