//! narrate - Convert Markdown blog posts to narrated MP3 files

mod audio;
mod config;
mod logging;
mod pipeline;
mod text;
mod tts;

use anyhow::{Context, Result};
use audio::CombinerKind;
use clap::{Parser, Subcommand};
use config::NarrateConfig;
use log::{debug, info};
use pipeline::Pipeline;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "narrate")]
#[command(about = "Convert Markdown blog posts to narrated MP3 files", long_about = None)]
#[command(version)]
struct Args {
    /// Directory containing .md files
    #[arg(default_value = "blogs")]
    dir: PathBuf,

    /// Scratch directory for chunk audio (default: from config, "chunks")
    #[arg(short, long)]
    scratch_dir: Option<PathBuf>,

    /// Speech model (e.g. tts-1, tts-1-hd)
    #[arg(short, long)]
    model: Option<String>,

    /// Voice (e.g. alloy, nova, onyx)
    #[arg(short, long)]
    voice: Option<String>,

    /// Playback speed (0.25-4.0)
    #[arg(long)]
    speed: Option<f32>,

    /// Maximum characters per speech request
    #[arg(short, long)]
    chunk_size: Option<usize>,

    /// How to join chunk audio
    #[arg(long, value_enum, default_value_t = CombinerKind::Auto)]
    combiner: CombinerKind,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default speech model
    SetModel {
        /// Model name
        model: String,
    },
    /// Set default voice
    SetVoice {
        /// Voice name
        voice: String,
    },
    /// Set default playback speed
    SetSpeed {
        /// Value (0.25-4.0)
        value: f32,
    },
    /// Set default chunk size
    SetChunkSize {
        /// Characters per request (1-4096)
        value: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(args.debug);

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    // Pick up OPENAI_API_KEY from a local .env, if present
    if let Ok(path) = dotenv::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }

    let config = apply_overrides(
        NarrateConfig::load().context("Failed to load configuration")?,
        &args,
    );
    config.validate()?;

    if !args.dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", args.dir.display());
    }

    debug!("Input: {}", args.dir.display());
    debug!("Scratch: {}", config.scratch_dir.display());
    debug!("Model: {}, voice: {}", config.model, config.voice);
    debug!("Chunk size: {}", config.chunk_size);

    let provider = speech_client::get_provider(&config.provider)?;
    provider.is_available()?;
    let combiner = audio::select_combiner(args.combiner, config.ffmpeg_path.as_deref())?;
    debug!("Combiner: {}", combiner.name());

    let pipeline = Pipeline {
        provider: provider.as_ref(),
        combiner: combiner.as_ref(),
        options: config.speech_options(),
        max_chunk_size: config.chunk_size,
        scratch_dir: config.scratch_dir.clone(),
    };

    let summary = pipeline.process_directory(&args.dir).await?;

    info!(
        "Done: {} markdown files, {} narrated, {} skipped, {} failed",
        summary.total(),
        summary.processed,
        summary.skipped,
        summary.failed.len()
    );

    Ok(())
}

/// Command-line values win over the config file.
fn apply_overrides(mut config: NarrateConfig, args: &Args) -> NarrateConfig {
    if let Some(scratch_dir) = &args.scratch_dir {
        config.scratch_dir = scratch_dir.clone();
    }
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(voice) = &args.voice {
        config.voice = voice.clone();
    }
    if let Some(speed) = args.speed {
        config.speed = Some(speed);
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    config
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = NarrateConfig::load()?;
            println!("Configuration file: {:?}", NarrateConfig::config_path()?);
            println!();
            println!("model = \"{}\"", config.model);
            println!("voice = \"{}\"", config.voice);
            match config.speed {
                Some(speed) => println!("speed = {}", speed),
                None => println!("speed = (api default)"),
            }
            println!("chunk_size = {}", config.chunk_size);
            println!("scratch_dir = \"{}\"", config.scratch_dir.display());
            match &config.ffmpeg_path {
                Some(path) => println!("ffmpeg_path = \"{}\"", path.display()),
                None => println!("ffmpeg_path = (search PATH)"),
            }
            println!("provider.base_url = \"{}\"", config.provider.base_url());
            if config.provider.api_key.is_some() {
                println!("provider.api_key = (set)");
            } else {
                println!("provider.api_key = (from OPENAI_API_KEY)");
            }
        }
        ConfigAction::SetModel { model } => {
            let mut config = NarrateConfig::load()?;
            config.model = model.clone();
            config.validate()?;
            config.save()?;
            println!("Default model set to: {}", config.model);
        }
        ConfigAction::SetVoice { voice } => {
            let mut config = NarrateConfig::load()?;
            config.voice = voice.clone();
            config.validate()?;
            config.save()?;
            println!("Default voice set to: {}", config.voice);
        }
        ConfigAction::SetSpeed { value } => {
            let speed = config::clamp_speed(*value);
            let mut config = NarrateConfig::load()?;
            config.speed = Some(speed);
            config.save()?;
            println!("Default speed set to: {}", speed);
        }
        ConfigAction::SetChunkSize { value } => {
            let mut config = NarrateConfig::load()?;
            config.chunk_size = *value;
            config.validate()?;
            config.save()?;
            println!("Default chunk size set to: {}", config.chunk_size);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["narrate"]).unwrap();
        assert_eq!(args.dir, PathBuf::from("blogs"));
        assert_eq!(args.combiner, CombinerKind::Auto);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_overrides_win_over_config() {
        let args = Args::try_parse_from([
            "narrate",
            "posts",
            "--voice",
            "onyx",
            "--chunk-size",
            "1000",
            "--speed",
            "1.5",
            "--combiner",
            "concat",
        ])
        .unwrap();

        let config = apply_overrides(NarrateConfig::default(), &args);

        assert_eq!(args.dir, PathBuf::from("posts"));
        assert_eq!(args.combiner, CombinerKind::Concat);
        assert_eq!(config.voice, "onyx");
        assert_eq!(config.model, "tts-1-hd");
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.speed, Some(1.5));
        assert_eq!(config.scratch_dir, PathBuf::from("chunks"));
    }

    #[test]
    fn test_config_subcommand_parses() {
        let args = Args::try_parse_from(["narrate", "config", "set-voice", "alloy"]).unwrap();
        match args.command {
            Some(Commands::Config {
                action: ConfigAction::SetVoice { voice },
            }) => assert_eq!(voice, "alloy"),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
