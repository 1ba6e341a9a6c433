use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use valet::ai::AiFallback;
use valet::config::{self, Config};
use valet::db::{self, MemoryRepo};
use valet::voice::{Speaker, SpeakerOut, SpeechSink};
use valet::{CompletionBackend, Daemon};

/// Valet - wake-word voice assistant daemon
#[derive(Parser)]
#[command(name = "valet", version, about)]
struct Cli {
    /// Wake phrase override (e.g., "computer")
    #[arg(short, long, env = "VALET_WAKE_WORD")]
    wake_word: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable voice features (for servers without audio hardware)
    #[arg(long, env = "VALET_DISABLE_VOICE")]
    disable_voice: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Speak text through the TTS pipeline
    Say {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Send one prompt to the AI fallback and print the reply
    Ask {
        /// Prompt text
        prompt: String,
    },
    /// Store a fact
    Remember {
        /// Fact name
        key: String,
        /// Fact value
        value: String,
    },
    /// Look up a fact
    Recall {
        /// Fact name
        key: String,
    },
    /// Delete a fact
    Forget {
        /// Fact name
        key: String,
    },
    /// List all stored facts
    Facts,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,valet=info",
        1 => "info,valet=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Memory subcommands only need the database, not credentials
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Say { text } => say(cli.wake_word.as_deref(), &text).await,
            Command::Ask { prompt } => ask(cli.wake_word.as_deref(), &prompt).await,
            Command::Remember { key, value } => remember(&key, &value),
            Command::Recall { key } => recall(&key),
            Command::Forget { key } => forget(&key),
            Command::Facts => facts(),
        };
    }

    tracing::info!(
        wake_word = ?cli.wake_word,
        disable_voice = cli.disable_voice,
        "starting valet"
    );

    let config = Config::load_with_options(cli.wake_word.as_deref(), cli.disable_voice)?;
    tracing::debug!(?config, "loaded configuration");

    if config.voice.enabled {
        tracing::info!("valet ready - say \"{}\"", config.wake_word);
    } else {
        tracing::info!("valet ready (voice disabled, stdin mode)");
    }

    let daemon = Daemon::new(config)?;
    daemon.run().await?;

    Ok(())
}

/// Speak one line through the real TTS pipeline
async fn say(wake_word: Option<&str>, text: &str) -> anyhow::Result<()> {
    let config = Config::load_with_options(wake_word, false)?;
    let api_key = config
        .api_keys
        .openai
        .clone()
        .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY is required"))?;

    let speaker = Speaker::new(
        config.llm.api_base.clone(),
        api_key,
        config.voice.tts_model.clone(),
        config.voice.tts_voice.clone(),
        config.voice.tts_speed,
        Arc::new(SpeakerOut),
    )?;

    speaker.speak(text).await;
    Ok(())
}

/// One-shot AI fallback round trip
async fn ask(wake_word: Option<&str>, prompt: &str) -> anyhow::Result<()> {
    let config = Config::load_with_options(wake_word, true)?;
    let api_key = config
        .api_keys
        .openai
        .clone()
        .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY is required"))?;

    let ai = AiFallback::new(
        &config.llm,
        api_key,
        config.assistant_name.clone(),
        config.language.clone(),
    )?;

    println!("{}", ai.complete(prompt).await);
    Ok(())
}

fn memory_repo() -> anyhow::Result<MemoryRepo> {
    let data_dir = config::default_data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let pool = db::init(data_dir.join("valet.db"))?;
    Ok(MemoryRepo::new(pool))
}

fn remember(key: &str, value: &str) -> anyhow::Result<()> {
    memory_repo()?.remember(key, value)?;
    println!("Remembered: {key}");
    Ok(())
}

fn recall(key: &str) -> anyhow::Result<()> {
    match memory_repo()?.recall(key)? {
        Some(value) => println!("{key} is {value}"),
        None => println!("No memory of {key}"),
    }
    Ok(())
}

fn forget(key: &str) -> anyhow::Result<()> {
    if memory_repo()?.forget(key)? {
        println!("Forgot: {key}");
    } else {
        println!("No memory of {key}");
    }
    Ok(())
}

fn facts() -> anyhow::Result<()> {
    let all = memory_repo()?.list()?;
    if all.is_empty() {
        println!("No facts stored.");
        return Ok(());
    }
    for fact in all {
        println!("{} = {}  (updated {})", fact.key, fact.value, fact.updated_at);
    }
    Ok(())
}
