//! Binary entry point that loads configuration, wires the collaborators and
//! launches the voice assistant loop.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

use alice::ai::{AiEngine, LanguageModel, OllamaModel, OpenAiModel};
use alice::assistant::VoiceAssistant;
use alice::browser::SystemBrowser;
use alice::calendar::{Calendar, FileCalendar, GoogleCalendar, UnavailableCalendar};
use alice::config::{AiProvider, AppConfig, ListenMode, CONFIG_PATH};
use alice::router::Router;
use alice::speech::{SpeechSynthesizer, TerminalVoice};

/// Keyword-routed voice assistant.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Listening mode; overrides config and LISTEN_MODE.
    #[arg(long, value_enum)]
    mode: Option<ListenMode>,

    /// Path of the JSON configuration file.
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Print replies without text-to-speech.
    #[arg(long)]
    mute: bool,
}

#[tokio::main]
/// Bootstraps environment variables and logging, then runs the assistant.
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env_and_file(&cli.config);
    if let Some(mode) = cli.mode {
        config.listen_mode = mode;
    }
    tracing::info!(
        name = %config.assistant_name,
        mode = ?config.listen_mode,
        provider = ?config.ai_provider,
        "Starting assistant"
    );

    let router = Router::new(
        config.assistant_name.clone(),
        Box::new(AiEngine::new(
            config.assistant_name.clone(),
            config.max_history,
            build_model(&config),
        )),
        build_calendar(&config),
        Box::new(SystemBrowser::default()),
    );
    let synthesizer =
        (!cli.mute).then(|| SpeechSynthesizer::new(config.tts_program.clone(), config.voice_rate));
    let voice = TerminalVoice::new(config.assistant_name.clone(), synthesizer);

    VoiceAssistant::new(router, voice, config.listen_mode).run().await
}

/// Logs to stderr so the conversation on stdout stays readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_timer(ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();
}

/// Picks the language model backend; `None` keeps the assistant offline.
fn build_model(config: &AppConfig) -> Option<Box<dyn LanguageModel>> {
    match config.ai_provider {
        AiProvider::OpenAi => match &config.openai_api_key {
            Some(key) => Some(Box::new(OpenAiModel::new(key.clone(), config.openai_model.clone()))),
            None => {
                tracing::warn!("OPENAI_API_KEY not set, using offline replies");
                None
            }
        },
        AiProvider::Ollama => Some(Box::new(OllamaModel::new(
            config.ollama_url.clone(),
            config.ollama_model.clone(),
        ))),
        AiProvider::Offline => None,
    }
}

/// Google Calendar when a token is set, then a local events file, else nothing.
fn build_calendar(config: &AppConfig) -> Box<dyn Calendar> {
    if let Some(token) = &config.google_calendar_token {
        return Box::new(GoogleCalendar::new(token.clone(), config.calendar_id.clone()));
    }
    let events_file = Path::new(&config.events_file);
    if events_file.exists() {
        tracing::info!("Reading events from {}", events_file.display());
        return Box::new(FileCalendar::new(events_file));
    }
    tracing::warn!("No calendar configured, calendar commands will report no events");
    Box::new(UnavailableCalendar)
}
