mod config;
mod console;
mod output;
mod ticker;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use miette::Result;
use robbot_core::{CommandProcessor, PronounLookupTable};
use robbot_features::register_all;
use tracing::{debug, info, info_span, warn};

use crate::config::RobbotConfig;
use crate::console::Console;
use crate::output::Output;
use crate::ticker::ReminderTicker;

#[derive(Parser)]
#[command(name = "robbot")]
#[command(about = "RobBot, the class chat bot, in console test mode")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', env = "ROBBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Only answer lines that start with the prefix
    #[arg(long)]
    prefix_required: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists, reported once logging is up
    let dotenv = dotenvy::dotenv();
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .rgb_colors(miette::RgbColors::Preferred)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))?;
    miette::set_panic_hook();
    let cli = Cli::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if cli.debug {
        EnvFilter::new("robbot_core=debug,robbot_features=debug,robbot=debug,warn")
    } else {
        EnvFilter::new("robbot_core=info,robbot_features=info,robbot=info,warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .compact()
        .init();

    match &dotenv {
        Ok(path) => debug!("Loaded environment from {:?}", path),
        Err(_) => {
            if let Some(problem) = dotenv_problem(&dotenv) {
                warn!("Ignoring .env file: {}", problem);
            }
        }
    }

    let mut config = RobbotConfig::load_or_default(cli.config.as_deref()).await?;
    config.apply_env();
    config.validate()?;

    let sources = config.sources()?;
    config.register_recurring(&sources.reminders)?;

    let mut processor =
        CommandProcessor::new(PronounLookupTable::swedish(), config.responses.clone())
            .with_span(info_span!("robbot", prefix = %config.prefix));
    register_all(&mut processor, &sources);

    let output = Output::new();
    let ticker = ReminderTicker::new(
        Arc::clone(&sources.reminders),
        sources.schedule(),
        Arc::clone(&sources.clock),
    )
    .spawn(Duration::from_secs(config.tick_seconds.max(1)), output);

    info!("RobBot ready with prefix '{}'", config.prefix);
    let console = Console::new(processor, config.prefix.clone(), cli.prefix_required);
    let result = console.run(output).await;

    ticker.abort();
    result
}

/// Why the `.env` file could not be used. A missing file is not a problem.
fn dotenv_problem(loaded: &std::result::Result<PathBuf, dotenvy::Error>) -> Option<String> {
    match loaded {
        Err(err) if !err.not_found() => Some(err.to_string()),
        _ => None,
    }
}
