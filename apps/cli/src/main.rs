use std::{
    collections::HashMap,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use lecture_notes_core::{
    CancellationToken, Config, GENERIC_FAILURE_MESSAGE, NotesRequest, StudyNotes, Surface,
    config::{LIST_POLICY_ENV, MODEL_ENV, PROVIDER_ENV, TIMEOUT_ENV},
    format_notes_readable, save_notes,
};

use crate::input::NotesSource;

mod input;

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let total = secs.round() as u64;
        format!("{}m {}s", total / 60, total % 60)
    }
}

/// Provider choices, named as `LECTURE_NOTES_PROVIDER` accepts them
#[derive(Clone, ValueEnum)]
enum CliProvider {
    Gemini,
    Openai,
    Grok,
}

#[derive(Clone, ValueEnum)]
enum CliListPolicy {
    AsReturned,
    Truncate,
    Strict,
}

#[derive(Parser)]
#[command(name = "lecture-notes")]
#[command(about = "Turn lecture notes into a summary, key points and exam questions")]
struct Cli {
    /// File with lecture notes ("-" or omitted reads stdin)
    file: Option<PathBuf>,

    /// Lecture notes passed inline instead of a file
    #[arg(short, long)]
    text: Option<String>,

    /// AI provider (overrides LECTURE_NOTES_PROVIDER)
    #[arg(short, long)]
    provider: Option<CliProvider>,

    /// Model name (overrides LECTURE_NOTES_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Request timeout in seconds, 0 to wait indefinitely
    #[arg(long)]
    timeout: Option<u64>,

    /// How to treat key point / exam question counts other than five
    #[arg(long)]
    list_policy: Option<CliListPolicy>,

    /// Print the raw JSON result instead of formatted text
    #[arg(long)]
    json: bool,

    /// Also save the result as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn value_name(value: &impl ValueEnum) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

/// Flags take precedence over the environment and `.env`.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut overrides: HashMap<&str, String> = HashMap::new();
    if let Some(provider) = &cli.provider {
        overrides.insert(PROVIDER_ENV, value_name(provider));
    }
    if let Some(model) = &cli.model {
        overrides.insert(MODEL_ENV, model.clone());
    }
    if let Some(timeout) = cli.timeout {
        overrides.insert(TIMEOUT_ENV, timeout.to_string());
    }
    if let Some(policy) = &cli.list_policy {
        overrides.insert(LIST_POLICY_ENV, value_name(policy));
    }

    let config = Config::from_env_with(|key| overrides.get(key).cloned())?;
    tracing::info!(
        provider = config.provider.name(),
        model = config.model(),
        timeout_secs = config.timeout.map(|t| t.as_secs()),
        api_key_set = config.api_key.is_some(),
        "configuration loaded"
    );
    Ok(config)
}

fn print_notes(notes: &StudyNotes, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(notes)?);
        return Ok(());
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{}", format_notes_readable(notes));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let generator = config.build_generator()?;

    let source = NotesSource::from_args(cli.text.take(), cli.file.take());
    tracing::debug!(?source, "reading lecture notes");
    let notes = source.read().await?;

    let mut surface = Surface::new();
    surface.set_notes(notes);

    let Some(notes) = surface.begin() else {
        eprintln!(
            "{} No lecture notes given. Paste some notes and try again.",
            style("Error:").red().bold()
        );
        std::process::exit(2);
    };

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let started = Instant::now();
    let spinner = create_spinner(&format!(
        "Generating study notes with {}...",
        config.provider.name()
    ));
    let outcome = generator
        .generate_request(NotesRequest::new(notes).with_cancel(cancel))
        .await;
    surface.complete(outcome);

    if let Some(notes) = surface.result() {
        spinner.finish_with_message(format!(
            "{} Study notes generated ({}) {}",
            style("✓").green().bold(),
            generator.model(),
            style(format!("[{}]", format_duration(started.elapsed()))).dim()
        ));

        if let Some(path) = &cli.output {
            save_notes(notes, path).await?;
            eprintln!("{} {}", style("Saved:").dim(), style(path.display()).cyan());
        }
        print_notes(notes, cli.json)?;
        return Ok(());
    }

    spinner.finish_and_clear();
    eprintln!(
        "{} {}",
        style("Error:").red().bold(),
        surface.error().unwrap_or(GENERIC_FAILURE_MESSAGE)
    );
    std::process::exit(1);
}
