use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing::error;
use tracing_subscriber::EnvFilter;

use flagdeck::app::App;
use flagdeck::config::{Config, ConfigLoader};
use flagdeck::error::FlashError;
use flagdeck::flags::{FlagFetcher, FlagHttpClient};
use flagdeck::output::{ConsoleOutput, JsonOutput, OutputMode};

#[derive(Parser)]
#[command(name = "flagdeck")]
#[command(about = "Build bilingual LaTeX flag flashcards from a CSV of country facts")]
#[command(version, author)]
struct Cli {
    /// Semicolon-delimited facts file (default: data/facts.csv)
    #[arg(long)]
    csv: Option<Utf8PathBuf>,

    /// LaTeX file to write (default: flashcards.tex)
    #[arg(long)]
    output: Option<Utf8PathBuf>,

    /// Directory for downloaded flags (default: flags); must not contain
    /// LaTeX special characters such as % # $ & { } ~ ^
    #[arg(long)]
    flags_dir: Option<Utf8PathBuf>,

    /// Flag URL template containing {code}
    #[arg(long)]
    flag_url: Option<String>,

    /// Per-flag download timeout in seconds (default: 10)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// JSON config file (default: flagdeck.json when present)
    #[arg(long)]
    config: Option<String>,

    /// Print a JSON summary instead of progress lines
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<FlashError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &FlashError) -> u8 {
    match error {
        FlashError::MissingConfig(_)
        | FlashError::ConfigRead(_)
        | FlashError::ConfigParse(_)
        | FlashError::InvalidConfig(_)
        | FlashError::TemplateRead(_) => 2,
        _ => 1,
    }
}

async fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Console
    };
    let overrides = Config {
        csv_path: cli.csv,
        output_path: cli.output,
        flags_dir: cli.flags_dir,
        flag_url_template: cli.flag_url,
        timeout_secs: cli.timeout_secs,
        ..Config::default()
    };
    let resolved = ConfigLoader::resolve(cli.config.as_deref(), overrides)?;

    let client = FlagHttpClient::new(resolved.flag_source.clone(), resolved.timeout)?;
    let fetcher = FlagFetcher::new(client, resolved.store(), resolved.timeout);
    let app = App::new(fetcher, resolved.template.clone());

    let csv_path = resolved.csv_path.as_std_path();
    let result = match output_mode {
        OutputMode::Console => app.generate_from_path(csv_path, &ConsoleOutput).await,
        OutputMode::Json => app.generate_from_path(csv_path, &JsonOutput).await,
    };

    // A run that produced nothing still exits cleanly.
    match result {
        Ok(result) => {
            if matches!(output_mode, OutputMode::Json) {
                JsonOutput::print_generate(&result).into_diagnostic()?;
            }
        }
        Err(err) => {
            error!("failed to load facts: {err}");
            match output_mode {
                OutputMode::Console => {
                    println!("No countries found in CSV or error reading CSV: {err}")
                }
                OutputMode::Json => JsonOutput::print_load_failure(&err).into_diagnostic()?,
            }
        }
    }

    if matches!(output_mode, OutputMode::Console) {
        println!("Done!");
        println!("Remember this requires XeLaTeX to compile!");
    }
    Ok(())
}
