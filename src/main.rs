//! quill - CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use quill::config::{Config, Overrides, run_setup};
use quill::git::Git;
use quill::llm::LlmRouter;
use quill::pipeline::{self, RunOptions};
use quill::TerminalReviewer;

/// Draft a conventional commit message for your staged changes with an LLM.
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Draft a conventional commit message for your staged changes with an LLM")]
#[command(version)]
struct Cli {
    /// Model to use for this run (overrides the config file)
    #[arg(short = 'm', long)]
    model: Option<String>,

    /// Provider to use for this run: ollama, openai, anthropic, gemini
    #[arg(short = 'p', long)]
    provider: Option<String>,

    /// Print the generated message without committing
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Debug logging; also prints the prompt and the raw model response
    #[arg(short = 'd', long)]
    debug: bool,

    /// List staged files and exit
    #[arg(short = 'l', long)]
    list: bool,

    /// Pick files to stage before generating
    #[arg(short = 'i', long)]
    interactive: bool,

    /// Run the setup wizard and write the config file
    #[arg(long)]
    init: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config_path = Config::default_path()?;

    if cli.init {
        run_setup(&config_path).context("Setup failed")?;
        return Ok(());
    }

    let config = Config::load(&config_path)?;
    let settings = config.resolve(&Overrides {
        provider: cli.provider,
        model: cli.model,
    })?;
    debug!(
        "Provider: {}, model: {}, config: {}",
        settings.provider,
        settings.model,
        config_path.display()
    );

    let generator = LlmRouter::new(settings);
    let options = RunOptions {
        dry_run: cli.dry_run,
        list: cli.list,
        interactive: cli.interactive,
        debug: cli.debug,
    };

    pipeline::run(&Git::current(), &options, &generator, &TerminalReviewer).await?;
    Ok(())
}

/// `--debug` forces `quill=debug`; otherwise `RUST_LOG`, defaulting to `warn`.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("quill=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
