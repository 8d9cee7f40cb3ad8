use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use aptkey::cli::Cli;
use aptkey::{AddSource, Progress};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("APTKEY_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("aptkey=info")
        } else {
            EnvFilter::new("aptkey=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .init();

    let settings = cli.settings().context("invalid settings")?;
    let source = cli.source().context("invalid repository definition")?;

    let pipeline = AddSource::new(settings).context("unable to prepare HTTP client")?;
    let mut progress = Progress::new(io::stdout().lock());

    let outcome = pipeline
        .run(&source, &mut progress)
        .with_context(|| format!("failed to add repository {}", source.name()))?;

    info!(
        "Repository {} added with key {}",
        source.name(),
        outcome.fingerprint
    );
    Ok(())
}
