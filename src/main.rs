use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use getdocs::cli::Cli;
use getdocs::{Config, HttpFetcher, Orchestrator};

#[tokio::main]
async fn main() -> Result<()> {
    // Set default log level to INFO if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "getdocs=info");
    }

    // Initialize logging to both console and file
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let file_appender = tracing_appender::rolling::never(".", "getdocs.log");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::from_default_env()),
        )
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_filter(EnvFilter::from_default_env()),
        )
        .init();

    let cli = Cli::parse();
    let categories = cli.categories();
    if categories.is_empty() {
        warn!("No category selected, nothing to do. Use --all or see --help");
        return Ok(());
    }

    let mut config = Config::from_env()?;
    config.apply_cli(&cli);
    config.validate()?;

    let fetcher = HttpFetcher::new(&config).context("Failed to build HTTP client")?;
    info!(
        "Writing documents to {} (force: {}, test mode: {})",
        config.output_dir_str(),
        config.force,
        config.test_mode
    );

    let summaries = Orchestrator::new(&config, &fetcher).run(&categories).await;
    for summary in &summaries {
        println!("{}", summary);
    }

    Ok(())
}
