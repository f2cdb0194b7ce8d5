use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    booksearch::logging::init().context("init logging")?;

    let cli = booksearch::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let config = booksearch::config::ClientConfig::from_env()
        .context("load config")?
        .with_api_url(cli.api_url.as_deref())?;
    tracing::debug!(?config, "resolved config");

    match cli.command {
        booksearch::cli::Command::Search(args) => {
            booksearch::search::run(args, config).await.context("search")?;
        }
        booksearch::cli::Command::Browse(args) => {
            booksearch::browse::run(args, config).await.context("browse")?;
        }
    }

    Ok(())
}
