mod cli;
mod logging;
mod progress;

use crate::cli::Cli;
use crate::progress::Progress;
use clap::Parser;
use derive_more::{Display, Error};
use exn::ResultExt;
use restem_config::{Loader, Settings};
use restem_storage::BackendHandle;
use restem_storage::backend::{LocalBackend, ReadOnlyBackend};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::instrument::WithSubscriber;

type Result<T> = std::result::Result<T, exn::Exn<ErrorKind>>;

#[derive(Debug, Display, Error)]
enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("run failed")]
    Run,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e:?}");
            return ExitCode::FAILURE;
        },
    };

    let progress = Progress::new();
    let subscriber = logging::subscriber(settings.verbose, progress.bar().clone());
    match run(settings, &progress).with_subscriber(subscriber).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            progress.clear();
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        },
    }
}

fn settings(cli: &Cli) -> Result<Settings> {
    let work = cli.work.clone().unwrap_or_else(|| PathBuf::from("."));
    Loader::new()
        .file(cli.config.clone())
        .search_platform_dir()
        .search_in(work)
        .load(&cli.overrides())
        .or_raise(|| ErrorKind::Config)?
        .resolve()
        .or_raise(|| ErrorKind::Config)
}

async fn run(settings: Settings, progress: &Progress) -> Result<()> {
    tracing::debug!(work = %settings.work.display(), "Resolved settings: {:?}", settings.run);
    let local: BackendHandle = Arc::new(LocalBackend::new("local"));
    let backend: BackendHandle = if settings.dry_run {
        tracing::info!("Dry run: nothing will be written");
        Arc::new(ReadOnlyBackend::new(local))
    } else {
        local
    };
    restem_library::run(backend, &settings.run, |event| progress.handle(event))
        .await
        .or_raise(|| ErrorKind::Run)?;
    tracing::info!("DONE");
    Ok(())
}
