use std::{io, sync::OnceLock};

use application::{
    config::StorageBackend, shell::Flow, App, Args, Config, Dashboard, Shell,
};
use service::{
    infra::{
        directory::http::Http,
        storage::{self, File, Memory},
    },
    SessionManager,
};
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};
use tracing as log;
use tracing_subscriber::{
    filter::filter_fn,
    layer::{Layer as _, SubscriberExt as _},
    util::SubscriberInitExt as _,
};

const STDERR_LEVELS: &[log::Level] = &[log::Level::WARN, log::Level::ERROR];

static LOG_LEVEL: OnceLock<log::Level> = OnceLock::new();

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stdout)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (!STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_thread_names(true)
                .with_writer(io::stderr)
                .with_filter(filter_fn(|meta| {
                    meta.is_span()
                        || (STDERR_LEVELS.contains(meta.level()))
                            && LOG_LEVEL
                                .get()
                                .copied()
                                .unwrap_or(log::Level::INFO)
                                >= *meta.level()
                })),
        )
        .init();

    _ = start().await;
}

async fn start() -> Result<(), ()> {
    let Args { config } = Args::parse().map_err(|e| {
        log::error!("failed to parse command line arguments: {e}");
    })?;

    let config = Config::new(config).map_err(|e| {
        log::error!("failed to load `Config`: {e}");
    })?;

    LOG_LEVEL
        .set(config.log.level.into())
        .unwrap_or_else(|_| unreachable!("first initialization"));

    let sessions = service::Config::try_from(&config).map_err(|e| {
        log::error!("failed to prepare `SessionManager` configuration: {e}");
    })?;

    let Config {
        storage, directory, ..
    } = config;

    let backend = match storage.backend {
        StorageBackend::Memory => storage::Backend::from(Memory::new()),
        StorageBackend::File => {
            log::info!("persisting session in `{}`", storage.path.display());
            storage::Backend::from(File::new(storage.path))
        }
    };

    let directory = Http::new(directory.into()).map_err(|e| {
        log::error!("failed to initialize `Http` directory: {e}");
    })?;

    let mut dashboard: App =
        Dashboard::new(SessionManager::new(sessions, backend), directory);

    let shutdown = dashboard.shutdown_token();
    drop(tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for shutdown signal: {e}");
            return;
        }
        log::info!("shutting down");
        shutdown.cancel();
    }));

    _ = dashboard.restore().await;

    repl(Shell::new(dashboard)).await.map_err(|e| {
        log::error!("shell failed: {e}");
    })
}

/// Reads [`Shell`] lines from the standard input until `exit`, end of input,
/// or shutdown.
async fn repl(mut shell: Shell<storage::Backend, Http>) -> io::Result<()> {
    let shutdown = shell.dashboard().shutdown_token();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(shell.prompt().as_bytes()).await?;
        stdout.flush().await?;

        let line = tokio::select! {
            biased;

            () = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };

        match shell.execute(&line).await {
            Flow::Continue(out) if out.is_empty() => {}
            Flow::Continue(out) => {
                stdout.write_all(out.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
            }
            Flow::Exit => break,
        }
        if shutdown.is_cancelled() {
            break;
        }
    }
    Ok(())
}
