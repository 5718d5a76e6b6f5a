/// Melo - headless music player shell
use clap::Parser;
use melo_core::{ManifestTrackSource, StaticTrackSource, TrackSource};
use melo_playback::{PlaybackEngine, PlaybackEvent, SimulatedBackend};
use melo_shell::{demo::demo_library, session::render_snapshot, Command, Outcome, Session, ShellConfig};
use std::{path::PathBuf, sync::Arc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "melo")]
#[command(about = "Melo music player, driven from the command line", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MELO_CONFIG")]
    config: Option<PathBuf>,

    /// JSON track manifest (overrides library.manifest)
    #[arg(short, long)]
    manifest: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = ShellConfig::load(cli.config.as_deref())?;
    if cli.manifest.is_some() {
        config.library.manifest = cli.manifest;
    }
    config.validate()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load the track library
    let source: Box<dyn TrackSource> = match &config.library.manifest {
        Some(path) => {
            tracing::info!("Loading library from {:?}", path);
            Box::new(ManifestTrackSource::new(path))
        }
        None => {
            tracing::info!("No manifest configured, using the demo library");
            Box::new(StaticTrackSource::new(demo_library()))
        }
    };
    let library = source.tracks().await?;
    tracing::info!("Library has {} tracks", library.len());

    // Initialize the engine
    let backend = Arc::new(SimulatedBackend::from_tracks(&library));
    let engine = PlaybackEngine::new(backend, config.playback.clone());
    let logger = tokio::spawn(log_events(engine.events()));

    let mut session = Session::new(library, engine.clone());
    println!("melo ready, type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match session.execute(command).await {
            Ok(Outcome::Continue(output)) => {
                if !output.is_empty() {
                    println!("{output}");
                }
            }
            Ok(Outcome::Quit) => break,
            Err(e) => println!("Error: {e}"),
        }
    }

    println!("{}", render_snapshot(&engine.snapshot()));
    engine.shutdown().await?;
    logger.abort();
    tracing::info!("Goodbye");

    Ok(())
}

/// Log engine events until the engine goes away
async fn log_events(mut events: broadcast::Receiver<PlaybackEvent>) {
    loop {
        match events.recv().await {
            Ok(PlaybackEvent::PositionUpdate {
                position_ms,
                duration_ms,
            }) => {
                tracing::trace!(position_ms, duration_ms, "Position");
            }
            Ok(PlaybackEvent::Error { message }) => {
                tracing::warn!("Playback error: {}", message);
            }
            Ok(event) => {
                tracing::info!(kind = event.kind(), "{:?}", event);
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!("Event logger lagged, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
