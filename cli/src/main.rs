//! wardbell - patient roster chime monitor.
//!
//! Watches a roster snapshot file, reconciles it against retained state,
//! and plays a chime per observed change. The snapshot file is produced by
//! an external page bridge; this binary owns everything downstream of it.

mod file_provider;
mod rodio_sink;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use notify::{RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing_subscriber::filter::EnvFilter;

use wardbell_core::audio::ChimeQueue;
use wardbell_core::extract;
use wardbell_core::monitor::{Monitor, TriggerStrategy};
use wardbell_core::reconcile::ReconcileEngine;
use wardbell_core::settings::SettingsStore;
use wardbell_core::events::ChangeEvent;
use wardbell_types::{BucketShape, SoundChannel};

use file_provider::FileProvider;
use rodio_sink::RodioSink;

/// Polling bounds; anything faster hammers the source, anything slower
/// makes chimes feel detached from the change that caused them.
const MIN_INTERVAL_MS: u64 = 500;
const MAX_INTERVAL_MS: u64 = 2000;

#[derive(Parser)]
#[command(version, about = "Patient roster chime monitor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor a roster file and chime on changes
    Watch {
        /// Roster snapshot file (JSON)
        #[arg(short, long)]
        roster: PathBuf,
        /// Polling interval in milliseconds
        #[arg(long, default_value_t = 2000)]
        interval_ms: u64,
        /// React to file changes instead of polling
        #[arg(long)]
        follow: bool,
        /// How bucket content is interpreted
        #[arg(long, value_enum, default_value_t)]
        shape: ShapeArg,
    },
    /// Run one cycle and print the observed changes as JSON
    Once {
        #[arg(short, long)]
        roster: PathBuf,
        #[arg(long, value_enum, default_value_t)]
        shape: ShapeArg,
    },
    /// Test-play a channel's configured sound
    Play { channel: SoundChannel },
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum ShapeArg {
    #[default]
    Counts,
    Presence,
}

impl From<ShapeArg> for BucketShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Counts => BucketShape::Counts,
            ShapeArg::Presence => BucketShape::Presence,
        }
    }
}

/// Initialize logging, writing to WARDBELL_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("WARDBELL_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Watch {
            roster,
            interval_ms,
            follow,
            shape,
        } => watch(roster, interval_ms, follow, shape.into()).await,
        Commands::Once { roster, shape } => once(roster, shape.into()),
        Commands::Play { channel } => play(channel).await,
    }
}

async fn watch(
    roster: PathBuf,
    interval_ms: u64,
    follow: bool,
    shape: BucketShape,
) -> Result<(), String> {
    let settings = SettingsStore::load();
    let (monitor, handle) = Monitor::new(
        FileProvider::new(roster.clone()),
        ReconcileEngine::new(shape),
        RodioSink::new(),
        settings,
    );

    // Keeps the notify watcher alive for the life of the run
    let mut _watcher = None;
    if follow {
        let (events_tx, events_rx) = mpsc::channel(16);
        // First cycle runs without waiting for a file change
        let _ = events_tx.try_send(());

        let mut watcher = notify::recommended_watcher(
            move |res: Result<notify::Event, notify::Error>| match res {
                Ok(_) => {
                    let _ = events_tx.try_send(());
                }
                Err(e) => tracing::warn!("file watch error: {e}"),
            },
        )
        .map_err(|e| format!("failed to create file watcher: {e}"))?;

        // Watch the parent directory: editors and bridges replace the file
        let watch_dir = roster.parent().unwrap_or_else(|| std::path::Path::new("."));
        watcher
            .watch(watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| format!("failed to watch {}: {e}", watch_dir.display()))?;
        _watcher = Some(watcher);

        handle.activate(TriggerStrategy::Mutation(events_rx)).await;
        tracing::info!(roster = %roster.display(), "following roster file");
    } else {
        let period = interval_ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS);
        if period != interval_ms {
            tracing::warn!(requested = interval_ms, clamped = period, "interval clamped");
        }
        handle
            .activate(TriggerStrategy::Interval(Duration::from_millis(period)))
            .await;
        tracing::info!(roster = %roster.display(), period_ms = period, "polling roster file");
    }

    let shutdown_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutting down");
            shutdown_handle.deactivate().await;
            shutdown_handle.shutdown().await;
        }
    });

    monitor.run().await;
    Ok(())
}

fn once(roster: PathBuf, shape: BucketShape) -> Result<(), String> {
    let mut provider = FileProvider::new(roster);
    let mut engine = ReconcileEngine::new(shape);

    let snapshot = extract::extract(&mut provider, &[], shape)
        .map_err(|e| format!("cannot read roster: {e}"))?;
    let mut events = engine.reconcile(snapshot);

    // Same follow-up rule as the monitor: a new slot re-reads the grid
    let slots_added = events
        .iter()
        .any(|e| matches!(e, ChangeEvent::SlotSetChanged { added, .. } if !added.is_empty()));
    if slots_added {
        let known = engine.known_keys();
        if let Ok(snapshot) = extract::extract(&mut provider, &known, shape) {
            events.extend(engine.reconcile(snapshot));
        }
    }

    for event in &events {
        let line = serde_json::to_string(event).map_err(|e| e.to_string())?;
        println!("{line}");
    }
    Ok(())
}

async fn play(channel: SoundChannel) -> Result<(), String> {
    let mut settings = SettingsStore::load();
    let mut queue = ChimeQueue::new(RodioSink::new());

    queue.enqueue(channel);
    queue.process_queue(&mut settings).await;

    let failures = queue.take_failures();
    if let Some(failure) = failures.first() {
        return Err(format!("playback failed: {}", failure.error));
    }
    println!("played {channel}");
    Ok(())
}
