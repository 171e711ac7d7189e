//! Monitor service.
//!
//! A single task owns the provider, engine, chime queue, and settings, and
//! processes commands and trigger ticks sequentially. One cycle runs
//! extract, reconcile, enqueue, play; the next cycle cannot start until the
//! previous one has committed, so trigger bursts coalesce behind the tick
//! channel rather than piling up.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::audio::{AudioSink, ChimeQueue, PlaybackFailure};
use crate::error::ExtractError;
use crate::events::ChangeEvent;
use crate::extract;
use crate::provider::SnapshotProvider;
use crate::reconcile::ReconcileEngine;
use crate::roster::RosterSnapshot;
use crate::settings::SettingsStore;

/// What drives monitoring cycles. Exactly one strategy is active at a time.
pub enum TriggerStrategy {
    /// Fixed-interval polling.
    Interval(Duration),
    /// External mutation events; bursts coalesce into one pending tick.
    Mutation(mpsc::Receiver<()>),
}

enum Command {
    Activate(TriggerStrategy),
    Deactivate,
    ForceReconcile,
    ClearAllState,
    DumpState(oneshot::Sender<RosterSnapshot>),
    TakeFailures(oneshot::Sender<Vec<PlaybackFailure>>),
    Shutdown,
}

/// Cloneable handle to a running [`Monitor`].
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::Sender<Command>,
}

impl MonitorHandle {
    /// Start monitoring with the given trigger. Idempotent while active.
    pub async fn activate(&self, strategy: TriggerStrategy) {
        self.send(Command::Activate(strategy)).await;
    }

    /// Stop the trigger, drop pending ticks, and clean up the queue.
    pub async fn deactivate(&self) {
        self.send(Command::Deactivate).await;
    }

    /// Run one cycle immediately, independent of the trigger.
    pub async fn force_reconcile(&self) {
        self.send(Command::ForceReconcile).await;
    }

    /// Forget all retained roster state.
    pub async fn clear_all_state(&self) {
        self.send(Command::ClearAllState).await;
    }

    /// Clone of the retained roster state.
    pub async fn dump_state(&self) -> Option<RosterSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::DumpState(tx)).await;
        rx.await.ok()
    }

    /// Drain surfaced playback failures.
    pub async fn take_failures(&self) -> Vec<PlaybackFailure> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::TakeFailures(tx)).await;
        rx.await.unwrap_or_default()
    }

    /// Stop the service task.
    pub async fn shutdown(&self) {
        self.send(Command::Shutdown).await;
    }

    async fn send(&self, command: Command) {
        if self.tx.send(command).await.is_err() {
            tracing::debug!("monitor task is gone, command dropped");
        }
    }
}

/// The service task state.
pub struct Monitor<P, S> {
    provider: P,
    engine: ReconcileEngine,
    queue: ChimeQueue<S>,
    settings: SettingsStore,
    commands: mpsc::Receiver<Command>,
    ticks_tx: mpsc::Sender<()>,
    ticks_rx: mpsc::Receiver<()>,
    trigger: Option<JoinHandle<()>>,
}

impl<P, S> Monitor<P, S>
where
    P: SnapshotProvider,
    S: AudioSink,
{
    pub fn new(
        provider: P,
        engine: ReconcileEngine,
        sink: S,
        settings: SettingsStore,
    ) -> (Self, MonitorHandle) {
        let (tx, commands) = mpsc::channel(32);
        // Capacity 1: a burst of trigger events collapses into one cycle
        let (ticks_tx, ticks_rx) = mpsc::channel(1);
        let monitor = Self {
            provider,
            engine,
            queue: ChimeQueue::new(sink),
            settings,
            commands,
            ticks_tx,
            ticks_rx,
            trigger: None,
        };
        (monitor, MonitorHandle { tx })
    }

    /// Process commands and trigger ticks until shutdown.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    if !self.handle_command(command).await {
                        break;
                    }
                }
                Some(()) = self.ticks_rx.recv(), if self.trigger.is_some() => {
                    self.cycle().await;
                }
            }
        }
        self.deactivate();
        tracing::info!("monitor stopped");
    }

    /// Returns false on shutdown.
    async fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Activate(strategy) => self.activate(strategy),
            Command::Deactivate => self.deactivate(),
            Command::ForceReconcile => self.cycle().await,
            Command::ClearAllState => {
                self.engine.clear();
                tracing::info!("roster state cleared");
            }
            Command::DumpState(reply) => {
                let _ = reply.send(self.engine.dump());
            }
            Command::TakeFailures(reply) => {
                let _ = reply.send(self.queue.take_failures());
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn activate(&mut self, strategy: TriggerStrategy) {
        if self.trigger.is_some() {
            tracing::debug!("monitor already active, activate ignored");
            return;
        }
        let ticks = self.ticks_tx.clone();
        let task = match strategy {
            TriggerStrategy::Interval(period) => {
                tracing::info!(?period, "monitor activated with interval trigger");
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(period);
                    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                    // The first tick fires immediately
                    loop {
                        interval.tick().await;
                        if ticks.send(()).await.is_err() {
                            break;
                        }
                    }
                })
            }
            TriggerStrategy::Mutation(mut events) => {
                tracing::info!("monitor activated with mutation trigger");
                tokio::spawn(async move {
                    while events.recv().await.is_some() {
                        // A tick already pending is enough; drop the rest
                        let _ = ticks.try_send(());
                    }
                })
            }
        };
        self.trigger = Some(task);
    }

    fn deactivate(&mut self) {
        let Some(task) = self.trigger.take() else {
            return;
        };
        task.abort();
        while self.ticks_rx.try_recv().is_ok() {}
        self.queue.cleanup();
        tracing::info!("monitor deactivated");
    }

    /// One monitoring cycle: extract, reconcile, chime.
    async fn cycle(&mut self) {
        let Some(mut events) = self.reconcile_once() else {
            return;
        };

        // A new slot column usually means the source re-rendered the whole
        // grid; re-extract immediately so counts filed under it this render
        // are not missed until the next tick.
        let slots_added = events.iter().any(|e| {
            matches!(e, ChangeEvent::SlotSetChanged { added, .. } if !added.is_empty())
        });
        if slots_added {
            if let Some(more) = self.reconcile_once() {
                events.extend(more);
            }
        }

        for event in &events {
            tracing::debug!(?event, "roster change");
            if let Some(channel) = event.sound_channel() {
                self.queue.enqueue(channel);
            }
        }
        self.queue.process_queue(&mut self.settings).await;
    }

    fn reconcile_once(&mut self) -> Option<Vec<ChangeEvent>> {
        let known = self.engine.known_keys();
        match extract::extract(&mut self.provider, &known, self.engine.shape()) {
            Ok(snapshot) => Some(self.engine.reconcile(snapshot)),
            Err(ExtractError::SourceNotReady) => {
                tracing::debug!("source not ready, cycle skipped");
                None
            }
        }
    }
}
