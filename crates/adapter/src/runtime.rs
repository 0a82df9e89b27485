//! Backend runtime integration.
//!
//! Bridges the synchronous viewer loop with an async [`ForestBackend`]. The
//! worker owns the backend; the viewer sends [`BackendCommand`]s and polls
//! [`BackendEvent`]s without blocking.

use std::time::Duration;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::client::ForestBackend;
use crate::error::BackendError;
use crate::types::GridSnapshot;

/// Work requested by the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Create { seed: u64, width: usize, height: usize },
    Fetch,
    /// Advance one step, then fetch.
    Advance,
    /// `Some(period)` starts periodic advance + fetch, `None` stops it.
    SetAutoplay(Option<Duration>),
    Shutdown,
}

/// Result delivered back to the viewer.
#[derive(Debug)]
pub enum BackendEvent {
    Snapshot(GridSnapshot),
    Failed(BackendError),
    /// Autoplay switched on or off (including after a failed step).
    Autoplay(bool),
}

/// Capacity of the command queue between the viewer and the worker.
pub const COMMAND_QUEUE: usize = 16;

/// Run the backend worker until `Shutdown` or until the command channel closes.
///
/// Commands take priority over autoplay ticks, so stopping autoplay always
/// prevents the next scheduled step.
pub async fn run_worker<B: ForestBackend>(
    mut backend: B,
    mut commands: mpsc::Receiver<BackendCommand>,
    events: mpsc::UnboundedSender<BackendEvent>,
) {
    let mut autoplay: Option<Interval> = None;

    loop {
        let wake = tokio::select! {
            biased;
            cmd = commands.recv() => match cmd {
                Some(cmd) => Wake::Command(cmd),
                None => break,
            },
            _ = next_tick(&mut autoplay) => Wake::Tick,
        };

        let command = match wake {
            Wake::Command(cmd) => cmd,
            Wake::Tick => {
                debug!("autoplay.step");
                if let Err(e) = step(&mut backend, &events).await {
                    warn!(error = %e, "autoplay step failed, stopping autoplay");
                    autoplay = None;
                    let _ = events.send(BackendEvent::Failed(e));
                    let _ = events.send(BackendEvent::Autoplay(false));
                }
                continue;
            }
        };

        let outcome = match command {
            BackendCommand::Create {
                seed,
                width,
                height,
            } => backend
                .create_grid(seed, width, height)
                .await
                .map(|snap| emit(&events, snap)),
            BackendCommand::Fetch => backend.get_grid().await.map(|snap| emit(&events, snap)),
            BackendCommand::Advance => step(&mut backend, &events).await,
            BackendCommand::SetAutoplay(Some(period)) => {
                info!(period_ms = period.as_millis() as u64, "autoplay on");
                let mut iv = tokio::time::interval_at(Instant::now() + period, period);
                iv.set_missed_tick_behavior(MissedTickBehavior::Delay);
                autoplay = Some(iv);
                let _ = events.send(BackendEvent::Autoplay(true));
                Ok(())
            }
            BackendCommand::SetAutoplay(None) => {
                if autoplay.take().is_some() {
                    info!("autoplay off");
                }
                let _ = events.send(BackendEvent::Autoplay(false));
                Ok(())
            }
            BackendCommand::Shutdown => break,
        };

        if let Err(e) = outcome {
            let _ = events.send(BackendEvent::Failed(e));
        }
    }

    debug!("backend worker stopped");
}

enum Wake {
    Command(BackendCommand),
    Tick,
}

async fn next_tick(autoplay: &mut Option<Interval>) {
    match autoplay {
        Some(iv) => {
            iv.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn step<B: ForestBackend>(
    backend: &mut B,
    events: &mpsc::UnboundedSender<BackendEvent>,
) -> Result<(), BackendError> {
    backend.advance_grid().await?;
    let snap = backend.get_grid().await?;
    emit(events, snap);
    Ok(())
}

fn emit(events: &mpsc::UnboundedSender<BackendEvent>, snap: GridSnapshot) {
    debug!(
        width = snap.width,
        height = snap.height,
        months = snap.months_elapsed,
        "snapshot received"
    );
    let _ = events.send(BackendEvent::Snapshot(snap));
}

/// Running backend worker on its own tokio runtime.
pub struct BackendLink {
    _rt: Runtime,
    cmd_tx: mpsc::Sender<BackendCommand>,
    event_rx: mpsc::UnboundedReceiver<BackendEvent>,
}

impl BackendLink {
    pub fn start<B: ForestBackend + 'static>(backend: B) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<BackendCommand>(COMMAND_QUEUE);
        let (event_tx, event_rx) = mpsc::unbounded_channel::<BackendEvent>();

        let rt = Runtime::new()?;
        rt.spawn(run_worker(backend, cmd_rx, event_tx));

        Ok(Self {
            _rt: rt,
            cmd_tx,
            event_rx,
        })
    }

    /// Queue a command. Returns false if the queue is full or the worker stopped.
    pub fn send(&self, command: BackendCommand) -> bool {
        match self.cmd_tx.try_send(command) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "backend command dropped");
                false
            }
        }
    }

    pub fn try_recv(&mut self) -> Option<BackendEvent> {
        self.event_rx.try_recv().ok()
    }
}

impl Drop for BackendLink {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
    }
}
