use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use forest_view::adapter::{
    run_worker, BackendCommand, BackendError, BackendEvent, CallFailure, ForestBackend,
};
use forest_view::types::GridSnapshot;

/// In-memory backend; `fail_advance_after` makes the n-th and later advances fail.
#[derive(Clone, Default)]
struct ScriptedBackend {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    grid: Option<GridSnapshot>,
    advances: u32,
    fail_advance_after: Option<u32>,
}

impl ScriptedBackend {
    fn failing_after(n: u32) -> Self {
        let backend = Self::default();
        backend.state.lock().unwrap().fail_advance_after = Some(n);
        backend
    }

    fn advances(&self) -> u32 {
        self.state.lock().unwrap().advances
    }
}

impl ForestBackend for ScriptedBackend {
    async fn create_grid(
        &mut self,
        seed: u64,
        width: usize,
        height: usize,
    ) -> Result<GridSnapshot, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::Creation(CallFailure::InvalidDimensions { width, height }));
        }
        let snap = GridSnapshot::new(vec![seed as u16; width * height], width, height);
        let mut state = self.state.lock().unwrap();
        state.grid = Some(snap.clone());
        state.advances = 0;
        Ok(snap)
    }

    async fn get_grid(&mut self) -> Result<GridSnapshot, BackendError> {
        let state = self.state.lock().unwrap();
        state.grid.clone().ok_or(BackendError::Fetch(CallFailure::NoGrid))
    }

    async fn advance_grid(&mut self) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_advance_after.is_some_and(|n| state.advances >= n) {
            return Err(BackendError::Advance(CallFailure::Rejected("simulation halted".into())));
        }
        let Some(grid) = state.grid.as_mut() else {
            return Err(BackendError::Advance(CallFailure::NoGrid));
        };
        grid.months_elapsed += 1;
        state.advances += 1;
        Ok(())
    }
}

struct Harness {
    cmd_tx: mpsc::Sender<BackendCommand>,
    event_rx: mpsc::UnboundedReceiver<BackendEvent>,
    worker: tokio::task::JoinHandle<()>,
}

fn start(backend: ScriptedBackend) -> Harness {
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(run_worker(backend, cmd_rx, event_tx));
    Harness {
        cmd_tx,
        event_rx,
        worker,
    }
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<BackendEvent>) -> BackendEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timeout waiting for event")
        .expect("worker stopped")
}

#[tokio::test]
async fn test_create_fetch_advance() {
    let mut h = start(ScriptedBackend::default());

    h.cmd_tx.send(BackendCommand::Fetch).await.unwrap();
    match next_event(&mut h.event_rx).await {
        BackendEvent::Failed(BackendError::Fetch(CallFailure::NoGrid)) => {}
        other => panic!("unexpected event: {other:?}"),
    }

    h.cmd_tx
        .send(BackendCommand::Create {
            seed: 9,
            width: 3,
            height: 2,
        })
        .await
        .unwrap();
    match next_event(&mut h.event_rx).await {
        BackendEvent::Snapshot(snap) => {
            assert_eq!((snap.width, snap.height), (3, 2));
            assert!(snap.cells.iter().all(|&c| c == 9));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    h.cmd_tx.send(BackendCommand::Advance).await.unwrap();
    match next_event(&mut h.event_rx).await {
        BackendEvent::Snapshot(snap) => assert_eq!(snap.months_elapsed, 1),
        other => panic!("unexpected event: {other:?}"),
    }

    h.cmd_tx.send(BackendCommand::Shutdown).await.unwrap();
    h.worker.await.unwrap();
}

#[tokio::test]
async fn test_invalid_create_reports_creation_error() {
    let mut h = start(ScriptedBackend::default());
    h.cmd_tx
        .send(BackendCommand::Create {
            seed: 1,
            width: 0,
            height: 4,
        })
        .await
        .unwrap();
    match next_event(&mut h.event_rx).await {
        BackendEvent::Failed(e @ BackendError::Creation(_)) => {
            assert!(e.to_string().starts_with("grid creation failed"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_steps_until_stopped() {
    let backend = ScriptedBackend::default();
    let mut h = start(backend.clone());

    h.cmd_tx
        .send(BackendCommand::Create {
            seed: 1,
            width: 2,
            height: 2,
        })
        .await
        .unwrap();
    assert!(matches!(next_event(&mut h.event_rx).await, BackendEvent::Snapshot(_)));

    h.cmd_tx
        .send(BackendCommand::SetAutoplay(Some(Duration::from_millis(100))))
        .await
        .unwrap();
    assert!(matches!(next_event(&mut h.event_rx).await, BackendEvent::Autoplay(true)));

    for month in 1..=3 {
        match next_event(&mut h.event_rx).await {
            BackendEvent::Snapshot(snap) => assert_eq!(snap.months_elapsed, month),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    h.cmd_tx.send(BackendCommand::SetAutoplay(None)).await.unwrap();
    assert!(matches!(next_event(&mut h.event_rx).await, BackendEvent::Autoplay(false)));

    let stopped_at = backend.advances();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(backend.advances(), stopped_at);
    assert!(h.event_rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_autoplay_stops_on_failure() {
    let backend = ScriptedBackend::failing_after(2);
    let mut h = start(backend.clone());

    h.cmd_tx
        .send(BackendCommand::Create {
            seed: 1,
            width: 1,
            height: 1,
        })
        .await
        .unwrap();
    assert!(matches!(next_event(&mut h.event_rx).await, BackendEvent::Snapshot(_)));

    h.cmd_tx
        .send(BackendCommand::SetAutoplay(Some(Duration::from_millis(50))))
        .await
        .unwrap();
    assert!(matches!(next_event(&mut h.event_rx).await, BackendEvent::Autoplay(true)));
    assert!(matches!(next_event(&mut h.event_rx).await, BackendEvent::Snapshot(_)));
    assert!(matches!(next_event(&mut h.event_rx).await, BackendEvent::Snapshot(_)));

    match next_event(&mut h.event_rx).await {
        BackendEvent::Failed(BackendError::Advance(CallFailure::Rejected(msg))) => {
            assert_eq!(msg, "simulation halted");
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(matches!(next_event(&mut h.event_rx).await, BackendEvent::Autoplay(false)));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(backend.advances(), 2);
    assert!(h.event_rx.try_recv().is_err());
}

#[test]
fn test_worker_exits_when_commands_close() {
    let (cmd_tx, cmd_rx) = mpsc::channel::<BackendCommand>(1);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    drop(cmd_tx);

    tokio_test::block_on(run_worker(ScriptedBackend::default(), cmd_rx, event_tx));
    assert!(event_rx.try_recv().is_err());
}
