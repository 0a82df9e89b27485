//! Terminal forest viewer (default binary).
//!
//! `watch` (default) connects to the simulation backend, renders the grid with
//! half-block pixels and lets the user step, autoplay, zoom and click cells.
//! `dump` runs headless: print the text map, advance N months, print it again.

use std::io::Write;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyEventKind};
use tracing::{info, warn};

use forest_view::adapter::{
    BackendCommand, BackendConfig, BackendEvent, BackendLink, ForestBackend, RemoteBackend,
};
use forest_view::core::{info_line, text_map, Viewer};
use forest_view::input::{handle_key_event, handle_mouse_event, should_quit};
use forest_view::term::{
    FrameBuffer, GridView, LogTail, StatusView, TerminalRenderer, Viewport, PIXEL_ROWS_PER_CELL,
};
use forest_view::types::{
    ColorMode, ViewAction, DEFAULT_AUTOPLAY_MS, DEFAULT_CELL_SIZE, DEFAULT_GRID_HEIGHT,
    DEFAULT_GRID_WIDTH, DEFAULT_SEED,
};

/// Input poll timeout; also bounds how stale backend events can get on screen.
const POLL_MS: u64 = 30;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Terminal viewer for a simulated forest grid",
    long_about = None
)]
struct Cli {
    /// Backend address as HOST:PORT. Defaults to FOREST_BACKEND_HOST/PORT.
    #[arg(long)]
    endpoint: Option<String>,
    /// Seed for the created grid.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Grid width in cells.
    #[arg(long, default_value_t = DEFAULT_GRID_WIDTH)]
    width: usize,
    /// Grid height in cells.
    #[arg(long, default_value_t = DEFAULT_GRID_HEIGHT)]
    height: usize,
    /// Pixels per cell edge. The terminal view rounds it down to an even size.
    #[arg(long, default_value_t = DEFAULT_CELL_SIZE)]
    cell_size: u32,
    /// Fade trees by age (alpha = tree age).
    #[arg(long)]
    fade: bool,
    /// Autoplay period in milliseconds.
    #[arg(long, default_value_t = DEFAULT_AUTOPLAY_MS)]
    autoplay_ms: u64,
    /// Attach to the backend's existing grid instead of creating one.
    #[arg(long)]
    attach: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal viewer (default).
    Watch,
    /// Create a grid, advance it, and print the text map and census.
    Dump {
        /// Months to advance before printing the final map.
        #[arg(long, default_value_t = 0)]
        months: u32,
    },
}

#[derive(Clone)]
struct ChannelWriter {
    sender: Sender<String>,
}

impl std::io::Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let _ = self.sender.send(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = BackendConfig::from_env();
    if let Some(endpoint) = cli.endpoint.as_deref() {
        config = config.with_endpoint(endpoint).map_err(|e| anyhow!(e))?;
    }

    match cli.command {
        Some(Command::Dump { months }) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_writer(std::io::stderr)
                .init();
            dump(&cli, config, months)
        }
        Some(Command::Watch) | None => {
            let (log_tx, log_rx) = mpsc::channel::<String>();
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .compact()
                .without_time()
                .with_ansi(false)
                .with_writer(move || ChannelWriter {
                    sender: log_tx.clone(),
                })
                .init();
            watch(&cli, config, log_rx)
        }
    }
}

fn dump(cli: &Cli, config: BackendConfig, months: u32) -> Result<()> {
    let start = Instant::now();
    let rt = tokio::runtime::Runtime::new()?;
    let mut backend = RemoteBackend::new(config);
    let source = if cli.attach {
        GridSource::Attach
    } else {
        GridSource::Create {
            seed: cli.seed,
            width: cli.width,
            height: cli.height,
        }
    };

    let mut stdout = std::io::stdout().lock();
    rt.block_on(write_dump(&mut backend, source, months, &mut stdout))?;

    writeln!(stdout, "Time to run: {:?}", start.elapsed())?;
    Ok(())
}

/// Where `dump` gets its first grid from.
#[derive(Debug, Clone, Copy)]
enum GridSource {
    Create {
        seed: u64,
        width: usize,
        height: usize,
    },
    Attach,
}

/// Map, blank line, map after `months` steps, then the info line.
async fn write_dump<B: ForestBackend>(
    backend: &mut B,
    source: GridSource,
    months: u32,
    out: &mut impl Write,
) -> Result<()> {
    let first = match source {
        GridSource::Create {
            seed,
            width,
            height,
        } => backend.create_grid(seed, width, height).await?,
        GridSource::Attach => backend.get_grid().await?,
    };
    writeln!(out, "{}", text_map(&first))?;

    for _ in 0..months {
        backend.advance_grid().await?;
    }
    let last = backend.get_grid().await?;

    writeln!(out)?;
    writeln!(out, "{}", text_map(&last))?;
    writeln!(out, "{}", info_line(&last))?;
    Ok(())
}

fn watch(cli: &Cli, config: BackendConfig, log_rx: Receiver<String>) -> Result<()> {
    let endpoint = config.endpoint();
    let link = BackendLink::start(RemoteBackend::new(config))
        .context("failed to start backend runtime")?;

    let mode = if cli.fade {
        ColorMode::AgeFade
    } else {
        ColorMode::Opaque
    };
    let mut viewer = Viewer::new(cli.cell_size, mode);
    viewer.set_zoom_step(PIXEL_ROWS_PER_CELL)?;

    let mut shell = Shell {
        link,
        viewer,
        view: GridView::default(),
        logs: LogTail::new(),
        last_error: None,
        autoplay: false,
        autoplay_period: Duration::from_millis(cli.autoplay_ms.max(1)),
        seed: cli.seed,
        width: cli.width,
        height: cli.height,
        endpoint,
    };

    if cli.attach {
        shell.link.send(BackendCommand::Fetch);
    } else {
        shell.create();
    }

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = shell.run(&mut term, &log_rx);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

struct Shell {
    link: BackendLink,
    viewer: Viewer,
    view: GridView,
    logs: LogTail,
    last_error: Option<String>,
    autoplay: bool,
    autoplay_period: Duration,
    seed: u64,
    width: usize,
    height: usize,
    endpoint: String,
}

impl Shell {
    fn run(&mut self, term: &mut TerminalRenderer, log_rx: &Receiver<String>) -> Result<()> {
        let mut fb = FrameBuffer::new(0, 0);
        let mut dirty = true;

        loop {
            let viewport = current_viewport();

            while let Ok(text) = log_rx.try_recv() {
                self.logs.push(&text);
                dirty = true;
            }
            while let Some(ev) = self.link.try_recv() {
                self.on_backend_event(ev, viewport);
                dirty = true;
            }

            if dirty {
                let status = StatusView {
                    endpoint: &self.endpoint,
                    autoplay: self.autoplay,
                    last_error: self.last_error.as_deref(),
                    logs: self.logs.lines(),
                };
                self.view.render_into(&self.viewer, &status, viewport, &mut fb);
                term.draw_swap(&mut fb)?;
                dirty = false;
            }

            if !event::poll(Duration::from_millis(POLL_MS))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if should_quit(key) {
                        self.link.send(BackendCommand::SetAutoplay(None));
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        self.on_action(action, viewport);
                        dirty = true;
                    }
                }
                Event::Mouse(ev) => {
                    let hit = handle_mouse_event(ev).and_then(|click| {
                        self.view
                            .hit_test(&self.viewer, viewport, click.column, click.row)
                    });
                    if let Some((px, py)) = hit {
                        self.viewer.select_at(px, py);
                        dirty = true;
                    }
                }
                Event::Resize(w, h) => {
                    term.invalidate();
                    self.view.fit(&self.viewer, Viewport::new(w, h));
                    dirty = true;
                }
                _ => {}
            }
        }
    }

    fn on_backend_event(&mut self, ev: BackendEvent, viewport: Viewport) {
        match ev {
            BackendEvent::Snapshot(snap) => match self.viewer.apply_snapshot(snap) {
                Ok(()) => {
                    self.last_error = None;
                    self.view.fit(&self.viewer, viewport);
                }
                Err(e) => {
                    warn!(error = %e, "snapshot rejected");
                    self.last_error = Some(e.to_string());
                }
            },
            BackendEvent::Failed(e) => {
                self.last_error = Some(e.to_string());
            }
            BackendEvent::Autoplay(on) => self.autoplay = on,
        }
    }

    fn on_action(&mut self, action: ViewAction, viewport: Viewport) {
        let rendered = match action {
            ViewAction::Advance => {
                self.link.send(BackendCommand::Advance);
                Ok(())
            }
            ViewAction::Fetch => {
                self.link.send(BackendCommand::Fetch);
                Ok(())
            }
            ViewAction::ToggleAutoplay => {
                let period = (!self.autoplay).then_some(self.autoplay_period);
                self.link.send(BackendCommand::SetAutoplay(period));
                Ok(())
            }
            ViewAction::Recreate => {
                self.seed = self.seed.wrapping_add(1);
                self.create();
                Ok(())
            }
            ViewAction::ZoomIn => self.viewer.zoom_in(),
            ViewAction::ZoomOut => self.viewer.zoom_out(),
            ViewAction::ToggleFade => self.viewer.toggle_color_mode(),
            ViewAction::ClearSelection => {
                self.viewer.clear_selection();
                Ok(())
            }
            ViewAction::PanLeft
            | ViewAction::PanRight
            | ViewAction::PanUp
            | ViewAction::PanDown => {
                let (dx, dy) = pan_delta(action);
                self.view.pan(dx, dy, &self.viewer, viewport);
                Ok(())
            }
        };

        match rendered {
            Ok(()) => self.view.fit(&self.viewer, viewport),
            Err(e) => self.last_error = Some(e.to_string()),
        }
    }

    fn create(&mut self) {
        info!(
            seed = self.seed,
            width = self.width,
            height = self.height,
            "creating grid"
        );
        self.link.send(BackendCommand::Create {
            seed: self.seed,
            width: self.width,
            height: self.height,
        });
    }
}

fn pan_delta(action: ViewAction) -> (isize, isize) {
    match action {
        ViewAction::PanLeft => (-1, 0),
        ViewAction::PanRight => (1, 0),
        ViewAction::PanUp => (0, -1),
        ViewAction::PanDown => (0, 1),
        _ => (0, 0),
    }
}

fn current_viewport() -> Viewport {
    let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
    Viewport::new(w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forest_view::adapter::{BackendError, CallFailure};
    use forest_view::types::GridSnapshot;

    #[derive(Default)]
    struct LocalForest {
        grid: Option<GridSnapshot>,
    }

    impl ForestBackend for LocalForest {
        async fn create_grid(
            &mut self,
            _seed: u64,
            width: usize,
            height: usize,
        ) -> Result<GridSnapshot, BackendError> {
            let snap = GridSnapshot::new(vec![0x0001; width * height], width, height);
            self.grid = Some(snap.clone());
            Ok(snap)
        }

        async fn get_grid(&mut self) -> Result<GridSnapshot, BackendError> {
            self.grid.clone().ok_or(BackendError::Fetch(CallFailure::NoGrid))
        }

        async fn advance_grid(&mut self) -> Result<(), BackendError> {
            let grid = self
                .grid
                .as_mut()
                .ok_or(BackendError::Advance(CallFailure::NoGrid))?;
            grid.months_elapsed += 1;
            for cell in &mut grid.cells {
                *cell = 0x1000;
            }
            Ok(())
        }
    }

    fn dump_text(backend: &mut LocalForest, source: GridSource, months: u32) -> Result<String> {
        let mut out = Vec::new();
        tokio_test::block_on(write_dump(backend, source, months, &mut out))?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn dump_prints_both_maps_even_without_steps() {
        let source = GridSource::Create {
            seed: 1,
            width: 2,
            height: 1,
        };
        let text = dump_text(&mut LocalForest::default(), source, 0).unwrap();
        assert_eq!(text, "tt\n\ntt\nyear 0, month 0 | bears 0, jacks 0, trees 2\n");
    }

    #[test]
    fn dump_advances_before_the_second_map() {
        let source = GridSource::Create {
            seed: 1,
            width: 2,
            height: 1,
        };
        let text = dump_text(&mut LocalForest::default(), source, 13).unwrap();
        assert_eq!(text, "tt\n\nBB\nyear 1, month 1 | bears 2, jacks 0, trees 0\n");
    }

    #[test]
    fn dump_attach_without_grid_fails() {
        let err = dump_text(&mut LocalForest::default(), GridSource::Attach, 0).unwrap_err();
        assert!(err.to_string().starts_with("grid fetch failed"));
    }
}
