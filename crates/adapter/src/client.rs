//! TCP client for the simulation backend
//!
//! Connects lazily, sends one request line, waits for the matching response
//! line. A broken connection is dropped and re-established on the next call.

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::error::{BackendError, CallFailure};
use crate::protocol::{error_codes, Request, Response};
use crate::types::GridSnapshot;

/// The three calls the viewer makes on a simulation backend.
pub trait ForestBackend: Send {
    /// Replace the backend grid with a new one and return it.
    ///
    /// Zero dimensions fail with [`BackendError::Creation`] before any I/O.
    fn create_grid(
        &mut self,
        seed: u64,
        width: usize,
        height: usize,
    ) -> impl Future<Output = Result<GridSnapshot, BackendError>> + Send;

    fn get_grid(&mut self) -> impl Future<Output = Result<GridSnapshot, BackendError>> + Send;

    /// Advance the simulation by exactly one step.
    fn advance_grid(&mut self) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Backend client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            timeout: Duration::from_millis(2000),
        }
    }
}

impl BackendConfig {
    /// Create from environment variables, falling back to defaults.
    ///
    /// - `FOREST_BACKEND_HOST`
    /// - `FOREST_BACKEND_PORT`
    /// - `FOREST_BACKEND_TIMEOUT_MS`
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("FOREST_BACKEND_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("FOREST_BACKEND_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let timeout = env::var("FOREST_BACKEND_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout);

        Self {
            host,
            port,
            timeout,
        }
    }

    /// Override host and port from a `HOST:PORT` string.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self, String> {
        let (host, port) = endpoint
            .rsplit_once(':')
            .ok_or_else(|| format!("endpoint must be HOST:PORT, got {endpoint:?}"))?;
        self.port = port
            .parse()
            .map_err(|_| format!("invalid port in endpoint {endpoint:?}"))?;
        self.host = host.to_string();
        Ok(self)
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

struct Connection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

/// [`ForestBackend`] over line-delimited JSON on TCP.
pub struct RemoteBackend {
    config: BackendConfig,
    conn: Option<Connection>,
    next_seq: u64,
}

impl RemoteBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            conn: None,
            next_seq: 1,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn call(&mut self, build: impl FnOnce(u64) -> Request) -> Result<Response, CallFailure> {
        let req = build(self.next_seq);
        self.next_seq += 1;

        let limit = self.config.timeout;
        let result = match tokio::time::timeout(limit, self.exchange(&req)).await {
            Ok(r) => r,
            Err(_) => Err(CallFailure::Timeout(limit)),
        };

        match result {
            Ok(resp) if resp.seq() == req.seq() => Ok(resp),
            Ok(resp) => {
                self.conn = None;
                Err(CallFailure::Protocol(format!(
                    "{} seq {} answered with seq {}",
                    req.kind(),
                    req.seq(),
                    resp.seq()
                )))
            }
            Err(e) => {
                warn!(request = req.kind(), seq = req.seq(), error = %e, "backend call failed");
                self.conn = None;
                Err(e)
            }
        }
    }

    async fn exchange(&mut self, req: &Request) -> Result<Response, CallFailure> {
        if self.conn.is_none() {
            let endpoint = self.config.endpoint();
            let stream = TcpStream::connect(&endpoint).await?;
            stream.set_nodelay(true)?;
            info!(%endpoint, "connected to backend");
            let (read_half, writer) = stream.into_split();
            self.conn = Some(Connection {
                lines: BufReader::new(read_half).lines(),
                writer,
            });
        }
        let Some(conn) = self.conn.as_mut() else {
            return Err(CallFailure::Closed);
        };

        let mut line =
            serde_json::to_string(req).map_err(|e| CallFailure::Protocol(e.to_string()))?;
        line.push('\n');
        conn.writer.write_all(line.as_bytes()).await?;
        conn.writer.flush().await?;
        debug!(request = req.kind(), seq = req.seq(), "request sent");

        let reply = conn.lines.next_line().await?.ok_or(CallFailure::Closed)?;
        serde_json::from_str::<Response>(&reply)
            .map_err(|e| CallFailure::Protocol(format!("unparseable response: {e}")))
    }
}

/// Map a backend error message to a failure, with the create dimensions for context.
fn rejected(code: &str, message: String, dims: Option<(usize, usize)>) -> CallFailure {
    match (code, dims) {
        (error_codes::NO_GRID, _) => CallFailure::NoGrid,
        (error_codes::INVALID_DIMENSIONS, Some((width, height))) => {
            CallFailure::InvalidDimensions { width, height }
        }
        (error_codes::REJECTED, _) | (error_codes::INVALID_DIMENSIONS, None) => {
            CallFailure::Rejected(message)
        }
        (other, _) => CallFailure::Rejected(format!("{other}: {message}")),
    }
}

fn expect_grid(resp: Response, dims: Option<(usize, usize)>) -> Result<GridSnapshot, CallFailure> {
    match resp {
        Response::Grid(g) => g.into_snapshot().map_err(CallFailure::Malformed),
        Response::Error(e) => Err(rejected(&e.code, e.message, dims)),
        Response::Ack { .. } => Err(CallFailure::Protocol("expected grid, got ack".to_string())),
    }
}

impl ForestBackend for RemoteBackend {
    async fn create_grid(
        &mut self,
        seed: u64,
        width: usize,
        height: usize,
    ) -> Result<GridSnapshot, BackendError> {
        if width == 0 || height == 0 {
            return Err(BackendError::Creation(CallFailure::InvalidDimensions {
                width,
                height,
            }));
        }
        let resp = self
            .call(|seq| Request::Create {
                seq,
                seed,
                width,
                height,
            })
            .await
            .map_err(BackendError::Creation)?;
        let snap = expect_grid(resp, Some((width, height))).map_err(BackendError::Creation)?;
        info!(seed, width, height, "grid created");
        Ok(snap)
    }

    async fn get_grid(&mut self) -> Result<GridSnapshot, BackendError> {
        let resp = self
            .call(|seq| Request::Get { seq })
            .await
            .map_err(BackendError::Fetch)?;
        expect_grid(resp, None).map_err(BackendError::Fetch)
    }

    async fn advance_grid(&mut self) -> Result<(), BackendError> {
        let resp = self
            .call(|seq| Request::Advance { seq })
            .await
            .map_err(BackendError::Advance)?;
        match resp {
            Response::Ack { .. } => Ok(()),
            Response::Error(e) => Err(BackendError::Advance(rejected(&e.code, e.message, None))),
            Response::Grid(_) => Err(BackendError::Advance(CallFailure::Protocol(
                "expected ack, got grid".to_string(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_override() {
        let c = BackendConfig::default().with_endpoint("10.0.0.2:9000").unwrap();
        assert_eq!(c.host, "10.0.0.2");
        assert_eq!(c.port, 9000);
        assert_eq!(c.endpoint(), "10.0.0.2:9000");

        assert!(BackendConfig::default().with_endpoint("nohost").is_err());
        assert!(BackendConfig::default().with_endpoint("host:notaport").is_err());
    }

    #[test]
    fn error_codes_map_to_failures() {
        assert!(matches!(rejected("no_grid", String::new(), None), CallFailure::NoGrid));
        assert!(matches!(
            rejected("invalid_dimensions", String::new(), Some((0, 4))),
            CallFailure::InvalidDimensions { width: 0, height: 4 }
        ));
        assert!(matches!(
            rejected("rejected", "bad seed".to_string(), Some((2, 2))),
            CallFailure::Rejected(m) if m == "bad seed"
        ));
        assert!(matches!(
            rejected("overloaded", "try later".to_string(), None),
            CallFailure::Rejected(m) if m == "overloaded: try later"
        ));
    }

    #[tokio::test]
    async fn zero_dimensions_fail_before_connecting() {
        // Nothing listens on port 1; an I/O attempt would yield a transport error.
        let mut backend = RemoteBackend::new(BackendConfig {
            port: 1,
            ..BackendConfig::default()
        });
        let err = backend.create_grid(1, 0, 10).await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::Creation(CallFailure::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(!backend.is_connected());
    }
}
