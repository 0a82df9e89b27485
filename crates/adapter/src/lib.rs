//! Adapter module - the viewer's link to the external simulation backend
//!
//! The simulation itself lives in another process. This crate is the only
//! place that talks to it, through three calls: create a grid, fetch the grid,
//! advance one step.
//!
//! # Protocol Overview
//!
//! The backend speaks a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: opened lazily on the first call (default: 127.0.0.1:7878)
//! 2. **Request**: one JSON object per line with `type` and `seq`
//! 3. **Response**: one JSON object per line echoing `seq`
//!
//! # Message Types
//!
//! ## Viewer → Backend
//!
//! - **create**: new grid from `seed`, `width`, `height`
//! - **get**: current grid
//! - **advance**: one simulation step
//!
//! ## Backend → Viewer
//!
//! - **grid**: cells plus dimensions and counters
//! - **ack**: step applied
//! - **error**: `code` (`no_grid`, `invalid_dimensions`, `rejected`) and `message`
//!
//! # Environment Variables
//!
//! - `FOREST_BACKEND_HOST`: backend address (default: "127.0.0.1")
//! - `FOREST_BACKEND_PORT`: port number (default: 7878)
//! - `FOREST_BACKEND_TIMEOUT_MS`: per-call timeout (default: 2000)
//!
//! # Example Protocol Flow
//!
//! ```text
//! Viewer -> Backend: {"type":"create","seq":1,"seed":123123,"width":120,"height":80}
//! Backend -> Viewer: {"type":"grid","seq":1,"cells":[...],"width":120,"height":80,...}
//! Viewer -> Backend: {"type":"advance","seq":2}
//! Backend -> Viewer: {"type":"ack","seq":2}
//! Viewer -> Backend: {"type":"get","seq":3}
//! Backend -> Viewer: {"type":"grid","seq":3,...}
//! ```
//!
//! # Implementation
//!
//! - [`ForestBackend`] is the seam; [`RemoteBackend`] implements it over tokio TCP
//! - Failures are typed per operation ([`BackendError`]) and never replaced by an empty grid
//! - [`BackendLink`] runs the backend on its own runtime for a synchronous UI loop,
//!   including cancellable autoplay

pub mod client;
pub mod error;
pub mod protocol;
pub mod runtime;

pub use forest_view_types as types;

pub use client::{BackendConfig, ForestBackend, RemoteBackend};
pub use error::{BackendError, CallFailure};
pub use protocol::*;
pub use runtime::{run_worker, BackendCommand, BackendEvent, BackendLink};
