//! Forest viewer (workspace facade crate).
//!
//! Exposes `forest_view::{adapter,core,input,term,types}` while the
//! implementation lives in dedicated crates under `crates/`.

pub use forest_view_adapter as adapter;
pub use forest_view_core as core;
pub use forest_view_input as input;
pub use forest_view_term as term;
pub use forest_view_types as types;
