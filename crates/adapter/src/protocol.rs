//! Protocol module - JSON message types for the simulation backend
//!
//! Line-delimited JSON, one request answered by one response.
//! Every message carries `type` and `seq`; responses echo the request's `seq`.

use serde::{Deserialize, Serialize};

use crate::types::{CellCode, GridSnapshot};

// ============== Viewer -> Backend Messages ==============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Replace the backend grid with a freshly seeded one.
    Create {
        seq: u64,
        seed: u64,
        width: usize,
        height: usize,
    },
    /// Fetch the current grid.
    Get { seq: u64 },
    /// Advance the simulation one step.
    Advance { seq: u64 },
}

impl Request {
    pub fn seq(&self) -> u64 {
        match self {
            Request::Create { seq, .. } | Request::Get { seq } | Request::Advance { seq } => *seq,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Request::Create { .. } => "create",
            Request::Get { .. } => "get",
            Request::Advance { .. } => "advance",
        }
    }
}

// ============== Backend -> Viewer Messages ==============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Grid(GridMessage),
    Ack { seq: u64 },
    Error(ErrorMessage),
}

impl Response {
    pub fn seq(&self) -> u64 {
        match self {
            Response::Grid(g) => g.seq,
            Response::Ack { seq } => *seq,
            Response::Error(e) => e.seq,
        }
    }
}

/// Full grid snapshot as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMessage {
    pub seq: u64,
    pub cells: Vec<CellCode>,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub months_elapsed: u32,
    #[serde(default)]
    pub yearly_lumber: u32,
    #[serde(default)]
    pub yearly_mauls: u32,
}

impl GridMessage {
    /// Validate dimensions against the cell count and build a snapshot.
    pub fn into_snapshot(self) -> Result<GridSnapshot, String> {
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            ));
        }
        let snap = GridSnapshot {
            cells: self.cells,
            width: self.width,
            height: self.height,
            months_elapsed: self.months_elapsed,
            yearly_lumber: self.yearly_lumber,
            yearly_mauls: self.yearly_mauls,
        };
        if !snap.is_consistent() {
            return Err(format!(
                "grid {}x{} carries {} cells",
                snap.width,
                snap.height,
                snap.cells.len()
            ));
        }
        Ok(snap)
    }
}

/// Error codes sent by the backend.
pub mod error_codes {
    pub const NO_GRID: &str = "no_grid";
    pub const INVALID_DIMENSIONS: &str = "invalid_dimensions";
    pub const REJECTED: &str = "rejected";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub seq: u64,
    pub code: String,
    pub message: String,
}

// ============== Helper Functions ==============

pub fn create_grid_response(seq: u64, snapshot: &GridSnapshot) -> Response {
    Response::Grid(GridMessage {
        seq,
        cells: snapshot.cells.clone(),
        width: snapshot.width,
        height: snapshot.height,
        months_elapsed: snapshot.months_elapsed,
        yearly_lumber: snapshot.yearly_lumber,
        yearly_mauls: snapshot.yearly_mauls,
    })
}

pub fn create_ack(seq: u64) -> Response {
    Response::Ack { seq }
}

pub fn create_error(seq: u64, code: &str, message: &str) -> Response {
    Response::Error(ErrorMessage {
        seq,
        code: code.to_string(),
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_format() {
        let req = Request::Create {
            seq: 1,
            seed: 123123,
            width: 120,
            height: 80,
        };
        let v: serde_json::Value = serde_json::to_value(&req).unwrap();
        assert_eq!(v["type"], "create");
        assert_eq!(v["seq"], 1);
        assert_eq!(v["seed"], 123123);
        assert_eq!(v["width"], 120);

        let line = serde_json::to_string(&Request::Advance { seq: 7 }).unwrap();
        assert_eq!(line, r#"{"type":"advance","seq":7}"#);
    }

    #[test]
    fn grid_response_parses_and_defaults_counters() {
        let line = r#"{"type":"grid","seq":3,"cells":[255,0,3840,61440],"width":2,"height":2}"#;
        let resp: Response = serde_json::from_str(line).unwrap();
        assert_eq!(resp.seq(), 3);
        let Response::Grid(g) = resp else {
            panic!("expected grid");
        };
        let snap = g.into_snapshot().unwrap();
        assert_eq!(snap.cells, vec![0x00FF, 0x0000, 0x0F00, 0xF000]);
        assert_eq!(snap.months_elapsed, 0);
    }

    #[test]
    fn inconsistent_grid_is_rejected() {
        let g = GridMessage {
            seq: 1,
            cells: vec![0; 3],
            width: 2,
            height: 2,
            months_elapsed: 0,
            yearly_lumber: 0,
            yearly_mauls: 0,
        };
        assert!(g.clone().into_snapshot().is_err());
        assert!(GridMessage { width: 0, cells: vec![], ..g }.into_snapshot().is_err());
    }

    #[test]
    fn error_response_parses() {
        let line = r#"{"type":"error","seq":9,"code":"no_grid","message":"create a grid first"}"#;
        let resp: Response = serde_json::from_str(line).unwrap();
        assert_eq!(resp, create_error(9, error_codes::NO_GRID, "create a grid first"));
    }

    #[test]
    fn cells_outside_u16_are_a_parse_error() {
        let line = r#"{"type":"grid","seq":1,"cells":[65536],"width":1,"height":1}"#;
        assert!(serde_json::from_str::<Response>(line).is_err());
    }
}
