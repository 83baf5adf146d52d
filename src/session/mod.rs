//! Session state, registry, planning, persistence schema, and turns.

mod planner;
mod registry;
mod snapshot;
mod state;
mod turn;

pub use planner::derive_plan;
pub use registry::{SessionCell, SessionRegistry};
pub use snapshot::SessionSnapshot;
pub use state::{SessionState, ToolCallRecord};
pub use turn::TurnRunner;
