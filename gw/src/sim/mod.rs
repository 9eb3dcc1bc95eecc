//! Simulated package host
//!
//! Stands in for the vendor runtime: both packages are in-process objects that
//! record what the coordinators ask of them and raise notifications on demand.

mod game_events;
mod host;
mod overlay;
mod scenario;

pub use game_events::SimGameEvents;
pub use host::SimHost;
pub use overlay::SimOverlay;
pub use scenario::{Scenario, Step, play};
