//! Telemetry session coordinator for the game-events package
//!
//! The Coordinator is a single task that owns the session state:
//! - **Registration:** which targets are monitored, which features are negotiated
//! - **Routing:** one listener per package instance, notifications fanned out
//!   onto typed event channels
//! - **Query:** the active target's info, on demand

mod config;
mod core;
mod error;
mod handle;
mod messages;
mod negotiator;
mod router;
mod state;

pub use config::CoordinatorConfig;
pub use core::Coordinator;
pub use error::CoordinatorError;
pub use handle::CoordinatorHandle;
pub use messages::{ActiveInfo, CoordRequest, NO_ACTIVE_TARGET, SessionSnapshot};
pub use negotiator::{NegotiationReport, negotiate_all, negotiate_one};
pub use router::{Binding, next_notification, route};
pub use state::SessionState;
