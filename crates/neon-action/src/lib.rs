//! Command routing and execution for Neon.
//!
//! A recognized command is classified by the [`Dispatcher`] against an
//! ordered table of tiers (first match wins, generative fallback last) and
//! then carried out by the handler registered for that tier.

pub mod clock;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod launcher;
pub mod orchestrator;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use dispatch::Dispatcher;
pub use error::ActionError;
pub use handler::{ActionHandler, ActionRegistry, HandlerContext};
pub use launcher::{Launcher, SystemLauncher};
pub use orchestrator::{CommandProcessor, Orchestrator};
pub use types::{ActionResult, CommandMatch, Tier};
