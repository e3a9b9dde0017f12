#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const ROVER_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod admission;
pub mod data_paths;
pub mod event;
pub mod interpreter;
pub mod loader;
pub mod mission;
pub mod mission_log;
pub mod repl;
pub mod resolve;
pub mod spinners;
pub mod style;
pub mod terrain;
pub mod view;
pub mod world;

// Re-exports for convenience
pub use event::{EventSink, FailureReason, MissionEvent, SessionEndReason};
pub use loader::load_catalog;
pub use mission::{Mission, Operator, SessionOutcome};
pub use repl::run_repl;
pub use terrain::{Dice, RngDice};
pub use view::{View, ViewItem};
pub use world::{MissionState, Position, ResourceState};
