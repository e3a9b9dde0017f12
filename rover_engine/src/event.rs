//! Typed mission notifications.
//!
//! The engine never prints. Everything the operator should learn about is
//! pushed as a [`MissionEvent`] into an [`EventSink`]; the terminal view is
//! one sink, a plain `Vec` is another.

use serde::Serialize;

use rover_data::{CellMarker, Direction};

use crate::world::{DeliveryFailure, Position};

/// Why a mission ended in failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    /// A move targeted a cell outside the grid.
    OutOfBounds,
    /// The rover entered a hazard.
    ConnectionLost,
    /// Battery reached zero.
    PowerDepleted,
    /// All execution rounds were used without delivering the sample.
    ExecutionsExhausted,
}

/// Why a session ended without a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionEndReason {
    /// An `end` instruction ran.
    Voluntary,
    /// The operator declined to advance after completing a level.
    Declined,
    /// The last level was completed.
    CampaignComplete,
    /// The script source closed.
    InputClosed,
}

/// What moved the battery gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatteryCause {
    Transmission,
    SolarFlare,
    MagneticInterference,
    ChargingStation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MissionEvent {
    LevelStarted {
        level: u32,
        name: String,
    },
    ScriptRejected {
        size: u64,
        available: u64,
    },
    ScriptAccepted {
        size: u64,
        remaining: u64,
    },
    MoveSucceeded {
        direction: Direction,
        position: Position,
        entered: CellMarker,
    },
    OutOfBounds {
        direction: Direction,
        row: isize,
        col: isize,
    },
    BatteryChanged {
        delta: i64,
        battery: u32,
        cause: BatteryCause,
    },
    TerrainClassified(CellMarker),
    SampleCollected,
    CollectFailed,
    SampleDelivered(u32),
    DeliveryFailed(DeliveryFailure),
    InstructionRejected {
        line: usize,
        reason: String,
    },
    LevelCompleted {
        level: u32,
        bonus: f64,
    },
    LevelAdvanced(u32),
    TerminalFailure(FailureReason),
    SessionEnded(SessionEndReason),
}

/// Receives events as they happen.
pub trait EventSink {
    fn emit(&mut self, event: MissionEvent);
}

impl EventSink for Vec<MissionEvent> {
    fn emit(&mut self, event: MissionEvent) {
        self.push(event);
    }
}
