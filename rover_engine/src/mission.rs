//! Mission sequencer: drives levels and script rounds.
//!
//! A session walks the phases
//! `LevelStart -> AwaitingScript -> Executing -> {AwaitingScript, LevelComplete, TerminalFailure, SessionEnd}`
//! and a completed level loops back to `LevelStart` when the operator agrees
//! to advance.

use anyhow::{Context, Result, anyhow};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use rover_data::{LevelCatalog, MissionSettings};
use rover_script::Script;

use crate::admission::{Admission, admit};
use crate::event::{EventSink, FailureReason, MissionEvent, SessionEndReason};
use crate::interpreter::{ExecContext, Flow, execute_script};
use crate::terrain::{Dice, RngDice};
use crate::world::MissionState;

/// The human (or scripted stand-in) on the other end of the link.
pub trait Operator {
    /// Supply the next script, or `None` when no more input will come.
    ///
    /// # Errors
    /// Implementations may fail on IO errors.
    fn request_script(&mut self, state: &MissionState) -> Result<Option<Script>>;

    /// Ask whether to continue after `level` was completed.
    ///
    /// # Errors
    /// Implementations may fail on IO errors.
    fn confirm_advance(&mut self, level: u32) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    LevelStart(u32),
    AwaitingScript,
    Executing(Script),
    LevelComplete,
    TerminalFailure(FailureReason),
    SessionEnd(SessionEndReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Failed(FailureReason),
    Ended(SessionEndReason),
}

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    pub outcome: Outcome,
    /// Highest level reached.
    pub level: u32,
    pub battery: u32,
    pub levels_completed: u32,
}

/// Build the exploration dice for `settings`: seeded when a seed is configured.
pub fn dice_for(settings: &MissionSettings) -> Box<dyn Dice> {
    match settings.seed {
        Some(seed) => Box::new(RngDice::new(StdRng::seed_from_u64(seed))),
        None => Box::new(RngDice::new(StdRng::from_os_rng())),
    }
}

pub struct Mission {
    catalog: LevelCatalog,
    dice: Box<dyn Dice>,
    first_level: u32,
    state: Option<MissionState>,
    last_script_size: u64,
    levels_completed: u32,
}

impl Mission {
    pub fn new(catalog: LevelCatalog, dice: Box<dyn Dice>) -> Self {
        Self {
            catalog,
            dice,
            first_level: 1,
            state: None,
            last_script_size: 0,
            levels_completed: 0,
        }
    }

    /// Start the session at `level` (1-based) instead of the first level.
    #[must_use]
    pub fn starting_at(mut self, level: u32) -> Self {
        self.first_level = level.max(1);
        self
    }

    pub fn settings(&self) -> &MissionSettings {
        &self.catalog.settings
    }

    /// State of the level in progress, if any.
    pub fn state(&self) -> Option<&MissionState> {
        self.state.as_ref()
    }

    /// Run the whole session until it ends.
    ///
    /// # Errors
    /// Returns an error if the operator fails or the first level cannot be built.
    pub fn run<C: Operator + EventSink>(&mut self, console: &mut C) -> Result<SessionOutcome> {
        let mut phase = Phase::LevelStart(self.first_level);
        loop {
            phase = match phase {
                Phase::LevelStart(level) => self.start_level(level, console)?,
                Phase::AwaitingScript => self.await_script(console)?,
                Phase::Executing(script) => self.execute(&script, console)?,
                Phase::LevelComplete => self.complete_level(console)?,
                Phase::TerminalFailure(reason) => {
                    warn!("mission failed: {reason:?}");
                    console.emit(MissionEvent::TerminalFailure(reason));
                    return Ok(self.finish(Outcome::Failed(reason)));
                },
                Phase::SessionEnd(reason) => {
                    info!("session ended: {reason:?}");
                    console.emit(MissionEvent::SessionEnded(reason));
                    return Ok(self.finish(Outcome::Ended(reason)));
                },
            };
        }
    }

    fn start_level(&mut self, level: u32, sink: &mut dyn EventSink) -> Result<Phase> {
        let Some(def) = self.catalog.level(level) else {
            if self.levels_completed > 0 {
                return Ok(Phase::SessionEnd(SessionEndReason::CampaignComplete));
            }
            return Err(anyhow!("level {level} is not defined"));
        };
        let state = MissionState::from_level(level, def).with_context(|| format!("starting level {level}"))?;
        info!(
            "level {level} '{}' started: battery {}, memory {}, executions {}",
            def.name, def.battery, def.memory, def.executions
        );
        sink.emit(MissionEvent::LevelStarted {
            level,
            name: def.name.clone(),
        });
        self.state = Some(state);
        self.last_script_size = 0;
        Ok(Phase::AwaitingScript)
    }

    fn await_script<C: Operator + EventSink>(&mut self, console: &mut C) -> Result<Phase> {
        let bytes_per_char = self.catalog.settings.bytes_per_char;
        let state = self.state.as_mut().context("no level in progress")?;
        if state.resources.executions_remaining == 0 {
            return Ok(Phase::TerminalFailure(FailureReason::ExecutionsExhausted));
        }
        let Some(script) = console.request_script(state)? else {
            return Ok(Phase::SessionEnd(SessionEndReason::InputClosed));
        };
        // status above still shows the previous round; admission starts from the full budget
        state.resources.remaining_memory = state.resources.memory_budget;
        let size = script.size_in_bytes(bytes_per_char);
        match admit(&mut state.resources, size) {
            Admission::Rejected { size, available } => {
                console.emit(MissionEvent::ScriptRejected { size, available });
                Ok(Phase::AwaitingScript)
            },
            Admission::Accepted { size, remaining } => {
                console.emit(MissionEvent::ScriptAccepted { size, remaining });
                self.last_script_size = size;
                Ok(Phase::Executing(script))
            },
        }
    }

    fn execute(&mut self, script: &Script, sink: &mut dyn EventSink) -> Result<Phase> {
        let state = self.state.as_mut().context("no level in progress")?;
        let compiled = script.compile();
        let mut ctx = ExecContext {
            dice: self.dice.as_mut(),
            sink,
            energy_per_move: self.catalog.settings.energy_per_move,
        };
        Ok(match execute_script(state, &compiled, &mut ctx) {
            Flow::Continue => Phase::AwaitingScript,
            Flow::LevelComplete => Phase::LevelComplete,
            Flow::Terminal(reason) => Phase::TerminalFailure(reason),
            Flow::EndSession => Phase::SessionEnd(SessionEndReason::Voluntary),
        })
    }

    fn complete_level<C: Operator + EventSink>(&mut self, console: &mut C) -> Result<Phase> {
        let state = self.state.as_ref().context("no level in progress")?;
        let level = state.resources.level;
        let bonus = bonus_credits(
            state.resources.memory_budget,
            self.last_script_size,
            self.catalog.settings.cost_per_byte,
        );
        self.levels_completed += 1;
        info!("level {level} complete, bonus {bonus:.2}");
        console.emit(MissionEvent::LevelCompleted { level, bonus });

        if !console.confirm_advance(level)? {
            return Ok(Phase::SessionEnd(SessionEndReason::Declined));
        }
        let next = level + 1;
        if self.catalog.level(next).is_none() {
            return Ok(Phase::SessionEnd(SessionEndReason::CampaignComplete));
        }
        console.emit(MissionEvent::LevelAdvanced(next));
        Ok(Phase::LevelStart(next))
    }

    fn finish(&self, outcome: Outcome) -> SessionOutcome {
        let (level, battery) = self
            .state
            .as_ref()
            .map_or((self.first_level, 0), |s| (s.resources.level, s.resources.battery));
        SessionOutcome {
            outcome,
            level,
            battery,
            levels_completed: self.levels_completed,
        }
    }
}

/// Credits for memory left unused by the winning script.
#[allow(clippy::cast_precision_loss)]
pub fn bonus_credits(memory_budget: u64, script_size: u64, cost_per_byte: f64) -> f64 {
    memory_budget.saturating_sub(script_size) as f64 * cost_per_byte
}
