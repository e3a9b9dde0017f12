//! Instruction interpreter.
//!
//! Runs compiled script lines against a [`MissionState`], one instruction to
//! completion before the next, reporting everything through an [`EventSink`].
//! Execution stops at the first flow other than [`Flow::Continue`], and after
//! the first line of a script admitted with no executions left.

use log::{debug, warn};

use rover_data::{CellMarker, Direction};
use rover_script::{Branch, CompiledLine, ForLoop, Instruction, Primitive};

use crate::event::{BatteryCause, EventSink, FailureReason, MissionEvent};
use crate::resolve::evaluate;
use crate::terrain::{CellOutcome, Dice, resolve_cell};
use crate::world::{MissionState, MoveError};

/// What the caller should do after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The sample was delivered at base.
    LevelComplete,
    Terminal(FailureReason),
    /// An `end` instruction ran.
    EndSession,
}

/// Collaborators needed while executing.
pub struct ExecContext<'a> {
    pub dice: &'a mut dyn Dice,
    pub sink: &'a mut dyn EventSink,
    pub energy_per_move: u32,
}

/// Execute compiled lines in order.
///
/// Once `executions_remaining` is 0 the script runs on borrowed time: any line
/// that leaves the mission running ends it with
/// [`FailureReason::ExecutionsExhausted`].
pub fn execute_script(state: &mut MissionState, lines: &[CompiledLine], ctx: &mut ExecContext<'_>) -> Flow {
    for line in lines {
        let flow = match &line.parsed {
            Ok(Some(instruction)) => execute_instruction(state, instruction, line.number, ctx),
            Ok(None) => {
                if !line.source.trim().is_empty() {
                    debug!("line {} ignored: {:?}", line.number, line.source);
                }
                Flow::Continue
            },
            Err(err) => {
                ctx.sink.emit(MissionEvent::InstructionRejected {
                    line: line.number,
                    reason: err.to_string(),
                });
                Flow::Continue
            },
        };
        if flow != Flow::Continue {
            return flow;
        }
        if state.resources.executions_remaining == 0 {
            warn!("execution limit reached after line {}", line.number);
            return Flow::Terminal(FailureReason::ExecutionsExhausted);
        }
    }
    Flow::Continue
}

/// Execute one parsed instruction. `line` is used for rejection reports.
pub fn execute_instruction(
    state: &mut MissionState,
    instruction: &Instruction,
    line: usize,
    ctx: &mut ExecContext<'_>,
) -> Flow {
    match instruction {
        Instruction::Primitive(p) => execute_primitive(state, *p, ctx),
        Instruction::ForLoop(lp) => execute_loop(state, lp, ctx),
        Instruction::If {
            condition,
            then_branch,
            else_branch,
        } => match evaluate(condition, state) {
            Ok(true) => execute_branch(state, then_branch, ctx),
            Ok(false) => else_branch
                .as_ref()
                .map_or(Flow::Continue, |branch| execute_branch(state, branch, ctx)),
            Err(err) => {
                ctx.sink.emit(MissionEvent::InstructionRejected {
                    line,
                    reason: err.to_string(),
                });
                Flow::Continue
            },
        },
    }
}

fn execute_branch(state: &mut MissionState, branch: &Branch, ctx: &mut ExecContext<'_>) -> Flow {
    match branch {
        Branch::Primitive(p) => execute_primitive(state, *p, ctx),
        Branch::Loop(lp) => execute_loop(state, lp, ctx),
    }
}

fn execute_loop(state: &mut MissionState, lp: &ForLoop, ctx: &mut ExecContext<'_>) -> Flow {
    for _ in 0..lp.count {
        for p in &lp.body {
            let flow = execute_primitive(state, *p, ctx);
            if flow != Flow::Continue {
                return flow;
            }
        }
    }
    Flow::Continue
}

/// Run a single primitive, charging transmission energy first.
///
/// A battery left at 0 is fatal unless the primitive already ended the level
/// or the mission.
pub fn execute_primitive(state: &mut MissionState, primitive: Primitive, ctx: &mut ExecContext<'_>) -> Flow {
    debug!("executing {primitive} at {}", state.rover.position);
    spend_energy(state, ctx);

    let flow = match primitive {
        Primitive::Move(dir) => drive(state, dir, ctx),
        Primitive::Observe => {
            ctx.sink.emit(MissionEvent::TerrainClassified(state.rover.current_block));
            Flow::Continue
        },
        Primitive::Collect => {
            if state.collect_sample() {
                ctx.sink.emit(MissionEvent::SampleCollected);
            } else {
                ctx.sink.emit(MissionEvent::CollectFailed);
            }
            Flow::Continue
        },
        Primitive::Deliver => match state.deliver_sample() {
            Ok(()) => {
                ctx.sink.emit(MissionEvent::SampleDelivered(state.resources.level));
                Flow::LevelComplete
            },
            Err(failure) => {
                ctx.sink.emit(MissionEvent::DeliveryFailed(failure));
                Flow::Continue
            },
        },
        Primitive::End => Flow::EndSession,
    };

    match flow {
        Flow::Terminal(_) | Flow::LevelComplete => flow,
        _ if state.resources.battery == 0 => {
            warn!("battery depleted after {primitive}");
            Flow::Terminal(FailureReason::PowerDepleted)
        },
        _ => flow,
    }
}

fn spend_energy(state: &mut MissionState, ctx: &mut ExecContext<'_>) {
    let before = state.resources.battery;
    state.resources.battery = before.saturating_sub(ctx.energy_per_move);
    let spent = before - state.resources.battery;
    if spent > 0 {
        ctx.sink.emit(MissionEvent::BatteryChanged {
            delta: -i64::from(spent),
            battery: state.resources.battery,
            cause: BatteryCause::Transmission,
        });
    }
}

fn drive(state: &mut MissionState, dir: Direction, ctx: &mut ExecContext<'_>) -> Flow {
    let entered = match state.move_rover(dir) {
        Ok(entered) => entered,
        Err(MoveError::OutOfBounds { row, col }) => {
            warn!("rover drove {dir} off the grid toward ({row}, {col})");
            ctx.sink.emit(MissionEvent::OutOfBounds {
                direction: dir,
                row,
                col,
            });
            return Flow::Terminal(FailureReason::OutOfBounds);
        },
    };
    ctx.sink.emit(MissionEvent::MoveSucceeded {
        direction: dir,
        position: state.rover.position,
        entered,
    });

    let effect = resolve_cell(entered, state.resources, ctx.dice);
    state.resources = effect.resources;
    if entered == CellMarker::Unknown {
        state.settle_unknown();
    }
    if let Some(change) = effect.battery {
        ctx.sink.emit(MissionEvent::BatteryChanged {
            delta: change.delta,
            battery: change.battery,
            cause: change.cause,
        });
    }
    match effect.outcome {
        CellOutcome::Continue => Flow::Continue,
        CellOutcome::Terminal(reason) => {
            warn!("terminal cell outcome at {}: {reason:?}", state.rover.position);
            Flow::Terminal(reason)
        },
    }
}
