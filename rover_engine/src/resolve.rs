//! Resolution of condition operands to values, and comparison.

use std::cmp::Ordering;
use std::fmt;

use rover_script::{Comparator, Condition, Operand, Variable};

use crate::world::MissionState;

/// A resolved operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
    /// Lookahead toward a cell outside the grid.
    OutOfBounds,
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Text(_) => "text",
            Value::OutOfBounds => "out-of-bounds",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::OutOfBounds => f.write_str("<out of bounds>"),
        }
    }
}

/// Ordering comparison between values of different kinds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompareError {
    #[error("cannot compare {left} {op} {right}: mismatched types")]
    TypeMismatch { left: String, right: String, op: Comparator },
}

/// Resolve an operand against live state. Lookahead never mutates `state`.
pub fn resolve_operand(operand: &Operand, state: &MissionState) -> Value {
    match operand {
        Operand::Variable(var) => resolve_variable(*var, state),
        Operand::Lookahead(dir) => state
            .peek(*dir)
            .map_or(Value::OutOfBounds, |marker| Value::Text(marker.payload().to_string())),
        Operand::Int(n) => Value::Int(*n),
        Operand::Text(s) => Value::Text(s.clone()),
    }
}

fn resolve_variable(var: Variable, state: &MissionState) -> Value {
    let res = &state.resources;
    match var {
        Variable::Battery => Value::Int(i64::from(res.battery)),
        Variable::Memory => Value::Int(i64::try_from(res.memory_budget).unwrap_or(i64::MAX)),
        Variable::Executions => Value::Int(i64::from(res.executions_remaining)),
        Variable::Level => Value::Int(i64::from(res.level)),
        Variable::CurrentBlock => Value::Text(state.rover.current_block.payload().to_string()),
    }
}

/// Apply `op` to two values.
///
/// Equality between different kinds is simply false (and `!=` true).
///
/// # Errors
/// Ordering operators on values of different kinds return [`CompareError::TypeMismatch`].
pub fn compare(left: &Value, op: Comparator, right: &Value) -> Result<bool, CompareError> {
    let ordering = match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => None,
    };
    match (op, ordering) {
        (Comparator::Eq, _) => Ok(left == right),
        (Comparator::Ne, _) => Ok(left != right),
        (_, None) => Err(CompareError::TypeMismatch {
            left: left.kind().to_string(),
            right: right.kind().to_string(),
            op,
        }),
        (Comparator::Gt, Some(o)) => Ok(o == Ordering::Greater),
        (Comparator::Lt, Some(o)) => Ok(o == Ordering::Less),
        (Comparator::Ge, Some(o)) => Ok(o != Ordering::Less),
        (Comparator::Le, Some(o)) => Ok(o != Ordering::Greater),
    }
}

/// Resolve both sides of a condition and evaluate it.
///
/// # Errors
/// Propagates [`CompareError`] from [`compare`].
pub fn evaluate(condition: &Condition, state: &MissionState) -> Result<bool, CompareError> {
    let left = resolve_operand(&condition.left, state);
    let right = resolve_operand(&condition.right, state);
    compare(&left, condition.op, &right)
}
