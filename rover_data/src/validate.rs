use std::fmt;

use crate::*;

/// Validation error for a malformed level catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoLevels,
    InvalidMarker { level: usize, row: usize, code: String },
    RaggedMap { level: usize, row: usize, expected: usize, found: usize },
    RoverCount { level: usize, found: usize },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoLevels => write!(f, "catalog defines no levels"),
            ValidationError::InvalidMarker { level, row, code } => {
                write!(f, "level {level}: row {row} contains invalid marker '{code}'")
            },
            ValidationError::RaggedMap {
                level,
                row,
                expected,
                found,
            } => {
                write!(f, "level {level}: row {row} has {found} cells, expected {expected}")
            },
            ValidationError::RoverCount { level, found } => {
                write!(f, "level {level}: map must contain exactly one [R], found {found}")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate every level in a catalog. Level numbers in errors are 1-based.
///
/// ```
/// use rover_data::{LevelCatalog, LevelDef, validate_catalog};
///
/// let catalog = LevelCatalog {
///     levels: vec![LevelDef {
///         name: "Landing".into(),
///         memory: 800,
///         battery: 100,
///         executions: 3,
///         map: vec!["[R] [X] [S]".into(), "[B] [X] [X]".into()],
///     }],
///     ..LevelCatalog::default()
/// };
/// assert!(validate_catalog(&catalog).is_empty());
/// ```
pub fn validate_catalog(catalog: &LevelCatalog) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if catalog.levels.is_empty() {
        errors.push(ValidationError::NoLevels);
    }
    if catalog.settings.energy_per_move == 0 {
        errors.push(ValidationError::InvalidValue {
            context: "settings.energy_per_move must be positive".into(),
        });
    }
    if catalog.settings.bytes_per_char == 0 {
        errors.push(ValidationError::InvalidValue {
            context: "settings.bytes_per_char must be positive".into(),
        });
    }
    if !(catalog.settings.cost_per_byte.is_finite() && catalog.settings.cost_per_byte >= 0.0) {
        errors.push(ValidationError::InvalidValue {
            context: "settings.cost_per_byte must be a non-negative number".into(),
        });
    }

    for (idx, level) in catalog.levels.iter().enumerate() {
        validate_level(idx + 1, level, &mut errors);
    }
    errors
}

fn validate_level(number: usize, level: &LevelDef, errors: &mut Vec<ValidationError>) {
    if level.battery > MAX_BATTERY {
        errors.push(ValidationError::InvalidValue {
            context: format!("level {number}: battery {} exceeds {MAX_BATTERY}", level.battery),
        });
    }
    if level.executions == 0 {
        errors.push(ValidationError::InvalidValue {
            context: format!("level {number}: executions must be positive"),
        });
    }
    if level.map.is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: format!("level {number}: map is empty"),
        });
        return;
    }

    let grid = match level.grid() {
        Ok(grid) => grid,
        Err(err) => {
            errors.push(ValidationError::InvalidMarker {
                level: number,
                row: err.row,
                code: err.code,
            });
            return;
        },
    };

    let expected = grid[0].len();
    if expected == 0 {
        errors.push(ValidationError::InvalidValue {
            context: format!("level {number}: map rows are empty"),
        });
    }
    for (row, cells) in grid.iter().enumerate().skip(1) {
        if cells.len() != expected {
            errors.push(ValidationError::RaggedMap {
                level: number,
                row,
                expected,
                found: cells.len(),
            });
        }
    }

    let rovers = grid.iter().flatten().filter(|m| **m == CellMarker::Rover).count();
    if rovers != 1 {
        errors.push(ValidationError::RoverCount {
            level: number,
            found: rovers,
        });
    }
}
