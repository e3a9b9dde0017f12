//! World model: the grid, the rover on it, and the resource counters.
//!
//! `MissionState` is the single aggregate that the interpreter and cell
//! resolver mutate while a level is running. It is rebuilt from a
//! [`LevelDef`] at every level start and dropped when the level ends.

use anyhow::{Context, Result, bail};
use rover_data::{CellMarker, Direction, LevelDef, encode_grid};
use serde::Serialize;
use std::fmt;

/// A committed rover location, always inside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Rectangular grid of cell markers. Dimensions never change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<CellMarker>>,
}

impl Grid {
    /// Build a grid, rejecting empty or ragged layouts.
    ///
    /// # Errors
    /// Returns an error if the grid has no cells or rows differ in length.
    pub fn new(cells: Vec<Vec<CellMarker>>) -> Result<Self> {
        let Some(width) = cells.first().map(Vec::len) else {
            bail!("grid has no rows");
        };
        if width == 0 {
            bail!("grid rows are empty");
        }
        if let Some(row) = cells.iter().position(|r| r.len() != width) {
            bail!("grid row {row} has {} cells, expected {width}", cells[row].len());
        }
        Ok(Self { cells })
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn get(&self, pos: Position) -> Option<CellMarker> {
        self.cells.get(pos.row).and_then(|r| r.get(pos.col)).copied()
    }

    fn set(&mut self, pos: Position, marker: CellMarker) {
        if let Some(cell) = self.cells.get_mut(pos.row).and_then(|r| r.get_mut(pos.col)) {
            *cell = marker;
        }
    }

    /// The neighbour of `pos` in `dir`, or the raw out-of-range coordinates.
    pub fn step(&self, pos: Position, dir: Direction) -> Result<Position, (isize, isize)> {
        let (dr, dc) = dir.delta();
        let row = pos.row.checked_add_signed(dr);
        let col = pos.col.checked_add_signed(dc);
        match (row, col) {
            (Some(row), Some(col)) if row < self.rows() && col < self.cols() => Ok(Position { row, col }),
            _ => Err((signed(pos.row) + dr, signed(pos.col) + dc)),
        }
    }

    /// Every position holding `marker`, in row-major order.
    pub fn find_all(&self, marker: CellMarker) -> impl Iterator<Item = Position> + '_ {
        self.cells.iter().enumerate().flat_map(move |(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(move |(_, m)| **m == marker)
                .map(move |(col, _)| Position { row, col })
        })
    }

    pub fn count(&self, marker: CellMarker) -> usize {
        self.find_all(marker).count()
    }

    pub fn cells(&self) -> &[Vec<CellMarker>] {
        &self.cells
    }
}

fn signed(v: usize) -> isize {
    isize::try_from(v).unwrap_or(isize::MAX)
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in encode_grid(&self.cells) {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoverState {
    pub position: Position,
    /// Marker the rover icon is covering.
    pub current_block: CellMarker,
    pub sample_onboard: bool,
}

/// Battery, memory, and execution budgets for the running level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceState {
    pub battery: u32,
    pub memory_budget: u64,
    pub remaining_memory: u64,
    pub executions_remaining: u32,
    pub level: u32,
}

/// A move targeted a cell outside the grid. Fatal to the mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("target ({row}, {col}) is outside the grid")]
    OutOfBounds { row: isize, col: isize },
}

/// Everything that changes while a level runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionState {
    pub grid: Grid,
    pub rover: RoverState,
    pub resources: ResourceState,
    pub sample_site: Option<Position>,
    pub base: Option<Position>,
    pub level_name: String,
}

impl MissionState {
    /// Create the state for level `level` (1-based) from its definition.
    ///
    /// # Errors
    /// Returns an error if the map cannot be decoded or does not hold exactly one rover.
    pub fn from_level(level: u32, def: &LevelDef) -> Result<Self> {
        let cells = def.grid().with_context(|| format!("decoding map of level {level}"))?;
        let grid = Grid::new(cells).with_context(|| format!("building grid of level {level}"))?;
        let rovers: Vec<Position> = grid.find_all(CellMarker::Rover).collect();
        let [start] = rovers.as_slice() else {
            bail!("level {level} must contain exactly one [R], found {}", rovers.len());
        };
        let sample_site = grid.find_all(CellMarker::Sample).next();
        let base = grid.find_all(CellMarker::Base).next();

        Ok(Self {
            rover: RoverState {
                position: *start,
                current_block: CellMarker::Path,
                sample_onboard: false,
            },
            grid,
            resources: ResourceState {
                battery: def.battery,
                memory_budget: def.memory,
                remaining_memory: def.memory,
                executions_remaining: def.executions,
                level,
            },
            sample_site,
            base,
            level_name: def.name.clone(),
        })
    }

    /// Build a state directly from a grid. The rover starts at `start` on top of
    /// whatever marker is there.
    ///
    /// # Errors
    /// Returns an error if `start` is outside the grid or another cell already holds `[R]`.
    pub fn with_grid(mut grid: Grid, start: Position, resources: ResourceState) -> Result<Self> {
        let Some(under) = grid.get(start) else {
            bail!("start {start} is outside the grid");
        };
        if grid.find_all(CellMarker::Rover).any(|p| p != start) {
            bail!("grid already holds a rover elsewhere");
        }
        let current_block = if under == CellMarker::Rover { CellMarker::Path } else { under };
        let sample_site = grid.find_all(CellMarker::Sample).next();
        let base = grid.find_all(CellMarker::Base).next();
        grid.set(start, CellMarker::Rover);
        Ok(Self {
            grid,
            rover: RoverState {
                position: start,
                current_block,
                sample_onboard: false,
            },
            resources,
            sample_site,
            base,
            level_name: String::new(),
        })
    }

    /// Drive one cell in `dir`.
    ///
    /// The vacated cell gets back the marker the rover was covering (unknown
    /// ground becomes explored), and the entered cell's marker becomes the new
    /// current block, which is returned. Leaves everything untouched on failure.
    ///
    /// # Errors
    /// Returns [`MoveError::OutOfBounds`] if the target lies outside the grid.
    pub fn move_rover(&mut self, dir: Direction) -> Result<CellMarker, MoveError> {
        let from = self.rover.position;
        let to = self
            .grid
            .step(from, dir)
            .map_err(|(row, col)| MoveError::OutOfBounds { row, col })?;

        let restored = match self.rover.current_block {
            CellMarker::Unknown => CellMarker::Explored,
            other => other,
        };
        self.grid.set(from, restored);

        let entered = self.grid.get(to).unwrap_or(CellMarker::Path);
        self.rover.current_block = entered;
        self.rover.position = to;
        self.grid.set(to, CellMarker::Rover);
        Ok(entered)
    }

    /// What the rover would stand on after moving in `dir`, without moving.
    /// `None` means the move would leave the grid.
    pub fn peek(&self, dir: Direction) -> Option<CellMarker> {
        let to = self.grid.step(self.rover.position, dir).ok()?;
        self.grid.get(to)
    }

    /// Mark the current cell as resolved uncharted ground.
    pub fn settle_unknown(&mut self) {
        if self.rover.current_block == CellMarker::Unknown {
            self.rover.current_block = CellMarker::Explored;
        }
    }

    /// Pick up the sample under the rover. Returns false when there is none.
    pub fn collect_sample(&mut self) -> bool {
        if self.rover.current_block != CellMarker::Sample {
            return false;
        }
        self.rover.current_block = CellMarker::Path;
        self.rover.sample_onboard = true;
        self.sample_site = None;
        true
    }

    /// Hand the sample over at base.
    ///
    /// # Errors
    /// Reports why nothing was delivered; state is unchanged in that case.
    pub fn deliver_sample(&mut self) -> Result<(), DeliveryFailure> {
        match (self.rover.sample_onboard, self.rover.current_block) {
            (false, _) => Err(DeliveryFailure::NothingToDeliver),
            (true, CellMarker::Base) => {
                self.rover.sample_onboard = false;
                Ok(())
            },
            (true, _) => Err(DeliveryFailure::WrongLocation),
        }
    }
}

/// Why `drp` did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeliveryFailure {
    WrongLocation,
    NothingToDeliver,
}
