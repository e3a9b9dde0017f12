//! Cell effect resolution: what happens to the rover's resources after it
//! lands on a cell.
//!
//! The resolver is pure apart from the injected [`Dice`], so tests drive it
//! with a loaded stub or a seeded [`StdRng`](rand::rngs::StdRng).

use std::ops::RangeInclusive;

use rand::Rng;
use rover_data::{CellMarker, MAX_BATTERY};

use crate::event::{BatteryCause, FailureReason};
use crate::world::ResourceState;

/// Charge gained from a favorable outcome on uncharted ground.
pub const SOLAR_FLARE_CHARGE: u32 = 15;
/// Drain range of an unfavorable outcome on uncharted ground.
pub const INTERFERENCE_DRAIN: RangeInclusive<u32> = 5..=20;
/// Charge gained from a charging station.
pub const STATION_CHARGE: u32 = 25;

/// Source of randomness for cell effects.
pub trait Dice {
    /// True for a favorable outcome.
    fn coin_flip(&mut self) -> bool;
    /// Uniform roll inside `range`.
    fn roll(&mut self, range: RangeInclusive<u32>) -> u32;
}

/// [`Dice`] backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngDice<R: Rng> {
    rng: R,
}

impl<R: Rng> RngDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Dice for RngDice<R> {
    fn coin_flip(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }

    fn roll(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.rng.random_range(range)
    }
}

/// Whether the mission can go on after a cell effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOutcome {
    Continue,
    Terminal(FailureReason),
}

/// A battery change caused by the cell, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryDelta {
    pub delta: i64,
    pub battery: u32,
    pub cause: BatteryCause,
}

/// Result of resolving one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellEffect {
    pub resources: ResourceState,
    pub outcome: CellOutcome,
    pub battery: Option<BatteryDelta>,
}

impl CellEffect {
    fn unchanged(resources: ResourceState) -> Self {
        Self {
            resources,
            outcome: CellOutcome::Continue,
            battery: None,
        }
    }
}

/// Apply the effect of landing on `marker`.
pub fn resolve_cell(marker: CellMarker, mut resources: ResourceState, dice: &mut dyn Dice) -> CellEffect {
    match marker {
        CellMarker::Unknown => {
            if dice.coin_flip() {
                let charge = SOLAR_FLARE_CHARGE.min(MAX_BATTERY.saturating_sub(resources.battery));
                resources.battery += charge;
                CellEffect {
                    resources,
                    outcome: CellOutcome::Continue,
                    battery: Some(BatteryDelta {
                        delta: i64::from(charge),
                        battery: resources.battery,
                        cause: BatteryCause::SolarFlare,
                    }),
                }
            } else {
                let drain = dice.roll(INTERFERENCE_DRAIN);
                resources.battery = resources.battery.saturating_sub(drain);
                let outcome = if resources.battery == 0 {
                    CellOutcome::Terminal(FailureReason::PowerDepleted)
                } else {
                    CellOutcome::Continue
                };
                CellEffect {
                    resources,
                    outcome,
                    battery: Some(BatteryDelta {
                        delta: -i64::from(drain),
                        battery: resources.battery,
                        cause: BatteryCause::MagneticInterference,
                    }),
                }
            }
        },
        CellMarker::Charger => {
            let charge = STATION_CHARGE.min(MAX_BATTERY.saturating_sub(resources.battery));
            resources.battery += charge;
            CellEffect {
                resources,
                outcome: CellOutcome::Continue,
                battery: Some(BatteryDelta {
                    delta: i64::from(charge),
                    battery: resources.battery,
                    cause: BatteryCause::ChargingStation,
                }),
            }
        },
        CellMarker::Hazard => CellEffect {
            resources,
            outcome: CellOutcome::Terminal(FailureReason::ConnectionLost),
            battery: None,
        },
        _ => CellEffect::unchanged(resources),
    }
}
