use std::collections::VecDeque;
use std::ops::RangeInclusive;

use anyhow::Result;
use rover_data::{LevelCatalog, LevelDef, MissionSettings};
use rover_engine::event::BatteryCause;
use rover_engine::mission::Outcome;
use rover_engine::*;
use rover_script::Script;

/// Stand-in operator that replays queued scripts and always gives the same answer.
struct Scripted {
    scripts: VecDeque<Script>,
    advance: bool,
    events: Vec<MissionEvent>,
    requests: usize,
}

impl Scripted {
    fn new(scripts: &[&[&str]], advance: bool) -> Self {
        Self {
            scripts: scripts.iter().map(|lines| Script::from_lines(lines.iter().copied())).collect(),
            advance,
            events: Vec::new(),
            requests: 0,
        }
    }
}

impl EventSink for Scripted {
    fn emit(&mut self, event: MissionEvent) {
        self.events.push(event);
    }
}

impl Operator for Scripted {
    fn request_script(&mut self, _state: &MissionState) -> Result<Option<Script>> {
        self.requests += 1;
        Ok(self.scripts.pop_front())
    }

    fn confirm_advance(&mut self, _level: u32) -> Result<bool> {
        Ok(self.advance)
    }
}

struct Loaded(bool);

impl Dice for Loaded {
    fn coin_flip(&mut self) -> bool {
        self.0
    }

    fn roll(&mut self, range: RangeInclusive<u32>) -> u32 {
        *range.end()
    }
}

fn level(map: &[&str], battery: u32, memory: u64, executions: u32) -> LevelDef {
    LevelDef {
        name: "Test Sector".into(),
        memory,
        battery,
        executions,
        map: map.iter().map(|row| (*row).to_string()).collect(),
    }
}

fn catalog(levels: Vec<LevelDef>) -> LevelCatalog {
    LevelCatalog {
        settings: MissionSettings::default(),
        levels,
    }
}

fn run(levels: Vec<LevelDef>, operator: &mut Scripted) -> (SessionOutcome, Mission) {
    let mut mission = Mission::new(catalog(levels), Box::new(Loaded(true)));
    let outcome = mission.run(operator).unwrap();
    (outcome, mission)
}

#[test]
fn fetch_and_return_completes_the_level() {
    let mut op = Scripted::new(&[&["mve", "mve", "clt", "mvw", "mvw", "mvw", "drp", "end"]], false);
    let (outcome, mission) = run(vec![level(&["[B] [R] [X] [S]"], 100, 1000, 3)], &mut op);

    assert_eq!(outcome.outcome, Outcome::Ended(SessionEndReason::Declined));
    assert_eq!(outcome.levels_completed, 1);
    assert_eq!(outcome.battery, 86);
    assert!(op.events.contains(&MissionEvent::ScriptAccepted { size: 192, remaining: 808 }));
    assert!(op.events.contains(&MissionEvent::SampleDelivered(1)));
    assert!(op.events.iter().any(
        |e| matches!(e, MissionEvent::LevelCompleted { level: 1, bonus } if (bonus - 1010.0).abs() < 1e-9)
    ));
    assert_eq!(mission.state().unwrap().resources.executions_remaining, 2);
}

#[test]
fn oversized_script_is_rejected_without_spending_an_execution() {
    let mut op = Scripted::new(&[&["mve", "mve", "mve", "mve", "mve", "end"], &["obs", "end"]], false);
    let (outcome, mission) = run(vec![level(&["[R] [X] [X]"], 100, 100, 2)], &mut op);

    assert_eq!(op.events[1], MissionEvent::ScriptRejected { size: 144, available: 100 });
    assert_eq!(op.events[2], MissionEvent::ScriptAccepted { size: 48, remaining: 52 });
    assert_eq!(outcome.outcome, Outcome::Ended(SessionEndReason::Voluntary));
    assert_eq!(mission.state().unwrap().resources.executions_remaining, 1);
    // rover never moved: the rejected script did not run
    assert_eq!(mission.state().unwrap().rover.position, Position::new(0, 0));
}

#[test]
fn hazard_loses_the_connection_even_on_the_last_charge() {
    let mut op = Scripted::new(&[&["mve", "end"]], true);
    let (outcome, _) = run(vec![level(&["[R] [#]"], 1, 100, 1)], &mut op);

    assert_eq!(outcome.outcome, Outcome::Failed(FailureReason::ConnectionLost));
    assert_eq!(
        op.events.last(),
        Some(&MissionEvent::TerminalFailure(FailureReason::ConnectionLost))
    );
}

#[test]
fn driving_off_the_map_is_fatal() {
    let mut op = Scripted::new(&[&["mvn", "end"]], true);
    let (outcome, _) = run(vec![level(&["[R] [X]"], 50, 100, 1)], &mut op);
    assert_eq!(outcome.outcome, Outcome::Failed(FailureReason::OutOfBounds));
}

#[test]
fn finishing_every_level_completes_the_campaign() {
    let script: &[&str] = &["mve", "clt", "mve", "drp", "end"];
    let mut op = Scripted::new(&[script, script], true);
    let levels = vec![level(&["[R] [S] [B]"], 100, 500, 2), level(&["[R] [S] [B]"], 40, 500, 2)];
    let (outcome, _) = run(levels, &mut op);

    assert_eq!(outcome.outcome, Outcome::Ended(SessionEndReason::CampaignComplete));
    assert_eq!(outcome.levels_completed, 2);
    assert_eq!(outcome.level, 2);
    assert_eq!(outcome.battery, 32);
    assert!(op.events.contains(&MissionEvent::LevelAdvanced(2)));
}

#[test]
fn running_out_of_executions_fails_the_mission() {
    let mut op = Scripted::new(&[&["obs"], &["obs", "end"]], true);
    let (outcome, _) = run(vec![level(&["[R] [X]"], 100, 100, 1)], &mut op);

    assert_eq!(outcome.outcome, Outcome::Failed(FailureReason::ExecutionsExhausted));
    assert_eq!(op.requests, 1);
}

#[test]
fn closed_input_ends_the_session() {
    let mut op = Scripted::new(&[], true);
    let (outcome, _) = run(vec![level(&["[R] [X]"], 100, 100, 3)], &mut op);
    assert_eq!(outcome.outcome, Outcome::Ended(SessionEndReason::InputClosed));
    assert_eq!(outcome.battery, 100);
}

#[test]
fn lookahead_steers_around_hazards() {
    let mut op = Scripted::new(&[&["if mve == # then mvs else mve", "obs", "end"]], false);
    let (_, mission) = run(vec![level(&["[R] [#]", "[X] [X]"], 100, 1000, 2)], &mut op);

    let state = mission.state().unwrap();
    assert_eq!(state.rover.position, Position::new(1, 0));
    assert!(op.events.contains(&MissionEvent::TerrainClassified(rover_data::CellMarker::Path)));
}

#[test]
fn uncharted_ground_and_stations_recharge() {
    let mut op = Scripted::new(&[&["for 2 >> mve", "end"]], false);
    let (outcome, _) = run(vec![level(&["[R] [?] [@]"], 50, 1000, 2)], &mut op);

    // 50 - 2 + 15, then - 2 + 25
    assert_eq!(outcome.battery, 86);
    let causes: Vec<BatteryCause> = op
        .events
        .iter()
        .filter_map(|e| match e {
            MissionEvent::BatteryChanged { cause, .. } => Some(*cause),
            _ => None,
        })
        .collect();
    assert!(causes.contains(&BatteryCause::SolarFlare));
    assert!(causes.contains(&BatteryCause::ChargingStation));
}

#[test]
fn malformed_lines_do_not_stop_the_script() {
    let mut op = Scripted::new(&[&["for x >> mve", "if BATTERY > \"a\" then mve", "mve", "end"]], false);
    let (outcome, mission) = run(vec![level(&["[R] [X]"], 100, 1000, 2)], &mut op);

    let rejected = op
        .events
        .iter()
        .filter(|e| matches!(e, MissionEvent::InstructionRejected { .. }))
        .count();
    assert_eq!(rejected, 2);
    assert_eq!(outcome.outcome, Outcome::Ended(SessionEndReason::Voluntary));
    assert_eq!(mission.state().unwrap().rover.position, Position::new(0, 1));
}

#[test]
fn last_execution_ends_after_its_first_line() {
    let mut op = Scripted::new(&[&["mve", "mve", "mve", "end"]], true);
    let (outcome, mission) = run(vec![level(&["[R] [X] [X] [X]"], 100, 1000, 1)], &mut op);

    assert_eq!(outcome.outcome, Outcome::Failed(FailureReason::ExecutionsExhausted));
    assert_eq!(mission.state().unwrap().rover.position, Position::new(0, 1));
    assert_eq!(
        op.events.last(),
        Some(&MissionEvent::TerminalFailure(FailureReason::ExecutionsExhausted))
    );
}

#[test]
fn delivering_with_the_last_charge_still_wins() {
    let mut op = Scripted::new(&[&["mve", "clt", "mvw", "mvw", "drp", "end"]], false);
    let (outcome, _) = run(vec![level(&["[B] [R] [S]"], 10, 1000, 2)], &mut op);

    assert_eq!(outcome.outcome, Outcome::Ended(SessionEndReason::Declined));
    assert_eq!(outcome.battery, 0);
    assert_eq!(outcome.levels_completed, 1);
    assert!(
        !op.events
            .iter()
            .any(|e| matches!(e, MissionEvent::TerminalFailure(_)))
    );
}

#[test]
fn quoted_numbers_compare_as_integers() {
    let mut op = Scripted::new(&[&["if BATTERY == '100' then mve else mvs", "end"]], false);
    let (_, mission) = run(vec![level(&["[R] [X]", "[X] [X]"], 100, 1000, 2)], &mut op);
    assert_eq!(mission.state().unwrap().rover.position, Position::new(0, 1));
}
