//! View module.
//! Rather than printing from the interpreter or sequencer, events and status snapshots are
//! collected here during a round and composed into one frame when the round is over.
use std::collections::HashMap;

use colored::Colorize;
use gametools::Spinner;
use log::info;
use textwrap::{fill, termwidth};

use rover_data::CellMarker;

use crate::event::{BatteryCause, EventSink, FailureReason, MissionEvent, SessionEndReason};
use crate::spinners::{SpinnerType, default_spinners};
use crate::style::{GameStyle, battery_style, marker_style};
use crate::world::{DeliveryFailure, MissionState};

const ICON_SUCCESS: &str = "\u{2611}"; // ✔
const ICON_FAILURE: &str = "\u{274C}"; // ✖
const ICON_ERROR: &str = "⚠︎"; // U+26A0 U+FE0E
const ICON_BATTERY: &str = "⚡︎"; // U+26A1 U+FE0E
const ICON_DEATH: &str = "☠";

/// Collects display items for one frame and renders them on [`View::flush`].
#[derive(Debug, Clone)]
pub struct View {
    pub width: usize,
    pub items: Vec<ViewEntry>,
    pub sequence: usize,
    operator: String,
    spinners: HashMap<SpinnerType, Spinner<&'static str>>,
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

impl View {
    pub fn new() -> Self {
        Self {
            width: termwidth(),
            items: Vec::new(),
            sequence: 0,
            operator: "Operator".to_string(),
            spinners: default_spinners(),
        }
    }

    /// Name used when mission control addresses the operator.
    pub fn set_operator(&mut self, name: impl Into<String>) {
        self.operator = name.into();
    }

    pub fn operator(&self) -> &str {
        &self.operator
    }

    pub fn push(&mut self, item: ViewItem) {
        self.items.push(ViewEntry {
            section: item.section(),
            view_item: item,
            sequence: self.sequence,
        });
        self.sequence += 1;
    }

    /// Queue a status panel for the current state.
    pub fn push_status(&mut self, state: &MissionState) {
        self.push(ViewItem::Status(StatusSnapshot::from(state)));
    }

    /// Compose and display everything queued for this frame, then clear the buffer.
    pub fn flush(&mut self) {
        self.width = termwidth();
        for line in self.render() {
            println!("{line}");
        }
        self.reset();
    }

    /// Render the frame to lines, grouped by section.
    pub fn render(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (section, title) in [
            (Section::Telemetry, "telemetry"),
            (Section::Status, "status"),
            (Section::Control, "control"),
        ] {
            let mut entries: Vec<&ViewEntry> = self.items.iter().filter(|e| e.section == section).collect();
            if entries.is_empty() {
                continue;
            }
            entries.sort_by_key(|e| e.sequence);
            out.push(format!("{:.>width$}", format!("[{title}]").dim_style(), width = self.width));
            for entry in entries {
                out.extend(self.render_item(&entry.view_item));
            }
            out.push(String::new());
        }
        out
    }

    /// Clears the View's buffer.
    pub fn reset(&mut self) {
        self.items.clear();
    }

    fn render_item(&self, item: &ViewItem) -> Vec<String> {
        match item {
            ViewItem::Event(event) => self.render_event(event),
            ViewItem::Status(snapshot) => render_status(snapshot),
            ViewItem::Banner(text) => vec![format!("{:^width$}", text.heading_style(), width = self.width)],
            ViewItem::SystemMessage(text) => vec![self.system(text)],
            ViewItem::ControlMessage(text) => vec![self.control(text)],
            ViewItem::Error(text) => vec![format!("{} {}", ICON_ERROR.error_style(), text.error_style())],
        }
    }

    fn system(&self, text: &str) -> String {
        let body = fill(text, self.width.saturating_sub(8).max(20));
        format!("{} {}", "System:".system_style().bold(), body.system_style())
    }

    fn control(&self, text: &str) -> String {
        let body = fill(text, self.width.saturating_sub(17).max(20));
        format!("{} {}", "Mission Control:".control_style().bold(), body.operator_style())
    }

    fn spin(&self, kind: SpinnerType) -> &'static str {
        self.spinners.get(&kind).and_then(Spinner::spin).unwrap_or_default()
    }

    /// Lines describing one mission event.
    pub fn render_event(&self, event: &MissionEvent) -> Vec<String> {
        let name = &self.operator;
        match event {
            MissionEvent::LevelStarted { level, name: sector } => vec![
                format!("{:^width$}", format!("SECTOR {level}: {sector}").heading_style(), width = self.width),
                self.control(&format!(
                    "{name}, your objective: retrieve the mineral sample and return it to base."
                )),
            ],
            MissionEvent::ScriptRejected { size, available } => vec![
                format!("{} {}", ICON_FAILURE, "Memory overflow! Script too large.".error_style()),
                self.system(&format!("Required: {size} bytes | Available: {available} bytes")),
            ],
            MissionEvent::ScriptAccepted { size, remaining } => vec![format!(
                "{} {}",
                ICON_SUCCESS,
                format!("Script loaded ({size} bytes, {remaining} bytes free)").success_style()
            )],
            MissionEvent::MoveSucceeded {
                direction, position, ..
            } => vec![format!("rover moved {direction} to {position}").dim_style().to_string()],
            MissionEvent::OutOfBounds { .. } => vec![
                self.system("Signal weakening..."),
                self.system("Connection unstable..."),
                format!("{} {}", ICON_FAILURE, "LINK TERMINATED".error_style()),
                self.control(&format!(
                    "{name}, we've lost telemetry! The rover's gone dark beyond the perimeter."
                )),
            ],
            MissionEvent::BatteryChanged { delta, battery, cause } => self.render_battery(*delta, *battery, *cause),
            MissionEvent::TerrainClassified(marker) => self.render_terrain(*marker),
            MissionEvent::SampleCollected => vec![
                format!("{} {}", ICON_SUCCESS, "Core sample secured in storage".success_style()),
                self.control(&format!(
                    "Excellent work {name}. That sample is worth more than our annual budget. Get it back safely."
                )),
            ],
            MissionEvent::CollectFailed => vec![format!(
                "{} {}",
                ICON_FAILURE,
                "No sample detected at this location".error_style()
            )],
            MissionEvent::SampleDelivered(_) => vec![
                format!("{} {}", ICON_SUCCESS, "Sample container secured!".success_style()),
                self.control(&format!("Mission accomplished {name}! Lab team is ecstatic.")),
            ],
            MissionEvent::DeliveryFailed(DeliveryFailure::WrongLocation) => vec![format!(
                "{} {}",
                ICON_ERROR.warning_style(),
                "You can only deliver samples at base stations".warning_style()
            )],
            MissionEvent::DeliveryFailed(DeliveryFailure::NothingToDeliver) => {
                vec![format!("{} {}", ICON_FAILURE, "No sample in cargo bay".error_style())]
            },
            MissionEvent::InstructionRejected { line, reason } => vec![format!(
                "{} {}",
                ICON_ERROR.error_style(),
                format!("line {line} rejected: {reason}").error_style()
            )],
            MissionEvent::LevelCompleted { level, bonus } => vec![self.control(&format!(
                "Sector {level} cleared. Efficiency = credits. Your bonus for this run: {bonus:.2} credits."
            ))],
            MissionEvent::LevelAdvanced(level) => vec![self.system(&format!("Routing uplink to sector {level}..."))],
            MissionEvent::TerminalFailure(reason) => self.render_failure(*reason),
            MissionEvent::SessionEnded(reason) => self.render_session_end(*reason),
        }
    }

    fn render_battery(&self, delta: i64, battery: u32, cause: BatteryCause) -> Vec<String> {
        match cause {
            BatteryCause::Transmission => Vec::new(),
            BatteryCause::SolarFlare => vec![
                self.system(&format!("Unexpected solar flare! Battery +{delta}%")),
                self.control(self.spin(SpinnerType::SolarFlare)),
            ],
            BatteryCause::MagneticInterference => vec![
                format!(
                    "{} {}",
                    ICON_BATTERY.warning_style(),
                    format!("Magnetic interference! Battery {delta}%").warning_style()
                ),
                self.control(self.spin(SpinnerType::Interference)),
            ],
            BatteryCause::ChargingStation => {
                let mut lines = vec![self.system(&format!("Charging station activated +{delta}%"))];
                if battery < 30 {
                    lines.push(self.control("That was too close for comfort. Don't push your luck next time."));
                } else if battery > 90 {
                    lines.push(self.control("Efficient power management. Headquarters will be pleased."));
                }
                lines
            },
        }
    }

    fn render_terrain(&self, marker: CellMarker) -> Vec<String> {
        let mut lines = vec![self.system("Scanning terrain composition..")];
        match marker {
            CellMarker::Path | CellMarker::Explored => lines.push(self.system(self.spin(SpinnerType::Terrain))),
            CellMarker::Base => lines.push(self.system("Base station - return point for samples")),
            CellMarker::Sample => lines.push(self.system("Sample site: High mineral concentration detected")),
            CellMarker::Charger => {
                lines.push(self.system("Charging station: Solar-powered energy replenishment node"));
            },
            CellMarker::Unknown | CellMarker::Hazard | CellMarker::Rover => {
                lines.push(self.system("Uncharted territory: Sensor readings inconclusive"));
                lines.push(self.control("These zones are unpredictable - could be gold or could be trouble."));
            },
        }
        lines
    }

    fn render_failure(&self, reason: FailureReason) -> Vec<String> {
        let name = &self.operator;
        match reason {
            FailureReason::OutOfBounds => vec![format!(
                "{} {}",
                ICON_DEATH.error_style(),
                "MISSION FAILED: rover lost beyond the perimeter".error_style()
            )],
            FailureReason::ConnectionLost => vec![
                format!("{} {}", ICON_DEATH.error_style(), "Disconnected!".error_style()),
                self.control(&format!(
                    "Hey {name}, did something happen? I lost connection to the rover."
                )),
                self.system("Connecting.."),
                format!("{} {}", ICON_FAILURE, "Connection failed".error_style()),
                self.control(&format!("{name}? You crashed didn't you?")),
            ],
            FailureReason::PowerDepleted => vec![format!(
                "{} {}",
                ICON_DEATH.error_style(),
                "POWER DEPLETED".error_style()
            )],
            FailureReason::ExecutionsExhausted => vec![format!(
                "{} {}",
                ICON_DEATH.error_style(),
                "EXECUTION LIMIT REACHED".error_style()
            )],
        }
    }

    fn render_session_end(&self, reason: SessionEndReason) -> Vec<String> {
        let mut lines = Vec::new();
        if reason == SessionEndReason::CampaignComplete {
            lines.push(format!(
                "{} {}",
                ICON_SUCCESS,
                "Every sector cleared. Campaign complete.".success_style()
            ));
        }
        lines.push(self.system("Terminating mission protocol..."));
        lines.push(self.control(self.spin(SpinnerType::Farewell)));
        lines
    }
}

impl EventSink for View {
    fn emit(&mut self, event: MissionEvent) {
        info!("event: {event:?}");
        self.push(ViewItem::Event(event));
    }
}

/// Subsections of the output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Section {
    /// Everything the rover reported while the script ran.
    Telemetry,
    /// Map and gauges.
    Status,
    /// Banners and prompts from the console itself.
    Control,
}

/// Wrapper for a `ViewItem` that keeps insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewEntry {
    pub section: Section,
    pub view_item: ViewItem,
    pub sequence: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewItem {
    Event(MissionEvent),
    Status(StatusSnapshot),
    Banner(String),
    SystemMessage(String),
    ControlMessage(String),
    Error(String),
}

impl ViewItem {
    pub fn section(&self) -> Section {
        match self {
            ViewItem::Event(_) => Section::Telemetry,
            ViewItem::Status(_) => Section::Status,
            ViewItem::Banner(_) | ViewItem::SystemMessage(_) | ViewItem::ControlMessage(_) | ViewItem::Error(_) => {
                Section::Control
            },
        }
    }
}

/// Copy of the state needed to draw the status panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub level: u32,
    pub level_name: String,
    pub grid: Vec<Vec<CellMarker>>,
    pub battery: u32,
    pub remaining_memory: u64,
    pub used_memory: u64,
    pub executions: u32,
    pub sample_onboard: bool,
}

impl From<&MissionState> for StatusSnapshot {
    fn from(state: &MissionState) -> Self {
        let res = &state.resources;
        Self {
            level: res.level,
            level_name: state.level_name.clone(),
            grid: state.grid.cells().to_vec(),
            battery: res.battery,
            remaining_memory: res.remaining_memory,
            used_memory: res.memory_budget.saturating_sub(res.remaining_memory),
            executions: res.executions_remaining,
            sample_onboard: state.rover.sample_onboard,
        }
    }
}

fn render_status(snap: &StatusSnapshot) -> Vec<String> {
    let mut lines = vec![format!("Sector {}: {}", snap.level, snap.level_name).heading_style().to_string()];
    for row in &snap.grid {
        let cells: Vec<String> = row.iter().map(|m| marker_style(*m).to_string()).collect();
        lines.push(format!("  {}", cells.join(" ")));
    }
    lines.push(format!("Battery: {}", battery_style(snap.battery)));
    lines.push(format!("Available memory: {} bytes", snap.remaining_memory));
    lines.push(format!("Used memory: {} bytes", snap.used_memory));
    lines.push(format!("Code executions left: {}", snap.executions));
    lines.push(if snap.sample_onboard {
        "Sample secured in cargo bay".success_style().to_string()
    } else {
        "Sample not collected".warning_style().to_string()
    });
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Grid, Position, ResourceState};

    fn plain() {
        colored::control::set_override(false);
    }

    fn state() -> MissionState {
        let grid = Grid::new(vec![vec![CellMarker::Base, CellMarker::Path, CellMarker::Sample]]).unwrap();
        MissionState::with_grid(
            grid,
            Position::new(0, 0),
            ResourceState {
                battery: 42,
                memory_budget: 1000,
                remaining_memory: 832,
                executions_remaining: 4,
                level: 1,
            },
        )
        .unwrap()
    }

    #[test]
    fn status_panel_shows_map_and_gauges() {
        plain();
        let lines = render_status(&StatusSnapshot::from(&state()));
        assert!(lines.iter().any(|l| l.contains("[R] [X] [S]")));
        assert!(lines.iter().any(|l| l == "Battery: 42%"));
        assert!(lines.iter().any(|l| l == "Used memory: 168 bytes"));
        assert!(lines.iter().any(|l| l == "Code executions left: 4"));
    }

    #[test]
    fn events_render_in_insertion_order() {
        plain();
        let mut view = View::new();
        view.set_operator("Kim");
        view.emit(MissionEvent::SampleCollected);
        view.emit(MissionEvent::DeliveryFailed(DeliveryFailure::WrongLocation));
        let lines = view.render();
        let collected = lines.iter().position(|l| l.contains("Core sample secured")).unwrap();
        let wrong = lines.iter().position(|l| l.contains("only deliver samples at base")).unwrap();
        assert!(collected < wrong);
        assert!(lines.iter().any(|l| l.contains("Excellent work Kim")));
    }

    #[test]
    fn transmission_costs_are_silent() {
        let view = View::new();
        let lines = view.render_event(&MissionEvent::BatteryChanged {
            delta: -2,
            battery: 98,
            cause: BatteryCause::Transmission,
        });
        assert!(lines.is_empty());
    }

    #[test]
    fn fixed_terrain_texts() {
        plain();
        let view = View::new();
        let lines = view.render_event(&MissionEvent::TerrainClassified(CellMarker::Charger));
        assert!(lines.iter().any(|l| l.contains("Solar-powered energy replenishment node")));
    }

    #[test]
    fn reset_clears_the_frame() {
        let mut view = View::new();
        view.push(ViewItem::SystemMessage("hello".into()));
        assert!(!view.render().is_empty());
        view.reset();
        assert!(view.render().is_empty());
    }
}
