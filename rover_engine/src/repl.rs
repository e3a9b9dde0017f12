//! Operator console.
//!
//! The console is the sequencer's [`Operator`]: it collects scripts line by
//! line until an `end` line, asks whether to advance after a completed level,
//! and renders every mission event through the [`View`].

mod input;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use rover_data::LevelCatalog;
use rover_script::Script;

use crate::data_paths::data_path;
use crate::event::{EventSink, MissionEvent};
use crate::mission::{Mission, Operator, SessionOutcome, dice_for};
use crate::mission_log::{MissionRecord, append_record};
use crate::style::GameStyle;
use crate::view::{View, ViewItem};
use crate::world::MissionState;

pub use input::{CONSOLE_COMMANDS, InputEvent, LineEditor, LineSource, PlainInput, console_input};

/// Interactive operator backed by the terminal.
pub struct Console {
    input: Box<dyn LineSource>,
    pub view: View,
    tutorial: Option<String>,
}

impl Console {
    pub fn new(input: Box<dyn LineSource>, view: View) -> Self {
        Self {
            input,
            view,
            tutorial: None,
        }
    }

    /// Text shown by `:help`.
    pub fn set_tutorial(&mut self, text: String) {
        self.tutorial = Some(text);
    }

    fn read(&mut self, prompt: &str) -> Result<InputEvent> {
        self.input.read_line(prompt).context("reading console input")
    }

    /// Ask a yes/no question until answered. End of input counts as no.
    pub fn ask_yes_no(&mut self, question: &str) -> Result<bool> {
        let prompt = format!("Mission Control: {question} (y/n) ").prompt_style().to_string();
        loop {
            match self.read(&prompt)? {
                InputEvent::Eof => return Ok(false),
                InputEvent::Interrupted => continue,
                InputEvent::Line(line) => match line.trim().to_lowercase().as_str() {
                    "y" | "yes" => return Ok(true),
                    "n" | "no" => return Ok(false),
                    _ => {
                        self.view.push(ViewItem::Error("Please answer y or n.".into()));
                        self.view.flush();
                    },
                },
            }
        }
    }

    /// Ask for the operator's name; blank answers keep the default.
    pub fn ask_name(&mut self) -> Result<String> {
        let prompt = "Mission Control: Identify yourself, operator: ".prompt_style().to_string();
        let name = match self.read(&prompt)? {
            InputEvent::Line(line) if !line.trim().is_empty() => line.trim().to_string(),
            _ => self.view.operator().to_string(),
        };
        self.view.set_operator(name.clone());
        Ok(name)
    }

    fn show_tutorial(&mut self) {
        match &self.tutorial {
            Some(text) => {
                for paragraph in text.split("\n\n") {
                    self.view.push(ViewItem::SystemMessage(paragraph.trim_end().to_string()));
                }
            },
            None => self.view.push(ViewItem::Error("No control refresher is available.".into())),
        }
        self.view.flush();
    }

    /// Handle console commands typed at the start of a script. Returns true if handled.
    fn console_command(&mut self, line: &str, state: &MissionState) -> bool {
        match line.trim() {
            ":help" => self.show_tutorial(),
            ":status" => {
                self.view.push_status(state);
                self.view.flush();
            },
            ":clear" => {},
            _ => return false,
        }
        true
    }
}

impl EventSink for Console {
    fn emit(&mut self, event: MissionEvent) {
        self.view.emit(event);
    }
}

impl Operator for Console {
    fn request_script(&mut self, state: &MissionState) -> Result<Option<Script>> {
        self.view.push_status(state);
        self.view
            .push(ViewItem::ControlMessage("Awaiting instructions. Finish the script with 'end'.".into()));
        self.view.flush();

        let mut script = Script::new();
        while !script.is_terminated() {
            let prompt = format!("{}: ", script.lines().len() + 1).prompt_style().to_string();
            match self.read(&prompt)? {
                InputEvent::Eof => return Ok(None),
                InputEvent::Interrupted => {
                    self.view.push(ViewItem::SystemMessage("Script discarded.".into()));
                    self.view.flush();
                    script = Script::new();
                },
                InputEvent::Line(line) => {
                    if script.is_empty() && self.console_command(&line, state) {
                        continue;
                    }
                    if line.trim() == ":clear" {
                        self.view.push(ViewItem::SystemMessage("Script discarded.".into()));
                        self.view.flush();
                        script = Script::new();
                        continue;
                    }
                    script.push(line);
                },
            }
        }
        Ok(Some(script))
    }

    fn confirm_advance(&mut self, level: u32) -> Result<bool> {
        self.view.flush();
        info!("asking to advance past level {level}");
        self.ask_yes_no("Proceed to next sector?")
    }
}

/// Run an interactive session over `catalog`.
///
/// # Errors
/// Propagates failures from input handling or level construction.
pub fn run_repl(catalog: LevelCatalog) -> Result<SessionOutcome> {
    let mut console = Console::new(console_input(), View::new());
    match load_tutorial(&data_path("tutorial.txt")) {
        Ok(text) => console.set_tutorial(text),
        Err(err) => warn!("{err:#}"),
    }

    let operator = console.ask_name()?;
    if console.ask_yes_no("Do you need a control refresher?")? {
        console.show_tutorial();
    }

    let log_path = catalog.settings.mission_log.clone().filter(|p| !p.trim().is_empty());
    let dice = dice_for(&catalog.settings);
    let mut mission = Mission::new(catalog, dice);
    let outcome = mission.run(&mut console)?;
    console.view.flush();

    if let Some(path) = log_path {
        let record = MissionRecord::new(&operator, &outcome);
        if let Err(err) = append_record(Path::new(&path), &record) {
            warn!("mission log not written: {err:#}");
        }
    }
    Ok(outcome)
}

fn load_tutorial(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading tutorial {}", path.display()))
}
