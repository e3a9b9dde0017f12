//! Terminal input for the rover console.
//!
//! Scripts are typed through a [`LineSource`]. On a terminal that is a
//! rustyline editor completing the instruction vocabulary; piped input and
//! tests use [`PlainInput`] over any buffered reader.

use std::fs;
use std::io::{self, BufRead, IsTerminal, StdinLock, Stdout, Write};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{info, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use rover_script::Primitive;

/// What a single read produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Line(String),
    Eof,
    /// Ctrl-C at the prompt.
    Interrupted,
}

/// Anything the console can read operator lines from.
pub trait LineSource {
    /// Show `prompt` and read one line without its terminator.
    ///
    /// # Errors
    /// Returns IO errors from the underlying terminal or reader.
    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent>;
}

lazy_static! {
    static ref COMPLETION_TERMS: Vec<String> = build_completion_terms();
}

const KEYWORDS: &[&str] = &["if", "then", "else", "for"];
const VARIABLES: &[&str] = &["BATTERY", "MEMORY", "EXECUTIONS", "LEVEL", "CURRENT_BLOCK"];
/// Console commands understood at the start of a script.
pub const CONSOLE_COMMANDS: &[&str] = &[":help", ":status", ":clear"];

/// Pick the line editor when stdin is a terminal, plain stdin otherwise.
pub fn console_input() -> Box<dyn LineSource> {
    if !io::stdin().is_terminal() {
        info!("stdin is not a TTY; reading scripts line by line");
        return Box::new(PlainInput::stdin());
    }
    match LineEditor::open(history_file_path()) {
        Ok(editor) => {
            info!("line editor ready");
            Box::new(editor)
        },
        Err(err) => {
            warn!("line editor unavailable ({err}); reading plain stdin");
            Box::new(PlainInput::stdin())
        },
    }
}

#[derive(Default)]
struct RoverHelper;

impl Helper for RoverHelper {}
impl Hinter for RoverHelper {
    type Hint = String;
}
impl Highlighter for RoverHelper {}
impl Validator for RoverHelper {}

impl Completer for RoverHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let (start, prefix) = current_word(line, pos);
        if prefix.is_empty() {
            return Ok((start, Vec::new()));
        }
        Ok((start, completions_for(prefix)))
    }
}

/// The word under the cursor and where it starts.
fn current_word(line: &str, pos: usize) -> (usize, &str) {
    let slice = &line[..pos];
    let start = slice
        .rfind(|c: char| c.is_whitespace() || c == ',')
        .map_or(0, |idx| idx + 1);
    (start, &slice[start..])
}

fn completions_for(prefix: &str) -> Vec<Pair> {
    let upper = prefix.to_ascii_uppercase();
    COMPLETION_TERMS
        .iter()
        .filter(|term| term.starts_with(prefix) || (term.chars().all(|c| !c.is_lowercase()) && term.starts_with(&upper)))
        .map(|term| Pair {
            display: term.clone(),
            replacement: term.clone(),
        })
        .collect()
}

fn build_completion_terms() -> Vec<String> {
    let mut terms: Vec<String> = Primitive::ALL.iter().map(|p| p.mnemonic().to_string()).collect();
    terms.extend(KEYWORDS.iter().map(|k| (*k).to_string()));
    terms.extend(VARIABLES.iter().map(|v| (*v).to_string()));
    terms.extend(CONSOLE_COMMANDS.iter().map(|c| (*c).to_string()));
    terms.sort_unstable();
    terms.dedup();
    terms
}

/// Rustyline editor with instruction completion and persistent history.
pub struct LineEditor {
    editor: Editor<RoverHelper, DefaultHistory>,
    history: Option<PathBuf>,
}

impl LineEditor {
    /// Open an editor, restoring history from `history` when given.
    ///
    /// # Errors
    /// Fails when the terminal cannot be put into editing mode.
    pub fn open(history: Option<PathBuf>) -> rustyline::Result<Self> {
        let mut editor = Editor::<RoverHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(RoverHelper));
        if let Some(path) = &history {
            match editor.load_history(path) {
                Ok(()) => info!("history restored from {}", path.display()),
                Err(ReadlineError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {},
                Err(err) => warn!("history at {} not loaded: {err}", path.display()),
            }
        }
        Ok(Self { editor, history })
    }

    fn remember(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        if let Err(err) = self.editor.add_history_entry(line) {
            warn!("history entry dropped: {err}");
        }
        let Some(path) = &self.history else { return };
        if let Some(dir) = path.parent()
            && let Err(err) = fs::create_dir_all(dir)
        {
            warn!("cannot create {}: {err}", dir.display());
            return;
        }
        if let Err(err) = self.editor.save_history(path) {
            warn!("history not saved to {}: {err}", path.display());
        }
    }
}

impl LineSource for LineEditor {
    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        let result = self.editor.readline(prompt);
        if let Ok(line) = &result {
            self.remember(line);
        }
        readline_outcome(result)
    }
}

/// Map a rustyline result onto console input events.
fn readline_outcome(result: rustyline::Result<String>) -> io::Result<InputEvent> {
    match result {
        Ok(line) => Ok(InputEvent::Line(line)),
        Err(ReadlineError::Interrupted) => Ok(InputEvent::Interrupted),
        Err(ReadlineError::Eof) => Ok(InputEvent::Eof),
        Err(ReadlineError::Io(err)) => Err(err),
        Err(other) => Err(io::Error::other(other)),
    }
}

/// Line reader over any buffered input; prompts go to `out`.
pub struct PlainInput<R, W> {
    reader: R,
    out: W,
    buffer: String,
}

impl PlainInput<StdinLock<'static>, Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PlainInput<R, W> {
    pub fn new(reader: R, out: W) -> Self {
        Self {
            reader,
            out,
            buffer: String::new(),
        }
    }
}

impl<R: BufRead, W: Write> LineSource for PlainInput<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;

        self.buffer.clear();
        if self.reader.read_line(&mut self.buffer)? == 0 {
            return Ok(InputEvent::Eof);
        }
        let line = self.buffer.trim_end_matches(['\n', '\r']);
        Ok(InputEvent::Line(line.to_string()))
    }
}

fn history_file_path() -> Option<PathBuf> {
    dirs::data_dir()
        .or_else(dirs::data_local_dir)
        .map(|base| history_file_in(&base))
}

fn history_file_in(base: &Path) -> PathBuf {
    base.join("rover_engine").join("history.txt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn ctrl_c_and_ctrl_d_become_events() {
        assert_eq!(readline_outcome(Err(ReadlineError::Interrupted)).unwrap(), InputEvent::Interrupted);
        assert_eq!(readline_outcome(Err(ReadlineError::Eof)).unwrap(), InputEvent::Eof);
        assert_eq!(
            readline_outcome(Ok("mve".into())).unwrap(),
            InputEvent::Line("mve".into())
        );
    }

    #[test]
    fn plain_input_strips_terminators_and_reports_eof() {
        let mut out = Vec::new();
        let mut input = PlainInput::new(Cursor::new("mve\r\nfor 2 >> obs\n"), &mut out);
        assert_eq!(input.read_line("1: ").unwrap(), InputEvent::Line("mve".into()));
        assert_eq!(input.read_line("2: ").unwrap(), InputEvent::Line("for 2 >> obs".into()));
        assert_eq!(input.read_line("3: ").unwrap(), InputEvent::Eof);
        drop(input);
        assert_eq!(String::from_utf8(out).unwrap(), "1: 2: 3: ");
    }

    #[test]
    fn history_lives_under_the_engine_directory() {
        let path = history_file_in(Path::new("/tmp/rover-test"));
        assert!(path.ends_with(Path::new("rover_engine/history.txt")));
    }

    #[test]
    fn completion_terms_cover_the_language() {
        for term in ["mvn", "drp", "for", "else", "CURRENT_BLOCK", ":help"] {
            assert!(COMPLETION_TERMS.iter().any(|t| t == term), "missing {term}");
        }
    }

    #[test]
    fn completes_word_after_comma() {
        let (start, word) = current_word("for 2 >> mve,ob", 15);
        assert_eq!(start, 13);
        assert_eq!(word, "ob");
        let names: Vec<String> = completions_for(word).into_iter().map(|p| p.replacement).collect();
        assert_eq!(names, vec!["obs".to_string()]);
    }

    #[test]
    fn variables_complete_case_insensitively() {
        let names: Vec<String> = completions_for("bat").into_iter().map(|p| p.replacement).collect();
        assert_eq!(names, vec!["BATTERY".to_string()]);
    }
}
