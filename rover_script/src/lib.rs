//! rover_script: the rover instruction language.
//!
//! Scripts are line oriented. Each line is one of:
//! - a primitive: `mvn`, `mve`, `mvs`, `mvw`, `obs`, `clt`, `drp`, `end`
//! - a loop: `for 3 >> mve, mvs`
//! - a conditional: `if BATTERY > 40 then mve else for 2 >> mvw, obs`
//!
//! Lines that match none of these are ignored at run time. Lines that start
//! with `if` or `for` but are malformed are reported as [`ParseError`]s.

mod parser;

pub use parser::{ParseError, parse_line};
pub use rover_data::Direction;

use std::fmt;
use std::str::FromStr;

/// A single rover action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Move(Direction),
    Observe,
    Collect,
    Deliver,
    End,
}

impl Primitive {
    /// The mnemonic typed by the operator.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Primitive::Move(Direction::North) => "mvn",
            Primitive::Move(Direction::East) => "mve",
            Primitive::Move(Direction::South) => "mvs",
            Primitive::Move(Direction::West) => "mvw",
            Primitive::Observe => "obs",
            Primitive::Collect => "clt",
            Primitive::Deliver => "drp",
            Primitive::End => "end",
        }
    }

    pub const ALL: [Primitive; 8] = [
        Primitive::Move(Direction::North),
        Primitive::Move(Direction::East),
        Primitive::Move(Direction::South),
        Primitive::Move(Direction::West),
        Primitive::Observe,
        Primitive::Collect,
        Primitive::Deliver,
        Primitive::End,
    ];
}

impl FromStr for Primitive {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Primitive::ALL
            .into_iter()
            .find(|p| p.mnemonic() == s)
            .ok_or(ParseError::Shape("unknown primitive"))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// `for N >> a, b, c`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForLoop {
    pub count: u32,
    pub body: Vec<Primitive>,
}

/// Something an `if` may run: a primitive or a loop, never another `if`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch {
    Primitive(Primitive),
    Loop(ForLoop),
}

/// Named live simulation values available to conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variable {
    Battery,
    Memory,
    Executions,
    Level,
    CurrentBlock,
}

impl Variable {
    /// Case-insensitive lookup of a reserved name.
    pub fn from_name(name: &str) -> Option<Variable> {
        match name.to_ascii_uppercase().as_str() {
            "BATTERY" => Some(Variable::Battery),
            "MEMORY" => Some(Variable::Memory),
            "EXECUTIONS" => Some(Variable::Executions),
            "LEVEL" => Some(Variable::Level),
            "CURRENT_BLOCK" => Some(Variable::CurrentBlock),
            _ => None,
        }
    }
}

/// One side of a condition, classified at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Variable(Variable),
    /// Hypothetical move; resolves to the payload of the target cell.
    Lookahead(Direction),
    Int(i64),
    Text(String),
}

impl Operand {
    /// Classify a raw token. Quoted tokens are always text.
    pub fn classify(token: &str) -> Operand {
        if let Some(inner) = strip_quotes(token) {
            return Operand::Text(inner.to_string());
        }
        if let Some(var) = Variable::from_name(token) {
            return Operand::Variable(var);
        }
        if let Ok(Primitive::Move(dir)) = token.parse::<Primitive>() {
            return Operand::Lookahead(dir);
        }
        if let Ok(n) = token.parse::<i64>() {
            return Operand::Int(n);
        }
        Operand::Text(token.to_string())
    }

    /// Classify a right-hand token. Surrounding quotes are dropped first, so
    /// `'5'` compares as the integer 5.
    pub fn classify_unquoted(token: &str) -> Operand {
        Operand::classify(strip_quotes(token).unwrap_or(token))
    }
}

fn strip_quotes(token: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|q| {
        token
            .strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
            .filter(|_| token.len() >= 2)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Gt => ">",
            Comparator::Lt => "<",
            Comparator::Ge => ">=",
            Comparator::Le => "<=",
        }
    }
}

impl FromStr for Comparator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" => Ok(Comparator::Eq),
            "!=" => Ok(Comparator::Ne),
            ">" => Ok(Comparator::Gt),
            "<" => Ok(Comparator::Lt),
            ">=" => Ok(Comparator::Ge),
            "<=" => Ok(Comparator::Le),
            _ => Err(ParseError::Shape("unknown comparator")),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub left: Operand,
    pub op: Comparator,
    pub right: Operand,
}

/// A parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Primitive(Primitive),
    ForLoop(ForLoop),
    If {
        condition: Condition,
        then_branch: Branch,
        else_branch: Option<Branch>,
    },
}

/// A script line after parsing, keeping its 1-based position for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledLine {
    pub number: usize,
    pub source: String,
    pub parsed: Result<Option<Instruction>, ParseError>,
}

/// An ordered batch of raw instruction lines submitted together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    lines: Vec<String>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Split source text on newlines.
    pub fn from_source(source: &str) -> Self {
        Self::from_lines(source.lines())
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True once a line consisting of `end` has been added.
    pub fn is_terminated(&self) -> bool {
        self.lines.iter().any(|l| l.trim() == "end")
    }

    /// Memory footprint: total characters across all lines times `bytes_per_char`.
    pub fn size_in_bytes(&self, bytes_per_char: u64) -> u64 {
        let chars: usize = self.lines.iter().map(|l| l.chars().count()).sum();
        u64::try_from(chars).unwrap_or(u64::MAX).saturating_mul(bytes_per_char)
    }

    /// Parse every line once.
    pub fn compile(&self) -> Vec<CompiledLine> {
        self.lines
            .iter()
            .enumerate()
            .map(|(idx, source)| CompiledLine {
                number: idx + 1,
                source: source.clone(),
                parsed: parse_line(source),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operands_classify_in_priority_order() {
        assert_eq!(Operand::classify("battery"), Operand::Variable(Variable::Battery));
        assert_eq!(Operand::classify("Current_Block"), Operand::Variable(Variable::CurrentBlock));
        assert_eq!(Operand::classify("mvs"), Operand::Lookahead(Direction::South));
        assert_eq!(Operand::classify("-12"), Operand::Int(-12));
        assert_eq!(Operand::classify("#"), Operand::Text("#".into()));
        assert_eq!(Operand::classify("'42'"), Operand::Text("42".into()));
        assert_eq!(Operand::classify("\"BATTERY\""), Operand::Text("BATTERY".into()));
        assert_eq!(Operand::classify("'"), Operand::Text("'".into()));
    }

    #[test]
    fn right_operands_lose_their_quotes_first() {
        assert_eq!(Operand::classify_unquoted("'5'"), Operand::Int(5));
        assert_eq!(Operand::classify_unquoted("\"battery\""), Operand::Variable(Variable::Battery));
        assert_eq!(Operand::classify_unquoted("'#'"), Operand::Text("#".into()));
        assert_eq!(Operand::classify_unquoted("'a b'"), Operand::Text("a b".into()));
        assert_eq!(Operand::classify_unquoted("7"), Operand::Int(7));
    }

    #[test]
    fn script_size_counts_raw_characters() {
        let script = Script::from_lines(["mve", " obs", "end"]);
        assert_eq!(script.size_in_bytes(8), 10 * 8);
        assert!(script.is_terminated());
        assert!(!Script::from_lines(["mve"]).is_terminated());
    }

    #[test]
    fn compile_numbers_lines_from_one() {
        let compiled = Script::from_source("mve\n\nend").compile();
        assert_eq!(compiled.len(), 3);
        assert_eq!(compiled[0].number, 1);
        assert_eq!(compiled[1].parsed, Ok(None));
        assert_eq!(compiled[2].parsed, Ok(Some(Instruction::Primitive(Primitive::End))));
    }
}
