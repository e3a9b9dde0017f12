//! Pest-backed line parser producing [`Instruction`]s.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser as PestParser;

use crate::{Branch, Condition, ForLoop, Instruction, Operand, Primitive};

#[derive(PestParser)]
#[grammar = "src/grammar.pest"]
struct LineParser;

/// Errors raised for lines that look like `if`/`for` statements but cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("parse error: {0}")]
    Pest(String),
    #[error("unexpected grammar shape: {0}")]
    Shape(&'static str),
    #[error("invalid loop count '{0}'")]
    InvalidCount(String),
}

/// Parse one script line.
///
/// Returns `Ok(None)` for blank lines and for unrecognized lines that do not
/// start with a statement keyword; those are skipped at run time.
///
/// # Errors
/// Returns an error if a line starting with `if` or `for` is malformed, or if a
/// loop count does not fit in a `u32`.
pub fn parse_line(source: &str) -> Result<Option<Instruction>, ParseError> {
    let text = source.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let mut pairs = match LineParser::parse(Rule::line, text) {
        Ok(pairs) => pairs,
        Err(err) if starts_with_keyword(text) => return Err(ParseError::Pest(err.to_string())),
        Err(_) => return Ok(None),
    };
    let line = pairs.next().ok_or(ParseError::Shape("expected line"))?;
    let stmt = line
        .into_inner()
        .find(|p| p.as_rule() != Rule::EOI)
        .ok_or(ParseError::Shape("expected statement"))?;

    let instruction = match stmt.as_rule() {
        Rule::if_stmt => parse_if(stmt)?,
        Rule::for_stmt => Instruction::ForLoop(parse_for(stmt)?),
        Rule::primitive => Instruction::Primitive(stmt.as_str().parse()?),
        _ => return Err(ParseError::Shape("unexpected statement")),
    };
    Ok(Some(instruction))
}

fn starts_with_keyword(text: &str) -> bool {
    let head: String = text
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    head == "if" || head == "for"
}

fn is_keyword(rule: Rule) -> bool {
    matches!(rule, Rule::if_kw | Rule::then_kw | Rule::else_kw | Rule::for_kw)
}

fn parse_for(pair: Pair<'_, Rule>) -> Result<ForLoop, ParseError> {
    let mut inner = pair.into_inner().filter(|p| !is_keyword(p.as_rule()));
    let count_pair = inner.next().ok_or(ParseError::Shape("for without count"))?;
    let count = count_pair
        .as_str()
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidCount(count_pair.as_str().to_string()))?;
    let body_pair = inner.next().ok_or(ParseError::Shape("for without body"))?;
    let body = body_pair
        .into_inner()
        .map(|p| p.as_str().parse::<Primitive>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ForLoop { count, body })
}

fn parse_if(pair: Pair<'_, Rule>) -> Result<Instruction, ParseError> {
    let mut inner = pair.into_inner().filter(|p| !is_keyword(p.as_rule()));
    let condition = parse_condition(inner.next().ok_or(ParseError::Shape("if without condition"))?)?;
    let then_branch = parse_branch(inner.next().ok_or(ParseError::Shape("if without then branch"))?)?;
    let else_branch = inner.next().map(parse_branch).transpose()?;
    Ok(Instruction::If {
        condition,
        then_branch,
        else_branch,
    })
}

fn parse_condition(pair: Pair<'_, Rule>) -> Result<Condition, ParseError> {
    let mut inner = pair.into_inner();
    let left = inner.next().ok_or(ParseError::Shape("condition without left operand"))?;
    let op = inner.next().ok_or(ParseError::Shape("condition without comparator"))?;
    let right = inner.next().ok_or(ParseError::Shape("condition without right operand"))?;
    Ok(Condition {
        left: Operand::classify(left.as_str()),
        op: op.as_str().parse()?,
        right: Operand::classify_unquoted(right.as_str()),
    })
}

fn parse_branch(pair: Pair<'_, Rule>) -> Result<Branch, ParseError> {
    let inner = pair.into_inner().next().ok_or(ParseError::Shape("empty branch"))?;
    match inner.as_rule() {
        Rule::for_stmt => Ok(Branch::Loop(parse_for(inner)?)),
        Rule::primitive => Ok(Branch::Primitive(inner.as_str().parse()?)),
        _ => Err(ParseError::Shape("branch must be a primitive or for loop")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Comparator, Direction, Variable};

    #[test]
    fn primitives_parse() {
        assert_eq!(
            parse_line("  mvw ").unwrap(),
            Some(Instruction::Primitive(Primitive::Move(Direction::West)))
        );
        assert_eq!(parse_line("drp").unwrap(), Some(Instruction::Primitive(Primitive::Deliver)));
    }

    #[test]
    fn garbage_is_ignored() {
        assert_eq!(parse_line("hello rover").unwrap(), None);
        assert_eq!(parse_line("mvex").unwrap(), None);
        assert_eq!(parse_line("MVE").unwrap(), None);
        assert_eq!(parse_line("iffy").unwrap(), None);
    }

    #[test]
    fn loop_body_keeps_order() {
        let parsed = parse_line("for 3 >> mve, obs,mvs").unwrap();
        assert_eq!(
            parsed,
            Some(Instruction::ForLoop(ForLoop {
                count: 3,
                body: vec![
                    Primitive::Move(Direction::East),
                    Primitive::Observe,
                    Primitive::Move(Direction::South)
                ],
            }))
        );
    }

    #[test]
    fn oversized_count_is_rejected() {
        assert!(matches!(
            parse_line("for 99999999999 >> mve"),
            Err(ParseError::InvalidCount(_))
        ));
    }

    #[test]
    fn malformed_statements_are_errors() {
        assert!(matches!(parse_line("for x >> mve"), Err(ParseError::Pest(_))));
        assert!(matches!(parse_line("if BATTERY > then mve"), Err(ParseError::Pest(_))));
        assert!(matches!(parse_line("for 2 >> mve, if"), Err(ParseError::Pest(_))));
    }

    #[test]
    fn conditional_with_loop_else() {
        let parsed = parse_line("if mve == # then mvn else for 2 >> mvw, obs").unwrap();
        let Some(Instruction::If {
            condition,
            then_branch,
            else_branch,
        }) = parsed
        else {
            panic!("expected if, got {parsed:?}");
        };
        assert_eq!(condition.left, Operand::Lookahead(Direction::East));
        assert_eq!(condition.op, Comparator::Eq);
        assert_eq!(condition.right, Operand::Text("#".into()));
        assert_eq!(then_branch, Branch::Primitive(Primitive::Move(Direction::North)));
        assert_eq!(
            else_branch,
            Some(Branch::Loop(ForLoop {
                count: 2,
                body: vec![Primitive::Move(Direction::West), Primitive::Observe],
            }))
        );
    }

    #[test]
    fn conditional_without_spaces_or_else() {
        let parsed = parse_line("if BATTERY>=40 then obs").unwrap();
        assert_eq!(
            parsed,
            Some(Instruction::If {
                condition: Condition {
                    left: Operand::Variable(Variable::Battery),
                    op: Comparator::Ge,
                    right: Operand::Int(40),
                },
                then_branch: Branch::Primitive(Primitive::Observe),
                else_branch: None,
            })
        );
    }

    #[test]
    fn quoted_operand_may_contain_spaces() {
        let parsed = parse_line("if CURRENT_BLOCK != 'a b' then clt").unwrap();
        assert!(matches!(
            parsed,
            Some(Instruction::If { condition: Condition { right: Operand::Text(ref t), .. }, .. }) if t == "a b"
        ));
    }

    #[test]
    fn quoted_number_on_the_right_is_an_integer() {
        let Ok(Some(Instruction::If { condition, .. })) = parse_line("if BATTERY == '40' then obs") else {
            panic!("expected a conditional");
        };
        assert_eq!(condition.right, Operand::Int(40));
        let Ok(Some(Instruction::If { condition, .. })) = parse_line("if '40' == BATTERY then obs") else {
            panic!("expected a conditional");
        };
        assert_eq!(condition.left, Operand::Text("40".into()));
    }

    #[test]
    fn nested_if_is_not_a_branch() {
        assert!(parse_line("if LEVEL == 1 then if LEVEL == 1 then mve").is_err());
    }
}
