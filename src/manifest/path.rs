//! Path expressions for querying the manifest
//!
//! A small XPath subset, enough to address the nodes of `RtConfig.xml` and
//! `CabRepos.xml`:
//!
//! - Absolute child steps: `/RogueTechConfig/Tasks/InstallTask`
//! - Descendant steps: `//InstallTask`
//! - Wildcards: `/RogueTechConfig/*/InstallTask`
//! - Predicates: `[isSelected='true']`, `[@kind="mod"]`, `[2]` (1-based)
//! - A final attribute step `/@name` or a final `text()` step
//!
//! # Examples
//!
//! ```
//! use roguetech_installer::manifest::path::PathExpr;
//!
//! let expr = PathExpr::parse("/RogueTechConfig/Tasks/InstallTask[isSelected='true']/Id").unwrap();
//! assert_eq!(expr.steps().len(), 4);
//! ```

use crate::error::{Error, Result};

/// How a step moves from its context node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Direct element children.
    Child,
    /// Any element below the context node.
    Descendant,
}

/// Element name test of a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameTest {
    /// `*`
    Any,
    Named(String),
}

/// A filter applied to the nodes selected by a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// `[child='value']`: some child element has exactly this (trimmed) text.
    ChildEquals { name: String, value: String },
    /// `[@attr='value']`
    AttributeEquals { name: String, value: String },
    /// `[n]`, 1-based within the step's candidates for one context node.
    Position(usize),
}

/// One location step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub name: NameTest,
    pub predicates: Vec<Predicate>,
}

/// What a query yields from the selected elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// Concatenated text content.
    Text,
    /// The value of the named attribute.
    Attribute(String),
}

/// A parsed path expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathExpr {
    steps: Vec<Step>,
    output: Output,
}

impl PathExpr {
    /// Parse an expression.
    pub fn parse(expression: &str) -> Result<Self> {
        Parser::new(expression).parse()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn output(&self) -> &Output {
        &self.output
    }
}

/// Quote `value` as a path expression string literal.
///
/// Single quotes are used unless the value contains one.
pub fn literal(value: &str) -> String {
    if value.contains('\'') {
        format!("\"{}\"", value)
    } else {
        format!("'{}'", value)
    }
}

struct Parser<'a> {
    expression: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(expression: &'a str) -> Self {
        Self {
            expression,
            chars: expression.trim().chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::ManifestQuery {
            expression: self.expression.to_string(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn parse(mut self) -> Result<PathExpr> {
        if self.peek() != Some('/') {
            return Err(self.error("expression must start with '/'"));
        }

        let mut steps = Vec::new();
        let mut output = Output::Text;

        while self.peek().is_some() {
            if self.bump() != Some('/') {
                return Err(self.error(format!("expected '/' at offset {}", self.pos - 1)));
            }
            let axis = if self.peek() == Some('/') {
                self.bump();
                Axis::Descendant
            } else {
                Axis::Child
            };

            let name = self.read_name();
            if name.is_empty() {
                return Err(self.error(format!("empty step at offset {}", self.pos)));
            }

            if let Some(attribute) = name.strip_prefix('@') {
                if axis == Axis::Descendant || self.peek().is_some() || attribute.is_empty() {
                    return Err(self.error("an attribute step must be the final child step"));
                }
                output = Output::Attribute(attribute.to_string());
                break;
            }
            if name == "text()" {
                if self.peek().is_some() {
                    return Err(self.error("text() must be the final step"));
                }
                break;
            }

            let mut predicates = Vec::new();
            while self.peek() == Some('[') {
                self.bump();
                predicates.push(self.read_predicate()?);
            }

            let name = if name == "*" {
                NameTest::Any
            } else {
                NameTest::Named(name)
            };
            steps.push(Step {
                axis,
                name,
                predicates,
            });
        }

        if steps.is_empty() {
            return Err(self.error("expression selects nothing"));
        }

        Ok(PathExpr { steps, output })
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch == '/' || ch == '[' {
                break;
            }
            name.push(ch);
            self.bump();
        }
        name.trim().to_string()
    }

    /// Reads a predicate body after `[` up to and including the closing `]`.
    fn read_predicate(&mut self) -> Result<Predicate> {
        let mut lhs = String::new();
        let mut value: Option<String> = None;

        loop {
            match self.bump() {
                None => return Err(self.error("unterminated predicate")),
                Some(']') => break,
                Some('=') if value.is_none() => {
                    value = Some(self.read_quoted()?);
                }
                Some(ch) if value.is_none() => lhs.push(ch),
                Some(ch) if ch.is_whitespace() => {}
                Some(ch) => {
                    return Err(self.error(format!("unexpected '{}' after predicate value", ch)))
                }
            }
        }

        let lhs = lhs.trim();
        match value {
            None => {
                let position: usize = lhs
                    .parse()
                    .map_err(|_| self.error(format!("unsupported predicate '{}'", lhs)))?;
                if position == 0 {
                    return Err(self.error("positions start at 1"));
                }
                Ok(Predicate::Position(position))
            }
            Some(value) => match lhs.strip_prefix('@') {
                Some(name) if !name.is_empty() => Ok(Predicate::AttributeEquals {
                    name: name.to_string(),
                    value,
                }),
                None if !lhs.is_empty() => Ok(Predicate::ChildEquals {
                    name: lhs.to_string(),
                    value,
                }),
                _ => Err(self.error("predicate is missing a name")),
            },
        }
    }

    fn read_quoted(&mut self) -> Result<String> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        let quote = match self.bump() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("predicate values must be quoted")),
        };
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string literal")),
                Some(ch) if ch == quote => return Ok(value),
                Some(ch) => value.push(ch),
            }
        }
    }
}
