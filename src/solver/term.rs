//! Ground terms as printed by the solver.
//!
//! Facts, actions and shown atoms are all ground terms: numbers, constants,
//! quoted strings, and function applications over those (tuples are
//! functions with an empty name). The parser accepts clingo's textual form
//! with arbitrary whitespace; `Display` renders the canonical form clingo
//! prints, without spaces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MdpError, Result};

/// A ground term.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    /// Integer constant, e.g. `-1`.
    Number(i64),
    /// Symbolic constant, e.g. `table`.
    Symbol(String),
    /// Quoted string, stored unescaped.
    Str(String),
    /// Function application `name(args...)`. Tuples have an empty name.
    Function { name: String, args: Vec<Term> },
}

impl Term {
    /// Build a function term.
    pub fn function(name: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Function {
            name: name.into(),
            args,
        }
    }

    /// Build a symbolic constant.
    pub fn symbol(name: impl Into<String>) -> Self {
        Term::Symbol(name.into())
    }

    /// Parse a single ground term. Trailing input is an error.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser::new(input);
        let term = parser.term()?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(parser.error("trailing input after term"));
        }
        Ok(term)
    }

    /// Predicate/function name. Constants count as zero-arity functions.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Term::Symbol(name) => Some(name),
            Term::Function { name, .. } if !name.is_empty() => Some(name),
            _ => None,
        }
    }

    /// Arguments of a function term; empty for everything else.
    #[must_use]
    pub fn args(&self) -> &[Term] {
        match self {
            Term::Function { args, .. } => args,
            _ => &[],
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Term::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Signature `name/arity`, if the term has a name.
    #[must_use]
    pub fn signature(&self) -> Option<Signature> {
        self.name().map(|name| Signature::new(name, self.args().len()))
    }

    /// Check whether this term is an atom of the given predicate.
    #[must_use]
    pub fn matches(&self, signature: &Signature) -> bool {
        self.name() == Some(signature.name.as_str()) && self.args().len() == signature.arity
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Number(n) => write!(f, "{n}"),
            Term::Symbol(s) => write!(f, "{s}"),
            Term::Str(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
            Term::Function { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{arg}")?;
                }
                if name.is_empty() && args.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for Term {
    type Err = MdpError;

    fn from_str(s: &str) -> Result<Self> {
        Term::parse(s)
    }
}

/// Predicate signature `name/arity`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub name: String,
    pub arity: usize,
}

impl Signature {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn error(&self, reason: &str) -> MdpError {
        MdpError::malformed(self.input, format!("{reason} at byte {}", self.pos))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        self.skip_ws();
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            _ => Err(self.error(&format!("expected `{expected}`"))),
        }
    }

    fn term(&mut self) -> Result<Term> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == '-' || c.is_ascii_digit() => self.number(),
            Some('"') => self.string(),
            Some('(') => {
                let args = self.arguments()?;
                Ok(Term::function("", args))
            }
            Some(c) if c.is_ascii_lowercase() || c == '_' || c == '#' => {
                let name = self.identifier();
                self.skip_ws();
                if self.peek() == Some('(') {
                    let args = self.arguments()?;
                    Ok(Term::Function { name, args })
                } else {
                    Ok(Term::Symbol(name))
                }
            }
            Some(c) if c.is_ascii_uppercase() => Err(self.error("variables are not ground")),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn identifier(&mut self) -> String {
        let start = self.pos;
        if self.peek() == Some('#') {
            self.bump();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '\'') {
            self.bump();
        }
        self.input[start..self.pos].to_string()
    }

    fn number(&mut self) -> Result<Term> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        self.input[start..self.pos]
            .parse::<i64>()
            .map(Term::Number)
            .map_err(|_| self.error("invalid integer"))
    }

    fn string(&mut self) -> Result<Term> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Term::Str(out)),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some(c) => out.push(c),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    /// Parenthesised, comma-separated arguments. A trailing comma is allowed
    /// so that one-element tuples `(a,)` round-trip.
    fn arguments(&mut self) -> Result<Vec<Term>> {
        self.expect('(')?;
        let mut args = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(')') {
                self.bump();
                return Ok(args);
            }
            args.push(self.term()?);
            self.skip_ws();
            match self.bump() {
                Some(',') => continue,
                Some(')') => return Ok(args),
                _ => return Err(self.error("expected `,` or `)`")),
            }
        }
    }
}
