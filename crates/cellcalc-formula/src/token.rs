//! Formula tokens and the scanner that produces them
//!
//! The scanner dispatches on character class:
//!
//! - `(` and `)`
//! - the operators `+ - * /`
//! - number literals: `(\d+\.\d* | \d*\.\d+ | \d+)([eE][+-]?\d+)?`, no sign
//! - variables: `[A-Za-z_][A-Za-z0-9_]*`
//!
//! Whitespace separates tokens and is discarded. Any run of characters that
//! starts none of the above is surfaced as a single invalid lexeme so that the
//! parser can reject it by name.

use std::fmt;

/// Arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Subtract),
            '*' => Some(Operator::Multiply),
            '/' => Some(Operator::Divide),
            _ => None,
        }
    }

    /// The character this operator is written as
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }

    /// `*` and `/`
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Operator::Multiply | Operator::Divide)
    }
}

/// A normalized token of a parsed formula
///
/// Numbers hold their parsed value, so `2.0` and `2.000` are the same token.
/// Variables hold their normalized spelling.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Variable(String),
    Operator(Operator),
    LeftParen,
    RightParen,
}

impl Token {
    /// Numbers and variables
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Variable(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Display for f64 is the shortest text that parses back to the same value
            Token::Number(n) => write!(f, "{}", n),
            Token::Variable(name) => f.write_str(name),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
        }
    }
}

/// Lexical class of a scanned substring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LexemeKind {
    Number,
    Variable,
    Operator(Operator),
    LeftParen,
    RightParen,
    Invalid,
}

/// A raw substring of the source together with its class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Lexeme<'a> {
    pub kind: LexemeKind,
    pub text: &'a str,
}

/// Split `input` into lexemes, discarding whitespace
pub(crate) fn tokenize(input: &str) -> Vec<Lexeme<'_>> {
    Scanner::new(input).collect()
}

/// Whether `name` matches the variable grammar `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_variable(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_identifier_start(c) => chars.all(is_identifier_continue),
        _ => false,
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn scan_lexeme(&mut self) -> Option<Lexeme<'a>> {
        self.skip_whitespace();

        let c = self.peek_char()?;
        let start = self.pos;

        let kind = match c {
            '(' => {
                self.advance();
                LexemeKind::LeftParen
            }
            ')' => {
                self.advance();
                LexemeKind::RightParen
            }
            _ => {
                if let Some(op) = Operator::from_char(c) {
                    self.advance();
                    LexemeKind::Operator(op)
                } else if self.at_number_start() {
                    self.scan_number();
                    LexemeKind::Number
                } else if is_identifier_start(c) {
                    self.scan_identifier();
                    LexemeKind::Variable
                } else {
                    self.scan_invalid();
                    LexemeKind::Invalid
                }
            }
        };

        Some(Lexeme {
            kind,
            text: &self.input[start..self.pos],
        })
    }

    fn scan_number(&mut self) {
        self.skip_digits();

        if self.peek_char() == Some('.') {
            self.advance();
            self.skip_digits();
        }

        // The exponent belongs to the number only if at least one digit follows
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let sign = matches!(self.peek_char_at(1), Some('+' | '-'));
            let digit_at = if sign { 2 } else { 1 };
            if self
                .peek_char_at(digit_at)
                .map_or(false, |c| c.is_ascii_digit())
            {
                for _ in 0..digit_at {
                    self.advance();
                }
                self.skip_digits();
            }
        }
    }

    fn scan_identifier(&mut self) {
        self.advance();
        while self.peek_char().map_or(false, is_identifier_continue) {
            self.advance();
        }
    }

    /// Consume characters up to whitespace or the start of a legal token
    fn scan_invalid(&mut self) {
        self.advance();
        while let Some(c) = self.peek_char() {
            if c.is_whitespace()
                || c == '('
                || c == ')'
                || Operator::from_char(c).is_some()
                || is_identifier_start(c)
                || self.at_number_start()
            {
                break;
            }
            self.advance();
        }
    }

    fn at_number_start(&self) -> bool {
        match self.peek_char() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()),
            _ => false,
        }
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_digits(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Lexeme<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan_lexeme()
    }
}
