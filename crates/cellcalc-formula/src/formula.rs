//! Formula construction and grammar validation
//!
//! A [`Formula`] is built from source text in three steps:
//!
//! 1. the text is scanned into lexemes,
//! 2. every lexeme is normalized (numbers re-serialized by value, variables
//!    passed through the caller's normalizer and validator),
//! 3. the normalized sequence is checked against the grammar rules.
//!
//! Construction either succeeds with a well-formed formula or fails with a
//! [`FormatError`]; no partially valid formula is ever produced.

use crate::error::{EvalError, FormatError, FormatResult};
use crate::evaluator;
use crate::token::{self, LexemeKind, Token};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Parse a formula with a normalizer and validator for its variables
///
/// `normalize` canonicalizes each variable's spelling; the result must still
/// be a legal variable and must satisfy `is_valid`.
///
/// # Example
/// ```rust
/// use cellcalc_formula::parse_formula;
///
/// let f = parse_formula("a1 + 2.000", |v| v.to_uppercase(), |_| true).unwrap();
/// assert_eq!(f.to_string(), "A1+2");
/// assert!(parse_formula("2 +", |v| v.to_string(), |_| true).is_err());
/// ```
pub fn parse_formula<N, V>(source: &str, normalize: N, is_valid: V) -> FormatResult<Formula>
where
    N: Fn(&str) -> String,
    V: Fn(&str) -> bool,
{
    let lexemes = token::tokenize(source);
    log::trace!("scanned {} lexemes from {:?}", lexemes.len(), source);

    let mut tokens = Vec::with_capacity(lexemes.len());
    let mut variables: Vec<String> = Vec::new();

    for lexeme in lexemes {
        let token = match lexeme.kind {
            LexemeKind::Number => Token::Number(parse_number(lexeme.text)?),
            LexemeKind::Variable => {
                let normalized = normalize(lexeme.text);
                if !token::is_valid_variable(&normalized) {
                    return Err(reject(FormatError::IllegalVariable {
                        token: lexeme.text.to_string(),
                        normalized,
                    }));
                }
                if !is_valid(&normalized) {
                    return Err(reject(FormatError::RejectedVariable(normalized)));
                }
                if !variables.contains(&normalized) {
                    variables.push(normalized.clone());
                }
                Token::Variable(normalized)
            }
            LexemeKind::Operator(op) => Token::Operator(op),
            LexemeKind::LeftParen => Token::LeftParen,
            LexemeKind::RightParen => Token::RightParen,
            LexemeKind::Invalid => {
                return Err(reject(FormatError::InvalidToken(lexeme.text.to_string())))
            }
        };
        tokens.push(token);
    }

    validate_syntax(&tokens).map_err(reject)?;

    Ok(Formula { tokens, variables })
}

fn reject(err: FormatError) -> FormatError {
    log::debug!("rejected formula: {}", err);
    err
}

fn parse_number(text: &str) -> FormatResult<f64> {
    // The scanner only yields digit/point/exponent text, which f64 always accepts
    let value: f64 = text
        .parse()
        .map_err(|_| FormatError::InvalidToken(text.to_string()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FormatError::NumberOutOfRange(text.to_string()))
    }
}

/// Check the normalized token sequence against grammar rules 1-7, in order
fn validate_syntax(tokens: &[Token]) -> FormatResult<()> {
    // Rule 1: at least one token
    let (first, last) = match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(FormatError::Empty),
    };

    // Rule 2: running `)` count never exceeds running `(` count
    let mut open = 0usize;
    let mut close = 0usize;
    for (position, token) in tokens.iter().enumerate() {
        match token {
            Token::LeftParen => open += 1,
            Token::RightParen => {
                close += 1;
                if close > open {
                    return Err(FormatError::UnmatchedClosingParen { position });
                }
            }
            _ => {}
        }
    }

    // Rule 3: balanced totals
    if open != close {
        return Err(FormatError::UnbalancedParens { open, close });
    }

    // Rule 4: first token
    if !(first.is_operand() || *first == Token::LeftParen) {
        return Err(FormatError::InvalidStart(first.to_string()));
    }

    // Rule 5: last token
    if !(last.is_operand() || *last == Token::RightParen) {
        return Err(FormatError::InvalidEnd(last.to_string()));
    }

    // Rule 6: after `(` or an operator comes an operand or `(`
    for pair in tokens.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if matches!(prev, Token::LeftParen | Token::Operator(_))
            && !(next.is_operand() || *next == Token::LeftParen)
        {
            return Err(FormatError::ExpectedOperand {
                after: prev.to_string(),
                found: next.to_string(),
            });
        }
    }

    // Rule 7: after an operand or `)` comes an operator or `)`
    for pair in tokens.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if (prev.is_operand() || *prev == Token::RightParen)
            && !matches!(next, Token::Operator(_) | Token::RightParen)
        {
            return Err(FormatError::ExpectedOperator {
                after: prev.to_string(),
                found: next.to_string(),
            });
        }
    }

    Ok(())
}

/// A syntactically valid algebraic formula
///
/// Formulas are immutable. Equality compares the normalized token sequences:
/// numbers by value and variables by normalized spelling, which is the same
/// as comparing canonical strings.
#[derive(Debug, Clone)]
pub struct Formula {
    tokens: Vec<Token>,
    /// Distinct variables in first-occurrence order
    variables: Vec<String>,
}

impl Formula {
    /// Parse with the identity normalizer, accepting every legal variable
    pub fn parse(source: &str) -> FormatResult<Self> {
        parse_formula(source, |v| v.to_string(), |_| true)
    }

    /// Parse with a caller-supplied normalizer and validator
    pub fn parse_with<N, V>(source: &str, normalize: N, is_valid: V) -> FormatResult<Self>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        parse_formula(source, normalize, is_valid)
    }

    /// Evaluate the formula, resolving variables through `lookup`
    ///
    /// `lookup` returns `None` for a variable it cannot resolve. Unknown
    /// variables and division by zero produce an [`EvalError`]; evaluation
    /// never panics.
    ///
    /// # Example
    /// ```rust
    /// use cellcalc_formula::Formula;
    ///
    /// let f = Formula::parse("(x + 6) * 3").unwrap();
    /// assert_eq!(f.evaluate(|_| Some(2.0)), Ok(24.0));
    /// assert!(Formula::parse("5/0").unwrap().evaluate(|_| None).is_err());
    /// ```
    pub fn evaluate<F>(&self, lookup: F) -> Result<f64, EvalError>
    where
        F: FnMut(&str) -> Option<f64>,
    {
        evaluator::evaluate(&self.tokens, lookup)
    }

    /// Distinct normalized variable names, in order of first occurrence
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// The normalized token sequence
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Canonical text: normalized tokens joined without whitespace
    pub fn to_canonical_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

// Number tokens are always finite, so token equality is reflexive
impl Eq for Formula {}

impl Hash for Formula {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl FromStr for Formula {
    type Err = FormatError;

    fn from_str(s: &str) -> FormatResult<Self> {
        Formula::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Formula {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Formula {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Formula::parse(&text).map_err(serde::de::Error::custom)
    }
}
