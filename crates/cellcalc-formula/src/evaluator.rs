//! Formula evaluator
//!
//! Evaluates a validated token sequence with an operand stack and an operator
//! stack. `*` and `/` are applied as soon as their right operand arrives; a
//! pending `+` or `-` is applied when the next `+`, `-` or `)` shows up, or at
//! the end of input.

use crate::error::EvalError;
use crate::token::{Operator, Token};

/// Entries on the operator stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackOp {
    Arith(Operator),
    LeftParen,
}

impl StackOp {
    fn is_additive(self) -> bool {
        matches!(self, StackOp::Arith(op) if !op.is_multiplicative())
    }

    fn is_multiplicative(self) -> bool {
        matches!(self, StackOp::Arith(op) if op.is_multiplicative())
    }
}

struct Machine {
    operands: Vec<f64>,
    operators: Vec<StackOp>,
}

impl Machine {
    fn new(capacity: usize) -> Self {
        Self {
            operands: Vec::with_capacity(capacity),
            operators: Vec::with_capacity(capacity),
        }
    }

    fn top(&self) -> Option<StackOp> {
        self.operators.last().copied()
    }

    /// Push an operand, first combining it with a pending `*` or `/`
    fn push_operand(&mut self, value: f64) -> Result<(), EvalError> {
        match self.top() {
            Some(StackOp::Arith(op)) if op.is_multiplicative() => {
                self.operators.pop();
                let lhs = self.pop_operand()?;
                self.operands.push(apply(lhs, op, value)?);
            }
            _ => self.operands.push(value),
        }
        Ok(())
    }

    /// Pop the top operator and apply it to the top two operands
    fn reduce(&mut self) -> Result<(), EvalError> {
        let op = match self.operators.pop() {
            Some(StackOp::Arith(op)) => op,
            other => return Err(EvalError::internal(format!("cannot apply {:?}", other))),
        };
        let rhs = self.pop_operand()?;
        let lhs = self.pop_operand()?;
        self.operands.push(apply(lhs, op, rhs)?);
        Ok(())
    }

    fn close_paren(&mut self) -> Result<(), EvalError> {
        if self.top().map_or(false, StackOp::is_additive) {
            self.reduce()?;
        }
        match self.operators.pop() {
            Some(StackOp::LeftParen) => {}
            other => {
                return Err(EvalError::internal(format!(
                    "expected '(' on the operator stack, found {:?}",
                    other
                )))
            }
        }
        if self.top().map_or(false, StackOp::is_multiplicative) {
            self.reduce()?;
        }
        Ok(())
    }

    fn pop_operand(&mut self) -> Result<f64, EvalError> {
        self.operands
            .pop()
            .ok_or_else(|| EvalError::internal("operand stack underflow"))
    }

    /// Reduce the final state to a single value
    fn finish(mut self) -> Result<f64, EvalError> {
        let consistent = match (self.operators.as_slice(), self.operands.len()) {
            ([], 1) => true,
            ([op], 2) => op.is_additive(),
            _ => false,
        };
        if !consistent {
            log::error!(
                "inconsistent evaluator state: operators {:?}, operands {:?}",
                self.operators,
                self.operands
            );
            return Err(EvalError::internal(format!(
                "{} operators and {} operands left after evaluation",
                self.operators.len(),
                self.operands.len()
            )));
        }

        if !self.operators.is_empty() {
            self.reduce()?;
        }
        self.pop_operand()
    }
}

fn apply(lhs: f64, op: Operator, rhs: f64) -> Result<f64, EvalError> {
    match op {
        Operator::Add => Ok(lhs + rhs),
        Operator::Subtract => Ok(lhs - rhs),
        Operator::Multiply => Ok(lhs * rhs),
        Operator::Divide => {
            if rhs == 0.0 {
                Err(EvalError::division_by_zero())
            } else {
                Ok(lhs / rhs)
            }
        }
    }
}

/// Evaluate a grammar-checked token sequence
///
/// The first runtime fault (division by zero, unresolved variable) stops
/// evaluation and is returned as the result.
pub(crate) fn evaluate<F>(tokens: &[Token], mut lookup: F) -> Result<f64, EvalError>
where
    F: FnMut(&str) -> Option<f64>,
{
    let mut machine = Machine::new(tokens.len());

    for token in tokens {
        match token {
            Token::Number(n) => machine.push_operand(*n)?,
            Token::Variable(name) => {
                let value = lookup(name)
                    .ok_or_else(|| EvalError::unknown_variable(name.as_str()))?;
                machine.push_operand(value)?;
            }
            Token::Operator(op) if op.is_multiplicative() => {
                machine.operators.push(StackOp::Arith(*op));
            }
            Token::Operator(op) => {
                if machine.top().map_or(false, StackOp::is_additive) {
                    machine.reduce()?;
                }
                machine.operators.push(StackOp::Arith(*op));
            }
            Token::LeftParen => machine.operators.push(StackOp::LeftParen),
            Token::RightParen => machine.close_paren()?,
        }
    }

    machine.finish()
}
