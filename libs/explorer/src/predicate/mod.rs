//! Predicate mini-language over the implicit variable `value`
//!
//! ```text
//! value > 10 && value <= 20
//! value hasPrefix 'T' || value isIn 'Tom,Ben'
//! !(value matches '[a-z]+\d')
//! ```
//!
//! A predicate is compiled once ([`Predicate::compile`]) and evaluated against many
//! values. Evaluation never fails: a value of the wrong kind simply does not match,
//! and its kind is reported in the [`Evaluation`] so callers can explain an empty result.

pub mod analyzer;
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use self::ast::{ComparisonOperator, Expr, Literal, Operand};
use crate::error::Result;
use crate::value::{ExplorerValue, ValueKind};

/// Kind the variable is used as inside a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    Number,
    String,
    Bool,
}

impl VariableKind {
    /// Whether a value of `kind` can stand for the variable
    pub fn accepts(self, kind: ValueKind) -> bool {
        match self {
            VariableKind::Number => matches!(kind, ValueKind::Int | ValueKind::Double),
            VariableKind::String => kind == ValueKind::String,
            VariableKind::Bool => kind == ValueKind::Bool,
        }
    }
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VariableKind::Number => "number",
            VariableKind::String => "string",
            VariableKind::Bool => "bool",
        })
    }
}

/// Outcome of evaluating a predicate against one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub matched: bool,
    /// Kind of the value when it could not be compared at all
    pub mismatch: Option<ValueKind>,
}

/// Compiled predicate
#[derive(Debug, Clone)]
pub struct Predicate {
    expr: Expr,
    source: String,
    variable_kind: Option<VariableKind>,
}

impl Predicate {
    pub fn compile(text: &str) -> Result<Self> {
        let expr = parser::Parser::new(text)?.parse()?;
        let variable_kind = analyzer::infer_variable_kind(&expr)?;
        let source = expr.to_string();
        tracing::trace!(predicate = %source, kind = ?variable_kind, "compiled predicate");

        Ok(Self {
            expr,
            source,
            variable_kind,
        })
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Normalized source text
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn variable_kind(&self) -> Option<VariableKind> {
        self.variable_kind
    }

    pub fn evaluate(&self, value: &ExplorerValue) -> Evaluation {
        if let Some(kind) = self.variable_kind {
            if !kind.accepts(value.kind()) {
                return Evaluation {
                    matched: false,
                    mismatch: Some(value.kind()),
                };
            }
        }

        Evaluation {
            matched: eval(&self.expr, value),
            mismatch: None,
        }
    }

    /// Shortcut for `evaluate(value).matched`
    pub fn matches(&self, value: &ExplorerValue) -> bool {
        self.evaluate(value).matched
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Evaluates a predicate repeatedly, collecting the kinds of values it could not compare
#[derive(Debug)]
pub struct PredicateEvaluator<'a> {
    predicate: &'a Predicate,
    mismatches: BTreeSet<ValueKind>,
}

impl<'a> PredicateEvaluator<'a> {
    pub fn new(predicate: &'a Predicate) -> Self {
        Self {
            predicate,
            mismatches: BTreeSet::new(),
        }
    }

    pub fn evaluate(&mut self, value: &ExplorerValue) -> bool {
        let evaluation = self.predicate.evaluate(value);
        if let Some(kind) = evaluation.mismatch {
            self.mismatches.insert(kind);
        }
        evaluation.matched
    }

    pub fn mismatched_kinds(&self) -> &BTreeSet<ValueKind> {
        &self.mismatches
    }

    pub fn into_mismatched_kinds(self) -> BTreeSet<ValueKind> {
        self.mismatches
    }
}

/// Operand once `value` is substituted
enum Resolved<'a> {
    Int(i64),
    Double(f64),
    String(&'a str),
    Bool(bool),
    /// A subject no operator can compare
    Other,
}

fn resolve<'a>(operand: &'a Operand, subject: &'a ExplorerValue) -> Resolved<'a> {
    match operand {
        Operand::Variable => match subject {
            ExplorerValue::Int(i) => Resolved::Int(*i),
            ExplorerValue::Double(d) => Resolved::Double(*d),
            ExplorerValue::String(s) => Resolved::String(s),
            ExplorerValue::Bool(b) => Resolved::Bool(*b),
            _ => Resolved::Other,
        },
        Operand::Literal(Literal::Int(i)) => Resolved::Int(*i),
        Operand::Literal(Literal::Double(d)) => Resolved::Double(*d),
        Operand::Literal(Literal::String(s)) => Resolved::String(s),
        Operand::Literal(Literal::Bool(b)) => Resolved::Bool(*b),
    }
}

fn eval(expr: &Expr, subject: &ExplorerValue) -> bool {
    match expr {
        Expr::Or(left, right) => eval(left, subject) || eval(right, subject),
        Expr::And(left, right) => eval(left, subject) && eval(right, subject),
        Expr::Not(inner) => !eval(inner, subject),
        Expr::Comparison {
            left,
            operator,
            right,
        } => compare(resolve(left, subject), *operator, resolve(right, subject)),
        Expr::Matches { operand, pattern } => match resolve(operand, subject) {
            Resolved::String(s) => pattern.regex.is_match(s),
            _ => false,
        },
        Expr::Operand(operand) => matches!(resolve(operand, subject), Resolved::Bool(true)),
    }
}

fn compare(left: Resolved<'_>, operator: ComparisonOperator, right: Resolved<'_>) -> bool {
    use ComparisonOperator::*;

    match operator {
        Contains | IsIn | HasPrefix | HasSuffix => {
            let (Resolved::String(l), Resolved::String(r)) = (left, right) else {
                return false;
            };
            match operator {
                Contains => l.contains(r),
                HasPrefix => l.starts_with(r),
                HasSuffix => l.ends_with(r),
                _ => split_list(r).iter().any(|item| item == l),
            }
        }
        Equal => ordering(&left, &right) == Some(Ordering::Equal),
        NotEqual => ordering(&left, &right) != Some(Ordering::Equal),
        // Booleans support equality only
        _ if matches!(left, Resolved::Bool(_)) || matches!(right, Resolved::Bool(_)) => false,
        LessThan => ordering(&left, &right) == Some(Ordering::Less),
        LessThanOrEqual => matches!(
            ordering(&left, &right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        GreaterThan => ordering(&left, &right) == Some(Ordering::Greater),
        GreaterThanOrEqual => matches!(
            ordering(&left, &right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

/// Ordering between operands of the same kind, `None` across kinds
fn ordering(left: &Resolved<'_>, right: &Resolved<'_>) -> Option<Ordering> {
    match (left, right) {
        (Resolved::Int(l), Resolved::Int(r)) => Some(l.cmp(r)),
        (Resolved::Int(l), Resolved::Double(r)) => (*l as f64).partial_cmp(r),
        (Resolved::Double(l), Resolved::Int(r)) => l.partial_cmp(&(*r as f64)),
        (Resolved::Double(l), Resolved::Double(r)) => l.partial_cmp(r),
        (Resolved::String(l), Resolved::String(r)) => Some(l.cmp(r)),
        (Resolved::Bool(l), Resolved::Bool(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// Split an `isIn` list on commas, `\,` standing for a literal comma
fn split_list(list: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = list.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => items.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    items.push(current);
    items
}
