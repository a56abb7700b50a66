//! Static analysis of predicate expressions
//!
//! Infers the kind the implicit `value` must have for the predicate to be
//! meaningful. Using the variable as two different kinds is an error.

use super::ast::{ComparisonOperator, Expr, Literal, Operand};
use super::VariableKind;
use crate::error::{Error, Result};

/// Infer the variable kind of `expr`, `None` when no comparison constrains it.
pub fn infer_variable_kind(expr: &Expr) -> Result<Option<VariableKind>> {
    let mut analyzer = Analyzer {
        root: expr,
        inferred: None,
    };
    analyzer.visit(expr)?;
    Ok(analyzer.inferred)
}

struct Analyzer<'a> {
    root: &'a Expr,
    inferred: Option<VariableKind>,
}

impl Analyzer<'_> {
    fn visit(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::Or(left, right) | Expr::And(left, right) => {
                self.visit(left)?;
                self.visit(right)
            }
            Expr::Not(inner) => self.visit(inner),
            Expr::Comparison {
                left,
                operator,
                right,
            } => {
                let kind = comparison_kind(left, *operator, right);
                self.record(kind)
            }
            Expr::Matches { operand, .. } => {
                if *operand == Operand::Variable {
                    self.record(Some(VariableKind::String))?;
                }
                Ok(())
            }
            Expr::Operand(Operand::Variable) => self.record(Some(VariableKind::Bool)),
            Expr::Operand(Operand::Literal(_)) => Ok(()),
        }
    }

    fn record(&mut self, kind: Option<VariableKind>) -> Result<()> {
        let Some(kind) = kind else {
            return Ok(());
        };
        match self.inferred {
            None => {
                self.inferred = Some(kind);
                Ok(())
            }
            Some(first) if first == kind => Ok(()),
            Some(first) => Err(Error::PredicateConflict {
                expression: self.root.to_string(),
                first,
                second: kind,
            }),
        }
    }
}

/// Kind required of the variable by one comparison
fn comparison_kind(
    left: &Operand,
    operator: ComparisonOperator,
    right: &Operand,
) -> Option<VariableKind> {
    let uses_variable = *left == Operand::Variable || *right == Operand::Variable;
    if !uses_variable {
        return None;
    }
    if operator.is_string_operator() {
        return Some(VariableKind::String);
    }

    let literal = match (left, right) {
        (Operand::Literal(literal), _) | (_, Operand::Literal(literal)) => literal,
        // `value == value` says nothing about the kind
        _ => return None,
    };
    Some(match literal {
        Literal::String(_) => VariableKind::String,
        Literal::Int(_) | Literal::Double(_) => VariableKind::Number,
        Literal::Bool(_) => VariableKind::Bool,
    })
}
