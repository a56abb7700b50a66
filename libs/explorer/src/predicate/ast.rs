//! Predicate syntax tree
//!
//! Groups `( ... )` leave no node behind: `Display` re-inserts parentheses only where
//! precedence requires them, so rendering and re-parsing yields an equal tree.

use std::fmt;

use regex::Regex;

/// Predicate expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// expression '||' expression
    Or(Box<Expr>, Box<Expr>),
    /// expression '&&' expression
    And(Box<Expr>, Box<Expr>),
    /// '!' expression
    Not(Box<Expr>),
    /// operand (op) operand
    Comparison {
        left: Operand,
        operator: ComparisonOperator,
        right: Operand,
    },
    /// operand 'matches' pattern
    Matches { operand: Operand, pattern: Pattern },
    /// Bare `value` or boolean literal
    Operand(Operand),
}

/// Comparison and string operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Contains,
    IsIn,
    HasPrefix,
    HasSuffix,
}

impl ComparisonOperator {
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            ComparisonOperator::LessThan
                | ComparisonOperator::LessThanOrEqual
                | ComparisonOperator::GreaterThan
                | ComparisonOperator::GreaterThanOrEqual
        )
    }

    /// Operators defined only between strings
    pub fn is_string_operator(self) -> bool {
        matches!(
            self,
            ComparisonOperator::Contains
                | ComparisonOperator::IsIn
                | ComparisonOperator::HasPrefix
                | ComparisonOperator::HasSuffix
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::Contains => "contains",
            ComparisonOperator::IsIn => "isIn",
            ComparisonOperator::HasPrefix => "hasPrefix",
            ComparisonOperator::HasSuffix => "hasSuffix",
        }
    }
}

/// Comparison operand
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// The implicit subject `value`
    Variable,
    Literal(Literal),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
}

/// Compiled `matches` pattern, anchored on both ends
#[derive(Debug, Clone)]
pub struct Pattern {
    pub source: String,
    pub regex: Regex,
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Or(..) => 1,
            Expr::And(..) => 2,
            Expr::Not(_) => 3,
            Expr::Comparison { .. } | Expr::Matches { .. } | Expr::Operand(_) => 4,
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Or(left, right) => {
                left.fmt_child(f, 1)?;
                f.write_str(" || ")?;
                right.fmt_child(f, 2)
            }
            Expr::And(left, right) => {
                left.fmt_child(f, 2)?;
                f.write_str(" && ")?;
                right.fmt_child(f, 3)
            }
            Expr::Not(inner) => match inner.as_ref() {
                Expr::Operand(_) | Expr::Not(_) => write!(f, "!{}", inner),
                _ => write!(f, "!({})", inner),
            },
            Expr::Comparison {
                left,
                operator,
                right,
            } => write!(f, "{} {} {}", left, operator.as_str(), right),
            Expr::Matches { operand, pattern } => {
                write!(f, "{} matches ", operand)?;
                write_quoted(f, &pattern.source)
            }
            Expr::Operand(operand) => write!(f, "{}", operand),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Variable => f.write_str("value"),
            Operand::Literal(literal) => write!(f, "{}", literal),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write_quoted(f, s),
            Literal::Int(i) => write!(f, "{}", i),
            // Debug keeps the fractional part (`2.0`) so the literal re-lexes as a double
            Literal::Double(d) => write!(f, "{:?}", d),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    f.write_str("'")?;
    for c in text.chars() {
        match c {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            other => write!(f, "{}", other)?,
        }
    }
    f.write_str("'")
}
