//! Predicate parser - converts predicate text to an [`Expr`]
//!
//! Recursive descent parser. Precedence (lowest to highest):
//! 1. or (`||`)
//! 2. and (`&&`)
//! 3. not (`!`)
//! 4. comparison / string operators
//! 5. parenthesized group
//! 6. operand (`value`, literal)

use regex::Regex;

use super::ast::{ComparisonOperator, Expr, Literal, Operand, Pattern};
use super::lexer::Lexer;
use super::token::{Token, TokenType};
use crate::error::{Error, Result};

const MAX_RECURSION_DEPTH: usize = 200;

/// Parser for predicate expressions
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    recursion_depth: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self> {
        Ok(Self {
            tokens: Lexer::new(input).tokenize()?,
            current: 0,
            recursion_depth: 0,
        })
    }

    fn current_token(&self) -> &Token {
        // `tokenize` always ends with an Eof token
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn current_token_is(&self, token_type: TokenType) -> bool {
        self.current_token().token_type == token_type
    }

    fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if self.current < self.tokens.len() - 1 {
            self.current += 1;
        }
        token
    }

    fn expect(&mut self, token_type: TokenType) -> Result<Token> {
        let token = self.current_token();
        if token.token_type == token_type {
            return Ok(self.advance());
        }
        Err(unexpected(token, &format!("{:?}", token_type)))
    }

    /// Parse the entire expression (top-level entry point)
    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.parse_or_expression()?;

        let token = self.current_token();
        if token.token_type != TokenType::Eof {
            return Err(unexpected(token, "end of predicate"));
        }

        Ok(expr)
    }

    fn check_recursion_depth(&mut self) -> Result<()> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return Err(Error::parse(
                format!(
                    "Predicate too deeply nested (max depth: {})",
                    MAX_RECURSION_DEPTH
                ),
                self.current_token().position,
            ));
        }
        Ok(())
    }

    /// Parse or expression: expression '||' expression
    fn parse_or_expression(&mut self) -> Result<Expr> {
        let mut left = self.parse_and_expression()?;

        while self.current_token_is(TokenType::Or) {
            self.advance();
            let right = self.parse_and_expression()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    /// Parse and expression: expression '&&' expression
    fn parse_and_expression(&mut self) -> Result<Expr> {
        let mut left = self.parse_not_expression()?;

        while self.current_token_is(TokenType::And) {
            self.advance();
            let right = self.parse_not_expression()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }

        Ok(left)
    }

    /// Parse not expression: '!' expression
    fn parse_not_expression(&mut self) -> Result<Expr> {
        if self.current_token_is(TokenType::Not) {
            self.advance();
            self.check_recursion_depth()?;
            let inner = self.parse_not_expression()?;
            self.recursion_depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison_expression()
    }

    /// Parse comparison: group | operand (operator operand)?
    fn parse_comparison_expression(&mut self) -> Result<Expr> {
        if self.current_token_is(TokenType::OpenParen) {
            self.advance();
            self.check_recursion_depth()?;
            let expr = self.parse_or_expression()?;
            self.recursion_depth -= 1;
            self.expect(TokenType::CloseParen)?;
            return Ok(expr);
        }

        let left_token = self.current_token().clone();
        let left = self.parse_operand()?;

        if !self.current_token().token_type.is_comparison() {
            return match left {
                Operand::Variable | Operand::Literal(Literal::Bool(_)) => Ok(Expr::Operand(left)),
                _ => Err(Error::parse(
                    format!(
                        "Expected a comparison after '{}' (only 'value' or a boolean stands alone)",
                        left_token.value
                    ),
                    left_token.position,
                )),
            };
        }

        let operator_token = self.advance();
        let right_token = self.current_token().clone();
        let right = self.parse_operand()?;

        if operator_token.token_type == TokenType::Matches {
            return self.build_matches(left, &left_token, right, &right_token);
        }

        let operator = match operator_token.token_type {
            TokenType::Equal => ComparisonOperator::Equal,
            TokenType::NotEqual => ComparisonOperator::NotEqual,
            TokenType::LessThan => ComparisonOperator::LessThan,
            TokenType::LessThanOrEqual => ComparisonOperator::LessThanOrEqual,
            TokenType::GreaterThan => ComparisonOperator::GreaterThan,
            TokenType::GreaterThanOrEqual => ComparisonOperator::GreaterThanOrEqual,
            TokenType::Contains => ComparisonOperator::Contains,
            TokenType::IsIn => ComparisonOperator::IsIn,
            TokenType::HasPrefix => ComparisonOperator::HasPrefix,
            TokenType::HasSuffix => ComparisonOperator::HasSuffix,
            _ => return Err(unexpected(&operator_token, "a comparison operator")),
        };

        check_operands(operator, &left, &right, &operator_token)?;

        Ok(Expr::Comparison {
            left,
            operator,
            right,
        })
    }

    fn build_matches(
        &self,
        operand: Operand,
        operand_token: &Token,
        pattern: Operand,
        pattern_token: &Token,
    ) -> Result<Expr> {
        if matches!(operand, Operand::Literal(ref l) if !matches!(l, Literal::String(_))) {
            return Err(Error::parse(
                "'matches' applies to strings",
                operand_token.position,
            ));
        }
        let Operand::Literal(Literal::String(source)) = pattern else {
            return Err(Error::parse(
                "'matches' expects a quoted regular expression",
                pattern_token.position,
            ));
        };

        let regex = Regex::new(&format!("^(?:{})$", source)).map_err(|e| {
            Error::parse(
                format!("Invalid regular expression '{}': {}", source, e),
                pattern_token.position,
            )
        })?;

        Ok(Expr::Matches {
            operand,
            pattern: Pattern { source, regex },
        })
    }

    fn parse_operand(&mut self) -> Result<Operand> {
        let token = self.current_token().clone();
        let operand = match token.token_type {
            TokenType::Variable => Operand::Variable,
            TokenType::StringLiteral => Operand::Literal(Literal::String(token.value.clone())),
            TokenType::BooleanLiteral => Operand::Literal(Literal::Bool(token.value == "true")),
            TokenType::NumberLiteral => Operand::Literal(parse_number(&token)?),
            _ => return Err(unexpected(&token, "'value' or a literal")),
        };
        self.advance();
        Ok(operand)
    }
}

fn parse_number(token: &Token) -> Result<Literal> {
    let text = token.value.as_str();
    if !text.contains(['.', 'e', 'E']) {
        if let Ok(int) = text.parse::<i64>() {
            return Ok(Literal::Int(int));
        }
    }
    text.parse::<f64>()
        .map(Literal::Double)
        .map_err(|_| Error::parse(format!("Invalid number '{}'", text), token.position))
}

/// Reject operator/literal combinations that can never be evaluated
fn check_operands(
    operator: ComparisonOperator,
    left: &Operand,
    right: &Operand,
    operator_token: &Token,
) -> Result<()> {
    let literal_of = |operand: &Operand| match operand {
        Operand::Literal(literal) => Some(literal.clone()),
        Operand::Variable => None,
    };
    let (left_literal, right_literal) = (literal_of(left), literal_of(right));

    if operator.is_string_operator() {
        for literal in [&left_literal, &right_literal].into_iter().flatten() {
            if !matches!(literal, Literal::String(_)) {
                return Err(Error::parse(
                    format!("'{}' applies to strings", operator.as_str()),
                    operator_token.position,
                ));
            }
        }
        if operator == ComparisonOperator::IsIn && right_literal.is_none() {
            return Err(Error::parse(
                "'isIn' expects a quoted comma-separated list on its right",
                operator_token.position,
            ));
        }
    }

    if operator.is_ordering() {
        if left_literal.is_none() && right_literal.is_none() {
            return Err(Error::parse(
                format!("'{}' needs a number or string literal operand", operator.as_str()),
                operator_token.position,
            ));
        }
        for literal in [&left_literal, &right_literal].into_iter().flatten() {
            if matches!(literal, Literal::Bool(_)) {
                return Err(Error::parse(
                    format!("'{}' applies to numbers or strings", operator.as_str()),
                    operator_token.position,
                ));
            }
        }
        if let (Some(l), Some(r)) = (&left_literal, &right_literal) {
            let numeric = |lit: &Literal| matches!(lit, Literal::Int(_) | Literal::Double(_));
            if numeric(l) != numeric(r) {
                return Err(Error::parse(
                    format!("'{}' compares operands of different kinds", operator.as_str()),
                    operator_token.position,
                ));
            }
        }
    }

    Ok(())
}

fn unexpected(token: &Token, expected: &str) -> Error {
    let found = match token.token_type {
        TokenType::Eof => "end of predicate".to_string(),
        _ => format!("'{}'", token.value),
    };
    Error::parse(
        format!("Expected {}, found {}", expected, found),
        token.position,
    )
}
