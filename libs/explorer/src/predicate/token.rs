//! Token types for the predicate lexer

/// Token types for the predicate lexer
#[derive(Debug, PartialEq, Clone, Eq)]
pub enum TokenType {
    // Literals
    StringLiteral,
    NumberLiteral,
    BooleanLiteral,

    // The implicit subject: `value`
    Variable,

    // Comparison operators
    Equal,              // ==
    NotEqual,           // !=
    LessThan,           // <
    LessThanOrEqual,    // <=
    GreaterThan,        // >
    GreaterThanOrEqual, // >=

    // String operators
    Contains,
    IsIn,
    HasPrefix,
    HasSuffix,
    Matches,

    // Logic
    And, // &&
    Or,  // ||
    Not, // !

    // Delimiters
    OpenParen,  // (
    CloseParen, // )

    // End of input
    Eof,

    // Error
    Error,
}

impl TokenType {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            TokenType::Equal
                | TokenType::NotEqual
                | TokenType::LessThan
                | TokenType::LessThanOrEqual
                | TokenType::GreaterThan
                | TokenType::GreaterThanOrEqual
                | TokenType::Contains
                | TokenType::IsIn
                | TokenType::HasPrefix
                | TokenType::HasSuffix
                | TokenType::Matches
        )
    }
}

/// A token in a predicate expression
#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    /// Character offset in the predicate text
    pub position: usize,
}

impl Token {
    pub fn new(token_type: TokenType, value: impl Into<String>, position: usize) -> Self {
        Self {
            token_type,
            value: value.into(),
            position,
        }
    }

    pub fn eof(position: usize) -> Self {
        Self::new(TokenType::Eof, String::new(), position)
    }

    pub fn error(message: String, position: usize) -> Self {
        Self::new(TokenType::Error, message, position)
    }
}
