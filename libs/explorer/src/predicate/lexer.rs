//! Predicate lexer - tokenizes predicate text
//!
//! Strings are single-quoted (`\'` or `''` for a quote, `\\` for a backslash), numbers are bare
//! (`12`, `-3`, `2.5`, `1e3`), operators are symbols (`==`, `&&`, ...) or words
//! (`contains`, `isIn`, `hasPrefix`, `hasSuffix`, `matches`).

use super::token::{Token, TokenType};
use crate::error::{Error, Result};

/// The predicate lexer
pub struct Lexer {
    position: usize,
    chars: Vec<char>,
    current_char: Option<char>,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            position: 0,
            chars,
            current_char,
        }
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.chars.get(self.position).copied();
    }

    /// Peek at the next character without advancing
    fn peek(&self) -> Option<char> {
        self.chars.get(self.position + 1).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let start_pos = self.position;

        while let Some(c) = self.current_char {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        self.chars[start_pos..self.position].iter().collect()
    }

    /// Read a string literal: 'string'
    fn read_string(&mut self) -> Result<String> {
        let start = self.position;
        self.advance(); // Skip opening quote

        let mut value = String::new();

        while let Some(c) = self.current_char {
            if c == '\'' {
                if self.peek() == Some('\'') {
                    value.push('\'');
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // Skip closing quote
                    return Ok(value);
                }
            } else if c == '\\' {
                self.advance(); // Skip backslash
                match self.current_char {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some(quoted @ ('\'' | '\\')) => value.push(quoted),
                    // Unknown escapes are kept verbatim so regex classes like `\d` survive
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => break,
                }
                self.advance();
            } else {
                value.push(c);
                self.advance();
            }
        }

        Err(Error::parse("Unterminated string literal", start))
    }

    /// Read a number: -?digits(.digits)?([eE][+-]?digits)?
    fn read_number(&mut self) -> String {
        let start_pos = self.position;

        if self.current_char == Some('-') {
            self.advance();
        }
        self.skip_digits();

        // Only consume the dot when digits follow
        if self.current_char == Some('.') && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.skip_digits();
        }

        if matches!(self.current_char, Some('e') | Some('E')) {
            let after_sign = match self.peek() {
                Some('+') | Some('-') => self.chars.get(self.position + 2).copied(),
                other => other,
            };
            if after_sign.is_some_and(|c| c.is_ascii_digit()) {
                self.advance(); // Skip 'e'
                if matches!(self.current_char, Some('+') | Some('-')) {
                    self.advance();
                }
                self.skip_digits();
            }
        }

        self.chars[start_pos..self.position].iter().collect()
    }

    fn skip_digits(&mut self) {
        while self.current_char.is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    /// Consume `second` when it follows the current character
    fn two_char(&mut self, second: char, matched: TokenType, single: Option<TokenType>) -> Token {
        let position = self.position;
        let first = self.current_char.unwrap_or_default();
        self.advance();
        if self.current_char == Some(second) {
            self.advance();
            return Token::new(matched, format!("{}{}", first, second), position);
        }
        match single {
            Some(token_type) => Token::new(token_type, first.to_string(), position),
            None => Token::error(
                format!("Unexpected character '{}', expected '{}{}'", first, first, second),
                position,
            ),
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let position = self.position;
        let Some(c) = self.current_char else {
            return Token::eof(position);
        };

        match c {
            '(' => {
                self.advance();
                Token::new(TokenType::OpenParen, "(", position)
            }
            ')' => {
                self.advance();
                Token::new(TokenType::CloseParen, ")", position)
            }
            '=' => self.two_char('=', TokenType::Equal, None),
            '!' => self.two_char('=', TokenType::NotEqual, Some(TokenType::Not)),
            '<' => self.two_char('=', TokenType::LessThanOrEqual, Some(TokenType::LessThan)),
            '>' => self.two_char(
                '=',
                TokenType::GreaterThanOrEqual,
                Some(TokenType::GreaterThan),
            ),
            '&' => self.two_char('&', TokenType::And, None),
            '|' => self.two_char('|', TokenType::Or, None),
            '\'' => match self.read_string() {
                Ok(value) => Token::new(TokenType::StringLiteral, value, position),
                Err(Error::Parse { message, .. }) => Token::error(message, position),
                Err(e) => Token::error(e.to_string(), position),
            },
            '-' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                let number = self.read_number();
                Token::new(TokenType::NumberLiteral, number, position)
            }
            c if c.is_ascii_digit() => {
                let number = self.read_number();
                Token::new(TokenType::NumberLiteral, number, position)
            }
            c if c.is_alphabetic() || c == '_' => {
                let ident = self.read_identifier();
                let token_type = match ident.as_str() {
                    "value" => TokenType::Variable,
                    "true" | "false" => TokenType::BooleanLiteral,
                    "contains" => TokenType::Contains,
                    "isIn" => TokenType::IsIn,
                    "hasPrefix" => TokenType::HasPrefix,
                    "hasSuffix" => TokenType::HasSuffix,
                    "matches" => TokenType::Matches,
                    _ => {
                        return Token::error(format!("Unknown identifier '{}'", ident), position);
                    }
                };
                Token::new(token_type, ident, position)
            }
            other => {
                self.advance();
                Token::error(format!("Unexpected character '{}'", other), position)
            }
        }
    }

    /// Tokenize the entire input, stopping at the first error
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            match token.token_type {
                TokenType::Error => return Err(Error::parse(token.value, token.position)),
                TokenType::Eof => {
                    tokens.push(token);
                    return Ok(tokens);
                }
                _ => tokens.push(token),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize().unwrap()
    }

    #[test]
    fn test_string_literal() {
        let tokens = tokenize("'hello' 'it''s' 'a\\'b'");
        assert_eq!(tokens[0].token_type, TokenType::StringLiteral);
        assert_eq!(tokens[0].value, "hello");
        assert_eq!(tokens[1].value, "it's");
        assert_eq!(tokens[2].value, "a'b");
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("123 -4 45.67 1e3 2.5E-2");
        let values: Vec<&str> = tokens[..5].iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["123", "-4", "45.67", "1e3", "2.5E-2"]);
        assert!(tokens[..5]
            .iter()
            .all(|t| t.token_type == TokenType::NumberLiteral));
    }

    #[test]
    fn test_operators() {
        let tokens = tokenize("== != < <= > >= && || !");
        let types: Vec<TokenType> = tokens.into_iter().map(|t| t.token_type).collect();
        assert_eq!(
            types,
            vec![
                TokenType::Equal,
                TokenType::NotEqual,
                TokenType::LessThan,
                TokenType::LessThanOrEqual,
                TokenType::GreaterThan,
                TokenType::GreaterThanOrEqual,
                TokenType::And,
                TokenType::Or,
                TokenType::Not,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        let tokens = tokenize("value contains isIn hasPrefix hasSuffix matches true");
        assert_eq!(tokens[0].token_type, TokenType::Variable);
        assert_eq!(tokens[1].token_type, TokenType::Contains);
        assert_eq!(tokens[2].token_type, TokenType::IsIn);
        assert_eq!(tokens[3].token_type, TokenType::HasPrefix);
        assert_eq!(tokens[4].token_type, TokenType::HasSuffix);
        assert_eq!(tokens[5].token_type, TokenType::Matches);
        assert_eq!(tokens[6].token_type, TokenType::BooleanLiteral);
    }

    #[test]
    fn test_errors_carry_position() {
        let err = Lexer::new("value = 2").tokenize().unwrap_err();
        assert_eq!(
            err,
            Error::Parse {
                message: "Unexpected character '=', expected '=='".into(),
                position: 6
            }
        );
        assert!(Lexer::new("value == 'open").tokenize().is_err());
        assert!(Lexer::new("value == other").tokenize().is_err());
    }
}
