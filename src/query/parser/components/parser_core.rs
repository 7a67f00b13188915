// Core Parser Implementation
//
// This module implements the core parser functionality for SQL

use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter;

use crate::query::parser::ast::*;
use crate::query::parser::lexer::{Lexer, Token, TokenType};

/// SQL Parsing errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    UnexpectedToken(Token),
    ExpectedToken(TokenType, Token),
    InvalidLiteral(String),
    EndOfInput,
    InvalidSyntax(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken(token) => match &token.token_type {
                TokenType::ILLEGAL(what) => write!(f, "Illegal input {} ({})", token, what),
                _ => write!(f, "Unexpected token {}", token),
            },
            ParseError::ExpectedToken(expected, actual) => {
                write!(f, "Expected {}, found {}", describe_token_type(expected), actual)
            }
            ParseError::InvalidLiteral(lit) => write!(f, "Invalid literal: {}", lit),
            ParseError::EndOfInput => write!(f, "Unexpected end of input"),
            ParseError::InvalidSyntax(reason) => write!(f, "Invalid syntax: {}", reason),
        }
    }
}

impl std::error::Error for ParseError {}

fn describe_token_type(token_type: &TokenType) -> String {
    match token_type {
        TokenType::IDENTIFIER(_) => "identifier".to_string(),
        TokenType::INTEGER(_) => "integer".to_string(),
        TokenType::LPAREN => "'('".to_string(),
        TokenType::RPAREN => "')'".to_string(),
        TokenType::COMMA => "','".to_string(),
        TokenType::EOF => "end of input".to_string(),
        other => format!("{:?}", other),
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// SQL Parser for constructing an AST from SQL tokens
pub struct Parser {
    pub tokens: Peekable<IntoIter<Token>>,
    pub current_token: Option<Token>,
}

impl Parser {
    /// Create a new parser from a SQL query string
    pub fn new(input: &str) -> Self {
        let tokens = Lexer::new(input).tokenize();

        let mut parser = Parser {
            tokens: tokens.into_iter().peekable(),
            current_token: None,
        };

        parser.next_token();
        parser
    }

    /// Advance to the next token
    pub fn next_token(&mut self) -> Option<Token> {
        self.current_token = self.tokens.next();
        self.current_token.clone()
    }

    /// Peek at the next token without consuming it
    pub fn peek_token(&mut self) -> Option<&Token> {
        self.tokens.peek()
    }

    /// Consume the current token if it has the expected type, otherwise fail
    pub fn expect_token(&mut self, expected: TokenType) -> ParseResult<Token> {
        match self.current_token.clone() {
            Some(token) if matches_token_type(&token.token_type, &expected) => {
                self.next_token();
                Ok(token)
            }
            Some(token) => Err(ParseError::ExpectedToken(expected, token)),
            None => Err(ParseError::EndOfInput),
        }
    }

    /// Consume the current token if it has the given type
    pub fn consume_if(&mut self, token_type: TokenType) -> bool {
        if self.current_token_is(token_type) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Check if the current token is of the given type
    pub fn current_token_is(&self, token_type: TokenType) -> bool {
        match &self.current_token {
            Some(token) => matches_token_type(&token.token_type, &token_type),
            None => false,
        }
    }

    /// Check if the parser has consumed all input
    pub fn at_end(&self) -> bool {
        self.current_token
            .as_ref()
            .is_none_or(|t| t.token_type == TokenType::EOF)
    }

    /// Error describing the current token as unexpected
    pub fn unexpected(&self) -> ParseError {
        match &self.current_token {
            Some(token) if token.token_type == TokenType::EOF => ParseError::EndOfInput,
            Some(token) => ParseError::UnexpectedToken(token.clone()),
            None => ParseError::EndOfInput,
        }
    }

    /// Parse an identifier (common utility)
    pub fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.current_token.clone() {
            Some(token) => {
                if let TokenType::IDENTIFIER(name) = token.token_type {
                    self.next_token();
                    Ok(name)
                } else {
                    Err(ParseError::ExpectedToken(TokenType::IDENTIFIER(String::new()), token))
                }
            }
            None => Err(ParseError::EndOfInput),
        }
    }

    /// Parse a non-negative integer literal (LIMIT / OFFSET counts)
    pub fn parse_count(&mut self) -> ParseResult<u64> {
        match self.current_token.clone() {
            Some(token) => match token.token_type {
                TokenType::INTEGER(n) if n >= 0 => {
                    self.next_token();
                    Ok(n as u64)
                }
                TokenType::INTEGER(n) => Err(ParseError::InvalidLiteral(format!("negative count {}", n))),
                _ => Err(ParseError::ExpectedToken(TokenType::INTEGER(0), token)),
            },
            None => Err(ParseError::EndOfInput),
        }
    }

    /// Get current token type, if any
    pub fn current_token_type(&self) -> Option<TokenType> {
        self.current_token.as_ref().map(|t| t.token_type.clone())
    }

    /// Check if the next token is of a specific type
    pub fn peek_token_is(&mut self, expected_type: TokenType) -> bool {
        self.tokens
            .peek()
            .is_some_and(|t| matches_token_type(&t.token_type, &expected_type))
    }
}

/// Helper function to check if a token type matches the expected type.
/// Tokens carrying data match on variant alone, except a non-empty
/// expected identifier which must match case-insensitively.
pub fn matches_token_type(token_type: &TokenType, expected: &TokenType) -> bool {
    match (token_type, expected) {
        (TokenType::IDENTIFIER(actual_val), TokenType::IDENTIFIER(expected_val)) => {
            expected_val.is_empty() || actual_val.eq_ignore_ascii_case(expected_val)
        }
        _ => std::mem::discriminant(token_type) == std::mem::discriminant(expected),
    }
}

/// Convert a token type to a binary operator
pub fn token_to_operator(token_type: &TokenType) -> ParseResult<Operator> {
    match token_type {
        TokenType::EQ => Ok(Operator::Equals),
        TokenType::NotEq => Ok(Operator::NotEquals),
        TokenType::LT => Ok(Operator::LessThan),
        TokenType::GT => Ok(Operator::GreaterThan),
        TokenType::LtEq => Ok(Operator::LessEquals),
        TokenType::GtEq => Ok(Operator::GreaterEquals),
        TokenType::PLUS => Ok(Operator::Plus),
        TokenType::MINUS => Ok(Operator::Minus),
        TokenType::ASTERISK => Ok(Operator::Multiply),
        TokenType::SLASH => Ok(Operator::Divide),
        TokenType::PERCENT => Ok(Operator::Modulo),
        TokenType::AND => Ok(Operator::And),
        TokenType::OR => Ok(Operator::Or),
        _ => Err(ParseError::InvalidSyntax(format!("Not an operator: {:?}", token_type))),
    }
}

/// Precedence of NOT as a prefix operator
pub const NOT_PRECEDENCE: u8 = 3;
/// Precedence of comparisons and IS [NOT] NULL
pub const COMPARISON_PRECEDENCE: u8 = 4;
/// Precedence of unary minus
pub const UNARY_MINUS_PRECEDENCE: u8 = 7;

/// Get operator precedence for expression parsing
pub fn get_operator_precedence(token_type: &TokenType) -> u8 {
    match token_type {
        TokenType::OR => 1,
        TokenType::AND => 2,
        TokenType::EQ | TokenType::NotEq | TokenType::LT | TokenType::GT | TokenType::LtEq | TokenType::GtEq => {
            COMPARISON_PRECEDENCE
        }
        TokenType::PLUS | TokenType::MINUS => 5,
        TokenType::ASTERISK | TokenType::SLASH | TokenType::PERCENT => 6,
        _ => 0,
    }
}
