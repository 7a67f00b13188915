// SQL Parser Implementation
//
// This module implements the statement dispatcher of the recursive descent
// parser. The clause parsers live in the components module.

use super::ast::Statement;
use super::components::{parse_create, parse_drop, parse_insert, parse_select};
pub use super::components::{ParseError, ParseResult, Parser};
use super::lexer::TokenType;

impl Parser {
    /// Parse a single SQL statement starting at the current token
    pub fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current_token_type() {
            Some(TokenType::SELECT) => parse_select(self),
            Some(TokenType::INSERT) => parse_insert(self),
            Some(TokenType::CREATE) => parse_create(self),
            Some(TokenType::DROP) => parse_drop(self),
            Some(TokenType::EOF) | None => Err(ParseError::EndOfInput),
            Some(_) => Err(self.unexpected()),
        }
    }
}

/// Parse exactly one statement, allowing a trailing semicolon
pub fn parse_sql(sql: &str) -> ParseResult<Statement> {
    let mut parser = Parser::new(sql);
    let statement = parser.parse_statement()?;

    parser.consume_if(TokenType::SEMICOLON);
    if !parser.at_end() {
        return Err(parser.unexpected());
    }

    Ok(statement)
}

/// Parse a semicolon separated script into its statements
pub fn parse_script(sql: &str) -> ParseResult<Vec<Statement>> {
    let mut parser = Parser::new(sql);
    let mut statements = Vec::new();

    loop {
        while parser.consume_if(TokenType::SEMICOLON) {}
        if parser.at_end() {
            break;
        }

        statements.push(parser.parse_statement()?);

        if !parser.consume_if(TokenType::SEMICOLON) && !parser.at_end() {
            return Err(ParseError::ExpectedToken(
                TokenType::SEMICOLON,
                parser.current_token.clone().ok_or(ParseError::EndOfInput)?,
            ));
        }
    }

    Ok(statements)
}
