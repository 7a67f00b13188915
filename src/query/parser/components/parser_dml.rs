// DML Statement Parser Implementation
//
// This module implements parsing for INSERT statements

use super::parser_core::{ParseError, ParseResult, Parser};
use super::parser_expressions::parse_expression;
use crate::query::parser::ast::*;
use crate::query::parser::lexer::TokenType;

/// Parse an INSERT statement
pub fn parse_insert(parser: &mut Parser) -> ParseResult<Statement> {
    parser.expect_token(TokenType::INSERT)?;
    parser.expect_token(TokenType::INTO)?;

    let table_name = parser.parse_identifier()?;

    // Optional column list
    let columns = if parser.consume_if(TokenType::LPAREN) {
        let mut names = Vec::new();
        loop {
            names.push(parser.parse_identifier()?);
            if !parser.consume_if(TokenType::COMMA) {
                break;
            }
        }
        parser.expect_token(TokenType::RPAREN)?;
        Some(names)
    } else {
        None
    };

    parser.expect_token(TokenType::VALUES)?;

    let mut values = Vec::new();
    loop {
        values.push(parse_value_tuple(parser)?);
        if !parser.consume_if(TokenType::COMMA) {
            break;
        }
    }

    if let Some(names) = &columns {
        if let Some(tuple) = values.iter().find(|tuple| tuple.len() != names.len()) {
            return Err(ParseError::InvalidSyntax(format!(
                "INSERT lists {} columns but a VALUES row has {} values",
                names.len(),
                tuple.len()
            )));
        }
    }

    Ok(Statement::Insert(InsertStatement {
        table_name,
        columns,
        values,
    }))
}

/// Parse a parenthesized list of value expressions
fn parse_value_tuple(parser: &mut Parser) -> ParseResult<Vec<Expression>> {
    parser.expect_token(TokenType::LPAREN)?;

    let mut tuple = Vec::new();
    if !parser.current_token_is(TokenType::RPAREN) {
        loop {
            tuple.push(parse_expression(parser, 0)?);
            if !parser.consume_if(TokenType::COMMA) {
                break;
            }
        }
    }

    parser.expect_token(TokenType::RPAREN)?;
    Ok(tuple)
}
