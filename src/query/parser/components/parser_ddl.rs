// DDL Statement Parser Implementation
//
// This module implements parsing for SQL DDL (Data Definition Language)
// statements: CREATE TABLE and DROP TABLE.

use super::parser_core::{ParseError, ParseResult, Parser};
use crate::catalog::schema::DataType;
use crate::query::parser::ast::*;
use crate::query::parser::lexer::TokenType;

/// Parse a CREATE statement
pub fn parse_create(parser: &mut Parser) -> ParseResult<Statement> {
    parser.expect_token(TokenType::CREATE)?;

    if !parser.current_token_is(TokenType::TABLE) {
        return Err(ParseError::InvalidSyntax("Only CREATE TABLE is supported".to_string()));
    }
    parser.next_token(); // Consume TABLE

    let if_not_exists = if parser.consume_if(TokenType::IF) {
        parser.expect_token(TokenType::NOT)?;
        parser.expect_token(TokenType::EXISTS)?;
        true
    } else {
        false
    };

    let table_name = parser.parse_identifier()?;

    parser.expect_token(TokenType::LPAREN)?;
    let columns = parse_column_definitions(parser)?;
    parser.expect_token(TokenType::RPAREN)?;

    Ok(Statement::Create(CreateStatement {
        table_name,
        columns,
        if_not_exists,
    }))
}

/// Parse a DROP statement
pub fn parse_drop(parser: &mut Parser) -> ParseResult<Statement> {
    parser.expect_token(TokenType::DROP)?;
    parser.expect_token(TokenType::TABLE)?;

    let if_exists = if parser.consume_if(TokenType::IF) {
        parser.expect_token(TokenType::EXISTS)?;
        true
    } else {
        false
    };

    let table_name = parser.parse_identifier()?;

    Ok(Statement::Drop(DropStatement { table_name, if_exists }))
}

/// Parse the column definitions of a CREATE TABLE
fn parse_column_definitions(parser: &mut Parser) -> ParseResult<Vec<ColumnDef>> {
    let mut columns = Vec::new();

    loop {
        let name = parser.parse_identifier()?;
        let data_type = parse_data_type(parser)?;

        let mut nullable = true;
        let mut primary_key = false;
        loop {
            if parser.consume_if(TokenType::NOT) {
                parser.expect_token(TokenType::NULL)?;
                nullable = false;
            } else if parser.consume_if(TokenType::NULL) {
                nullable = true;
            } else if parser.consume_if(TokenType::PRIMARY) {
                parser.expect_token(TokenType::KEY)?;
                primary_key = true;
                nullable = false; // Primary keys are implicitly NOT NULL
            } else {
                break;
            }
        }

        columns.push(ColumnDef {
            name,
            data_type,
            nullable,
            primary_key,
        });

        if !parser.consume_if(TokenType::COMMA) {
            break;
        }
    }

    Ok(columns)
}

/// Parse a data type name, ignoring an optional length such as VARCHAR(20)
fn parse_data_type(parser: &mut Parser) -> ParseResult<DataType> {
    let token = parser.current_token.clone().ok_or(ParseError::EndOfInput)?;
    let type_name = match &token.token_type {
        TokenType::IDENTIFIER(name) => name.clone(),
        _ => {
            return Err(ParseError::ExpectedToken(
                TokenType::IDENTIFIER("type name".to_string()),
                token,
            ))
        }
    };

    let data_type = type_name
        .parse::<DataType>()
        .map_err(ParseError::InvalidSyntax)?;
    parser.next_token();

    if parser.consume_if(TokenType::LPAREN) {
        parser.parse_count()?;
        parser.expect_token(TokenType::RPAREN)?;
    }

    Ok(data_type)
}
