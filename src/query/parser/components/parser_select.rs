// SELECT Statement Parser Implementation
//
// This module implements parsing for SQL SELECT statements

use super::parser_core::{ParseError, ParseResult, Parser};
use super::parser_expressions::{parse_expression, parse_expression_from};
use crate::query::parser::ast::*;
use crate::query::parser::lexer::TokenType;

/// Parse a SELECT statement
pub fn parse_select(parser: &mut Parser) -> ParseResult<Statement> {
    parser.expect_token(TokenType::SELECT)?;

    let columns = parse_select_columns(parser)?;

    // Every query reads from at least one table
    if parser.current_token_is(TokenType::EOF) || parser.current_token_is(TokenType::SEMICOLON) {
        return Err(ParseError::InvalidSyntax("SELECT requires a FROM clause".to_string()));
    }
    parser.expect_token(TokenType::FROM)?;
    let from = parse_table_references(parser)?;

    let mut joins = Vec::new();
    while parser.current_token_is(TokenType::JOIN)
        || parser.current_token_is(TokenType::INNER)
        || parser.current_token_is(TokenType::LEFT)
        || parser.current_token_is(TokenType::CROSS)
    {
        joins.push(parse_join_clause(parser)?);
    }

    let where_clause = if parser.consume_if(TokenType::WHERE) {
        Some(Box::new(parse_expression(parser, 0)?))
    } else {
        None
    };

    let group_by = if parser.consume_if(TokenType::GROUP) {
        parser.expect_token(TokenType::BY)?;
        parse_expression_list(parser)?
    } else {
        Vec::new()
    };

    let having = if parser.consume_if(TokenType::HAVING) {
        Some(Box::new(parse_expression(parser, 0)?))
    } else {
        None
    };

    let order_by = if parser.current_token_is(TokenType::ORDER) {
        parse_order_by_clause(parser)?
    } else {
        Vec::new()
    };

    let limit = if parser.consume_if(TokenType::LIMIT) {
        Some(parser.parse_count()?)
    } else {
        None
    };

    let offset = if parser.consume_if(TokenType::OFFSET) {
        Some(parser.parse_count()?)
    } else {
        None
    };

    Ok(Statement::Select(SelectStatement {
        columns,
        from,
        joins,
        where_clause,
        group_by,
        having,
        order_by,
        limit,
        offset,
    }))
}

/// Parse SELECT column list
fn parse_select_columns(parser: &mut Parser) -> ParseResult<Vec<SelectColumn>> {
    let mut columns = Vec::new();

    loop {
        columns.push(parse_select_column(parser)?);

        if !parser.consume_if(TokenType::COMMA) {
            break;
        }
    }

    Ok(columns)
}

/// Parse one entry of the SELECT list
fn parse_select_column(parser: &mut Parser) -> ParseResult<SelectColumn> {
    if parser.consume_if(TokenType::ASTERISK) {
        return Ok(SelectColumn::Wildcard);
    }

    // `t.*` needs two tokens of lookahead, so qualified names are handled here
    let expr = if matches!(parser.current_token_type(), Some(TokenType::IDENTIFIER(_)))
        && parser.peek_token_is(TokenType::DOT)
    {
        let table = parser.parse_identifier()?;
        parser.expect_token(TokenType::DOT)?;
        if parser.consume_if(TokenType::ASTERISK) {
            return Ok(SelectColumn::QualifiedWildcard(table));
        }
        let name = parser.parse_identifier()?;
        let column = Expression::Column(ColumnReference { table: Some(table), name });
        parse_expression_from(parser, column, 0)?
    } else {
        parse_expression(parser, 0)?
    };

    let alias = parse_optional_alias(parser)?;

    Ok(match (expr, alias) {
        (Expression::Column(col_ref), None) => SelectColumn::Column(col_ref),
        (expr, alias) => SelectColumn::Expression {
            expr: Box::new(expr),
            alias,
        },
    })
}

/// Parse table references (FROM clause)
fn parse_table_references(parser: &mut Parser) -> ParseResult<Vec<TableReference>> {
    let mut tables = Vec::new();

    loop {
        tables.push(parse_table_reference(parser)?);

        if !parser.consume_if(TokenType::COMMA) {
            break;
        }
    }

    Ok(tables)
}

/// Parse a single table reference with an optional alias
fn parse_table_reference(parser: &mut Parser) -> ParseResult<TableReference> {
    let name = parser.parse_identifier()?;
    let alias = parse_optional_alias(parser)?;
    Ok(TableReference { name, alias })
}

/// Parse a JOIN clause
fn parse_join_clause(parser: &mut Parser) -> ParseResult<JoinClause> {
    let join_type = parse_join_type(parser)?;
    let table = parse_table_reference(parser)?;

    let condition = if join_type == JoinType::Cross {
        None
    } else {
        parser.expect_token(TokenType::ON)?;
        Some(parse_expression(parser, 0)?)
    };

    Ok(JoinClause {
        join_type,
        table,
        condition,
    })
}

/// Parse the type of JOIN
fn parse_join_type(parser: &mut Parser) -> ParseResult<JoinType> {
    let join_type = match parser.current_token_type() {
        // Plain JOIN means INNER JOIN
        Some(TokenType::JOIN) => JoinType::Inner,
        Some(TokenType::INNER) => {
            parser.next_token();
            JoinType::Inner
        }
        Some(TokenType::LEFT) => {
            parser.next_token();
            // OUTER is optional in LEFT OUTER JOIN
            parser.consume_if(TokenType::OUTER);
            JoinType::LeftOuter
        }
        Some(TokenType::CROSS) => {
            parser.next_token();
            JoinType::Cross
        }
        _ => return Err(parser.unexpected()),
    };

    parser.expect_token(TokenType::JOIN)?;
    Ok(join_type)
}

/// Parse a comma separated list of expressions
fn parse_expression_list(parser: &mut Parser) -> ParseResult<Vec<Expression>> {
    let mut expressions = Vec::new();

    loop {
        expressions.push(parse_expression(parser, 0)?);

        if !parser.consume_if(TokenType::COMMA) {
            break;
        }
    }

    Ok(expressions)
}

/// Parse an optional alias, with or without the AS keyword
fn parse_optional_alias(parser: &mut Parser) -> ParseResult<Option<String>> {
    if parser.consume_if(TokenType::AS) {
        return match parser.current_token.clone() {
            Some(token) => match token.token_type {
                TokenType::IDENTIFIER(name) => {
                    parser.next_token();
                    Ok(Some(name))
                }
                _ => Err(ParseError::ExpectedToken(
                    TokenType::IDENTIFIER("alias".to_string()),
                    token,
                )),
            },
            None => Err(ParseError::EndOfInput),
        };
    }

    // Clause keywords are lexed as keywords, so any bare identifier here is an alias
    if let Some(TokenType::IDENTIFIER(name)) = parser.current_token_type() {
        parser.next_token();
        return Ok(Some(name));
    }

    Ok(None)
}

/// Parse an ORDER BY clause
fn parse_order_by_clause(parser: &mut Parser) -> ParseResult<Vec<OrderByItem>> {
    parser.expect_token(TokenType::ORDER)?;
    parser.expect_token(TokenType::BY)?;

    let mut items = Vec::new();

    loop {
        let expr = parse_expression(parser, 0)?;
        let descending = if parser.consume_if(TokenType::DESC) {
            true
        } else {
            parser.consume_if(TokenType::ASC);
            false
        };

        items.push(OrderByItem { expr, descending });

        if !parser.consume_if(TokenType::COMMA) {
            break;
        }
    }

    Ok(items)
}
