// Expression Parser Implementation
//
// This module implements expression parsing for SQL

use super::parser_core::{
    get_operator_precedence, token_to_operator, ParseError, ParseResult, Parser,
    COMPARISON_PRECEDENCE, NOT_PRECEDENCE, UNARY_MINUS_PRECEDENCE,
};
use crate::query::parser::ast::*;
use crate::query::parser::lexer::TokenType;

/// Parse an expression with operator precedence
pub fn parse_expression(parser: &mut Parser, precedence: u8) -> ParseResult<Expression> {
    let left_expr = parse_prefix_expression(parser)?;
    parse_expression_from(parser, left_expr, precedence)
}

/// Continue parsing infix and postfix operators after an already parsed
/// left operand
pub fn parse_expression_from(parser: &mut Parser, mut left_expr: Expression, precedence: u8) -> ParseResult<Expression> {
    loop {
        // IS [NOT] NULL binds like a comparison
        if parser.current_token_is(TokenType::IS) && precedence < COMPARISON_PRECEDENCE {
            parser.next_token(); // Consume IS
            let not = parser.consume_if(TokenType::NOT);
            parser.expect_token(TokenType::NULL)?;
            left_expr = Expression::IsNull { expr: Box::new(left_expr), not };
            continue;
        }

        let current_op_precedence = match &parser.current_token {
            Some(token) => get_operator_precedence(&token.token_type),
            None => break,
        };

        if current_op_precedence == 0 || precedence >= current_op_precedence {
            break;
        }

        left_expr = parse_infix_expression(parser, left_expr)?;
    }

    Ok(left_expr)
}

/// Parse a prefix expression (literal, identifier, etc.)
fn parse_prefix_expression(parser: &mut Parser) -> ParseResult<Expression> {
    let token = match &parser.current_token {
        Some(token) => token.clone(),
        None => return Err(ParseError::EndOfInput),
    };

    match token.token_type {
        TokenType::MINUS => {
            parser.next_token(); // Consume MINUS
            let operand = parse_expression(parser, UNARY_MINUS_PRECEDENCE)?;
            Ok(Expression::UnaryOp {
                op: UnaryOperator::Minus,
                expr: Box::new(operand),
            })
        }
        TokenType::NOT => {
            parser.next_token(); // Consume NOT
            let operand = parse_expression(parser, NOT_PRECEDENCE)?;
            Ok(Expression::UnaryOp {
                op: UnaryOperator::Not,
                expr: Box::new(operand),
            })
        }
        TokenType::INTEGER(value) => {
            parser.next_token();
            Ok(Expression::Literal(Value::Integer(value)))
        }
        TokenType::FLOAT(value) => {
            parser.next_token();
            Ok(Expression::Literal(Value::Float(value)))
        }
        TokenType::STRING(value) => {
            parser.next_token();
            Ok(Expression::Literal(Value::String(value)))
        }
        TokenType::NULL => {
            parser.next_token();
            Ok(Expression::Literal(Value::Null))
        }
        TokenType::TRUE => {
            parser.next_token();
            Ok(Expression::Literal(Value::Boolean(true)))
        }
        TokenType::FALSE => {
            parser.next_token();
            Ok(Expression::Literal(Value::Boolean(false)))
        }
        TokenType::IDENTIFIER(name) => {
            if parser.peek_token_is(TokenType::LPAREN) {
                parse_function_call(parser, name)
            } else {
                parse_column_reference(parser)
            }
        }
        TokenType::LPAREN => {
            parser.next_token();
            let expr = parse_expression(parser, 0)?;
            parser.expect_token(TokenType::RPAREN)?;
            Ok(expr)
        }
        TokenType::CASE => parse_case_expression(parser),
        _ => Err(parser.unexpected()),
    }
}

/// Parse a CASE expression
fn parse_case_expression(parser: &mut Parser) -> ParseResult<Expression> {
    parser.expect_token(TokenType::CASE)?;

    // Simple CASE has an operand before the first WHEN
    let operand = if !parser.current_token_is(TokenType::WHEN) {
        Some(Box::new(parse_expression(parser, 0)?))
    } else {
        None
    };

    let mut when_then_clauses = Vec::new();
    while parser.consume_if(TokenType::WHEN) {
        let condition_expr = parse_expression(parser, 0)?;
        parser.expect_token(TokenType::THEN)?;
        let result_expr = parse_expression(parser, 0)?;
        when_then_clauses.push((Box::new(condition_expr), Box::new(result_expr)));
    }

    if when_then_clauses.is_empty() {
        return Err(ParseError::InvalidSyntax(
            "CASE expression must have at least one WHEN clause".to_string(),
        ));
    }

    let else_clause = if parser.consume_if(TokenType::ELSE) {
        Some(Box::new(parse_expression(parser, 0)?))
    } else {
        None
    };

    parser.expect_token(TokenType::END)?;

    Ok(Expression::Case {
        operand,
        when_then_clauses,
        else_clause,
    })
}

/// Parse an infix expression (binary operations)
fn parse_infix_expression(parser: &mut Parser, left: Expression) -> ParseResult<Expression> {
    let op_token_type = parser.current_token_type().ok_or(ParseError::EndOfInput)?;
    let op_precedence = get_operator_precedence(&op_token_type);
    let op = token_to_operator(&op_token_type)?;

    parser.next_token(); // Consume the operator token

    let right = parse_expression(parser, op_precedence)?;

    Ok(Expression::BinaryOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}

/// Parse a column reference (possibly qualified with table name)
fn parse_column_reference(parser: &mut Parser) -> ParseResult<Expression> {
    let name = parser.parse_identifier()?;

    if parser.consume_if(TokenType::DOT) {
        let col_name = parser.parse_identifier()?;
        Ok(Expression::Column(ColumnReference {
            table: Some(name),
            name: col_name,
        }))
    } else {
        Ok(Expression::Column(ColumnReference { table: None, name }))
    }
}

/// Parse a function call. Only the aggregate functions are known.
fn parse_function_call(parser: &mut Parser, name: String) -> ParseResult<Expression> {
    let function = AggregateFunction::from_name(&name)
        .ok_or_else(|| ParseError::InvalidSyntax(format!("Unknown function: {}", name)))?;

    parser.next_token(); // Consume the function name
    parser.expect_token(TokenType::LPAREN)?;

    let arg = if parser.current_token_is(TokenType::ASTERISK) {
        if function != AggregateFunction::Count {
            return Err(ParseError::InvalidSyntax(format!("{}(*) is not allowed", function)));
        }
        parser.next_token();
        None
    } else {
        Some(Box::new(parse_expression(parser, 0)?))
    };

    parser.expect_token(TokenType::RPAREN)?;

    Ok(Expression::Aggregate { function, arg })
}
