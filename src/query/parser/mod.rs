// SQL Parser Module
//
// This module is responsible for parsing SQL queries and converting them
// into an abstract syntax tree (AST) representation.

pub mod ast;
pub mod components;
pub mod lexer;
pub mod parser;

// Export key types
pub use self::ast::Statement;
pub use self::lexer::{Lexer, Token};
pub use self::parser::{parse_script, parse_sql, ParseError, ParseResult, Parser};
