// Query Processing Module
//
// This module contains components for SQL parsing, query planning and execution.

pub mod executor;
pub mod parser;
pub mod planner;

// Export key public interfaces
pub use executor::engine::ExecutionEngine;
pub use executor::result::{QueryError, QueryResult, QueryResultSet};
pub use parser::{parse_script, parse_sql, Parser};
