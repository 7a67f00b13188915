// Query Executor Module
//
// This module is responsible for executing query plans and producing results.
// It implements the iterator-based execution model for query processing.

pub mod ddl_executor;
pub mod dml_executor;
pub mod engine;
pub mod expression_eval;
pub mod operators;
pub mod result;

// Export key types
pub use self::engine::ExecutionEngine;
pub use self::operators::Operator;
pub use self::result::{DataValue, QueryError, QueryResult, QueryResultSet, Row};
