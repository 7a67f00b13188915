// TabulaDB: SQL over in-memory tables

pub mod catalog;
pub mod demo;
pub mod frame;
pub mod query;
pub mod session;

// Re-export key items for convenient access
pub use catalog::{Catalog, Column, ConflictPolicy, DataType};
pub use frame::{DataFrame, FrameError, Series};
pub use query::executor::engine::ExecutionEngine;
pub use query::executor::result::{DataValue, QueryError, QueryResult, QueryResultSet};
pub use query::parser::Parser;
pub use session::{Session, SessionConfig};
