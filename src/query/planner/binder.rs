// Name Binding
//
// Resolves column references against the tables in a query's FROM clause.
// Bound references are canonical: qualified by the table's qualifier and
// spelled as in the schema, so `ColumnReference::key()` matches the row
// keys produced by table scans.

use crate::catalog::Table;
use crate::query::executor::result::{QueryError, QueryResult};
use crate::query::parser::ast::{ColumnReference, Expression, TableReference};

/// One table visible in a query
#[derive(Debug, Clone)]
pub struct ScopeTable {
    /// Alias, or the table name as written when there is no alias
    pub qualifier: String,
    /// Catalog name of the table
    pub table_name: String,
    /// Column names in schema order
    pub columns: Vec<String>,
}

impl ScopeTable {
    /// Row keys produced by a scan of this table
    pub fn keys(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| format!("{}.{}", self.qualifier, c))
            .collect()
    }

    fn column_ref(&self, column: &str) -> ColumnReference {
        ColumnReference {
            table: Some(self.qualifier.clone()),
            name: column.to_string(),
        }
    }

    fn find_column(&self, name: &str) -> Option<&String> {
        self.columns.iter().find(|c| c.eq_ignore_ascii_case(name))
    }
}

/// The set of tables a query can reference, in FROM/JOIN order
#[derive(Debug, Clone, Default)]
pub struct Scope {
    tables: Vec<ScopeTable>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    /// Add a table under the qualifier of its FROM clause reference
    pub fn add_table(&mut self, table: &Table, reference: &TableReference) -> QueryResult<&ScopeTable> {
        let qualifier = reference.qualifier();
        if self.lookup(qualifier).is_some() {
            return Err(QueryError::PlanningError(format!(
                "Table name or alias '{}' is specified more than once",
                qualifier
            )));
        }

        self.tables.push(ScopeTable {
            qualifier: qualifier.to_string(),
            table_name: table.name().to_string(),
            columns: table.column_names(),
        });

        self.tables
            .last()
            .ok_or_else(|| QueryError::PlanningError("empty scope".to_string()))
    }

    pub fn tables(&self) -> &[ScopeTable] {
        &self.tables
    }

    fn lookup(&self, qualifier: &str) -> Option<&ScopeTable> {
        self.tables
            .iter()
            .find(|t| t.qualifier.eq_ignore_ascii_case(qualifier))
    }

    /// Resolve a column reference to its canonical form
    pub fn resolve(&self, col_ref: &ColumnReference) -> QueryResult<ColumnReference> {
        match &col_ref.table {
            Some(qualifier) => {
                let table = self
                    .lookup(qualifier)
                    .ok_or_else(|| QueryError::ColumnNotFound(col_ref.key()))?;
                let column = table
                    .find_column(&col_ref.name)
                    .ok_or_else(|| QueryError::ColumnNotFound(col_ref.key()))?;
                Ok(table.column_ref(column))
            }
            None => {
                let mut matches = self
                    .tables
                    .iter()
                    .filter_map(|t| t.find_column(&col_ref.name).map(|c| t.column_ref(c)));

                match (matches.next(), matches.next()) {
                    (Some(resolved), None) => Ok(resolved),
                    (Some(_), Some(_)) => Err(QueryError::AmbiguousColumn(col_ref.name.clone())),
                    (None, _) => Err(QueryError::ColumnNotFound(col_ref.name.clone())),
                }
            }
        }
    }

    /// Bind every column reference inside an expression
    pub fn bind_expression(&self, expr: &Expression) -> QueryResult<Expression> {
        Ok(match expr {
            Expression::Literal(_) => expr.clone(),
            Expression::Column(col_ref) => Expression::Column(self.resolve(col_ref)?),
            Expression::BinaryOp { left, op, right } => Expression::BinaryOp {
                left: Box::new(self.bind_expression(left)?),
                op: *op,
                right: Box::new(self.bind_expression(right)?),
            },
            Expression::UnaryOp { op, expr } => Expression::UnaryOp {
                op: *op,
                expr: Box::new(self.bind_expression(expr)?),
            },
            Expression::Aggregate { function, arg } => Expression::Aggregate {
                function: *function,
                arg: match arg {
                    Some(arg) => Some(Box::new(self.bind_expression(arg)?)),
                    None => None,
                },
            },
            Expression::IsNull { expr, not } => Expression::IsNull {
                expr: Box::new(self.bind_expression(expr)?),
                not: *not,
            },
            Expression::Case { operand, when_then_clauses, else_clause } => Expression::Case {
                operand: match operand {
                    Some(operand) => Some(Box::new(self.bind_expression(operand)?)),
                    None => None,
                },
                when_then_clauses: when_then_clauses
                    .iter()
                    .map(|(w, t)| Ok((Box::new(self.bind_expression(w)?), Box::new(self.bind_expression(t)?))))
                    .collect::<QueryResult<Vec<_>>>()?,
                else_clause: match else_clause {
                    Some(e) => Some(Box::new(self.bind_expression(e)?)),
                    None => None,
                },
            },
        })
    }

    /// Expand `*` (no qualifier) or `t.*` into (column name, bound reference) pairs
    pub fn expand_wildcard(&self, qualifier: Option<&str>) -> QueryResult<Vec<(String, ColumnReference)>> {
        let tables: Vec<&ScopeTable> = match qualifier {
            Some(q) => vec![self
                .lookup(q)
                .ok_or_else(|| QueryError::TableNotFound(q.to_string()))?],
            None => self.tables.iter().collect(),
        };

        Ok(tables
            .into_iter()
            .flat_map(|t| t.columns.iter().map(move |c| (c.clone(), t.column_ref(c))))
            .collect())
    }
}
