// SQL Abstract Syntax Tree (AST) Implementation
//
// This module defines the AST nodes for representing parsed SQL queries.

use std::fmt;

use crate::catalog::schema::DataType;

/// Represents a SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Create(CreateStatement),
    Drop(DropStatement),
}

/// SELECT statement representation
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Columns in SELECT clause
    pub columns: Vec<SelectColumn>,
    /// FROM clause table references (comma separated)
    pub from: Vec<TableReference>,
    /// Explicit JOIN clauses following the FROM list
    pub joins: Vec<JoinClause>,
    /// WHERE clause (optional)
    pub where_clause: Option<Box<Expression>>,
    /// GROUP BY expressions (empty when absent)
    pub group_by: Vec<Expression>,
    /// HAVING clause (optional)
    pub having: Option<Box<Expression>>,
    /// ORDER BY items
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Column in a SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub enum SelectColumn {
    /// All columns (*)
    Wildcard,
    /// All columns of one table (t.*)
    QualifiedWildcard(String),
    /// Regular column reference
    Column(ColumnReference),
    /// Expression with optional alias
    Expression {
        expr: Box<Expression>,
        alias: Option<String>,
    },
}

/// Column reference (could be qualified with table name)
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnReference {
    pub table: Option<String>,
    pub name: String,
}

impl ColumnReference {
    /// Key under which the referenced value is stored in a row
    pub fn key(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table, self.name),
            None => self.name.clone(),
        }
    }
}

/// Table reference in FROM clause
#[derive(Debug, Clone, PartialEq)]
pub struct TableReference {
    pub name: String,
    pub alias: Option<String>,
}

impl TableReference {
    /// Name the table's columns are qualified with inside the query
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Supported join kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
    Cross,
}

/// JOIN clause
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub join_type: JoinType,
    pub table: TableReference,
    pub condition: Option<Expression>,
}

/// ORDER BY item
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expression,
    pub descending: bool,
}

/// Aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    /// Look up an aggregate by its SQL name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "COUNT" => Some(AggregateFunction::Count),
            "SUM" => Some(AggregateFunction::Sum),
            "AVG" | "MEAN" => Some(AggregateFunction::Avg),
            "MIN" => Some(AggregateFunction::Min),
            "MAX" => Some(AggregateFunction::Max),
            _ => None,
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        };
        write!(f, "{}", name)
    }
}

/// Expression in SQL
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value
    Literal(Value),
    /// Column reference
    Column(ColumnReference),
    /// Binary operation (e.g., a + b, x = y)
    BinaryOp {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
    },
    /// Unary operation (-x, NOT x)
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expression>,
    },
    /// Aggregate call; `arg` is None for COUNT(*)
    Aggregate {
        function: AggregateFunction,
        arg: Option<Box<Expression>>,
    },
    /// expr IS [NOT] NULL
    IsNull {
        expr: Box<Expression>,
        not: bool,
    },
    /// CASE [operand] WHEN .. THEN .. [ELSE ..] END
    Case {
        operand: Option<Box<Expression>>,
        when_then_clauses: Vec<(Box<Expression>, Box<Expression>)>,
        else_clause: Option<Box<Expression>>,
    },
}

impl Expression {
    /// Whether an aggregate call appears anywhere in this expression
    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expression::Aggregate { .. } => true,
            Expression::Literal(_) | Expression::Column(_) => false,
            Expression::BinaryOp { left, right, .. } => {
                left.contains_aggregate() || right.contains_aggregate()
            }
            Expression::UnaryOp { expr, .. } | Expression::IsNull { expr, .. } => {
                expr.contains_aggregate()
            }
            Expression::Case { operand, when_then_clauses, else_clause } => {
                operand.as_ref().is_some_and(|e| e.contains_aggregate())
                    || when_then_clauses
                        .iter()
                        .any(|(w, t)| w.contains_aggregate() || t.contains_aggregate())
                    || else_clause.as_ref().is_some_and(|e| e.contains_aggregate())
            }
        }
    }
}

/// SQL values
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

/// SQL binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    // Comparison
    Equals,
    NotEquals,
    LessThan,
    GreaterThan,
    LessEquals,
    GreaterEquals,
    // Logical
    And,
    Or,
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

impl Operator {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Equals
                | Operator::NotEquals
                | Operator::LessThan
                | Operator::GreaterThan
                | Operator::LessEquals
                | Operator::GreaterEquals
        )
    }
}

/// SQL unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Not,
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateStatement {
    pub table_name: String,
    pub columns: Vec<ColumnDef>,
    pub if_not_exists: bool,
}

/// Column definition for CREATE TABLE
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub primary_key: bool,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table_name: String,
    /// Explicit column list, if given
    pub columns: Option<Vec<String>>,
    pub values: Vec<Vec<Expression>>,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropStatement {
    pub table_name: String,
    pub if_exists: bool,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(_) => write!(f, "SELECT statement"),
            Statement::Insert(stmt) => write!(f, "INSERT INTO {}", stmt.table_name),
            Statement::Create(stmt) => write!(f, "CREATE TABLE {}", stmt.table_name),
            Statement::Drop(stmt) => write!(f, "DROP TABLE {}", stmt.table_name),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Equals => "=",
            Operator::NotEquals => "<>",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessEquals => "<=",
            Operator::GreaterEquals => ">=",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
        };
        write!(f, "{}", symbol)
    }
}

/// Write an operand, parenthesized when it is itself a binary operation
fn fmt_operand(expr: &Expression, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match expr {
        Expression::BinaryOp { .. } => write!(f, "({})", expr),
        _ => write!(f, "{}", expr),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Column(col) => write!(f, "{}", col.key()),
            Expression::BinaryOp { left, op, right } => {
                fmt_operand(left, f)?;
                write!(f, " {} ", op)?;
                fmt_operand(right, f)
            }
            Expression::UnaryOp { op: UnaryOperator::Minus, expr } => {
                write!(f, "-")?;
                fmt_operand(expr, f)
            }
            Expression::UnaryOp { op: UnaryOperator::Not, expr } => {
                write!(f, "NOT ")?;
                fmt_operand(expr, f)
            }
            Expression::Aggregate { function, arg: None } => write!(f, "{}(*)", function),
            Expression::Aggregate { function, arg: Some(arg) } => write!(f, "{}({})", function, arg),
            Expression::IsNull { expr, not } => {
                fmt_operand(expr, f)?;
                write!(f, " IS {}NULL", if *not { "NOT " } else { "" })
            }
            Expression::Case { operand, when_then_clauses, else_clause } => {
                write!(f, "CASE")?;
                if let Some(operand) = operand {
                    write!(f, " {}", operand)?;
                }
                for (when, then) in when_then_clauses {
                    write!(f, " WHEN {} THEN {}", when, then)?;
                }
                if let Some(else_expr) = else_clause {
                    write!(f, " ELSE {}", else_expr)?;
                }
                write!(f, " END")
            }
        }
    }
}
