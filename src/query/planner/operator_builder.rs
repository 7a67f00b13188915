// Operator Builder
//
// This module builds executable operator trees from physical plans.
// Scans borrow table rows straight from the catalog, so an operator tree
// lives no longer than the catalog borrow it was built from.

use crate::catalog::Catalog;
use crate::query::executor::operators::{
    create_filter, create_hash_aggregate, create_hash_join, create_limit, create_nested_loop_join,
    create_projection, create_sort, create_table_scan, BoxedOperator,
};
use crate::query::executor::result::QueryResult;
use crate::query::parser::ast::JoinType;
use crate::query::planner::physical::PhysicalPlan;

/// Converts a JoinType to the is_left_join boolean flag expected by operators
fn join_type_to_is_left_join(join_type: &JoinType) -> bool {
    matches!(join_type, JoinType::LeftOuter)
}

/// Builds executable operator trees from physical plans
pub struct OperatorBuilder<'a> {
    /// Catalog the scans read from
    catalog: &'a Catalog,
}

impl<'a> OperatorBuilder<'a> {
    /// Create a new operator builder
    pub fn new(catalog: &'a Catalog) -> Self {
        OperatorBuilder { catalog }
    }

    /// Build an operator tree from a physical plan
    pub fn build_operator_tree(&self, plan: &PhysicalPlan) -> QueryResult<BoxedOperator<'a>> {
        Ok(match plan {
            PhysicalPlan::SeqScan { table_name, qualifier, .. } => {
                let table = self.catalog.table(table_name)?;
                create_table_scan(table, qualifier)
            }

            PhysicalPlan::Filter { input, predicate } => {
                create_filter(self.build_operator_tree(input)?, predicate.clone())
            }

            PhysicalPlan::Project { input, columns } => {
                create_projection(self.build_operator_tree(input)?, columns.clone())
            }

            PhysicalPlan::NestedLoopJoin { left, right, condition, join_type } => create_nested_loop_join(
                self.build_operator_tree(left)?,
                self.build_operator_tree(right)?,
                condition.clone(),
                join_type_to_is_left_join(join_type),
                right.output_columns(),
            ),

            PhysicalPlan::HashJoin { left, right, keys, residual, join_type } => create_hash_join(
                self.build_operator_tree(left)?,
                self.build_operator_tree(right)?,
                keys.clone(),
                residual.clone(),
                join_type_to_is_left_join(join_type),
                right.output_columns(),
            ),

            PhysicalPlan::HashAggregate { input, group_by, aggregates } => {
                create_hash_aggregate(self.build_operator_tree(input)?, group_by.clone(), aggregates.clone())
            }

            PhysicalPlan::Sort { input, order_by } => {
                create_sort(self.build_operator_tree(input)?, order_by.clone())
            }

            PhysicalPlan::Limit { input, limit, offset } => {
                create_limit(self.build_operator_tree(input)?, *limit, *offset)
            }
        })
    }
}
