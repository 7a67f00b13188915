// Query Planner Module
//
// This module is responsible for translating parsed SELECT statements into
// executable query plans. It includes name binding, logical and physical
// planning, and building the operator tree.

pub mod binder;
pub mod logical;
pub mod operator_builder;
pub mod physical;

// Export key types
pub use self::binder::Scope;
pub use self::logical::{build_logical_plan, LogicalPlan};
pub use self::operator_builder::OperatorBuilder;
pub use self::physical::{create_physical_plan, PhysicalPlan};
