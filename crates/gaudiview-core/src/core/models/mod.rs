//! Tabular model of a GAUDI result batch.
//!
//! A [`result_set::ResultSet`] holds the ordered [`objective::Objective`] schema and the
//! ordered [`solution::Solution`] rows. Its mutating primitives validate their inputs before
//! touching any row, so a failed call never leaves a partially edited table behind.

pub mod objective;
pub mod result_set;
pub mod solution;
