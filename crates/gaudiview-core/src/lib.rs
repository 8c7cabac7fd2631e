//! # GaudiView Core Library
//!
//! Inspect, filter and structurally cluster the solutions produced by a GAUDI multi-objective
//! optimization run. Each solution is identified by a key, carries one numeric score per
//! objective, and owns a zip archive of 3D structures that is only read when clustering needs it.
//!
//! ## Architectural Philosophy
//!
//! The library mirrors a three-layer split so that the data model stays independent of the
//! algorithms that operate on it:
//!
//! - **[`core`]: The Foundation.** The tabular result model (`ResultSet`, `Solution`,
//!   `Objective`), the GAUDI output reader/writer, the structure loader abstraction and the
//!   superposition geometry.
//!
//! - **[`engine`]: The Logic Core.** The compound filter evaluator, the greedy RMSD clustering
//!   pass, the bounded undo history, mutation observers, progress reporting and cancellation.
//!
//! - **[`workflows`]: The Public API.** A `Session` ties a loaded result set to its history,
//!   observers and structure cache, and guards every mutation with a history push and a
//!   begin/end notification pair.

pub mod core;
pub mod engine;
pub mod workflows;
