//! # Core Module
//!
//! The data foundation of GaudiView: everything needed to represent a batch of GAUDI
//! solutions in memory and to move it between disk and the engine.
//!
//! ## Architecture
//!
//! - **Result Model** ([`models`]) - Objectives, solutions and the ordered result table
//! - **File I/O** ([`io`]) - The GAUDI output format, CSV export and MOL2 coordinate reading
//! - **Structures** ([`structure`]) - Lazily resolved 3D structures behind a loader trait
//! - **Geometry** ([`utils`]) - Optimal rigid superposition and RMSD
//!
//! Nothing in this module keeps global state; callers own every value they create.

pub mod io;
pub mod models;
pub mod structure;
pub mod utils;
