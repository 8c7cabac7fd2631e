//! # Engine Module
//!
//! The algorithms that operate on a result table, together with the supporting machinery that
//! lets a host drive them safely.
//!
//! ## Architecture
//!
//! - **Filtering** ([`filter`]) - Compound OR-of-AND predicates over objective values with an
//!   explicit equality policy
//! - **Clustering** ([`clustering`]) - Greedy, order-dependent RMSD clustering behind the
//!   [`clustering::RmsdMetric`] trait, with a Kabsch-based default metric
//! - **History** ([`history`]) - Bounded undo stack of deep snapshots plus a load-time baseline
//! - **Observers** ([`observer`]) - Begin/end notifications around every table mutation
//! - **Progress Monitoring** ([`progress`]) - Progress events and cooperative cancellation
//! - **Configuration** ([`config`]) - Validated parameters for clustering, filtering and output
//! - **Error Handling** ([`error`]) - Engine-specific error types and error propagation
//!
//! None of these types touch global state. The [`crate::workflows::session::Session`] wires
//! them together for a single loaded file.

pub mod clustering;
pub mod config;
pub mod error;
pub mod filter;
pub mod history;
pub mod observer;
pub mod progress;
