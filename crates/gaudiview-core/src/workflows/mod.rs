//! # Workflows Module
//!
//! The top-level entry point for users of GaudiView.
//!
//! A [`session::Session`] owns one loaded result table together with everything that must
//! stay consistent with it: the undo history, the registered mutation observers, the
//! structure cache and the structure loader. Every mutating call follows the same protocol:
//! snapshot the table into the history, notify observers that a mutation starts, run the
//! operation, and notify them that it finished, whether it succeeded or not.

pub mod session;
