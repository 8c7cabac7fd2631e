//! Reading and writing result tables and the structure files behind them.
//!
//! [`gaudi`] implements the GAUDI output format behind the [`traits::ResultsFile`] interface,
//! [`csv_export`] writes a flat table for spreadsheets, and [`mol2`] extracts atom
//! coordinates from the structure files stored in each solution archive.

pub mod csv_export;
pub mod gaudi;
pub mod mol2;
pub mod traits;
