use crate::core::models::result_set::ResultSet;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing result table formats.
///
/// Implementors handle format-specific parsing and serialization; the path-based helpers
/// only add buffered file handling on top.
pub trait ResultsFile {
    /// Format-specific knobs that control serialization.
    type Options: Default;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a complete result table from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed or incomplete. No partial table is ever
    /// returned.
    fn read_from(reader: &mut impl BufRead) -> Result<ResultSet, Self::Error>;

    /// Writes a result table to a writer.
    fn write_to(
        results: &ResultSet,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes a result table using the format's default options.
    fn write_results_to(results: &ResultSet, writer: &mut impl Write) -> Result<(), Self::Error> {
        Self::write_to(results, &Self::Options::default(), writer)
    }

    /// Reads a result table from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<ResultSet, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes a result table to a file path, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        results: &ResultSet,
        options: &Self::Options,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(results, options, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
