use crate::core::models::result_set::ResultSet;
use std::io::Write;
use std::path::Path;

/// Writes the table as CSV: the header row followed by one record per solution.
///
/// The cluster column, when present, is written as the last field.
pub fn write_csv<W: Write>(results: &ResultSet, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(results.header())?;

    for row in results.rows() {
        let mut record = Vec::with_capacity(row.values.len() + 2);
        record.push(row.key.clone());
        record.extend(row.values.iter().map(f64::to_string));
        if results.has_cluster_column() {
            record.push(row.cluster.map(|c| c.to_string()).unwrap_or_default());
        }
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_to_path<P: AsRef<Path>>(results: &ResultSet, path: P) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    write_csv(results, std::io::BufWriter::new(file))
}
