use crate::cli::InfoArgs;
use crate::error::Result;
use gaudiview::workflows::session::Session;
use std::collections::BTreeMap;
use std::fmt::Write;

pub fn run(args: InfoArgs) -> Result<()> {
    let session = super::open_session(&args.input)?;
    print!("{}", summarize(&session));
    Ok(())
}

pub fn summarize(session: &Session) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Preamble:   {}", session.preamble());
    let _ = writeln!(out, "Solutions:  {}", session.rows().len());
    let _ = writeln!(out, "Objectives:");
    for objective in session.objectives() {
        match &objective.unit {
            Some(unit) => {
                let _ = writeln!(out, "  - {} ({})", objective.name, unit);
            }
            None => {
                let _ = writeln!(out, "  - {}", objective.name);
            }
        }
    }

    if !session.results().has_cluster_column() {
        let _ = writeln!(out, "Clusters:   none");
        return out;
    }

    let mut sizes: BTreeMap<u32, usize> = BTreeMap::new();
    for (_, id) in session.cluster_assignments() {
        *sizes.entry(id).or_default() += 1;
    }
    let _ = writeln!(out, "Clusters:   {}", sizes.len());
    for (id, size) in &sizes {
        let _ = writeln!(
            out,
            "  #{:<4} {} solution{}",
            id,
            size,
            if *size == 1 { "" } else { "s" }
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{RESULTS, write_results};
    use crate::commands::open_session;
    use tempfile::tempdir;

    #[test]
    fn summary_lists_objectives_and_row_count() {
        let dir = tempdir().unwrap();
        let path = write_results(dir.path(), "run.gaudi-output", RESULTS);
        let session = open_session(&path).unwrap();

        let summary = summarize(&session);
        assert!(summary.contains("Solutions:  3"));
        assert!(summary.contains("  - Score (kcal/mol)"));
        assert!(summary.contains("  - Energy (kJ)"));
        assert!(summary.contains("Clusters:   none"));
    }

    #[test]
    fn summary_counts_cluster_members() {
        let dir = tempdir().unwrap();
        let clustered = "\
# Generated by GAUDI on 2019-05-13
GAUDI.objectives:
- Score (kcal/mol)
- Cluster (id)
GAUDI.results:
  A: [-5.0, 1]
  B: [-7.2, 1]
  C: [-3.0, 2]
";
        let path = write_results(dir.path(), "clustered.gaudi-output", clustered);
        let session = open_session(&path).unwrap();

        let summary = summarize(&session);
        assert!(summary.contains("Clusters:   2"));
        assert!(summary.contains("#1    2 solutions"));
        assert!(summary.contains("#2    1 solution\n"));
    }
}
