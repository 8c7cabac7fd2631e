use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Mol2Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("No @<TRIPOS>ATOM records found")]
    NoAtoms,
}

/// A single atom record: its name and Cartesian position.
#[derive(Debug, Clone, PartialEq)]
pub struct Mol2Atom {
    pub name: String,
    pub position: Point3<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Atom,
}

/// Reads every atom record of a Tripos MOL2 file, in file order.
///
/// Only the `@<TRIPOS>ATOM` sections are interpreted; bonds and substructure records are
/// irrelevant for superposition and are skipped. Files holding several molecules yield the
/// atoms of all of them.
pub fn read_atoms<R: BufRead>(reader: R) -> Result<Vec<Mol2Atom>, Mol2Error> {
    let mut section = Section::None;
    let mut atoms = Vec::new();

    for (idx, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let line_number = idx + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(header) = trimmed.strip_prefix("@<TRIPOS>") {
            section = if header == "ATOM" {
                Section::Atom
            } else {
                Section::None
            };
            continue;
        }
        if section != Section::Atom {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() < 5 {
            return Err(Mol2Error::Parse {
                line: line_number,
                message: "ATOM record must include id, name and three coordinates".into(),
            });
        }
        let coordinate = |i: usize| {
            tokens[i].parse::<f64>().map_err(|_| Mol2Error::Parse {
                line: line_number,
                message: format!("invalid coordinate '{}'", tokens[i]),
            })
        };
        atoms.push(Mol2Atom {
            name: tokens[1].to_string(),
            position: Point3::new(coordinate(2)?, coordinate(3)?, coordinate(4)?),
        });
    }

    if atoms.is_empty() {
        return Err(Mol2Error::NoAtoms);
    }
    Ok(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LIGAND: &str = "\
@<TRIPOS>MOLECULE
LIG
 3 2 0 0 0
SMALL
USER_CHARGES

@<TRIPOS>ATOM
      1 C1          1.0000    2.0000    3.0000 C.3     1  LIG1        0.1000
      2 O1         -1.5000    0.0000    0.2500 O.3     1  LIG1       -0.4000
      3 H1          0.0000    0.0000    0.0000 H       1  LIG1        0.3000
@<TRIPOS>BOND
     1     1     2    1
     2     2     3    1
";

    #[test]
    fn reads_atom_names_and_positions_in_order() {
        let atoms = read_atoms(Cursor::new(LIGAND)).unwrap();

        assert_eq!(atoms.len(), 3);
        assert_eq!(atoms[0].name, "C1");
        assert_eq!(atoms[0].position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atoms[1].position, Point3::new(-1.5, 0.0, 0.25));
    }

    #[test]
    fn bond_records_are_not_read_as_atoms() {
        let atoms = read_atoms(Cursor::new(LIGAND)).unwrap();
        assert!(atoms.iter().all(|a| a.name != "1"));
    }

    #[test]
    fn file_without_atoms_is_rejected() {
        let text = "@<TRIPOS>MOLECULE\nEMPTY\n 0 0 0 0 0\n";
        assert!(matches!(read_atoms(Cursor::new(text)), Err(Mol2Error::NoAtoms)));
    }

    #[test]
    fn invalid_coordinate_reports_line_number() {
        let text = "@<TRIPOS>ATOM\n 1 C1 1.0 abc 3.0 C.3\n";
        match read_atoms(Cursor::new(text)) {
            Err(Mol2Error::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("abc"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
