//! 3D structures attached to solutions.
//!
//! A solution key resolves to one or more [`Structure`]s through a [`StructureLoader`]. The
//! bundled [`ArchiveLoader`] reads GAUDI's per-solution zip archives; hosts with their own
//! storage implement the trait themselves. Resolved structures are memoised per key in a
//! [`StructureCache`].

mod cache;
mod loader;

pub use cache::StructureCache;
pub use loader::{ArchiveLoader, LoaderError, StructureLoader};

use nalgebra::Point3;
use std::fmt;

/// Which part of the modelled system a structure file represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureRole {
    Protein,
    Metal,
    Ligand,
    Other,
}

impl StructureRole {
    /// Tags a structure by the first role name found in its file name.
    pub fn from_entry_name(entry: &str) -> Self {
        if entry.contains("Protein") {
            Self::Protein
        } else if entry.contains("Metal") {
            Self::Metal
        } else if entry.contains("Ligand") {
            Self::Ligand
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for StructureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Protein => "Protein",
            Self::Metal => "Metal",
            Self::Ligand => "Ligand",
            Self::Other => "Other",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    pub name: String,
    pub role: StructureRole,
    pub coords: Vec<Point3<f64>>,
}

impl Structure {
    pub fn new(name: impl Into<String>, role: StructureRole, coords: Vec<Point3<f64>>) -> Self {
        Self {
            name: name.into(),
            role,
            coords,
        }
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.coords.len()
    }
}
