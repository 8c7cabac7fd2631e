use super::{Structure, StructureRole};
use crate::core::io::mol2::{self, Mol2Error};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Structure archive not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("No loaded results file lists the key '{0}'")]
    UnknownKey(String),
    #[error("Invalid structure archive: {0}")]
    Archive(#[from] ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to read structure '{entry}': {source}")]
    Mol2 { entry: String, source: Mol2Error },
    #[error("Archive {} contains no .mol2 structures", .0.display())]
    NoStructures(PathBuf),
}

/// Resolves a solution key to the 3D structures that belong to it.
pub trait StructureLoader {
    fn load(&self, key: &str) -> Result<Vec<Structure>, LoaderError>;

    /// Makes the keys of a newly loaded results file resolvable.
    ///
    /// `origin` is the results file the keys were read from. Loaders that do not depend on
    /// where a key came from can ignore this.
    fn register(&mut self, _origin: &Path, _keys: Vec<String>) {}
}

#[derive(Debug, Clone)]
struct ArchiveSource {
    base_dir: PathBuf,
    keys: HashSet<String>,
}

/// Reads the zip archive GAUDI writes for each solution.
///
/// Each registered results file contributes its directory and its keys. A key resolves to the
/// archive `<dir>/<key>`, or `<dir>/<key>.zip` when the key carries no extension. Every
/// `.mol2` entry of the archive becomes one [`Structure`], named `<Role>_<archive stem>`.
#[derive(Debug, Clone, Default)]
pub struct ArchiveLoader {
    sources: Vec<ArchiveSource>,
}

impl ArchiveLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(
        &mut self,
        base_dir: impl Into<PathBuf>,
        keys: impl IntoIterator<Item = String>,
    ) {
        self.sources.push(ArchiveSource {
            base_dir: base_dir.into(),
            keys: keys.into_iter().collect(),
        });
    }

    fn locate(&self, key: &str) -> Result<PathBuf, LoaderError> {
        let source = self
            .sources
            .iter()
            .find(|s| s.keys.contains(key))
            .ok_or_else(|| LoaderError::UnknownKey(key.to_string()))?;

        let direct = source.base_dir.join(key);
        if direct.is_file() {
            return Ok(direct);
        }
        let zipped = source.base_dir.join(format!("{}.zip", key));
        if zipped.is_file() {
            return Ok(zipped);
        }
        Err(LoaderError::NotFound(direct))
    }

    /// Parses every `.mol2` entry of the archive at `path`, in archive order.
    pub fn read_archive(path: &Path) -> Result<Vec<Structure>, LoaderError> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let mut structures = Vec::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() || !entry.name().ends_with(".mol2") {
                continue;
            }
            let entry_name = entry.name().to_string();
            let atoms = mol2::read_atoms(BufReader::new(&mut entry)).map_err(|source| {
                LoaderError::Mol2 {
                    entry: entry_name.clone(),
                    source,
                }
            })?;
            let role = StructureRole::from_entry_name(&entry_name);
            structures.push(Structure::new(
                format!("{}_{}", role, stem),
                role,
                atoms.into_iter().map(|a| a.position).collect(),
            ));
        }

        if structures.is_empty() {
            return Err(LoaderError::NoStructures(path.to_path_buf()));
        }
        Ok(structures)
    }
}

impl StructureLoader for ArchiveLoader {
    fn load(&self, key: &str) -> Result<Vec<Structure>, LoaderError> {
        let path = self.locate(key)?;
        debug!(key, path = %path.display(), "Reading structure archive");
        Self::read_archive(&path)
    }

    fn register(&mut self, origin: &Path, keys: Vec<String>) {
        let base_dir = origin
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        self.add_source(base_dir, keys);
    }
}
