use super::{LoaderError, Structure, StructureLoader};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

/// Memoises resolved structures per solution key.
///
/// Entries are added on first successful resolution and never evicted. Failed resolutions are
/// not cached, so a later call retries the loader.
#[derive(Debug, Default)]
pub struct StructureCache {
    entries: HashMap<String, Vec<Structure>>,
}

impl StructureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &mut self,
        key: &str,
        loader: &dyn StructureLoader,
    ) -> Result<&[Structure], LoaderError> {
        let structures: &Vec<Structure> = match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(slot) => {
                let loaded = loader.load(key)?;
                debug!(key, count = loaded.len(), "Cached structures for solution");
                slot.insert(loaded)
            }
        };
        Ok(structures.as_slice())
    }

    pub fn get(&self, key: &str) -> Option<&[Structure]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::structure::StructureRole;
    use nalgebra::Point3;
    use std::cell::Cell;

    struct CountingLoader {
        calls: Cell<usize>,
    }

    impl StructureLoader for CountingLoader {
        fn load(&self, key: &str) -> Result<Vec<Structure>, LoaderError> {
            self.calls.set(self.calls.get() + 1);
            if key == "missing" {
                return Err(LoaderError::UnknownKey(key.to_string()));
            }
            Ok(vec![Structure::new(
                format!("Ligand_{}", key),
                StructureRole::Ligand,
                vec![Point3::origin()],
            )])
        }
    }

    #[test]
    fn loader_is_called_once_per_key() {
        let loader = CountingLoader { calls: Cell::new(0) };
        let mut cache = StructureCache::new();

        assert_eq!(cache.get_or_load("a", &loader).unwrap()[0].name, "Ligand_a");
        assert_eq!(cache.get_or_load("a", &loader).unwrap().len(), 1);
        assert_eq!(loader.calls.get(), 1);

        cache.get_or_load("b", &loader).unwrap();
        assert_eq!(loader.calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let loader = CountingLoader { calls: Cell::new(0) };
        let mut cache = StructureCache::new();

        assert!(cache.get_or_load("missing", &loader).is_err());
        assert!(cache.get_or_load("missing", &loader).is_err());
        assert_eq!(loader.calls.get(), 2);
        assert!(!cache.contains("missing"));
        assert!(cache.is_empty());
    }

    #[test]
    fn get_returns_only_resolved_entries() {
        let loader = CountingLoader { calls: Cell::new(0) };
        let mut cache = StructureCache::new();
        assert!(cache.get("a").is_none());
        cache.get_or_load("a", &loader).unwrap();
        assert_eq!(cache.get("a").map(<[Structure]>::len), Some(1));
    }
}
