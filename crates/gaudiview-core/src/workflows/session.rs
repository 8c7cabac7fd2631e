use crate::core::io::csv_export::write_csv_to_path;
use crate::core::io::gaudi::{GaudiOutputFile, GaudiWriteOptions};
use crate::core::io::traits::ResultsFile;
use crate::core::models::objective::{CLUSTER_COLUMN, Objective};
use crate::core::models::result_set::{KEY_COLUMN, ResultSet, SortColumn};
use crate::core::models::solution::Solution;
use crate::core::structure::{ArchiveLoader, StructureCache, StructureLoader};
use crate::engine::clustering::{ClusteringEngine, KabschRmsd, RmsdMetric, SkippedSolution};
use crate::engine::config::{ClusteringConfig, FilterConfig, OutputConfig};
use crate::engine::error::EngineError;
use crate::engine::filter::{FilterEngine, FilterSpec};
use crate::engine::history::UndoHistory;
use crate::engine::observer::{MutationKind, MutationObserver, ObserverRegistry};
use crate::engine::progress::{CancellationToken, ProgressReporter};
use std::path::Path;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterReport {
    pub cluster_count: usize,
    pub representatives: Vec<String>,
    pub skipped: Vec<SkippedSolution>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClusterOutcome {
    Committed(ClusterReport),
    /// The pass was cancelled and the table is exactly as it was before it started.
    Cancelled,
}

/// One loaded result table and the state that travels with it.
pub struct Session {
    results: ResultSet,
    history: UndoHistory,
    observers: ObserverRegistry,
    cache: StructureCache,
    loader: Box<dyn StructureLoader>,
}

impl Session {
    /// Loads a GAUDI output file and resolves structures from the archives beside it.
    #[instrument(skip_all, name = "session_open", fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let results = GaudiOutputFile::read_from_path(path)?;

        let mut loader = ArchiveLoader::new();
        loader.register(path, results.keys().map(str::to_string).collect());

        info!(
            rows = results.len(),
            objectives = results.objectives().len(),
            clustered = results.has_cluster_column(),
            "Loaded results file."
        );
        Ok(Self::new(results, Box::new(loader)))
    }

    /// Wraps an already loaded table. Its current state becomes the reset baseline.
    pub fn new(results: ResultSet, loader: Box<dyn StructureLoader>) -> Self {
        Self {
            history: UndoHistory::new(&results),
            results,
            observers: ObserverRegistry::new(),
            cache: StructureCache::new(),
            loader,
        }
    }

    pub fn register_observer(&mut self, observer: Box<dyn MutationObserver>) {
        self.observers.register(observer);
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn into_results(self) -> ResultSet {
        self.results
    }

    pub fn rows(&self) -> &[Solution] {
        self.results.rows()
    }

    pub fn objectives(&self) -> &[Objective] {
        self.results.objectives()
    }

    pub fn header(&self) -> Vec<String> {
        self.results.header()
    }

    pub fn preamble(&self) -> &str {
        self.results.preamble()
    }

    pub fn row_by_key(&self, key: &str) -> Option<&Solution> {
        self.results.row_by_key(key)
    }

    pub fn objective_index(&self, name: &str) -> Option<usize> {
        self.results.objective_index(name)
    }

    pub fn cluster_assignments(&self) -> Vec<(&str, u32)> {
        self.results.cluster_assignments()
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    pub fn cache(&self) -> &StructureCache {
        &self.cache
    }

    /// Maps a header label to a sort column.
    pub fn sort_column(&self, name: &str) -> Result<SortColumn, EngineError> {
        match name {
            KEY_COLUMN => Ok(SortColumn::Key),
            CLUSTER_COLUMN => Ok(SortColumn::Cluster),
            _ => self
                .results
                .objective_index(name)
                .map(SortColumn::Objective)
                .ok_or_else(|| EngineError::InvalidOperation(format!("unknown column '{}'", name))),
        }
    }

    fn mutate<T>(
        &mut self,
        kind: MutationKind,
        op: impl FnOnce(&mut ResultSet) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        self.history.push(&self.results);
        self.observers.begin(kind);
        let outcome = op(&mut self.results);
        self.observers.end(kind);
        outcome
    }

    /// Appends the rows of another table with the same objective schema.
    ///
    /// When `origin` names the file `other` was read from, its keys become resolvable by the
    /// structure loader.
    #[instrument(skip_all, name = "session_merge")]
    pub fn merge(&mut self, other: ResultSet, origin: Option<&Path>) -> Result<usize, EngineError> {
        let keys: Vec<String> = other.keys().map(str::to_string).collect();
        let added = self.mutate(MutationKind::Merge, |results| Ok(results.merge(other)?))?;
        if let Some(origin) = origin {
            self.loader.register(origin, keys);
        }
        info!(added, total = self.results.len(), "Merged results.");
        Ok(added)
    }

    /// Loads another GAUDI output file and merges it in. A file that fails to load leaves the
    /// session untouched.
    pub fn merge_file(&mut self, path: impl AsRef<Path>) -> Result<usize, EngineError> {
        let path = path.as_ref();
        let other = GaudiOutputFile::read_from_path(path)?;
        self.merge(other, Some(path))
    }

    pub fn sort(&mut self, column: SortColumn, ascending: bool) -> Result<(), EngineError> {
        self.mutate(MutationKind::Sort, |results| {
            Ok(results.sort(column, ascending)?)
        })
    }

    /// Keeps only the rows matching `spec`, in filter result order. Returns the number kept.
    #[instrument(skip_all, name = "session_filter")]
    pub fn filter(&mut self, spec: &FilterSpec, config: &FilterConfig) -> Result<usize, EngineError> {
        let engine = FilterEngine::new(config.equality);
        let kept = self.mutate(MutationKind::Filter, |results| {
            let rows = engine.apply(results, spec)?;
            let kept = rows.len();
            results.replace_rows(rows)?;
            Ok(kept)
        })?;
        info!(kept, "Applied filter.");
        Ok(kept)
    }

    pub fn remove_rows(&mut self, indices: &[usize]) -> Result<usize, EngineError> {
        self.mutate(MutationKind::RemoveRows, |results| {
            Ok(results.remove_rows(indices)?)
        })
    }

    /// Clusters the rows by Kabsch RMSD, reducing multi-structure solutions with
    /// `config.reduction`, and writes the ids into the Cluster column.
    pub fn cluster(
        &mut self,
        config: &ClusteringConfig,
        reporter: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ClusterOutcome, EngineError> {
        let metric = KabschRmsd::new(config.reduction);
        self.cluster_with_metric(config, &metric, reporter, cancel)
    }

    /// Clusters the rows with a caller-supplied structural distance. `config.reduction` is
    /// not consulted; the metric decides how multi-structure solutions compare.
    ///
    /// Cancellation is not an error: the table is restored from the snapshot taken before the
    /// pass and [`ClusterOutcome::Cancelled`] is returned.
    #[instrument(skip_all, name = "session_cluster", fields(objective = %config.objective))]
    pub fn cluster_with_metric(
        &mut self,
        config: &ClusteringConfig,
        metric: &dyn RmsdMetric,
        reporter: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ClusterOutcome, EngineError> {
        self.history.push(&self.results);
        self.observers.begin(MutationKind::Cluster);

        let engine = ClusteringEngine::new(metric, reporter, cancel);
        let outcome = match engine.run(&self.results, &mut self.cache, self.loader.as_ref(), config) {
            Ok(clustering) => self
                .results
                .apply_cluster_ids(&clustering.ids)
                .map(|()| {
                    ClusterOutcome::Committed(ClusterReport {
                        cluster_count: clustering.cluster_count(),
                        representatives: clustering.representatives,
                        skipped: clustering.skipped,
                    })
                })
                .map_err(EngineError::from),
            Err(EngineError::Cancelled) => {
                if let Some(snapshot) = self.history.latest() {
                    snapshot.restore_into(&mut self.results);
                }
                warn!("Clustering was cancelled; the table was left unchanged.");
                Ok(ClusterOutcome::Cancelled)
            }
            Err(err) => Err(err),
        };

        self.observers.end(MutationKind::Cluster);
        outcome
    }

    /// Restores the state before the most recent mutation. Returns `false` when the history
    /// is empty.
    pub fn undo(&mut self) -> bool {
        let (history, results) = (&mut self.history, &mut self.results);
        self.observers
            .bracket(MutationKind::Undo, || history.undo(results))
    }

    /// Restores the load-time state. The reset itself can be undone.
    pub fn reset(&mut self) {
        self.history.push(&self.results);
        let (history, results) = (&self.history, &mut self.results);
        self.observers
            .bracket(MutationKind::Reset, || history.reset(results));
    }

    #[instrument(skip_all, name = "session_serialize", fields(path = %path.as_ref().display()))]
    pub fn serialize(&self, path: impl AsRef<Path>, config: &OutputConfig) -> Result<(), EngineError> {
        let options = GaudiWriteOptions {
            cluster_column: config.cluster_column,
        };
        GaudiOutputFile::write_to_path(&self.results, &options, path)?;
        info!(rows = self.results.len(), "Wrote results file.");
        Ok(())
    }

    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        write_csv_to_path(&self.results, path)?;
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("rows", &self.results.len())
            .field("history", &self.history.len())
            .field("observers", &self.observers)
            .field("cached", &self.cache.len())
            .finish()
    }
}
