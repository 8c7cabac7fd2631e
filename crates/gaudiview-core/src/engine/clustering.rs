use super::config::{ClusteringConfig, Direction, MultiStructureReduction};
use super::error::EngineError;
use super::progress::{CancellationToken, Progress, ProgressReporter};
use crate::core::models::objective::CLUSTER_COLUMN;
use crate::core::models::result_set::{ResultSet, compare_values};
use crate::core::structure::{Structure, StructureCache, StructureLoader};
use crate::core::utils::geometry::{GeometryError, superposed_rmsd};
use tracing::{debug, info, warn};

/// Structural distance between two solutions, each given as its list of structures.
pub trait RmsdMetric {
    fn rmsd(&self, reference: &[Structure], candidate: &[Structure]) -> Result<f64, GeometryError>;
}

/// Pairs structures by position, superposes each pair with Kabsch and reduces the per-pair
/// RMSDs to one value.
///
/// Surplus structures of the longer list are ignored. Two solutions without a single pair,
/// or with a pair of different atom counts, are incomparable.
#[derive(Debug, Clone, Copy, Default)]
pub struct KabschRmsd {
    reduction: MultiStructureReduction,
}

impl KabschRmsd {
    pub fn new(reduction: MultiStructureReduction) -> Self {
        Self { reduction }
    }
}

impl RmsdMetric for KabschRmsd {
    fn rmsd(&self, reference: &[Structure], candidate: &[Structure]) -> Result<f64, GeometryError> {
        let pairwise = reference
            .iter()
            .zip(candidate)
            .map(|(r, c)| superposed_rmsd(&r.coords, &c.coords))
            .collect::<Result<Vec<_>, _>>()?;

        let last = *pairwise.last().ok_or(GeometryError::Empty)?;
        Ok(match self.reduction {
            MultiStructureReduction::Last => last,
            MultiStructureReduction::Max => pairwise.iter().copied().fold(f64::MIN, f64::max),
            MultiStructureReduction::Mean => pairwise.iter().sum::<f64>() / pairwise.len() as f64,
        })
    }
}

/// A row whose structures could not be resolved. It ends up alone in its own cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSolution {
    pub key: String,
    pub reason: String,
}

/// The result of a clustering pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// One 1-based cluster id per table row, in table order.
    pub ids: Vec<u32>,
    /// Representative key of each cluster, in creation order.
    pub representatives: Vec<String>,
    pub skipped: Vec<SkippedSolution>,
}

impl Clustering {
    pub fn cluster_count(&self) -> usize {
        self.representatives.len()
    }
}

/// Greedy, order-dependent RMSD clustering.
///
/// Rows are visited best-first by the chosen objective. Each row joins the first existing
/// cluster whose representative lies strictly closer than the cutoff, or otherwise founds a
/// new cluster as its representative.
pub struct ClusteringEngine<'a> {
    metric: &'a dyn RmsdMetric,
    reporter: &'a ProgressReporter<'a>,
    cancel: &'a CancellationToken,
}

impl<'a> ClusteringEngine<'a> {
    pub fn new(
        metric: &'a dyn RmsdMetric,
        reporter: &'a ProgressReporter<'a>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            metric,
            reporter,
            cancel,
        }
    }

    /// Classifies every row of `results` without modifying it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOperation`] for an empty table or an unusable objective,
    /// and [`EngineError::Cancelled`] when the token fires at any point of the pass.
    pub fn run(
        &self,
        results: &ResultSet,
        cache: &mut StructureCache,
        loader: &dyn StructureLoader,
        config: &ClusteringConfig,
    ) -> Result<Clustering, EngineError> {
        if results.is_empty() {
            return Err(EngineError::InvalidOperation(
                "cannot cluster an empty table".into(),
            ));
        }
        if config.objective == CLUSTER_COLUMN {
            return Err(EngineError::InvalidOperation(
                "cannot cluster by the Cluster column".into(),
            ));
        }
        let column = results.objective_index(&config.objective).ok_or_else(|| {
            EngineError::InvalidOperation(format!("unknown objective '{}'", config.objective))
        })?;

        let order = working_order(results, column, config.direction);
        let total = results.len() as u64;

        self.reporter.report(Progress::PhaseStart { name: "Clustering" });
        self.reporter.report(Progress::TaskStart {
            total_steps: total * 2,
        });

        let outcome = self
            .load_structures(results, &order, cache, loader)
            .and_then(|(resolvable, skipped)| {
                self.classify(results, &order, cache, &resolvable, config.rmsd_cutoff)
                    .map(|(ids, representatives)| Clustering {
                        ids,
                        representatives,
                        skipped,
                    })
            });

        self.reporter.report(Progress::TaskFinish);
        self.reporter.report(Progress::PhaseFinish);

        if self.cancel.is_cancelled() {
            info!("Clustering cancelled");
            return Err(EngineError::Cancelled);
        }
        let clustering = outcome?;
        info!(
            clusters = clustering.cluster_count(),
            rows = results.len(),
            skipped = clustering.skipped.len(),
            cutoff = config.rmsd_cutoff,
            "Clustering finished"
        );
        Ok(clustering)
    }

    fn check_cancelled(&self) -> Result<(), EngineError> {
        if self.cancel.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn load_structures(
        &self,
        results: &ResultSet,
        order: &[usize],
        cache: &mut StructureCache,
        loader: &dyn StructureLoader,
    ) -> Result<(Vec<bool>, Vec<SkippedSolution>), EngineError> {
        let rows = results.rows();
        let mut resolvable = vec![false; rows.len()];
        let mut skipped = Vec::new();

        self.reporter
            .report(Progress::Message("Loading the solutions...".into()));
        for &index in order {
            self.check_cancelled()?;
            let key = &rows[index].key;
            match cache.get_or_load(key, loader) {
                Ok(_) => resolvable[index] = true,
                Err(source) => {
                    let err = EngineError::StructureResolution {
                        key: key.clone(),
                        source,
                    };
                    warn!(key = %key, "{}", err);
                    self.reporter.report(Progress::Message(format!(
                        "Skipping '{}': structures unavailable",
                        key
                    )));
                    skipped.push(SkippedSolution {
                        key: key.clone(),
                        reason: err.to_string(),
                    });
                }
            }
            self.reporter.report(Progress::TaskIncrement);
        }
        Ok((resolvable, skipped))
    }

    fn classify(
        &self,
        results: &ResultSet,
        order: &[usize],
        cache: &StructureCache,
        resolvable: &[bool],
        cutoff: f64,
    ) -> Result<(Vec<u32>, Vec<String>), EngineError> {
        let rows = results.rows();
        let mut ids = vec![0u32; rows.len()];
        let mut representatives: Vec<usize> = Vec::new();

        self.reporter
            .report(Progress::Message("Calculating RMSD...".into()));
        for &index in order {
            self.check_cancelled()?;

            let joined = if resolvable[index] {
                let candidate = cache.get(&rows[index].key).unwrap_or(&[]);
                representatives.iter().position(|&rep| {
                    resolvable[rep] && self.within_cutoff(cache, &rows[rep].key, candidate, cutoff)
                })
            } else {
                None
            };

            ids[index] = match joined {
                Some(cluster) => cluster as u32 + 1,
                None => {
                    representatives.push(index);
                    representatives.len() as u32
                }
            };
            self.reporter.report(Progress::TaskIncrement);
        }

        let keys = representatives
            .into_iter()
            .map(|i| rows[i].key.clone())
            .collect();
        Ok((ids, keys))
    }

    fn within_cutoff(
        &self,
        cache: &StructureCache,
        representative: &str,
        candidate: &[Structure],
        cutoff: f64,
    ) -> bool {
        let reference = cache.get(representative).unwrap_or(&[]);
        match self.metric.rmsd(reference, candidate) {
            Ok(rmsd) => rmsd < cutoff,
            Err(err) => {
                debug!(representative, error = %err, "Structures are not comparable");
                false
            }
        }
    }
}

/// Row indices sorted best-first. Ties keep table order and NaN scores come last.
fn working_order(results: &ResultSet, column: usize, direction: Direction) -> Vec<usize> {
    let rows = results.rows();
    let ascending = direction == Direction::Minimize;
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        compare_values(rows[a].values[column], rows[b].values[column], ascending)
    });
    order
}
