use crate::error::{CliError, Result};
use gaudiview::engine::config::{
    ClusteringConfig, ClusteringConfigBuilder, Direction, FilterConfig, MultiStructureReduction,
    OutputConfig,
};

/// Command-line flags that take precedence over every other configuration source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub objective: Option<String>,
    pub direction: Option<Direction>,
    pub rmsd_cutoff: Option<f64>,
    pub reduction: Option<MultiStructureReduction>,
    pub tolerance: Option<f64>,
}

/// Clustering parameters before the results file is known.
///
/// The objective may stay unset until then, in which case the file's first objective is used.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringSettings {
    pub objective: Option<String>,
    pub direction: Direction,
    pub rmsd_cutoff: f64,
    pub reduction: MultiStructureReduction,
}

impl ClusteringSettings {
    pub fn resolve(&self, first_objective: Option<&str>) -> Result<ClusteringConfig> {
        let objective = self
            .objective
            .as_deref()
            .or(first_objective)
            .ok_or_else(|| {
                CliError::Config("The results file has no objective to cluster by.".to_string())
            })?;

        ClusteringConfigBuilder::new()
            .objective(objective)
            .direction(self.direction)
            .rmsd_cutoff(self.rmsd_cutoff)
            .reduction(self.reduction)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }
}

pub struct AppConfig {
    pub clustering: ClusteringSettings,
    pub filter: FilterConfig,
    pub output: OutputConfig,
}
