use gaudiview::core::io::gaudi::ClusterColumnMode;
use gaudiview::engine::config::{Direction, MultiStructureReduction};

pub struct DefaultsConfig {
    pub rmsd_cutoff: f64,
    pub direction: Direction,
    pub reduction: MultiStructureReduction,
    pub tolerance: Option<f64>,
    pub cluster_column: ClusterColumnMode,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            rmsd_cutoff: 0.5,
            direction: Direction::Maximize,
            reduction: MultiStructureReduction::Last,
            tolerance: None,
            cluster_column: ClusterColumnMode::Objective,
        }
    }
}
