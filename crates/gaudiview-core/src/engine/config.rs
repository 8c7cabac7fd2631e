use super::filter::EqualityPolicy;
use crate::core::io::gaudi::ClusterColumnMode;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {parameter}: {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Which end of an objective counts as "best" when ordering solutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Maximize,
    Minimize,
}

impl FromStr for Direction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" | "maximize" | "maximise" => Ok(Self::Maximize),
            "min" | "minimize" | "minimise" => Ok(Self::Minimize),
            other => Err(ConfigError::InvalidValue {
                parameter: "direction",
                reason: format!("'{}' is neither 'maximize' nor 'minimize'", other),
            }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Maximize => "maximize",
            Self::Minimize => "minimize",
        })
    }
}

/// How the per-structure RMSDs of two multi-structure solutions collapse into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MultiStructureReduction {
    /// The RMSD of the last structure pair.
    #[default]
    Last,
    Max,
    Mean,
}

impl FromStr for MultiStructureReduction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last" => Ok(Self::Last),
            "max" => Ok(Self::Max),
            "mean" => Ok(Self::Mean),
            other => Err(ConfigError::InvalidValue {
                parameter: "reduction",
                reason: format!("unknown reduction '{}' (expected last, max or mean)", other),
            }),
        }
    }
}

impl fmt::Display for MultiStructureReduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Last => "last",
            Self::Max => "max",
            Self::Mean => "mean",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringConfig {
    pub objective: String,
    pub direction: Direction,
    pub rmsd_cutoff: f64,
    pub reduction: MultiStructureReduction,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterConfig {
    pub equality: EqualityPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputConfig {
    pub cluster_column: ClusterColumnMode,
}

#[derive(Default)]
pub struct ClusteringConfigBuilder {
    objective: Option<String>,
    direction: Option<Direction>,
    rmsd_cutoff: Option<f64>,
    reduction: Option<MultiStructureReduction>,
}

impl ClusteringConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objective(mut self, name: impl Into<String>) -> Self {
        self.objective = Some(name.into());
        self
    }
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }
    pub fn rmsd_cutoff(mut self, cutoff: f64) -> Self {
        self.rmsd_cutoff = Some(cutoff);
        self
    }
    pub fn reduction(mut self, reduction: MultiStructureReduction) -> Self {
        self.reduction = Some(reduction);
        self
    }

    pub fn build(self) -> Result<ClusteringConfig, ConfigError> {
        let objective = self
            .objective
            .ok_or(ConfigError::MissingParameter("objective"))?;
        if objective.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "objective",
                reason: "objective name is empty".into(),
            });
        }
        let rmsd_cutoff = self
            .rmsd_cutoff
            .ok_or(ConfigError::MissingParameter("rmsd_cutoff"))?;
        if !(rmsd_cutoff.is_finite() && rmsd_cutoff > 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "rmsd_cutoff",
                reason: format!("must be a positive number, got {}", rmsd_cutoff),
            });
        }
        Ok(ClusteringConfig {
            objective,
            direction: self
                .direction
                .ok_or(ConfigError::MissingParameter("direction"))?,
            rmsd_cutoff,
            reduction: self.reduction.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ClusteringConfigBuilder {
        ClusteringConfigBuilder::new()
            .objective("Score")
            .direction(Direction::Minimize)
            .rmsd_cutoff(0.5)
    }

    #[test]
    fn builds_with_default_reduction() {
        let config = complete().build().unwrap();
        assert_eq!(config.objective, "Score");
        assert_eq!(config.direction, Direction::Minimize);
        assert_eq!(config.rmsd_cutoff, 0.5);
        assert_eq!(config.reduction, MultiStructureReduction::Last);
    }

    #[test]
    fn missing_parameters_are_named() {
        let err = ClusteringConfigBuilder::new().rmsd_cutoff(1.0).build();
        assert_eq!(err, Err(ConfigError::MissingParameter("objective")));

        let err = ClusteringConfigBuilder::new().objective("Score").build();
        assert_eq!(err, Err(ConfigError::MissingParameter("rmsd_cutoff")));

        let err = ClusteringConfigBuilder::new()
            .objective("Score")
            .rmsd_cutoff(1.0)
            .build();
        assert_eq!(err, Err(ConfigError::MissingParameter("direction")));
    }

    #[test]
    fn non_positive_cutoff_is_rejected() {
        for cutoff in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = complete().rmsd_cutoff(cutoff).build().unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue {
                    parameter: "rmsd_cutoff",
                    ..
                }
            ));
        }
    }

    #[test]
    fn direction_parses_short_and_long_forms() {
        assert_eq!("max".parse::<Direction>(), Ok(Direction::Maximize));
        assert_eq!("Minimize".parse::<Direction>(), Ok(Direction::Minimize));
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(Direction::Maximize.to_string(), "maximize");
    }

    #[test]
    fn reduction_parses_known_names() {
        assert_eq!(
            "MEAN".parse::<MultiStructureReduction>(),
            Ok(MultiStructureReduction::Mean)
        );
        assert!("median".parse::<MultiStructureReduction>().is_err());
    }
}
