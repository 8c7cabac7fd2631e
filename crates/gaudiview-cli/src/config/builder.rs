use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, ClusteringSettings, ConfigOverrides};
use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use gaudiview::core::io::gaudi::ClusterColumnMode;
use gaudiview::engine::config::{FilterConfig, OutputConfig};
use gaudiview::engine::filter::EqualityPolicy;
use std::str::FromStr;

pub fn build_config(args: &ConfigArgs, overrides: &ConfigOverrides) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let clustering_file = file_config.clustering.take().unwrap_or_default();
    let direction = match overrides.direction {
        Some(direction) => direction,
        None => parse_field("clustering.direction", clustering_file.direction.as_deref())?
            .unwrap_or(defaults.direction),
    };
    let reduction = match overrides.reduction {
        Some(reduction) => reduction,
        None => parse_field("clustering.reduction", clustering_file.reduction.as_deref())?
            .unwrap_or(defaults.reduction),
    };
    let clustering = ClusteringSettings {
        objective: overrides.objective.clone().or(clustering_file.objective),
        direction,
        rmsd_cutoff: overrides
            .rmsd_cutoff
            .or(clustering_file.rmsd_cutoff)
            .unwrap_or(defaults.rmsd_cutoff),
        reduction,
    };

    let filter_file = file_config.filter.take().unwrap_or_default();
    let tolerance = overrides
        .tolerance
        .or(filter_file.tolerance)
        .or(defaults.tolerance);
    let equality = match tolerance {
        None => EqualityPolicy::Exact,
        Some(eps) if eps.is_finite() && eps >= 0.0 => EqualityPolicy::Tolerance(eps),
        Some(eps) => {
            return Err(CliError::Config(format!(
                "filter.tolerance must be a non-negative number, got {}",
                eps
            )));
        }
    };

    let output_file = file_config.output.take().unwrap_or_default();
    let cluster_column = match output_file.cluster_column.as_deref() {
        Some(value) => parse_cluster_column(value)?,
        None => defaults.cluster_column,
    };

    Ok(AppConfig {
        clustering,
        filter: FilterConfig { equality },
        output: OutputConfig { cluster_column },
    })
}

fn parse_field<T>(key: &str, value: Option<&str>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| CliError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}

fn parse_cluster_column(value: &str) -> Result<ClusterColumnMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "objective" => Ok(ClusterColumnMode::Objective),
        "omit" => Ok(ClusterColumnMode::Omit),
        other => Err(CliError::Config(format!(
            "Invalid value for output.cluster-column: '{}' (expected 'objective' or 'omit')",
            other
        ))),
    }
}

fn parse_float(key: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid float value for {}: {}", key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "clustering.objective" => {
                config
                    .clustering
                    .get_or_insert_with(Default::default)
                    .objective = Some(value_str.to_string());
            }
            "clustering.direction" => {
                config
                    .clustering
                    .get_or_insert_with(Default::default)
                    .direction = Some(value_str.to_string());
            }
            "clustering.rmsd-cutoff" => {
                config
                    .clustering
                    .get_or_insert_with(Default::default)
                    .rmsd_cutoff = Some(parse_float(key, value_str)?);
            }
            "clustering.reduction" => {
                config
                    .clustering
                    .get_or_insert_with(Default::default)
                    .reduction = Some(value_str.to_string());
            }
            "filter.tolerance" => {
                config.filter.get_or_insert_with(Default::default).tolerance =
                    Some(parse_float(key, value_str)?);
            }
            "output.cluster-column" => {
                config
                    .output
                    .get_or_insert_with(Default::default)
                    .cluster_column = Some(value_str.to_string());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
