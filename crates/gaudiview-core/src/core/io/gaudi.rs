use crate::core::io::traits::ResultsFile;
use crate::core::models::objective::{CLUSTER_COLUMN, Objective};
use crate::core::models::result_set::{ResultSet, TableError};
use crate::core::models::solution::Solution;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Number, Value};
use std::io::{self, BufRead, Read, Write};
use thiserror::Error;

const OBJECTIVES_KEY: &str = "GAUDI.objectives";
const RESULTS_KEY: &str = "GAUDI.results";
const CLUSTER_UNIT: &str = "id";

/// How a present cluster column is written back to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterColumnMode {
    /// Append a `"Cluster (id)"` objective descriptor and one integer per row. Files written
    /// this way load back with their cluster assignments intact.
    #[default]
    Objective,
    /// Leave the cluster column out entirely.
    Omit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GaudiWriteOptions {
    pub cluster_column: ClusterColumnMode,
}

#[derive(Debug, Error)]
pub enum GaudiError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("File is empty")]
    Empty,
    #[error("Missing required section '{0}'")]
    MissingSection(&'static str),
    #[error("Invalid objective descriptor at position {position}: {value}")]
    InvalidObjective { position: usize, value: String },
    #[error("Invalid result row '{key}': {reason}")]
    InvalidRow { key: String, reason: String },
    #[error("Invalid cluster id for '{key}': {value}")]
    InvalidCluster { key: String, value: String },
    #[error("Inconsistent table: {0}")]
    Table(#[from] TableError),
}

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(rename = "GAUDI.objectives", default)]
    objectives: Option<Vec<Value>>,
    #[serde(rename = "GAUDI.results", default)]
    results: Option<Mapping>,
}

#[derive(Debug, Serialize)]
struct OutputDocument<'a> {
    #[serde(rename = "GAUDI.objectives")]
    objectives: Vec<&'a str>,
    #[serde(rename = "GAUDI.results")]
    results: Mapping,
}

/// The `.gaudi-output` format: one free-form preamble line followed by a YAML mapping with
/// the ordered objective descriptors and the per-solution score lists.
pub struct GaudiOutputFile;

impl ResultsFile for GaudiOutputFile {
    type Options = GaudiWriteOptions;
    type Error = GaudiError;

    fn read_from(reader: &mut impl BufRead) -> Result<ResultSet, Self::Error> {
        let mut preamble = String::new();
        if reader.read_line(&mut preamble)? == 0 {
            return Err(GaudiError::Empty);
        }
        let preamble = preamble.trim_end_matches(['\n', '\r']).to_string();

        let mut body = String::new();
        reader.read_to_string(&mut body)?;
        if body.trim().is_empty() {
            return Err(GaudiError::MissingSection(OBJECTIVES_KEY));
        }
        let document: Value = serde_yaml::from_str(&body)?;
        if !document.is_mapping() {
            return Err(GaudiError::MissingSection(OBJECTIVES_KEY));
        }
        let raw: RawDocument = serde_yaml::from_value(document)?;

        let descriptors = raw
            .objectives
            .ok_or(GaudiError::MissingSection(OBJECTIVES_KEY))?;
        let results = raw.results.ok_or(GaudiError::MissingSection(RESULTS_KEY))?;

        let mut objectives = descriptors
            .iter()
            .enumerate()
            .map(|(position, value)| parse_objective(position, value))
            .collect::<Result<Vec<_>, _>>()?;
        let columns = objectives.len();
        let cluster_column = objectives.last().is_some_and(Objective::is_cluster);
        if cluster_column {
            objectives.pop();
        }

        let mut rows = Vec::with_capacity(results.len());
        for (raw_key, raw_values) in &results {
            let key = parse_key(raw_key)?;
            let Value::Sequence(values) = raw_values else {
                return Err(GaudiError::InvalidRow {
                    key,
                    reason: "scores must be a list".into(),
                });
            };
            if values.len() != columns {
                return Err(GaudiError::InvalidRow {
                    key,
                    reason: format!("expected {} values, found {}", columns, values.len()),
                });
            }

            let (scores, cluster) = if cluster_column {
                let (last, scores) = values.split_last().ok_or_else(|| GaudiError::InvalidRow {
                    key: key.clone(),
                    reason: "missing cluster value".into(),
                })?;
                (scores, Some(parse_cluster(&key, last)?))
            } else {
                (values.as_slice(), None)
            };

            let scores = scores
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    v.as_f64().ok_or_else(|| GaudiError::InvalidRow {
                        key: key.clone(),
                        reason: format!("value {} is not numeric", i + 1),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let mut solution = Solution::new(key, scores);
            solution.cluster = cluster;
            rows.push(solution);
        }

        Ok(ResultSet::new(preamble, objectives, rows)?)
    }

    fn write_to(
        results: &ResultSet,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let with_clusters = results.has_cluster_column()
            && options.cluster_column == ClusterColumnMode::Objective;

        let cluster_descriptor = Objective::new(CLUSTER_COLUMN, Some(CLUSTER_UNIT));
        let mut objectives: Vec<&str> =
            results.objectives().iter().map(Objective::descriptor).collect();
        if with_clusters {
            objectives.push(cluster_descriptor.descriptor());
        }

        let mut rows = Mapping::with_capacity(results.len());
        for row in results.rows() {
            let mut values: Vec<Value> = row
                .values
                .iter()
                .map(|&v| Value::Number(Number::from(v)))
                .collect();
            if with_clusters {
                if let Some(id) = row.cluster {
                    values.push(Value::Number(Number::from(id)));
                }
            }
            rows.insert(Value::String(row.key.clone()), Value::Sequence(values));
        }

        let document = OutputDocument {
            objectives,
            results: rows,
        };
        writeln!(writer, "{}", results.preamble())?;
        writer.write_all(serde_yaml::to_string(&document)?.as_bytes())?;
        Ok(())
    }
}

fn parse_objective(position: usize, value: &Value) -> Result<Objective, GaudiError> {
    value
        .as_str()
        .and_then(Objective::parse)
        .ok_or_else(|| GaudiError::InvalidObjective {
            position: position + 1,
            value: format!("{:?}", value),
        })
}

fn parse_key(value: &Value) -> Result<String, GaudiError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(GaudiError::InvalidRow {
            key: format!("{:?}", other),
            reason: "solution keys must be strings".into(),
        }),
    }
}

fn parse_cluster(key: &str, value: &Value) -> Result<u32, GaudiError> {
    value
        .as_u64()
        .and_then(|id| u32::try_from(id).ok())
        .filter(|&id| id >= 1)
        .ok_or_else(|| GaudiError::InvalidCluster {
            key: key.to_string(),
            value: format!("{:?}", value),
        })
}
