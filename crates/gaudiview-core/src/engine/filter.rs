use super::error::EngineError;
use crate::core::models::objective::CLUSTER_COLUMN;
use crate::core::models::result_set::ResultSet;
use crate::core::models::solution::Solution;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Comparison operator of a single filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Greater,
    Less,
    Equal,
    GreaterOrEqual,
    LessOrEqual,
    NotEqual,
}

impl FromStr for Operator {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ">" => Ok(Self::Greater),
            "<" => Ok(Self::Less),
            "=" | "==" => Ok(Self::Equal),
            "≥" | ">=" => Ok(Self::GreaterOrEqual),
            "≤" | "<=" => Ok(Self::LessOrEqual),
            "≠" | "!=" => Ok(Self::NotEqual),
            other => Err(EngineError::InvalidOperation(format!(
                "unknown comparison operator '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Greater => ">",
            Self::Less => "<",
            Self::Equal => "=",
            Self::GreaterOrEqual => "≥",
            Self::LessOrEqual => "≤",
            Self::NotEqual => "≠",
        })
    }
}

/// How `=` and `≠` compare floating-point values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EqualityPolicy {
    /// Bitwise IEEE equality.
    #[default]
    Exact,
    /// Values within `eps` of the threshold (inclusive) count as equal.
    Tolerance(f64),
}

impl Operator {
    /// Evaluates `value <op> threshold`.
    ///
    /// `≥` is `!(value < threshold)` and `≤` is `!(value > threshold)`, so a NaN value
    /// satisfies both.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn evaluate(self, value: f64, threshold: f64, equality: EqualityPolicy) -> bool {
        let equal = || match equality {
            EqualityPolicy::Exact => value == threshold,
            EqualityPolicy::Tolerance(eps) => (value - threshold).abs() <= eps,
        };
        match self {
            Self::Greater => value > threshold,
            Self::Less => value < threshold,
            Self::GreaterOrEqual => !(value < threshold),
            Self::LessOrEqual => !(value > threshold),
            Self::Equal => equal(),
            Self::NotEqual => !equal(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub objective: String,
    pub operator: Operator,
    pub threshold: f64,
}

impl Condition {
    pub fn new(objective: impl Into<String>, operator: Operator, threshold: f64) -> Self {
        Self {
            objective: objective.into(),
            operator,
            threshold,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.objective, self.operator, self.threshold)
    }
}

/// A disjunction of conjunctions: a row passes when every condition of at least one group
/// holds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSpec {
    groups: Vec<Vec<Condition>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn or_group(mut self, conditions: Vec<Condition>) -> Self {
        self.groups.push(conditions);
        self
    }

    pub fn push_group(&mut self, conditions: Vec<Condition>) {
        self.groups.push(conditions);
    }

    pub fn groups(&self) -> &[Vec<Condition>] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

struct ResolvedCondition {
    column: usize,
    operator: Operator,
    threshold: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine {
    equality: EqualityPolicy,
}

impl FilterEngine {
    pub fn new(equality: EqualityPolicy) -> Self {
        Self { equality }
    }

    /// Returns the rows that satisfy `spec`.
    ///
    /// Groups are scanned in declaration order and each contributes its matches in table
    /// order; a row already contributed by an earlier group is not repeated. The table is
    /// not modified.
    pub fn apply(&self, results: &ResultSet, spec: &FilterSpec) -> Result<Vec<Solution>, EngineError> {
        let groups = resolve(results, spec)?;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut matched = Vec::new();
        for group in &groups {
            for row in results.rows() {
                if seen.contains(row.key.as_str()) {
                    continue;
                }
                if group.iter().all(|c| self.holds(row, c)) {
                    seen.insert(row.key.as_str());
                    matched.push(row.clone());
                }
            }
        }
        debug!(
            groups = groups.len(),
            matched = matched.len(),
            total = results.len(),
            "Evaluated filter"
        );
        Ok(matched)
    }

    fn holds(&self, row: &Solution, condition: &ResolvedCondition) -> bool {
        row.value(condition.column).is_some_and(|value| {
            condition
                .operator
                .evaluate(value, condition.threshold, self.equality)
        })
    }
}

fn resolve(results: &ResultSet, spec: &FilterSpec) -> Result<Vec<Vec<ResolvedCondition>>, EngineError> {
    if spec.is_empty() {
        return Err(EngineError::InvalidOperation(
            "filter has no condition groups".into(),
        ));
    }
    spec.groups()
        .iter()
        .enumerate()
        .map(|(position, group)| {
            if group.is_empty() {
                return Err(EngineError::InvalidOperation(format!(
                    "filter group {} has no conditions",
                    position + 1
                )));
            }
            group
                .iter()
                .map(|condition| {
                    if condition.objective == CLUSTER_COLUMN {
                        return Err(EngineError::InvalidOperation(
                            "the Cluster column cannot be filtered on".into(),
                        ));
                    }
                    let column = results.objective_index(&condition.objective).ok_or_else(|| {
                        EngineError::InvalidOperation(format!(
                            "unknown objective '{}'",
                            condition.objective
                        ))
                    })?;
                    Ok(ResolvedCondition {
                        column,
                        operator: condition.operator,
                        threshold: condition.threshold,
                    })
                })
                .collect()
        })
        .collect()
}
