use super::objective::{CLUSTER_COLUMN, Objective, objective_names, same_schema};
use super::solution::Solution;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

/// Header label of the key column that precedes the objectives.
pub const KEY_COLUMN: &str = "Filename";

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("Row '{key}' has {found} values but the schema has {expected} objectives")]
    RowLength {
        key: String,
        expected: usize,
        found: usize,
    },

    #[error("Duplicate solution key '{0}'")]
    DuplicateKey(String),

    #[error("Objective schemas differ: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Column {index} is out of range for a table with {columns} objectives")]
    ColumnOutOfRange { index: usize, columns: usize },

    #[error("Row {index} is out of range for a table with {rows} rows")]
    RowOutOfRange { index: usize, rows: usize },

    #[error("{0}")]
    InvalidOperation(String),
}

/// Column selector for [`ResultSet::sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Key,
    Objective(usize),
    Cluster,
}

/// The mutable part of a result table: rows, objective schema and the cluster column flag.
///
/// This is exactly what the undo history captures and restores. The preamble line is not
/// part of it because no operation ever edits it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableState {
    rows: Vec<Solution>,
    objectives: Vec<Objective>,
    has_cluster_column: bool,
}

impl TableState {
    pub fn rows(&self) -> &[Solution] {
        &self.rows
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.objectives
    }

    pub fn has_cluster_column(&self) -> bool {
        self.has_cluster_column
    }
}

/// An ordered table of solutions sharing one objective schema.
///
/// Invariants maintained by every method:
/// - each row has exactly one value per objective;
/// - keys are unique;
/// - when the cluster column is present every row carries a cluster id, and when it is
///   absent no row does.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    preamble: String,
    state: TableState,
}

impl ResultSet {
    /// Builds a table, validating row lengths and key uniqueness.
    ///
    /// When every row already carries a cluster id the cluster column is switched on; a table
    /// where only some rows carry one is rejected.
    pub fn new(
        preamble: impl Into<String>,
        objectives: Vec<Objective>,
        rows: Vec<Solution>,
    ) -> Result<Self, TableError> {
        validate_rows(&objectives, &rows, &HashSet::new())?;

        let clustered = rows.iter().filter(|r| r.cluster.is_some()).count();
        if clustered != 0 && clustered != rows.len() {
            return Err(TableError::InvalidOperation(format!(
                "only {} of {} rows carry a cluster id",
                clustered,
                rows.len()
            )));
        }

        Ok(Self {
            preamble: preamble.into(),
            state: TableState {
                has_cluster_column: clustered != 0,
                rows,
                objectives,
            },
        })
    }

    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    pub fn rows(&self) -> &[Solution] {
        &self.state.rows
    }

    pub fn objectives(&self) -> &[Objective] {
        &self.state.objectives
    }

    pub fn state(&self) -> &TableState {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.state.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.rows.is_empty()
    }

    pub fn has_cluster_column(&self) -> bool {
        self.state.has_cluster_column
    }

    /// Column labels as shown to a user: key column, objective names, then `Cluster`.
    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.state.objectives.len() + 2);
        header.push(KEY_COLUMN.to_string());
        header.extend(objective_names(&self.state.objectives));
        if self.state.has_cluster_column {
            header.push(CLUSTER_COLUMN.to_string());
        }
        header
    }

    pub fn objective_index(&self, name: &str) -> Option<usize> {
        self.state.objectives.iter().position(|o| o.name == name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.state.rows.iter().map(|r| r.key.as_str())
    }

    pub fn row_by_key(&self, key: &str) -> Option<&Solution> {
        self.state.rows.iter().find(|r| r.key == key)
    }

    /// `(key, cluster id)` for every row that has been clustered, in table order.
    pub fn cluster_assignments(&self) -> Vec<(&str, u32)> {
        self.state
            .rows
            .iter()
            .filter_map(|r| r.cluster.map(|c| (r.key.as_str(), c)))
            .collect()
    }

    /// Replaces the mutable state wholesale. Used by the undo history.
    pub fn replace_state(&mut self, state: TableState) {
        self.state = state;
    }

    /// Appends the rows of `other` when both tables share the same objective schema.
    ///
    /// A clustered table loses its cluster column, since the new rows were never compared
    /// against the existing representatives.
    pub fn merge(&mut self, other: ResultSet) -> Result<usize, TableError> {
        if !same_schema(&self.state.objectives, &other.state.objectives) {
            return Err(TableError::SchemaMismatch {
                expected: objective_names(&self.state.objectives),
                found: objective_names(&other.state.objectives),
            });
        }
        let existing: HashSet<&str> = self.keys().collect();
        validate_rows(&self.state.objectives, &other.state.rows, &existing)?;

        let added = other.state.rows.len();
        self.drop_cluster_column();
        self.state
            .rows
            .extend(other.state.rows.into_iter().map(|mut row| {
                row.cluster = None;
                row
            }));
        Ok(added)
    }

    /// Stable sort by the given column. Ties keep their previous relative order in both
    /// directions.
    pub fn sort(&mut self, column: SortColumn, ascending: bool) -> Result<(), TableError> {
        match column {
            SortColumn::Objective(index) if index >= self.state.objectives.len() => {
                return Err(TableError::ColumnOutOfRange {
                    index,
                    columns: self.state.objectives.len(),
                });
            }
            SortColumn::Cluster if !self.state.has_cluster_column => {
                return Err(TableError::InvalidOperation(
                    "cannot sort by cluster before clustering has run".into(),
                ));
            }
            _ => {}
        }

        self.state.rows.sort_by(|a, b| match column {
            SortColumn::Objective(index) => {
                compare_values(a.values[index], b.values[index], ascending)
            }
            _ => {
                let ordering = compare_rows(a, b, column);
                if ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            }
        });
        Ok(())
    }

    /// Removes the rows at the given positions. Duplicate positions are ignored.
    pub fn remove_rows(&mut self, indices: &[usize]) -> Result<usize, TableError> {
        if indices.is_empty() {
            return Err(TableError::InvalidOperation(
                "no rows selected for removal".into(),
            ));
        }
        let rows = self.state.rows.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= rows) {
            return Err(TableError::RowOutOfRange { index, rows });
        }

        let doomed: BTreeSet<usize> = indices.iter().copied().collect();
        let mut position = 0;
        self.state.rows.retain(|_| {
            let keep = !doomed.contains(&position);
            position += 1;
            keep
        });
        Ok(doomed.len())
    }

    /// Replaces the rows with a new sequence over the same schema, e.g. a filter result.
    ///
    /// Cluster ids carried by the new rows are kept as they are.
    pub fn replace_rows(&mut self, rows: Vec<Solution>) -> Result<(), TableError> {
        validate_rows(&self.state.objectives, &rows, &HashSet::new())?;
        let clustered = self.state.has_cluster_column;
        if let Some(row) = rows.iter().find(|r| r.cluster.is_some() != clustered) {
            return Err(TableError::InvalidOperation(format!(
                "row '{}' does not match the table's cluster column",
                row.key
            )));
        }
        self.state.rows = rows;
        Ok(())
    }

    /// Adds the cluster column if it is not already there. Idempotent.
    ///
    /// Rows receive cluster id `1` until [`ResultSet::apply_cluster_ids`] assigns real ones.
    pub fn append_cluster_column(&mut self) {
        if self.state.has_cluster_column {
            return;
        }
        self.state.has_cluster_column = true;
        for row in &mut self.state.rows {
            row.cluster = Some(1);
        }
    }

    pub fn drop_cluster_column(&mut self) {
        self.state.has_cluster_column = false;
        for row in &mut self.state.rows {
            row.cluster = None;
        }
    }

    /// Writes one cluster id per row, in table order, creating the column if needed.
    pub fn apply_cluster_ids(&mut self, ids: &[u32]) -> Result<(), TableError> {
        if ids.len() != self.state.rows.len() {
            return Err(TableError::InvalidOperation(format!(
                "{} cluster ids supplied for {} rows",
                ids.len(),
                self.state.rows.len()
            )));
        }
        if ids.contains(&0) {
            return Err(TableError::InvalidOperation(
                "cluster ids are 1-based".into(),
            ));
        }
        self.append_cluster_column();
        for (row, &id) in self.state.rows.iter_mut().zip(ids) {
            row.cluster = Some(id);
        }
        Ok(())
    }
}

/// Orders two objective values for a sort in the given direction.
///
/// NaN sorts after every number in both directions, and NaNs tie with each other, so the
/// comparison stays a total order and stable sorts keep NaN rows in their prior order.
pub fn compare_values(a: f64, b: f64, ascending: bool) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ordering = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        }
    }
}

fn compare_rows(a: &Solution, b: &Solution, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Key => a.key.cmp(&b.key),
        SortColumn::Objective(index) => compare_values(a.values[index], b.values[index], true),
        SortColumn::Cluster => a.cluster.cmp(&b.cluster),
    }
}

fn validate_rows(
    objectives: &[Objective],
    rows: &[Solution],
    existing_keys: &HashSet<&str>,
) -> Result<(), TableError> {
    let mut seen = HashSet::with_capacity(rows.len());
    for row in rows {
        if row.values.len() != objectives.len() {
            return Err(TableError::RowLength {
                key: row.key.clone(),
                expected: objectives.len(),
                found: row.values.len(),
            });
        }
        if existing_keys.contains(row.key.as_str()) || !seen.insert(row.key.as_str()) {
            return Err(TableError::DuplicateKey(row.key.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn objectives() -> Vec<Objective> {
        vec![
            Objective::parse("Score (kcal/mol)").unwrap(),
            Objective::parse("Energy (kJ)").unwrap(),
        ]
    }

    fn sample() -> ResultSet {
        ResultSet::new(
            "# GAUDI results",
            objectives(),
            vec![
                Solution::new("A", vec![-5.0, 10.0]),
                Solution::new("B", vec![-7.2, 8.1]),
                Solution::new("C", vec![-3.0, 12.0]),
            ],
        )
        .unwrap()
    }

    fn keys(set: &ResultSet) -> Vec<&str> {
        set.keys().collect()
    }

    mod construction {
        use super::*;

        #[test]
        fn new_rejects_rows_with_wrong_length() {
            let result = ResultSet::new(
                "",
                objectives(),
                vec![Solution::new("A", vec![1.0])],
            );
            assert!(matches!(result, Err(TableError::RowLength { expected: 2, found: 1, .. })));
        }

        #[test]
        fn new_rejects_duplicate_keys() {
            let result = ResultSet::new(
                "",
                objectives(),
                vec![
                    Solution::new("A", vec![1.0, 2.0]),
                    Solution::new("A", vec![3.0, 4.0]),
                ],
            );
            assert_eq!(result, Err(TableError::DuplicateKey("A".into())));
        }

        #[test]
        fn new_enables_cluster_column_when_all_rows_are_clustered() {
            let set = ResultSet::new(
                "",
                objectives(),
                vec![
                    Solution::new("A", vec![1.0, 2.0]).with_cluster(1),
                    Solution::new("B", vec![3.0, 4.0]).with_cluster(2),
                ],
            )
            .unwrap();
            assert!(set.has_cluster_column());
            assert_eq!(set.header().last().map(String::as_str), Some(CLUSTER_COLUMN));
        }

        #[test]
        fn new_rejects_partially_clustered_rows() {
            let result = ResultSet::new(
                "",
                objectives(),
                vec![
                    Solution::new("A", vec![1.0, 2.0]).with_cluster(1),
                    Solution::new("B", vec![3.0, 4.0]),
                ],
            );
            assert!(matches!(result, Err(TableError::InvalidOperation(_))));
        }

        #[test]
        fn header_starts_with_key_column() {
            assert_eq!(sample().header(), vec!["Filename", "Score", "Energy"]);
        }
    }

    mod merge {
        use super::*;

        #[test]
        fn merge_appends_rows_with_matching_schema() {
            let mut set = sample();
            let other = ResultSet::new(
                "other",
                objectives(),
                vec![Solution::new("D", vec![-1.0, 1.0])],
            )
            .unwrap();

            assert_eq!(set.merge(other), Ok(1));
            assert_eq!(keys(&set), vec!["A", "B", "C", "D"]);
            assert_eq!(set.preamble(), "# GAUDI results");
        }

        #[test]
        fn merge_rejects_different_schema_and_leaves_table_unchanged() {
            let mut set = sample();
            let before = set.clone();
            let other = ResultSet::new(
                "",
                vec![Objective::new("Energy", None), Objective::new("Score", None)],
                vec![],
            )
            .unwrap();

            assert!(matches!(set.merge(other), Err(TableError::SchemaMismatch { .. })));
            assert_eq!(set, before);
        }

        #[test]
        fn merge_rejects_colliding_keys() {
            let mut set = sample();
            let before = set.clone();
            let other = ResultSet::new(
                "",
                objectives(),
                vec![Solution::new("B", vec![0.0, 0.0])],
            )
            .unwrap();

            assert_eq!(set.merge(other), Err(TableError::DuplicateKey("B".into())));
            assert_eq!(set, before);
        }

        #[test]
        fn merge_into_clustered_table_drops_cluster_column() {
            let mut set = sample();
            set.apply_cluster_ids(&[1, 2, 1]).unwrap();
            let other = ResultSet::new(
                "",
                objectives(),
                vec![Solution::new("D", vec![0.0, 0.0])],
            )
            .unwrap();

            set.merge(other).unwrap();
            assert!(!set.has_cluster_column());
            assert!(set.rows().iter().all(|r| r.cluster.is_none()));
        }
    }

    mod sort {
        use super::*;

        #[test]
        fn sort_by_objective_ascending_and_descending() {
            let mut set = sample();
            set.sort(SortColumn::Objective(0), true).unwrap();
            assert_eq!(keys(&set), vec!["B", "A", "C"]);

            set.sort(SortColumn::Objective(0), false).unwrap();
            assert_eq!(keys(&set), vec!["C", "A", "B"]);
        }

        #[test]
        fn sort_is_stable_for_ties_in_both_directions() {
            let mut set = ResultSet::new(
                "",
                objectives(),
                vec![
                    Solution::new("x", vec![1.0, 0.0]),
                    Solution::new("y", vec![0.0, 0.0]),
                    Solution::new("z", vec![1.0, 0.0]),
                ],
            )
            .unwrap();

            set.sort(SortColumn::Objective(0), false).unwrap();
            assert_eq!(keys(&set), vec!["x", "z", "y"]);

            set.sort(SortColumn::Objective(1), true).unwrap();
            assert_eq!(keys(&set), vec!["x", "z", "y"]);
        }

        #[test]
        fn nan_values_sort_last_in_both_directions() {
            let rows = (0..200)
                .map(|i| {
                    let score = if i % 3 == 0 {
                        f64::NAN
                    } else {
                        ((i * 7919) % 1000) as f64
                    };
                    Solution::new(format!("r{:03}", i), vec![score, 0.0])
                })
                .collect();
            let mut set = ResultSet::new("", objectives(), rows).unwrap();
            let nan_keys: Vec<String> = (0..200)
                .filter(|i| i % 3 == 0)
                .map(|i| format!("r{:03}", i))
                .collect();

            for ascending in [true, false] {
                set.sort(SortColumn::Objective(0), ascending).unwrap();
                let scores: Vec<f64> = set.rows().iter().map(|r| r.values[0]).collect();
                let (numbers, nans) = scores.split_at(200 - nan_keys.len());

                assert!(numbers.iter().all(|v| !v.is_nan()));
                assert!(nans.iter().all(|v| v.is_nan()));
                assert!(numbers.windows(2).all(|w| if ascending {
                    w[0] <= w[1]
                } else {
                    w[0] >= w[1]
                }));
                let trailing: Vec<&str> = set.rows()[numbers.len()..]
                    .iter()
                    .map(|r| r.key.as_str())
                    .collect();
                assert_eq!(trailing, nan_keys);
            }
        }

        #[test]
        fn compare_values_ranks_nan_after_numbers() {
            assert_eq!(compare_values(f64::NAN, 1.0, true), Ordering::Greater);
            assert_eq!(compare_values(f64::NAN, 1.0, false), Ordering::Greater);
            assert_eq!(compare_values(1.0, f64::NAN, false), Ordering::Less);
            assert_eq!(compare_values(f64::NAN, f64::NAN, true), Ordering::Equal);
            assert_eq!(compare_values(1.0, 2.0, false), Ordering::Greater);
        }

        #[test]
        fn sort_by_key_is_lexicographic() {
            let mut set = sample();
            set.sort(SortColumn::Key, false).unwrap();
            assert_eq!(keys(&set), vec!["C", "B", "A"]);
        }

        #[test]
        fn sort_rejects_out_of_range_column() {
            let mut set = sample();
            assert_eq!(
                set.sort(SortColumn::Objective(2), true),
                Err(TableError::ColumnOutOfRange { index: 2, columns: 2 })
            );
        }

        #[test]
        fn sort_by_cluster_requires_cluster_column() {
            let mut set = sample();
            assert!(set.sort(SortColumn::Cluster, true).is_err());

            set.apply_cluster_ids(&[2, 1, 3]).unwrap();
            set.sort(SortColumn::Cluster, true).unwrap();
            assert_eq!(keys(&set), vec!["B", "A", "C"]);
        }
    }

    mod removal {
        use super::*;

        #[test]
        fn remove_rows_deletes_selected_positions() {
            let mut set = sample();
            assert_eq!(set.remove_rows(&[2, 0, 2]), Ok(2));
            assert_eq!(keys(&set), vec!["B"]);
        }

        #[test]
        fn remove_rows_rejects_empty_selection() {
            let mut set = sample();
            assert!(matches!(set.remove_rows(&[]), Err(TableError::InvalidOperation(_))));
            assert_eq!(set.len(), 3);
        }

        #[test]
        fn remove_rows_rejects_out_of_range_index_without_removing_anything() {
            let mut set = sample();
            assert_eq!(
                set.remove_rows(&[0, 3]),
                Err(TableError::RowOutOfRange { index: 3, rows: 3 })
            );
            assert_eq!(set.len(), 3);
        }
    }

    mod clusters {
        use super::*;

        #[test]
        fn append_cluster_column_is_idempotent() {
            let mut set = sample();
            set.apply_cluster_ids(&[1, 2, 3]).unwrap();
            set.append_cluster_column();
            set.append_cluster_column();

            assert_eq!(set.header().iter().filter(|h| *h == CLUSTER_COLUMN).count(), 1);
            assert_eq!(set.cluster_assignments(), vec![("A", 1), ("B", 2), ("C", 3)]);
        }

        #[test]
        fn apply_cluster_ids_requires_one_id_per_row() {
            let mut set = sample();
            assert!(set.apply_cluster_ids(&[1, 2]).is_err());
            assert!(set.apply_cluster_ids(&[0, 1, 2]).is_err());
            assert!(!set.has_cluster_column());
        }

        #[test]
        fn replace_rows_keeps_cluster_ids_of_a_clustered_table() {
            let mut set = sample();
            set.apply_cluster_ids(&[1, 2, 1]).unwrap();
            let kept: Vec<Solution> = set.rows().iter().filter(|r| r.key != "B").cloned().collect();

            set.replace_rows(kept).unwrap();
            assert_eq!(set.cluster_assignments(), vec![("A", 1), ("C", 1)]);
        }
    }
}
