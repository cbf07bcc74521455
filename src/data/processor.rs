//! Data Processor Module
//! Pulls plottable values out of a Polars DataFrame: numeric columns,
//! categorical levels and values grouped by category and hue.

use crate::error::{GraphError, GraphResult};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};

/// Values of one (category, hue) group.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub category: usize,
    pub hue: Option<usize>,
    pub values: Vec<f64>,
}

/// Long-format values ready for a categorical chart.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedValues {
    pub categories: Vec<String>,
    pub hue_levels: Vec<String>,
    /// Ordered by category, then hue level. Empty groups are left out.
    pub groups: Vec<Group>,
}

/// Handles column extraction from the caller's table.
pub struct DataProcessor;

impl DataProcessor {
    /// Look up a column, mapping a miss to `ColumnNotFound`.
    pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> GraphResult<&'a Column> {
        df.column(name)
            .map_err(|_| GraphError::ColumnNotFound(name.to_string()))
    }

    pub fn is_numeric(dtype: &DataType) -> bool {
        matches!(
            dtype,
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// Numeric values of a column, one per row. Nulls and non-finite values
    /// come back as `None`.
    pub fn numeric_values(df: &DataFrame, name: &str) -> GraphResult<Vec<Option<f64>>> {
        let column = Self::require_column(df, name)?;
        if !Self::is_numeric(column.dtype()) {
            return Err(GraphError::NonNumericColumn(name.to_string()));
        }

        let value_f64 = column.cast(&DataType::Float64)?;
        let value_ca = value_f64.f64()?;
        Ok(value_ca
            .into_iter()
            .map(|v| v.filter(|v| v.is_finite()))
            .collect())
    }

    /// Text labels of a column, one per row.
    pub fn category_labels(df: &DataFrame, name: &str) -> GraphResult<Vec<Option<String>>> {
        let column = Self::require_column(df, name)?;
        let as_text = column.cast(&DataType::String)?;
        let text_ca = as_text.as_materialized_series().str()?;
        Ok(text_ca
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    /// Distinct levels of a categorical column.
    ///
    /// Numeric columns are ordered by value, anything else by first
    /// appearance.
    pub fn level_order(df: &DataFrame, name: &str) -> GraphResult<(Vec<String>, Vec<Option<String>>)> {
        let labels = Self::category_labels(df, name)?;
        let column = Self::require_column(df, name)?;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut levels: Vec<String> = Vec::new();
        if Self::is_numeric(column.dtype()) {
            let keys = Self::numeric_values(df, name)?;
            let mut keyed: Vec<(f64, String)> = Vec::new();
            for (label, key) in labels.iter().zip(keys.iter()) {
                if let (Some(label), Some(key)) = (label, key) {
                    if seen.insert(label.as_str()) {
                        keyed.push((*key, label.clone()));
                    }
                }
            }
            keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            levels.extend(keyed.into_iter().map(|(_, label)| label));
        } else {
            for label in labels.iter().flatten() {
                if seen.insert(label.as_str()) {
                    levels.push(label.clone());
                }
            }
        }

        Ok((levels, labels))
    }

    /// Group the numeric `value_col` by the levels of `category_col` and,
    /// when given, `hue_col`.
    ///
    /// Without a category column every row falls into one unnamed category.
    /// Rows with a missing category, hue or value are dropped.
    pub fn group_by_category(
        df: &DataFrame,
        category_col: Option<&str>,
        value_col: &str,
        hue_col: Option<&str>,
    ) -> GraphResult<GroupedValues> {
        let values = Self::numeric_values(df, value_col)?;

        let (categories, category_labels) = match category_col {
            Some(name) => Self::level_order(df, name)?,
            None => (vec![String::new()], vec![Some(String::new()); df.height()]),
        };
        let (hue_levels, hue_labels) = match hue_col {
            Some(name) => {
                let (levels, labels) = Self::level_order(df, name)?;
                (levels, Some(labels))
            }
            None => (Vec::new(), None),
        };

        let category_index: HashMap<&str, usize> = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let hue_index: HashMap<&str, usize> = hue_levels
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();

        let mut buckets: HashMap<(usize, Option<usize>), Vec<f64>> = HashMap::new();
        for (i, value) in values.iter().enumerate() {
            let Some(value) = value else { continue };
            let Some(Some(category)) = category_labels.get(i) else {
                continue;
            };
            let Some(&category) = category_index.get(category.as_str()) else {
                continue;
            };

            let hue = match &hue_labels {
                Some(labels) => match labels.get(i) {
                    Some(Some(level)) => match hue_index.get(level.as_str()) {
                        Some(&h) => Some(h),
                        None => continue,
                    },
                    _ => continue,
                },
                None => None,
            };

            buckets.entry((category, hue)).or_default().push(*value);
        }

        let hue_slots: Vec<Option<usize>> = if hue_levels.is_empty() {
            vec![None]
        } else {
            (0..hue_levels.len()).map(Some).collect()
        };

        let mut groups = Vec::new();
        for category in 0..categories.len() {
            for &hue in &hue_slots {
                if let Some(values) = buckets.remove(&(category, hue)) {
                    groups.push(Group {
                        category,
                        hue,
                        values,
                    });
                }
            }
        }

        if groups.is_empty() {
            return Err(GraphError::EmptySelection);
        }

        Ok(GroupedValues {
            categories,
            hue_levels,
            groups,
        })
    }

    /// Row-aligned (x, y) pairs of two numeric columns, skipping rows where
    /// either side is missing.
    pub fn paired_values(
        df: &DataFrame,
        x_col: &str,
        y_col: &str,
    ) -> GraphResult<(Vec<f64>, Vec<f64>)> {
        let xs = Self::numeric_values(df, x_col)?;
        let ys = Self::numeric_values(df, y_col)?;

        let (xs, ys): (Vec<f64>, Vec<f64>) = xs
            .into_iter()
            .zip(ys)
            .filter_map(|(x, y)| Some((x?, y?)))
            .unzip();

        if xs.is_empty() {
            return Err(GraphError::EmptySelection);
        }
        Ok((xs, ys))
    }

    /// Every value of one numeric column, in row order. A null or
    /// non-finite row fails with `MissingValue` instead of being skipped.
    pub fn column_values(df: &DataFrame, name: &str) -> GraphResult<Vec<f64>> {
        let values = Self::numeric_values(df, name)?;
        if values.is_empty() {
            return Err(GraphError::EmptySelection);
        }
        values
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                v.ok_or_else(|| GraphError::MissingValue {
                    column: name.to_string(),
                    row,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tips() -> DataFrame {
        df!(
            "day" => ["Thu", "Fri", "Thu", "Sat", "Fri", "Sat"],
            "sex" => ["M", "F", "F", "M", "M", "F"],
            "total" => [10.0, 20.0, 14.0, 31.0, 22.0, 29.0],
            "size" => [2i64, 3, 2, 4, 1, 3]
        )
        .unwrap()
    }

    #[test]
    fn text_levels_keep_first_appearance_order() {
        let (levels, _) = DataProcessor::level_order(&tips(), "day").unwrap();
        assert_eq!(levels, vec!["Thu", "Fri", "Sat"]);
    }

    #[test]
    fn numeric_levels_are_sorted_by_value() {
        let (levels, _) = DataProcessor::level_order(&tips(), "size").unwrap();
        assert_eq!(levels, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn groups_follow_category_then_hue_order() {
        let grouped =
            DataProcessor::group_by_category(&tips(), Some("day"), "total", Some("sex")).unwrap();
        assert_eq!(grouped.hue_levels, vec!["M", "F"]);
        let keys: Vec<(usize, Option<usize>)> =
            grouped.groups.iter().map(|g| (g.category, g.hue)).collect();
        assert_eq!(
            keys,
            vec![
                (0, Some(0)),
                (0, Some(1)),
                (1, Some(0)),
                (1, Some(1)),
                (2, Some(0)),
                (2, Some(1)),
            ]
        );
        assert_eq!(grouped.groups[0].values, vec![10.0]);
    }

    #[test]
    fn missing_category_column_uses_one_group() {
        let grouped = DataProcessor::group_by_category(&tips(), None, "total", None).unwrap();
        assert_eq!(grouped.categories, vec![String::new()]);
        assert_eq!(grouped.groups.len(), 1);
        assert_eq!(grouped.groups[0].values.len(), 6);
    }

    #[test]
    fn rows_with_missing_values_are_dropped() {
        let df = df!(
            "x" => [Some(1.0), None, Some(3.0), Some(f64::NAN)],
            "y" => [Some(2.0), Some(4.0), None, Some(8.0)]
        )
        .unwrap();
        let (xs, ys) = DataProcessor::paired_values(&df, "x", "y").unwrap();
        assert_eq!(xs, vec![1.0]);
        assert_eq!(ys, vec![2.0]);
    }

    #[test]
    fn quoted_labels_stay_distinct() {
        let df = df!(
            "grp" => ["a", "\"a\"", "a", "\"a\""],
            "v" => [1.0, 2.0, 3.0, 4.0]
        )
        .unwrap();
        let grouped = DataProcessor::group_by_category(&df, Some("grp"), "v", None).unwrap();
        assert_eq!(grouped.categories, vec!["a", "\"a\""]);
        assert_eq!(grouped.groups.len(), 2);
        assert_eq!(grouped.groups[1].values, vec![2.0, 4.0]);
    }

    #[test]
    fn column_values_keep_row_alignment() {
        let df = df!("share" => [Some(1.0), None, Some(3.0)]).unwrap();
        let err = DataProcessor::column_values(&df, "share").unwrap_err();
        assert!(matches!(
            err,
            GraphError::MissingValue { ref column, row: 1 } if column == "share"
        ));

        let full = df!("share" => [1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            DataProcessor::column_values(&full, "share").unwrap(),
            vec![1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn text_value_column_is_rejected() {
        let err = DataProcessor::column_values(&tips(), "day").unwrap_err();
        assert!(matches!(err, GraphError::NonNumericColumn(ref c) if c == "day"));
    }

    #[test]
    fn unknown_column_is_reported_by_name() {
        let err = DataProcessor::column_values(&tips(), "tip").unwrap_err();
        assert!(matches!(err, GraphError::ColumnNotFound(ref c) if c == "tip"));
    }
}
