//! Per-author totals table.
//!
//! Columns follow the global category order. Each cell is looked up by
//! category name in the author's `totalActivity`, so a payload that lists
//! totals in a different order, or omits some, still lines up. A missing
//! entry is an absent cell, not zero.

use serde::Serialize;

use crate::schema::{WorklogDataset, parse_count};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryTable {
    /// Category labels, in display order.
    pub columns: Vec<String>,
    /// Category colors, aligned to `columns`.
    pub colors: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub author: String,
    /// Aligned to [`SummaryTable::columns`]; `None` where the payload has no
    /// total for that category.
    pub cells: Vec<Option<i64>>,
}

impl SummaryRow {
    /// Sum of the present cells, saturating at the `i64` bounds.
    pub fn total(&self) -> i64 {
        self.cells.iter().flatten().fold(0, |acc, v| acc.saturating_add(*v))
    }
}

impl SummaryTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column sums over all authors, skipping absent cells.
    pub fn column_totals(&self) -> Vec<i64> {
        (0..self.columns.len())
            .map(|c| {
                self.rows
                    .iter()
                    .filter_map(|r| r.cells.get(c).copied().flatten())
                    .fold(0, i64::saturating_add)
            })
            .collect()
    }
}

/// Build the totals table for every author in the dataset.
pub fn build_summary(dataset: &WorklogDataset) -> SummaryTable {
    let columns = dataset
        .activity_meta
        .iter()
        .map(|c| c.label.clone())
        .collect();
    let colors = dataset
        .activity_meta
        .iter()
        .map(|c| c.fill_color.clone())
        .collect();

    let rows = dataset
        .rows
        .iter()
        .map(|row| SummaryRow {
            author: row.name.clone(),
            cells: dataset
                .activity_meta
                .iter()
                .map(|c| row.total_for(&c.label).map(|e| parse_count(&e.value)))
                .collect(),
        })
        .collect();

    SummaryTable {
        columns,
        colors,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ActivityCategory, AuthorRow, TotalActivityEntry};

    fn dataset() -> WorklogDataset {
        let cat = |l: &str| ActivityCategory {
            label: l.to_string(),
            fill_color: "#000".to_string(),
        };
        let total = |n: &str, v: &str| TotalActivityEntry {
            name: n.to_string(),
            value: v.to_string(),
        };
        WorklogDataset {
            activity_meta: vec![cat("Commits"), cat("Reviews"), cat("Merged")],
            rows: vec![
                AuthorRow {
                    name: "alice".to_string(),
                    total_activity: vec![total("Reviews", "4"), total("Commits", "10")],
                    day_wise_activity: Vec::new(),
                },
                AuthorRow {
                    name: "bob".to_string(),
                    total_activity: vec![total("Commits", "oops"), total("Merged", "2")],
                    day_wise_activity: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn cells_follow_category_order() {
        let table = build_summary(&dataset());
        assert_eq!(table.columns, vec!["Commits", "Reviews", "Merged"]);
        assert_eq!(table.rows[0].cells, vec![Some(10), Some(4), None]);
    }

    #[test]
    fn non_numeric_total_is_zero_and_missing_is_absent() {
        let table = build_summary(&dataset());
        assert_eq!(table.rows[1].cells, vec![Some(0), None, Some(2)]);
        assert_eq!(table.rows[1].total(), 2);
    }

    #[test]
    fn column_totals_skip_absent() {
        let table = build_summary(&dataset());
        assert_eq!(table.column_totals(), vec![10, 4, 2]);
    }

    #[test]
    fn totals_saturate_on_huge_counts() {
        let mut data = dataset();
        data.rows[0].total_activity[0].value = i64::MAX.to_string();
        data.rows[1].total_activity[0].value = i64::MAX.to_string();
        let table = build_summary(&data);
        assert_eq!(table.rows[0].total(), i64::MAX);
        assert_eq!(table.column_totals()[0], i64::MAX);
    }

    #[test]
    fn empty_dataset_has_no_rows() {
        let table = build_summary(&WorklogDataset::default());
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
    }
}
