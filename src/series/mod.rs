//! Chart series builder.
//!
//! Turns one author's day-wise breakdown plus the global category list into
//! a dense matrix: one dataset per category, one value per day. Categories
//! and days are matched by label/date equality, never by position, so a day
//! whose items are missing or reordered still lands in the right column.

use serde::{Deserialize, Serialize};

use crate::schema::{ActivityCategory, AuthorRow, DayRecord, WorklogDataset, parse_count};

/// Default chart title.
pub const DEFAULT_TITLE: &str = "Activity Data";

// ---------------------------------------------------------------------------
// Series types
// ---------------------------------------------------------------------------

/// Day-aligned, category-aligned numeric matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// X-axis labels, one per day, in day order.
    pub labels: Vec<String>,
    /// One dataset per category, in category order.
    pub datasets: Vec<SeriesDataset>,
}

/// Values for a single category across all days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDataset {
    pub category: String,
    pub color: String,
    /// Aligned to [`ChartSeries::labels`].
    pub values: Vec<i64>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.datasets.is_empty()
    }

    /// Largest single value in the matrix, or 0.
    pub fn max_value(&self) -> i64 {
        self.datasets
            .iter()
            .flat_map(|ds| ds.values.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Per-day sum across all categories. Saturates instead of overflowing,
    /// and a dataset shorter than `labels` contributes 0 for the missing days.
    pub fn day_totals(&self) -> Vec<i64> {
        (0..self.labels.len())
            .map(|i| {
                self.datasets
                    .iter()
                    .map(|ds| ds.values.get(i).copied().unwrap_or(0))
                    .fold(0, i64::saturating_add)
            })
            .collect()
    }
}

/// Display configuration carried alongside a series.
///
/// A change to either the series or these options makes the chart surface
/// stale and triggers a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartOptions {
    pub title: String,
    pub show_title: bool,
    /// Inline legend drawn by the backend. The standalone legend beside the
    /// chart is always rendered from the category list.
    pub show_legend: bool,
    pub begin_at_zero: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            show_title: true,
            show_legend: false,
            begin_at_zero: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the aligned series for a day list.
///
/// `datasets.len() == categories.len()` and every dataset has exactly
/// `days.len()` values. A day without an item for a category contributes
/// `0`, as does an item whose count is not numeric.
pub fn build_series(categories: &[ActivityCategory], days: &[DayRecord]) -> ChartSeries {
    let labels = days.iter().map(|day| day.date.clone()).collect();

    let datasets = categories
        .iter()
        .map(|category| SeriesDataset {
            category: category.label.clone(),
            color: category.fill_color.clone(),
            values: days
                .iter()
                .map(|day| {
                    day.item_for(&category.label)
                        .map(|item| parse_count(&item.count))
                        .unwrap_or(0)
                })
                .collect(),
        })
        .collect();

    ChartSeries { labels, datasets }
}

/// Build the series for a selected author of a dataset.
pub fn build_author_series(dataset: &WorklogDataset, author: &AuthorRow) -> ChartSeries {
    build_series(&dataset.activity_meta, &author.day_wise_activity)
}

/// Pick the author the chart reflects.
///
/// The named author when present, otherwise the first row. `None` only when
/// the dataset has no rows.
pub fn select_author<'a>(dataset: &'a WorklogDataset, name: Option<&str>) -> Option<&'a AuthorRow> {
    name.filter(|n| !n.is_empty())
        .and_then(|n| dataset.author(n))
        .or_else(|| dataset.rows.first())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DayActivityItem, DayItems};

    fn category(label: &str) -> ActivityCategory {
        ActivityCategory {
            label: label.to_string(),
            fill_color: format!("#{}", label.len()),
        }
    }

    fn day(date: &str, items: &[(&str, &str)]) -> DayRecord {
        DayRecord {
            date: date.to_string(),
            items: DayItems {
                children: items
                    .iter()
                    .map(|(label, count)| DayActivityItem {
                        count: count.to_string(),
                        label: label.to_string(),
                        fill_color: String::new(),
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn reordered_items_align_by_label() {
        let cats = [category("Commits"), category("Reviews")];
        let days = [
            day("d1", &[("Reviews", "2"), ("Commits", "5")]),
            day("d2", &[("Commits", "1")]),
        ];
        let series = build_series(&cats, &days);
        assert_eq!(series.datasets[0].values, vec![5, 1]);
        assert_eq!(series.datasets[1].values, vec![2, 0]);
    }

    #[test]
    fn unknown_item_labels_are_ignored() {
        let cats = [category("Commits")];
        let days = [day("d1", &[("Meetings", "9")])];
        let series = build_series(&cats, &days);
        assert_eq!(series.datasets.len(), 1);
        assert_eq!(series.datasets[0].values, vec![0]);
    }

    #[test]
    fn non_numeric_count_is_zero() {
        let cats = [category("Commits")];
        let days = [day("d1", &[("Commits", "n/a")])];
        assert_eq!(build_series(&cats, &days).datasets[0].values, vec![0]);
    }

    #[test]
    fn colors_follow_categories() {
        let cats = [category("Commits")];
        let series = build_series(&cats, &[]);
        assert_eq!(series.datasets[0].color, "#7");
        assert!(series.datasets[0].values.is_empty());
        assert!(series.is_empty());
    }

    #[test]
    fn totals_and_max() {
        let cats = [category("A"), category("B")];
        let days = [day("d1", &[("A", "1"), ("B", "4")]), day("d2", &[("B", "2")])];
        let series = build_series(&cats, &days);
        assert_eq!(series.day_totals(), vec![5, 2]);
        assert_eq!(series.max_value(), 4);
    }

    #[test]
    fn day_totals_saturate() {
        let cats = [category("A"), category("B")];
        let max = i64::MAX.to_string();
        let days = [day("d1", &[("A", max.as_str()), ("B", max.as_str())])];
        let series = build_series(&cats, &days);
        assert_eq!(series.day_totals(), vec![i64::MAX]);
    }

    #[test]
    fn day_totals_tolerate_short_datasets() {
        let cats = [category("A"), category("B")];
        let days = [day("d1", &[("A", "1"), ("B", "4")]), day("d2", &[("A", "3")])];
        let mut series = build_series(&cats, &days);
        series.datasets[1].values.truncate(1);
        assert_eq!(series.day_totals(), vec![5, 3]);
    }

    #[test]
    fn select_author_falls_back_to_first() {
        let ds = WorklogDataset {
            activity_meta: Vec::new(),
            rows: vec![
                AuthorRow {
                    name: "first".to_string(),
                    total_activity: Vec::new(),
                    day_wise_activity: Vec::new(),
                },
                AuthorRow {
                    name: "second".to_string(),
                    total_activity: Vec::new(),
                    day_wise_activity: Vec::new(),
                },
            ],
        };
        assert_eq!(select_author(&ds, None).unwrap().name, "first");
        assert_eq!(select_author(&ds, Some("")).unwrap().name, "first");
        assert_eq!(select_author(&ds, Some("second")).unwrap().name, "second");
        assert_eq!(select_author(&ds, Some("nobody")).unwrap().name, "first");
        assert!(select_author(&WorklogDataset::default(), None).is_none());
    }
}
