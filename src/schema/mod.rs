//! Shared worklog data model.
//!
//! Mirrors the payload returned by the worklog endpoint:
//!
//! ```json
//! { "data": { "AuthorWorklog": { "activityMeta": [...], "rows": [...] } } }
//! ```
//!
//! Numeric fields (`count`, `value`) arrive as strings. They are kept as
//! strings here and parsed on demand with [`parse_count`], which never fails.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Payload envelope
// ---------------------------------------------------------------------------

/// Top-level API response: `{ "data": { "AuthorWorklog": ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorklogResponse {
    pub data: WorklogData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorklogData {
    #[serde(rename = "AuthorWorklog")]
    pub author_worklog: WorklogDataset,
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// A named, colored kind of tracked activity (commits, reviews, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCategory {
    pub label: String,
    pub fill_color: String,
}

/// One per-category total for an author, used by the summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalActivityEntry {
    pub name: String,
    pub value: String,
}

/// One category's count on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayActivityItem {
    pub count: String,
    pub label: String,
    #[serde(default)]
    pub fill_color: String,
}

/// Wrapper matching the `items.children` nesting of the wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayItems {
    #[serde(default)]
    pub children: Vec<DayActivityItem>,
}

/// A single day of activity. `date` is an opaque ordering key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: String,
    #[serde(default)]
    pub items: DayItems,
}

impl DayRecord {
    /// The day's items in payload order.
    pub fn items(&self) -> &[DayActivityItem] {
        &self.items.children
    }

    /// Find the item for a category label.
    pub fn item_for(&self, label: &str) -> Option<&DayActivityItem> {
        self.items.children.iter().find(|item| item.label == label)
    }

    /// Sum of all item counts for the day, saturating at the `i64` bounds.
    pub fn total(&self) -> i64 {
        self.items
            .children
            .iter()
            .map(|item| parse_count(&item.count))
            .fold(0, i64::saturating_add)
    }
}

/// All activity for one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorRow {
    pub name: String,
    #[serde(default)]
    pub total_activity: Vec<TotalActivityEntry>,
    #[serde(default)]
    pub day_wise_activity: Vec<DayRecord>,
}

impl AuthorRow {
    /// Look up the total for a category by name. `None` when the payload has
    /// no entry for it.
    pub fn total_for(&self, label: &str) -> Option<&TotalActivityEntry> {
        self.total_activity.iter().find(|entry| entry.name == label)
    }
}

/// Root entity: the global category list plus every author row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogDataset {
    #[serde(default)]
    pub activity_meta: Vec<ActivityCategory>,
    #[serde(default)]
    pub rows: Vec<AuthorRow>,
}

impl WorklogDataset {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find an author row by name.
    pub fn author(&self, name: &str) -> Option<&AuthorRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    /// Check the dataset against the shape the views expect.
    ///
    /// Every finding is non-fatal: the views default missing values, so these
    /// are reported for logging only.
    pub fn validate(&self) -> Vec<SchemaWarning> {
        let mut warnings = Vec::new();

        let mut seen = HashSet::new();
        for category in &self.activity_meta {
            if category.label.trim().is_empty() {
                warnings.push(SchemaWarning::EmptyCategoryLabel);
            } else if !seen.insert(category.label.as_str()) {
                warnings.push(SchemaWarning::DuplicateCategory(category.label.clone()));
            }
        }

        let mut authors = HashSet::new();
        for row in &self.rows {
            if !authors.insert(row.name.as_str()) {
                warnings.push(SchemaWarning::DuplicateAuthor(row.name.clone()));
            }

            for category in &self.activity_meta {
                if row.total_for(&category.label).is_none() {
                    warnings.push(SchemaWarning::MissingTotal {
                        author: row.name.clone(),
                        category: category.label.clone(),
                    });
                }
            }

            for entry in &row.total_activity {
                if !seen.contains(entry.name.as_str()) {
                    warnings.push(SchemaWarning::UnknownTotal {
                        author: row.name.clone(),
                        name: entry.name.clone(),
                    });
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Shape warnings
// ---------------------------------------------------------------------------

/// A non-fatal mismatch between the payload and the expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaWarning {
    EmptyCategoryLabel,
    DuplicateCategory(String),
    DuplicateAuthor(String),
    /// An author has no total entry for a category in `activityMeta`.
    MissingTotal { author: String, category: String },
    /// An author has a total entry naming a category not in `activityMeta`.
    UnknownTotal { author: String, name: String },
}

impl fmt::Display for SchemaWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCategoryLabel => write!(f, "activity category with empty label"),
            Self::DuplicateCategory(label) => write!(f, "duplicate activity category '{label}'"),
            Self::DuplicateAuthor(name) => write!(f, "duplicate author row '{name}'"),
            Self::MissingTotal { author, category } => {
                write!(f, "author '{author}' has no total for '{category}'")
            }
            Self::UnknownTotal { author, name } => {
                write!(f, "author '{author}' has a total for unknown category '{name}'")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Numeric strings
// ---------------------------------------------------------------------------

/// Parse a numeric-string field, defaulting to `0`.
///
/// Reads an optional sign and the leading run of ASCII digits after trimming
/// whitespace, so `"7.9"` is `7` and `"5 commits"` is `5`. Values that do not
/// start with an integer, and values that overflow, are `0`.
pub fn parse_count(raw: &str) -> i64 {
    let s = raw.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }

    match digits[..end].parse::<i64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => 0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r##"{
        "data": {
            "AuthorWorklog": {
                "activityMeta": [
                    { "label": "Commits", "fillColor": "#EF6B6B" },
                    { "label": "PR Open", "fillColor": "#61CDBB" }
                ],
                "rows": [
                    {
                        "name": "alice@example.com",
                        "totalActivity": [
                            { "name": "Commits", "value": "12" },
                            { "name": "PR Open", "value": "3" }
                        ],
                        "dayWiseActivity": [
                            {
                                "date": "2024-05-01",
                                "items": {
                                    "children": [
                                        { "count": "4", "label": "Commits", "fillColor": "#EF6B6B" }
                                    ]
                                }
                            }
                        ]
                    }
                ]
            }
        }
    }"##;

    #[test]
    fn payload_deserializes_with_wire_names() {
        let resp: WorklogResponse = serde_json::from_str(PAYLOAD).unwrap();
        let ds = resp.data.author_worklog;
        assert_eq!(ds.activity_meta.len(), 2);
        assert_eq!(ds.activity_meta[1].fill_color, "#61CDBB");
        assert_eq!(ds.rows[0].day_wise_activity[0].items()[0].count, "4");
        assert!(ds.validate().is_empty());
    }

    #[test]
    fn missing_arrays_default_to_empty() {
        let ds: WorklogDataset =
            serde_json::from_str(r#"{ "rows": [ { "name": "bob" } ] }"#).unwrap();
        assert!(ds.activity_meta.is_empty());
        assert!(ds.rows[0].day_wise_activity.is_empty());
        assert!(ds.rows[0].total_activity.is_empty());
    }

    #[test]
    fn parse_count_defaults_to_zero() {
        assert_eq!(parse_count("3"), 3);
        assert_eq!(parse_count(" 42 "), 42);
        assert_eq!(parse_count("7.9"), 7);
        assert_eq!(parse_count("5 commits"), 5);
        assert_eq!(parse_count("-2"), -2);
        assert_eq!(parse_count("abc"), 0);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("-"), 0);
        assert_eq!(parse_count("99999999999999999999999"), 0);
    }

    #[test]
    fn day_lookup_and_total() {
        let day = DayRecord {
            date: "2024-05-02".to_string(),
            items: DayItems {
                children: vec![
                    DayActivityItem {
                        count: "2".to_string(),
                        label: "Commits".to_string(),
                        fill_color: String::new(),
                    },
                    DayActivityItem {
                        count: "x".to_string(),
                        label: "PR Open".to_string(),
                        fill_color: String::new(),
                    },
                ],
            },
        };
        assert_eq!(day.item_for("Commits").map(|i| i.count.as_str()), Some("2"));
        assert!(day.item_for("Reviews").is_none());
        assert_eq!(day.total(), 2);
    }

    #[test]
    fn validate_reports_mismatches() {
        let ds = WorklogDataset {
            activity_meta: vec![
                ActivityCategory {
                    label: "Commits".to_string(),
                    fill_color: "#fff".to_string(),
                },
                ActivityCategory {
                    label: "Commits".to_string(),
                    fill_color: "#000".to_string(),
                },
                ActivityCategory {
                    label: "".to_string(),
                    fill_color: "#000".to_string(),
                },
            ],
            rows: vec![AuthorRow {
                name: "carol".to_string(),
                total_activity: vec![TotalActivityEntry {
                    name: "Meetings".to_string(),
                    value: "1".to_string(),
                }],
                day_wise_activity: Vec::new(),
            }],
        };

        let warnings = ds.validate();
        assert!(warnings.contains(&SchemaWarning::DuplicateCategory("Commits".to_string())));
        assert!(warnings.contains(&SchemaWarning::EmptyCategoryLabel));
        assert!(warnings.contains(&SchemaWarning::MissingTotal {
            author: "carol".to_string(),
            category: "Commits".to_string(),
        }));
        assert!(warnings.contains(&SchemaWarning::UnknownTotal {
            author: "carol".to_string(),
            name: "Meetings".to_string(),
        }));
    }
}
