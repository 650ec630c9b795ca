use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use taxport_core::{RawRow, YearMonth};

use crate::util::parse_date;

/// Accounts left out of the tax export: owner funding and petty cash.
pub const DEFAULT_EXCLUDED_ACCOUNTS: &[&str] = &["Owner Investment / Drawings", "Cash on Hand"];

/// Selection applied to raw rows before they are normalized or exported.
/// Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFilter {
    #[serde(default)]
    pub excluded_accounts: Vec<String>,
    pub year: Option<i32>,
    pub month: Option<YearMonth>,
    pub category: Option<String>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter used for TXF export: drops the default excluded accounts.
    pub fn for_export() -> Self {
        Self {
            excluded_accounts: DEFAULT_EXCLUDED_ACCOUNTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ..Self::default()
        }
    }

    pub fn excluding(mut self, account: impl Into<String>) -> Self {
        self.excluded_accounts.push(account.into());
        self
    }

    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_month(mut self, month: Option<YearMonth>) -> Self {
        self.month = month;
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn matches(&self, row: &RawRow) -> bool {
        let category = row.category();
        if self.excluded_accounts.iter().any(|a| a == category) {
            return false;
        }
        if let Some(wanted) = &self.category {
            if wanted != category {
                return false;
            }
        }
        if let Some(year) = self.year {
            if row_year(row) != Some(year) {
                return false;
            }
        }
        if let Some(month) = self.month {
            let in_month = row
                .date()
                .and_then(parse_date)
                .is_some_and(|d| month.contains(d));
            if !in_month {
                return false;
            }
        }
        true
    }

    /// Matching rows, in input order.
    pub fn apply(&self, rows: &[RawRow]) -> Vec<RawRow> {
        let kept: Vec<RawRow> = rows.iter().filter(|r| self.matches(r)).cloned().collect();
        tracing::debug!(input = rows.len(), kept = kept.len(), "Filtered rows");
        kept
    }
}

/// Year of a row's date. Falls back to a leading four-digit year when the
/// date itself does not parse.
fn row_year(row: &RawRow) -> Option<i32> {
    let raw = row.date()?;
    if let Some(date) = parse_date(raw) {
        return Some(date.year());
    }
    raw.get(..4)
        .filter(|y| y.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|y| y.parse().ok())
}

/// Distinct years present in the rows, newest first.
pub fn available_years(rows: &[RawRow]) -> Vec<i32> {
    let years: BTreeSet<i32> = rows.iter().filter_map(row_year).collect();
    years.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: &str, date: &str) -> RawRow {
        RawRow::from_iter([("Account Name", category), ("Transaction Date", date)])
    }

    fn sample() -> Vec<RawRow> {
        vec![
            row("Owner Investment / Drawings", "2025-10-24"),
            row("Computer – Hosting", "2025-10-24"),
            row("Cash on Hand", "2025-11-01"),
            row("Dues & Subscriptions", "2025-11-08"),
            row("Rent", "2024-12-01"),
        ]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        assert_eq!(RowFilter::new().apply(&sample()).len(), 5);
    }

    #[test]
    fn export_filter_drops_default_accounts() {
        let kept = RowFilter::for_export().apply(&sample());
        let names: Vec<&str> = kept.iter().map(|r| r.category()).collect();
        assert_eq!(names, vec!["Computer – Hosting", "Dues & Subscriptions", "Rent"]);
    }

    #[test]
    fn year_filter() {
        let kept = RowFilter::new().with_year(Some(2024)).apply(&sample());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].category(), "Rent");
    }

    #[test]
    fn year_filter_accepts_us_dates() {
        let rows = vec![row("Rent", "12/01/2024"), row("Rent", "01/05/2025")];
        let kept = RowFilter::new().with_year(Some(2025)).apply(&rows);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn month_filter() {
        let month = "2025-11".parse().ok();
        let kept = RowFilter::new().with_month(month).apply(&sample());
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn month_filter_drops_rows_without_date() {
        let rows = vec![RawRow::from_iter([("Category", "Rent")])];
        let kept = RowFilter::new().with_month("2025-11".parse().ok()).apply(&rows);
        assert!(kept.is_empty());
    }

    #[test]
    fn category_filter_is_exact() {
        let kept = RowFilter::new()
            .with_category(Some("Rent".to_string()))
            .apply(&sample());
        assert_eq!(kept.len(), 1);
        let kept = RowFilter::new()
            .with_category(Some("rent".to_string()))
            .apply(&sample());
        assert!(kept.is_empty());
    }

    #[test]
    fn criteria_combine() {
        let filter = RowFilter::for_export()
            .excluding("Dues & Subscriptions")
            .with_year(Some(2025));
        let kept = filter.apply(&sample());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].category(), "Computer – Hosting");
    }

    #[test]
    fn available_years_newest_first() {
        let mut rows = sample();
        rows.push(RawRow::from_iter([("Date", "2023 (approx)")]));
        rows.push(RawRow::new());
        assert_eq!(available_years(&rows), vec![2025, 2024, 2023]);
    }
}
