use taxport_core::{CanonicalTransaction, CategoryMapper, Clock, Money, RawRow};
use thiserror::Error;

use crate::util::{parse_amount, parse_date};

/// Why a row was left out of the normalized set. Never fatal for a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),
    #[error("Invalid date: '{0}'")]
    InvalidDate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub index: usize,
    pub error: NormalizeError,
}

/// Outcome of normalizing a batch: the accepted transactions in input order
/// plus one entry per skipped row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub transactions: Vec<CanonicalTransaction>,
    pub rejections: Vec<Rejection>,
}

impl Normalized {
    pub fn accepted(&self) -> usize {
        self.transactions.len()
    }

    pub fn skipped(&self) -> usize {
        self.rejections.len()
    }
}

pub struct Normalizer<'a> {
    mapper: &'a CategoryMapper,
    clock: &'a dyn Clock,
}

impl<'a> Normalizer<'a> {
    pub fn new(mapper: &'a CategoryMapper, clock: &'a dyn Clock) -> Self {
        Self { mapper, clock }
    }

    /// Normalizes the row at position `index`.
    ///
    /// Only an amount or date that cannot be parsed rejects the row; every
    /// other field falls back to a default. A row without any date takes
    /// today's date from the clock.
    pub fn normalize_row(
        &self,
        row: &RawRow,
        index: usize,
    ) -> Result<CanonicalTransaction, NormalizeError> {
        let raw_amount = row.amount();
        let amount = parse_amount(raw_amount)
            .ok_or_else(|| NormalizeError::InvalidAmount(raw_amount.to_string()))?;

        let raw_category = row.category();

        let date = match row.date() {
            Some(raw_date) => parse_date(raw_date)
                .ok_or_else(|| NormalizeError::InvalidDate(raw_date.to_string()))?,
            None => self.clock.today(),
        };

        Ok(CanonicalTransaction {
            id: CanonicalTransaction::synthetic_id(index),
            date,
            description: row.description().to_string(),
            amount: Money::from_decimal(amount),
            category: self.mapper.standard_category(raw_category),
            raw_category: raw_category.to_string(),
            account_type: row.account_type().map(str::to_string),
            account_group: row.account_group().map(str::to_string),
        })
    }

    /// Normalizes every row, skipping the ones that fail.
    pub fn normalize_rows(&self, rows: &[RawRow]) -> Normalized {
        let mut out = Normalized::default();

        for (index, row) in rows.iter().enumerate() {
            match self.normalize_row(row, index) {
                Ok(tx) => out.transactions.push(tx),
                Err(error) => {
                    tracing::warn!(index, %error, "Skipping row");
                    out.rejections.push(Rejection { index, error });
                }
            }
        }

        tracing::debug!(
            input = rows.len(),
            accepted = out.accepted(),
            skipped = out.skipped(),
            "Normalized rows"
        );
        out
    }
}

pub fn normalize_transaction(
    row: &RawRow,
    index: usize,
    clock: &dyn Clock,
) -> Result<CanonicalTransaction, NormalizeError> {
    Normalizer::new(CategoryMapper::builtin(), clock).normalize_row(row, index)
}

pub fn normalize_transactions(rows: &[RawRow], clock: &dyn Clock) -> Normalized {
    Normalizer::new(CategoryMapper::builtin(), clock).normalize_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use taxport_core::{FixedClock, StandardCategory};

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap())
    }

    fn row(fields: &[(&str, &str)]) -> RawRow {
        fields.iter().copied().collect()
    }

    fn money(s: &str) -> Money {
        Money::from_decimal(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn normalizes_basic_row() {
        let r = row(&[
            ("Category", "Sales"),
            ("Amount", "100.00"),
            ("Date", "2025-01-15"),
            ("Description", "Invoice 1"),
        ]);
        let tx = normalize_transaction(&r, 0, &clock()).unwrap();
        assert_eq!(tx.id, "tx_0");
        assert_eq!(tx.amount, money("100"));
        assert_eq!(tx.category, StandardCategory::Income);
        assert_eq!(tx.raw_category, "Sales");
        assert_eq!(tx.description, "Invoice 1");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    }

    #[test]
    fn strips_currency_and_separators() {
        let tx = normalize_transaction(&row(&[("Amount", "$1,234.56")]), 3, &clock()).unwrap();
        assert_eq!(tx.amount, money("1234.56"));
        let tx = normalize_transaction(&row(&[("Amount", "-45.00")]), 4, &clock()).unwrap();
        assert_eq!(tx.amount, money("-45"));
    }

    #[test]
    fn accounting_export_columns() {
        let r = row(&[
            ("Transaction Date", "2025-11-17"),
            ("Account Name", "Dues & Subscriptions"),
            ("Transaction Description", "HubSpot 1-year Starter Seat"),
            ("Transaction Line Description", ""),
            ("Amount (One column)", "108.00"),
            ("Account Group", "Expense"),
            ("Account Type", "Operating Expense"),
        ]);
        let tx = normalize_transaction(&r, 21, &clock()).unwrap();
        assert_eq!(tx.id, "tx_21");
        assert_eq!(tx.category, StandardCategory::OtherExpenses);
        assert_eq!(tx.description, "HubSpot 1-year Starter Seat");
        assert_eq!(tx.account_group.as_deref(), Some("Expense"));
        assert_eq!(tx.account_type.as_deref(), Some("Operating Expense"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let tx = normalize_transaction(&RawRow::new(), 0, &clock()).unwrap();
        assert!(tx.amount.is_zero());
        assert_eq!(tx.raw_category, "Uncategorized");
        assert_eq!(tx.category, StandardCategory::Uncategorized);
        assert_eq!(tx.description, "No Description");
        assert_eq!(tx.date, clock().0);
        assert_eq!(tx.account_group, None);
    }

    #[test]
    fn unknown_category_is_uncategorized_but_kept_raw() {
        let tx = normalize_transaction(&row(&[("Category", "Connecticut")]), 0, &clock()).unwrap();
        assert_eq!(tx.category, StandardCategory::Uncategorized);
        assert_eq!(tx.raw_category, "Connecticut");
    }

    #[test]
    fn invalid_amount_is_rejected() {
        let err = normalize_transaction(&row(&[("Amount", "abc")]), 0, &clock()).unwrap_err();
        assert_eq!(err, NormalizeError::InvalidAmount("abc".to_string()));
    }

    #[test]
    fn empty_primary_amount_does_not_fall_through() {
        let r = row(&[("Amount", ""), ("Amount (One column)", "5.00")]);
        assert!(matches!(
            normalize_transaction(&r, 0, &clock()),
            Err(NormalizeError::InvalidAmount(_))
        ));
    }

    #[test]
    fn invalid_date_is_rejected() {
        let r = row(&[("Amount", "1"), ("Date", "someday")]);
        let err = normalize_transaction(&r, 0, &clock()).unwrap_err();
        assert_eq!(err, NormalizeError::InvalidDate("someday".to_string()));
    }

    #[test]
    fn empty_date_uses_today() {
        let r = row(&[("Amount", "1"), ("Date", ""), ("Transaction Date", "")]);
        let tx = normalize_transaction(&r, 0, &clock()).unwrap();
        assert_eq!(tx.date, clock().0);
    }

    #[test]
    fn batch_skips_bad_rows_and_tallies() {
        let rows = vec![
            row(&[("Amount", "10"), ("Category", "Sales")]),
            row(&[("Amount", "abc")]),
            row(&[("Amount", "-5"), ("Category", "Rent")]),
        ];
        let out = normalize_transactions(&rows, &clock());
        assert_eq!(out.accepted(), 2);
        assert_eq!(out.skipped(), 1);
        assert_eq!(out.transactions.len(), rows.len() - 1);
        assert_eq!(out.rejections[0].index, 1);
        // Ids follow the input position, not the output position.
        assert_eq!(out.transactions[0].id, "tx_0");
        assert_eq!(out.transactions[1].id, "tx_2");
    }

    #[test]
    fn batch_output_never_grows() {
        let rows = vec![
            row(&[("Amount", "x")]),
            row(&[("Amount", "y"), ("Date", "2025-01-01")]),
            row(&[("Amount", "1"), ("Date", "bad")]),
        ];
        let out = normalize_transactions(&rows, &clock());
        assert!(out.accepted() <= rows.len());
        assert_eq!(out.accepted(), 0);
        assert_eq!(out.skipped(), 3);
    }

    #[test]
    fn empty_batch() {
        let out = normalize_transactions(&[], &clock());
        assert_eq!(out, Normalized::default());
    }

    #[test]
    fn custom_mapper_is_used() {
        let mut categories = std::collections::BTreeMap::new();
        categories.insert("Connecticut".to_string(), "Other Expenses".to_string());
        let mapper = CategoryMapper::builtin()
            .with_overrides(&categories, &Default::default())
            .unwrap();
        let c = clock();
        let normalizer = Normalizer::new(&mapper, &c);
        let tx = normalizer
            .normalize_row(&row(&[("Category", "Connecticut")]), 0)
            .unwrap();
        assert_eq!(tx.category, StandardCategory::OtherExpenses);
    }
}
