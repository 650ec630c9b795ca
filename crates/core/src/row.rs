//! Loosely-typed input rows and the header aliases used to read them.
//!
//! Accounting exports name the same column differently depending on the
//! report variant, so every logical field is read from an ordered list of
//! keys. The first key present wins, even when its value is empty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const AMOUNT_FIELDS: &[&str] = &["Amount", "Amount (One column)"];
pub const CATEGORY_FIELDS: &[&str] = &["Category", "Account Name"];
pub const DESCRIPTION_FIELDS: &[&str] = &[
    "Description",
    "Transaction Description",
    "Transaction Line Description",
];
pub const DATE_FIELDS: &[&str] = &["Date", "Transaction Date"];
pub const ACCOUNT_TYPE_FIELD: &str = "Account Type";
pub const ACCOUNT_GROUP_FIELD: &str = "Account Group";

pub const DEFAULT_AMOUNT: &str = "0";
pub const DEFAULT_CATEGORY: &str = "Uncategorized";
pub const DEFAULT_DESCRIPTION: &str = "No Description";

/// One record from a tabular export: header name to cell value.
///
/// A key mapped to `None` is treated the same as a missing key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, Option<String>>);

impl RawRow {
    pub fn new() -> Self {
        RawRow(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_deref())
    }

    /// Value of the first key in `keys` that is present.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.get(k))
    }

    pub fn amount(&self) -> &str {
        self.first_of(AMOUNT_FIELDS).unwrap_or(DEFAULT_AMOUNT)
    }

    pub fn category(&self) -> &str {
        self.first_of(CATEGORY_FIELDS).unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn description(&self) -> &str {
        self.first_of(DESCRIPTION_FIELDS)
            .unwrap_or(DEFAULT_DESCRIPTION)
    }

    /// Raw date text. Unlike the other fields an empty cell counts as missing.
    pub fn date(&self) -> Option<&str> {
        self.first_of(DATE_FIELDS).filter(|s| !s.is_empty())
    }

    pub fn account_type(&self) -> Option<&str> {
        self.get(ACCOUNT_TYPE_FIELD)
    }

    pub fn account_group(&self) -> Option<&str> {
        self.get(ACCOUNT_GROUP_FIELD)
    }

}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawRow(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        )
    }
}
