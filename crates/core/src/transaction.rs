use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::StandardCategory;
use super::money::Money;
use super::period::YearMonth;

/// Account group whose rows are balance-sheet movements, not business activity.
pub const LIABILITY_GROUP: &str = "Liability";

/// A typed transaction produced from one raw export row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalTransaction {
    /// `tx_<row index>`; only unique within one normalization run.
    pub id: String,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub category: StandardCategory,
    pub raw_category: String,
    pub account_type: Option<String>,
    pub account_group: Option<String>,
}

impl CanonicalTransaction {
    pub fn synthetic_id(index: usize) -> String {
        format!("tx_{index}")
    }

    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }

    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }

    /// False for transfers, card payments, owner equity and liability rows.
    pub fn is_business(&self) -> bool {
        !self.category.is_non_business() && self.account_group.as_deref() != Some(LIABILITY_GROUP)
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.date)
    }
}
