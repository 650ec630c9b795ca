use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use taxport_core::{CanonicalTransaction, CategoryMapper, Money, StandardCategory, YearMonth};

/// Headline figures for a set of transactions. Field names are part of the
/// interface consumed by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_income: Money,
    /// Positive magnitude.
    pub total_expenses: Money,
    pub net_income: Money,
    pub transaction_count: usize,
    pub txf_ready_count: usize,
    pub top_expense_category: Option<StandardCategory>,
    pub top_expense_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    pub month: YearMonth,
    pub income: Money,
    pub expenses: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: StandardCategory,
    pub amount: Money,
}

/// Summary plus both breakdowns, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub summary: FinancialSummary,
    pub monthly: Vec<MonthlyTotals>,
    pub categories: Vec<CategoryTotal>,
}

impl Report {
    pub fn build(transactions: &[CanonicalTransaction], mapper: &CategoryMapper) -> Self {
        Report {
            summary: calculate_summary(transactions, mapper),
            monthly: monthly_breakdown(transactions),
            categories: category_breakdown(transactions),
        }
    }
}

/// Sums absolute amounts per category, keeping first-seen order.
fn totals_by_category<'a>(
    transactions: impl Iterator<Item = &'a CanonicalTransaction>,
) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for tx in transactions {
        let amount = tx.amount.abs();
        match totals.iter_mut().find(|t| t.category == tx.category) {
            Some(total) => total.amount += amount,
            None => totals.push(CategoryTotal {
                category: tx.category,
                amount,
            }),
        }
    }
    totals
}

/// Totals over business transactions only; transfers, payments, equity and
/// liability-group rows are left out. `transaction_count` and
/// `txf_ready_count` cover the full input.
pub fn calculate_summary(
    transactions: &[CanonicalTransaction],
    mapper: &CategoryMapper,
) -> FinancialSummary {
    let business = || transactions.iter().filter(|t| t.is_business());

    let total_income: Money = business()
        .filter(|t| t.is_income())
        .map(|t| t.amount)
        .sum();
    let total_expenses: Money = business()
        .filter(|t| t.is_expense())
        .map(|t| t.amount.abs())
        .sum();

    let expense_totals = totals_by_category(business().filter(|t| t.is_expense()));
    // Strictly greater, so the earliest category wins a tie.
    let top = expense_totals.iter().fold(None::<&CategoryTotal>, |best, t| match best {
        Some(b) if b.amount >= t.amount => Some(b),
        _ => Some(t),
    });

    let txf_ready_count = transactions
        .iter()
        .filter(|t| mapper.has_export_code(&t.raw_category))
        .count();

    let summary = FinancialSummary {
        total_income,
        total_expenses,
        net_income: total_income - total_expenses,
        transaction_count: transactions.len(),
        txf_ready_count,
        top_expense_category: top.map(|t| t.category),
        top_expense_amount: top.map(|t| t.amount).unwrap_or_default(),
    };

    tracing::debug!(
        transactions = summary.transaction_count,
        txf_ready = summary.txf_ready_count,
        income = %summary.total_income,
        expenses = %summary.total_expenses,
        "Calculated summary"
    );
    summary
}

pub fn summarize(transactions: &[CanonicalTransaction]) -> FinancialSummary {
    calculate_summary(transactions, CategoryMapper::builtin())
}

/// Income and expenses per calendar month, oldest first. Every transaction
/// counts here, including the ones the summary excludes.
pub fn monthly_breakdown(transactions: &[CanonicalTransaction]) -> Vec<MonthlyTotals> {
    let mut months: BTreeMap<YearMonth, (Money, Money)> = BTreeMap::new();

    for tx in transactions {
        let entry = months.entry(tx.month()).or_default();
        if tx.is_income() {
            entry.0 += tx.amount;
        } else {
            entry.1 += tx.amount.abs();
        }
    }

    months
        .into_iter()
        .map(|(month, (income, expenses))| MonthlyTotals {
            month,
            income,
            expenses,
        })
        .collect()
}

/// Expense totals per category, largest first. Ties keep first-seen order.
pub fn category_breakdown(transactions: &[CanonicalTransaction]) -> Vec<CategoryTotal> {
    let mut totals = totals_by_category(transactions.iter().filter(|t| t.is_expense()));
    totals.sort_by(|a, b| b.amount.cmp(&a.amount));
    totals
}
