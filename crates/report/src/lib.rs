pub mod summary;

pub use summary::{
    calculate_summary, category_breakdown, monthly_breakdown, summarize, CategoryTotal,
    FinancialSummary, MonthlyTotals, Report,
};
