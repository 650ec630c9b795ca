use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use taxport_core::{Clock, RawRow, YearMonth, TABLE_VERSION};
use taxport_export::TxfWriter;
use taxport_import::{available_years, read_path, Normalizer, RowFilter};
use taxport_report::Report;

use crate::config::Config;

// ── convert ───────────────────────────────────────────────────────────────────

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// CSV export to convert
    pub input: PathBuf,

    /// Payer name for the TXF header
    #[arg(long, value_name = "NAME")]
    pub company: Option<String>,

    /// Only export rows dated in this year
    #[arg(long, value_name = "YYYY")]
    pub year: Option<i32>,

    /// Leave out rows from this account (repeatable)
    #[arg(long = "exclude-account", value_name = "NAME")]
    pub exclude_accounts: Vec<String>,

    /// Keep the accounts that are excluded by default
    #[arg(long)]
    pub include_all_accounts: bool,

    /// Output file [default: input with a .txf extension]
    #[arg(short, long, value_name = "OUT")]
    pub output: Option<PathBuf>,
}

pub fn convert(
    args: &ConvertArgs,
    config: &Config,
    clock: &dyn Clock,
    out: &mut dyn Write,
) -> Result<()> {
    let rows = load_rows(&args.input)?;

    let defaults = if args.include_all_accounts {
        Vec::new()
    } else {
        config.excluded_accounts()
    };
    let filter = defaults
        .into_iter()
        .chain(args.exclude_accounts.iter().cloned())
        .fold(RowFilter::new().with_year(args.year), |filter, account| {
            filter.excluding(account)
        });
    let rows = filter.apply(&rows);

    let mapper = config.mapper()?;
    let company = args.company.as_deref().unwrap_or(config.company_name());
    let export = TxfWriter::new(&mapper, clock).convert(&rows, company);

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("txf"));
    std::fs::write(&output, &export.document)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        output = %output.display(),
        converted = export.converted,
        skipped = export.skipped(),
        "Wrote TXF file"
    );
    writeln!(
        out,
        "Wrote {} transactions to {}",
        export.converted,
        output.display()
    )?;
    if export.skipped() > 0 {
        writeln!(
            out,
            "Skipped {} rows ({} without a TXF code, {} with an invalid amount)",
            export.skipped(),
            export.unmapped,
            export.invalid
        )?;
    }
    Ok(())
}

// ── summary ───────────────────────────────────────────────────────────────────

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    /// CSV export to summarize
    pub input: PathBuf,

    /// Only rows dated in this year
    #[arg(long, value_name = "YYYY")]
    pub year: Option<i32>,

    /// Only rows dated in this month
    #[arg(long, value_name = "YYYY-MM")]
    pub month: Option<YearMonth>,

    /// Only rows with this raw category or account name
    #[arg(long, value_name = "NAME")]
    pub category: Option<String>,

    /// Leave out rows from this account (repeatable)
    #[arg(long = "exclude-account", value_name = "NAME")]
    pub exclude_accounts: Vec<String>,

    /// Print one JSON object instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryOutput<'a> {
    #[serde(flatten)]
    report: &'a Report,
    accepted: usize,
    skipped: usize,
    available_years: Vec<i32>,
}

pub fn summary(
    args: &SummaryArgs,
    config: &Config,
    clock: &dyn Clock,
    out: &mut dyn Write,
) -> Result<()> {
    let all_rows = load_rows(&args.input)?;

    let filter = args.exclude_accounts.iter().fold(
        RowFilter::new()
            .with_year(args.year)
            .with_month(args.month)
            .with_category(args.category.clone()),
        |filter, account| filter.excluding(account.as_str()),
    );
    let rows = filter.apply(&all_rows);

    let mapper = config.mapper()?;
    let normalized = Normalizer::new(&mapper, clock).normalize_rows(&rows);
    let report = Report::build(&normalized.transactions, &mapper);

    let output = SummaryOutput {
        report: &report,
        accepted: normalized.accepted(),
        skipped: normalized.skipped(),
        available_years: available_years(&all_rows),
    };

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &output)?;
        writeln!(out)?;
    } else {
        print_report(out, &output)?;
    }
    Ok(())
}

fn print_report(out: &mut dyn Write, output: &SummaryOutput<'_>) -> Result<()> {
    let summary = &output.report.summary;

    writeln!(
        out,
        "{:<14}{} ({} skipped)",
        "Transactions", summary.transaction_count, output.skipped
    )?;
    writeln!(out, "{:<14}{}", "Income", summary.total_income)?;
    writeln!(out, "{:<14}{}", "Expenses", summary.total_expenses)?;
    writeln!(out, "{:<14}{}", "Net income", summary.net_income)?;
    writeln!(out, "{:<14}{}", "TXF ready", summary.txf_ready_count)?;
    match summary.top_expense_category {
        Some(category) => writeln!(
            out,
            "{:<14}{} ({})",
            "Top expense", category, summary.top_expense_amount
        )?,
        None => writeln!(out, "{:<14}none", "Top expense")?,
    }

    if !output.report.monthly.is_empty() {
        writeln!(out, "\nMonthly")?;
        for month in &output.report.monthly {
            writeln!(
                out,
                "  {:<10}income {:>14}  expenses {:>14}",
                month.month.label(),
                month.income.to_string(),
                month.expenses.to_string()
            )?;
        }
    }

    if !output.report.categories.is_empty() {
        writeln!(out, "\nExpenses by category")?;
        for total in &output.report.categories {
            writeln!(
                out,
                "  {:<24}{:>14}",
                total.category.label(),
                total.amount.to_string()
            )?;
        }
    }

    if !output.available_years.is_empty() {
        let years: Vec<String> = output.available_years.iter().map(i32::to_string).collect();
        writeln!(out, "\nYears in file: {}", years.join(", "))?;
    }
    Ok(())
}

// ── categories ────────────────────────────────────────────────────────────────

pub fn categories(config: &Config, out: &mut dyn Write) -> Result<()> {
    let mapper = config.mapper()?;

    writeln!(out, "Category tables v{TABLE_VERSION}")?;
    writeln!(out, "\nStandard categories")?;
    for (raw, category) in mapper.standard_entries() {
        writeln!(out, "  {raw:<32}{}", category.label())?;
    }
    writeln!(out, "\nTXF codes")?;
    for (raw, code) in mapper.export_entries() {
        writeln!(out, "  {raw:<32}{code}")?;
    }
    Ok(())
}

fn load_rows(path: &Path) -> Result<Vec<RawRow>> {
    read_path(path).with_context(|| format!("Failed to read {}", path.display()))
}
