//! Tax Exchange Format (TXF) V041 output.
//!
//! A document is a header followed by one block per transaction, each line
//! starting with a single-character field marker:
//!
//! ```text
//! V041              format version
//! A<company>        accounting program / payer name
//! D<M/D/YYYY>       export date
//! ^                 end of header
//! ^                 record start
//! C<code>           TXF reference number
//! P<description>
//! D<M/D/YYYY>       transaction date
//! $<amount>         absolute value, two decimals
//! ^                 record end
//! ```
//!
//! Lines are joined with `\n` and there is no trailing newline. Text fields
//! never span lines.

use chrono::{Datelike, NaiveDate};
use taxport_core::{CanonicalTransaction, CategoryMapper, Clock, Money, RawRow};
use taxport_import::{parse_amount, parse_date};

pub const DEFAULT_COMPANY_NAME: &str = "NeuralSec Advisory";

const TXF_VERSION: &str = "V041";
const RECORD_SEPARATOR: &str = "^";

/// `M/D/YYYY` without zero padding, as US tax software prints dates.
pub fn format_us_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

/// One exported line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxfRecord {
    pub code: u32,
    pub description: String,
    pub date: NaiveDate,
    pub amount: Money,
}

/// A rendered document and what happened to each input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxfExport {
    pub document: String,
    pub converted: usize,
    /// Rows whose category has no TXF code.
    pub unmapped: usize,
    /// Rows whose amount could not be parsed.
    pub invalid: usize,
}

impl TxfExport {
    pub fn skipped(&self) -> usize {
        self.unmapped + self.invalid
    }
}

enum RowOutcome {
    Record(TxfRecord),
    Unmapped,
    Invalid,
}

pub struct TxfWriter<'a> {
    mapper: &'a CategoryMapper,
    clock: &'a dyn Clock,
}

impl<'a> TxfWriter<'a> {
    pub fn new(mapper: &'a CategoryMapper, clock: &'a dyn Clock) -> Self {
        Self { mapper, clock }
    }

    /// Reads the export fields straight from a raw row. A missing or
    /// unreadable date becomes `today` instead of dropping the row.
    fn read_row(&self, row: &RawRow, index: usize, today: NaiveDate) -> RowOutcome {
        let category = row.category();
        let Some(code) = self.mapper.export_code(category) else {
            return RowOutcome::Unmapped;
        };

        let raw_amount = row.amount();
        let Some(amount) = parse_amount(raw_amount) else {
            tracing::warn!(index, amount = raw_amount, "Skipping TXF row with invalid amount");
            return RowOutcome::Invalid;
        };

        let date = row.date().and_then(parse_date).unwrap_or(today);

        RowOutcome::Record(TxfRecord {
            code,
            description: row.description().to_string(),
            date,
            amount: Money::from_decimal(amount),
        })
    }

    /// Converts raw rows in input order. Rows without a TXF code or with an
    /// unreadable amount are counted and left out.
    pub fn convert(&self, rows: &[RawRow], company_name: &str) -> TxfExport {
        let today = self.clock.today();
        let mut records = Vec::new();
        let mut unmapped = 0;
        let mut invalid = 0;

        for (index, row) in rows.iter().enumerate() {
            match self.read_row(row, index, today) {
                RowOutcome::Record(record) => records.push(record),
                RowOutcome::Unmapped => unmapped += 1,
                RowOutcome::Invalid => invalid += 1,
            }
        }

        if unmapped > 0 {
            tracing::warn!("TXF conversion: {unmapped} transactions skipped (unmapped categories)");
        }

        let export = TxfExport {
            document: render(company_name, today, &records),
            converted: records.len(),
            unmapped,
            invalid,
        };
        tracing::debug!(
            input = rows.len(),
            converted = export.converted,
            unmapped,
            invalid,
            "TXF conversion finished"
        );
        export
    }

    /// Converts already-normalized transactions. Same layout as
    /// [`TxfWriter::convert`]; there are no invalid rows at this stage.
    pub fn convert_transactions(
        &self,
        transactions: &[CanonicalTransaction],
        company_name: &str,
    ) -> TxfExport {
        let records: Vec<TxfRecord> = transactions
            .iter()
            .filter_map(|tx| {
                self.mapper.export_code(&tx.raw_category).map(|code| TxfRecord {
                    code,
                    description: tx.description.clone(),
                    date: tx.date,
                    amount: tx.amount,
                })
            })
            .collect();
        let unmapped = transactions.len() - records.len();

        if unmapped > 0 {
            tracing::warn!("TXF conversion: {unmapped} transactions skipped (unmapped categories)");
        }

        TxfExport {
            document: render(company_name, self.clock.today(), &records),
            converted: records.len(),
            unmapped,
            invalid: 0,
        }
    }
}

/// Free text goes on one line: control characters, line breaks included,
/// become spaces.
fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn render(company_name: &str, today: NaiveDate, records: &[TxfRecord]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(4 + records.len() * 6);

    lines.push(TXF_VERSION.to_string());
    lines.push(format!("A{}", single_line(company_name)));
    lines.push(format!("D{}", format_us_date(today)));
    lines.push(RECORD_SEPARATOR.to_string());

    for record in records {
        lines.push(RECORD_SEPARATOR.to_string());
        lines.push(format!("C{}", record.code));
        lines.push(format!("P{}", single_line(&record.description)));
        lines.push(format!("D{}", format_us_date(record.date)));
        lines.push(format!("${}", record.amount.abs().to_fixed()));
        lines.push(RECORD_SEPARATOR.to_string());
    }

    lines.join("\n")
}

/// Document text for `rows` using the built-in category tables.
pub fn convert_to_txf(rows: &[RawRow], company_name: &str, clock: &dyn Clock) -> String {
    TxfWriter::new(CategoryMapper::builtin(), clock)
        .convert(rows, company_name)
        .document
}
