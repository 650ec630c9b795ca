pub mod csv;
pub mod filter;
pub mod normalize;
pub mod util;

pub use self::csv::{read_path, read_rows, CsvError};
pub use filter::{available_years, RowFilter, DEFAULT_EXCLUDED_ACCOUNTS};
pub use normalize::{
    normalize_transaction, normalize_transactions, NormalizeError, Normalized, Normalizer,
    Rejection,
};
pub use util::{parse_amount, parse_date};
