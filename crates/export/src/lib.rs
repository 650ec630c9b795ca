pub mod txf;

pub use txf::{
    convert_to_txf, format_us_date, TxfExport, TxfRecord, TxfWriter, DEFAULT_COMPANY_NAME,
};
