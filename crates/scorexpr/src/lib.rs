#![forbid(unsafe_code)]

//! Single entry point for the `sx-*` crates.
//!
//! ```
//! use scorexpr::{ResultsTable, evaluate};
//!
//! let table = ResultsTable::new()
//!     .with_column("Area", vec![2.0, 4.0, 6.0])
//!     .expect("area");
//! let outcome = evaluate("SUM('Area') / COUNT('Area')", Some(&table));
//! assert_eq!(outcome.value(), Some(4.0));
//! ```

pub use sx_aggregate::{Reduction, reduce, reduction, registry};
pub use sx_columnar::{Column, ColumnError, ColumnProvider, ResultsTable};
pub use sx_expr::{
    Diagnostic, EvalError, EvalOutcome, MAX_DEPTH, ParseError, ParseErrorKind, ReferenceString,
    TokenizeError, evaluate, normalize, render_error, tokenize,
};
pub use sx_io::{IoError, read_csv_path, read_csv_str};
pub use sx_runtime::{
    ConfigError, HostConfig, HostRecord, RecordError, commit_result, decode_records,
    encode_record, is_valid_outcome, macro_option_value, run_macro, write_record,
};
pub use sx_types::{AggregatorKind, Token, render_number};

#[cfg(test)]
mod tests {
    use super::{HostConfig, HostRecord, read_csv_str, run_macro};

    #[test]
    fn csv_table_drives_macro_commit() {
        let table = read_csv_str("Area,Perim\n1,4\n3,8\n").expect("csv");
        let (outcome, record) = run_macro(
            "expr=[MAX('Perim') - MIN 'Area']",
            &HostConfig::default(),
            Some(&table),
        );
        assert_eq!(outcome.value(), Some(7.0));
        assert_eq!(record, HostRecord::Result("7.0".to_owned()));
    }
}
