#![forbid(unsafe_code)]

//! Host-side glue: reading the expression out of a recorded macro option
//! string, deciding what text gets committed for an outcome, and the record
//! framing the measurement host reads back.

use sx_columnar::ColumnProvider;
use sx_expr::{EvalOutcome, evaluate};
use sx_types::render_number;

pub mod config;
pub mod record;

pub use config::{ConfigError, HostConfig};
pub use record::{HostRecord, RecordError, decode_records, encode_record, write_record};

/// Value recorded under `key` in a macro option string.
///
/// Values are either bracketed (`expr=[SUM('Area') / 2]`, which may contain
/// spaces) or run to the next space. The key must start the string or follow
/// a space, so `key` never matches inside `otherkey=`.
#[must_use]
pub fn macro_option_value<'a>(options: &'a str, key: &str) -> Option<&'a str> {
    let needle = format!("{key}=");
    let mut search = 0;
    while let Some(found) = options[search..].find(&needle) {
        let start = search + found;
        let value_start = start + needle.len();
        if start == 0 || options[..start].ends_with(' ') {
            let rest = &options[value_start..];
            return Some(if let Some(bracketed) = rest.strip_prefix('[') {
                bracketed.find(']').map_or(bracketed, |end| &bracketed[..end])
            } else {
                rest.find(' ').map_or(rest, |end| &rest[..end])
            });
        }
        search = value_start;
    }
    None
}

/// Whether `outcome` may be committed as-is under `config`.
#[must_use]
pub fn is_valid_outcome(outcome: &EvalOutcome, config: &HostConfig) -> bool {
    match outcome.value() {
        Some(value) => !config.finite_only || value.is_finite(),
        None => false,
    }
}

/// Text to hand back to the host for `outcome`.
#[must_use]
pub fn commit_result(outcome: &EvalOutcome, config: &HostConfig) -> String {
    match outcome.value() {
        Some(value) if is_valid_outcome(outcome, config) => render_number(value),
        _ => config.fallback_result.clone(),
    }
}

/// Evaluate the expression recorded in `options` and build the result record.
///
/// A missing option evaluates as blank text and commits the fallback.
#[must_use]
pub fn run_macro(
    options: &str,
    config: &HostConfig,
    columns: Option<&dyn ColumnProvider>,
) -> (EvalOutcome, HostRecord) {
    let text = macro_option_value(options, &config.macro_field).unwrap_or_default();
    let outcome = evaluate(text, columns);
    let record = HostRecord::Result(commit_result(&outcome, config));
    (outcome, record)
}
