#![no_main]

use libfuzzer_sys::fuzz_target;
use sx_columnar::ResultsTable;
use sx_expr::{EvalOutcome, evaluate, normalize};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(table) = ResultsTable::new()
        .with_column("x", vec![1.0, -2.0, 3.5])
        .and_then(|table| table.with_column("empty", Vec::new()))
    else {
        return;
    };

    let first = evaluate(text, Some(&table));
    let second = evaluate(text, Some(&table));
    match (&first, &second) {
        (EvalOutcome::Value(a), EvalOutcome::Value(b)) => assert_eq!(a.to_bits(), b.to_bits()),
        _ => assert_eq!(first.to_string(), second.to_string()),
    }

    if let Some(canonical) = normalize(text) {
        assert_eq!(normalize(&canonical).as_deref(), Some(canonical.as_str()));
    }
    let _ = evaluate(text, None);
});
