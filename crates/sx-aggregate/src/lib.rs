#![forbid(unsafe_code)]

//! The aggregator registry: one pure reduction per [`AggregatorKind`].
//!
//! Every reduction is total. `MIN` and `MAX` return `0.0` for an empty
//! column, while `AVERAGE` of an empty column is `0.0 / 0.0`, i.e. `NaN`.
//! `MIN` and `MAX` skip `NaN` entries; a column holding only `NaN` gives `NaN`.

use sx_types::AggregatorKind;

pub type Reduction = fn(&[f64]) -> f64;

const REGISTRY: [(AggregatorKind, Reduction); 6] = [
    (AggregatorKind::Sum, sum),
    (AggregatorKind::Count, count),
    (AggregatorKind::Average, average),
    (AggregatorKind::Product, product),
    (AggregatorKind::Min, min),
    (AggregatorKind::Max, max),
];

/// Every registered aggregator with its reduction, in declaration order.
#[must_use]
pub fn registry() -> &'static [(AggregatorKind, Reduction)] {
    &REGISTRY
}

#[must_use]
pub fn reduction(kind: AggregatorKind) -> Reduction {
    // REGISTRY is laid out in AggregatorKind declaration order.
    REGISTRY[kind as usize].1
}

#[must_use]
pub fn reduce(kind: AggregatorKind, values: &[f64]) -> f64 {
    reduction(kind)(values)
}

fn sum(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, value| acc + value)
}

fn count(values: &[f64]) -> f64 {
    values.len() as f64
}

fn average(values: &[f64]) -> f64 {
    sum(values) / count(values)
}

fn product(values: &[f64]) -> f64 {
    values.iter().fold(1.0, |acc, value| acc * value)
}

fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NAN, f64::min)
}

fn max(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NAN, f64::max)
}
