//! Footer aggregations over the rendered page

use gridline_core::Value;

use crate::config::Aggregation;

/// Aggregate `values` with `kind`.
///
/// NULLs are skipped. Sums of integers stay integers. Returns `None` for
/// `Aggregation::None` and for numeric aggregations without numeric input.
pub fn aggregate<'a>(kind: Aggregation, values: impl IntoIterator<Item = &'a Value>) -> Option<Value> {
    let present: Vec<&Value> = values.into_iter().filter(|v| !v.is_null()).collect();

    match kind {
        Aggregation::None => None,
        Aggregation::Count => Some(Value::Int64(present.len() as i64)),
        Aggregation::Sum => {
            let numbers = numeric(&present);
            if numbers.is_empty() {
                return None;
            }
            if present.iter().all(|v| matches!(v, Value::Int32(_) | Value::Int64(_))) {
                let sum = present.iter().filter_map(|v| v.as_i64()).fold(0i64, i64::saturating_add);
                Some(Value::Int64(sum))
            } else {
                Some(Value::Float64(numbers.iter().sum()))
            }
        }
        Aggregation::Avg => {
            let numbers = numeric(&present);
            if numbers.is_empty() {
                return None;
            }
            Some(Value::Float64(numbers.iter().sum::<f64>() / numbers.len() as f64))
        }
        Aggregation::Min => extreme(&present, |candidate, best| candidate < best),
        Aggregation::Max => extreme(&present, |candidate, best| candidate > best),
    }
}

fn numeric(values: &[&Value]) -> Vec<f64> {
    values.iter().filter_map(|v| v.as_number()).collect()
}

/// The original value whose numeric view wins `better`
fn extreme(values: &[&Value], better: impl Fn(f64, f64) -> bool) -> Option<Value> {
    let mut best: Option<(f64, &Value)> = None;
    for value in values {
        let Some(number) = value.as_number() else {
            continue;
        };
        match best {
            Some((current, _)) if !better(number, current) => {}
            _ => best = Some((number, *value)),
        }
    }
    best.map(|(_, value)| value.clone())
}
