use common::model::{ColumnDescriptor, MatchValue, TypedValue};

use crate::error::{CompileError, CompileResult};
use crate::schema::{self, PrimitiveKind};

/// Cast a raw match value to the catalog type of `dotted_id`.
pub fn cast(
    value: &MatchValue,
    dotted_id: &str,
    columns: &[ColumnDescriptor],
) -> CompileResult<TypedValue> {
    let kind = schema::resolve(columns, dotted_id)?;
    cast_to_kind(value, kind).ok_or_else(|| CompileError::Cast {
        path: dotted_id.to_string(),
        value: value.to_string(),
        kind,
    })
}

/// `None` when the value has no faithful representation in `kind`.
pub fn cast_to_kind(value: &MatchValue, kind: PrimitiveKind) -> Option<TypedValue> {
    if kind.is_textual() {
        return Some(TypedValue::String(value.to_string()));
    }

    if kind.is_integral() {
        return match value {
            MatchValue::Integer(i) => Some(TypedValue::Int(*i)),
            MatchValue::Float(f) => float_to_int(*f).map(TypedValue::Int),
            // Text never goes through f64: ids above 2^53 would round
            MatchValue::Text(s) => s.trim().parse::<i64>().ok().map(TypedValue::Int),
        };
    }

    match value {
        MatchValue::Integer(i) => Some(TypedValue::Float(*i as f64)),
        MatchValue::Float(f) => Some(TypedValue::Float(*f)),
        MatchValue::Text(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(TypedValue::Float),
    }
}

fn float_to_int(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}
