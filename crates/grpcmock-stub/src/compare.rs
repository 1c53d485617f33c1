//! Structural JSON comparison between a live request and a request fixture.

use serde_json::{Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonMatch {
    /// Documents are structurally identical.
    Full,
    /// Every field of the fixture is present in the live document with the
    /// same value; the live document has more.
    Superset,
    NoMatch,
}

impl JsonMatch {
    pub fn is_match(self) -> bool {
        matches!(self, Self::Full | Self::Superset)
    }
}

/// Compare `live` against `fixture`.
///
/// Objects may carry extra keys on the live side, arrays extra trailing
/// elements. Numbers compare by value, so `1` and `1.0` are equal.
pub fn compare(live: &Value, fixture: &Value) -> JsonMatch {
    if identical(live, fixture) {
        JsonMatch::Full
    } else if contains(live, fixture) {
        JsonMatch::Superset
    } else {
        JsonMatch::NoMatch
    }
}

fn identical(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(k, av)| b.get(k).is_some_and(|bv| identical(av, bv)))
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(av, bv)| identical(av, bv))
        }
        (Value::Number(a), Value::Number(b)) => numbers_eq(a, b),
        _ => a == b,
    }
}

fn contains(live: &Value, fixture: &Value) -> bool {
    match (live, fixture) {
        (Value::Object(live), Value::Object(fixture)) => fixture
            .iter()
            .all(|(k, fv)| live.get(k).is_some_and(|lv| contains(lv, fv))),
        (Value::Array(live), Value::Array(fixture)) => {
            fixture.len() <= live.len()
                && live.iter().zip(fixture).all(|(lv, fv)| contains(lv, fv))
        }
        (Value::Number(a), Value::Number(b)) => numbers_eq(a, b),
        _ => live == fixture,
    }
}

fn numbers_eq(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    matches!((a.as_f64(), b.as_f64()), (Some(a), Some(b)) if a == b)
}
