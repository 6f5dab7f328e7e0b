//! Entity capabilities and the default recursive state interpolator.
//!
//! A `State` is a tree of named fields whose leaves are numbers; entities
//! are free to implement [`Interpolate`] however they like (a schema-known
//! implementation is usually preferable), but most simple entities can just
//! convert to/from [`StateValue`] and reuse [`linear_interpolate`].

use crate::error::CoreError;
use std::collections::BTreeMap;

/// Deterministic, pure input application: `applyInput(Input) -> State`.
pub trait ApplyInput {
    type Input;

    /// Must be pure with respect to `self` — no hidden mutation of anything
    /// outside the returned state.
    fn apply_input(&self, input: &Self::Input) -> Self;
}

/// `interpolate(a, b, ratio) -> State`, for entities under the
/// `Interpolation` sync strategy. `ratio` is expected in `[0, 1]`.
pub trait Interpolate: Sized {
    fn interpolate(a: &Self, b: &Self, ratio: f64) -> Self;
}

/// `reckon(elapsedMs) -> State`, for entities under the `DeadReckoning`
/// sync strategy.
pub trait Reckon {
    fn reckon(&self, elapsed_ms: u64) -> Self;
}

/// A runtime-walkable state tree: leaves are numbers, interior nodes are
/// named fields. Used by entities that want the generic interpolator
/// instead of hand-writing their own `Interpolate` impl.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Number(f64),
    Object(BTreeMap<String, StateValue>),
}

impl StateValue {
    pub fn number(n: f64) -> Self {
        StateValue::Number(n)
    }

    pub fn object(fields: impl IntoIterator<Item = (String, StateValue)>) -> Self {
        StateValue::Object(fields.into_iter().collect())
    }
}

/// Recursively interpolate two state trees: numeric leaves combine as
/// `a + (b - a) * ratio`; object nodes recurse field-by-field. Field sets
/// must match structurally, and a leaf that is neither numeric nor an
/// object is a schema mismatch.
pub fn linear_interpolate(a: &StateValue, b: &StateValue, ratio: f64) -> Result<StateValue, CoreError> {
    interpolate_at("<root>", a, b, ratio)
}

fn interpolate_at(path: &str, a: &StateValue, b: &StateValue, ratio: f64) -> Result<StateValue, CoreError> {
    match (a, b) {
        (StateValue::Number(x), StateValue::Number(y)) => {
            Ok(StateValue::Number(x + (y - x) * ratio))
        }
        (StateValue::Object(fields_a), StateValue::Object(fields_b)) => {
            if fields_a.len() != fields_b.len()
                || !fields_a.keys().all(|k| fields_b.contains_key(k))
            {
                return Err(CoreError::NonInterpolableField(path.to_string()));
            }
            let mut out = BTreeMap::new();
            for (field, value_a) in fields_a {
                let value_b = &fields_b[field];
                let child_path = format!("{path}.{field}");
                out.insert(field.clone(), interpolate_at(&child_path, value_a, value_b, ratio)?);
            }
            Ok(StateValue::Object(out))
        }
        _ => Err(CoreError::NonInterpolableField(path.to_string())),
    }
}

impl Interpolate for StateValue {
    fn interpolate(a: &Self, b: &Self, ratio: f64) -> Self {
        linear_interpolate(a, b, ratio)
            .expect("state trees must share a schema to be interpolated")
    }
}
