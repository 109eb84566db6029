//! Range filters over a single measurement, producing per-face visibility masks.
//!
//! A face passes a filter iff every bound that is set holds:
//! `(greater_eq unset || v >= greater_eq) && (less_eq unset || v <= less_eq)`.
//! A bound set to `0` is a bound, not an absent one.
use std::sync::Arc;

use tracing::warn;

use crate::config::{FilterId, FilterSpec};
use crate::error::Result;
use crate::measurement::{MeasurementKey, MeasurementStore};

/// How a filter whose `greater_eq` lies above its `less_eq` is interpreted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InvertedBounds {
    /// Keep both bounds; no face can pass.
    #[default]
    Literal,
    /// Ignore the `less_eq` bound, reading it as "no upper bound".
    DropUpperBound,
}

/// A filter ready to be applied, with its bound policy already decided.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledFilter {
    pub id: FilterId,
    pub data: MeasurementKey,
    pub greater_eq: Option<f64>,
    pub less_eq: Option<f64>,
}

impl CompiledFilter {
    /// Compiles a filter specification under the given inverted-bounds policy.
    pub fn compile(id: &str, spec: &FilterSpec, policy: InvertedBounds) -> Self {
        let mut less_eq = spec.less_eq;

        if let (Some(lower), Some(upper)) = (spec.greater_eq, spec.less_eq) {
            if lower > upper {
                match policy {
                    InvertedBounds::Literal => warn!(
                        "Filter '{}' requires {} <= v <= {}; no face can pass.",
                        id, lower, upper
                    ),
                    InvertedBounds::DropUpperBound => {
                        warn!(
                            "Filter '{}' has less_eq {} below greater_eq {}; ignoring less_eq.",
                            id, upper, lower
                        );
                        less_eq = None;
                    }
                }
            }
        }

        Self {
            id: id.to_string(),
            data: spec.data,
            greater_eq: spec.greater_eq,
            less_eq,
        }
    }

    /// Whether any value can pass this filter.
    pub fn is_satisfiable(&self) -> bool {
        match (self.greater_eq, self.less_eq) {
            (Some(lower), Some(upper)) => lower <= upper,
            _ => true,
        }
    }

    /// Evaluates the predicate for a single face value.
    #[inline]
    pub fn passes(&self, value: f64) -> bool {
        self.greater_eq.is_none_or(|lower| value >= lower)
            && self.less_eq.is_none_or(|upper| value <= upper)
    }

    /// Computes the visibility mask over the filter's measurement.
    pub fn apply(&self, store: &MeasurementStore) -> Result<FilterMask> {
        let values = store.get(self.data)?;
        Ok(values.iter().map(|&v| self.passes(v)).collect())
    }
}

/// Per-face visibility, shared between every view that uses the same filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterMask(Arc<[bool]>);

impl FilterMask {
    /// Mask with every face visible.
    pub fn all_visible(face_count: usize) -> Self {
        Self(vec![true; face_count].into())
    }

    #[inline]
    pub fn is_visible(&self, face: usize) -> bool {
        self.0[face]
    }

    pub fn visible_count(&self) -> usize {
        self.0.iter().filter(|v| **v).count()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<bool> for FilterMask {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<bool>> for FilterMask {
    fn from(value: Vec<bool>) -> Self {
        Self(value.into())
    }
}
