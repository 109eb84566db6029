//! Per-face measurement arrays and the keys that name them.
//!
//! A [`MeasurementKey`] is a `category.subtype` pair such as `radii.inner`. The
//! [`MeasurementStore`] holds one scalar per mesh face for each registered key and
//! guarantees that all arrays share the same face count.
pub mod key;
pub mod store;

pub use key::{Category, MeasurementKey, Subtype};
pub use store::MeasurementStore;
