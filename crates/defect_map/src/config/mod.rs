//! Declarative evaluation configuration: features, filters and styles.
//!
//! [`EvaluationSpec`] is the in-memory form of the configuration file and can be
//! built programmatically or loaded from TOML via [`EvaluationSpec::from_toml_str`].
pub mod loader;
pub mod spec;

pub use spec::{EvaluationSpec, FeatureId, FeatureSpec, FilterId, FilterSpec};
