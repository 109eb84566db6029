//! Specification types for authoring evaluation configurations.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::measurement::MeasurementKey;
use crate::style::{StyleId, StyleOptions, DEFAULT_STYLE};

pub type FeatureId = String;
pub type FilterId = String;

/// A range predicate over one measurement.
///
/// A face passes iff every bound that is set holds. Unset bounds impose no constraint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSpec {
    pub data: MeasurementKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub less_eq: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greater_eq: Option<f64>,
}

impl FilterSpec {
    pub fn new(data: MeasurementKey) -> Self {
        Self {
            data,
            less_eq: None,
            greater_eq: None,
        }
    }

    pub fn with_less_eq(mut self, bound: f64) -> Self {
        self.less_eq = Some(bound);
        self
    }

    pub fn with_greater_eq(mut self, bound: f64) -> Self {
        self.greater_eq = Some(bound);
        self
    }
}

/// One visualization: a measurement, an optional filter, an optional value range and a style.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureSpec {
    /// Hierarchical display path, e.g. `"Kanten/Innen"`.
    pub name: String,
    pub data: MeasurementKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleId>,
}

impl FeatureSpec {
    pub fn new(name: impl Into<String>, data: MeasurementKey) -> Self {
        Self {
            name: name.into(),
            data,
            filter: None,
            min: None,
            max: None,
            style: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<FilterId>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_style(mut self, style: impl Into<StyleId>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// Style name to resolve, `default` when none is set.
    pub fn style_name(&self) -> &str {
        self.style.as_deref().unwrap_or(DEFAULT_STYLE)
    }
}

/// A complete evaluation configuration.
///
/// Features keep their declaration order; output views follow it.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct EvaluationSpec {
    pub features: Vec<(FeatureId, FeatureSpec)>,
    pub filters: HashMap<FilterId, FilterSpec>,
    pub styles: HashMap<StyleId, StyleOptions>,
}

impl EvaluationSpec {
    /// Append a feature, replacing an earlier feature with the same id in place.
    pub fn add_feature(&mut self, id: &str, spec: FeatureSpec) -> &mut Self {
        match self.features.iter_mut().find(|(existing, _)| existing == id) {
            Some((_, slot)) => *slot = spec,
            None => self.features.push((id.to_string(), spec)),
        }
        self
    }

    /// Add a filter to the configuration.
    pub fn add_filter(&mut self, id: &str, spec: FilterSpec) -> &mut Self {
        self.filters.insert(id.to_string(), spec);
        self
    }

    /// Add a style to the configuration.
    pub fn add_style(&mut self, id: &str, options: StyleOptions) -> &mut Self {
        self.styles.insert(id.to_string(), options);
        self
    }

    pub fn feature(&self, id: &str) -> Option<&FeatureSpec> {
        self.features
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, spec)| spec)
    }

    /// Declared filters that no feature references, sorted by id.
    pub fn unreferenced_filters(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .filters
            .keys()
            .map(String::as_str)
            .filter(|id| {
                !self
                    .features
                    .iter()
                    .any(|(_, f)| f.filter.as_deref() == Some(*id))
            })
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Declared styles that no feature references, sorted by id. `default` never counts.
    pub fn unreferenced_styles(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .styles
            .keys()
            .map(String::as_str)
            .filter(|id| *id != DEFAULT_STYLE)
            .filter(|id| !self.features.iter().any(|(_, f)| f.style_name() == *id))
            .collect();
        ids.sort_unstable();
        ids
    }
}
