//! Colormap styles: open-ended option maps merged over a `default` base.
//!
//! Option names are never validated here; the resolved map is forwarded to the
//! viewer as-is. The constants in [`options`] name the options the sample
//! configurations use.
pub mod resolver;

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use resolver::StyleResolver;

pub type StyleId = String;

/// Name of the style every other style is merged over.
pub const DEFAULT_STYLE: &str = "default";

/// Option names understood by the mesh viewer.
pub mod options {
    pub const COLORMAP_NUMBER: &str = "ColormapNumber";
    pub const COLORMAP_ALPHA: &str = "ColormapAlpha";
    pub const COLORMAP_BIAS: &str = "ColormapBias";
    pub const COLORMAP_CURVATURE: &str = "ColormapCurvature";
    pub const COLORMAP_ROTATION: &str = "ColormapRotation";
    pub const COLORMAP_SWAP: &str = "ColormapSwap";
    pub const SATURATE_VALUES: &str = "SaturateValues";
    pub const SHOW_SCALE: &str = "ShowScale";
    pub const RANGE_TYPE: &str = "RangeType";
}

/// Whether `name` can be written as `View[i].<name>` in a viewer script:
/// an ASCII letter followed by letters, digits or underscores.
pub fn is_option_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Value of a single style option.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
}

impl OptionValue {
    /// Numeric form of the value; booleans map to 0 and 1.
    pub fn as_number(&self) -> f64 {
        match *self {
            OptionValue::Bool(b) => f64::from(u8::from(b)),
            OptionValue::Number(n) => n,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            OptionValue::Bool(b) => Some(b),
            OptionValue::Number(_) => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Number(value as f64)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

/// Ordered option map of one style.
///
/// Keys are kept sorted so two equal maps always serialize identically.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleOptions(BTreeMap<String, OptionValue>);

impl StyleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an option, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Option<OptionValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Builder-style variant of [`StyleOptions::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<OptionValue> {
        self.0.get(name).copied()
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).map(|v| v.as_number())
    }

    /// Returns a copy of `self` with every option of `overlay` written on top.
    pub fn merged_with(&self, overlay: &StyleOptions) -> StyleOptions {
        let mut merged = self.clone();
        for (name, value) in overlay.iter() {
            merged.0.insert(name.to_owned(), *value);
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, OptionValue)> for StyleOptions {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for StyleOptions {
    type Item = (String, OptionValue);
    type IntoIter = btree_map::IntoIter<String, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
