//! Tagged measurement identifiers.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Geometric quantity measured per face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Inscribed sphere radii (wall thickness, gap width, corner radii).
    Radii,
    /// Change of the radius between neighbouring faces.
    Gradients,
    /// Corner angles.
    Angles,
    /// Distances to the opposite surface.
    Distances,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Radii,
        Category::Gradients,
        Category::Angles,
        Category::Distances,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Radii => "radii",
            Category::Gradients => "gradients",
            Category::Angles => "angles",
            Category::Distances => "distances",
        }
    }
}

/// Side of the surface a measurement is taken on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subtype {
    Inner,
    Outer,
}

impl Subtype {
    pub const ALL: [Subtype; 2] = [Subtype::Inner, Subtype::Outer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subtype::Inner => "inner",
            Subtype::Outer => "outer",
        }
    }
}

/// Identifier of one per-face scalar array, written `category.subtype`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MeasurementKey {
    pub category: Category,
    pub subtype: Subtype,
}

impl MeasurementKey {
    pub const fn new(category: Category, subtype: Subtype) -> Self {
        Self { category, subtype }
    }

    /// Every recognized key, categories first.
    pub fn all() -> impl Iterator<Item = MeasurementKey> {
        Category::ALL
            .into_iter()
            .flat_map(|c| Subtype::ALL.into_iter().map(move |s| MeasurementKey::new(c, s)))
    }
}

impl fmt::Display for MeasurementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category.as_str(), self.subtype.as_str())
    }
}

impl FromStr for MeasurementKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| {
            Error::MalformedConfiguration(format!("invalid measurement key '{s}': {reason}"))
        };

        let (category, subtype) = s
            .split_once('.')
            .ok_or_else(|| malformed("expected 'category.subtype'"))?;

        let category = Category::ALL
            .into_iter()
            .find(|c| c.as_str() == category)
            .ok_or_else(|| malformed("unknown category"))?;
        let subtype = Subtype::ALL
            .into_iter()
            .find(|t| t.as_str() == subtype)
            .ok_or_else(|| malformed("unknown subtype"))?;

        Ok(MeasurementKey::new(category, subtype))
    }
}

impl TryFrom<String> for MeasurementKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MeasurementKey> for String {
    fn from(value: MeasurementKey) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_keys() {
        let key: MeasurementKey = "radii.inner".parse().expect("valid key");
        assert_eq!(key, MeasurementKey::new(Category::Radii, Subtype::Inner));

        let key: MeasurementKey = "distances.outer".parse().expect("valid key");
        assert_eq!(key.category, Category::Distances);
        assert_eq!(key.subtype, Subtype::Outer);
    }

    #[test]
    fn rejects_unknown_parts() {
        for bad in ["radii", "radius.inner", "angles.middle", "angles.inner.x", ""] {
            let err = bad.parse::<MeasurementKey>().expect_err("should not parse");
            assert!(
                matches!(err, Error::MalformedConfiguration(_)),
                "unexpected error for '{bad}': {err}"
            );
        }
    }

    #[test]
    fn display_matches_config_spelling() {
        let rendered: Vec<String> = MeasurementKey::all().map(|k| k.to_string()).collect();
        assert_eq!(rendered.len(), 8);
        assert!(rendered.contains(&"gradients.outer".to_string()));
        for text in rendered {
            let parsed: MeasurementKey = text.parse().expect("display output parses");
            assert_eq!(parsed.to_string(), text);
        }
    }

    #[test]
    fn deserializes_from_string() {
        let key: MeasurementKey =
            serde_json::from_str("\"angles.outer\"").expect("deserialize key");
        assert_eq!(key, MeasurementKey::new(Category::Angles, Subtype::Outer));
        assert!(serde_json::from_str::<MeasurementKey>("\"angles\"").is_err());
    }
}
