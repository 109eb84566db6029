//! Immutable per-run storage of per-face measurement arrays.
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::measurement::MeasurementKey;

/// Named per-face scalar arrays for one mesh.
///
/// All arrays have the same length, fixed by the first array inserted (or by
/// [`MeasurementStore::with_face_count`]). Faces are addressed by index; the optional
/// face tags map an index to the element tag the external viewer uses.
#[derive(Clone, Debug, Default)]
pub struct MeasurementStore {
    face_count: Option<usize>,
    arrays: HashMap<MeasurementKey, Arc<[f64]>>,
    face_tags: Option<Arc<[u64]>>,
}

impl MeasurementStore {
    /// Creates an empty store; the first inserted array fixes the face count.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store for a mesh with `face_count` faces.
    pub fn with_face_count(face_count: usize) -> Self {
        Self {
            face_count: Some(face_count),
            ..Self::default()
        }
    }

    /// Registers an array, replacing any previous array under the same key.
    pub fn insert(&mut self, key: MeasurementKey, values: impl Into<Arc<[f64]>>) -> Result<()> {
        let values = values.into();
        let expected = *self.face_count.get_or_insert(values.len());
        if values.len() != expected {
            return Err(Error::MeasurementLengthMismatch {
                key,
                expected,
                found: values.len(),
            });
        }
        self.arrays.insert(key, values);
        Ok(())
    }

    /// Builder-style variant of [`MeasurementStore::insert`].
    pub fn with(mut self, key: MeasurementKey, values: impl Into<Arc<[f64]>>) -> Result<Self> {
        self.insert(key, values)?;
        Ok(self)
    }

    /// Sets the element tags of the faces, one per face.
    pub fn set_face_tags(&mut self, tags: impl Into<Arc<[u64]>>) -> Result<()> {
        let tags = tags.into();
        let expected = *self.face_count.get_or_insert(tags.len());
        if tags.len() != expected {
            return Err(Error::Other(format!(
                "face_tags has {} entries, expected {}",
                tags.len(),
                expected
            )));
        }
        self.face_tags = Some(tags);
        Ok(())
    }

    /// Returns the array registered under `key`.
    pub fn get(&self, key: MeasurementKey) -> Result<Arc<[f64]>> {
        self.arrays
            .get(&key)
            .cloned()
            .ok_or(Error::UnknownMeasurement { key })
    }

    pub fn contains(&self, key: MeasurementKey) -> bool {
        self.arrays.contains_key(&key)
    }

    /// Number of faces, zero while the store is empty.
    pub fn face_count(&self) -> usize {
        self.face_count.unwrap_or(0)
    }

    /// Element tag of the face at `index`; defaults to `index + 1`.
    pub fn face_tag(&self, index: usize) -> u64 {
        match &self.face_tags {
            Some(tags) => tags[index],
            None => index as u64 + 1,
        }
    }

    /// Explicit element tags, if any were set.
    pub fn face_tags(&self) -> Option<Arc<[u64]>> {
        self.face_tags.clone()
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> Vec<MeasurementKey> {
        let mut keys: Vec<_> = self.arrays.keys().copied().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Reads a store from a JSON object mapping measurement keys to arrays.
    ///
    /// `null` entries become NaN (no valid measurement for that face). An optional
    /// `face_tags` array provides element tags.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let file: MeasurementFile = serde_json::from_reader(reader)?;

        let mut store = MeasurementStore::new();
        for (name, values) in file.arrays {
            let key: MeasurementKey = name.parse()?;
            let values: Vec<f64> = values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect();
            store.insert(key, values)?;
        }
        if let Some(tags) = file.face_tags {
            store.set_face_tags(tags)?;
        }
        Ok(store)
    }

    /// Reads a store from a JSON string. See [`MeasurementStore::from_json_reader`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_reader(json.as_bytes())
    }
}

#[derive(Deserialize)]
struct MeasurementFile {
    #[serde(default)]
    face_tags: Option<Vec<u64>>,
    #[serde(flatten)]
    arrays: BTreeMap<String, Vec<Option<f64>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{Category, Subtype};

    const RADII_INNER: MeasurementKey = MeasurementKey::new(Category::Radii, Subtype::Inner);
    const ANGLES_INNER: MeasurementKey = MeasurementKey::new(Category::Angles, Subtype::Inner);

    #[test]
    fn get_returns_registered_arrays() {
        let store = MeasurementStore::new()
            .with(RADII_INNER, vec![2.0, 5.0, 4.8])
            .expect("insert radii");

        assert_eq!(&*store.get(RADII_INNER).expect("radii present"), &[2.0, 5.0, 4.8]);
        assert_eq!(store.face_count(), 3);
        assert!(store.contains(RADII_INNER));
    }

    #[test]
    fn get_unknown_key_fails() {
        let store = MeasurementStore::with_face_count(3);
        let err = store.get(ANGLES_INNER).expect_err("nothing registered");
        assert!(matches!(err, Error::UnknownMeasurement { key } if key == ANGLES_INNER));
    }

    #[test]
    fn insert_rejects_length_mismatch() {
        let mut store = MeasurementStore::new();
        store.insert(RADII_INNER, vec![1.0, 2.0, 3.0]).expect("first insert");

        let err = store
            .insert(ANGLES_INNER, vec![90.0, 90.0])
            .expect_err("length mismatch");
        assert!(matches!(
            err,
            Error::MeasurementLengthMismatch {
                expected: 3,
                found: 2,
                ..
            }
        ));
        assert!(!store.contains(ANGLES_INNER));
    }

    #[test]
    fn declared_face_count_is_enforced() {
        let mut store = MeasurementStore::with_face_count(2);
        assert!(store.insert(RADII_INNER, vec![1.0, 2.0, 3.0]).is_err());
        assert!(store.insert(RADII_INNER, vec![1.0, 2.0]).is_ok());
    }

    #[test]
    fn face_tags_default_to_one_based_indices() {
        let mut store = MeasurementStore::new()
            .with(RADII_INNER, vec![1.0, 2.0])
            .expect("insert");
        assert_eq!(store.face_tag(0), 1);
        assert_eq!(store.face_tag(1), 2);

        store.set_face_tags(vec![10, 20]).expect("matching tags");
        assert_eq!(store.face_tag(1), 20);
        assert!(store.set_face_tags(vec![1]).is_err());
    }

    #[test]
    fn reads_json_measurements() {
        let json = r#"{
            "face_tags": [7, 8, 9],
            "radii.inner": [2.0, 5.0, null],
            "angles.inner": [80, 110, 90]
        }"#;
        let store = MeasurementStore::from_json_str(json).expect("parse measurements");

        assert_eq!(store.keys(), vec![RADII_INNER, ANGLES_INNER]);
        assert_eq!(store.face_tag(2), 9);
        let radii = store.get(RADII_INNER).expect("radii");
        assert_eq!(radii[1], 5.0);
        assert!(radii[2].is_nan());
    }

    #[test]
    fn json_with_unknown_key_is_rejected() {
        let err = MeasurementStore::from_json_str(r#"{ "radii.middle": [1.0] }"#)
            .expect_err("unknown subtype");
        assert!(matches!(err, Error::MalformedConfiguration(_)));
    }
}
