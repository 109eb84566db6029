//! View emission to external viewers.
//!
//! Emitters receive views in feature declaration order through [`ViewEmitter`].
//! [`json::JsonLinesEmitter`] writes self-describing records, [`gmsh::GmshEmitter`]
//! writes mesh post-processing data, [`VecEmitter`] keeps records in memory.
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::evaluate::View;
use crate::measurement::MeasurementKey;
use crate::style::StyleOptions;

pub mod gmsh;
pub mod json;

pub use gmsh::GmshEmitter;
pub use json::{read_json_lines, JsonLinesEmitter};

/// Destination for evaluated views.
pub trait ViewEmitter {
    fn emit(&mut self, view: &View) -> Result<()>;

    /// Called once after the last view.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Emits `views` in order and finishes the emitter, returning the number emitted.
pub fn emit_all(views: &[View], emitter: &mut dyn ViewEmitter) -> Result<usize> {
    for view in views {
        emitter.emit(view)?;
    }
    emitter.finish()?;
    Ok(views.len())
}

/// Serializable form of a [`View`].
///
/// Non-finite values are written as `null` and read back as NaN.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub id: String,
    pub name: String,
    pub data: MeasurementKey,
    #[serde(with = "nullable_values")]
    pub values: Vec<f64>,
    pub visible: Vec<bool>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub style: StyleOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_tags: Option<Vec<u64>>,
}

impl From<&View> for ViewRecord {
    fn from(view: &View) -> Self {
        Self {
            id: view.id.clone(),
            name: view.name.clone(),
            data: view.data,
            values: view.values.to_vec(),
            visible: view.mask.as_slice().to_vec(),
            min: view.min,
            max: view.max,
            style: (*view.style).clone(),
            face_tags: view.face_tags.as_ref().map(|tags| tags.to_vec()),
        }
    }
}

mod nullable_values {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        values
            .iter()
            .map(|v| v.is_finite().then_some(*v))
            .collect::<Vec<Option<f64>>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

/// An emitter that collects records in a `Vec`.
#[derive(Default)]
pub struct VecEmitter {
    records: Vec<ViewRecord>,
}

impl VecEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<ViewRecord> {
        self.records
    }

    pub fn as_slice(&self) -> &[ViewRecord] {
        &self.records
    }
}

impl ViewEmitter for VecEmitter {
    fn emit(&mut self, view: &View) -> Result<()> {
        self.records.push(ViewRecord::from(view));
        Ok(())
    }
}
