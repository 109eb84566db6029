//! Feature evaluation: turning measurements, masks and styles into renderable views.
use std::sync::Arc;

use crate::config::FeatureId;
use crate::filter::FilterMask;
use crate::measurement::MeasurementKey;
use crate::style::StyleOptions;

pub mod evaluator;
pub mod events;
pub mod runner;

/// One renderable view, produced per successfully evaluated feature.
///
/// Values are the raw measurements; clipping to `min`/`max` and saturation are
/// left to the viewer, which reads them from the style options.
#[derive(Clone, Debug, PartialEq)]
pub struct View {
    /// Feature id from the configuration.
    pub id: FeatureId,
    /// Hierarchical display name.
    pub name: String,
    /// Measurement the values come from.
    pub data: MeasurementKey,
    /// Unclipped per-face values.
    pub values: Arc<[f64]>,
    /// Per-face visibility; faces excluded by the filter are hidden.
    pub mask: FilterMask,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Fully resolved style options.
    pub style: Arc<StyleOptions>,
    /// Element tags of the faces; `None` means `index + 1`.
    pub face_tags: Option<Arc<[u64]>>,
}

/// A single face of a [`View`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceSample {
    pub index: usize,
    pub tag: u64,
    pub value: f64,
    pub visible: bool,
}

impl View {
    pub fn face_count(&self) -> usize {
        self.values.len()
    }

    pub fn visible_count(&self) -> usize {
        self.mask.visible_count()
    }

    /// Element tag of the face at `index`.
    pub fn face_tag(&self, index: usize) -> u64 {
        match &self.face_tags {
            Some(tags) => tags[index],
            None => index as u64 + 1,
        }
    }

    /// Iterates over all faces with their value and visibility.
    pub fn faces(&self) -> impl Iterator<Item = FaceSample> + '_ {
        self.values
            .iter()
            .zip(self.mask.as_slice())
            .enumerate()
            .map(|(index, (&value, &visible))| FaceSample {
                index,
                tag: self.face_tag(index),
                value,
                visible,
            })
    }

    /// Extrema over the finite values of visible faces.
    ///
    /// Hidden faces and invalid (non-finite) measurements never widen the range.
    pub fn visible_range(&self) -> Option<(f64, f64)> {
        self.faces()
            .filter(|face| face.visible && face.value.is_finite())
            .fold(None, |range, face| match range {
                None => Some((face.value, face.value)),
                Some((lo, hi)) => Some((lo.min(face.value), hi.max(face.value))),
            })
    }

    /// Configured bounds, with absent bounds taken from [`View::visible_range`].
    ///
    /// A configured bound is always returned, also when no face is visible to
    /// infer the other side from.
    pub fn effective_range(&self) -> (Option<f64>, Option<f64>) {
        let inferred = self.visible_range();
        (
            self.min.or(inferred.map(|(lo, _)| lo)),
            self.max.or(inferred.map(|(_, hi)| hi)),
        )
    }
}
