//! Evaluator for single features.
//!
//! Combines a feature's measurement array, its filter mask (all visible without a
//! filter), its value range and its resolved style into a [`View`]. Masks and styles
//! come from a shared [`RunCache`], so features evaluated concurrently reuse them.
use tracing::debug;

use crate::config::FeatureSpec;
use crate::error::Result;
use crate::evaluate::View;
use crate::filter::FilterMask;
use crate::program::cache::RunCache;

/// Evaluates features against one run's cache.
#[derive(Clone, Copy)]
pub struct FeatureEvaluator<'c, 'a> {
    cache: &'c RunCache<'a>,
}

impl<'c, 'a> FeatureEvaluator<'c, 'a> {
    pub fn new(cache: &'c RunCache<'a>) -> Self {
        Self { cache }
    }

    /// Evaluates the feature `id`, producing its view.
    pub fn evaluate(&self, id: &str, feature: &FeatureSpec) -> Result<View> {
        let store = self.cache.store();
        let values = store.get(feature.data)?;

        // Masks come from the same store, which keeps every array at its face count.
        let mask = match &feature.filter {
            Some(filter) => self.cache.mask(filter)?,
            None => FilterMask::all_visible(values.len()),
        };

        let style = self.cache.style(feature.style_name())?;

        debug!(
            "Feature '{}' ({}): {} of {} faces visible.",
            id,
            feature.data,
            mask.visible_count(),
            mask.len()
        );

        Ok(View {
            id: id.to_string(),
            name: feature.name.clone(),
            data: feature.data,
            values,
            mask,
            min: feature.min,
            max: feature.max,
            style,
            face_tags: store.face_tags(),
        })
    }
}
