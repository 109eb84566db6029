//! Per-run memoization of filter masks and resolved styles.
//!
//! The cache is created with one slot per declared filter and style (plus `default`),
//! so lookups never take a lock: each slot is a [`OnceLock`] and concurrent first
//! accesses settle on a single computation. Undeclared names have no slot and fail
//! with [`Error::UnknownFilter`] or [`Error::UnknownStyle`].
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::config::FilterId;
use crate::error::{Error, Result};
use crate::filter::FilterMask;
use crate::measurement::{MeasurementKey, MeasurementStore};
use crate::program::EvaluationProgram;
use crate::style::{StyleId, StyleOptions, StyleResolver, DEFAULT_STYLE};

/// Failure stored in a cache slot so later lookups report it without recomputing.
#[derive(Clone, Debug)]
enum Unresolved {
    Measurement(MeasurementKey),
    Style(StyleId),
    Other(String),
}

impl From<Error> for Unresolved {
    fn from(value: Error) -> Self {
        match value {
            Error::UnknownMeasurement { key } => Unresolved::Measurement(key),
            Error::UnknownStyle { id } => Unresolved::Style(id),
            other => Unresolved::Other(other.to_string()),
        }
    }
}

impl From<Unresolved> for Error {
    fn from(value: Unresolved) -> Self {
        match value {
            Unresolved::Measurement(key) => Error::UnknownMeasurement { key },
            Unresolved::Style(id) => Error::UnknownStyle { id },
            Unresolved::Other(message) => Error::Other(message),
        }
    }
}

type Slot<T> = OnceLock<std::result::Result<T, Unresolved>>;

/// Number of computations a [`RunCache`] performed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub masks_computed: usize,
    pub styles_resolved: usize,
}

/// Memoized masks and styles for one run over one measurement store.
pub struct RunCache<'a> {
    program: &'a EvaluationProgram,
    store: &'a MeasurementStore,
    masks: HashMap<FilterId, Slot<FilterMask>>,
    styles: HashMap<StyleId, Slot<Arc<StyleOptions>>>,
    masks_computed: AtomicUsize,
    styles_resolved: AtomicUsize,
}

impl<'a> RunCache<'a> {
    /// Creates an empty cache with a slot for every declared filter and style.
    pub fn new(program: &'a EvaluationProgram, store: &'a MeasurementStore) -> Self {
        let masks = program
            .filters
            .keys()
            .map(|id| (id.clone(), OnceLock::new()))
            .collect();

        let mut styles: HashMap<StyleId, Slot<Arc<StyleOptions>>> = program
            .styles
            .keys()
            .map(|id| (id.clone(), OnceLock::new()))
            .collect();
        styles
            .entry(DEFAULT_STYLE.to_string())
            .or_insert_with(OnceLock::new);

        Self {
            program,
            store,
            masks,
            styles,
            masks_computed: AtomicUsize::new(0),
            styles_resolved: AtomicUsize::new(0),
        }
    }

    /// Mask of the filter named `id`, computed on first use.
    pub fn mask(&self, id: &str) -> Result<FilterMask> {
        let (slot, filter) = match (self.masks.get(id), self.program.filters.get(id)) {
            (Some(slot), Some(filter)) => (slot, filter),
            _ => return Err(Error::UnknownFilter { id: id.to_string() }),
        };

        slot.get_or_init(|| {
            self.masks_computed.fetch_add(1, Ordering::Relaxed);
            let mask = filter.apply(self.store).map_err(Unresolved::from);
            if let Ok(mask) = &mask {
                debug!(
                    "Filter '{}' passes {} of {} faces.",
                    id,
                    mask.visible_count(),
                    mask.len()
                );
            }
            mask
        })
        .clone()
        .map_err(Error::from)
    }

    /// Fully resolved options of the style named `name`, resolved on first use.
    pub fn style(&self, name: &str) -> Result<Arc<StyleOptions>> {
        let Some(slot) = self.styles.get(name) else {
            return Err(Error::UnknownStyle {
                id: name.to_string(),
            });
        };

        slot.get_or_init(|| {
            self.styles_resolved.fetch_add(1, Ordering::Relaxed);
            StyleResolver::new(&self.program.styles)
                .resolve(name)
                .map(Arc::new)
                .map_err(Unresolved::from)
        })
        .clone()
        .map_err(Error::from)
    }

    pub fn store(&self) -> &'a MeasurementStore {
        self.store
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            masks_computed: self.masks_computed.load(Ordering::Relaxed),
            styles_resolved: self.styles_resolved.load(Ordering::Relaxed),
        }
    }
}
