//! Compiled evaluation programs and their per-run cache.
//!
//! [`compiler::ProgramCompiler`] turns an [`crate::config::EvaluationSpec`] into an
//! [`EvaluationProgram`]: filters get their bound policy applied, styles are indexed,
//! features keep their declaration order. [`cache::RunCache`] memoizes filter masks
//! and resolved styles for one evaluation run.
use std::collections::HashMap;

use crate::config::{FeatureId, FeatureSpec, FilterId};
use crate::filter::CompiledFilter;
use crate::style::{StyleId, StyleOptions};

pub mod cache;
pub mod compiler;

/// A compiled configuration.
#[derive(Clone, Debug)]
pub struct EvaluationProgram {
    /// Features in declaration order.
    pub features: Vec<(FeatureId, FeatureSpec)>,
    /// Compiled filters keyed by filter id.
    pub filters: HashMap<FilterId, CompiledFilter>,
    /// Declared styles keyed by style id, before default inheritance.
    pub styles: HashMap<StyleId, StyleOptions>,
}
