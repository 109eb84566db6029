#![forbid(unsafe_code)]
//! defect_map: rule-based visualization of per-face surface-defect measurements.
//!
//! Modules:
//! - measurement: measurement keys and the per-face value store
//! - config: feature, filter and style declarations loaded from TOML
//! - filter, style: range masks and colormap option merging
//! - program, evaluate: compiled programs, the per-run cache, evaluation and events
//! - emit: view output for external viewers (JSON lines, gmsh)
pub mod config;
pub mod emit;
pub mod error;
pub mod evaluate;
pub mod filter;
pub mod measurement;
pub mod program;
pub mod style;

/// Convenient re-exports for common types. Import with `use defect_map::prelude::*;`.
pub mod prelude {
    pub use crate::config::{EvaluationSpec, FeatureId, FeatureSpec, FilterId, FilterSpec};
    pub use crate::emit::{
        emit_all, read_json_lines, GmshEmitter, JsonLinesEmitter, VecEmitter, ViewEmitter,
        ViewRecord,
    };
    pub use crate::error::{Error, Result};
    pub use crate::evaluate::events::{
        EventSink, FnSink, MultiSink, RunEvent, RunEventKind, VecSink,
    };
    pub use crate::evaluate::runner::{run, Diagnostic, RunConfig, RunResult, ViewRunner};
    pub use crate::evaluate::{FaceSample, View};
    pub use crate::filter::{CompiledFilter, FilterMask, InvertedBounds};
    pub use crate::measurement::{Category, MeasurementKey, MeasurementStore, Subtype};
    pub use crate::program::cache::{CacheStats, RunCache};
    pub use crate::program::compiler::{CompileOptions, ProgramCompiler};
    pub use crate::program::EvaluationProgram;
    pub use crate::style::{options, OptionValue, StyleId, StyleOptions, StyleResolver};
}
