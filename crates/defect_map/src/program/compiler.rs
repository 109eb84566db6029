//! Compiler for evaluation specifications.
//!
//! Validates what the TOML schema cannot express: finite bounds, finite style
//! numbers and option names the viewer can address. Applies the inverted-bounds
//! policy to every filter and reports unused filters and styles.
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::EvaluationSpec;
use crate::error::{Error, Result};
use crate::filter::{CompiledFilter, InvertedBounds};
use crate::program::EvaluationProgram;
use crate::style::is_option_name;

/// Options for compiling an evaluation specification.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompileOptions {
    /// Interpretation of filters whose lower bound exceeds their upper bound.
    pub inverted_bounds: InvertedBounds,
}

/// Compiler for evaluation specifications into executable programs.
pub struct ProgramCompiler;

impl ProgramCompiler {
    /// Compiles a specification into an [`EvaluationProgram`], applying the given options.
    pub fn compile(spec: &EvaluationSpec, opts: &CompileOptions) -> Result<EvaluationProgram> {
        for (id, feature) in &spec.features {
            ensure_finite("feature", id, "min", feature.min)?;
            ensure_finite("feature", id, "max", feature.max)?;
            if let (Some(min), Some(max)) = (feature.min, feature.max) {
                if min > max {
                    warn!("Feature '{}' has min {} above max {}.", id, min, max);
                }
            }
        }

        let mut filters = HashMap::with_capacity(spec.filters.len());
        for (id, filter) in &spec.filters {
            ensure_finite("filter", id, "less_eq", filter.less_eq)?;
            ensure_finite("filter", id, "greater_eq", filter.greater_eq)?;
            filters.insert(
                id.clone(),
                CompiledFilter::compile(id, filter, opts.inverted_bounds),
            );
        }

        for (id, options) in &spec.styles {
            for (name, value) in options.iter() {
                ensure_option_name(id, name)?;
                ensure_finite("style", id, name, Some(value.as_number()))?;
            }
        }

        for id in spec.unreferenced_filters() {
            debug!("Filter '{}' is not referenced by any feature.", id);
        }
        for id in spec.unreferenced_styles() {
            debug!("Style '{}' is not referenced by any feature.", id);
        }

        Ok(EvaluationProgram {
            features: spec.features.clone(),
            filters,
            styles: spec.styles.clone(),
        })
    }
}

fn ensure_finite(table: &str, id: &str, field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() => Err(Error::MalformedConfiguration(format!(
            "{table} '{id}': {field} must be finite, found {v}"
        ))),
        _ => Ok(()),
    }
}

/// Option names end up as `View[i].<name>` in the viewer's script.
fn ensure_option_name(style: &str, name: &str) -> Result<()> {
    if is_option_name(name) {
        Ok(())
    } else {
        Err(Error::MalformedConfiguration(format!(
            "style '{style}': option name {name:?} is not an identifier"
        )))
    }
}
