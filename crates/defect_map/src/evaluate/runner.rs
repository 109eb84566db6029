//! High-level runner for evaluating a configuration against a measurement store.
//!
//! A run compiles nothing: the [`ViewRunner`] holds an already compiled program and
//! evaluates every feature against a fresh [`RunCache`]. Features are independent, so
//! with the `parallel` feature they are evaluated on the rayon pool; results are
//! always reported in declaration order.
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::{EvaluationSpec, FeatureId, FeatureSpec};
use crate::error::{Error, Result};
use crate::evaluate::evaluator::FeatureEvaluator;
use crate::evaluate::events::{EventSink, RunEvent, RunEventKind};
use crate::evaluate::View;
use crate::filter::InvertedBounds;
use crate::measurement::MeasurementStore;
use crate::program::cache::{CacheStats, RunCache};
use crate::program::compiler::{CompileOptions, ProgramCompiler};
use crate::program::EvaluationProgram;

/// Configuration for evaluation runs.
#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    /// Evaluate features concurrently (requires the `parallel` feature).
    pub parallel: bool,
    /// Interpretation of filters whose lower bound exceeds their upper bound.
    pub inverted_bounds: InvertedBounds,
    /// Skip features with dangling references instead of failing the run.
    pub skip_unknown_references: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            inverted_bounds: InvertedBounds::Literal,
            skip_unknown_references: true,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether features are evaluated concurrently.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the inverted-bounds policy.
    pub fn with_inverted_bounds(mut self, inverted_bounds: InvertedBounds) -> Self {
        self.inverted_bounds = inverted_bounds;
        self
    }

    /// Sets whether dangling references skip the feature or fail the run.
    pub fn with_skip_unknown_references(mut self, skip: bool) -> Self {
        self.skip_unknown_references = skip;
        self
    }

    fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            inverted_bounds: self.inverted_bounds,
        }
    }
}

/// A feature excluded from the output, with the reason.
#[derive(Debug)]
pub struct Diagnostic {
    pub feature_id: FeatureId,
    pub error: Error,
}

/// Result of an evaluation run: the views produced and the features skipped.
#[non_exhaustive]
#[derive(Debug, Default)]
pub struct RunResult {
    /// Views in feature declaration order.
    pub views: Vec<View>,
    /// One entry per skipped feature, in declaration order.
    pub diagnostics: Vec<Diagnostic>,
    /// Cache activity of the run.
    pub stats: CacheStats,
}

impl RunResult {
    /// Whether every configured feature produced a view.
    pub fn is_complete(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Evaluates a compiled configuration against measurement stores.
pub struct ViewRunner {
    /// Run configuration applied to this runner.
    pub config: RunConfig,
    program: EvaluationProgram,
}

impl ViewRunner {
    /// Compiles `spec` and creates a runner for it.
    pub fn try_new(spec: &EvaluationSpec, config: RunConfig) -> Result<Self> {
        let program = ProgramCompiler::compile(spec, &config.compile_options())?;
        Ok(Self { config, program })
    }

    pub fn program(&self) -> &EvaluationProgram {
        &self.program
    }

    /// Evaluates every feature against `store`.
    pub fn run(&self, store: &MeasurementStore) -> Result<RunResult> {
        self.run_with_events(store, &mut ())
    }

    /// Evaluates every feature against `store`, reporting progress to `sink`.
    pub fn run_with_events(
        &self,
        store: &MeasurementStore,
        sink: &mut dyn EventSink,
    ) -> Result<RunResult> {
        let features = &self.program.features;
        info!(
            "Evaluating {} features over {} faces.",
            features.len(),
            store.face_count()
        );
        if sink.wants(RunEventKind::RunStarted) {
            sink.send(RunEvent::RunStarted {
                feature_count: features.len(),
                face_count: store.face_count(),
            });
        }

        let cache = RunCache::new(&self.program, store);
        let evaluator = FeatureEvaluator::new(&cache);
        let outcomes = evaluate_all(features, evaluator, self.config.parallel);

        let mut result = RunResult::default();
        for (index, ((id, _), outcome)) in features.iter().zip(outcomes).enumerate() {
            match outcome {
                Ok(view) => {
                    if view.visible_count() == 0 {
                        warn!("Feature '{}' has no visible faces.", id);
                        if sink.wants(RunEventKind::Warning) {
                            sink.send(RunEvent::Warning {
                                context: format!("feature:{id}"),
                                message: "View has no visible faces".into(),
                            });
                        }
                    }
                    if sink.wants(RunEventKind::FeatureEvaluated) {
                        sink.send(RunEvent::FeatureEvaluated {
                            index,
                            id: id.clone(),
                            name: view.name.clone(),
                            visible_faces: view.visible_count(),
                        });
                    }
                    result.views.push(view);
                }
                Err(error) if error.is_feature_recoverable() && self.config.skip_unknown_references => {
                    warn!("Skipping feature '{}': {}.", id, error);
                    if sink.wants(RunEventKind::FeatureSkipped) {
                        sink.send(RunEvent::FeatureSkipped {
                            index,
                            id: id.clone(),
                            reason: error.to_string(),
                        });
                    }
                    result.diagnostics.push(Diagnostic {
                        feature_id: id.clone(),
                        error,
                    });
                }
                Err(error) => {
                    warn!("Feature '{}' failed the run: {}.", id, error);
                    return Err(error);
                }
            }
        }

        result.stats = cache.stats();
        info!(
            "Run finished: {} views, {} features skipped.",
            result.views.len(),
            result.diagnostics.len()
        );
        if sink.wants(RunEventKind::RunFinished) {
            sink.send(RunEvent::RunFinished {
                views: result.views.len(),
                skipped: result.diagnostics.len(),
            });
        }

        Ok(result)
    }
}

/// Compiles `spec` and evaluates it against `store` in one go.
pub fn run(spec: &EvaluationSpec, store: &MeasurementStore, config: RunConfig) -> Result<RunResult> {
    ViewRunner::try_new(spec, config)?.run(store)
}

#[cfg(feature = "parallel")]
fn evaluate_all(
    features: &[(FeatureId, FeatureSpec)],
    evaluator: FeatureEvaluator<'_, '_>,
    parallel: bool,
) -> Vec<Result<View>> {
    if parallel {
        features
            .par_iter()
            .map(|(id, feature)| evaluator.evaluate(id, feature))
            .collect()
    } else {
        evaluate_sequential(features, evaluator)
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_all(
    features: &[(FeatureId, FeatureSpec)],
    evaluator: FeatureEvaluator<'_, '_>,
    _parallel: bool,
) -> Vec<Result<View>> {
    evaluate_sequential(features, evaluator)
}

fn evaluate_sequential(
    features: &[(FeatureId, FeatureSpec)],
    evaluator: FeatureEvaluator<'_, '_>,
) -> Vec<Result<View>> {
    features
        .iter()
        .map(|(id, feature)| evaluator.evaluate(id, feature))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterSpec;
    use crate::evaluate::events::VecSink;
    use crate::measurement::{Category, MeasurementKey, Subtype};
    use crate::style::{options, StyleOptions, DEFAULT_STYLE};

    const RADII_INNER: MeasurementKey = MeasurementKey::new(Category::Radii, Subtype::Inner);
    const RADII_OUTER: MeasurementKey = MeasurementKey::new(Category::Radii, Subtype::Outer);
    const ANGLES_INNER: MeasurementKey = MeasurementKey::new(Category::Angles, Subtype::Inner);
    const GRADIENTS_INNER: MeasurementKey =
        MeasurementKey::new(Category::Gradients, Subtype::Inner);

    fn spec() -> EvaluationSpec {
        let mut spec = EvaluationSpec::default();
        spec.add_filter(
            "walls",
            FilterSpec::new(RADII_INNER)
                .with_greater_eq(4.8)
                .with_less_eq(0.0),
        )
        .add_filter(
            "inner_corner",
            FilterSpec::new(ANGLES_INNER)
                .with_greater_eq(75.0)
                .with_less_eq(105.0),
        )
        .add_style(
            DEFAULT_STYLE,
            StyleOptions::new().with(options::COLORMAP_NUMBER, 17.0),
        )
        .add_feature(
            "inner_corner",
            FeatureSpec::new("Kanten/Innen", RADII_INNER)
                .with_filter("inner_corner")
                .with_max(4.8),
        )
        .add_feature(
            "gradients",
            FeatureSpec::new("Gradienten/Innen", GRADIENTS_INNER),
        )
        .add_feature(
            "walls",
            FeatureSpec::new("Waende", RADII_INNER).with_filter("walls"),
        )
        .add_feature(
            "outer",
            FeatureSpec::new("Kanten/Aussen", RADII_OUTER).with_style("sharp"),
        )
        .add_feature("raw", FeatureSpec::new("Debug/Radien", RADII_INNER));
        spec
    }

    fn store() -> MeasurementStore {
        MeasurementStore::new()
            .with(RADII_INNER, vec![2.0, 5.0, 4.8])
            .and_then(|s| s.with(RADII_OUTER, vec![1.0, 1.5, 9.0]))
            .and_then(|s| s.with(ANGLES_INNER, vec![80.0, 110.0, 90.0]))
            .expect("store")
    }

    fn view_ids(result: &RunResult) -> Vec<&str> {
        result.views.iter().map(|v| v.id.as_str()).collect()
    }

    #[test]
    fn partial_success_reports_diagnostics() {
        let result = run(&spec(), &store(), RunConfig::default()).expect("run succeeds");

        assert_eq!(view_ids(&result), vec!["inner_corner", "walls", "raw"]);
        assert!(!result.is_complete());

        let skipped: Vec<(&str, bool, bool)> = result
            .diagnostics
            .iter()
            .map(|d| {
                (
                    d.feature_id.as_str(),
                    matches!(d.error, Error::UnknownMeasurement { .. }),
                    matches!(d.error, Error::UnknownStyle { .. }),
                )
            })
            .collect();
        assert_eq!(
            skipped,
            vec![("gradients", true, false), ("outer", false, true)]
        );
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let parallel = run(&spec(), &store(), RunConfig::default()).expect("parallel");
        let sequential = run(
            &spec(),
            &store(),
            RunConfig::default().with_parallel(false),
        )
        .expect("sequential");
        assert_eq!(parallel.views, sequential.views);
    }

    #[test]
    fn walls_feature_follows_policy() {
        let literal = run(&spec(), &store(), RunConfig::default()).expect("run");
        let walls = literal.views.iter().find(|v| v.id == "walls").expect("walls");
        assert_eq!(walls.visible_count(), 0);

        let dropped = run(
            &spec(),
            &store(),
            RunConfig::default().with_inverted_bounds(InvertedBounds::DropUpperBound),
        )
        .expect("run");
        let walls = dropped.views.iter().find(|v| v.id == "walls").expect("walls");
        assert_eq!(walls.mask.as_slice(), &[false, true, true]);
    }

    #[test]
    fn strict_runs_fail_on_dangling_references() {
        let err = run(
            &spec(),
            &store(),
            RunConfig::default().with_skip_unknown_references(false),
        )
        .expect_err("gradients missing");
        assert!(matches!(err, Error::UnknownMeasurement { key } if key == GRADIENTS_INNER));
    }

    #[test]
    fn shared_filters_and_styles_are_computed_once() {
        let mut spec = spec();
        spec.add_feature(
            "inner_corner_again",
            FeatureSpec::new("Kanten/Innen 2", RADII_INNER).with_filter("inner_corner"),
        );
        let result = run(&spec, &store(), RunConfig::default()).expect("run");

        // inner_corner and walls masks, default style only.
        assert_eq!(result.stats.masks_computed, 2);
        assert_eq!(result.stats.styles_resolved, 1);
    }

    #[test]
    fn events_follow_declaration_order() {
        let runner = ViewRunner::try_new(&spec(), RunConfig::default()).expect("runner");
        let mut sink = VecSink::new();
        runner
            .run_with_events(&store(), &mut sink)
            .expect("run succeeds");

        let events = sink.into_inner();
        assert_eq!(
            events.first(),
            Some(&RunEvent::RunStarted {
                feature_count: 5,
                face_count: 3,
            })
        );
        assert_eq!(
            events.last(),
            Some(&RunEvent::RunFinished {
                views: 3,
                skipped: 2,
            })
        );

        let indices: Vec<usize> = events
            .iter()
            .filter_map(|event| match event {
                RunEvent::FeatureEvaluated { index, .. } | RunEvent::FeatureSkipped { index, .. } => {
                    Some(*index)
                }
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);

        assert!(events.iter().any(|event| matches!(
            event,
            RunEvent::Warning { context, .. } if context == "feature:walls"
        )));
    }

    #[test]
    fn empty_configuration_produces_no_views() {
        let result = run(&EvaluationSpec::default(), &store(), RunConfig::default()).expect("run");
        assert!(result.views.is_empty());
        assert!(result.is_complete());
    }
}
