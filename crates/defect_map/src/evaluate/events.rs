//! Event types and sinks for observing evaluation runs.
//!
//! This module defines [`RunEvent`] and a set of sinks to collect or forward events
//! while a [`crate::evaluate::runner::ViewRunner`] evaluates a configuration. Events
//! are delivered in feature declaration order, also when features were evaluated
//! in parallel.
use crate::config::FeatureId;

/// Describes events emitted by evaluation runs.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Emitted when a run starts.
    RunStarted {
        /// Number of configured features.
        feature_count: usize,
        /// Number of mesh faces in the measurement store.
        face_count: usize,
    },

    /// Emitted for every feature that produced a view.
    FeatureEvaluated {
        /// Position of the feature in the configuration.
        index: usize,
        /// The feature id.
        id: FeatureId,
        /// Display name of the produced view.
        name: String,
        /// Number of faces visible in the view.
        visible_faces: usize,
    },

    /// Emitted for every feature excluded from the output.
    FeatureSkipped {
        /// Position of the feature in the configuration.
        index: usize,
        /// The feature id.
        id: FeatureId,
        /// Human-readable reason.
        reason: String,
    },

    /// Non-fatal warning generated during evaluation.
    Warning {
        /// Context string (e.g. feature id).
        context: String,
        /// Human-readable message.
        message: String,
    },

    /// Emitted when the run finishes.
    RunFinished {
        /// Number of views produced.
        views: usize,
        /// Number of features skipped.
        skipped: usize,
    },
}

/// Discriminant of a [`RunEvent`], used by sinks to opt out of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunEventKind {
    RunStarted,
    FeatureEvaluated,
    FeatureSkipped,
    Warning,
    RunFinished,
}

impl RunEvent {
    pub fn kind(&self) -> RunEventKind {
        match self {
            RunEvent::RunStarted { .. } => RunEventKind::RunStarted,
            RunEvent::FeatureEvaluated { .. } => RunEventKind::FeatureEvaluated,
            RunEvent::FeatureSkipped { .. } => RunEventKind::FeatureSkipped,
            RunEvent::Warning { .. } => RunEventKind::Warning,
            RunEvent::RunFinished { .. } => RunEventKind::RunFinished,
        }
    }
}

/// Receiver of run progress.
///
/// The runner asks [`EventSink::wants`] before building an event, so a sink that
/// ignores a kind costs nothing for it.
pub trait EventSink {
    fn send(&mut self, event: RunEvent);

    fn wants(&self, _kind: RunEventKind) -> bool {
        true
    }
}

/// Discards everything; the runner skips event construction entirely.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: RunEvent) {}

    #[inline]
    fn wants(&self, _kind: RunEventKind) -> bool {
        false
    }
}

/// Calls a closure per event.
pub struct FnSink<F: FnMut(RunEvent)> {
    callback: F,
}

impl<F: FnMut(RunEvent)> FnSink<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: FnMut(RunEvent)> EventSink for FnSink<F> {
    #[inline]
    fn send(&mut self, event: RunEvent) {
        (self.callback)(event);
    }
}

/// Records events in arrival order.
#[derive(Debug, Default)]
pub struct VecSink {
    recorded: Vec<RunEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Vec<RunEvent> {
        self.recorded
    }

    pub fn as_slice(&self) -> &[RunEvent] {
        &self.recorded
    }

    pub fn len(&self) -> usize {
        self.recorded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: RunEvent) {
        self.recorded.push(event);
    }
}

/// Broadcasts to every inner sink that wants the event's kind.
pub struct MultiSink<S: EventSink> {
    inner: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { inner: sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.inner.push(sink);
    }

    pub fn into_inner(self) -> Vec<S> {
        self.inner
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::with_sinks(Vec::new())
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: RunEvent) {
        let kind = event.kind();
        let mut targets: Vec<&mut S> = self.inner.iter_mut().filter(|s| s.wants(kind)).collect();
        // The last target takes the event itself, the others get clones.
        let Some(last) = targets.pop() else {
            return;
        };
        for sink in targets {
            sink.send(event.clone());
        }
        last.send(event);
    }

    fn wants(&self, kind: RunEventKind) -> bool {
        self.inner.iter().any(|s| s.wants(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skipped(id: &str) -> RunEvent {
        RunEvent::FeatureSkipped {
            index: 0,
            id: id.into(),
            reason: "unknown filter 'ghost'".into(),
        }
    }

    /// Only takes warnings.
    #[derive(Default)]
    struct WarningsOnly(usize);

    impl EventSink for WarningsOnly {
        fn send(&mut self, _event: RunEvent) {
            self.0 += 1;
        }

        fn wants(&self, kind: RunEventKind) -> bool {
            kind == RunEventKind::Warning
        }
    }

    #[test]
    fn recorded_events_keep_arrival_order() {
        let mut sink = VecSink::new();
        assert!(sink.is_empty());
        sink.send(skipped("walls"));
        sink.send(skipped("parallel"));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.as_slice()[1], skipped("parallel"));
    }

    #[test]
    fn unit_sink_opts_out_of_every_kind() {
        assert!(!().wants(RunEventKind::RunStarted));
        assert!(!().wants(RunEventKind::FeatureSkipped));
    }

    #[test]
    fn broadcast_respects_wants() {
        let mut multi = MultiSink::with_sinks(vec![WarningsOnly::default(), WarningsOnly::default()]);
        assert!(!multi.wants(RunEventKind::FeatureSkipped));

        multi.send(skipped("walls"));
        multi.send(RunEvent::Warning {
            context: "feature:walls".into(),
            message: "View has no visible faces".into(),
        });
        let counts: Vec<usize> = multi.into_inner().into_iter().map(|s| s.0).collect();
        assert_eq!(counts, vec![1, 1]);
    }

    #[test]
    fn closure_sees_each_event() {
        let mut seen = Vec::new();
        let mut sink = FnSink::new(|event: RunEvent| seen.push(event.kind()));
        sink.send(skipped("walls"));
        sink.send(RunEvent::RunFinished { views: 3, skipped: 1 });
        drop(sink);
        assert_eq!(seen, vec![RunEventKind::FeatureSkipped, RunEventKind::RunFinished]);
    }
}
