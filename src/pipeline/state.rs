// Mon Oct 19 2026 - Alex

use crate::stages::{SequencerReport, ShutdownHook};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    /// Sequencer producing.
    Running,
    /// Cancellation stopped the sequencer; its output is not yet closed.
    Draining,
    /// Input closed; relays and collectors emptying what is in flight.
    Flushing,
    /// Merged channel closed and totals verified.
    Terminated,
    /// Merged channel closed but an invariant check failed.
    Failed,
}

impl PipelineState {
    pub fn is_finished(&self) -> bool {
        matches!(self, PipelineState::Terminated | PipelineState::Failed)
    }
}

/// Current state plus every state entered during the current run.
#[derive(Clone)]
pub struct StateTracker {
    inner: Arc<RwLock<StateLog>>,
}

struct StateLog {
    current: PipelineState,
    history: Vec<PipelineState>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StateLog {
                current: PipelineState::Idle,
                history: Vec::new(),
            })),
        }
    }

    pub fn current(&self) -> PipelineState {
        self.inner.read().current
    }

    pub fn history(&self) -> Vec<PipelineState> {
        self.inner.read().history.clone()
    }

    /// Clears the history and enters `Running`.
    pub fn start(&self) {
        let mut entry = self.inner.write();
        entry.history.clear();
        entry.current = PipelineState::Running;
        entry.history.push(PipelineState::Running);
        log::debug!("Pipeline state: Running");
    }

    pub fn transition(&self, next: PipelineState) {
        let mut entry = self.inner.write();
        if entry.current == next {
            return;
        }
        log::debug!("Pipeline state: {:?} -> {:?}", entry.current, next);
        entry.current = next;
        entry.history.push(next);
    }
}

/// `Draining` only when cancellation stopped the sequencer; `Flushing` once
/// its output is closed.
impl ShutdownHook for StateTracker {
    fn stopped(&self, report: &SequencerReport) {
        if report.cancelled {
            self.transition(PipelineState::Draining);
        }
    }

    fn closed(&self) {
        self.transition(PipelineState::Flushing);
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_recorded_once() {
        let tracker = StateTracker::new();
        assert_eq!(tracker.current(), PipelineState::Idle);

        tracker.start();
        tracker.transition(PipelineState::Draining);
        tracker.transition(PipelineState::Draining);
        tracker.transition(PipelineState::Flushing);
        tracker.transition(PipelineState::Terminated);

        assert_eq!(
            tracker.history(),
            vec![
                PipelineState::Running,
                PipelineState::Draining,
                PipelineState::Flushing,
                PipelineState::Terminated,
            ]
        );
        assert!(tracker.current().is_finished());
    }

    #[test]
    fn test_restart_clears_history() {
        let tracker = StateTracker::new();
        tracker.start();
        tracker.transition(PipelineState::Failed);
        tracker.start();

        assert_eq!(tracker.history(), vec![PipelineState::Running]);
        assert!(!tracker.current().is_finished());
    }

    #[test]
    fn test_sequencer_hook_drains_only_on_cancel() {
        let tracker = StateTracker::new();
        tracker.start();
        tracker.stopped(&SequencerReport { produced: 3, last_value: Some(3), cancelled: false });
        tracker.closed();
        assert_eq!(tracker.history(), vec![PipelineState::Running, PipelineState::Flushing]);

        tracker.start();
        tracker.stopped(&SequencerReport { produced: 3, last_value: Some(3), cancelled: true });
        tracker.closed();
        assert_eq!(
            tracker.history(),
            vec![PipelineState::Running, PipelineState::Draining, PipelineState::Flushing]
        );
    }
}
