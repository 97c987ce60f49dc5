// Mon Oct 19 2026 - Alex

use crate::cancel::{CancelSource, CancelToken};
use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::pipeline::report::{ObservedTotals, PipelineReport, Totals};
use crate::pipeline::state::{PipelineState, StateTracker};
use crate::stages::{join_stage, Aggregator, Distributor, RelayPool, Sequencer};
use crate::Item;
use crossbeam_channel::bounded;
use std::sync::Arc;
use std::time::Instant;

pub struct Pipeline {
    config: PipelineConfig,
    state: StateTracker,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            state: StateTracker::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state.current()
    }

    pub fn state_history(&self) -> Vec<PipelineState> {
        self.state.history()
    }

    /// Runs until the configured timeout cancels the sequencer, then drains.
    pub fn run(&self) -> PipelineResult<PipelineReport> {
        let source = CancelSource::with_timeout(self.config.timeout);
        log::info!(
            "Running pipeline: {} relays, {:?} delay, {:?} timeout",
            self.config.workers,
            self.config.relay_delay,
            self.config.timeout
        );
        self.run_with(source.token())
    }

    pub fn run_with(&self, token: CancelToken) -> PipelineResult<PipelineReport> {
        self.run_observed(token, |_| {})
    }

    /// `observer` sees every produced value after it has been counted.
    ///
    /// Any failure, whether a stage or an invariant check, leaves the
    /// pipeline in `Failed`.
    pub fn run_observed<F>(&self, token: CancelToken, observer: F) -> PipelineResult<PipelineReport>
    where
        F: FnMut(Item) + Send + 'static,
    {
        self.state.start();

        let outcome = self
            .execute(token, observer)
            .and_then(|report| report.verify().map(|()| report));

        match outcome {
            Ok(report) => {
                self.state.transition(PipelineState::Terminated);
                log::info!(
                    "Pipeline finished in {:?}: {} items, sum {}, split {:?}",
                    report.elapsed,
                    report.drained.count,
                    report.drained.sum,
                    report.amounts
                );
                Ok(report)
            }
            Err(e) => {
                self.state.transition(PipelineState::Failed);
                Err(e)
            }
        }
    }

    fn execute<F>(&self, token: CancelToken, mut observer: F) -> PipelineResult<PipelineReport>
    where
        F: FnMut(Item) + Send + 'static,
    {
        let started = Instant::now();

        let (input_tx, input_rx) = bounded(self.config.input_capacity);
        let produced = Arc::new(ObservedTotals::new());

        let sequencer = {
            let produced = produced.clone();
            Sequencer::spawn(
                token,
                input_tx,
                move |value| {
                    produced.record(value);
                    observer(value);
                },
                self.state.clone(),
            )?
        };

        let RelayPool { outputs, handles: relays } = Distributor::spawn(
            input_rx,
            self.config.workers,
            self.config.relay_delay,
            self.config.relay_capacity,
        )?;

        let (merged, merge) = Aggregator::spawn(outputs, self.config.merged_capacity())?;

        let mut drained = Totals::default();
        for value in merged.iter() {
            drained.record(value);
        }

        let amounts = merge.join()?;
        let relays_forwarded = relays
            .into_iter()
            .map(|handle| join_stage(handle).map(|report| report.forwarded))
            .collect::<PipelineResult<Vec<u64>>>()?;
        let sequencer = join_stage(sequencer)?;

        let report = PipelineReport {
            produced: produced.snapshot(),
            drained,
            amounts,
            relays_forwarded,
            last_value: sequencer.last_value,
            cancelled: sequencer.cancelled,
            elapsed: started.elapsed(),
        };
        log::debug!("Pipeline report: {:?}", report);

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use parking_lot::Mutex;
    use std::time::Duration;

    fn stop_after(count: Item) -> (CancelToken, impl FnMut(Item) + Send + 'static) {
        let source = Arc::new(CancelSource::new());
        let token = source.token();
        let observer = move |value: Item| {
            if value == count {
                source.cancel();
            }
        };
        (token, observer)
    }

    #[test]
    fn test_exactly_one_hundred_items() {
        let pipeline = Pipeline::new(PipelineConfig::new()).unwrap();
        let (token, observer) = stop_after(100);

        let report = pipeline.run_observed(token, observer).unwrap();

        assert_eq!(report.produced, Totals { count: 100, sum: 5050 });
        assert_eq!(report.drained, Totals { count: 100, sum: 5050 });
        assert_eq!(report.amounts.len(), 5);
        assert_eq!(report.distributed(), 100);
        assert_eq!(report.last_value, Some(100));
        assert!(report.cancelled);
        assert_eq!(pipeline.state(), PipelineState::Terminated);
    }

    #[test]
    fn test_single_relay_takes_everything() {
        let config = PipelineConfig::new()
            .with_workers(1)
            .with_timeout(Duration::from_millis(50));
        let pipeline = Pipeline::new(config).unwrap();

        let report = pipeline.run().unwrap();

        assert_eq!(report.amounts, vec![report.produced.count as u64]);
        assert_eq!(report.relays_forwarded, report.amounts);
    }

    #[test]
    fn test_zero_timeout_still_conserves() {
        let config = PipelineConfig::new().with_timeout(Duration::ZERO);
        let pipeline = Pipeline::new(config).unwrap();

        let report = pipeline.run().unwrap();

        assert_eq!(report.produced, report.drained);
        assert_eq!(report.distributed(), report.produced.count);
        assert!(report.produced.count <= 1);
    }

    #[test]
    fn test_timed_run_conserves() {
        let config = PipelineConfig::new().with_timeout(Duration::from_millis(100));
        let pipeline = Pipeline::new(config).unwrap();

        let report = pipeline.run().unwrap();

        assert!(report.produced.count > 0);
        assert_eq!(report.produced, report.drained);
        assert_eq!(report.distributed(), report.produced.count);
        let n = report.produced.count;
        assert_eq!(report.produced.sum, n * (n + 1) / 2);
    }

    #[test]
    fn test_observer_sees_monotonic_sequence() {
        let pipeline = Pipeline::new(PipelineConfig::new().with_workers(3)).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let source = Arc::new(CancelSource::new());
        let token = source.token();

        let report = {
            let seen = seen.clone();
            pipeline
                .run_observed(token, move |value| {
                    seen.lock().push(value);
                    if value == 250 {
                        source.cancel();
                    }
                })
                .unwrap()
        };

        assert_eq!(*seen.lock(), (1..=250).collect::<Vec<Item>>());
        assert_eq!(report.drained.count, 250);
    }

    #[test]
    fn test_state_walks_through_lifecycle() {
        let pipeline = Pipeline::new(PipelineConfig::new().with_workers(2)).unwrap();
        assert_eq!(pipeline.state(), PipelineState::Idle);

        let (token, observer) = stop_after(20);
        pipeline.run_observed(token, observer).unwrap();

        assert_eq!(
            pipeline.state_history(),
            vec![
                PipelineState::Running,
                PipelineState::Draining,
                PipelineState::Flushing,
                PipelineState::Terminated,
            ]
        );
    }

    #[test]
    fn test_drain_after_cancel_is_bounded() {
        let delay = Duration::from_millis(20);
        let config = PipelineConfig::new().with_relay_delay(delay);

        // Once the sequencer stops, each relay may hold one item plus its
        // output buffer, each collector one more, and the input and merged
        // buffers the rest. Relays drain their share in parallel.
        let in_flight = config.input_capacity
            + config.workers * (1 + config.relay_capacity)
            + config.workers
            + config.merged_capacity();
        let per_relay = (in_flight / config.workers + 1) as u32;
        let bound = delay * per_relay + Duration::from_millis(150);

        let pipeline = Pipeline::new(config).unwrap();
        let stopped_at = Arc::new(Mutex::new(None));
        let source = Arc::new(CancelSource::new());
        let token = source.token();

        let report = {
            let stopped_at = stopped_at.clone();
            pipeline
                .run_observed(token, move |value| {
                    if value == 50 {
                        *stopped_at.lock() = Some(Instant::now());
                        source.cancel();
                    }
                })
                .unwrap()
        };

        let stopped_at: Instant = (*stopped_at.lock()).expect("sequencer never reached 50");
        let drain = stopped_at.elapsed();

        assert_eq!(report.produced.count, 50);
        assert!(drain >= delay / 2, "drain {:?} skipped the last relay delay", drain);
        assert!(drain < bound, "drain {:?} exceeded {:?}", drain, bound);
    }

    #[test]
    fn test_stage_failure_marks_pipeline_failed() {
        let pipeline = Pipeline::new(PipelineConfig::new().with_workers(2)).unwrap();

        let result = pipeline.run_observed(CancelToken::never(), |value| {
            if value == 5 {
                panic!("observer gave up at {}", value);
            }
        });

        match result {
            Err(PipelineError::StageFailed(name)) => assert_eq!(name, "sequencer"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert_eq!(
            pipeline.state_history(),
            vec![PipelineState::Running, PipelineState::Failed]
        );
    }

    #[test]
    fn test_buffered_channels_conserve() {
        let config = PipelineConfig::new()
            .with_workers(4)
            .with_input_capacity(64)
            .with_relay_capacity(8)
            .with_merged_capacity(16)
            .with_relay_delay(Duration::ZERO);
        let pipeline = Pipeline::new(config).unwrap();
        let (token, observer) = stop_after(10_000);

        let report = pipeline.run_observed(token, observer).unwrap();

        assert_eq!(report.produced.count, 10_000);
        assert_eq!(report.drained, report.produced);
        assert_eq!(report.distributed(), 10_000);
    }

    #[test]
    fn test_rejects_empty_pool() {
        let result = Pipeline::new(PipelineConfig::new().with_workers(0));
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn test_pipeline_is_rerunnable() {
        let pipeline = Pipeline::new(PipelineConfig::new().with_workers(2)).unwrap();

        for _ in 0..3 {
            let (token, observer) = stop_after(30);
            let report = pipeline.run_observed(token, observer).unwrap();
            assert_eq!(report.drained, Totals { count: 30, sum: 465 });
        }
    }
}
