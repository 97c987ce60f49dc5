// Mon Oct 19 2026 - Alex

pub mod aggregator;
pub mod distributor;
pub mod relay;
pub mod sequencer;

pub use aggregator::{Aggregator, MergeHandle};
pub use distributor::{Distributor, RelayPool};
pub use relay::{Relay, RelayReport};
pub use sequencer::{Sequencer, SequencerReport, ShutdownHook};

use crate::error::{PipelineError, PipelineResult};
use std::thread::JoinHandle;

/// Joins a stage thread, turning a panic into `StageFailed` named after the thread.
pub(crate) fn join_stage<T>(handle: JoinHandle<T>) -> PipelineResult<T> {
    let name = handle
        .thread()
        .name()
        .unwrap_or("unnamed stage")
        .to_string();

    handle.join().map_err(|_| {
        log::debug!("Stage {} panicked", name);
        PipelineError::StageFailed(name)
    })
}
