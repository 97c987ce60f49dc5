// Mon Oct 19 2026 - Alex

//! Cancellable fan-out/fan-in pipeline.
//!
//! A sequencer emits 1, 2, 3, ... into one shared channel until cancelled. A
//! fixed pool of relays competes for those values and copies each one to its
//! own output. Collectors merge the relay outputs into a single channel that
//! the driver drains before checking that nothing was lost, duplicated or
//! miscounted.
//!
//! Every channel closes by dropping its last sender, and every stage owns the
//! sender for its own output. Closure therefore cascades in dependency order:
//! sequencer, then each relay output, then the merged channel.

pub mod cancel;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod stages;
pub mod utils;

pub type Item = i64;

pub use cancel::{CancelSource, CancelToken};
pub use config::PipelineConfig;
pub use error::{ConfigError, PipelineError, PipelineResult};
pub use pipeline::{Pipeline, PipelineReport, PipelineState, Totals};
pub use stages::{Aggregator, Distributor, Relay, Sequencer};
pub use utils::LoggingUtils;
