// Mon Oct 19 2026 - Alex

pub mod driver;
pub mod report;
pub mod state;

pub use driver::Pipeline;
pub use report::{ObservedTotals, PipelineReport, Totals};
pub use state::{PipelineState, StateTracker};
