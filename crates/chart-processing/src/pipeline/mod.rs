//! Pipeline module.
//!
//! This module provides the chart transformation pipeline and stage reporting.

mod builder;
pub mod progress;

pub use builder::{ChartPipeline, ChartPipelineBuilder};
pub use progress::{ClosureStageReporter, StageReporter, StageUpdate, TransformStage};
