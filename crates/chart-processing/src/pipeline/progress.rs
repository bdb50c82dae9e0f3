//! Stage reporting for the chart transformation.
//!
//! The transform runs top to bottom on one thread; a reporter simply
//! observes each stage as it starts and the final outcome.

use serde::{Deserialize, Serialize};

/// Stages of the chart transformation, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformStage {
    /// Reading the input CSV
    Loading,
    /// Converting rank text to numbers
    RankCoercion,
    /// Dropping repeated (rank, country, week) rows
    Deduplication,
    /// Mapping free-text genres onto the taxonomy
    GenreNormalization,
    /// Keeping top-ranked rows only
    RankFilter,
    /// Writing the output CSV
    Writing,
    /// Run finished successfully
    Complete,
    /// Run stopped with an error
    Failed,
}

impl TransformStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading CSV",
            Self::RankCoercion => "Coercing Ranks",
            Self::Deduplication => "Removing Duplicates",
            Self::GenreNormalization => "Normalizing Genres",
            Self::RankFilter => "Filtering Top Ranks",
            Self::Writing => "Writing CSV",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// One-based position among the working stages; `None` for terminal states.
    pub fn step(&self) -> Option<usize> {
        match self {
            Self::Loading => Some(1),
            Self::RankCoercion => Some(2),
            Self::Deduplication => Some(3),
            Self::GenreNormalization => Some(4),
            Self::RankFilter => Some(5),
            Self::Writing => Some(6),
            Self::Complete | Self::Failed => None,
        }
    }

    /// Number of working stages.
    pub const STEPS: usize = 6;
}

/// A stage transition with a short message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageUpdate {
    pub stage: TransformStage,
    pub message: String,
}

impl StageUpdate {
    pub fn new(stage: TransformStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(TransformStage::Complete, message)
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(TransformStage::Failed, message)
    }
}

/// Receives stage updates from a running pipeline.
///
/// # Example
///
/// ```rust,ignore
/// struct Collect(std::sync::Mutex<Vec<TransformStage>>);
///
/// impl StageReporter for Collect {
///     fn report(&self, update: StageUpdate) {
///         self.0.lock().unwrap().push(update.stage);
///     }
/// }
/// ```
pub trait StageReporter: Send + Sync {
    fn report(&self, update: StageUpdate);
}

/// [`StageReporter`] backed by a closure.
pub struct ClosureStageReporter<F>
where
    F: Fn(StageUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureStageReporter<F>
where
    F: Fn(StageUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> StageReporter for ClosureStageReporter<F>
where
    F: Fn(StageUpdate) + Send + Sync,
{
    fn report(&self, update: StageUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(StageUpdate: Send, Sync);
