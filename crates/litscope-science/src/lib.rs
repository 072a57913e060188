//! litscope science: normalization, duplicate resolution and relevance
//! scoring over the litscope record store, plus source ingestion and export.

pub mod dedup;
pub mod error;
pub mod formats;
pub mod identifiers;
pub mod ingest;
pub mod normalize;
pub mod pipeline;
pub mod score;
pub mod sources;

pub use dedup::{ExactReport, FuzzyOptions, FuzzyReport};
pub use error::{Result, ScienceError};
pub use formats::{ExportFormat, ExportOptions, SortOrder};
pub use identifiers::Doi;
pub use ingest::ImportReport;
pub use normalize::{NormalizeReport, normalize};
pub use pipeline::{Pipeline, PipelineReport};
pub use score::{RelevanceScorer, ScoreReport, ScoreWeights};
pub use sources::SourceKind;
