//! Full reconciliation run: normalize, exact dedup, fuzzy dedup, score.
//!
//! Every stage commits on its own, so a failing stage leaves the work of the
//! earlier stages in place and its own changes rolled back.

use litscope_core::{AppConfig, Database};
use serde::Serialize;

use crate::dedup::{ExactReport, FuzzyOptions, FuzzyReport, resolve_exact_database, resolve_fuzzy_database};
use crate::error::Result;
use crate::normalize::{NormalizeReport, normalize_database};
use crate::score::{RelevanceScorer, ScoreReport, ScoreWeights, score_database};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub normalize: NormalizeReport,
    pub exact: ExactReport,
    /// `None` when the fuzzy stage is disabled.
    pub fuzzy: Option<FuzzyReport>,
    pub score: ScoreReport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    fuzzy: Option<FuzzyOptions>,
    weights: ScoreWeights,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            fuzzy: Some(FuzzyOptions::default()),
            weights: ScoreWeights::default(),
        }
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            fuzzy: Some(FuzzyOptions::from(&config.dedup)),
            weights: ScoreWeights::from(&config.score),
        }
    }

    pub fn with_fuzzy(mut self, options: FuzzyOptions) -> Self {
        self.fuzzy = Some(options);
        self
    }

    pub fn without_fuzzy(mut self) -> Self {
        self.fuzzy = None;
        self
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn run<S: AsRef<str>>(&self, db: &Database, keywords: &[S]) -> Result<PipelineReport> {
        let normalize = normalize_database(db)?;
        let exact = resolve_exact_database(db)?;
        let fuzzy = self
            .fuzzy
            .map(|options| resolve_fuzzy_database(db, options))
            .transpose()?;
        let scorer = RelevanceScorer::new(keywords, self.weights);
        let score = score_database(db, &scorer)?;

        let report = PipelineReport {
            normalize,
            exact,
            fuzzy,
            score,
        };
        tracing::info!(
            normalized = report.normalize.changed,
            deleted = report.exact.deleted + report.fuzzy.map_or(0, |f| f.merged),
            scored = report.score.scored,
            "pipeline finished"
        );
        Ok(report)
    }
}
