//! Keyword relevance scoring over title and abstract.

pub mod lexicon;

use std::collections::{BTreeSet, HashSet};

use litscope_core::{Database, DocumentRecord, RecordStore, ScoreConfig};
use serde::Serialize;

pub use lexicon::{Lexicon, Phrase, bigrams, tokenize};

use crate::error::Result;

pub const TITLE_WEIGHT: f64 = 0.8;
pub const ABSTRACT_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub title: f64,
    pub abstract_text: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            title: TITLE_WEIGHT,
            abstract_text: ABSTRACT_WEIGHT,
        }
    }
}

impl From<&ScoreConfig> for ScoreWeights {
    fn from(config: &ScoreConfig) -> Self {
        Self {
            title: config.title_weight,
            abstract_text: config.abstract_weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relevance {
    /// Always within `[0, 1]`.
    pub score: f64,
    /// Matched keyword phrases, sorted and unique.
    pub matched: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub scored: usize,
    /// Records with at least one matched phrase.
    pub matched: usize,
}

struct FieldTerms {
    token_count: usize,
    tokens: HashSet<String>,
    bigrams: HashSet<String>,
}

impl FieldTerms {
    fn of(text: Option<&str>) -> Self {
        let tokens = tokenize(text.unwrap_or_default());
        Self {
            token_count: tokens.len(),
            bigrams: bigrams(&tokens).into_iter().collect(),
            tokens: tokens.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    lexicon: Lexicon,
    weights: ScoreWeights,
}

impl RelevanceScorer {
    pub fn new<S: AsRef<str>>(keywords: &[S], weights: ScoreWeights) -> Self {
        Self {
            lexicon: Lexicon::build(keywords),
            weights,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// `(unigram hits + 2 * bigram hits) / sqrt(token count)`; 0 for an empty field.
    fn field_score(&self, field: &FieldTerms) -> f64 {
        if field.token_count == 0 {
            return 0.0;
        }
        let unigram_hits = field.tokens.intersection(&self.lexicon.unigrams).count();
        let bigram_hits = field.bigrams.intersection(&self.lexicon.bigrams).count();
        (unigram_hits + 2 * bigram_hits) as f64 / (field.token_count as f64).sqrt()
    }

    pub fn evaluate(&self, title: Option<&str>, abstract_text: Option<&str>) -> Relevance {
        let title = FieldTerms::of(title);
        let abstract_text = FieldTerms::of(abstract_text);

        let combined = self.weights.title * self.field_score(&title)
            + self.weights.abstract_text * self.field_score(&abstract_text);
        let score = if combined.is_nan() {
            0.0
        } else {
            combined.clamp(0.0, 1.0)
        };

        let matched: BTreeSet<String> = self
            .lexicon
            .phrases
            .iter()
            .filter(|phrase| {
                phrase
                    .tokens
                    .iter()
                    .any(|t| title.tokens.contains(t) || abstract_text.tokens.contains(t))
                    || phrase
                        .bigrams
                        .iter()
                        .any(|b| title.bigrams.contains(b) || abstract_text.bigrams.contains(b))
            })
            .map(|phrase| phrase.text.clone())
            .collect();

        Relevance {
            score,
            matched: matched.into_iter().collect(),
        }
    }

    /// Overwrite the record's score and matched phrases.
    pub fn score_record(&self, record: &mut DocumentRecord) -> Relevance {
        let relevance = self.evaluate(record.title.as_deref(), record.abstract_text.as_deref());
        record.relevance_score = Some(relevance.score);
        record.keywords_found = Some(relevance.matched.clone());
        relevance
    }
}

/// Score every record in `store`. Earlier scores are replaced unconditionally;
/// no other column is written.
pub fn score_store<S: RecordStore + ?Sized>(store: &S, scorer: &RelevanceScorer) -> Result<ScoreReport> {
    let mut report = ScoreReport::default();
    for record in store.list_all()? {
        let relevance = scorer.evaluate(record.title.as_deref(), record.abstract_text.as_deref());
        store.set_relevance(record.id, relevance.score, &relevance.matched)?;
        report.scored += 1;
        if !relevance.matched.is_empty() {
            report.matched += 1;
        }
    }
    Ok(report)
}

/// Run [`score_store`] as one transaction.
pub fn score_database(db: &Database, scorer: &RelevanceScorer) -> Result<ScoreReport> {
    if scorer.lexicon().is_empty() {
        tracing::warn!("scoring with an empty keyword list, every record will score 0");
    }
    let report = db.transaction(|store| score_store(store, scorer))?;
    tracing::info!(
        scored = report.scored,
        matched = report.matched,
        phrases = scorer.lexicon().phrases.len(),
        "scoring pass committed"
    );
    Ok(report)
}
