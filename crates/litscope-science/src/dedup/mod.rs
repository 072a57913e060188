//! Duplicate resolution: exact (DOI, then case-insensitive title) and fuzzy
//! (token overlap within a title-prefix bucket). Both passes share the same
//! survivor choice and field-fill merge.

pub mod exact;
pub mod fuzzy;
pub mod merge;
pub mod quality;

pub use exact::{ExactReport, resolve_exact, resolve_exact_database};
pub use fuzzy::{FuzzyOptions, FuzzyReport, resolve_fuzzy, resolve_fuzzy_database, token_overlap};
pub use merge::merge_into;
pub use quality::{choose_survivor, quality_score, source_preference};
