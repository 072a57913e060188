use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Root application configuration, loaded from `~/.config/litscope/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub core: CoreConfig,
    pub discovery: DiscoveryConfig,
    pub dedup: DedupConfig,
    pub score: ScoreConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub library_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
}

/// Topic definition shared with the discovery collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub domain_keywords: Vec<String>,
    pub domain_sources: Vec<String>,
    pub max_depth: u32,
    pub file_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_filter: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Minimum token-overlap ratio for two titles to be merged by the fuzzy resolver.
    pub fuzzy_threshold: f64,
    /// Number of leading title characters used to bucket fuzzy comparisons.
    pub prefix_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub title_weight: f64,
    pub abstract_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub min_score: f64,
    pub sort: SortOrder,
}

/// Export row order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Descending relevance score, unscored records last.
    #[default]
    Relevance,
    /// Ascending publication year, undated records first.
    Year,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relevance => write!(f, "relevance"),
            Self::Year => write!(f, "year"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "relevance" => Ok(Self::Relevance),
            "year" => Ok(Self::Year),
            other => Err(CoreError::Validation(format!(
                "invalid sort order '{other}', expected 'relevance' or 'year'"
            ))),
        }
    }
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("litscope");

        Self {
            library_path: data_dir.to_string_lossy().to_string(),
            database_path: None,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            domain_keywords: Vec::new(),
            domain_sources: vec![
                "openalex".to_string(),
                "crossref".to_string(),
                "arxiv".to_string(),
            ],
            max_depth: 2,
            file_types: vec!["pdf".to_string(), "html".to_string()],
            year_filter: None,
            contact_email: None,
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.9,
            prefix_len: 20,
        }
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            title_weight: 0.8,
            abstract_weight: 0.2,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            sort: SortOrder::Relevance,
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/litscope/config.toml`
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("LITSCOPE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("litscope")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file missing, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Path to the SQLite database file. `LITSCOPE_DB` wins over the config file.
    pub fn database_path(&self) -> PathBuf {
        if let Ok(path) = std::env::var("LITSCOPE_DB") {
            return PathBuf::from(path);
        }
        match &self.core.database_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.core.library_path).join("litscope.db"),
        }
    }

    /// Check the keys the discovery and reconciliation passes depend on.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.discovery.domain_keywords.iter().all(|k| k.trim().is_empty()) {
            missing.push("domain_keywords");
        }
        if self.discovery.domain_sources.is_empty() {
            missing.push("domain_sources");
        }
        if self.discovery.file_types.is_empty() {
            missing.push("file_types");
        }
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "must be non-empty lists: {}",
                missing.join(", ")
            )));
        }

        if !(0.0..=1.0).contains(&self.dedup.fuzzy_threshold) {
            return Err(CoreError::Validation(format!(
                "dedup.fuzzy_threshold must be within [0, 1], got {}",
                self.dedup.fuzzy_threshold
            )));
        }
        if self.dedup.prefix_len == 0 {
            return Err(CoreError::Validation(
                "dedup.prefix_len must be at least 1".to_string(),
            ));
        }

        for (key, weight) in [
            ("score.title_weight", self.score.title_weight),
            ("score.abstract_weight", self.score.abstract_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(CoreError::Validation(format!(
                    "{key} must be a non-negative number, got {weight}"
                )));
            }
        }

        Ok(())
    }
}
