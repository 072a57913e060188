use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use litscope_core::{AppConfig, CoreError, Database, ExitCode};
use litscope_science::dedup::{FuzzyOptions, resolve_exact_database, resolve_fuzzy_database};
use litscope_science::formats::{ExportOptions, export_to_path};
use litscope_science::ingest::import_file;
use litscope_science::normalize::normalize_database;
use litscope_science::score::{RelevanceScorer, ScoreWeights, score_database};
use litscope_science::{Pipeline, ScienceError, SortOrder, SourceKind};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "litscope",
    about = "Reconcile, deduplicate and score scholarly literature metadata",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting LITSCOPE_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (debug level).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file to use instead of the configured one.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config (if missing) and create the database.
    Init,

    /// Apply pending schema migrations.
    Migrate,

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Import a saved OpenAlex, Crossref or arXiv payload.
    Import {
        /// openalex, crossref or arxiv.
        #[arg(long)]
        source: String,
        file: PathBuf,
    },

    /// Canonicalize DOI, title, venue and author whitespace.
    Normalize,

    /// Collapse duplicate records by DOI and title.
    Dedup {
        /// Also merge near-duplicate titles.
        #[arg(long)]
        fuzzy: bool,
        #[arg(long, requires = "fuzzy")]
        threshold: Option<f64>,
        #[arg(long, requires = "fuzzy")]
        prefix_len: Option<usize>,
    },

    /// Score every record against a keyword list.
    Score {
        /// Keyword phrase; repeatable. Defaults to discovery.domain_keywords.
        #[arg(long = "keyword", action = clap::ArgAction::Append)]
        keywords: Vec<String>,
    },

    /// Export records to .jsonl or .csv.
    Export {
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        min_score: Option<f64>,
        #[arg(long)]
        year_min: Option<i32>,
        /// relevance or year.
        #[arg(long)]
        sort: Option<String>,
    },

    /// Show record store statistics.
    Stats,

    /// Normalize, dedup (exact then fuzzy) and score in one go.
    Run {
        #[arg(long = "keyword", action = clap::ArgAction::Append)]
        keywords: Vec<String>,
        /// Skip the fuzzy duplicate stage.
        #[arg(long)]
        no_fuzzy: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Check the config for missing or out-of-range values.
    Validate,
    /// Show the effective config values.
    Show,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    if let Err(error) = init_tracing(cli.quiet, cli.verbose) {
        eprintln!("{error}");
    }

    let json_output = cli.json || std::env::var("LITSCOPE_JSON").as_deref() == Ok("1");

    if let Err(error) = run(cli, json_output) {
        let code = exit_code_for(&error);
        if json_output {
            let body = serde_json::json!({"status": "error", "error": format!("{error:#}")});
            println!("{body}");
        } else {
            eprintln!("error: {error:#}");
        }
        std::process::exit(code as i32);
    }
}

fn run(cli: Cli, json_output: bool) -> Result<()> {
    let start = Instant::now();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path());

    match cli.command {
        Commands::Init => {
            let wrote_config = if config_path.exists() {
                false
            } else {
                config.save_to(&config_path)?;
                true
            };
            let db = open_db(&db_path)?;
            let version = db.schema_version()?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "config_path": config_path,
                        "config_written": wrote_config,
                        "database_path": db_path,
                        "schema_version": version,
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                if wrote_config {
                    println!("Wrote default config to {}", config_path.display());
                } else {
                    println!("Config already present at {}", config_path.display());
                }
                println!("Database ready at {} (schema v{version})", db_path.display());
            }
        }

        Commands::Migrate => {
            let db = open_db(&db_path)?;
            let applied = db.migrate()?;
            let version = db.schema_version()?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "applied": applied, "schema_version": version },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("migrate: ok ({applied} applied, schema v{version})");
            }
        }

        // ── Config ─────────────────────────────────────────────────────────

        Commands::Config { action } => match action {
            ConfigAction::Validate => {
                config.validate()?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({
                        "status": "ok",
                        "data": { "valid": true, "config_path": config_path },
                        "meta": { "duration_ms": dur }
                    }))?;
                } else {
                    println!("config: ok ({})", config_path.display());
                }
            }
            ConfigAction::Show => {
                let kv = config_key_values(&config, &config_path, &db_path);
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({"status": "ok", "data": kv, "meta": {"duration_ms": dur}}))?;
                } else {
                    for (k, v) in &kv {
                        println!("{k} = {v}");
                    }
                }
            }
        },

        // ── Passes ─────────────────────────────────────────────────────────

        Commands::Import { source, file } => {
            let kind: SourceKind = source.parse()?;
            let db = open_db(&db_path)?;
            let report = import_file(&db, kind, &file)
                .with_context(|| format!("import of {} failed", file.display()))?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status": "ok", "data": report, "meta": {"duration_ms": dur}}))?;
            } else {
                println!(
                    "import: ok ({} inserted, {} skipped from {kind})",
                    report.inserted, report.skipped
                );
            }
        }

        Commands::Normalize => {
            let db = open_db(&db_path)?;
            let report = normalize_database(&db).context("normalize pass failed")?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status": "ok", "data": report, "meta": {"duration_ms": dur}}))?;
            } else {
                println!(
                    "normalize: ok ({} of {} changed, {} malformed author lists left as-is)",
                    report.changed, report.examined, report.malformed_authors
                );
            }
        }

        Commands::Dedup {
            fuzzy,
            threshold,
            prefix_len,
        } => {
            let db = open_db(&db_path)?;
            let exact = resolve_exact_database(&db).context("exact dedup pass failed")?;
            let fuzzy_report = if fuzzy {
                let mut options = FuzzyOptions::from(&config.dedup);
                if let Some(threshold) = threshold {
                    options.threshold = threshold;
                }
                if let Some(prefix_len) = prefix_len {
                    options.prefix_len = prefix_len;
                }
                Some(resolve_fuzzy_database(&db, options).context("fuzzy dedup pass failed")?)
            } else {
                None
            };
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "exact": exact, "fuzzy": fuzzy_report },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!(
                    "dedup: ok ({} DOI clusters, {} title clusters, {} records removed)",
                    exact.merged_by_doi, exact.merged_by_title, exact.deleted
                );
                if let Some(report) = fuzzy_report {
                    println!(
                        "fuzzy: ok ({} merges across {} buckets)",
                        report.merged, report.buckets
                    );
                }
            }
        }

        Commands::Score { keywords } => {
            let keywords = keywords_or_configured(keywords, &config);
            let db = open_db(&db_path)?;
            let scorer = RelevanceScorer::new(&keywords, ScoreWeights::from(&config.score));
            let report = score_database(&db, &scorer).context("score pass failed")?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "report": report, "keywords": keywords },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!(
                    "score: ok ({} scored, {} with matches)",
                    report.scored, report.matched
                );
            }
        }

        Commands::Export {
            out,
            min_score,
            year_min,
            sort,
        } => {
            let mut options = ExportOptions::from(&config.export);
            if let Some(min_score) = min_score {
                options.min_score = min_score;
            }
            options.year_min = year_min.or(config.discovery.year_filter);
            if let Some(sort) = sort {
                options.sort = sort.parse::<SortOrder>()?;
            }

            let db = open_db(&db_path)?;
            let rows = export_to_path(&db, &out, &options)?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "rows": rows, "path": out, "sort": options.sort.to_string() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                println!("export: ok ({rows} records to {})", out.display());
            }
        }

        Commands::Stats => {
            let db = open_db(&db_path)?;
            let stats = db.stats()?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status": "ok", "data": stats, "meta": {"duration_ms": dur}}))?;
            } else {
                println!("Record store statistics:");
                println!("  Total records:   {}", stats.total);
                println!("  With DOI:        {}", stats.with_doi);
                println!("  With abstract:   {}", stats.with_abstract);
                println!("  Open access:     {}", stats.open_access);
                println!("  Scored:          {}", stats.scored);
                println!("  Fetched:         {}", stats.fetched);
                for (source, count) in &stats.by_source {
                    println!("    {source:<14} {count}");
                }
            }
        }

        Commands::Run { keywords, no_fuzzy } => {
            let keywords = keywords_or_configured(keywords, &config);
            let db = open_db(&db_path)?;
            let mut pipeline = Pipeline::from_config(&config);
            if no_fuzzy {
                pipeline = pipeline.without_fuzzy();
            }
            let report = pipeline.run(&db, &keywords).context("pipeline failed")?;
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({"status": "ok", "data": report, "meta": {"duration_ms": dur}}))?;
            } else {
                println!(
                    "normalize: ok ({} of {} changed)",
                    report.normalize.changed, report.normalize.examined
                );
                println!(
                    "dedup: ok ({} DOI clusters, {} title clusters, {} records removed)",
                    report.exact.merged_by_doi, report.exact.merged_by_title, report.exact.deleted
                );
                match report.fuzzy {
                    Some(fuzzy) => println!("fuzzy: ok ({} merges)", fuzzy.merged),
                    None => println!("fuzzy: skipped"),
                }
                println!(
                    "score: ok ({} scored, {} with matches)",
                    report.score.scored, report.score.matched
                );
            }
        }
    }

    tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "command finished");
    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("LITSCOPE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn open_db(db_path: &Path) -> Result<Database> {
    Database::open(db_path).with_context(|| format!("opening database {}", db_path.display()))
}

fn keywords_or_configured(keywords: Vec<String>, config: &AppConfig) -> Vec<String> {
    if keywords.is_empty() {
        config.discovery.domain_keywords.clone()
    } else {
        keywords
    }
}

fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    if let Some(err) = error.downcast_ref::<CoreError>() {
        return err.exit_code();
    }
    if let Some(err) = error.downcast_ref::<ScienceError>() {
        return err.exit_code();
    }
    ExitCode::GeneralError
}

fn config_key_values(config: &AppConfig, config_path: &Path, db_path: &Path) -> BTreeMap<&'static str, String> {
    let mut map = BTreeMap::new();
    map.insert("config_path", config_path.display().to_string());
    map.insert("core.library_path", config.core.library_path.clone());
    map.insert("core.database_path", db_path.display().to_string());
    map.insert("discovery.domain_keywords", config.discovery.domain_keywords.join(", "));
    map.insert("discovery.domain_sources", config.discovery.domain_sources.join(", "));
    map.insert("discovery.max_depth", config.discovery.max_depth.to_string());
    map.insert("discovery.file_types", config.discovery.file_types.join(", "));
    map.insert(
        "discovery.year_filter",
        config.discovery.year_filter.map(|y| y.to_string()).unwrap_or_default(),
    );
    map.insert("dedup.fuzzy_threshold", config.dedup.fuzzy_threshold.to_string());
    map.insert("dedup.prefix_len", config.dedup.prefix_len.to_string());
    map.insert("score.title_weight", config.score.title_weight.to_string());
    map.insert("score.abstract_weight", config.score.abstract_weight.to_string());
    map.insert("export.min_score", config.export.min_score.to_string());
    map.insert("export.sort", config.export.sort.to_string());
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_dedup_flags() {
        let cli = Cli::try_parse_from([
            "litscope", "--db", "x.db", "dedup", "--fuzzy", "--threshold", "0.8", "--prefix-len", "12",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        match cli.command {
            Commands::Dedup {
                fuzzy,
                threshold,
                prefix_len,
            } => {
                assert!(fuzzy);
                assert_eq!(threshold, Some(0.8));
                assert_eq!(prefix_len, Some(12));
            }
            _ => panic!("expected dedup"),
        }
    }

    #[test]
    fn threshold_requires_fuzzy() {
        assert!(Cli::try_parse_from(["litscope", "dedup", "--threshold", "0.8"]).is_err());
    }

    #[test]
    fn repeated_keywords_are_collected() {
        let cli = Cli::try_parse_from([
            "litscope", "score", "--keyword", "corrosion monitoring", "--keyword", "rebar",
        ])
        .unwrap();
        match cli.command {
            Commands::Score { keywords } => assert_eq!(keywords, vec!["corrosion monitoring", "rebar"]),
            _ => panic!("expected score"),
        }
    }

    #[test]
    fn configured_keywords_are_the_fallback() {
        let mut config = AppConfig::default();
        config.discovery.domain_keywords = vec!["chloride".to_string()];
        assert_eq!(keywords_or_configured(Vec::new(), &config), vec!["chloride"]);
        assert_eq!(
            keywords_or_configured(vec!["rebar".to_string()], &config),
            vec!["rebar"]
        );
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let err = anyhow::Error::from(CoreError::Validation("bad".to_string()));
        assert!(matches!(exit_code_for(&err), ExitCode::InvalidArgs));

        let err = anyhow::Error::from(ScienceError::UnsupportedFormat("x".to_string()));
        assert!(matches!(exit_code_for(&err), ExitCode::InvalidArgs));

        let err = anyhow::anyhow!("other");
        assert!(matches!(exit_code_for(&err), ExitCode::GeneralError));
    }
}
