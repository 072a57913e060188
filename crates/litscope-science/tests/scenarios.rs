use litscope_core::{Database, DocumentRecord, RecordId, RecordStore};
use litscope_science::dedup::{
    ExactReport, FuzzyOptions, resolve_exact, resolve_exact_database, resolve_fuzzy_database,
};
use litscope_science::normalize::normalize_database;
use litscope_science::score::{RelevanceScorer, ScoreWeights, score_database};
use litscope_science::{Pipeline, ScienceError, normalize};
use tempfile::TempDir;

fn titled(title: &str) -> DocumentRecord {
    DocumentRecord {
        title: Some(title.to_string()),
        ..DocumentRecord::new("")
    }
}

fn messy_corpus() -> Vec<DocumentRecord> {
    let mut with_authors = DocumentRecord {
        doi: Some(" 10.1016/J.Corsci.2020.1 ".to_string()),
        title: Some("Pitting   corrosion of\nstainless steel".to_string()),
        venue: Some(" Corrosion  Science ".to_string()),
        source: Some("openalex".to_string()),
        ..DocumentRecord::new("https://openalex.org/W1")
    };
    with_authors.authors = Some(r#"[" Ada  Lovelace", "Alan Turing "]"#.to_string());

    vec![
        with_authors,
        DocumentRecord {
            doi: Some("10.1016/j.corsci.2020.1".to_string()),
            title: Some("Pitting corrosion of stainless steel".to_string()),
            abstract_text: Some("Chloride induced pitting ".repeat(8)),
            open_access: true,
            source: Some("crossref".to_string()),
            ..DocumentRecord::new("https://doi.org/10.1016/j.corsci.2020.1")
        },
        DocumentRecord {
            authors: Some("Lovelace, Ada".to_string()),
            ..titled("Corrosion Monitoring with Embedded Sensors")
        },
        DocumentRecord {
            year: Some(2018),
            ..titled("corrosion monitoring with embedded sensors")
        },
        titled("Fatigue of welded joints"),
        DocumentRecord::new("https://example.org/untitled"),
    ]
}

fn seed(db: &Database, records: &[DocumentRecord]) -> Vec<RecordId> {
    records.iter().map(|r| db.insert(r).unwrap()).collect()
}

#[test]
fn scenario_a_doi_cluster_keeps_open_access_crossref_record() {
    let db = Database::open_in_memory().unwrap();
    let ids = seed(
        &db,
        &[
            DocumentRecord {
                doi: Some("10.1/abc".to_string()),
                title: Some("Scraped Title".to_string()),
                year: Some(2019),
                abstract_text: Some(String::new()),
                open_access: false,
                source: Some("scrapy".to_string()),
                ..DocumentRecord::new("https://scraped.example")
            },
            DocumentRecord {
                doi: Some("10.1/abc".to_string()),
                abstract_text: Some("a".repeat(120)),
                open_access: true,
                source: Some("crossref".to_string()),
                ..DocumentRecord::new("https://doi.org/10.1/abc")
            },
        ],
    );

    let report = resolve_exact_database(&db).unwrap();
    assert_eq!(
        report,
        ExactReport {
            merged_by_doi: 1,
            merged_by_title: 0,
            deleted: 1
        }
    );

    assert!(db.find(ids[0]).unwrap().is_none());
    let survivor = db.get(ids[1]).unwrap();
    assert!(survivor.open_access);
    assert_eq!(survivor.source.as_deref(), Some("crossref"));
    assert_eq!(survivor.title.as_deref(), Some("Scraped Title"));
    assert_eq!(survivor.year, Some(2019));
    assert_eq!(survivor.abstract_text.as_deref().map(str::len), Some(120));
    assert_eq!(survivor.source_url, "https://doi.org/10.1/abc");
}

#[test]
fn scenario_b_titles_differing_in_case_merge() {
    let db = Database::open_in_memory().unwrap();
    seed(
        &db,
        &[titled("Concrete Corrosion Study"), titled("concrete corrosion study")],
    );

    let report = resolve_exact_database(&db).unwrap();
    assert_eq!(report.merged_by_title, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(db.count().unwrap(), 1);
}

#[test]
fn scenario_c_singular_plural_titles_fall_in_separate_buckets() {
    let db = Database::open_in_memory().unwrap();
    seed(
        &db,
        &[
            titled("Effects of Chloride Ingress on Rebar"),
            titled("Effect of Chloride Ingress on Rebar"),
        ],
    );

    for threshold in [0.9, 0.8] {
        let options = FuzzyOptions {
            threshold,
            ..FuzzyOptions::default()
        };
        assert_eq!(resolve_fuzzy_database(&db, options).unwrap().merged, 0);
    }
    assert_eq!(db.count().unwrap(), 2);
}

#[test]
fn scenario_c_threshold_decides_same_bucket_merge() {
    let db = Database::open_in_memory().unwrap();
    seed(
        &db,
        &[
            titled("Chloride Ingress in Reinforced Concrete"),
            titled("Chloride Ingress in Reinforced Concrete Slabs"),
        ],
    );

    let strict = resolve_fuzzy_database(&db, FuzzyOptions::default()).unwrap();
    assert_eq!(strict.merged, 0);
    assert_eq!(db.count().unwrap(), 2);

    let lenient = FuzzyOptions {
        threshold: 0.8,
        ..FuzzyOptions::default()
    };
    assert_eq!(resolve_fuzzy_database(&db, lenient).unwrap().merged, 1);
    assert_eq!(db.count().unwrap(), 1);
}

#[test]
fn scenario_d_bigram_keyword_is_found() {
    let db = Database::open_in_memory().unwrap();
    let ids = seed(&db, &[titled("A Study of Corrosion Monitoring Techniques")]);

    let scorer = RelevanceScorer::new(&["corrosion monitoring"], ScoreWeights::default());
    let report = score_database(&db, &scorer).unwrap();
    assert_eq!(report.scored, 1);

    let record = db.get(ids[0]).unwrap();
    assert!(record.relevance_score.unwrap() > 0.0);
    assert_eq!(
        record.keywords_found,
        Some(vec!["corrosion monitoring".to_string()])
    );
}

#[test]
fn scenario_e_empty_store_reports_zero_everywhere() {
    let db = Database::open_in_memory().unwrap();

    assert_eq!(normalize_database(&db).unwrap().changed, 0);
    assert_eq!(resolve_exact_database(&db).unwrap(), ExactReport::default());
    assert_eq!(
        resolve_fuzzy_database(&db, FuzzyOptions::default()).unwrap().merged,
        0
    );
    let scorer = RelevanceScorer::new(&["rebar"], ScoreWeights::default());
    assert_eq!(score_database(&db, &scorer).unwrap().scored, 0);
}

#[test]
fn normalization_is_idempotent_over_a_store() {
    let db = Database::open_in_memory().unwrap();
    seed(&db, &messy_corpus());

    let first = normalize_database(&db).unwrap();
    assert!(first.changed > 0);
    assert_eq!(first.malformed_authors, 1);
    let snapshot = db.list_all().unwrap();

    assert_eq!(normalize_database(&db).unwrap().changed, 0);
    assert_eq!(db.list_all().unwrap(), snapshot);

    for record in snapshot {
        let (again, changed) = normalize(record.clone());
        assert!(!changed);
        assert_eq!(again, record);
    }
}

#[test]
fn exact_resolution_converges_after_one_run() {
    let db = Database::open_in_memory().unwrap();
    seed(&db, &messy_corpus());
    normalize_database(&db).unwrap();

    let first = resolve_exact_database(&db).unwrap();
    assert_eq!(first.merged_by_doi, 1);
    assert_eq!(first.merged_by_title, 1);
    assert_eq!(first.deleted, 2);

    assert_eq!(resolve_exact_database(&db).unwrap(), ExactReport::default());
    assert_eq!(db.count().unwrap(), 4);
}

#[test]
fn scores_stay_within_bounds() {
    let db = Database::open_in_memory().unwrap();
    seed(&db, &messy_corpus());

    let keywords = [
        "corrosion",
        "pitting corrosion",
        "stainless steel",
        "chloride",
        "embedded sensors",
    ];
    let scorer = RelevanceScorer::new(&keywords, ScoreWeights::default());
    score_database(&db, &scorer).unwrap();

    for record in db.list_all().unwrap() {
        let score = record.relevance_score.unwrap();
        assert!((0.0..=1.0).contains(&score), "score {score} out of range");
    }
}

#[test]
fn failed_pass_leaves_store_untouched() {
    let db = Database::open_in_memory().unwrap();
    seed(&db, &messy_corpus());
    let before = db.list_all().unwrap();

    let result: Result<ExactReport, ScienceError> = db.transaction(|store| {
        let report = resolve_exact(store)?;
        assert_eq!(report.deleted, 1);
        Err(ScienceError::Parse("aborted after merging".to_string()))
    });

    assert!(result.is_err());
    assert_eq!(db.list_all().unwrap(), before);
}

#[test]
fn pipeline_results_persist_in_database_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("litscope.db");

    {
        let db = Database::open(&path).unwrap();
        seed(&db, &messy_corpus());
        let report = Pipeline::new()
            .run(&db, &["corrosion monitoring", "pitting"])
            .unwrap();
        assert_eq!(report.exact.deleted, 2);
        assert_eq!(report.score.scored, 4);
    }

    let db = Database::open(&path).unwrap();
    let records = db.list_all().unwrap();
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.relevance_score.is_some()));

    let pitting = records
        .iter()
        .find(|r| r.doi.as_deref() == Some("10.1016/j.corsci.2020.1"))
        .unwrap();
    assert!(pitting.open_access);
    assert_eq!(pitting.venue.as_deref(), Some("Corrosion Science"));
    assert_eq!(
        pitting.keywords_found,
        Some(vec!["corrosion monitoring".to_string(), "pitting".to_string()])
    );
}
