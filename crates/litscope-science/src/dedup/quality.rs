use litscope_core::DocumentRecord;

/// Abstracts longer than this many characters count as substantive.
const SUBSTANTIVE_ABSTRACT_CHARS: usize = 100;

/// Preference for the origin of a record, case-insensitive. Unknown or absent sources score 0.
pub fn source_preference(source: Option<&str>) -> u32 {
    let Some(source) = source else {
        return 0;
    };
    match source.to_ascii_lowercase().as_str() {
        "crossref" => 5,
        "openalex" => 4,
        "arxiv" => 3,
        "scrapy" => 1,
        _ => 0,
    }
}

/// Additive completeness heuristic used to pick the survivor of a duplicate cluster.
pub fn quality_score(record: &DocumentRecord) -> u32 {
    let mut score = 0;

    if record.open_access {
        score += 10;
    }
    if record
        .abstract_text
        .as_deref()
        .is_some_and(|text| text.chars().count() > SUBSTANTIVE_ABSTRACT_CHARS)
    {
        score += 5;
    }
    if record.title.as_deref().is_some_and(|title| !title.is_empty()) {
        score += 2;
    }
    if record.year.is_some_and(|year| year != 0) {
        score += 1;
    }

    score + source_preference(record.source.as_deref())
}

/// Position in `members` of the highest-scoring record. Earlier members win ties.
pub fn choose_survivor(members: &[&DocumentRecord]) -> usize {
    let mut best_idx = 0usize;
    let mut best_score = members.first().map_or(0, |record| quality_score(record));

    for (idx, record) in members.iter().enumerate().skip(1) {
        let score = quality_score(record);
        if score > best_score {
            best_score = score;
            best_idx = idx;
        }
    }

    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_preference_is_case_insensitive() {
        assert_eq!(source_preference(Some("CrossRef")), 5);
        assert_eq!(source_preference(Some("openalex")), 4);
        assert_eq!(source_preference(Some("ARXIV")), 3);
        assert_eq!(source_preference(Some("scrapy")), 1);
        assert_eq!(source_preference(Some("web")), 0);
        assert_eq!(source_preference(None), 0);
    }

    #[test]
    fn quality_score_adds_every_component() {
        let record = DocumentRecord {
            open_access: true,
            abstract_text: Some("x".repeat(101)),
            title: Some("T".to_string()),
            year: Some(2020),
            source: Some("crossref".to_string()),
            ..DocumentRecord::new("")
        };
        assert_eq!(quality_score(&record), 10 + 5 + 2 + 1 + 5);
        assert_eq!(quality_score(&DocumentRecord::new("")), 0);
    }

    #[test]
    fn abstract_must_exceed_one_hundred_characters() {
        let mut record = DocumentRecord {
            abstract_text: Some("é".repeat(100)),
            ..DocumentRecord::new("")
        };
        assert_eq!(quality_score(&record), 0);
        record.abstract_text = Some("é".repeat(101));
        assert_eq!(quality_score(&record), 5);
    }

    #[test]
    fn empty_title_and_zero_year_do_not_count() {
        let record = DocumentRecord {
            title: Some(String::new()),
            year: Some(0),
            ..DocumentRecord::new("")
        };
        assert_eq!(quality_score(&record), 0);
    }

    #[test]
    fn survivor_ties_go_to_the_first_member() {
        let a = DocumentRecord {
            source: Some("arxiv".to_string()),
            ..DocumentRecord::new("a")
        };
        let b = a.clone();
        let c = DocumentRecord {
            source: Some("crossref".to_string()),
            ..DocumentRecord::new("c")
        };
        assert_eq!(choose_survivor(&[&a, &b]), 0);
        assert_eq!(choose_survivor(&[&a, &c, &b]), 1);
    }
}
