use std::collections::HashMap;

use litscope_core::{DocStatus, DocumentRecord};
use serde_json::Value;

use crate::identifiers::Doi;

use super::{clean_optional, non_empty_str};

pub const SOURCE_TAG: &str = "openalex";

/// Map one OpenAlex work object to a record. `None` for non-object values.
pub fn record_from_work(work: &Value) -> Option<DocumentRecord> {
    work.as_object()?;

    let primary = &work["primary_location"];
    let source_url = non_empty_str(&primary["landing_page_url"])
        .or_else(|| non_empty_str(&primary["source"]["host_organization_url"]))
        .or_else(|| non_empty_str(&work["id"]))
        .unwrap_or_default()
        .to_string();

    let mut record = DocumentRecord::new(source_url);
    record.doi = non_empty_str(&work["doi"]).and_then(Doi::canonicalize);
    record.title = non_empty_str(&work["title"])
        .or_else(|| non_empty_str(&work["display_name"]))
        .and_then(|title| clean_optional(Some(title)));

    let authors: Vec<&str> = work["authorships"]
        .as_array()
        .map(|authorships| {
            authorships
                .iter()
                .filter_map(|a| non_empty_str(&a["author"]["display_name"]))
                .collect()
        })
        .unwrap_or_default();
    record.set_authors(&authors);

    record.venue = non_empty_str(&work["host_venue"]["display_name"])
        .or_else(|| non_empty_str(&primary["source"]["display_name"]))
        .map(str::to_string);
    record.year = parse_year(work);
    record.abstract_text = non_empty_str(&work["abstract"])
        .map(str::to_string)
        .or_else(|| reconstruct_abstract(&work["abstract_inverted_index"]));

    record.open_access = work["open_access"]["is_oa"].as_bool().unwrap_or(false);
    record.oa_status = non_empty_str(&work["open_access"]["oa_status"]).map(str::to_string);
    record.license = non_empty_str(&primary["license"]).map(str::to_string);
    record.source = Some(SOURCE_TAG.to_string());
    record.status = DocStatus::MetadataOnly;

    Some(record)
}

fn parse_year(work: &Value) -> Option<i32> {
    work["publication_year"]
        .as_i64()
        .and_then(|year| i32::try_from(year).ok())
        .or_else(|| {
            non_empty_str(&work["publication_date"])
                .and_then(|date| date.get(..4))
                .and_then(|year| year.parse().ok())
        })
}

/// Rebuild running text from OpenAlex's word -> positions index.
pub fn reconstruct_abstract(index: &Value) -> Option<String> {
    let index = index.as_object()?;

    let mut positions: HashMap<u64, &str> = HashMap::new();
    for (word, slots) in index {
        for pos in slots.as_array().into_iter().flatten().filter_map(Value::as_u64) {
            positions.insert(pos, word.as_str());
        }
    }

    let mut ordered: Vec<(u64, &str)> = positions.into_iter().collect();
    ordered.sort_unstable_by_key(|(pos, _)| *pos);

    let text = ordered
        .into_iter()
        .map(|(_, word)| word)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    (!text.is_empty()).then_some(text)
}
