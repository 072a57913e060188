use litscope_core::{DocStatus, DocumentRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::identifiers::Doi;

use super::{clean_optional, non_empty_str};

pub const SOURCE_TAG: &str = "crossref";

static JATS_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<[^>]+>").expect("valid regex"));

/// Map one Crossref work (an item of `message.items`) to a record. `None` for non-object values.
pub fn record_from_work(item: &Value) -> Option<DocumentRecord> {
    item.as_object()?;

    let link = item["link"]
        .as_array()
        .and_then(|links| links.iter().find_map(|l| non_empty_str(&l["URL"])));
    let source_url = link
        .or_else(|| non_empty_str(&item["URL"]))
        .unwrap_or_default()
        .to_string();

    let mut record = DocumentRecord::new(source_url);
    record.doi = non_empty_str(&item["DOI"]).and_then(Doi::canonicalize);
    record.title = clean_optional(non_empty_str(&item["title"][0]));
    record.set_authors(&parse_authors(item));
    record.venue = non_empty_str(&item["container-title"][0]).map(str::to_string);
    record.year = parse_year(item);
    record.abstract_text = non_empty_str(&item["abstract"]).and_then(strip_jats);
    record.license = non_empty_str(&item["license"][0]["URL"]).map(str::to_string);
    record.source = Some(SOURCE_TAG.to_string());
    record.status = DocStatus::MetadataOnly;

    Some(record)
}

fn parse_year(item: &Value) -> Option<i32> {
    ["issued", "published-print", "published-online", "created"]
        .iter()
        .find_map(|key| item[*key]["date-parts"][0][0].as_i64())
        .and_then(|year| i32::try_from(year).ok())
}

/// `given family`, skipping authors with neither.
fn parse_authors(item: &Value) -> Vec<String> {
    item["author"]
        .as_array()
        .map(|authors| {
            authors
                .iter()
                .filter_map(|a| {
                    let name = [non_empty_str(&a["given"]), non_empty_str(&a["family"])]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(" ");
                    if name.is_empty() {
                        non_empty_str(&a["name"]).map(str::to_string)
                    } else {
                        Some(name)
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Crossref abstracts arrive as JATS markup.
fn strip_jats(raw: &str) -> Option<String> {
    let plain = JATS_TAG_RE.replace_all(raw, " ");
    clean_optional(Some(plain.as_ref()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn maps_crossref_item() {
        let item = json!({
            "DOI": "10.1016/J.Conbuildmat.2019.07.1",
            "title": ["Chloride ingress in\n concrete"],
            "author": [
                {"given": "Ada", "family": "Lovelace"},
                {"family": "Turing"},
                {"name": "Concrete Consortium"},
                {}
            ],
            "container-title": ["Construction and Building Materials"],
            "issued": {"date-parts": [[2019, 7, 1]]},
            "link": [{"URL": ""}, {"URL": "https://publisher.example/pdf"}],
            "URL": "https://doi.org/10.1016/j.conbuildmat.2019.07.1",
            "license": [{"URL": "https://creativecommons.org/licenses/by/4.0/"}],
            "abstract": "<jats:p>Chloride <jats:italic>ingress</jats:italic> is studied.</jats:p>"
        });

        let record = record_from_work(&item).unwrap();
        assert_eq!(record.doi.as_deref(), Some("10.1016/j.conbuildmat.2019.07.1"));
        assert_eq!(record.title.as_deref(), Some("Chloride ingress in concrete"));
        assert_eq!(
            record.authors_list(),
            Some(vec![
                "Ada Lovelace".to_string(),
                "Turing".to_string(),
                "Concrete Consortium".to_string()
            ])
        );
        assert_eq!(record.venue.as_deref(), Some("Construction and Building Materials"));
        assert_eq!(record.year, Some(2019));
        assert_eq!(record.source_url, "https://publisher.example/pdf");
        assert_eq!(
            record.license.as_deref(),
            Some("https://creativecommons.org/licenses/by/4.0/")
        );
        assert_eq!(record.abstract_text.as_deref(), Some("Chloride ingress is studied."));
        assert!(!record.open_access);
        assert_eq!(record.source.as_deref(), Some("crossref"));
    }

    #[test]
    fn sparse_item_uses_fallbacks() {
        let item = json!({
            "URL": "https://doi.org/10.1/x",
            "published-online": {"date-parts": [[2021]]}
        });
        let record = record_from_work(&item).unwrap();
        assert_eq!(record.source_url, "https://doi.org/10.1/x");
        assert_eq!(record.year, Some(2021));
        assert!(record.title.is_none());
        assert!(record.doi.is_none());
        assert_eq!(record.authors.as_deref(), Some("[]"));
    }
}
