use litscope_core::{DocStatus, DocumentRecord};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::error::{Result, ScienceError};
use crate::identifiers::Doi;

use super::clean_optional;

pub const SOURCE_TAG: &str = "arxiv";

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    published: Option<String>,
    #[serde(rename = "author", default)]
    authors: Vec<AtomAuthor>,
    #[serde(rename = "arxiv:journal_ref", alias = "journal_ref")]
    journal_ref: Option<String>,
    #[serde(rename = "arxiv:doi", alias = "doi")]
    doi: Option<String>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@type")]
    link_type: Option<String>,
    #[serde(rename = "@title")]
    title: Option<String>,
}

/// Parse an arXiv API Atom feed into records, one per `<entry>`.
pub fn parse_atom_feed(xml: &str) -> Result<Vec<DocumentRecord>> {
    let feed: AtomFeed =
        from_str(xml).map_err(|e| ScienceError::Parse(format!("invalid atom xml: {e}")))?;

    Ok(feed.entries.into_iter().map(record_from_entry).collect())
}

fn record_from_entry(entry: AtomEntry) -> DocumentRecord {
    let pdf_url = entry
        .links
        .iter()
        .find(|link| {
            link.link_type.as_deref() == Some("application/pdf")
                || link.title.as_deref() == Some("pdf")
        })
        .and_then(|link| link.href.as_deref())
        .map(normalize_arxiv_url);
    let source_url = pdf_url.unwrap_or_else(|| normalize_arxiv_url(entry.id.trim()));

    let mut record = DocumentRecord::new(source_url);
    record.title = clean_optional(Some(entry.title.as_str()));
    record.abstract_text = clean_optional(Some(entry.summary.as_str()));

    let authors: Vec<String> = entry
        .authors
        .iter()
        .filter_map(|author| clean_optional(Some(author.name.as_str())))
        .collect();
    record.set_authors(&authors);

    record.doi = entry.doi.as_deref().and_then(Doi::canonicalize);
    record.venue = clean_optional(entry.journal_ref.as_deref());
    record.year = entry
        .published
        .as_deref()
        .and_then(|published| published.trim().get(..4))
        .and_then(|year| year.parse().ok());

    record.open_access = true;
    record.oa_status = Some("green".to_string());
    record.file_type = Some("pdf".to_string());
    record.source = Some(SOURCE_TAG.to_string());
    record.status = DocStatus::MetadataOnly;
    record
}

fn normalize_arxiv_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("http://arxiv.org/") {
        return format!("https://arxiv.org/{rest}");
    }
    url.to_string()
}
