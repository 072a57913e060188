use crate::error::{Result, ScienceError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doi {
    pub raw: String,
    pub normalized: String,
    pub url: String,
}

impl Doi {
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        let stripped = strip_resolver_prefix(input);

        // Validate: must start with "10.", contain "/", and have non-empty suffix
        if !stripped.starts_with("10.") {
            return Err(ScienceError::InvalidDoi(input.to_string()));
        }
        let slash_pos = stripped
            .find('/')
            .ok_or_else(|| ScienceError::InvalidDoi(input.to_string()))?;
        let suffix = &stripped[slash_pos + 1..];
        if suffix.is_empty() {
            return Err(ScienceError::InvalidDoi(input.to_string()));
        }

        let normalized = stripped.to_lowercase();
        let url = format!("https://doi.org/{normalized}");

        Ok(Self {
            raw: input.to_string(),
            normalized,
            url,
        })
    }

    /// Canonical form if `input` parses as a DOI, otherwise the trimmed
    /// input as-is. Source payloads carry DOIs in either shape.
    pub fn canonicalize(input: &str) -> Option<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        match Self::parse(trimmed) {
            Ok(doi) => Some(doi.normalized),
            Err(_) => Some(trimmed.to_string()),
        }
    }
}

const RESOLVER_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
];

fn strip_resolver_prefix(input: &str) -> &str {
    let lower = input.to_ascii_lowercase();
    for prefix in RESOLVER_PREFIXES {
        if lower.starts_with(prefix) {
            return &input[prefix.len()..];
        }
    }
    if lower.starts_with("doi:") {
        return input[4..].trim_start();
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_doi() {
        let doi = Doi::parse("10.1000/xyz123").unwrap();
        assert_eq!(doi.normalized, "10.1000/xyz123");
        assert_eq!(doi.url, "https://doi.org/10.1000/xyz123");
    }

    #[test]
    fn doi_with_https_prefix() {
        let doi = Doi::parse("https://doi.org/10.1000/xyz123").unwrap();
        assert_eq!(doi.normalized, "10.1000/xyz123");
    }

    #[test]
    fn doi_with_doi_colon_prefix() {
        let doi = Doi::parse("doi:10.1000/xyz123").unwrap();
        assert_eq!(doi.normalized, "10.1000/xyz123");
    }

    #[test]
    fn doi_with_space_after_colon() {
        let doi = Doi::parse("DOI: 10.1000/xyz123").unwrap();
        assert_eq!(doi.normalized, "10.1000/xyz123");
    }

    #[test]
    fn doi_uppercase_normalized_to_lowercase() {
        let doi = Doi::parse("10.1000/XYZ123").unwrap();
        assert_eq!(doi.normalized, "10.1000/xyz123");
    }

    #[test]
    fn reject_not_a_doi() {
        assert!(Doi::parse("not-a-doi").is_err());
    }

    #[test]
    fn reject_doi_without_suffix() {
        assert!(Doi::parse("10.1000").is_err());
    }

    #[test]
    fn reject_empty_string() {
        assert!(Doi::parse("").is_err());
    }

    #[test]
    fn uppercase_resolver_prefix_is_stripped() {
        let doi = Doi::parse("HTTPS://DOI.ORG/10.1000/XYZ123").unwrap();
        assert_eq!(doi.normalized, "10.1000/xyz123");
    }

    #[test]
    fn canonicalize_keeps_unparseable_values() {
        assert_eq!(
            Doi::canonicalize(" https://doi.org/10.1/ABC "),
            Some("10.1/abc".to_string())
        );
        assert_eq!(Doi::canonicalize("urn:x-local:7"), Some("urn:x-local:7".to_string()));
        assert_eq!(Doi::canonicalize("   "), None);
    }

    #[test]
    fn doi_with_dx_doi_org() {
        let doi = Doi::parse("http://dx.doi.org/10.1000/xyz123").unwrap();
        assert_eq!(doi.normalized, "10.1000/xyz123");
    }
}
