use litscope_core::DocumentRecord;

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

fn merge_option_string(target: &mut Option<String>, incoming: &Option<String>) {
    if is_blank(target) && !is_blank(incoming) {
        target.clone_from(incoming);
    }
}

fn merge_option_number<T: Copy + Default + PartialEq>(target: &mut Option<T>, incoming: Option<T>) {
    let zero = T::default();
    if target.is_none_or(|value| value == zero) && incoming.is_some_and(|value| value != zero) {
        *target = incoming;
    }
}

/// Fill the gaps in `keep` from `other`.
///
/// A field on `keep` is only written when it is absent or empty; `open_access`
/// is OR'd and `status` only moves forward in the fetch lifecycle.
pub fn merge_into(keep: &mut DocumentRecord, other: &DocumentRecord) {
    if keep.source_url.is_empty() && !other.source_url.is_empty() {
        keep.source_url.clone_from(&other.source_url);
    }

    merge_option_string(&mut keep.doi, &other.doi);
    merge_option_string(&mut keep.title, &other.title);
    merge_option_string(&mut keep.abstract_text, &other.abstract_text);
    merge_option_string(&mut keep.venue, &other.venue);
    merge_option_number(&mut keep.year, other.year);
    merge_option_string(&mut keep.authors, &other.authors);
    merge_option_string(&mut keep.local_path, &other.local_path);
    merge_option_number(&mut keep.file_size, other.file_size);
    merge_option_string(&mut keep.license, &other.license);
    merge_option_string(&mut keep.oa_status, &other.oa_status);
    merge_option_string(&mut keep.source, &other.source);

    merge_option_string(&mut keep.file_type, &other.file_type);
    merge_option_string(&mut keep.mime_type, &other.mime_type);
    merge_option_string(&mut keep.checksum_sha256, &other.checksum_sha256);
    merge_option_string(&mut keep.fetched_at, &other.fetched_at);

    if keep.relevance_score.is_none() {
        keep.relevance_score = other.relevance_score;
    }
    if keep.keywords_found.as_ref().is_none_or(Vec::is_empty)
        && other.keywords_found.as_ref().is_some_and(|found| !found.is_empty())
    {
        keep.keywords_found.clone_from(&other.keywords_found);
    }

    keep.open_access |= other.open_access;
    if other.status.rank() > keep.status.rank() {
        keep.status.clone_from(&other.status);
    }
}
