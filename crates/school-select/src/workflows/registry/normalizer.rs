/// Strip spreadsheet export noise and collapse whitespace, keeping case.
pub(crate) fn clean_cell(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}', '\u{a0}'], " ");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Header form used for column mapping: cleaned and upper-cased.
pub(crate) fn normalize_header(value: &str) -> String {
    clean_cell(value).to_uppercase()
}
