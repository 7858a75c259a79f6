//! Helpers for optional text filters.

/// Treat an empty or whitespace-only filter as absent.
///
/// Filters are never matched against an empty string; a blank value
/// means the caller did not filter on that field.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Build an `ILIKE` substring pattern, escaping `%`, `_` and `\`.
pub fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
