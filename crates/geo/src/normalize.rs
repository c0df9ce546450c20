/// Normalize a free-form country name into a lookup key.
///
/// Trims, lower-cases, and collapses runs of whitespace to a single space.
/// Punctuation is kept: `"Taiwan*"` and `"Taiwan"` are distinct keys and
/// must be bridged by an alias.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}
