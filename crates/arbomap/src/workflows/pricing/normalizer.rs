use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercases and strips diacritics (NFKD, combining marks dropped) so free-text labels
/// compare on their base letters. Precomposed and decomposed input fold the same way.
pub fn fold_diacritics(value: &str) -> String {
    let stripped: String = value
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch) && !matches!(*ch, '\u{feff}' | '\u{200b}'))
        .collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
