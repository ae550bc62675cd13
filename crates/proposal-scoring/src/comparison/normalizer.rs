use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical form used when comparing labels: lower-case, no diacritics, punctuation
/// replaced by spaces, whitespace collapsed.
pub fn normalize_label(value: &str) -> String {
    let folded: String = value
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .map(|ch| {
            if ch.is_alphanumeric() {
                ch
            } else {
                ' '
            }
        })
        .collect();

    collapse_whitespace(&folded.to_lowercase())
}

pub(crate) fn collapse_whitespace(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics_case_and_punctuation() {
        assert_eq!(
            normalize_label("  Plocha  řešeného území:"),
            "plocha reseneho uzemi"
        );
        assert_eq!(normalize_label("Zpevněné plochy (m²)"), "zpevnene plochy m2");
    }

    #[test]
    fn collapse_whitespace_drops_invisible_markers() {
        assert_eq!(collapse_whitespace("\u{feff}a \t\n b"), "a b");
    }
}
