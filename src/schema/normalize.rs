//! Canonical text form used for every header and query comparison.
//!
//! - Unicode NFKC
//! - drop zero-width space (U+200B) and byte-order mark (U+FEFF)
//! - trim, collapse inner whitespace runs to one space
//! - full Unicode case fold

use caseless::default_case_fold_str;
use unicode_normalization::UnicodeNormalization;

const ZERO_WIDTH_SPACE: char = '\u{200b}';
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Normalize `text` for comparison. Total and idempotent; blank input yields `""`.
///
/// ```
/// use template_lookup::normalize;
///
/// assert_eq!(normalize("  Template\u{200b}  ID "), "template id");
/// assert_eq!(normalize("ＴＭＰＬ－０１"), "tmpl-01");
/// ```
pub fn normalize(text: &str) -> String {
    let composed: String = text
        .nfkc()
        .filter(|&c| c != ZERO_WIDTH_SPACE && c != BYTE_ORDER_MARK)
        .collect();

    let collapsed = composed.split_whitespace().collect::<Vec<_>>().join(" ");

    // folding can leave non-NFKC sequences behind; recompose so a second pass is a no-op
    default_case_fold_str(&collapsed).nfkc().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_and_collapse() {
        assert_eq!(normalize("  Template \t\n ID  "), "template id");
        assert_eq!(normalize("a\u{00a0}\u{00a0}b"), "a b");
    }

    #[test]
    fn test_invisible_characters_removed() {
        assert_eq!(normalize("\u{feff}Template ID"), "template id");
        assert_eq!(normalize("TMPL\u{200b}-01"), "tmpl-01");
    }

    #[test]
    fn test_compatibility_forms() {
        // full-width letters, digits and hyphen-minus
        assert_eq!(normalize("ＴＭＰＬ－０１"), "tmpl-01");
        assert_eq!(normalize("ﬁle"), "file");
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(normalize("STRASSE"), normalize("Straße"));
        assert_eq!(normalize("ΟΔΟΣ"), normalize("οδοσ"));
        // iota subscript folds to a separate iota
        assert_eq!(normalize("\u{1f88}-01"), "\u{1f00}\u{3b9}-01");
        assert_eq!(normalize("\u{1f80}-01"), normalize("\u{1f00}\u{3b9}-01"));
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \u{200b} \u{feff} "), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "",
            "  Template  ID ",
            "ＴＭＰＬ－０１",
            "Straße ẞ",
            "ΣΊΣΥΦΟΣ",
            "e\u{301}cole",
            "İstanbul",
            "①②③ ㍻",
            "\u{1f88}\u{1f80} ﬃ",
            "\u{feff}\u{200b}x\u{2003}y",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }
}
