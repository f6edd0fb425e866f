use lazy_static::lazy_static;
use regex::Regex;

use libcognate::structs::Symbol;

lazy_static! {
    /// Annotation and separator characters that are not part of a transcription.
    static ref NOISE: Regex = Regex::new(r#"[-\x20%~*$"|.+·?’\]\[=_<>‐ᶢ]"#).unwrap();

    /// One IPA segment: a base character followed by any combining marks and
    /// modifier letters. A tie bar pulls the next base character into the
    /// segment. Stray leading marks form a segment of their own.
    static ref IPA_SEGMENT: Regex = Regex::new(
        r"[^\p{M}\p{Lm}](?:[\x{0361}\x{035C}][^\p{M}\p{Lm}]|[\p{M}\p{Lm}])*|[\p{M}\p{Lm}]+"
    )
    .unwrap();
}

const REPLACEMENTS: &[(&str, &str)] = &[
    ("C", "c"),
    ("K", "k"),
    ("L", "l"),
    ("W", "w"),
    ("T", "t"),
    ("dʒ͡", "d͡ʒ"),
    ("ʤ", "d͡ʒ"),
];

/// Strip annotation characters from a transcription and normalize a few
/// symbols that are written in more than one way.
pub fn clean_word(word: &str) -> String {
    let mut word = NOISE.replace_all(word, "").into_owned();
    for (from, to) in REPLACEMENTS {
        if word.contains(from) {
            word = word.replace(from, to);
        }
    }
    word
}

/// Split an IPA transcription into segments.
pub fn tokenize_ipa(word: &str) -> Vec<Symbol> {
    IPA_SEGMENT
        .find_iter(word)
        .map(|m| Symbol::from(m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_clean_word() {
        check!(clean_word("ha-nd?") == "hand");
        check!(clean_word("[mano] ~x") == "manox");
        check!(clean_word("CaKLWT") == "caklwt");
        check!(clean_word("ʤem") == "d͡ʒem");
        check!(clean_word("dʒ͡em") == "d͡ʒem");
        check!(clean_word("E8") == "E8");
    }

    #[test]
    fn test_tokenize_ipa() {
        let tokens: Vec<String> = tokenize_ipa("tʰaːd͡ʒə")
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        check!(tokens == vec!["tʰ", "aː", "d͡ʒ", "ə"]);
    }

    #[test]
    fn test_tokenize_combining_diacritics() {
        let tokens = tokenize_ipa("n\u{0325}a\u{0303}");
        check!(tokens.len() == 2);
        check!(tokens[0].as_str() == "n\u{0325}");
        check!(tokens[1].as_str() == "a\u{0303}");
    }
}
