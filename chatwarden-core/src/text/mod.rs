// File: src/text/mod.rs
//
// Text analysis helpers used before any scoring: normalization, content
// hashing, emoji counting, homoglyph detection and link detection.

pub mod lists;

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use unicode_segmentation::UnicodeSegmentation;

use chatwarden_common::models::message::{EntityKind, MessageEntity};

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    // http(s) links, telegram deep links, and the bare "word.tld/..." form
    // spammers use to dodge scheme-based filters.
    Regex::new(r"(?i)(?:https?://\S+|tg://\S+|t\.me/\S+|\b[\w-]+\.[a-z]{2,6}/\S*)")
        .expect("valid url pattern")
});

/// Cyrillic letters visually identical to Latin ones. A word mixing scripts
/// through these is almost always a substitution trick.
const CYRILLIC_HOMOGLYPHS: &[char] = &['а', 'е', 'о', 'с', 'р', 'х', 'у', 'і', 'ѕ', 'ј'];

fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}' | '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}'
    )
}

/// Canonical form used for hashing, classification and word matching:
/// invisible characters stripped, Unicode-lowercased, whitespace runs
/// collapsed to single spaces, trimmed.
pub fn normalize(raw: &str) -> String {
    let lowered: String = raw
        .chars()
        .filter(|c| !is_invisible(*c))
        .flat_map(char::to_lowercase)
        .collect();
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// SHA-256 hex over the normalized text. Two messages differing only in
/// case, spacing or invisible characters hash the same.
pub fn content_hash(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(raw).as_bytes());
    hex::encode(hasher.finalize())
}

fn is_emoji_scalar(c: char) -> bool {
    let cp = c as u32;
    (0x1F300..=0x1F5FF).contains(&cp)
        || (0x1F600..=0x1F64F).contains(&cp)
        || (0x1F680..=0x1F6FF).contains(&cp)
        || (0x1F900..=0x1F9FF).contains(&cp)
        || (0x1FA70..=0x1FAFF).contains(&cp)
        || (0x2600..=0x26FF).contains(&cp)
        || (0x2700..=0x27BF).contains(&cp)
        || (0x1F1E6..=0x1F1FF).contains(&cp)
}

/// Grapheme-aware emoji count: a ZWJ sequence or a flag counts once.
pub fn count_emojis(text: &str) -> usize {
    text.graphemes(true)
        .filter(|g| g.chars().any(is_emoji_scalar))
        .count()
}

/// Number of DISTINCT words that mix Latin letters with Cyrillic
/// homoglyphs. Pure-Cyrillic words never count.
pub fn lookalike_word_count(text: &str) -> usize {
    let normalized = normalize(text);
    let mut seen: HashSet<&str> = HashSet::new();
    for word in normalized.split_whitespace() {
        let has_latin = word.chars().any(|c| c.is_ascii_alphabetic());
        let has_homoglyph = word.chars().any(|c| CYRILLIC_HOMOGLYPHS.contains(&c));
        if has_latin && has_homoglyph {
            seen.insert(word);
        }
    }
    seen.len()
}

/// True when the text or its rich-text entities carry a link.
pub fn find_links(text: &str, entities: &[MessageEntity]) -> bool {
    if entities
        .iter()
        .any(|e| matches!(e.kind, EntityKind::Url | EntityKind::TextLink))
    {
        return true;
    }
    URL_RE.is_match(text)
}

/// True when the whole message is nothing but a template greeting
/// (punctuation around it ignored).
pub fn is_bare_greeting(text: &str) -> bool {
    let normalized = normalize(text);
    let stripped: &str = normalized.trim_matches(|c: char| c.is_ascii_punctuation() || c == '…');
    if stripped.is_empty() {
        return false;
    }
    lists::TEMPLATE_GREETINGS.iter().any(|g| *g == stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatwarden_common::models::message::MessageEntity;

    #[test]
    fn normalize_collapses_case_and_whitespace() {
        assert_eq!(normalize("  ПрИвЕт   МИР  "), "привет мир");
    }

    #[test]
    fn normalize_strips_invisible_characters() {
        assert_eq!(normalize("cry\u{200B}pto"), "crypto");
    }

    #[test]
    fn content_hash_ignores_cosmetic_differences() {
        assert_eq!(content_hash("Купи Крипту!"), content_hash("купи   крипту!"));
        assert_ne!(content_hash("купи крипту"), content_hash("продай крипту"));
    }

    #[test]
    fn counts_emoji_sequences_once() {
        assert_eq!(count_emojis("hello 🎉🎉"), 2);
        // family ZWJ sequence is a single grapheme
        assert_eq!(count_emojis("👨‍👩‍👧"), 1);
        assert_eq!(count_emojis("no emoji here"), 0);
    }

    #[test]
    fn lookalike_counts_distinct_mixed_words() {
        // "сrypto" and "рay" each mix Cyrillic lookalikes into Latin words
        let text = "сrypto сrypto рay bonus";
        assert_eq!(lookalike_word_count(text), 2);
    }

    #[test]
    fn pure_russian_text_has_no_lookalikes() {
        assert_eq!(lookalike_word_count("привет как дела у вас сегодня"), 0);
    }

    #[test]
    fn finds_links_in_text_and_entities() {
        assert!(find_links("go to https://example.com now", &[]));
        assert!(find_links("join t.me/spamchannel", &[]));
        assert!(find_links("see example.com/promo", &[]));
        assert!(!find_links("just words here", &[]));

        let entities = vec![MessageEntity {
            kind: EntityKind::TextLink,
            offset: 0,
            length: 4,
            url: Some("https://spam.example".into()),
        }];
        assert!(find_links("nice", &entities));
    }

    #[test]
    fn bare_greeting_detection() {
        assert!(is_bare_greeting("Привет!"));
        assert!(is_bare_greeting("здравствуйте"));
        assert!(!is_bare_greeting("привет, продаю гаражи"));
        assert!(!is_bare_greeting("!!!"));
    }
}
