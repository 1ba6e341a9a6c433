//! Command normalization
//!
//! Raw transcripts arrive lowercase-ish but ragged: clipped phrases
//! ("combat mo"), wake-word residue, stray whitespace. Normalization maps
//! them onto canonical command strings so the resolver can match exactly.

/// Synonym table mapping colloquial or truncated phrases to canonical
/// commands. Order matters: suffix matching takes the first entry that
/// matches, which breaks ties between keys that are prefixes of each other
/// ("combat" vs "combat mo").
const SYNONYMS: &[(&str, &str)] = &[
    ("combat", "combat mode"),
    ("combat mo", "combat mode"),
    ("combat mod", "combat mode"),
    ("gaming", "gaming mode"),
    ("normal", "normal mode"),
    ("stealth", "stealth mode"),
    ("shut down", "shutdown computer"),
    ("switch to hindi", "switch to hindi"),
    ("hindi mein baat karo", "switch to hindi"),
    ("switch to english", "switch to english"),
    ("english mein baat karo", "switch to english"),
];

/// Normalize a raw transcript into a canonical command string
///
/// Lowercases and trims, then:
/// 1. an exact synonym-table match wins;
/// 2. otherwise, if the text ends with a table key preceded by a space,
///    substitute the mapped canonical phrase (first matching entry wins);
/// 3. otherwise return the trimmed, lowercased text unchanged.
///
/// Empty input normalizes to the empty string; callers must drop it rather
/// than dispatch it.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let text = raw.trim().to_lowercase();

    for (key, canonical) in SYNONYMS {
        if text == *key {
            return (*canonical).to_string();
        }
    }

    for (key, canonical) in SYNONYMS {
        if text.ends_with(key) && text[..text.len() - key.len()].ends_with(' ') {
            return (*canonical).to_string();
        }
    }

    text
}
