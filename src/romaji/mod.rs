//! Kana-to-romaji transliteration.
//!
//! A single left-to-right pass over the reading with one or two characters of
//! lookahead. Handles yōon (きゃ), sokuon (っ) and passes through anything the
//! table does not know.

mod table;

use std::collections::HashMap;
use std::sync::OnceLock;

/// Sokuon: doubles the consonant of the syllable that follows.
pub const SOKUON: char = 'っ';

/// Consonant emitted for a sokuon whose follower is not in the table.
const FALLBACK_CONSONANT: char = 't';

/// Lookup table keyed by one or two kana characters.
pub struct RomajiTable {
    map: HashMap<&'static str, &'static str>,
}

impl RomajiTable {
    /// Get or initialize the shared table.
    pub fn global() -> &'static RomajiTable {
        static INSTANCE: OnceLock<RomajiTable> = OnceLock::new();
        INSTANCE.get_or_init(|| RomajiTable {
            map: table::SYLLABLES.iter().copied().collect(),
        })
    }

    pub fn lookup(&self, kana: &str) -> Option<&'static str> {
        self.map.get(kana).copied()
    }

    fn lookup_chars(&self, chars: &[char]) -> Option<&'static str> {
        let key: String = chars.iter().collect();
        self.lookup(&key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Convert a kana reading into the romaji string the player has to type.
///
/// Total: characters missing from the table are copied verbatim. The output
/// is not case-normalized.
pub fn to_romaji(reading: &str) -> String {
    let table = RomajiTable::global();
    let chars: Vec<char> = reading.chars().collect();
    let mut out = String::with_capacity(chars.len() * 3);
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == SOKUON && i + 1 < chars.len() {
            out.push(geminate_consonant(table, &chars[i + 1..]));
            i += 1;
            continue;
        }

        if i + 1 < chars.len() {
            if let Some(romaji) = table.lookup_chars(&chars[i..i + 2]) {
                out.push_str(romaji);
                i += 2;
                continue;
            }
        }

        match table.lookup_chars(&chars[i..i + 1]) {
            Some(romaji) => out.push_str(romaji),
            None => out.push(chars[i]),
        }
        i += 1;
    }

    out
}

/// First letter of the syllable after a sokuon. `rest` is never empty.
fn geminate_consonant(table: &RomajiTable, rest: &[char]) -> char {
    let pair = (rest.len() >= 2)
        .then(|| table.lookup_chars(&rest[..2]))
        .flatten();
    pair.or_else(|| table.lookup_chars(&rest[..1]))
        .and_then(|romaji| romaji.chars().next())
        .unwrap_or(FALLBACK_CONSONANT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vowels_and_base_rows() {
        assert_eq!(to_romaji("あいうえお"), "aiueo");
        assert_eq!(to_romaji("さくら"), "sakura");
        assert_eq!(to_romaji("しち"), "shichi");
        assert_eq!(to_romaji("つなみ"), "tsunami");
        assert_eq!(to_romaji("ふじさん"), "fujisan");
    }

    #[test]
    fn test_voiced_and_semi_voiced() {
        assert_eq!(to_romaji("がっこう"), "gakkou");
        assert_eq!(to_romaji("ぢづ"), "didu");
        assert_eq!(to_romaji("ぱぴぷぺぽ"), "papipupepo");
        assert_eq!(to_romaji("でんわ"), "denwa");
    }

    #[test]
    fn test_youon_prefers_two_char_match() {
        assert_eq!(to_romaji("きょう"), "kyou");
        assert_eq!(to_romaji("しゃしん"), "shashin");
        assert_eq!(to_romaji("じゅぎょう"), "jugyou");
        assert_eq!(to_romaji("ちゅうしゃじょう"), "chuushajou");
        assert_eq!(to_romaji("びょういん"), "byouin");
    }

    #[test]
    fn test_sokuon_doubles_next_consonant() {
        assert_eq!(to_romaji("きって"), "kitte");
        assert_eq!(to_romaji("ざっし"), "zasshi");
        assert_eq!(to_romaji("いっぱい"), "ippai");
        assert_eq!(to_romaji("つった"), "tsutta");
    }

    #[test]
    fn test_sokuon_before_youon_uses_pair_initial() {
        assert_eq!(to_romaji("きっしゃ"), "kissha");
        assert_eq!(to_romaji("まっちゃ"), "maccha");
    }

    #[test]
    fn test_sokuon_before_unknown_uses_fallback() {
        assert_eq!(to_romaji("っa"), "ta");
        assert_eq!(to_romaji("っっか"), "tkka");
    }

    #[test]
    fn test_sokuon_at_end_passes_through() {
        assert_eq!(to_romaji("あっ"), "aっ");
        assert_eq!(to_romaji("っ"), "っ");
    }

    #[test]
    fn test_symbols() {
        assert_eq!(to_romaji("らーめん"), "ra-men");
        assert_eq!(to_romaji("あ\u{3000}い"), "a i");
        assert_eq!(to_romaji("あ い"), "a i");
    }

    #[test]
    fn test_unmapped_passthrough() {
        assert_eq!(to_romaji("カタカナ"), "カタカナ");
        assert_eq!(to_romaji("ABCか"), "ABCka");
        assert_eq!(to_romaji(""), "");
    }

    #[test]
    fn test_table_entries_are_concatenative() {
        let table = RomajiTable::global();
        assert!(!table.is_empty());
        for (kana, romaji) in table::SYLLABLES {
            assert_eq!(to_romaji(kana), *romaji, "mapping mismatch for {kana}");
            let doubled = format!("{kana}{kana}");
            // A one-char entry repeated must not accidentally form a two-char entry.
            if kana.chars().count() == 1 && table.lookup(&doubled).is_none() {
                assert_eq!(to_romaji(&doubled), format!("{romaji}{romaji}"));
            }
        }
    }

    #[test]
    fn test_table_covers_all_rows() {
        let table = RomajiTable::global();
        assert_eq!(table.len(), table::SYLLABLES.len());
        for kana in ["を", "ん", "ぽ", "ぴょ", "ぢ", "ー"] {
            assert!(table.lookup(kana).is_some(), "missing {kana}");
        }
    }
}
