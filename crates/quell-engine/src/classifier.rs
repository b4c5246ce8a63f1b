//! Code-point classifier
//!
//! Membership test against a fixed table of inclusive code-point ranges.
//! Text is always walked by `char` (Unicode scalar value), so astral-plane
//! emoji are seen as one character.

/// Inclusive `(start, end)` code-point ranges treated as emoji.
///
/// Ranges are kept disjoint and non-adjacent.
pub const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x200D, 0x200D),   // zero width joiner
    (0x20E3, 0x20E3),   // combining enclosing keycap
    (0x231A, 0x231B),   // watch, hourglass
    (0x23E9, 0x23F3),   // media controls, alarm clock
    (0x23F8, 0x23FA),   // pause, stop, record
    (0x2600, 0x27BF),   // misc symbols, dingbats
    (0x2B05, 0x2B07),   // arrows
    (0x2B1B, 0x2B1C),   // large squares
    (0x2B50, 0x2B50),   // star
    (0x2B55, 0x2B55),   // heavy circle
    (0x3030, 0x3030),   // wavy dash
    (0x303D, 0x303D),   // part alternation mark
    (0x3297, 0x3297),   // circled ideograph congratulation
    (0x3299, 0x3299),   // circled ideograph secret
    (0xFE0E, 0xFE0F),   // variation selectors 15/16
    (0x1F000, 0x1F02F), // mahjong tiles
    (0x1F0A0, 0x1F64F), // cards, enclosed alphanumerics, pictographs, emoticons
    (0x1F680, 0x1F6FF), // transport and map
    (0x1F7E0, 0x1F7EB), // colored circles and squares
    (0x1F900, 0x1F9FF), // supplemental symbols and pictographs
    (0x1FA70, 0x1FAFF), // symbols and pictographs extended-A
    (0xE0020, 0xE007F), // tag characters (subdivision flags)
];

/// True iff `c` falls in one of [`EMOJI_RANGES`]
#[inline]
pub fn is_emoji(c: char) -> bool {
    let cp = c as u32;
    EMOJI_RANGES
        .iter()
        .any(|&(start, end)| cp >= start && cp <= end)
}

/// True iff any character of `text` is an emoji. `None` and `""` are false.
pub fn contains_emoji<'a>(text: impl Into<Option<&'a str>>) -> bool {
    match text.into() {
        Some(text) => text.chars().any(is_emoji),
        None => false,
    }
}

/// Emoji characters of `text` in order, duplicates kept
pub fn extract_emojis<'a>(text: impl Into<Option<&'a str>>) -> Vec<char> {
    match text.into() {
        Some(text) => text.chars().filter(|&c| is_emoji(c)).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_boundaries() {
        for &(start, end) in EMOJI_RANGES {
            let first = char::from_u32(start).unwrap();
            let last = char::from_u32(end).unwrap();
            assert!(is_emoji(first), "{start:#X} should be emoji");
            assert!(is_emoji(last), "{end:#X} should be emoji");

            if let Some(below) = char::from_u32(start - 1) {
                assert!(!is_emoji(below), "{:#X} should not be emoji", start - 1);
            }
            if let Some(above) = char::from_u32(end + 1) {
                assert!(!is_emoji(above), "{:#X} should not be emoji", end + 1);
            }
        }
    }

    #[test]
    fn test_ranges_are_ordered_and_separated() {
        for pair in EMOJI_RANGES.windows(2) {
            assert!(pair[0].0 <= pair[0].1);
            assert!(pair[0].1 + 1 < pair[1].0, "{:X?} touches {:X?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_plain_text_is_not_emoji() {
        for c in "Hello, World! 123 ÄÖÜ 你好 ©®™".chars() {
            assert!(!is_emoji(c), "{c:?} misclassified");
        }
    }

    #[test]
    fn test_astral_emoji_classified_as_one_char() {
        assert!(is_emoji('😀'));
        assert!(is_emoji('🎉'));
        assert!(is_emoji('🦀'));
        assert!(is_emoji('❤'));
        assert_eq!("😀".chars().count(), 1);
    }

    #[test]
    fn test_contains_emoji_empty_inputs() {
        assert!(!contains_emoji(None::<&str>));
        assert!(!contains_emoji(""));
        assert!(!contains_emoji("plain text"));
        assert!(contains_emoji("party 🎉"));
        assert!(contains_emoji(Some("🚀")));
    }

    #[test]
    fn test_extract_emojis_preserves_order_and_duplicates() {
        assert_eq!(extract_emojis("Hello 😀 World 🎉"), vec!['😀', '🎉']);
        assert_eq!(extract_emojis("🎉a🎉"), vec!['🎉', '🎉']);
        assert!(extract_emojis(None::<&str>).is_empty());
        assert!(extract_emojis("").is_empty());
    }
}
