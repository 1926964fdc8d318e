//! Reversible encoding of code content.
//!
//! Text inside code spans and fenced blocks must survive the inline Markdown
//! substitutions and HTML attribute syntax untouched. The encoder swaps every
//! syntactically significant character for a private-use placeholder; the
//! decoder restores them once rendering is done.

/// A reversible text encoder.
///
/// `decode(encode(s)) == s` must hold for any `s` that contains no
/// placeholder characters of its own.
pub trait TextCodec: Send + Sync {
    /// Replace protected characters with placeholders.
    fn encode(&self, text: &str) -> String;
    /// Restore protected characters from placeholders.
    fn decode(&self, text: &str) -> String;
}

/// Characters that carry meaning for inline Markdown or attribute syntax.
const PROTECTED: [char; 20] = [
    '*', '_', '~', '`', '-', '^', '$', '[', ']', '{', '}', '(', ')', '=', '!', '|', '#', '+',
    '\\', ':',
];

/// First code point of the placeholder range (Unicode private use area).
const PLACEHOLDER_BASE: u32 = 0xE000;

/// Maps each protected character to its own private-use code point.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderCodec;

impl PlaceholderCodec {
    fn placeholder(index: usize) -> char {
        // PROTECTED is tiny, so the offset always lands inside the PUA.
        #[allow(clippy::cast_possible_truncation)]
        char::from_u32(PLACEHOLDER_BASE + index as u32).unwrap_or('\u{FFFD}')
    }
}

impl TextCodec for PlaceholderCodec {
    fn encode(&self, text: &str) -> String {
        text.chars()
            .map(|c| {
                PROTECTED
                    .iter()
                    .position(|&p| p == c)
                    .map_or(c, Self::placeholder)
            })
            .collect()
    }

    fn decode(&self, text: &str) -> String {
        text.chars()
            .map(|c| {
                let offset = (c as u32).wrapping_sub(PLACEHOLDER_BASE) as usize;
                PROTECTED.get(offset).copied().unwrap_or(c)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_hides_markdown_syntax() {
        let codec = PlaceholderCodec;
        let encoded = codec.encode("**bold** [x](y)");
        assert!(!encoded.contains('*'));
        assert!(!encoded.contains('['));
        assert!(!encoded.contains('('));
        assert!(encoded.contains("bold"));
    }

    #[test]
    fn test_decode_restores_original() {
        let codec = PlaceholderCodec;
        let source = "let x = a_b ~ c^2 | {d} # e: `f` \\ g!";
        assert_eq!(codec.decode(&codec.encode(source)), source);
    }

    #[test]
    fn test_decode_leaves_plain_text_alone() {
        let codec = PlaceholderCodec;
        assert_eq!(codec.decode("<p>plain text</p>"), "<p>plain text</p>");
    }
}
