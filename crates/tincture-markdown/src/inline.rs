//! Inline formatting.
//!
//! A line is rewritten by a fixed sequence of regex substitutions. Order
//! matters: code spans and link targets are encoded before emphasis runs so
//! their characters cannot be read as markup, and `***` is tried as a
//! horizontal rule before it is tried as bold italic.
//!
//! 1. escaped asterisk `\*`
//! 2. code span `` `x` ``
//! 3. image `![alt](src)`
//! 4. link `[text](href)`
//! 5. superscript `^x^`
//! 6. subscript `~x~`
//! 7. horizontal rule `---`, `***`, `___`
//! 8. bold italic `***x***`
//! 9. bold `**x**`, `__x__`
//! 10. italic `*x*`, `_x_`
//! 11. strikethrough `~~x~~`
//! 12. mark `==x==`
//! 13. headings `######` down to `#`, each with a slug id

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tincture_common::codec::TextCodec;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!(stringify!($name), " is valid")));
    };
}

pattern!(ESCAPED_ASTERISK, r"\\\*");
pattern!(CODE_SPAN, r"`([^`]+)`");
pattern!(IMAGE, r"!\[([^\]]*)\]\(([^)\s]+)\)");
pattern!(LINK, r"\[([^\]]+)\]\(([^)\s]+)\)");
pattern!(SUPERSCRIPT, r"\^([^\^\s]+)\^");
pattern!(SUBSCRIPT, r"(~+)([^~\s]+)(~+)");
pattern!(HORIZONTAL_RULE, r"^\s*(?:---|\*\*\*|___)\s*$");
pattern!(BOLD_ITALIC, r"\*\*\*(.+?)\*\*\*");
pattern!(BOLD_STAR, r"\*\*(.+?)\*\*");
pattern!(BOLD_UNDERSCORE, r"__(.+?)__");
pattern!(ITALIC_STAR, r"\*([^*]+)\*");
pattern!(ITALIC_UNDERSCORE, r"\b_([^_]+)_\b");
pattern!(STRIKETHROUGH, r"~~(.+?)~~");
pattern!(MARK, r"==(.+?)==");
pattern!(TAG, r"<[^>]+>");

static HEADINGS: LazyLock<Vec<(usize, Regex)>> = LazyLock::new(|| {
    (1..=6)
        .rev()
        .map(|level| {
            let re = Regex::new(&format!(r"^\s*#{{{level}}}\s+(.+?)\s*$"))
                .expect("heading pattern is valid");
            (level, re)
        })
        .collect()
});

/// Whether `line` is a heading that formatting will turn into `<hN>`.
#[must_use]
pub fn is_heading(line: &str) -> bool {
    HEADINGS.iter().any(|(_, re)| re.is_match(line))
}

/// Whether `line` is a horizontal rule.
#[must_use]
pub fn is_horizontal_rule(line: &str) -> bool {
    HORIZONTAL_RULE.is_match(line)
}

/// Escape `&`, `<`, `>`, `"` and `'`.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Applies the inline substitution sequence with a given codec.
#[derive(Clone, Copy)]
pub struct InlineFormatter<'a> {
    codec: &'a dyn TextCodec,
}

impl<'a> InlineFormatter<'a> {
    /// Create a formatter that protects code and URLs with `codec`.
    #[must_use]
    pub fn new(codec: &'a dyn TextCodec) -> Self {
        Self { codec }
    }

    /// Format one line. The result may still hold codec placeholders.
    #[must_use]
    pub fn format(&self, line: &str) -> String {
        let codec = self.codec;

        let text = ESCAPED_ASTERISK.replace_all(line, codec.encode("*").as_str());
        let text = CODE_SPAN.replace_all(&text, |caps: &Captures<'_>| {
            format!("<code>{}</code>", codec.encode(&escape_html(&caps[1])))
        });
        let text = IMAGE.replace_all(&text, |caps: &Captures<'_>| {
            format!(
                "<img src=\"{}\" alt=\"{}\">",
                codec.encode(&caps[2]),
                codec.encode(&escape_html(&caps[1]))
            )
        });
        let text = LINK.replace_all(&text, |caps: &Captures<'_>| {
            format!("<a href=\"{}\">{}</a>", codec.encode(&caps[2]), &caps[1])
        });
        let text = SUPERSCRIPT.replace_all(&text, "<sup>$1</sup>");
        let text = SUBSCRIPT.replace_all(&text, |caps: &Captures<'_>| {
            // Only single tildes; `~~` runs are left for strikethrough.
            if caps[1].len() == 1 && caps[3].len() == 1 {
                format!("<sub>{}</sub>", &caps[2])
            } else {
                caps[0].to_string()
            }
        });
        let text = HORIZONTAL_RULE.replace_all(&text, "<hr>");
        let text = BOLD_ITALIC.replace_all(&text, "<strong><em>$1</em></strong>");
        let text = BOLD_STAR.replace_all(&text, "<strong>$1</strong>");
        let text = BOLD_UNDERSCORE.replace_all(&text, "<strong>$1</strong>");
        let text = ITALIC_STAR.replace_all(&text, "<em>$1</em>");
        let text = ITALIC_UNDERSCORE.replace_all(&text, "<em>$1</em>");
        let text = STRIKETHROUGH.replace_all(&text, "<del>$1</del>");
        let mut text = MARK.replace_all(&text, "<mark>$1</mark>").into_owned();

        for (level, re) in HEADINGS.iter() {
            text = re
                .replace_all(&text, |caps: &Captures<'_>| {
                    let inner = &caps[1];
                    format!(
                        "<h{level} id=\"{}\">{inner}</h{level}>",
                        self.heading_id(inner)
                    )
                })
                .into_owned();
        }
        text
    }

    /// Slug of the heading text with tags removed.
    fn heading_id(&self, inner: &str) -> String {
        let plain = TAG.replace_all(inner, "");
        slug::slugify(self.codec.decode(&plain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tincture_common::codec::PlaceholderCodec;

    fn format(line: &str) -> String {
        let codec = PlaceholderCodec;
        codec.decode(&InlineFormatter::new(&codec).format(line))
    }

    #[test]
    fn test_emphasis() {
        assert_eq!(format("**b** and *i*"), "<strong>b</strong> and <em>i</em>");
        assert_eq!(format("***both***"), "<strong><em>both</em></strong>");
        assert_eq!(format("__b__ _i_"), "<strong>b</strong> <em>i</em>");
    }

    #[test]
    fn test_snake_case_is_not_italic() {
        assert_eq!(format("call some_long_name now"), "call some_long_name now");
    }

    #[test]
    fn test_escaped_asterisk() {
        assert_eq!(format(r"2 \* 3 \* 4"), "2 * 3 * 4");
    }

    #[test]
    fn test_code_span_is_protected_and_escaped() {
        assert_eq!(
            format("use `a **b** <c>` here"),
            "use <code>a **b** &lt;c&gt;</code> here"
        );
    }

    #[test]
    fn test_links_and_images() {
        assert_eq!(
            format("see [the *docs*](https://x.io/a_b_c)"),
            "see <a href=\"https://x.io/a_b_c\">the <em>docs</em></a>"
        );
        assert_eq!(
            format("![logo](img/logo.png)"),
            "<img src=\"img/logo.png\" alt=\"logo\">"
        );
    }

    #[test]
    fn test_sup_sub_strike_mark() {
        assert_eq!(format("x^2^"), "x<sup>2</sup>");
        assert_eq!(format("H~2~O"), "H<sub>2</sub>O");
        assert_eq!(format("~~gone~~"), "<del>gone</del>");
        assert_eq!(format("==hot=="), "<mark>hot</mark>");
    }

    #[test]
    fn test_adjacent_subscripts() {
        assert_eq!(format("H~2~O~3~"), "H<sub>2</sub>O<sub>3</sub>");
        assert_eq!(format("~a~ and ~~b~~"), "<sub>a</sub> and <del>b</del>");
    }

    #[test]
    fn test_horizontal_rules() {
        assert_eq!(format("---"), "<hr>");
        assert_eq!(format("***"), "<hr>");
        assert_eq!(format("___"), "<hr>");
    }

    #[test]
    fn test_headings_with_slug_ids() {
        assert_eq!(format("# Hello, World!"), "<h1 id=\"hello-world\">Hello, World!</h1>");
        assert_eq!(
            format("### Using *Tincture*"),
            "<h3 id=\"using-tincture\">Using <em>Tincture</em></h3>"
        );
        assert_eq!(format("####### seven"), "####### seven");
    }

    #[test]
    fn test_detection() {
        assert!(is_heading("## Title"));
        assert!(!is_heading("#hashtag"));
        assert!(is_horizontal_rule(" --- "));
        assert!(!is_horizontal_rule("----"));
    }
}
