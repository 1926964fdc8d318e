//! Integration tests for Markdown rendering.

use tincture_common::codec::PlaceholderCodec;
use tincture_common::log::{MemoryLogger, NullLogger, Severity};
use tincture_markdown::{MarkdownEngine, MarkdownOptions, markdown_to_html};

fn render(markdown: &str) -> String {
    markdown_to_html(markdown, &NullLogger)
}

#[test]
fn test_paragraphs_and_blank_lines() {
    assert_eq!(render("one\n\ntwo"), "<p>one</p>\n<p>two</p>");
    assert_eq!(render(""), "");
}

#[test]
fn test_headings_are_not_wrapped() {
    assert_eq!(
        render("# Intro\ntext\n---"),
        "<h1 id=\"intro\">Intro</h1>\n<p>text</p>\n<hr>"
    );
}

#[test]
fn test_nested_list() {
    assert_eq!(
        render("- a\n   - b\n- c"),
        [
            "<ul class=\"list-dash\">",
            "<li>a</li>",
            "<ul class=\"list-dash\">",
            "<li>b</li>",
            "</ul>",
            "<li>c</li>",
            "</ul>",
        ]
        .join("\n")
    );
}

#[test]
fn test_list_closed_by_blank_line_and_other_blocks() {
    assert_eq!(
        render("* a\n\n1. b\n2. c\npara"),
        [
            "<ul class=\"list-star\">",
            "<li>a</li>",
            "</ul>",
            "<ol>",
            "<li>b</li>",
            "<li>c</li>",
            "</ol>",
            "<p>para</p>",
        ]
        .join("\n")
    );
}

#[test]
fn test_deep_lists_force_closed_at_end() {
    let html = render("+ a\n   + b\n      + c");
    assert_eq!(html.matches("<ul class=\"list-plus\">").count(), 3);
    assert!(html.ends_with("</ul>\n</ul>\n</ul>"));
}

#[test]
fn test_nested_blockquotes() {
    assert_eq!(
        render("> a\n>> b"),
        [
            "<blockquote>",
            "<p>a</p>",
            "<blockquote>",
            "<p>b</p>",
            "</blockquote>",
            "</blockquote>",
        ]
        .join("\n")
    );
}

#[test]
fn test_fenced_code_is_escaped_and_untouched() {
    assert_eq!(
        render("```rust\nlet x = **y** < 3;\n```\nafter"),
        "<pre><code class=\"language-rust\">let x = **y** &lt; 3;</code></pre>\n<p>after</p>"
    );
}

#[test]
fn test_unclosed_code_fence_runs_to_end() {
    let logger = MemoryLogger::new();
    let engine = MarkdownEngine::new(MarkdownOptions::default(), &PlaceholderCodec, &logger);
    assert_eq!(engine.render("```\n# not a heading"), "<pre><code># not a heading</code></pre>");
    assert!(logger.has(Severity::Debug, "Markdown"));
}

#[test]
fn test_custom_fences_nest() {
    assert_eq!(
        render(":::note\n**hi**\n:::tip\ninner\n:::\n:::"),
        [
            "<div class=\"note\">",
            "<p><strong>hi</strong></p>",
            "<div class=\"tip\">",
            "<p>inner</p>",
            "</div>",
            "</div>",
        ]
        .join("\n")
    );
}

#[test]
fn test_table_with_alignment() {
    let html = render("| L | C | R |\n|:--|:-:|--:|\n| 1 | 2 | 3 |");
    assert_eq!(
        html,
        [
            "<table>",
            "<thead>",
            "<tr><th style=\"text-align: left\">L</th><th style=\"text-align: center\">C</th><th style=\"text-align: right\">R</th></tr>",
            "</thead>",
            "<tbody>",
            "<tr><td style=\"text-align: left\">1</td><td style=\"text-align: center\">2</td><td style=\"text-align: right\">3</td></tr>",
            "</tbody>",
            "</table>",
        ]
        .join("\n")
    );
}

#[test]
fn test_table_footer_captured_and_logged() {
    let logger = MemoryLogger::new();
    let engine = MarkdownEngine::new(MarkdownOptions::default(), &PlaceholderCodec, &logger);
    let html = engine.render("| a | b |\n|---|---|\n| 1 | 2 |\nTotal: 3");

    assert!(html.contains("<tfoot>\n<tr><td colspan=\"2\">Total: 3</td></tr>\n</tfoot>"));
    assert!(
        logger
            .records()
            .iter()
            .any(|r| r.severity == Severity::Info && r.message.contains("Total: 3"))
    );
}

#[test]
fn test_table_footer_disabled() {
    let options = MarkdownOptions {
        table_footer: false,
        ..MarkdownOptions::default()
    };
    let engine = MarkdownEngine::new(options, &PlaceholderCodec, &NullLogger);
    let html = engine.render("| a |\n|---|\n| 1 |\nTotal");
    assert!(!html.contains("<tfoot>"));
    assert!(html.ends_with("</table>\n<p>Total</p>"));
}

#[test]
fn test_block_after_table_is_not_footer() {
    let html = render("| a |\n|---|\n| 1 |\n# Next");
    assert!(!html.contains("<tfoot>"));
    assert!(html.ends_with("</table>\n<h1 id=\"next\">Next</h1>"));

    for next in ["- item", "> quote", "```", "---", "<div>x</div>"] {
        let html = render(&format!("| a |\n|---|\n| 1 |\n{next}"));
        assert!(!html.contains("<tfoot>"), "{next:?} became a footer");
    }
}

#[test]
fn test_invalid_table_falls_back_to_paragraphs() {
    assert_eq!(
        render("| a | b |\n| not | separator |\nnext"),
        "<p>| a | b |</p>\n<p>| not | separator |</p>\n<p>next</p>"
    );
}

#[test]
fn test_raw_html_passthrough() {
    assert_eq!(
        render("<div class=\"box\">\n**raw**\n</div>\n*md*"),
        "<div class=\"box\">\n**raw**\n</div>\n<p><em>md</em></p>"
    );
    assert_eq!(render("<br>"), "<br>");
}

#[test]
fn test_inline_code_placeholders_decoded() {
    assert_eq!(
        render("run `a_b --flag` now"),
        "<p>run <code>a_b --flag</code> now</p>"
    );
}

#[test]
fn test_list_indent_option() {
    let options = MarkdownOptions {
        list_indent: 2,
        ..MarkdownOptions::default()
    };
    let engine = MarkdownEngine::new(options, &PlaceholderCodec, &NullLogger);
    let html = engine.render("- a\n  - b");
    assert_eq!(html.matches("<ul").count(), 2);
}
