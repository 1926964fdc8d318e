//! Block-level state machine.
//!
//! Lines are consumed from the front of a queue. Each iteration looks at
//! the next line, decides which block it starts, and drains as many lines as
//! that block needs. Blockquotes and custom fences hand their inner lines to
//! a fresh recursive call.

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;
use tincture_common::codec::TextCodec;
use tincture_common::log::Logger;
use tincture_html::{Token, is_void_element, tokenize};

use crate::MarkdownOptions;
use crate::inline::{InlineFormatter, escape_html, is_heading, is_horizontal_rule};
use crate::list::{ListItem, ListStack};
use crate::table::render_table;

const LOG_TAG: &str = "Markdown";

static CODE_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^```\s*([A-Za-z0-9_+#.-]*)\s*$").expect("code fence pattern is valid")
});

static CUSTOM_FENCE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:::\s*([A-Za-z0-9_-]+)\s*$").expect("custom fence pattern is valid")
});

static CUSTOM_FENCE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:::\s*$").expect("custom fence close pattern is valid"));

static RAW_HTML_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^</?[A-Za-z][A-Za-z0-9-]*(?:\s[^>]*)?/?>").expect("raw html pattern is valid")
});

/// Per-call rendering state.
#[derive(Debug, Default)]
struct BlockContext {
    /// Lists currently open.
    open_lists: ListStack,
    /// Rendered lines so far.
    output: Vec<String>,
}

impl BlockContext {
    fn close_lists(&mut self) {
        self.open_lists.close_all(&mut self.output);
    }

    /// Emit a non-list block, closing any open lists first.
    fn push_block(&mut self, line: String) {
        self.close_lists();
        self.output.push(line);
    }
}

/// Markdown to HTML converter.
pub struct MarkdownEngine<'a> {
    options: MarkdownOptions,
    codec: &'a dyn TextCodec,
    logger: &'a dyn Logger,
}

impl<'a> MarkdownEngine<'a> {
    /// Create an engine.
    #[must_use]
    pub fn new(options: MarkdownOptions, codec: &'a dyn TextCodec, logger: &'a dyn Logger) -> Self {
        Self {
            options,
            codec,
            logger,
        }
    }

    /// Render a document.
    #[must_use]
    pub fn render(&self, markdown: &str) -> String {
        let lines: VecDeque<String> = markdown.lines().map(str::to_string).collect();
        let html = self.render_lines(lines).join("\n");
        self.codec.decode(&html)
    }

    fn inline(&self) -> InlineFormatter<'a> {
        InlineFormatter::new(self.codec)
    }

    fn render_lines(&self, mut lines: VecDeque<String>) -> Vec<String> {
        let mut ctx = BlockContext::default();

        while let Some(line) = lines.pop_front() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                ctx.close_lists();
            } else if let Some(caps) = CODE_FENCE_RE.captures(trimmed) {
                let block = self.code_block(&caps[1], &mut lines);
                ctx.push_block(block);
            } else if let Some(caps) = CUSTOM_FENCE_OPEN_RE.captures(trimmed) {
                let class = caps[1].to_string();
                ctx.close_lists();
                self.custom_fence(&class, &mut lines, &mut ctx.output);
            } else if trimmed.starts_with('>') {
                ctx.close_lists();
                lines.push_front(line);
                self.blockquote(&mut lines, &mut ctx.output);
            } else if let Some(item) = ListItem::parse(&line, self.options.list_indent) {
                ctx.open_lists.enter(&item, &mut ctx.output);
                ctx.output
                    .push(format!("<li>{}</li>", self.inline().format(item.content.trim())));
            } else if trimmed.starts_with('|') {
                ctx.close_lists();
                lines.push_front(line);
                self.table(&mut lines, &mut ctx.output);
            } else if RAW_HTML_RE.is_match(trimmed) {
                ctx.close_lists();
                lines.push_front(line);
                self.raw_html(&mut lines, &mut ctx.output);
            } else if is_heading(trimmed) || is_horizontal_rule(trimmed) {
                ctx.push_block(self.inline().format(trimmed));
            } else {
                ctx.push_block(format!("<p>{}</p>", self.inline().format(trimmed)));
            }
        }

        ctx.close_lists();
        ctx.output
    }

    /// Consume a fenced code block up to its closing fence.
    fn code_block(&self, language: &str, lines: &mut VecDeque<String>) -> String {
        let mut body = Vec::new();
        let mut closed = false;
        while let Some(line) = lines.pop_front() {
            if line.trim() == "```" {
                closed = true;
                break;
            }
            body.push(self.codec.encode(&escape_html(&line)));
        }
        if !closed {
            self.logger
                .debug(LOG_TAG, "code fence never closed; ran to end of input");
        }

        let class = if language.is_empty() {
            String::new()
        } else {
            format!(" class=\"language-{}\"", escape_html(language))
        };
        format!("<pre><code{class}>{}</code></pre>", body.join("\n"))
    }

    /// Consume a `:::class` block, counting nested fences.
    fn custom_fence(&self, class: &str, lines: &mut VecDeque<String>, out: &mut Vec<String>) {
        let mut inner = VecDeque::new();
        let mut depth = 1usize;
        while let Some(line) = lines.pop_front() {
            let trimmed = line.trim();
            if CUSTOM_FENCE_OPEN_RE.is_match(trimmed) {
                depth += 1;
            } else if CUSTOM_FENCE_CLOSE_RE.is_match(trimmed) {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            inner.push_back(line);
        }
        if depth > 0 {
            self.logger.debug(
                LOG_TAG,
                &format!("custom fence ':::{class}' never closed; ran to end of input"),
            );
        }

        out.push(format!("<div class=\"{}\">", escape_html(class)));
        out.extend(self.render_lines(inner));
        out.push("</div>".to_string());
    }

    /// Consume contiguous `>` lines, stripping one level of quoting.
    fn blockquote(&self, lines: &mut VecDeque<String>, out: &mut Vec<String>) {
        let mut inner = VecDeque::new();
        while let Some(stripped) = lines
            .front()
            .and_then(|line| line.trim_start().strip_prefix('>'))
        {
            let stripped = stripped.strip_prefix(' ').unwrap_or(stripped).to_string();
            inner.push_back(stripped);
            let _ = lines.pop_front();
        }

        out.push("<blockquote>".to_string());
        out.extend(self.render_lines(inner));
        out.push("</blockquote>".to_string());
    }

    /// Consume contiguous `|` lines and an optional footer line.
    fn table(&self, lines: &mut VecDeque<String>, out: &mut Vec<String>) {
        let mut rows = Vec::new();
        while lines.front().is_some_and(|l| l.trim().starts_with('|')) {
            if let Some(row) = lines.pop_front() {
                rows.push(row);
            }
        }

        let footer = if self.options.table_footer
            && lines
                .front()
                .is_some_and(|l| !l.trim().is_empty() && !self.starts_block(l))
        {
            lines.pop_front()
        } else {
            None
        };

        if let Some(table) = render_table(&rows, footer.as_deref(), &self.inline()) {
            if let Some(footer) = &footer {
                self.logger.info(
                    LOG_TAG,
                    &format!("captured '{}' as table footer", footer.trim()),
                );
            }
            out.extend(table);
            return;
        }

        self.logger.debug(
            LOG_TAG,
            "table separator row is missing or malformed; rendering rows as paragraphs",
        );
        if let Some(footer) = footer {
            lines.push_front(footer);
        }
        for row in rows {
            out.push(format!("<p>{}</p>", self.inline().format(row.trim())));
        }
    }

    /// Whether `line` opens a block other than a paragraph.
    fn starts_block(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.starts_with('>')
            || is_heading(trimmed)
            || is_horizontal_rule(trimmed)
            || CODE_FENCE_RE.is_match(trimmed)
            || CUSTOM_FENCE_OPEN_RE.is_match(trimmed)
            || CUSTOM_FENCE_CLOSE_RE.is_match(trimmed)
            || RAW_HTML_RE.is_match(trimmed)
            || ListItem::parse(line, self.options.list_indent).is_some()
    }

    /// Pass HTML through verbatim until its tags balance.
    fn raw_html(&self, lines: &mut VecDeque<String>, out: &mut Vec<String>) {
        let mut depth = 0isize;
        while let Some(line) = lines.pop_front() {
            depth += tag_balance(&line);
            out.push(line);
            if depth <= 0 {
                return;
            }
        }
        self.logger
            .debug(LOG_TAG, "raw HTML block never balanced; ran to end of input");
    }
}

/// Opened minus closed non-void elements on one line.
fn tag_balance(line: &str) -> isize {
    tokenize(line)
        .iter()
        .map(|token| match token {
            Token::StartTag {
                name, self_closing, ..
            } if !self_closing && !is_void_element(name) => 1,
            Token::EndTag { name } if !is_void_element(name) => -1,
            _ => 0,
        })
        .sum()
}
