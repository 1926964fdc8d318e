//! High-level rendering API for the Tincture pipeline.
//!
//! # Scope
//!
//! This crate provides:
//! - **Pipeline facade** - [`Tincture`] bundles a logger, a text codec,
//!   options and a theme registry behind the five core operations
//! - **Styled rendering** - CSS + HTML, or CSS + Markdown, to styled HTML
//! - **Themes** - named stylesheets parsed once and reused
//!
//! # Example
//!
//! ```
//! use tincture::Tincture;
//!
//! let tincture = Tincture::default();
//! let html = tincture.render("p { color: red; }", "<p>hi</p>");
//! assert_eq!(
//!     html,
//!     "<div id=\"rootContainer\"><p style=\"color: red;\">hi</p></div>"
//! );
//! ```

pub mod theme;

pub use tincture_common as common;
pub use tincture_css as css;
pub use tincture_dom as dom;
pub use tincture_html as html;
pub use tincture_markdown as markdown;

pub use theme::{ThemeError, ThemeRegistry};

use tincture_common::codec::{PlaceholderCodec, TextCodec};
use tincture_common::log::{Logger, TerminalLogger};
use tincture_css::CssRule;
use tincture_dom::DomTree;
use tincture_markdown::{MarkdownEngine, MarkdownOptions};

const LOG_TAG: &str = "Tincture";

/// Options for a [`Tincture`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TinctureOptions {
    /// Markdown block options.
    pub markdown: MarkdownOptions,
    /// Reparse Markdown output and cascade the stylesheet over it in
    /// [`Tincture::render_markdown`].
    pub style_markdown: bool,
}

impl Default for TinctureOptions {
    fn default() -> Self {
        Self {
            markdown: MarkdownOptions::default(),
            style_markdown: true,
        }
    }
}

/// The rendering pipeline with its collaborators.
pub struct Tincture {
    logger: Box<dyn Logger>,
    codec: Box<dyn TextCodec>,
    options: TinctureOptions,
    themes: ThemeRegistry,
}

impl Default for Tincture {
    /// Warn-level terminal logging.
    fn default() -> Self {
        Self::new(Box::new(TerminalLogger::default()))
    }
}

impl Tincture {
    /// Create a pipeline logging to `logger`, with default options and an
    /// empty theme registry.
    #[must_use]
    pub fn new(logger: Box<dyn Logger>) -> Self {
        Self {
            logger,
            codec: Box::new(PlaceholderCodec),
            options: TinctureOptions::default(),
            themes: ThemeRegistry::new(),
        }
    }

    /// Replace the options.
    #[must_use]
    pub const fn with_options(mut self, options: TinctureOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the codec used to protect Markdown code content.
    #[must_use]
    pub fn with_codec(mut self, codec: Box<dyn TextCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// The logger every operation reports to.
    #[must_use]
    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    /// Current options.
    #[must_use]
    pub const fn options(&self) -> &TinctureOptions {
        &self.options
    }

    /// Registered themes.
    #[must_use]
    pub const fn themes(&self) -> &ThemeRegistry {
        &self.themes
    }

    /// Registered themes, for registration and removal.
    pub const fn themes_mut(&mut self) -> &mut ThemeRegistry {
        &mut self.themes
    }

    /// Parse and register a theme. Returns its rule count.
    pub fn register_theme(&mut self, name: impl Into<String>, css: &str) -> usize {
        self.themes.register(name, css, self.logger.as_ref())
    }

    /// Register every `*.css` file in `dir` as a theme.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError`] if the directory or a stylesheet cannot be read.
    pub fn load_themes(&mut self, dir: impl AsRef<std::path::Path>) -> Result<usize, ThemeError> {
        self.themes.load_dir(dir, self.logger.as_ref())
    }

    /// Parse a stylesheet into rules sorted by specificity.
    #[must_use]
    pub fn css_to_rules(&self, css: &str) -> Vec<CssRule> {
        tincture_css::css_to_rules(css, self.logger())
    }

    /// Parse an HTML fragment into a tree under the root container.
    #[must_use]
    pub fn html_to_ast(&self, html: &str) -> DomTree {
        tincture_html::html_to_ast(html, self.logger())
    }

    /// Compute styles for every node of `tree`.
    #[must_use]
    pub fn apply_cascade(&self, rules: &[CssRule], tree: DomTree) -> DomTree {
        tincture_css::apply_cascade(rules, tree, self.logger())
    }

    /// Serialize a tree to HTML.
    #[must_use]
    pub fn ast_to_html(&self, tree: &DomTree) -> String {
        tincture_html::ast_to_html(tree, self.logger())
    }

    /// Convert Markdown to unstyled HTML.
    #[must_use]
    pub fn markdown_to_html(&self, markdown: &str) -> String {
        MarkdownEngine::new(self.options.markdown, self.codec.as_ref(), self.logger())
            .render(markdown)
    }

    /// Style an HTML fragment with a stylesheet.
    #[must_use]
    pub fn render(&self, css: &str, html: &str) -> String {
        let rules = self.css_to_rules(css);
        self.render_rules(&rules, html)
    }

    /// Convert Markdown and, if [`TinctureOptions::style_markdown`] is set,
    /// style the result with `css`.
    #[must_use]
    pub fn render_markdown(&self, css: &str, markdown: &str) -> String {
        let html = self.markdown_to_html(markdown);
        if !self.options.style_markdown {
            return html;
        }
        self.render(css, &html)
    }

    /// Style an HTML fragment with a registered theme. An unknown theme is
    /// logged and the fragment is rendered unstyled.
    #[must_use]
    pub fn render_with_theme(&self, theme: &str, html: &str) -> String {
        let rules = self.themes.get(theme).unwrap_or_else(|| {
            self.logger
                .warn(LOG_TAG, &format!("unknown theme '{theme}'; rendering unstyled"));
            &[][..]
        });
        self.render_rules(rules, html)
    }

    fn render_rules(&self, rules: &[CssRule], html: &str) -> String {
        let tree = self.html_to_ast(html);
        let styled = self.apply_cascade(rules, tree);
        self.ast_to_html(&styled)
    }
}
