//! End-to-end tests through the `Tincture` facade.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tincture::{ThemeError, Tincture, TinctureOptions};
use tincture_common::log::{MemoryLogger, Severity};

fn pipeline() -> (Tincture, Arc<MemoryLogger>) {
    let logger = Arc::new(MemoryLogger::new());
    (Tincture::new(Box::new(Arc::clone(&logger))), logger)
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tincture-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_render_styles_fragment() {
    let (tincture, _) = pipeline();
    let html = tincture.render(
        ".note { color: gray; } #main { padding: 4px; }",
        "<section id=\"main\"><p class=\"note\">hi</p></section>",
    );
    assert_eq!(
        html,
        "<div id=\"rootContainer\"><section style=\"padding: 4px;\" id=\"main\">\
         <p style=\"color: gray;\" class=\"note\">hi</p></section></div>"
    );
}

#[test]
fn test_render_recovers_from_broken_html() {
    let (tincture, logger) = pipeline();
    let html = tincture.render("p { color: red; }", "<div><span>text");
    assert_eq!(html, "<div id=\"rootContainer\"><h1>Malformed HTML</h1></div>");
    assert!(logger.has(Severity::Error, "HTML"));
}

#[test]
fn test_render_markdown_styled() {
    let (tincture, _) = pipeline();
    let html = tincture.render_markdown(".list-dash li { color: red; }", "- a");
    assert_eq!(
        html,
        "<div id=\"rootContainer\"><ul class=\"list-dash\"><li style=\"color: red;\">a</li></ul></div>"
    );
}

#[test]
fn test_render_markdown_unstyled_when_disabled() {
    let (tincture, _) = pipeline();
    let tincture = tincture.with_options(TinctureOptions {
        style_markdown: false,
        ..TinctureOptions::default()
    });
    assert_eq!(tincture.render_markdown("p { color: red; }", "plain"), "<p>plain</p>");
}

#[test]
fn test_markdown_options_flow_through() {
    let (tincture, logger) = pipeline();
    let mut options = TinctureOptions::default();
    options.markdown.table_footer = false;
    let tincture = tincture.with_options(options);

    let html = tincture.markdown_to_html("| a |\n|---|\nafter");
    assert!(!html.contains("<tfoot>"));
    assert!(!logger.has(Severity::Info, "Markdown"));
}

#[test]
fn test_render_with_registered_theme() {
    let (mut tincture, _) = pipeline();
    assert_eq!(tincture.register_theme("plain", "em { font-style: normal; }"), 1);
    assert_eq!(
        tincture.render_with_theme("plain", "<em>x</em>"),
        "<div id=\"rootContainer\"><em style=\"font-style: normal;\">x</em></div>"
    );
}

#[test]
fn test_unknown_theme_renders_unstyled() {
    let (tincture, logger) = pipeline();
    assert_eq!(
        tincture.render_with_theme("missing", "<em>x</em>"),
        "<div id=\"rootContainer\"><em>x</em></div>"
    );
    assert!(logger.has(Severity::Warn, "Tincture"));
}

#[test]
fn test_load_theme_directory() {
    let dir = scratch_dir("themes");
    fs::write(dir.join("dark.css"), "body { background: black; }").unwrap();
    fs::write(dir.join("light.css"), "body { background: white; }").unwrap();
    fs::write(dir.join("notes.txt"), "not a theme").unwrap();

    let (mut tincture, logger) = pipeline();
    assert_eq!(tincture.load_themes(&dir).unwrap(), 2);
    assert_eq!(
        tincture.themes().names().collect::<Vec<_>>(),
        vec!["dark", "light"]
    );
    assert!(logger.has(Severity::Info, "Theme"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_missing_directory_fails() {
    let (mut tincture, logger) = pipeline();
    let missing = std::env::temp_dir().join("tincture-no-such-theme-dir");
    let err = tincture
        .themes_mut()
        .load_dir(&missing, &*logger)
        .unwrap_err();
    assert!(matches!(err, ThemeError::ReadDir { .. }));
}
