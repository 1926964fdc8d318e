//! Tincture CLI
//!
//! Runs the CSS, HTML and Markdown pipeline over files or standard input.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tincture::{Tincture, TinctureOptions};
use tincture_common::log::{Severity, TerminalLogger};
use tincture_dom::print_tree;
use tincture_markdown::MarkdownOptions;

/// Tincture: CSS + HTML + Markdown to styled HTML
#[derive(Parser, Debug)]
#[command(name = "tincture")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Show the rules of a stylesheet, sorted by specificity
    tincture css site.css

    # Print the tree of an HTML fragment as JSON
    tincture html page.html --json

    # Style a fragment
    tincture render page.html --css site.css

    # Style a fragment with a theme from a directory of stylesheets
    tincture render page.html --theme-dir themes --theme dark

    # Convert Markdown from standard input
    cat notes.md | tincture markdown -
"#)]
struct Cli {
    /// Minimum severity printed to stderr (debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", value_name = "LEVEL")]
    log_level: Severity,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a stylesheet and print its rules
    Css {
        /// Stylesheet path, or `-` for standard input
        file: PathBuf,

        /// Print the rules as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse an HTML fragment and print its tree
    Html {
        /// Fragment path, or `-` for standard input
        file: PathBuf,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Style an HTML fragment and print the result
    Render {
        /// Fragment path, or `-` for standard input
        file: PathBuf,

        /// Stylesheet to cascade
        #[arg(long, value_name = "FILE")]
        css: Option<PathBuf>,

        /// Directory of `*.css` themes
        #[arg(long, value_name = "DIR")]
        theme_dir: Option<PathBuf>,

        /// Theme to cascade, by file stem
        #[arg(long, value_name = "NAME", requires = "theme_dir", conflicts_with = "css")]
        theme: Option<String>,
    },

    /// Convert Markdown to HTML
    Markdown {
        /// Markdown path, or `-` for standard input
        file: PathBuf,

        /// Stylesheet to cascade over the output
        #[arg(long, value_name = "FILE")]
        css: Option<PathBuf>,

        /// Spaces per list nesting level
        #[arg(long, default_value = "3")]
        list_indent: usize,

        /// Do not treat a line after a table as its footer
        #[arg(long)]
        no_table_footer: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut tincture = Tincture::new(Box::new(TerminalLogger::new(cli.log_level)));

    match cli.command {
        Command::Css { file, json } => {
            let rules = tincture.css_to_rules(&read_input(&file)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&rules)?);
            } else {
                print_header(&format!("Rules ({})", rules.len()));
                for rule in &rules {
                    println!(
                        "{} {} {{ {} }}",
                        format!("[{:>3}]", rule.specificity).dimmed(),
                        rule.selector.bold(),
                        rule.declarations.to_css_text()
                    );
                }
            }
        }
        Command::Html { file, json } => {
            let tree = tincture.html_to_ast(&read_input(&file)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&tree.view(tree.root()))?);
            } else {
                print_header("DOM Tree");
                print_tree(&tree, tree.root(), 0);
            }
        }
        Command::Render {
            file,
            css,
            theme_dir,
            theme,
        } => {
            let html = read_input(&file)?;
            if let Some(dir) = theme_dir {
                let loaded = tincture.load_themes(&dir)?;
                if loaded == 0 {
                    eprintln!("{} no themes found in {}", "⚠".yellow(), dir.display());
                }
            }
            let output = match (theme, css) {
                (Some(theme), _) => tincture.render_with_theme(&theme, &html),
                (None, Some(css)) => tincture.render(&read_input(&css)?, &html),
                (None, None) => tincture.render("", &html),
            };
            println!("{output}");
        }
        Command::Markdown {
            file,
            css,
            list_indent,
            no_table_footer,
        } => {
            let tincture = tincture.with_options(TinctureOptions {
                markdown: MarkdownOptions {
                    table_footer: !no_table_footer,
                    list_indent,
                },
                style_markdown: css.is_some(),
            });
            let markdown = read_input(&file)?;
            let output = match css {
                Some(css) => tincture.render_markdown(&read_input(&css)?, &markdown),
                None => tincture.markdown_to_html(&markdown),
            };
            println!("{output}");
        }
    }

    Ok(())
}

/// Read a file, or standard input for `-`.
fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        let _ = io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read standard input")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn print_header(title: &str) {
    println!("{}", format!("=== {title} ===").cyan().bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_render_with_theme() {
        let cli = Cli::try_parse_from([
            "tincture",
            "render",
            "page.html",
            "--theme-dir",
            "themes",
            "--theme",
            "dark",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Severity::Debug);
        assert!(matches!(cli.command, Command::Render { theme: Some(ref t), .. } if t == "dark"));
    }

    #[test]
    fn test_theme_requires_theme_dir() {
        assert!(Cli::try_parse_from(["tincture", "render", "a.html", "--theme", "dark"]).is_err());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        assert!(Cli::try_parse_from(["tincture", "css", "a.css", "--log-level", "loud"]).is_err());
    }
}
