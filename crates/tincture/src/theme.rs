//! Named, pre-parsed stylesheets.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tincture_common::log::Logger;
use tincture_css::{CssRule, css_to_rules};

const LOG_TAG: &str = "Theme";

/// Error loading themes from disk.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The directory could not be listed.
    #[error("failed to read theme directory '{path}': {source}")]
    ReadDir {
        /// Directory that was listed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A stylesheet could not be read.
    #[error("failed to read theme '{path}': {source}")]
    ReadFile {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Stylesheets parsed once and looked up by name.
///
/// Owned by the caller; nothing here is global.
#[derive(Debug, Default, Clone)]
pub struct ThemeRegistry {
    themes: BTreeMap<String, Vec<CssRule>>,
}

impl ThemeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `css` and store it as `name`, replacing any previous theme of
    /// that name. Returns the number of rules stored.
    pub fn register(&mut self, name: impl Into<String>, css: &str, logger: &dyn Logger) -> usize {
        let name = name.into();
        let rules = css_to_rules(css, logger);
        let count = rules.len();
        if self.themes.insert(name.clone(), rules).is_some() {
            logger.debug(LOG_TAG, &format!("replaced theme '{name}'"));
        }
        count
    }

    /// Rules of the theme called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[CssRule]> {
        self.themes.get(name).map(Vec::as_slice)
    }

    /// Registered theme names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    /// Number of registered themes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.themes.len()
    }

    /// Whether no theme is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    /// Drop one theme, returning its rules.
    pub fn remove(&mut self, name: &str) -> Option<Vec<CssRule>> {
        self.themes.remove(name)
    }

    /// Drop every theme.
    pub fn reset(&mut self) {
        self.themes.clear();
    }

    /// Register every `*.css` file in `dir` under its file stem.
    ///
    /// Files are loaded in name order. Returns how many themes were loaded.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError`] if the directory or one of its stylesheets
    /// cannot be read. Themes loaded before the failure stay registered.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>, logger: &dyn Logger) -> Result<usize, ThemeError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| ThemeError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "css"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                logger.warn(
                    LOG_TAG,
                    &format!("skipping '{}': file name is not UTF-8", path.display()),
                );
                continue;
            };
            let css = fs::read_to_string(&path).map_err(|source| ThemeError::ReadFile {
                path: path.clone(),
                source,
            })?;
            let count = self.register(stem, &css, logger);
            logger.info(LOG_TAG, &format!("loaded theme '{stem}' ({count} rules)"));
            loaded += 1;
        }
        Ok(loaded)
    }
}
