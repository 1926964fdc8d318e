//! Common utilities for the Tincture pipeline.
//!
//! This crate provides shared infrastructure used by all pipeline components:
//! - **Logging** - severity-tagged records routed through a swappable [`log::Logger`]
//! - **Text Codec** - reversible placeholder encoding that protects code content
//!   from inline Markdown and attribute syntax

pub mod codec;
pub mod log;

pub use codec::{PlaceholderCodec, TextCodec};
pub use log::{LogRecord, Logger, MemoryLogger, NullLogger, Severity, TerminalLogger};
