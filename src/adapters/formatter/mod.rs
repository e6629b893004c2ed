//! Report document formatters.

pub mod markdown;

pub use markdown::MarkdownFormatter;
