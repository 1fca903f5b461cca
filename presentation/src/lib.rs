//! Presentation layer for table-council
//!
//! CLI argument parsing, console formatting of transcripts and
//! recommendations, and the live feed printer.

pub mod cli;
pub mod feed;
pub mod formatter;

pub use cli::{Cli, OutputFormat, parse_diner};
pub use feed::LiveFeedPrinter;
pub use formatter::ConsoleFormatter;
