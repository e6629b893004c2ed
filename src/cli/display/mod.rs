//! Human-readable rendering helpers shared by commands.

pub mod colors;
pub mod table;

pub use colors::{colorize_score, colorize_status};
pub use table::{history_table, issues_table};
