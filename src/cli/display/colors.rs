//! Status and score styling. `console` honours `NO_COLOR` and non-tty output.

use console::{style, StyledObject};

/// Green for success, red for failure, yellow while running.
pub fn colorize_status(status: &str) -> StyledObject<&str> {
    match status.to_lowercase().as_str() {
        "success" | "completed" => style(status).green().bold(),
        "running" | "created" => style(status).yellow(),
        "failed" => style(status).red().bold(),
        _ => style(status),
    }
}

/// 8 and above green, below 6 red.
pub fn colorize_score(score: f64) -> StyledObject<String> {
    let text = format!("{score:.1}");
    if score >= 8.0 {
        style(text).green()
    } else if score >= 6.0 {
        style(text).yellow()
    } else {
        style(text).red()
    }
}
