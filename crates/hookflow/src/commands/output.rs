//! Terminal output helpers.

use std::time::Duration;

use anyhow::Result;
use console::{Style, style};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use hookflow_client::ExecutionStatus;
use hookflow_console::{Tone, status_style};

/// Style for a presentation tone.
pub fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Success => Style::new().green(),
        Tone::Error => Style::new().red(),
        Tone::Warning => Style::new().yellow(),
        Tone::Info => Style::new().cyan(),
        Tone::Primary => Style::new().blue(),
        Tone::Neutral => Style::new().dim(),
    }
}

/// Coloured status badge such as `✓ completed`.
pub fn status_badge(status: ExecutionStatus) -> String {
    let badge = status_style(status);
    tone_style(badge.tone)
        .apply_to(format!("{} {}", badge.glyph, status))
        .to_string()
}

/// Bold heading with a rule underneath.
pub fn heading(title: &str) {
    println!("{}", style(title).bold());
    println!("{}", Style::new().dim().apply_to("─".repeat(50)));
}

pub fn dim(text: impl std::fmt::Display) {
    println!("{}", Style::new().dim().apply_to(text));
}

pub fn success(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green(), message);
}

/// Error banner on stderr.
pub fn banner(message: impl std::fmt::Display) {
    eprintln!("{} {}", Style::new().red().apply_to("Error:"), message);
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Spinner shown while waiting on the server. Hidden in JSON mode.
pub fn spinner(message: &str, json_output: bool) -> ProgressBar {
    if json_output {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        bar.set_style(spinner_style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Truncate to `max` characters with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer description", 10), "a much ...");
    }

    #[test]
    fn test_status_badge_contains_name() {
        assert!(status_badge(ExecutionStatus::Timeout).contains("timeout"));
    }
}
