//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use console::{style, StyledObject};

use crate::core::{ReviewStatus, MISSING};

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Wrap text to fit within a maximum width, breaking at word boundaries
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    // Don't wrap if text already fits or width is too small to be useful
    if text.chars().count() <= max_width || max_width < 5 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        let fits = current_line.chars().count() + 1 + word.chars().count() <= max_width;
        if !current_line.is_empty() && fits {
            current_line.push(' ');
            current_line.push_str(word);
            continue;
        }
        if !current_line.is_empty() {
            lines.push(std::mem::take(&mut current_line));
        }

        // Force-break words longer than the line
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > max_width {
            lines.push(chars.drain(..max_width).collect());
        }
        current_line = chars.into_iter().collect();
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Whether a disagreement flag value reads as raised
///
/// QC exports use a mix of spellings; anything that is not clearly false
/// or missing counts as raised.
pub fn is_flag_raised(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "" | "n/a" | "0" | "0.0" | "no" | "n" | "false" | "none" | "-"
    )
}

/// Colour a review status for terminal output
pub fn style_status(status: &ReviewStatus) -> StyledObject<String> {
    let s = status.to_string();
    match status {
        ReviewStatus::Pending => style(s).yellow(),
        ReviewStatus::Completed => style(s).green(),
        ReviewStatus::Other(_) => style(s).dim(),
    }
}

/// Colour a field value for terminal output
pub fn style_value(value: &str, is_flag: bool) -> StyledObject<String> {
    if value == MISSING {
        style(value.to_string()).dim()
    } else if is_flag && is_flag_raised(value) {
        style(value.to_string()).red().bold()
    } else {
        style(value.to_string())
    }
}
