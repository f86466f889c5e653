//! Terminal color handling.
//!
//! Implements the NO_COLOR standard (https://no-color.org/) and the
//! traditional CLICOLOR conventions on top of TTY detection:
//! - `NO_COLOR`: set to any value, colors are off
//! - `CLICOLOR_FORCE`: set to non-zero, colors are on even when piped
//! - `CLICOLOR`: set to 0, colors are off
//! - otherwise colors follow whether stdout is a terminal

use std::io::IsTerminal;

use colored::control;

/// Decide color support from the environment and apply it globally.
/// Call once, early in main().
pub fn init_colors() {
    control::set_override(colors_enabled());
}

fn colors_enabled() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var("CLICOLOR_FORCE")
        .map(|v| v != "0")
        .unwrap_or(false)
    {
        return true;
    }

    if std::env::var("CLICOLOR").map(|v| v == "0").unwrap_or(false) {
        return false;
    }

    std::io::stdout().is_terminal()
}
