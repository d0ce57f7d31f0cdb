// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Color detection and terminal styling.
//!
//! Detection order:
//! 1. `--no-colors` / `--colors` options
//! 2. `NO_COLOR` env var → no color
//! 3. `COLOR` env var → color
//! 4. stdout is a TTY → color, else none
//!
//! Help text uses raw ANSI 256-color codes; reporters use termcolor specs
//! from [`scheme`].

use std::io::IsTerminal;
use std::sync::OnceLock;

use termcolor::ColorChoice;

use crate::options::Options;

/// ANSI 256-color codes for help text.
pub mod codes {
    /// Section headers: steel blue
    pub const HEADER: u8 = 74;
    /// Flags: light grey
    pub const LITERAL: u8 = 250;
    /// Placeholders: medium grey
    pub const CONTEXT: u8 = 245;
}

/// Whether help text is colorized. Cached once per process.
pub fn should_colorize() -> bool {
    static SHOULD_COLORIZE: OnceLock<bool> = OnceLock::new();
    *SHOULD_COLORIZE.get_or_init(|| resolve_color(None) != ColorChoice::Never)
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

pub fn header(text: &str) -> String {
    paint(codes::HEADER, text)
}

pub fn literal(text: &str) -> String {
    paint(codes::LITERAL, text)
}

pub fn context(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

/// Resolve the reporter color choice.
///
/// Explicit `colors` / `no-colors` options win over the environment.
/// `NO_COLOR` set to any value (including empty) disables color.
pub fn resolve_color(options: Option<&Options>) -> ColorChoice {
    if let Some(options) = options {
        if options.flag("no-colors") {
            return ColorChoice::Never;
        }
        if options.flag("colors") {
            return ColorChoice::Always;
        }
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    if std::env::var_os("COLOR").is_some() {
        return ColorChoice::Always;
    }
    if !std::io::stdout().is_terminal() {
        return ColorChoice::Never;
    }
    ColorChoice::Auto
}

/// Reporter color scheme.
pub mod scheme {
    use termcolor::{Color, ColorSpec};

    /// Bold suite or summary title.
    pub fn title() -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_bold(true);
        spec
    }

    /// Green passing mark.
    pub fn pass() -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Green));
        spec
    }

    /// Red failing mark.
    pub fn fail() -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Red)).set_bold(true);
        spec
    }

    /// Cyan skipped (filtered out) file.
    pub fn pending() -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Cyan));
        spec
    }

    /// Yellow duration of a slow file.
    pub fn slow() -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Yellow));
        spec
    }

    /// Dimmed captured output.
    pub fn output() -> ColorSpec {
        let mut spec = ColorSpec::new();
        spec.set_dimmed(true);
        spec
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;
