// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text rendering.
//!
//! Negation flags are hidden from clap's listing and folded into their
//! option's line as `--[no-]name`. Colors are applied after rendering,
//! since clap's own styling is lost when help is captured to a string.

use std::sync::LazyLock;

use clap::builder::styling::Styles;
use regex::Regex;

use crate::cli;
use crate::color;
use crate::options::SCHEMA;

/// Plain styles; colors are applied by [`format_help`].
pub fn styles() -> Styles {
    Styles::plain()
}

/// Render the full help text.
pub fn format_help(show_hidden: bool) -> String {
    let raw = cli::command(show_hidden).render_help().to_string();
    colorize_help(&fold_negations(&raw))
}

/// Rewrite `--name` option lines as `--[no-]name` for negatable options.
fn fold_negations(help: &str) -> String {
    const MARK: &str = "[no-]";

    let negatable: Vec<&str> = SCHEMA
        .iter()
        .filter(|spec| spec.negation.is_some())
        .map(|spec| spec.name)
        .collect();

    help.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let indent = &line[..line.len() - trimmed.len()];
            let Some(name) = negatable.iter().find(|name| {
                trimmed
                    .strip_prefix("--")
                    .and_then(|rest| rest.strip_prefix(**name))
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
            }) else {
                return line.to_string();
            };

            let rest = &trimmed[2 + name.len()..];
            // Keep descriptions aligned by giving back padding where there is room.
            let (flag_tail, description) = match rest.find("  ") {
                Some(pos) => rest.split_at(pos),
                None => (rest, ""),
            };
            let padding = description.len() - description.trim_start().len();
            let description = if padding > MARK.len() + 1 {
                &description[MARK.len()..]
            } else {
                description
            };
            format!("{indent}--{MARK}{name}{flag_tail}{description}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn colorize_help(help: &str) -> String {
    if !color::should_colorize() {
        return help.to_string();
    }

    help.lines()
        .map(|line| {
            if let Some(rest) = line.strip_prefix("Usage:") {
                return format!("{}{}", color::header("Usage:"), rest);
            }
            if !line.starts_with(' ') && line.ends_with(':') {
                return color::header(line);
            }
            colorize_option_line(line).unwrap_or_else(|| line.to_string())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Colorize a line like `  -R, --reporter <reporter>  Specify reporter`.
fn colorize_option_line(line: &str) -> Option<String> {
    #[allow(clippy::expect_used)]
    static OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^(\s+)(-\w, )?(--(?:\[no-\])?[\w-]+)( <[^>]+>)?(.*)$").expect("valid regex")
    });

    let caps = OPTION_RE.captures(line)?;
    let group = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("");

    let short = match group(2) {
        "" => String::new(),
        s => format!("{}, ", color::literal(s.trim_end_matches(", "))),
    };
    let long = match group(3).strip_prefix("--[no-]") {
        Some(name) => format!("--{}{}", color::context("[no-]"), color::literal(name)),
        None => color::literal(group(3)),
    };
    let value = match group(4) {
        "" => String::new(),
        v => format!(" {}", color::context(v.trim_start())),
    };

    Some(format!("{}{short}{long}{value}{}", group(1), group(5)))
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
