// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line parsing.
//!
//! The clap command is generated from the option schema with the builder
//! API, so the same parser handles process arguments and opts-file tokens.
//! Parsed values are left raw (strings and flags) and collected into a
//! [`ConfigSource`]; typing happens when the source is normalized.

use std::ffi::OsString;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::help;
use crate::options::schema::{OptionKind, OptionSpec, SCHEMA};
use crate::options::{ConfigSource, SourceRank};

/// Build the clap command.
///
/// Hidden options are only shown in help when `show_hidden` is set.
pub fn command(show_hidden: bool) -> Command {
    let mut cmd = Command::new("trial")
        .about("Run tests")
        .version(env!("CARGO_PKG_VERSION"))
        .override_usage("trial [spec..]")
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .styles(help::styles());

    for spec in SCHEMA {
        cmd = cmd.arg(option_arg(spec, show_hidden));
        if let Some(negation) = spec.negation {
            cmd = cmd.arg(
                Arg::new(negation)
                    .long(negation)
                    .action(ArgAction::Count)
                    .hide(true)
                    .conflicts_with(spec.name),
            );
        }
    }
    cmd
}

fn option_arg(spec: &'static OptionSpec, show_hidden: bool) -> Arg {
    let mut arg = Arg::new(spec.name)
        .help(spec.help)
        .help_heading(spec.group.heading())
        .hide(spec.hidden && !show_hidden);

    if spec.positional {
        return arg
            .value_name(spec.name)
            .num_args(0..)
            .action(ArgAction::Append);
    }

    arg = arg.long(spec.name);
    if let Some(short) = spec.short {
        arg = arg.short(short);
    }
    if !spec.aliases.is_empty() {
        arg = arg.visible_aliases(spec.aliases.iter().copied());
    }
    if !spec.conflicts.is_empty() {
        arg = arg.conflicts_with_all(spec.conflicts.iter().copied());
    }

    // Repeats are collected, not rejected, so the arity check can name
    // the option the way config files report it.
    match spec.kind {
        OptionKind::Boolean => arg.action(ArgAction::Count),
        _ => arg
            .value_name(spec.name)
            .num_args(1)
            .action(ArgAction::Append),
    }
}

/// Parse process arguments (without the binary name).
pub fn parse_args<I, T>(args: I) -> Result<ConfigSource>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    parse_tokens(args, SourceRank::Cli, "command line")
}

/// Parse a token stream into a raw source of the given rank.
pub fn parse_tokens<I, T>(tokens: I, rank: SourceRank, origin: &str) -> Result<ConfigSource>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command(false)
        .try_get_matches_from(tokens)
        .map_err(|e| Error::Argument(e.render().to_string().trim_end().to_string()))?;

    let mut payload = Map::new();
    for spec in SCHEMA {
        if let Some(negation) = spec.negation
            && given(&matches, negation)
        {
            payload.insert(spec.name.to_string(), Value::Bool(false));
            continue;
        }
        if !given(&matches, spec.name) {
            continue;
        }
        let value = match spec.kind {
            OptionKind::Boolean => Value::Bool(true),
            _ => Value::Array(
                matches
                    .get_many::<String>(spec.name)
                    .into_iter()
                    .flatten()
                    .map(|v| Value::String(v.clone()))
                    .collect(),
            ),
        };
        payload.insert(spec.name.to_string(), value);
    }

    tracing::trace!(origin, keys = payload.len(), "parsed arguments");
    Ok(ConfigSource::new(rank, origin, payload))
}

fn given(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
