// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed option schema.
//!
//! Every recognized option appears exactly once, under its canonical name.
//! The CLI parser, the config-file normalizer and the defaults layer are all
//! generated from this table.

/// Value type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Flag without a value.
    Boolean,
    /// Numeric value (milliseconds, counts).
    Number,
    /// Single string value.
    String,
    /// File path, or `false` to disable the source it names.
    Path,
    /// Comma-splittable, repeatable list of strings.
    List,
}

/// Built-in default for an option.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Number(f64),
    Str(&'static str),
    List(&'static [&'static str]),
}

/// Help heading for an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Config,
    Files,
    Filters,
    Output,
    Rules,
    Other,
}

impl Group {
    pub fn heading(self) -> &'static str {
        match self {
            Group::Config => "Config Files",
            Group::Files => "File Handling",
            Group::Filters => "Test Filters",
            Group::Output => "Reporting & Output",
            Group::Rules => "Rules & Behavior",
            Group::Other => "Other Options",
        }
    }
}

/// Declaration of one canonical option.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub name: &'static str,
    pub short: Option<char>,
    pub aliases: &'static [&'static str],
    pub kind: OptionKind,
    pub default: Option<DefaultValue>,
    pub help: &'static str,
    pub group: Group,
    /// Presence ends configuration resolution (help, version, listings).
    pub terminal: bool,
    /// Long flag that sets this option to `false` (e.g. `--no-config`).
    pub negation: Option<&'static str>,
    /// Options that may not be given together with this one on the command line.
    pub conflicts: &'static [&'static str],
    /// Names a reporter or interface resolved by the plugin resolver.
    pub plugin: bool,
    /// Only shown by `--show-hidden-help`.
    pub hidden: bool,
    /// Collected from positional arguments instead of a long flag.
    pub positional: bool,
}

impl OptionSpec {
    const fn new(name: &'static str, kind: OptionKind, help: &'static str, group: Group) -> Self {
        Self {
            name,
            short: None,
            aliases: &[],
            kind,
            default: None,
            help,
            group,
            terminal: false,
            negation: None,
            conflicts: &[],
            plugin: false,
            hidden: false,
            positional: false,
        }
    }

    const fn boolean(name: &'static str, help: &'static str, group: Group) -> Self {
        Self::new(name, OptionKind::Boolean, help, group)
    }

    const fn short(mut self, c: char) -> Self {
        self.short = Some(c);
        self
    }

    const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    const fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    const fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    const fn negation(mut self, flag: &'static str) -> Self {
        self.negation = Some(flag);
        self
    }

    const fn conflicts(mut self, names: &'static [&'static str]) -> Self {
        self.conflicts = names;
        self
    }

    const fn plugin(mut self) -> Self {
        self.plugin = true;
        self
    }

    const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    const fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    /// List options combine across layers; the positional `spec` overrides.
    pub fn combines(&self) -> bool {
        self.kind == OptionKind::List && !self.positional
    }

    /// Whether `key` names this option (canonical name, alias, or short letter).
    pub fn matches(&self, key: &str) -> bool {
        if self.name == key || self.aliases.contains(&key) {
            return true;
        }
        let mut chars = key.chars();
        match (self.short, chars.next(), chars.next()) {
            (Some(short), Some(c), None) => short == c,
            _ => false,
        }
    }
}

use DefaultValue as D;
use Group as G;
use OptionKind as K;

/// Default location of the legacy options file.
pub const DEFAULT_OPTS_PATH: &str = "./test/trial.opts";

/// Every recognized option.
pub const SCHEMA: &[OptionSpec] = &[
    OptionSpec::boolean("allow-uncaught", "Allow uncaught errors to propagate", G::Rules)
        .hidden(),
    OptionSpec::boolean(
        "async-only",
        "Require all tests to use a callback (async) or return a Promise",
        G::Rules,
    )
    .short('A'),
    OptionSpec::boolean("bail", "Abort (\"bail\") after first test failure", G::Rules).short('b'),
    OptionSpec::boolean("check-leaks", "Check for global variable leaks", G::Rules).hidden(),
    OptionSpec::boolean("colors", "Force-enable color output", G::Output)
        .short('c')
        .conflicts(&["no-colors"]),
    OptionSpec::boolean("no-colors", "Disable color output", G::Output)
        .short('C')
        .conflicts(&["colors"]),
    OptionSpec::new("config", K::Path, "Load config from file", G::Config).negation("no-config"),
    OptionSpec::boolean("delay", "Delay initial execution of root suite", G::Rules),
    OptionSpec::boolean("diff", "Show diff on failure", G::Output)
        .default(D::Bool(true))
        .negation("no-diff"),
    OptionSpec::new("exclude", K::List, "Ignore file(s) or glob pattern(s)", G::Files)
        .default(D::List(&[])),
    OptionSpec::boolean("exit", "Force the runner to quit after tests complete", G::Rules),
    OptionSpec::new("extension", K::List, "File extension(s) to load and/or watch", G::Files)
        .default(D::List(&["sh"])),
    OptionSpec::new("fgrep", K::String, "Only run tests containing this string", G::Filters)
        .short('f'),
    OptionSpec::new(
        "file",
        K::List,
        "Specify file(s) to be loaded prior to root suite execution",
        G::Files,
    )
    .default(D::List(&[])),
    OptionSpec::boolean("forbid-only", "Fail if exclusive test(s) encountered", G::Rules),
    OptionSpec::boolean("forbid-pending", "Fail if pending test(s) encountered", G::Rules),
    OptionSpec::boolean("full-trace", "Display full stack traces", G::Output).hidden(),
    OptionSpec::new(
        "globals",
        K::List,
        "Comma-separated list of allowed global variables",
        G::Rules,
    )
    .hidden(),
    OptionSpec::new(
        "grep",
        K::String,
        "Only run tests matching this string or regexp",
        G::Filters,
    )
    .short('g'),
    OptionSpec::boolean("help", "Show usage information & exit", G::Other)
        .short('h')
        .terminal(),
    OptionSpec::boolean(
        "inline-diffs",
        "Display actual/expected differences inline within each string",
        G::Output,
    ),
    OptionSpec::boolean("invert", "Inverts --grep and --fgrep matches", G::Filters).short('i'),
    OptionSpec::boolean("list-interfaces", "List built-in user interfaces & exit", G::Other)
        .aliases(&["interfaces"])
        .terminal(),
    OptionSpec::boolean("list-reporters", "List built-in reporters & exit", G::Other)
        .aliases(&["reporters"])
        .terminal(),
    OptionSpec::boolean("no-timeouts", "Disable timeouts", G::Rules).conflicts(&["timeout"]),
    OptionSpec::new("opts", K::Path, "Path to legacy options file", G::Config)
        .default(D::Str(DEFAULT_OPTS_PATH))
        .negation("no-opts"),
    OptionSpec::new(
        "package",
        K::Path,
        "Path to package.json holding a \"trial\" config field",
        G::Config,
    )
    .negation("no-package"),
    OptionSpec::boolean("recursive", "Look for tests in subdirectories", G::Files),
    OptionSpec::new("reporter", K::String, "Specify reporter to use", G::Output)
        .short('R')
        .default(D::Str("spec"))
        .plugin(),
    OptionSpec::new(
        "reporter-options",
        K::List,
        "Reporter-specific options (<k=v,[k1=v1,..]>)",
        G::Output,
    )
    .short('O'),
    OptionSpec::new("require", K::List, "Require module", G::Files)
        .short('r')
        .default(D::List(&[])),
    OptionSpec::new("retries", K::Number, "Retry failed tests this many times", G::Rules)
        .default(D::Number(0.0)),
    OptionSpec::boolean(
        "show-hidden-help",
        "Show help, including all hidden options",
        G::Other,
    )
    .aliases(&["show-all-options"])
    .terminal(),
    OptionSpec::new(
        "slow",
        K::Number,
        "Specify \"slow\" test threshold (in milliseconds)",
        G::Rules,
    )
    .short('s')
    .default(D::Number(75.0)),
    OptionSpec::boolean("sort", "Sort test files", G::Files).short('S'),
    OptionSpec::new(
        "spec",
        K::List,
        "One or more files, directories, or globs to test",
        G::Files,
    )
    .default(D::List(&["test/"]))
    .positional(),
    OptionSpec::new(
        "timeout",
        K::Number,
        "Specify test timeout threshold (in milliseconds)",
        G::Rules,
    )
    .short('t')
    .aliases(&["timeouts"])
    .default(D::Number(2000.0))
    .conflicts(&["no-timeouts"]),
    OptionSpec::new("ui", K::String, "Specify user interface", G::Rules)
        .short('u')
        .default(D::Str("bdd"))
        .plugin(),
    OptionSpec::boolean("version", "Show version number & exit", G::Other)
        .short('V')
        .terminal(),
    OptionSpec::boolean(
        "watch",
        "Watch files in the current working directory for changes",
        G::Files,
    )
    .short('w'),
    OptionSpec::new(
        "watch-extensions",
        K::List,
        "List of extensions to monitor with \"--watch\"",
        G::Files,
    )
    .default(D::List(&["sh"])),
];

/// Find the option a key refers to, by canonical name, alias, or short letter.
pub fn lookup(key: &str) -> Option<&'static OptionSpec> {
    SCHEMA.iter().find(|spec| spec.matches(key))
}

/// Names of the terminal flags.
pub fn terminal_flags() -> impl Iterator<Item = &'static str> {
    SCHEMA.iter().filter(|spec| spec.terminal).map(|spec| spec.name)
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
