// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn config_error_display() {
    let err = Error::config(".trialrc.yaml", "invalid YAML");
    assert!(err.to_string().contains("invalid YAML"));
}

#[test]
fn plugin_error_display_is_bare_message() {
    let err = Error::Plugin("unknown reporter 'nyan'".into());
    assert_eq!(err.to_string(), "unknown reporter 'nyan'");
}

#[parameterized(
    config = { Error::Config { message: "x".into(), path: None }, ExitCode::ConfigError },
    argument = { Error::Argument("x".into()), ExitCode::ConfigError },
    plugin = { Error::Plugin("x".into()), ExitCode::ConfigError },
    module = { Error::Module { path: PathBuf::from("m.json"), message: "x".into() }, ExitCode::ConfigError },
    internal = { Error::Internal("x".into()), ExitCode::InternalError },
)]
fn exit_code_mapping(err: Error, expected: ExitCode) {
    assert_eq!(ExitCode::from(&err), expected);
}

#[parameterized(
    success = { ExitCode::Success, 0 },
    config = { ExitCode::ConfigError, 1 },
    few_failures = { ExitCode::Failures(3), 3 },
    capped_failures = { ExitCode::Failures(1000), 255 },
    interrupted = { ExitCode::Interrupted, 130 },
)]
fn numeric_exit_codes(code: ExitCode, expected: i32) {
    assert_eq!(code.code(), expected);
}

#[test]
fn zero_failures_is_success() {
    assert_eq!(ExitCode::from_failures(0), ExitCode::Success);
    assert_eq!(ExitCode::from_failures(2), ExitCode::Failures(2));
}
