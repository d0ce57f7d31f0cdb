//! Behavioral specifications for the trial CLI.
//!
//! These tests are black-box: they invoke the CLI binary inside a
//! temporary project and verify stdout, stderr, and exit codes.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

use prelude::*;

// =============================================================================
// TERMINAL FLAGS
// =============================================================================

/// > --version prints the package version and exits 0
#[test]
fn version_prints_package_version() {
    trial_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(format!("{}\n", env!("CARGO_PKG_VERSION")));
}

/// > Terminal flags win over option values that would not parse
#[test]
fn version_ignores_invalid_values() {
    Project::empty()
        .run(&["--version", "--timeout", "abc", "--grep", "a", "--grep", "b"])
        .code(0)
        .stdout_eq(&format!("{}\n", env!("CARGO_PKG_VERSION")));
}

/// > --help prints usage and skips config files
#[test]
fn help_ignores_broken_rc_file() {
    let temp = Project::empty();
    temp.file(".trialrc.json", "{ not json");

    temp.run(&["--help"])
        .code(0)
        .stdout_has("Usage:");
}

/// > --list-reporters prints every known reporter name
#[test]
fn list_reporters_prints_names() {
    Project::empty()
        .run(&["--list-reporters"])
        .code(0)
        .stdout_eq("\n    dot\n    json\n    spec\n    tap\n\n");
}

#[test]
fn list_interfaces_prints_names() {
    Project::empty()
        .run(&["--list-interfaces"])
        .code(0)
        .stdout_eq("\n    bdd\n    exports\n    qunit\n    tdd\n\n");
}

// =============================================================================
// ARGUMENT ERRORS
// =============================================================================

#[test]
fn unknown_flag_exits_1() {
    Project::empty()
        .run(&["--no-such-flag"])
        .code(1)
        .stderr_has("--no-such-flag");
}

/// > An explicitly named config file that is missing is fatal
#[test]
fn missing_explicit_config_exits_1() {
    Project::with_tests(&[("a.sh", PASS)])
        .run(&["--config", "nope.json"])
        .code(1)
        .stderr_has("nope.json");
}

/// > An explicitly named opts file that is missing is fatal
#[test]
fn missing_explicit_opts_exits_1() {
    Project::with_tests(&[("a.sh", PASS)])
        .run(&["--opts", "nope.opts"])
        .code(1)
        .stderr_has("nope.opts");
}

#[test]
fn two_reporters_is_an_arity_error() {
    Project::with_tests(&[("a.sh", PASS)])
        .run(&["-R", "dot", "-R", "tap"])
        .code(1)
        .stderr_has("\"--reporter <reporter>\" can only be specified once");
}

#[test]
fn unknown_reporter_exits_1() {
    Project::with_tests(&[("a.sh", PASS)])
        .run(&["--reporter", "fancy"])
        .code(1)
        .stderr_has("unknown reporter 'fancy'");
}

#[test]
fn invert_without_grep_exits_1() {
    Project::with_tests(&[("a.sh", PASS)])
        .run(&["--invert"])
        .code(1)
        .stderr_has("\"--invert\" requires one of");
}

#[test]
fn no_test_files_exits_1() {
    Project::empty()
        .run(&[])
        .code(1)
        .stderr_has("No test files found: \"test/\"");
}

// =============================================================================
// RUNNING TESTS
// =============================================================================

#[test]
fn passing_run_exits_0() {
    Project::with_tests(&[("a.sh", PASS), ("b.sh", PASS)])
        .run(&[])
        .code(0)
        .stdout_has("✓ test/a.sh")
        .stdout_has("2 passing");
}

/// > The exit code is the number of failed files
#[test]
fn exit_code_is_failure_count() {
    Project::with_tests(&[("a.sh", FAIL), ("b.sh", PASS), ("c.sh", FAIL)])
        .run(&[])
        .code(2)
        .stdout_has("1 passing")
        .stdout_has("2 failing")
        .stdout_has("boom");
}

#[test]
fn bail_stops_after_first_failure() {
    Project::with_tests(&[("a.sh", FAIL), ("b.sh", FAIL)])
        .run(&["--bail"])
        .code(1)
        .stdout_has("1 failing");
}

#[test]
fn grep_marks_unselected_files_pending() {
    Project::with_tests(&[("alpha.sh", PASS), ("beta.sh", FAIL)])
        .run(&["--grep", "alpha", "--reporter", "tap"])
        .code(0)
        .stdout_eq("1..2\nok 1 test/alpha.sh\nok 2 test/beta.sh # SKIP -\n# tests 1\n# pass 1\n# fail 0\n");
}

#[test]
fn positional_spec_overrides_default() {
    let temp = Project::with_tests(&[("a.sh", FAIL)]);
    temp.file("other/b.sh", PASS);

    temp.run(&["other"]).code(0).stdout_has("1 passing");
}

#[test]
fn forwarded_options_reach_test_processes() {
    let temp = Project::empty();
    temp.file("test/env.sh", "test \"$TRIAL_TIMEOUT\" = 5000 || exit 1\n");

    temp.run(&["--timeout", "5000"]).code(0);
}

// =============================================================================
// REPORTERS
// =============================================================================

#[test]
fn json_reporter_prints_summary() {
    let run = Project::with_tests(&[("a.sh", PASS), ("b.sh", FAIL)])
        .run(&["--reporter", "json"])
        .code(1);

    let json = run.json();
    assert_eq!(json["passes"], 1);
    assert_eq!(json["failures"], 1);
    assert_eq!(json["files"].as_array().unwrap().len(), 2);
}

#[test]
fn dot_reporter_prints_one_mark_per_file() {
    Project::with_tests(&[("a.sh", PASS), ("b.sh", FAIL)])
        .run(&["--reporter", "dot"])
        .code(1)
        .stdout_has("\n  .!");
}

// =============================================================================
// CONFIG LAYERS
// =============================================================================

/// > rc files beat package.json
#[test]
fn rc_file_beats_package_json() {
    let temp = Project::with_tests(&[("a.sh", PASS)]);
    temp.file("package.json", r#"{"trial": {"reporter": "dot"}}"#);
    temp.file(".trialrc.json", r#"{"reporter": "tap"}"#);

    temp.run(&[]).code(0).stdout_has("1..1\n");
}

#[test]
fn package_json_config_is_used() {
    let temp = Project::with_tests(&[("a.sh", PASS)]);
    temp.file("package.json", r#"{"trial": {"reporter": "tap"}}"#);

    temp.run(&[]).code(0).stdout_has("ok 1 test/a.sh");
}

#[test]
fn yaml_rc_file_is_read() {
    let temp = Project::with_tests(&[("a.sh", PASS)]);
    temp.file(".trialrc.yml", "reporter: tap\n");

    temp.run(&[]).code(0).stdout_has("1..1\n");
}

#[test]
fn cli_beats_rc_file() {
    let temp = Project::with_tests(&[("a.sh", PASS)]);
    temp.file(".trialrc.json", r#"{"reporter": "dot"}"#);

    temp.run(&["--reporter", "tap"])
        .code(0)
        .stdout_has("1..1\n");
}

#[test]
fn no_config_skips_rc_file() {
    let temp = Project::with_tests(&[("a.sh", PASS)]);
    temp.file(".trialrc.json", r#"{"reporter": "tap"}"#);

    temp.run(&["--no-config"])
        .code(0)
        .stdout_lacks("1..1")
        .stdout_has("1 passing");
}

#[test]
fn opts_file_supplies_arguments() {
    let temp = Project::with_tests(&[("a.sh", PASS)]);
    temp.file("test/trial.opts", "# shared flags\n--reporter tap\n");

    temp.run(&[]).code(0).stdout_has("1..1\n");
}

#[test]
fn no_opts_skips_opts_file() {
    let temp = Project::with_tests(&[("a.sh", PASS)]);
    temp.file("test/trial.opts", "--reporter tap\n");

    temp.run(&["--no-opts"]).code(0).stdout_lacks("1..1");
}

#[test]
fn require_registers_exported_reporters() {
    let temp = Project::with_tests(&[("a.sh", PASS)]);
    temp.file("plugins.json", r#"{"reporters": {"nyan": "nyan.sh"}}"#);
    temp.file("nyan.sh", "cat > /dev/null\n");

    temp.run(&["--require", "./plugins.json", "--list-reporters"])
        .code(0)
        .stdout_has("    nyan\n");
}
