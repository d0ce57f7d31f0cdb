// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Trial CLI entry point.

use tracing_subscriber::{EnvFilter, fmt};

use trial::error::ExitCode;

mod cmd_run;

fn init_logging() {
    let filter = EnvFilter::try_from_env("TRIAL_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let exit_code = match cmd_run::run(std::env::args().skip(1).collect()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("trial: {}", e);
            match e.downcast_ref::<trial::Error>() {
                Some(err) => ExitCode::from(err),
                None => ExitCode::InternalError,
            }
        }
    };

    std::process::exit(exit_code.code());
}
