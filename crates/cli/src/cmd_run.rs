// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Default command: resolve options, then run once or watch.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crossbeam_channel::unbounded;

use trial::color::resolve_color;
use trial::engine::{EngineSettings, ProcessEngine};
use trial::error::ExitCode;
use trial::help;
use trial::lookup;
use trial::module::{FsModuleLoader, MemoryModuleCache, ModuleLoader};
use trial::options::{OptionValue, Options};
use trial::plugin::{self, PluginKind, PluginRegistry, PluginResolver, ResolvedPlugin};
use trial::report::{self, ReporterConfig};
use trial::resolver::ConfigResolver;
use trial::watch::{self, WatchSupervisor};
use trial::{signal, watcher};

/// Run the command for the given arguments (without the binary name).
pub fn run(args: Vec<String>) -> anyhow::Result<ExitCode> {
    let cwd = std::env::current_dir()?;
    let mut resolver = ConfigResolver::new(&cwd);
    let options = resolver.resolve(&args)?;
    tracing::debug!(?options, "resolved options");

    if options.flag("help") || options.flag("show-hidden-help") {
        print!("{}", help::format_help(options.flag("show-hidden-help")));
        return Ok(ExitCode::Success);
    }
    if options.flag("version") {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::Success);
    }

    let cache = Arc::new(MemoryModuleCache::new());
    let loader: Arc<dyn ModuleLoader> = Arc::new(FsModuleLoader::new(&cwd, cache.clone()));
    let mut registry = PluginRegistry::builtin();
    plugin::handle_requires(options.list("require"), &cwd, loader.as_ref(), &mut registry)?;

    for (flag, kind) in [
        ("list-reporters", PluginKind::Reporter),
        ("list-interfaces", PluginKind::Interface),
    ] {
        if options.flag(flag) {
            list_plugins(&registry, kind)?;
            return Ok(ExitCode::Success);
        }
    }

    let mut plugins = PluginResolver::new(&registry, loader.as_ref(), &cwd);
    let reporter = validate(&mut plugins, &options, PluginKind::Reporter)?;
    let ui = validate(&mut plugins, &options, PluginKind::Interface)?;
    tracing::debug!(reporter = reporter.name(), ui = ui.name(), "plugins resolved");

    let set = lookup::handle_files(&options, &cwd)?;
    for warning in &set.warnings {
        eprintln!("{warning}");
    }
    set.require_files(options.list("spec"))?;

    let color = resolve_color(Some(&options));
    let config = ReporterConfig::from_options(&options, &cwd)?;
    let reporter = report::build_reporter(&reporter, config, color)?;
    let engine = ProcessEngine::new(
        EngineSettings::from_options(&options, &cwd)?,
        Arc::clone(&loader),
        reporter,
    );
    tracing::debug!(settings = ?engine.settings(), "engine ready");

    let (tx, rx) = unbounded();
    signal::install(tx.clone())?;

    if options.flag("watch") {
        return Ok(run_watch(engine, cache, set.files, &options, &cwd, tx, &rx)?);
    }

    let mut engine = engine;
    let code = watch::run_once(&mut engine, &set.files, &tx, &rx)?;
    if !options.flag("exit") {
        drain();
    }
    Ok(code)
}

fn validate(
    plugins: &mut PluginResolver<'_>,
    options: &Options,
    kind: PluginKind,
) -> trial::Result<ResolvedPlugin> {
    let value = options
        .get(kind.option())
        .cloned()
        .unwrap_or(OptionValue::List(Vec::new()));
    plugins.validate(kind, &value)
}

fn list_plugins(registry: &PluginRegistry, kind: PluginKind) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out)?;
    for name in registry.names(kind) {
        writeln!(out, "    {name}")?;
    }
    writeln!(out)?;
    out.flush()
}

fn run_watch(
    engine: ProcessEngine,
    cache: Arc<MemoryModuleCache>,
    files: Vec<std::path::PathBuf>,
    options: &Options,
    cwd: &Path,
    tx: crossbeam_channel::Sender<watch::WatchEvent>,
    rx: &crossbeam_channel::Receiver<watch::WatchEvent>,
) -> trial::Result<ExitCode> {
    let watched = watcher::watch_set(cwd, options.list("watch-extensions"));
    let _watcher = watcher::watch_paths(&watched, tx.clone())?;
    let grep_given = options.string("grep").is_some_and(|g| !g.is_empty());

    println!();
    let mut supervisor = WatchSupervisor::new(engine, cache, files, watched, tx)
        .reset_grep_on_rerun(!grep_given);
    Ok(supervisor.run(rx))
}

/// Flush stdout and stderr before exit.
fn drain() {
    let _ = std::io::stdout().lock().flush();
    let _ = std::io::stderr().lock().flush();
}
