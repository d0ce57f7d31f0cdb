pub mod cli;
pub mod color;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod help;
pub mod lookup;
pub mod module;
pub mod options;
pub mod opts_file;
pub mod package;
pub mod plugin;
pub mod rc;
pub mod report;
pub mod resolver;
pub mod signal;
pub mod walker;
pub mod watch;
pub mod watcher;

pub use engine::{Engine, EngineSettings, ProcessEngine, SessionHandle};
pub use error::{Error, ExitCode, Result};
pub use module::{FsModuleLoader, MemoryModuleCache, ModuleCache, ModuleLoader};
pub use options::{OptionValue, Options};
pub use plugin::{PluginKind, PluginRegistry, PluginResolver, ResolvedPlugin};
pub use resolver::ConfigResolver;
pub use walker::{FileWalker, WalkStats, WalkedFile, WalkerConfig};
pub use watch::{WatchEvent, WatchState, WatchSupervisor};

#[cfg(test)]
pub mod test_utils;
