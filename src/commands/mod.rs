//! Command surfaces for the `rentals` and `social` binaries.
//!
//! Each binary parses its own clap tree, then hands off to `run`, which opens
//! the store, dispatches one command and closes the store. Failures come
//! back as `AppError`; `exit_code` decides what the process returns.

pub mod rentals;
pub mod social;

use clap::Args;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::AppResult;
use crate::output::Output;

/// Flags shared by both binaries.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to the SQLite store file [default: database.db]
    #[arg(long, global = true, env = "STAYFEED_DATABASE")]
    pub database: Option<PathBuf>,

    /// Schema script run by `create` (defaults to the built-in schema)
    #[arg(long, global = true, env = "STAYFEED_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Environment config with command-line overrides applied.
    pub fn config(&self) -> AppResult<Config> {
        let mut config = Config::from_env()?;
        if let Some(path) = &self.database {
            config.database.path = path.clone();
        }
        if let Some(path) = &self.schema {
            config.database.schema_path = Some(path.clone());
        }
        Ok(config)
    }

    pub fn output(&self) -> Output {
        Output::new(self.json)
    }
}

/// Reports a failed command and maps it to a process exit status.
pub fn exit_code(output: &Output, result: AppResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            output.error(&err);
            err.exit_code()
        }
    }
}
