pub mod completions;
pub mod drill;
pub mod login;
pub mod play;
pub mod prefs;
pub mod screens;
pub mod sim;

use anyhow::{Result, anyhow};
use matchup_core::config::{MatchupConfig, profile_path};
use matchup_core::store::FileStore;

use crate::output::OutputMode;

/// What every command gets: the resolved config and the output mode.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: MatchupConfig,
    pub output: OutputMode,
}

impl Context {
    /// Open the profile store named by the config.
    ///
    /// # Errors
    ///
    /// Fails when no path is configured and the platform has no data dir.
    pub fn store(&self) -> Result<FileStore> {
        profile_path(&self.config)
            .map(FileStore::new)
            .ok_or_else(|| anyhow!("no data directory found; set [storage] path in the config"))
    }
}
