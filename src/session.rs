use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Config;
use crate::filters::filter_active;
use crate::loader::{self, LoadError};
use crate::models::{Table, Warning};

/// Dataset context built once when the export is loaded and handed to every
/// view. Only active programs are kept; views work on filtered copies.
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    source: PathBuf,
    total_records: usize,
    active: Table,
    warnings: Vec<Warning>,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no dataset loaded; load a valid CSV export first")]
    NotLoaded,
}

impl Session {
    pub fn load(config: Config, path: &Path) -> Result<Self, LoadError> {
        let table = loader::load_path(path, config.preamble_lines)?;
        Ok(Self::from_table(config, path.to_path_buf(), table))
    }

    pub fn from_table(config: Config, source: PathBuf, table: Table) -> Self {
        let filtered = filter_active(&table, &config.columns.status);
        info!(
            total = table.len(),
            active = filtered.table.len(),
            "filtered export to active programs"
        );

        Self {
            total_records: table.len(),
            active: filtered.table,
            warnings: filtered.warning.into_iter().collect(),
            config,
            source,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn total_records(&self) -> usize {
        self.total_records
    }

    pub fn active(&self) -> &Table {
        &self.active
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

/// Views cannot run before a dataset was loaded successfully.
pub fn require(session: Option<&Session>) -> Result<&Session, SessionError> {
    session.ok_or(SessionError::NotLoaded)
}
