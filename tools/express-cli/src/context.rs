//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use express_cache::{Cache, FileBackend};
use express_commerce::cart::CartStore;
use express_commerce::clock::{Clock, SystemClock};
use express_commerce::config::CommerceConfig;
use express_db::{Db, JsonFileBackend};

use crate::output::Output;

/// Config file names searched from the working directory upward.
pub const CONFIG_NAMES: [&str; 3] = ["express.toml", ".express.toml", "express.json"];

/// Default data directory when the config names none.
const DEFAULT_DATA_DIR: &str = ".express";

/// Execution context for CLI commands.
pub struct Context {
    /// Storefront configuration.
    pub config: CommerceConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = resolve(&cwd, Path::new(path));
                (CommerceConfig::load(&path)?, Some(path))
            }
            None => match find_config(&cwd) {
                Some(path) => (CommerceConfig::load(&path)?, Some(path)),
                None => (CommerceConfig::default(), None),
            },
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Directory holding the store file and the local cart.
    ///
    /// Relative paths resolve against the config file's directory.
    pub fn data_dir(&self) -> PathBuf {
        let base = self
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(&self.cwd);
        let dir = self
            .config
            .storage
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        resolve(base, &dir)
    }

    /// Open the document store.
    pub fn db(&self) -> Result<Db> {
        let path = self.data_dir().join("store.json");
        let backend = JsonFileBackend::open(&path)
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        Ok(Db::new(backend))
    }

    /// Open the client-local cache.
    pub fn cache(&self) -> Result<Cache> {
        let dir = self.data_dir().join("local");
        let backend = FileBackend::open(&dir)
            .with_context(|| format!("Failed to open local storage at {}", dir.display()))?;
        Ok(Cache::new(backend))
    }

    /// Open the persisted cart.
    pub fn cart(&self) -> Result<CartStore> {
        Ok(CartStore::open(
            self.cache()?,
            &self.config.storage.namespace,
            self.config.pricing_policy(),
        )?)
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::new(SystemClock)
    }
}

/// Find a config file in the directory tree.
fn find_config(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    })
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
