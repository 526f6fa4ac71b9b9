use std::env;
use std::path::{Path, PathBuf};

use cuentos::error;
use cuentos::error::{Result, Chainable};
use cuentos::settings::Settings;
use cuentos::value::{Toml, Format};

/// A project directory and the settings read from its `config.toml`.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub settings: Settings,
}

impl Project {
    /// Opens the project rooted at the current working directory.
    pub fn discover() -> Result<Self> {
        let root = env::current_dir().chain(error! {
            "failed to determine the project root",
            "the current directory is inaccessible",
        })?;

        Project::at(root)
    }

    /// Opens the project rooted at `root`. A missing `config.toml` means
    /// default settings; an invalid one is an error.
    pub fn at<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        let config = root.join(crate::CONFIG_FILE);
        let settings = match config.is_file() {
            true => Toml::read(&config).chain_with(|| error! {
                "invalid project configuration",
                "config file" => config.display(),
            })?,
            false => Settings::default(),
        };

        tracing::debug!(root = %root.display(), ?settings, "opened project");
        Ok(Project { root, settings })
    }

    pub fn stories_dir(&self) -> PathBuf {
        self.root.join(cuentos::STORIES_DIR)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(cuentos::IMAGES_DIR)
    }

    /// `path` if absolute, otherwise `path` relative to the project root.
    pub fn resolve<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.root.join(path)
    }
}
