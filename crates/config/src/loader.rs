use crate::error::{ErrorKind, Result};
use crate::{Config, Overrides};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::path::{Path, PathBuf};

/// Prefix of the environment variables that are read, e.g. `RESTEM_INPUT_CSV`.
pub const ENV_PREFIX: &str = "RESTEM_";
/// File name (without extension) looked for in the search directories.
pub const FILE_STEM: &str = "restem";
const EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

/// Builds a [`Config`] from defaults, a config file, the environment and
/// command line overrides.
///
/// With an explicit [`file`](Self::file) the search directories are ignored;
/// otherwise the first `restem.{toml,yaml,yml,json}` found in the search
/// directories (in the order they were added) is used.
#[derive(Debug, Clone, Default)]
pub struct Loader {
    file: Option<PathBuf>,
    search: Vec<PathBuf>,
}
impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this config file instead of searching for one.
    pub fn file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file;
        self
    }

    /// Look for a config file in `dir`.
    pub fn search_in(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search.push(dir.into());
        self
    }

    /// Look for a config file in the platform's configuration directory
    /// (e.g. `~/.config/restem` on Linux).
    pub fn search_platform_dir(self) -> Self {
        match ProjectDirs::from("", "", FILE_STEM) {
            Some(dirs) => self.search_in(dirs.config_dir()),
            None => self,
        }
    }

    /// The config file that will be read, if any.
    ///
    /// # Errors
    /// [`NotFound`](ErrorKind::NotFound) if an explicit file does not exist.
    pub fn locate(&self) -> Result<Option<PathBuf>> {
        if let Some(file) = &self.file {
            if !file.is_file() {
                exn::bail!(ErrorKind::NotFound(file.clone()));
            }
            return Ok(Some(file.clone()));
        }
        Ok(self
            .search
            .iter()
            .flat_map(|dir| EXTENSIONS.iter().map(move |ext| dir.join(format!("{FILE_STEM}.{ext}"))))
            .find(|candidate| candidate.is_file()))
    }

    pub fn figment(&self, overrides: &Overrides) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = self.locate()? {
            tracing::debug!(file = %file.display(), "Loading config file");
            figment = merge_file(figment, &file)?;
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)).merge(Serialized::defaults(overrides)))
    }

    /// Merge every layer into a [`Config`].
    ///
    /// # Errors
    /// - [`NotFound`](ErrorKind::NotFound) or
    ///   [`UnsupportedFormat`](ErrorKind::UnsupportedFormat) for the config
    ///   file,
    /// - [`Load`](ErrorKind::Load) if a source is malformed or a value has
    ///   the wrong type.
    pub fn load(&self, overrides: &Overrides) -> Result<Config> {
        self.figment(overrides)?.extract().or_raise(|| ErrorKind::Load)
    }
}

fn merge_file(figment: Figment, file: &Path) -> Result<Figment> {
    Ok(match file.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => figment.merge(Toml::file_exact(file)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(file)),
        Some("json") => figment.merge(Json::file_exact(file)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
    })
}
