//! Settings/config loading, trimmed from the teacher's `config.rs` down to
//! what a document-versioning engine needs: where the database lives, and
//! who created it. No scraper, OCR, LLM, or rate-limit configuration
//! survives the trim (see DESIGN.md).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Resolved runtime settings. Constructed by `Settings::default()` and
/// then overridden by `Config` (file + env), same two-stage shape as the
/// teacher's `Settings`/`Config` pair.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub database_filename: String,
    pub database_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("corpus-engine");

        Self { data_dir, database_filename: "corpus.sqlite3".to_string(), database_url: None }
    }
}

impl Settings {
    /// Explicit `DATABASE_URL` wins; otherwise `data_dir`/`database_filename`,
    /// mirroring the teacher's `database_url()` resolution order.
    pub fn database_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }
        format!("sqlite://{}", self.database_path().display())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    pub fn database_exists(&self) -> bool {
        self.database_path().exists()
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)?;
            tracing::debug!(dir = %self.data_dir.display(), "created data directory");
        }
        Ok(())
    }
}

/// File-loadable overrides, merged onto `Settings::default()`. Field names
/// match `Settings` so a partial TOML/JSON file only needs to set what it
/// wants to change.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    pub data_dir: Option<String>,
    pub database_filename: Option<String>,
    pub database_url: Option<String>,
}

impl Config {
    /// Loads from `path` (toml/yaml/json by extension) using `prefer`,
    /// then applies the same environment-variable overrides the teacher
    /// uses (`DATABASE_URL`), so a deployment can override the database
    /// location without touching a config file.
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = match extension {
            "toml" => toml::from_str(&contents)?,
            "json" => serde_json::from_str(&contents)?,
            other => anyhow::bail!("unsupported config extension: {other}"),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load(app_name: &str) -> anyhow::Result<Self> {
        let loaded: Config = prefer::load(app_name).unwrap_or_default();
        let mut config = loaded;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = Some(url);
        }
    }

    /// Merges this config onto `base`, returning resolved `Settings`.
    pub fn resolve(&self, mut base: Settings) -> Settings {
        if let Some(dir) = &self.data_dir {
            base.data_dir = PathBuf::from(shellexpand::tilde(dir).into_owned());
        }
        if let Some(filename) = &self.database_filename {
            base.database_filename = filename.clone();
        }
        if let Some(url) = &self.database_url {
            base.database_url = Some(url.clone());
        }
        base
    }
}
