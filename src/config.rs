use crate::calendar::WeekStart;
use crate::diary_entry::{self, DiaryEntry};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

pub const APP_NAME: &str = "plant-diary";
const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "plant-diary.log";

#[derive(Debug, Parser)]
#[command(name = APP_NAME, version, about = "Log plant-care activities on a calendar")]
pub struct Cli {
    /// Config file (TOML)
    #[arg(short, long, env = "PLANT_DIARY_CONFIG")]
    pub config: Option<PathBuf>,

    /// JSON file with the entries to start from
    #[arg(long)]
    pub seed: Option<PathBuf>,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub week_start: Option<WeekStart>,

    /// Command that prints the chosen photo path, given after `--`,
    /// e.g. `-- zenity --file-selection --title "Plant photo"`
    #[arg(last = true, value_name = "PICKER_COMMAND")]
    pub picker_command: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid seed file {}: {source}", path.display())]
    Seed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("built-in seed data is invalid: {0}")]
    BuiltinSeed(serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    seed: Option<PathBuf>,
    picker_command: Vec<String>,
    log_file: Option<PathBuf>,
    week_start: Option<WeekStart>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub seed: Option<PathBuf>,
    pub picker_command: Vec<String>,
    pub log_file: Option<PathBuf>,
    pub week_start: WeekStart,
}

impl Config {
    /// Reads the config file, if any, and applies command-line overrides.
    /// A file named explicitly must exist; the default location is optional.
    pub async fn load(cli: &Cli) -> Result<Config, ConfigError> {
        let file = match &cli.config {
            Some(path) => read_config_file(path).await?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_config_file(&path).await?,
                _ => FileConfig::default(),
            },
        };
        Ok(Config::merge(cli, file))
    }

    fn merge(cli: &Cli, file: FileConfig) -> Config {
        let picker_command = if cli.picker_command.is_empty() {
            file.picker_command
        } else {
            cli.picker_command.clone()
        };
        Config {
            seed: cli.seed.clone().or(file.seed),
            picker_command,
            log_file: cli.log_file.clone().or(file.log_file),
            week_start: cli.week_start.or(file.week_start).unwrap_or_default(),
        }
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join(APP_NAME).join(LOG_FILE)))
    }

    /// Entries the diary starts from: the seed file, or the built-in list.
    pub async fn load_entries(&self) -> Result<Vec<DiaryEntry>, ConfigError> {
        let Some(path) = &self.seed else {
            return diary_entry::builtin_seed().map_err(ConfigError::BuiltinSeed);
        };
        let json = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        diary_entry::parse_entries(&json).map_err(|source| ConfigError::Seed {
            path: path.clone(),
            source,
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}

async fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
