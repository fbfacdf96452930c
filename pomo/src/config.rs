use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "pomo.toml";
const RECORD_FILE: &str = "pomo.csv";
const LOG_FILE: &str = "pomo.log";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Control socket. Defaults to a file next to the daemon executable.
    pub socket_path: Option<PathBuf>,
    pub record_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
    pub display: Display,
    pub icons: Icons,
}

/// Status bar command. The status text is appended as the last argument.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Display {
    pub program: String,
    #[serde(deserialize_with = "string_or_list")]
    pub args: Vec<String>,
    pub idle_status: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Icons {
    pub work: String,
    pub short_break: String,
    pub long_break: String,
    pub paused: String,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            program: "qtile".to_string(),
            args: ["cmd-obj", "-o", "widget", "pomo", "-f", "update", "-a"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            idle_status: "🍅 -- / --".to_string(),
        }
    }
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            work: "🍅".to_string(),
            short_break: "🧍".to_string(),
            long_break: "💤".to_string(),
            paused: "⏸".to_string(),
        }
    }
}

/// Accepts either `args = ["-a", "-b"]` or `args = "-a -b"`.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Args {
        Line(String),
        List(Vec<String>),
    }

    Ok(match Args::deserialize(deserializer)? {
        Args::Line(line) => line.split_whitespace().map(str::to_string).collect(),
        Args::List(list) => list,
    })
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "pomo", "pomo")
}

fn data_file(name: &str) -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join(name),
        None => PathBuf::from(name),
    }
}

impl Config {
    pub fn record_path(&self) -> PathBuf {
        self.record_path
            .clone()
            .unwrap_or_else(|| data_file(RECORD_FILE))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_path.clone().unwrap_or_else(|| data_file(LOG_FILE))
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {:?}", path))?;
    toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config file at {:?}", path))
}

/// Load from `explicit` if given (it must exist), otherwise from the
/// per-user config directory, falling back to defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    match project_dirs() {
        Some(proj_dirs) => {
            let path = proj_dirs.config_dir().join(CONFIG_FILE);
            if path.exists() {
                read_config(&path)
            } else {
                Ok(Config::default())
            }
        }
        None => Ok(Config::default()),
    }
}
