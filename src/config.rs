use crate::error::AppError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Player profile name the match-history source is expected to show.
    pub profile: String,
    pub data_file: PathBuf,
    pub roster_file: PathBuf,
    pub counters_file: PathBuf,
    pub export_file: PathBuf,
    /// When false the session only reports existing statistics.
    pub update: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let data_dir = default_data_dir()?;

        let profile = env::var("GOD_DRAFT_PROFILE").unwrap_or_default();
        let data_file = env_path("GOD_DRAFT_DATA_FILE", || data_dir.join("stats.json"));
        let roster_file = env_path("GOD_DRAFT_ROSTER_FILE", || data_dir.join("all_gods.txt"));
        let counters_file =
            env_path("GOD_DRAFT_COUNTERS_FILE", || data_dir.join("god_counters.txt"));
        let export_file = env_path("GOD_DRAFT_EXPORT_FILE", || data_dir.join("history.json"));

        let update = env::var("GOD_DRAFT_UPDATE")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Ok(Config {
            profile,
            data_file,
            roster_file,
            counters_file,
            export_file,
            update,
        })
    }
}

fn env_path(var: &str, default: impl FnOnce() -> PathBuf) -> PathBuf {
    env::var(var).map(PathBuf::from).unwrap_or_else(|_| default())
}

fn default_data_dir() -> Result<PathBuf, AppError> {
    let dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".god_draft");

    std::fs::create_dir_all(&dir)
        .map_err(|e| AppError::ConfigError(format!("Cannot create {}: {}", dir.display(), e)))?;

    Ok(dir)
}
