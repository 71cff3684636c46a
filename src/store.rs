use crate::analysis::god_stats::{GodData, StatsMap};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const BUNDLE_VERSION: u32 = 1;

/// Durable pair of (statistics map, seen match ids). Replaced wholesale on
/// every save; the version field guards against old binaries reading a
/// future layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsBundle {
    pub version: u32,
    pub gods: StatsMap,
    pub seen: BTreeSet<String>,
}

impl StatsBundle {
    pub fn baseline(roster: &[String]) -> Self {
        let gods = roster
            .iter()
            .map(|name| (name.clone(), GodData::new(name.clone())))
            .collect();

        StatsBundle {
            version: BUNDLE_VERSION,
            gods,
            seen: BTreeSet::new(),
        }
    }
}

/// Newline-delimited god roster. Missing file reads as an empty roster;
/// the caller warns and carries on.
pub fn load_roster(path: &Path) -> Result<Vec<String>, AppError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(AppError::StoreError(format!(
                "Cannot read {}: {}",
                path.display(),
                e
            )))
        }
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Loads the bundle, or builds and immediately persists a baseline from the
/// roster when no file exists yet. The second return value is true when the
/// baseline path was taken.
pub fn load_or_init(path: &Path, roster: &[String]) -> Result<(StatsBundle, bool), AppError> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let bundle: StatsBundle = serde_json::from_str(&content).map_err(|e| {
                AppError::JsonError(format!("Failed to parse {}: {}", path.display(), e))
            })?;

            if bundle.version != BUNDLE_VERSION {
                return Err(AppError::BundleVersion {
                    found: bundle.version,
                    expected: BUNDLE_VERSION,
                });
            }

            Ok((bundle, false))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let bundle = StatsBundle::baseline(roster);
            save(path, &bundle)?;
            Ok((bundle, true))
        }
        Err(e) => Err(AppError::StoreError(format!(
            "Cannot read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Write-new-then-rename so a crash mid-write never leaves a truncated
/// bundle behind the live path.
pub fn save(path: &Path, bundle: &StatsBundle) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(bundle)
        .map_err(|e| AppError::JsonError(format!("Failed to serialize bundle: {}", e)))?;

    let tmp = tmp_path(path);
    fs::write(&tmp, json)
        .map_err(|e| AppError::SaveFailed(format!("{}: {}", tmp.display(), e)))?;
    fs::rename(&tmp, path)
        .map_err(|e| AppError::SaveFailed(format!("{}: {}", path.display(), e)))?;

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
