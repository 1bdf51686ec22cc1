use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "termtune";
const PLAYLISTS_DIR: &str = "playlists";
const SONGS_DIR: &str = "songs";

pub const DATA_DIR_ENV: &str = "TERMTUNE_DATA_DIR";
pub const SONGS_DIR_ENV: &str = "TERMTUNE_SONGS_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub songs_dir: PathBuf,
}

impl Settings {
    pub fn new(data_dir: impl Into<PathBuf>, songs_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            songs_dir: songs_dir.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self {
            data_dir: data_root()?,
            songs_dir: songs_root()?,
        })
    }

    pub fn playlists_dir(&self) -> PathBuf {
        self.data_dir.join(PLAYLISTS_DIR)
    }
}

pub fn data_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(override_dir));
    }

    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("neither HOME nor USERPROFILE is set")?;
    Ok(PathBuf::from(home).join(".config").join(APP_DIR))
}

pub fn songs_root() -> Result<PathBuf> {
    if let Ok(override_dir) = env::var(SONGS_DIR_ENV) {
        return Ok(PathBuf::from(override_dir));
    }

    let cwd = env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(SONGS_DIR))
}

/// Makes `path` absolute against the current directory without touching the
/// filesystem, so symlinked song folders keep the path the user typed.
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
