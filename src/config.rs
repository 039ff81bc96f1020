use once_cell::sync::Lazy;
use std::{
    env,
    path::{Path, PathBuf},
};

/// Environment variable overriding the base data directory.
pub const DATA_DIR_ENV: &str = "USER_LANGUAGES_DATA_DIR";

/// Base directory used when the environment does not name one.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Root under which every downloaded table and the version registry live.
/// Resolved once, on first use.
pub static DATA_DIR: Lazy<PathBuf> = Lazy::new(|| resolve_data_dir(env::var_os(DATA_DIR_ENV)));

pub fn data_dir() -> &'static Path {
    DATA_DIR.as_path()
}

fn resolve_data_dir(var: Option<std::ffi::OsString>) -> PathBuf {
    match var {
        Some(v) if !v.is_empty() => PathBuf::from(v),
        _ => PathBuf::from(DEFAULT_DATA_DIR),
    }
}
