//! Storage Layer
//!
//! Handles persistence of scan history and locates the per-user data,
//! config, and cache directories.

pub mod history;

use anyhow::Result;
use directories::ProjectDirs;
use std::path::PathBuf;

pub use history::{JsonHistoryFile, Scan, ScanHistory};

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "glyphscan", "GlyphScan")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = project_dirs()?.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Get the cache directory (snapshots, diagnostic copies)
pub fn get_cache_dir() -> Result<PathBuf> {
    let cache_dir = project_dirs()?.cache_dir().to_path_buf();
    std::fs::create_dir_all(&cache_dir)?;

    Ok(cache_dir)
}

/// Directory drawing snapshots are exported into
pub fn get_snapshot_dir() -> Result<PathBuf> {
    Ok(get_cache_dir()?.join("snapshots"))
}
