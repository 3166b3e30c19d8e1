//! Manifest file parsing and discovery

use crate::config::types::Manifest;
use crate::error::{ConfigError, ConfigResult, TaskweaveError};
use crate::task::EnvMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default manifest file names to search for
const MANIFEST_FILE_NAMES: &[&str] = &["taskweave.yml", "taskweave.yaml"];

/// Find the manifest by searching current and parent directories
pub fn find_manifest_file() -> ConfigResult<PathBuf> {
    find_manifest_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the manifest starting from a specific directory
pub fn find_manifest_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in MANIFEST_FILE_NAMES {
            let manifest_path = current_dir.join(file_name);
            searched_paths.push(manifest_path.display().to_string());

            if manifest_path.is_file() {
                return Ok(manifest_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a manifest file from a path
pub fn parse_manifest_file(path: &Path) -> Result<Manifest, TaskweaveError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e)))?;

    parse_manifest(&contents)
}

/// Parse a manifest from a string
pub fn parse_manifest(yaml: &str) -> Result<Manifest, TaskweaveError> {
    let mut manifest: Manifest = serde_yaml::from_str(yaml)?;

    // Map keys are authoritative for task names
    for (name, spec) in manifest.tasks.iter_mut() {
        spec.name = name.clone();
    }

    Ok(manifest)
}

/// Parse the manifest with automatic file discovery
pub fn parse_manifest_auto() -> Result<(Manifest, PathBuf), TaskweaveError> {
    let manifest_path = find_manifest_file()?;
    let manifest = parse_manifest_file(&manifest_path)?;
    Ok((manifest, manifest_path))
}

/// Read variables from a dotenv file, in file order
pub fn load_env_file(path: &Path) -> ConfigResult<EnvMap> {
    let env_file_error = |e: dotenvy::Error| ConfigError::EnvFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    };

    let mut vars = EnvMap::new();
    for item in dotenvy::from_path_iter(path).map_err(env_file_error)? {
        let (key, value) = item.map_err(env_file_error)?;
        vars.set(key, value);
    }
    Ok(vars)
}
