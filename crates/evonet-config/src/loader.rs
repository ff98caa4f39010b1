// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading
//!
//! Loads `evonet.toml`, searching upward from the working directory, with
//! an `EVONET_CONFIG_PATH` environment override. Every loaded file runs
//! through the validation pass before it is handed to callers.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{validate_config, ConfigError, ConfigResult, EvonetConfig};

const CONFIG_FILE_NAME: &str = "evonet.toml";
const ENV_CONFIG_PATH: &str = "EVONET_CONFIG_PATH";

/// Find the evonet configuration file
///
/// Search order:
/// 1. `EVONET_CONFIG_PATH` environment variable
/// 2. Current working directory: `./evonet.toml`
/// 3. Ancestor directories (up to 5 levels)
///
/// # Errors
///
/// Returns [`ConfigError::FileNotFound`] if no config file exists in any
/// searched location.
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(ENV_CONFIG_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "config file specified by {ENV_CONFIG_PATH} not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd;
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent.to_path_buf();
                }
                None => break,
            }
        }
    }

    for path in &search_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    Err(ConfigError::FileNotFound(format!(
        "'{CONFIG_FILE_NAME}' not found in any of these locations:\n{search_list}\n\
         Set {ENV_CONFIG_PATH} to specify a custom location."
    )))
}

/// Load and validate a configuration
///
/// With `path = None` the file is discovered via [`find_config_file`].
pub fn load_config(path: Option<&Path>) -> ConfigResult<EvonetConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => find_config_file()?,
    };

    let text = fs::read_to_string(&path)?;
    let config: EvonetConfig = toml::from_str(&text)?;
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_partial_file_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[network]\ninputs = 4\noutputs = 2\n\n[population]\nsize = 20\ngroup = 5\n"
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.network.inputs, 4);
        assert_eq!(config.network.outputs, 2);
        assert_eq!(config.population.size, 20);
        assert_eq!(config.group_count(), 4);
        // untouched sections keep their defaults
        assert!((config.mutate.layer.add_rate - 6e-3).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[network]\ninputs = 0\noutputs = 1\n").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let result = load_config(Some(Path::new("/nonexistent/evonet.toml")));
        assert!(result.is_err());
    }
}
