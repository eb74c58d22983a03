//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use glob::glob;
use tracing::debug;

use virement_core::{DocumentKind, VirementConfig};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("virement")
        .join("config.json")
}

/// Load the explicit config, else the default file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<VirementConfig> {
    if let Some(path) = config_path {
        return Ok(VirementConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(VirementConfig::from_file(&default_path)?)
    } else {
        Ok(VirementConfig::default())
    }
}

/// Expand file names and glob patterns into supported documents, in argument order.
pub fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let before = files.len();
        for path in glob(input)?.filter_map(|r| r.ok()) {
            let supported = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(DocumentKind::from_extension)
                .is_some();
            if supported && !files.contains(&path) {
                files.push(path);
            }
        }
        if files.len() == before {
            anyhow::bail!("No matching PDF, image or text files for: {}", input);
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_inputs_filters_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.pdf", "b.txt", "c.docx"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }

        let pattern = format!("{}/*", dir.path().display());
        let explicit = dir.path().join("b.txt").display().to_string();
        let files = expand_inputs(&[pattern, explicit]).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.txt"]);
    }

    #[test]
    fn test_expand_inputs_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.pdf", dir.path().display());
        assert!(expand_inputs(&[pattern]).is_err());
    }
}
