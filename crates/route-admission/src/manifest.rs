//! Decoding Route manifests from disk

use serving_core::{CoreError, Route};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("unsupported manifest format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Toml,
}

impl ManifestFormat {
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(ManifestFormat::Json),
            Some("toml") => Ok(ManifestFormat::Toml),
            _ => Err(ManifestError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub fn parse_route(contents: &str, format: ManifestFormat) -> Result<Route, CoreError> {
    let route = match format {
        ManifestFormat::Json => serde_json::from_str(contents)?,
        ManifestFormat::Toml => toml::from_str(contents)?,
    };
    Ok(route)
}

pub fn read_manifest(path: &Path) -> Result<(String, ManifestFormat), ManifestError> {
    let format = ManifestFormat::from_path(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok((contents, format))
}

pub fn load_route(path: &Path) -> Result<Route, ManifestError> {
    let (contents, format) = read_manifest(path)?;
    Ok(parse_route(&contents, format)?)
}

/// Every `.json` and `.toml` file directly under `dir`, in path order
pub fn collect_manifests(dir: &Path) -> Result<Vec<PathBuf>, ManifestError> {
    let entries = fs::read_dir(dir).map_err(|source| ManifestError::Read {
        path: dir.display().to_string(),
        source,
    })?;

    let mut manifests = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| ManifestError::Read {
                path: dir.display().to_string(),
                source,
            })?
            .path();
        if path.is_file() && ManifestFormat::from_path(&path).is_ok() {
            manifests.push(path);
        }
    }
    manifests.sort();
    Ok(manifests)
}
