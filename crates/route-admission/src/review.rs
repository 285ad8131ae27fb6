use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serving_core::{validate_route, FieldError, Route};
use std::path::Path;

use crate::manifest::{load_route, parse_route, ManifestFormat};

/// Verdict for one Route manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionResponse {
    /// Where the manifest came from, usually a file path
    pub source: String,
    /// `namespace/name` of the Route, empty when it could not be decoded
    pub route: String,
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
}

impl AdmissionResponse {
    fn allow(source: &str, route: &Route) -> Self {
        Self {
            source: source.to_string(),
            route: route.display_name(),
            allowed: true,
            message: None,
            paths: vec![],
        }
    }

    fn deny(source: &str, route: &Route, err: FieldError) -> Self {
        Self {
            source: source.to_string(),
            route: route.display_name(),
            allowed: false,
            message: Some(err.message),
            paths: err.paths,
        }
    }

    fn undecodable(source: &str, message: String) -> Self {
        Self {
            source: source.to_string(),
            route: String::new(),
            allowed: false,
            message: Some(message),
            paths: vec![],
        }
    }
}

pub fn review_route(source: &str, route: &Route) -> AdmissionResponse {
    match validate_route(route) {
        None => {
            info!("admitted route {} from {}", route.display_name(), source);
            AdmissionResponse::allow(source, route)
        }
        Some(err) => {
            warn!(
                "rejected route {} from {}: {}",
                route.display_name(),
                source,
                err
            );
            AdmissionResponse::deny(source, route, err)
        }
    }
}

pub fn review_manifest(source: &str, contents: &str, format: ManifestFormat) -> AdmissionResponse {
    match parse_route(contents, format) {
        Ok(route) => review_route(source, &route),
        Err(e) => {
            error!("failed to decode {}: {}", source, e);
            AdmissionResponse::undecodable(source, e.to_string())
        }
    }
}

pub fn review_file(path: &Path) -> AdmissionResponse {
    let source = path.display().to_string();
    match load_route(path) {
        Ok(route) => review_route(&source, &route),
        Err(e) => {
            error!("failed to load {}: {}", source, e);
            AdmissionResponse::undecodable(&source, e.to_string())
        }
    }
}
