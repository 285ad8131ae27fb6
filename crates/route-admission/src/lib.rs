pub mod config;
pub mod manifest;
pub mod review;

pub use config::*;
pub use manifest::{collect_manifests, load_route, parse_route, ManifestError, ManifestFormat};
pub use review::{review_file, review_manifest, review_route, AdmissionResponse};

use log::info;
use std::{io::Write, path::PathBuf};

/// Reviews every configured manifest, writing one JSON response per line to
/// `out`. Returns the responses in input order.
pub fn run<W: Write>(
    settings: &Settings,
    out: &mut W,
) -> Result<Vec<AdmissionResponse>, anyhow::Error> {
    let manifests = if settings.manifests.is_empty() {
        collect_manifests(&PathBuf::from(&settings.admission.manifest_dir))?
    } else {
        settings.manifests.clone()
    };
    info!("reviewing {} route manifest(s)", manifests.len());

    let mut responses = Vec::with_capacity(manifests.len());
    for path in &manifests {
        let response = review_file(path);
        let line = if settings.admission.pretty {
            serde_json::to_string_pretty(&response)?
        } else {
            serde_json::to_string(&response)?
        };
        writeln!(out, "{}", line)?;
        responses.push(response);
    }

    let rejected = responses.iter().filter(|r| !r.allowed).count();
    info!(
        "admitted {} of {} route manifest(s)",
        responses.len() - rejected,
        responses.len()
    );
    Ok(responses)
}
