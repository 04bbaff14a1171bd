//! Loading descriptors and options from disk

use archgraph_reconciler::{ModuleDescriptor, ReconcileOptions};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG: &str = "archgraph.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// A descriptor file holds one module or a list of modules
#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorFile {
    Many(Vec<ModuleDescriptor>),
    One(Box<ModuleDescriptor>),
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PackageManifest {
    dependencies: BTreeMap<String, String>,
    dev_dependencies: BTreeMap<String, String>,
    peer_dependencies: BTreeMap<String, String>,
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_json<T: for<'de> Deserialize<'de>>(path: &Path, text: &str) -> Result<T, LoadError> {
    serde_json::from_str(text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read reconcile options from a JSON config file
pub fn load_options(path: &Path) -> Result<ReconcileOptions, LoadError> {
    let text = read(path)?;
    parse_json(path, &text)
}

/// Package versions declared in a package manifest.
///
/// Runtime dependencies win over dev and peer entries of the same name.
pub fn load_dependency_versions(path: &Path) -> Result<BTreeMap<String, String>, LoadError> {
    let text = read(path)?;
    let manifest: PackageManifest = parse_json(path, &text)?;
    let mut versions = manifest.peer_dependencies;
    versions.extend(manifest.dev_dependencies);
    versions.extend(manifest.dependencies);
    Ok(versions)
}

/// Expand files and directories into descriptor JSON files, sorted per input
pub fn descriptor_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = entry.map_err(|source| LoadError::Walk {
                path: input.clone(),
                source,
            })?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "json") {
                found.push(path.to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

/// Load every module descriptor under `inputs`
pub fn load_descriptors(inputs: &[PathBuf]) -> Result<Vec<ModuleDescriptor>, LoadError> {
    let mut modules = Vec::new();
    for path in descriptor_files(inputs)? {
        let text = read(&path)?;
        match parse_json(&path, &text)? {
            DescriptorFile::Many(many) => modules.extend(many),
            DescriptorFile::One(one) => modules.push(*one),
        }
    }
    debug!(inputs = inputs.len(), modules = modules.len(), "loaded module descriptors");
    Ok(modules)
}
