use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use crate::transactions::{InstantiateResult, StoreCodeResult};

/// What is known about one contract deployment on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

impl ContractManifest {
    /// Fields set in `other` replace ours; unset ones are kept.
    pub fn merge(mut self, other: ContractManifest) -> Self {
        if other.code_id.is_some() {
            self.code_id = other.code_id;
        }
        if other.code_hash.is_some() {
            self.code_hash = other.code_hash;
        }
        if other.contract_address.is_some() {
            self.contract_address = other.contract_address;
        }
        self
    }
}

impl From<StoreCodeResult> for ContractManifest {
    fn from(result: StoreCodeResult) -> Self {
        Self {
            code_id: Some(result.code_id),
            code_hash: Some(result.code_hash),
            contract_address: None,
        }
    }
}

impl From<InstantiateResult> for ContractManifest {
    fn from(result: InstantiateResult) -> Self {
        Self {
            contract_address: Some(result.contract_address),
            ..Default::default()
        }
    }
}

/// Manifests stored as `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    /// A missing file reads as an empty manifest.
    pub fn read(&self, name: &str) -> Result<ContractManifest> {
        let path = self.path(name);

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No manifest at {}, starting empty", path.display());
                return Ok(ContractManifest::default());
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        serde_json::from_str(&contents).map_err(|e| {
            ClientError::ManifestError(format!("Invalid manifest {}: {}", path.display(), e))
        })
    }

    pub fn write(&self, name: &str, manifest: &ContractManifest) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        let path = self.path(name);
        let mut contents = serde_json::to_string_pretty(manifest)?;
        contents.push('\n');
        fs::write(&path, contents).map_err(|e| io_error(&path, e))?;

        tracing::info!("Wrote manifest {}", path.display());
        Ok(())
    }

    /// Reads, merges `update` on top and writes back. Returns the merged manifest.
    pub fn update(&self, name: &str, update: impl Into<ContractManifest>) -> Result<ContractManifest> {
        let manifest = self.read(name)?.merge(update.into());
        self.write(name, &manifest)?;
        Ok(manifest)
    }
}

fn io_error(path: &Path, e: std::io::Error) -> ClientError {
    ClientError::ManifestError(format!("{}: {}", path.display(), e))
}
