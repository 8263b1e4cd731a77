//! File-system wallet.
//!
//! Identities live in `<wallet dir>/<label>.id`, one JSON document each, in
//! the layout Fabric's SDKs and enrollment scripts write:
//!
//! ```json
//! {"credentials":{"certificate":"...","privateKey":"..."},"mspId":"Org1MSP","type":"X.509","version":1}
//! ```

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::fabric::identity::Identity;
use crate::fabric::types::{FabricError, FabricResult};

const ID_FILE_SUFFIX: &str = ".id";
const X509_TYPE: &str = "X.509";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentityRecord {
    credentials: Credentials,
    msp_id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default = "default_version")]
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Credentials {
    certificate: String,
    private_key: String,
}

fn default_version() -> u32 {
    1
}

/// Identity store backed by a directory.
#[derive(Debug, Clone)]
pub struct Wallet {
    dir: PathBuf,
}

impl Wallet {
    /// Open the wallet at `dir`, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> FabricResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            FabricError::Wallet(format!("Failed to open wallet {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Look up an identity by label. `Ok(None)` when the label is absent.
    pub async fn get(&self, label: &str) -> FabricResult<Option<Identity>> {
        let path = self.identity_path(label)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(FabricError::Wallet(format!(
                    "Failed to read identity {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let record: IdentityRecord = serde_json::from_str(&content).map_err(|e| {
            FabricError::Identity(format!("Malformed wallet entry for {}: {}", label, e))
        })?;
        if record.kind != X509_TYPE {
            return Err(FabricError::Identity(format!(
                "Unsupported identity type {} for {}",
                record.kind, label
            )));
        }

        Ok(Some(Identity::new(
            record.msp_id,
            record.credentials.certificate,
            record.credentials.private_key,
        )))
    }

    /// Store an identity under `label`, replacing any existing entry.
    pub async fn put(&self, label: &str, identity: &Identity) -> FabricResult<()> {
        let path = self.identity_path(label)?;
        let record = IdentityRecord {
            credentials: Credentials {
                certificate: identity.certificate().to_string(),
                private_key: identity.private_key_pem().to_string(),
            },
            msp_id: identity.msp_id().to_string(),
            kind: X509_TYPE.to_string(),
            version: default_version(),
        };
        let content = serde_json::to_vec(&record)
            .map_err(|e| FabricError::Wallet(format!("Failed to encode identity {}: {}", label, e)))?;
        tokio::fs::write(&path, content).await.map_err(|e| {
            FabricError::Wallet(format!("Failed to write identity {}: {}", path.display(), e))
        })
    }

    fn identity_path(&self, label: &str) -> FabricResult<PathBuf> {
        if label.is_empty() || label.contains(['/', '\\']) || label == "." || label == ".." {
            return Err(FabricError::Wallet(format!("Invalid identity label '{}'", label)));
        }
        Ok(self.dir.join(format!("{}{}", label, ID_FILE_SUFFIX)))
    }
}
