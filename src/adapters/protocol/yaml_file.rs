//! File-based protocol source.
//!
//! Reads a YAML protocol document from disk on every `load`, so operators
//! can edit the file and have the reloader pick up the new version.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::escalation::{ProtocolDocument, ProtocolTable};
use crate::ports::{ProtocolSource, ProtocolSourceError};

/// Protocol table stored as a YAML file.
///
/// # Example
/// ```ignore
/// let source = YamlProtocolSource::new("./config/protocols.yaml");
/// let table = source.load().await?;
/// ```
#[derive(Debug, Clone)]
pub struct YamlProtocolSource {
    path: PathBuf,
}

impl YamlProtocolSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses a document without touching the filesystem.
    pub fn parse(yaml: &str) -> Result<ProtocolTable, ProtocolSourceError> {
        let document: ProtocolDocument =
            serde_yaml::from_str(yaml).map_err(|e| ProtocolSourceError::Parse(e.to_string()))?;
        Ok(ProtocolTable::from_document(document)?)
    }
}

#[async_trait]
impl ProtocolSource for YamlProtocolSource {
    async fn load(&self) -> Result<ProtocolTable, ProtocolSourceError> {
        let yaml = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ProtocolSourceError::Io {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::parse(&yaml)
    }

    fn describe(&self) -> String {
        format!("yaml:{}", self.path.display())
    }
}
