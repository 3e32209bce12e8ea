//! Chart documents: the TOML form of an initial node list.
//!
//! ```toml
//! root = "DIRETORIA"
//!
//! [[nodes]]
//! id = "DIRETORIA"
//! name = "DIRETORIA"
//! subordinates = [1, 2]
//!
//! [[nodes]]
//! id = 1
//! name = "DIRETOR 1"
//! email = "d1@example.com"
//! ```
//!
//! Keys other than `id`, `name` and `subordinates` are display attributes and must be strings.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{DomainError, NodeId, NodeRecord, OrgTree, TreeResult};
use crate::infrastructure::traits::FileSystem;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChartDocument {
    /// Root id; inferred when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<NodeId>,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

impl ChartDocument {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Snapshot of a tree, root first and nodes in pre-order.
    pub fn from_tree(tree: &OrgTree) -> Self {
        Self {
            root: Some(tree.root_id().clone()),
            nodes: tree.to_records(),
        }
    }

    /// Explicit root, or the single node nobody lists as a subordinate.
    pub fn root_id(&self) -> TreeResult<NodeId> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let listed: HashSet<&NodeId> = self
            .nodes
            .iter()
            .flat_map(|n| n.subordinates.iter())
            .collect();
        let mut candidates: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| !listed.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();
        if candidates.len() == 1 {
            Ok(candidates.remove(0))
        } else {
            Err(DomainError::AmbiguousRoot { candidates })
        }
    }

    pub fn into_tree(self) -> TreeResult<OrgTree> {
        let root = self.root_id()?;
        OrgTree::from_records(self.nodes, &root)
    }
}

/// Reads chart documents through the filesystem boundary.
pub struct ChartLoader {
    fs: Arc<dyn FileSystem>,
}

impl ChartLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load_document(&self, path: &Path) -> ApplicationResult<ChartDocument> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::ChartNotFound(path.to_path_buf()));
        }
        if !self.fs.is_file(path) {
            return Err(ApplicationError::InvalidChart {
                path: path.to_path_buf(),
                message: "not a regular file".to_string(),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read chart", path)?;
        let document =
            ChartDocument::from_toml(&content).map_err(|e| ApplicationError::InvalidChart {
                path: path.to_path_buf(),
                message: e.message().to_string(),
            })?;
        debug!("loaded {} nodes from {}", document.nodes.len(), path.display());
        Ok(document)
    }

    /// Load and validate a chart.
    pub fn load(&self, path: &Path) -> ApplicationResult<OrgTree> {
        let document = self.load_document(path)?;
        Ok(document.into_tree()?)
    }
}
