// SPDX-License-Identifier: MIT OR Apache-2.0
//! Diagram documents on disk.
//!
//! A document holds the model configuration, the model itself and an
//! optional node to select on mount. It is stored as RON or JSON, chosen
//! by file extension.

use crate::error::{AppError, Result};
use diagram_bridge_graph::{DiagramModel, Key, ModelConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Storage format of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Rusty Object Notation
    Ron,
    /// JSON
    Json,
}

impl DocumentFormat {
    /// Pick the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("ron") => Ok(Self::Ron),
            Some("json") => Ok(Self::Json),
            _ => Err(AppError::Format(path.to_path_buf())),
        }
    }
}

/// A diagram document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramDocument {
    /// Property names and link keying
    pub config: ModelConfig,
    /// The declarative model
    pub model: DiagramModel,
    /// Node to select once mounted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Key>,
}

impl DiagramDocument {
    /// Parse a document
    pub fn parse(content: &str, format: DocumentFormat) -> Result<Self> {
        let document = match format {
            DocumentFormat::Ron => ron::from_str(content)?,
            DocumentFormat::Json => serde_json::from_str(content)?,
        };
        Ok(document)
    }

    /// Serialize a document
    pub fn render(&self, format: DocumentFormat) -> Result<String> {
        let content = match format {
            DocumentFormat::Ron => {
                let config = ron::ser::PrettyConfig::default().enumerate_arrays(false);
                ron::ser::to_string_pretty(self, config)?
            }
            DocumentFormat::Json => serde_json::to_string_pretty(self)?,
        };
        Ok(content)
    }

    /// Load a document from a file
    pub fn load(path: &Path) -> Result<Self> {
        let format = DocumentFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let document = Self::parse(&content, format)?;
        tracing::debug!(
            path = %path.display(),
            nodes = document.model.nodes.len(),
            links = document.model.links.len(),
            "document loaded"
        );
        Ok(document)
    }

    /// Save a document to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.render(DocumentFormat::from_path(path)?)?;
        std::fs::write(path, content)?;
        tracing::info!(path = %path.display(), "document saved");
        Ok(())
    }
}
