//! Declarative document handed to the deployment tool
//!
//! A document is an ordered list of units, stored on disk as YAML behind a
//! `#cloud-config` header. User data given to `unitwatch-deploy` may instead
//! be a shell script, recognised by its `#!` line.

use serde::{Deserialize, Serialize};

use super::Unit;

pub const DOCUMENT_HEADER: &str = "#cloud-config";

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Invalid document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Document is empty")]
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub units: Vec<Unit>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, unit: Unit) {
        self.units.push(unit);
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Render the on-disk form, header included
    pub fn to_yaml(&self) -> Result<String, DocumentError> {
        let body = serde_yaml::to_string(self)?;
        Ok(format!("{}\n{}", DOCUMENT_HEADER, body))
    }

    pub fn from_yaml(text: &str) -> Result<Self, DocumentError> {
        // The header is a YAML comment; a header-only file is an empty document
        let blank = text.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        });
        if blank {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Contents of a `--from-file` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserData {
    Config(Document),
    Script(String),
}

impl UserData {
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        if text.starts_with("#!") {
            return Ok(UserData::Script(text.to_string()));
        }
        if text.trim().is_empty() {
            return Err(DocumentError::Empty);
        }
        Ok(UserData::Config(Document::from_yaml(text)?))
    }
}
