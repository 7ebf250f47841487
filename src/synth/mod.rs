//! Config synthesis: turning a changed source file into a unit document

mod translator;

pub use translator::Translator;

use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::units::{Document, Unit};

static INTERFACE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"eth\d+").expect("interface pattern is valid"));

#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid translator command: {0:?}")]
    InvalidCommand(String),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to collect output of {program}: {source}")]
    Output {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Translator failed for {token} ({status}): {output}")]
    Translator {
        token: String,
        status: String,
        output: String,
    },
}

/// Synthesis routines a watched path can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Gentoo-style /etc/conf.d/net, one .network unit per interface
    GentooNet,
}

impl Handler {
    pub fn name(&self) -> &'static str {
        match self {
            Handler::GentooNet => "gentoo-net",
        }
    }
}

/// Distinct `eth<N>` tokens in first-seen order
pub fn interface_tokens(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    INTERFACE_TOKEN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}

pub fn network_unit_name(token: &str) -> String {
    format!("50-{}.network", token)
}

#[derive(Debug, Clone)]
pub struct Synthesizer {
    translator: Translator,
}

impl Synthesizer {
    pub fn new(translator: Translator) -> Self {
        Self { translator }
    }

    pub async fn run(&self, handler: Handler, path: &Path) -> Result<Document, SynthError> {
        match handler {
            Handler::GentooNet => self.gentoo_net(path).await,
        }
    }

    /// Translate every interface mentioned in `path` into a network unit
    ///
    /// The translator runs once per distinct token. The first failure aborts
    /// and no partial document is returned.
    pub async fn gentoo_net(&self, path: &Path) -> Result<Document, SynthError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SynthError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;

        let mut document = Document::new();
        for token in interface_tokens(&text) {
            let content = self.translator.translate(&token, path).await.map_err(|e| {
                log::error!("Translation of {} from {} failed: {}", token, path.display(), e);
                e
            })?;
            document.push(Unit::new(network_unit_name(&token), content));
        }

        log::info!(
            "Synthesized {} unit(s) from {}",
            document.len(),
            path.display()
        );
        Ok(document)
    }
}
