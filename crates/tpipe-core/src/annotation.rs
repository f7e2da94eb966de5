//! Annotator output models
//!
//! The upstream annotator (tokenizer, tagger, dependency parser) is an
//! opaque capability. These types describe the shape of its output, and
//! the `Annotator` trait is the seam through which a live annotator is
//! plugged into the pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, TpipeError};

/// One annotated token as emitted by the annotator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    /// Surface text
    pub text: String,

    /// Lemma
    pub lemma: String,

    /// 0-based position within the sentence
    pub seq: usize,

    /// Document-absolute character offset (token identity)
    pub idx: usize,

    /// Coarse part-of-speech tag
    pub pos: String,

    /// Dependency label
    pub dep: String,

    /// Character offset of the head token
    pub head: usize,
}

/// One annotated sentence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedSentence {
    pub tokens: Vec<AnnotatedToken>,
}

/// Full annotator output for one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub sentences: Vec<AnnotatedSentence>,
}

impl AnnotatedDocument {
    /// Parse annotator output from JSON
    ///
    /// A token missing any required field is a fatal error for the
    /// whole document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TpipeError::MalformedInput(e.to_string()))
    }

    /// Load annotator output from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TpipeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Total number of tokens across all sentences
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }
}

/// Trait for linguistic annotators
pub trait Annotator: Send + Sync {
    /// Split text into sentences of tagged, dependency-parsed tokens
    fn annotate(&self, text: &str) -> Result<AnnotatedDocument>;

    /// Get annotator name for logging
    fn name(&self) -> &str;
}

/// Pre-computed annotator output loaded from disk.
///
/// Stands in for a live annotator: `annotate` returns the stored document
/// whatever text it is given.
#[derive(Debug, Clone)]
pub struct JsonAnnotations {
    document: AnnotatedDocument,
}

impl JsonAnnotations {
    pub fn new(document: AnnotatedDocument) -> Self {
        Self { document }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        AnnotatedDocument::from_file(path).map(Self::new)
    }

    pub fn document(&self) -> &AnnotatedDocument {
        &self.document
    }
}

impl Annotator for JsonAnnotations {
    fn annotate(&self, _text: &str) -> Result<AnnotatedDocument> {
        Ok(self.document.clone())
    }

    fn name(&self) -> &str {
        "json"
    }
}
