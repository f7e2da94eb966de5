//! tpipe Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the tpipe system:
//! - Dependency classes recognised from annotator labels
//! - Token and edge records flowing out of the token stream adapter
//! - Annotator output models and the `Annotator` trait
//! - Common error types
//! - Configuration management

pub mod annotation;
pub mod config;

pub use annotation::{
    AnnotatedDocument, AnnotatedSentence, AnnotatedToken, Annotator, JsonAnnotations,
};
pub use config::{AppConfig, ConfigError, ExtractionConfig, LoggingConfig, SegmentationConfig};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for tpipe operations
#[derive(Error, Debug)]
pub enum TpipeError {
    #[error("Malformed annotator output: {0}")]
    MalformedInput(String),

    #[error("Annotator error: {0}")]
    Annotator(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for TpipeError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TpipeError>;

// ============================================================================
// Dependency Classes
// ============================================================================

/// Dependency label marking a sentence's grammatical root
pub const ROOT_LABEL: &str = "ROOT";

/// Dependency labels treated as grammatical subjects
pub const SUBJECT_LABELS: [&str; 2] = ["nsubj", "nsubjpass"];

/// Dependency labels treated as grammatical objects
pub const OBJECT_LABELS: [&str; 2] = ["dobj", "pobj"];

/// Closed set of dependency classes the extractor cares about.
///
/// Labels are classified once, when annotator output enters the system;
/// everything downstream matches on this enum instead of comparing strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyClass {
    Root,
    Subject,
    Object,
    Other,
}

impl DependencyClass {
    /// Classify a raw dependency label
    pub fn from_label(label: &str) -> Self {
        if label == ROOT_LABEL {
            Self::Root
        } else if SUBJECT_LABELS.contains(&label) {
            Self::Subject
        } else if OBJECT_LABELS.contains(&label) {
            Self::Object
        } else {
            Self::Other
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Subject => "subject",
            Self::Object => "object",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for DependencyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Token Stream Records
// ============================================================================

/// Identity and surface attributes of one token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRef {
    /// Document-absolute character offset, unique per token
    pub id: usize,

    /// Surface text
    pub text: String,

    /// Lemma
    pub lemma: String,

    /// Coarse part-of-speech tag
    pub pos: String,
}

impl TokenRef {
    /// Create a new token reference
    pub fn new(
        id: usize,
        text: impl Into<String>,
        lemma: impl Into<String>,
        pos: impl Into<String>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            lemma: lemma.into(),
            pos: pos.into(),
        }
    }
}

/// One (token, head) edge of the flattened token stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Sentence index within the document
    pub sentence: usize,

    /// 0-based position within the sentence
    pub seq: usize,

    /// The dependent token
    pub token: TokenRef,

    /// Raw dependency label as emitted by the annotator
    pub dep: String,

    /// Dependency class recognised from `dep`
    pub class: DependencyClass,

    /// The token's syntactic head
    pub head: TokenRef,
}

impl EdgeRecord {
    /// Whether the token is its own head
    pub fn is_self_governing(&self) -> bool {
        self.token.id == self.head.id
    }
}

// ============================================================================
// Tests
// ============================================================================
