//! tpipe Parser - Document parsing into annotator-ready text
//!
//! Supports parsing of:
//! - HTML pages, segmented at breaking element boundaries
//! - Plain text files, one segment per blank-line separated paragraph
//!
//! Each parser implements the `DocumentParser` trait and produces
//! a `ParsedDocument` whose segments are fed, one by one, to the
//! linguistic annotator.

pub mod html;

pub use html::{segment_html, HtmlParser};

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during document parsing
#[derive(Error, Debug)]
pub enum ParserError {
    /// File format is not supported
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// IO error while reading the file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Encoding error
    #[error("Text encoding error: {0}")]
    EncodingError(String),
}

pub type Result<T> = std::result::Result<T, ParserError>;

// ============================================================================
// Parsed Document Types
// ============================================================================

/// A run of text cut out of a document at breaking boundaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Tag of the element the text was collected under
    pub element_tag: String,

    /// XPath-like locator of that element
    pub location_path: String,

    /// Whitespace-trimmed text
    pub text: String,
}

impl Segment {
    /// Create a new segment
    pub fn new(
        element_tag: impl Into<String>,
        location_path: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            element_tag: element_tag.into(),
            location_path: location_path.into(),
            text: text.into(),
        }
    }
}

/// A document cut into segments
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Original file path
    pub file_path: String,

    /// Text segments in document order
    pub segments: Vec<Segment>,

    /// Document title, when the format carries one
    pub title: Option<String>,
}

impl ParsedDocument {
    pub fn new(file_path: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            file_path: file_path.into(),
            segments,
            title: None,
        }
    }
}

/// Supported file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Html,
    PlainText,
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "html" | "htm" | "xhtml" => Self::Html,
            "txt" => Self::PlainText,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Html => write!(f, "html"),
            Self::PlainText => write!(f, "text"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Parser Trait
// ============================================================================

/// Trait for document parsers
pub trait DocumentParser: Send + Sync {
    /// Parse a document from a file path
    fn parse(&self, path: &Path) -> Result<ParsedDocument>;

    /// Get supported file types
    fn supported_types(&self) -> &[FileType];

    /// Check if this parser can handle a file type
    fn can_parse(&self, file_type: FileType) -> bool {
        self.supported_types().contains(&file_type)
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => ParserError::EncodingError(path.display().to_string()),
        _ => ParserError::IoError {
            path: path.display().to_string(),
            source: e,
        },
    })
}

// ============================================================================
// Parser Registry
// ============================================================================

/// Registry of available parsers
pub struct ParserRegistry {
    parsers: Vec<Box<dyn DocumentParser>>,
}

impl ParserRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Create a registry with the HTML and plain text parsers registered
    pub fn with_defaults(segmentation: tpipe_core::SegmentationConfig) -> Self {
        let mut registry = Self::new();
        registry.register(HtmlParser::new(segmentation));
        registry.register(PlainTextParser);
        registry
    }

    /// Register a parser
    pub fn register<P: DocumentParser + 'static>(&mut self, parser: P) {
        self.parsers.push(Box::new(parser));
    }

    /// Find a parser for a file type
    pub fn find_parser(&self, file_type: FileType) -> Option<&dyn DocumentParser> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(file_type))
            .map(|p| p.as_ref())
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path) -> Result<ParsedDocument> {
        let file_type = FileType::from_path(path);

        if file_type == FileType::Unknown {
            return Err(ParserError::UnsupportedFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("none")
                    .to_string(),
            ));
        }

        let parser = self
            .find_parser(file_type)
            .ok_or_else(|| ParserError::UnsupportedFormat(file_type.to_string()))?;

        parser.parse(path)
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Plain Text Parser
// ============================================================================

/// Plain text parser; blank lines separate segments
pub struct PlainTextParser;

impl DocumentParser for PlainTextParser {
    fn parse(&self, path: &Path) -> Result<ParsedDocument> {
        let content = read_file(path)?;

        let segments = content
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| Segment::new("p", "", p.split_whitespace().collect::<Vec<_>>().join(" ")))
            .collect();

        Ok(ParsedDocument::new(path.display().to_string(), segments))
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::PlainText]
    }
}

// ============================================================================
// Tests
// ============================================================================
