//! tpipe Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with defaults matching the stock HTML tag tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Structural and void HTML tags known to the segmenter
pub const ALL_HTML_TAGS: &[&str] = &[
    "a", "article", "aside", "b", "body", "button", "caption", "colgroup", "div", "figcaption",
    "figure", "footer", "g", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "html", "img",
    "li", "link", "main", "meta", "nav", "noscript", "ol", "p", "path", "picture", "script",
    "source", "span", "style", "svg", "table", "tbody", "thead", "tfoot", "th", "tr", "td", "time",
    "title", "ul", "code", "samp", "kbd", "hr",
];

/// Inline tags that never split text
pub const NON_BREAKING_HTML_TAGS: &[&str] = &[
    "a", "strong", "em", "b", "i", "u", "mark", "small", "sub", "sup", "var", "cite", "dfn",
    "abbr", "acronym", "time", "span", "br",
];

/// Tags whose whole subtree is skipped
pub const IGNORED_HTML_TAGS: &[&str] = &["script", "code", "meta", "nav"];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTML segmentation configuration
    pub segmentation: SegmentationConfig,

    /// Extraction pipeline configuration
    pub extraction: ExtractionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Segmentation
        if let Ok(tags) = std::env::var("TPIPE_BREAKING_TAGS") {
            config.segmentation.breaking_tags = parse_tag_list(&tags);
        }
        if let Ok(tags) = std::env::var("TPIPE_IGNORE_TAGS") {
            config.segmentation.ignore_tags = parse_tag_list(&tags);
        }

        // Extraction
        if let Ok(parallel) = std::env::var("TPIPE_PARALLEL") {
            config.extraction.parallel = parse_bool("TPIPE_PARALLEL", &parallel)?;
        }
        if let Ok(min) = std::env::var("TPIPE_MIN_PARALLEL_SENTENCES") {
            config.extraction.min_parallel_sentences =
                min.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "TPIPE_MIN_PARALLEL_SENTENCES".to_string(),
                    value: min,
                })?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_bool("LOG_JSON", &json)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.segmentation.breaking_tags != defaults.segmentation.breaking_tags {
            self.segmentation.breaking_tags = env_config.segmentation.breaking_tags;
        }
        if env_config.segmentation.ignore_tags != defaults.segmentation.ignore_tags {
            self.segmentation.ignore_tags = env_config.segmentation.ignore_tags;
        }
        if env_config.extraction.parallel != defaults.extraction.parallel {
            self.extraction.parallel = env_config.extraction.parallel;
        }
        if env_config.extraction.min_parallel_sentences
            != defaults.extraction.min_parallel_sentences
        {
            self.extraction.min_parallel_sentences = env_config.extraction.min_parallel_sentences;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format != defaults.logging.json_format {
            self.logging.json_format = env_config.logging.json_format;
        }

        Ok(self)
    }
}

fn parse_tag_list(value: &str) -> BTreeSet<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// HTML segmentation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Tags whose boundaries split the text into separate segments
    pub breaking_tags: BTreeSet<String>,

    /// Tags whose subtree contributes no text
    pub ignore_tags: BTreeSet<String>,
}

impl SegmentationConfig {
    /// Whether entering or leaving `tag` splits the text
    pub fn is_breaking(&self, tag: &str) -> bool {
        self.breaking_tags.contains(tag)
    }

    /// Whether the subtree under `tag` is skipped
    pub fn is_ignored(&self, tag: &str) -> bool {
        self.ignore_tags.contains(tag)
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        let breaking_tags = ALL_HTML_TAGS
            .iter()
            .filter(|tag| !NON_BREAKING_HTML_TAGS.contains(tag))
            .map(|tag| tag.to_string())
            .collect();

        Self {
            breaking_tags,
            ignore_tags: IGNORED_HTML_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Extraction pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Process sentences on the rayon thread pool
    pub parallel: bool,

    /// Documents with fewer sentences are always processed sequentially
    pub min_parallel_sentences: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            min_parallel_sentences: 64,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
