//! tpipe Extractor - Structural metadata extraction
//!
//! Turns annotator output into a compact per-sentence summary: the
//! sentence root, its most central subject and object, and the full
//! phrases those tokens govern.
//!
//! Pipeline: token stream adapter -> sentence graph builder -> root
//! resolver -> constituent selector -> result assembler. Sentence
//! predicates read the adapter output directly.

pub mod adapter;
pub mod constituent;
pub mod document;
pub mod graph;
pub mod predicates;
pub mod root;

pub use adapter::{flatten, group_by_sentence};
pub use constituent::{select_constituents, ConstituentKind, ConstituentRecord, Selection};
pub use document::{
    analyze_sentence, root_links, ExtractionStats, ParsedText, RootLink, SentenceAnalysis,
    SentenceSummary, StructureExtractor,
};
pub use graph::{DependencyEdge, SentenceGraph, SentenceGraphBuilder, TokenNode};
pub use predicates::SentenceProfile;
pub use root::{resolve_root, RootRecord, RootResolution};
