//! Result assembly
//!
//! Runs the per-sentence pipeline over a whole document and packages the
//! outcome: per-sentence root, subject and object records with their
//! graphs, the flat edge list, and document statistics.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use tpipe_core::{AnnotatedDocument, Annotator, EdgeRecord, ExtractionConfig, Result};

use crate::adapter::{flatten, group_by_sentence};
use crate::constituent::{select_constituents, ConstituentRecord, Selection};
use crate::graph::SentenceGraph;
use crate::predicates::SentenceProfile;
use crate::root::{resolve_root, RootRecord};

/// Everything extracted from one sentence
#[derive(Debug, Clone, Serialize)]
pub struct SentenceAnalysis {
    /// Sentence index within the document
    pub index: usize,

    /// The sentence's edge records in stream order
    pub edges: Vec<EdgeRecord>,

    pub root: Option<RootRecord>,
    pub subject: Option<ConstituentRecord>,
    pub object: Option<ConstituentRecord>,

    /// Number of tokens that claimed the root label
    pub root_claims: usize,

    /// Eligible candidates that could not reach the root
    pub unreachable_candidates: usize,

    /// Directed dependency graph, queryable in memory only
    #[serde(skip)]
    pub graph: SentenceGraph,
}

/// Build, resolve and select for a single sentence
pub fn analyze_sentence(index: usize, edges: Vec<EdgeRecord>) -> Result<SentenceAnalysis> {
    let graph = SentenceGraph::from_records(index, &edges)?;
    let resolution = resolve_root(&edges);

    let selection = match &resolution.root {
        Some(root) => select_constituents(&graph, root, &edges),
        None => {
            tracing::debug!("Sentence {}: no root, skipping selection", index);
            Selection::default()
        }
    };

    tracing::debug!(
        "Sentence {}: {} tokens, subject={:?}, object={:?}",
        index,
        edges.len(),
        selection.subject.as_ref().map(|s| s.text.as_str()),
        selection.object.as_ref().map(|o| o.text.as_str())
    );

    Ok(SentenceAnalysis {
        index,
        edges,
        root: resolution.root,
        subject: selection.subject,
        object: selection.object,
        root_claims: resolution.claims,
        unreachable_candidates: selection.unreachable,
        graph,
    })
}

/// Counters collected while extracting a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub sentences: usize,
    pub tokens: usize,
    pub sentences_without_root: usize,

    /// Sentences in which more than one token claimed the root label
    pub ambiguous_roots: usize,

    pub unreachable_candidates: usize,
    pub subjects_found: usize,
    pub objects_found: usize,
}

/// A token labelled as root, with its head
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootLink {
    pub sentence: usize,
    pub token_id: usize,
    pub text: String,
    pub lemma: String,
    pub dep: String,
    pub head_id: usize,
    pub head_text: String,
    pub head_lemma: String,
}

/// Root links for every record whose label is `root`, in any case
pub fn root_links(records: &[EdgeRecord]) -> Vec<RootLink> {
    records
        .iter()
        .filter(|r| r.dep.eq_ignore_ascii_case("root"))
        .map(|r| RootLink {
            sentence: r.sentence,
            token_id: r.token.id,
            text: r.token.text.clone(),
            lemma: r.token.lemma.clone(),
            dep: r.dep.clone(),
            head_id: r.head.id,
            head_text: r.head.text.clone(),
            head_lemma: r.head.lemma.clone(),
        })
        .collect()
}

/// Compact per-sentence view of the extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSummary {
    pub sentence: usize,
    pub root_lemma: Option<String>,
    pub root_seq: Option<usize>,
    pub subject_text: Option<String>,
    pub object_text: Option<String>,
}

/// Extraction result for a whole document
#[derive(Debug, Clone, Serialize)]
pub struct ParsedText {
    /// Per-sentence results keyed by sentence index
    pub sentences: BTreeMap<usize, SentenceAnalysis>,

    pub stats: ExtractionStats,
}

impl ParsedText {
    /// All edge records of the document in stream order
    pub fn edges(&self) -> impl Iterator<Item = &EdgeRecord> + '_ {
        self.sentences.values().flat_map(|s| s.edges.iter())
    }

    pub fn root_links(&self) -> Vec<RootLink> {
        let edges: Vec<EdgeRecord> = self.edges().cloned().collect();
        root_links(&edges)
    }

    pub fn summaries(&self) -> Vec<SentenceSummary> {
        self.sentences
            .values()
            .map(|s| SentenceSummary {
                sentence: s.index,
                root_lemma: s.root.as_ref().map(|r| r.lemma.clone()),
                root_seq: s.root.as_ref().map(|r| r.seq),
                subject_text: s.subject.as_ref().map(|c| c.text.clone()),
                object_text: s.object.as_ref().map(|c| c.text.clone()),
            })
            .collect()
    }

    /// Predicate profile of every sentence
    pub fn profiles(&self) -> Vec<SentenceProfile> {
        self.sentences
            .values()
            .map(|s| SentenceProfile::from_tokens(s.index, &s.edges))
            .collect()
    }

    pub fn sentence(&self, index: usize) -> Option<&SentenceAnalysis> {
        self.sentences.get(&index)
    }
}

/// Document-level driver for the extraction pipeline
#[derive(Debug, Clone, Default)]
pub struct StructureExtractor {
    config: ExtractionConfig,
}

impl StructureExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract structural metadata from annotator output
    pub fn extract(&self, doc: &AnnotatedDocument) -> Result<ParsedText> {
        let groups = group_by_sentence(flatten(doc)?);

        let parallel = self.config.parallel && groups.len() >= self.config.min_parallel_sentences;
        let analyses: Vec<SentenceAnalysis> = if parallel {
            tracing::debug!("Extracting {} sentences in parallel", groups.len());
            groups
                .into_par_iter()
                .map(|(index, edges)| analyze_sentence(index, edges))
                .collect::<Result<_>>()?
        } else {
            groups
                .into_iter()
                .map(|(index, edges)| analyze_sentence(index, edges))
                .collect::<Result<_>>()?
        };

        let mut stats = ExtractionStats {
            sentences: doc.sentences.len(),
            tokens: doc.token_count(),
            ..Default::default()
        };
        let mut sentences = BTreeMap::new();

        for analysis in analyses {
            if analysis.root_claims > 1 {
                stats.ambiguous_roots += 1;
            }
            stats.unreachable_candidates += analysis.unreachable_candidates;
            stats.subjects_found += usize::from(analysis.subject.is_some());
            stats.objects_found += usize::from(analysis.object.is_some());
            sentences.insert(analysis.index, analysis);
        }

        let rooted = sentences.values().filter(|s| s.root.is_some()).count();
        stats.sentences_without_root = stats.sentences - rooted;

        tracing::info!(
            "Extracted {} sentences ({} tokens): {} subjects, {} objects, {} without root",
            stats.sentences,
            stats.tokens,
            stats.subjects_found,
            stats.objects_found,
            stats.sentences_without_root
        );

        Ok(ParsedText { sentences, stats })
    }

    /// Annotate raw text, then extract
    pub fn extract_text(&self, annotator: &dyn Annotator, text: &str) -> Result<ParsedText> {
        tracing::debug!("Annotating {} chars with {}", text.len(), annotator.name());
        let doc = annotator.annotate(text)?;
        self.extract(&doc)
    }
}
