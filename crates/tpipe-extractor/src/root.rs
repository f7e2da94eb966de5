//! Root resolution
//!
//! Finds the token labelled as the grammatical root of a sentence.

use serde::{Deserialize, Serialize};

use tpipe_core::{DependencyClass, EdgeRecord};

/// The root token of one sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootRecord {
    /// Position within the sentence
    pub seq: usize,

    /// Token identity
    pub token_id: usize,

    /// Lemma of the root token
    pub lemma: String,
}

/// Outcome of scanning one sentence for root claims
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootResolution {
    /// The resolved root, if any token claimed it
    pub root: Option<RootRecord>,

    /// Number of tokens labelled as root
    pub claims: usize,
}

impl RootResolution {
    /// More than one token claimed the root label
    pub fn is_ambiguous(&self) -> bool {
        self.claims > 1
    }
}

/// Resolve the root of a sentence from its records, in stream order.
///
/// When several tokens carry the root label the last one wins. This is
/// deterministic but signals unexpected annotator output, so each extra
/// claim is logged.
pub fn resolve_root(records: &[EdgeRecord]) -> RootResolution {
    let mut resolution = RootResolution::default();

    for record in records.iter().filter(|r| r.class == DependencyClass::Root) {
        resolution.claims += 1;

        if let Some(previous) = &resolution.root {
            tracing::warn!(
                "Sentence {}: root claimed by both {:?} (seq {}) and {:?} (seq {}), keeping the latter",
                record.sentence,
                previous.lemma,
                previous.seq,
                record.token.lemma,
                record.seq
            );
        }

        resolution.root = Some(RootRecord {
            seq: record.seq,
            token_id: record.token.id,
            lemma: record.token.lemma.clone(),
        });
    }

    resolution
}
