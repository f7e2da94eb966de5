//! Constituent selection
//!
//! Picks, per sentence, the subject and the object structurally closest to
//! the root, and renders the phrase each one governs.
//!
//! Eligibility checks the candidate's *head* against the root's dependent
//! closure, not the candidate itself, so a subject or object attached
//! anywhere along the root's dependency chain qualifies.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use tpipe_core::{DependencyClass, EdgeRecord};

use crate::graph::SentenceGraph;
use crate::root::RootRecord;

/// Which grammatical role a constituent fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstituentKind {
    Subject,
    Object,
}

impl ConstituentKind {
    /// The constituent kind a dependency class anchors, if any
    pub fn from_class(class: DependencyClass) -> Option<Self> {
        match class {
            DependencyClass::Subject => Some(Self::Subject),
            DependencyClass::Object => Some(Self::Object),
            DependencyClass::Root | DependencyClass::Other => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for ConstituentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A selected subject or object and the phrase it governs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstituentRecord {
    pub kind: ConstituentKind,

    /// Identity of the anchor token
    pub anchor_id: usize,

    /// Position of the anchor token within the sentence
    pub anchor_seq: usize,

    /// Undirected path length from the anchor to the root
    pub distance: usize,

    /// Anchor plus every token that depends on it, directly or transitively
    pub closure: BTreeSet<usize>,

    /// Closure texts in reading order
    pub text: String,
}

/// Subject and object chosen for one sentence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub subject: Option<ConstituentRecord>,
    pub object: Option<ConstituentRecord>,

    /// Subject or object tokens with no path to the root
    pub unreachable: usize,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: usize,
    seq: usize,
    distance: usize,
}

/// Select the most central subject and object of a sentence.
///
/// Records are visited in stream order and a candidate only displaces the
/// current best when strictly closer to the root, so among equally close
/// candidates the earliest one is kept.
pub fn select_constituents(
    graph: &SentenceGraph,
    root: &RootRecord,
    records: &[EdgeRecord],
) -> Selection {
    let mut selection = Selection::default();

    let Some(root_closure) = graph.closure(root.token_id) else {
        return selection;
    };

    let mut best_subject: Option<Candidate> = None;
    let mut best_object: Option<Candidate> = None;

    for record in records {
        let Some(kind) = ConstituentKind::from_class(record.class) else {
            continue;
        };

        let Some(distance) = graph.distance(record.token.id, root.token_id) else {
            tracing::debug!(
                "Sentence {}: {} candidate {:?} cannot reach the root",
                record.sentence,
                kind,
                record.token.text
            );
            selection.unreachable += 1;
            continue;
        };
        if !root_closure.contains(&record.head.id) {
            continue;
        }

        let best = match kind {
            ConstituentKind::Subject => &mut best_subject,
            ConstituentKind::Object => &mut best_object,
        };
        if best.map_or(true, |current| distance < current.distance) {
            *best = Some(Candidate {
                id: record.token.id,
                seq: record.seq,
                distance,
            });
        }
    }

    selection.subject =
        best_subject.and_then(|c| build_record(graph, ConstituentKind::Subject, c));
    selection.object = best_object.and_then(|c| build_record(graph, ConstituentKind::Object, c));
    selection
}

fn build_record(
    graph: &SentenceGraph,
    kind: ConstituentKind,
    candidate: Candidate,
) -> Option<ConstituentRecord> {
    let closure = graph.closure(candidate.id)?;
    let text = graph.render(&closure);

    Some(ConstituentRecord {
        kind,
        anchor_id: candidate.id,
        anchor_seq: candidate.seq,
        distance: candidate.distance,
        closure,
        text,
    })
}
