//! End-to-end extraction over annotator JSON and generated documents

use std::collections::BTreeSet;

use proptest::prelude::*;

use tpipe_core::{
    AnnotatedDocument, AnnotatedSentence, AnnotatedToken, DependencyClass, ExtractionConfig,
};
use tpipe_extractor::{ParsedText, SentenceAnalysis, StructureExtractor};

const CAT_JSON: &str = r#"{"sentences": [{"tokens": [
    {"text": "The",    "lemma": "the",   "seq": 0, "idx": 0,  "pos": "DET",   "dep": "det",   "head": 4},
    {"text": "cat",    "lemma": "cat",   "seq": 1, "idx": 4,  "pos": "NOUN",  "dep": "nsubj", "head": 8},
    {"text": "chased", "lemma": "chase", "seq": 2, "idx": 8,  "pos": "VERB",  "dep": "ROOT",  "head": 8},
    {"text": "the",    "lemma": "the",   "seq": 3, "idx": 15, "pos": "DET",   "dep": "det",   "head": 19},
    {"text": "mouse",  "lemma": "mouse", "seq": 4, "idx": 19, "pos": "NOUN",  "dep": "dobj",  "head": 8},
    {"text": ".",      "lemma": ".",     "seq": 5, "idx": 24, "pos": "PUNCT", "dep": "punct", "head": 8}
]}]}"#;

/// Build one sentence from (text, dep, head position) triples
fn sentence(offset: &mut usize, rows: &[(&str, &str, usize)]) -> AnnotatedSentence {
    let offsets: Vec<usize> = rows
        .iter()
        .map(|(text, ..)| {
            let start = *offset;
            *offset += text.len() + 1;
            start
        })
        .collect();

    let tokens = rows
        .iter()
        .enumerate()
        .map(|(seq, (text, dep, head))| AnnotatedToken {
            text: text.to_string(),
            lemma: text.to_lowercase(),
            seq,
            idx: offsets[seq],
            pos: "X".to_string(),
            dep: dep.to_string(),
            head: offsets[*head],
        })
        .collect();

    AnnotatedSentence { tokens }
}

fn extract(doc: &AnnotatedDocument) -> ParsedText {
    StructureExtractor::default().extract(doc).unwrap()
}

#[test]
fn test_cat_chased_mouse_from_json() {
    let doc = AnnotatedDocument::from_json(CAT_JSON).unwrap();
    let parsed = extract(&doc);
    let summary = &parsed.summaries()[0];

    assert_eq!(summary.root_lemma.as_deref(), Some("chase"));
    assert_eq!(summary.subject_text.as_deref(), Some("The cat"));
    assert_eq!(summary.object_text.as_deref(), Some("the mouse"));
}

#[test]
fn test_closer_subject_wins() {
    // "boss" sits two hops from the root through "who", "dog" one hop
    let mut offset = 0;
    let doc = AnnotatedDocument {
        sentences: vec![sentence(
            &mut offset,
            &[
                ("boss", "nsubj", 1),
                ("who", "advcl", 3),
                ("dog", "nsubj", 3),
                ("barked", "ROOT", 3),
            ],
        )],
    };

    let subject = extract(&doc).sentence(0).unwrap().subject.clone().unwrap();
    assert_eq!(subject.anchor_seq, 2);
    assert_eq!(subject.distance, 1);
}

#[test]
fn test_equidistant_subjects_keep_earliest() {
    let mut offset = 0;
    let doc = AnnotatedDocument {
        sentences: vec![sentence(
            &mut offset,
            &[
                ("so", "advmod", 4),
                ("then", "advmod", 4),
                ("well", "advmod", 4),
                ("Ann", "nsubj", 4),
                ("said", "ROOT", 4),
                ("Bob", "nsubj", 4),
            ],
        )],
    };

    let subject = extract(&doc).sentence(0).unwrap().subject.clone().unwrap();
    assert_eq!(subject.anchor_seq, 3);
    assert_eq!(subject.text, "Ann");
}

#[test]
fn test_no_root_yields_nothing() {
    let mut offset = 0;
    let doc = AnnotatedDocument {
        sentences: vec![sentence(
            &mut offset,
            &[("cats", "nsubj", 1), ("everywhere", "advmod", 1)],
        )],
    };

    let parsed = extract(&doc);
    let analysis = parsed.sentence(0).unwrap();
    assert!(analysis.root.is_none());
    assert!(analysis.subject.is_none());
    assert_eq!(parsed.stats.sentences_without_root, 1);
}

/// Tokens connected to `start` when edge direction is ignored
fn mirror_component(analysis: &SentenceAnalysis, start: usize) -> BTreeSet<usize> {
    let mut component = BTreeSet::from([start]);
    loop {
        let before = component.len();
        for edge in &analysis.edges {
            if component.contains(&edge.token.id) || component.contains(&edge.head.id) {
                component.insert(edge.token.id);
                component.insert(edge.head.id);
            }
        }
        if component.len() == before {
            return component;
        }
    }
}

const WORDS: [&str; 6] = ["alpha", "beta", "gamma", "delta", "eps", "zeta"];
const LABELS: [&str; 8] = [
    "ROOT", "nsubj", "nsubjpass", "dobj", "pobj", "det", "amod", "punct",
];

/// Random sentences of arbitrary head structure, cycles included
fn arb_document() -> impl Strategy<Value = AnnotatedDocument> {
    let token = (0..WORDS.len(), 0..LABELS.len(), any::<prop::sample::Index>());
    let tokens = prop::collection::vec(token, 1..8);

    prop::collection::vec(tokens, 0..5).prop_map(|sentences| {
        let mut offset = 0;
        let sentences = sentences
            .into_iter()
            .map(|tokens| {
                let rows: Vec<(&str, &str, usize)> = tokens
                    .iter()
                    .map(|(w, l, head)| (WORDS[*w], LABELS[*l], head.index(tokens.len())))
                    .collect();
                sentence(&mut offset, &rows)
            })
            .collect();
        AnnotatedDocument { sentences }
    })
}

proptest! {
    #[test]
    fn prop_extraction_is_idempotent(doc in arb_document()) {
        let first = serde_json::to_value(extract(&doc)).unwrap();
        let second = serde_json::to_value(extract(&doc)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_parallel_matches_sequential(doc in arb_document()) {
        let parallel = StructureExtractor::new(ExtractionConfig {
            parallel: true,
            min_parallel_sentences: 0,
        })
        .extract(&doc)
        .unwrap();

        prop_assert_eq!(
            serde_json::to_value(extract(&doc)).unwrap(),
            serde_json::to_value(parallel).unwrap()
        );
    }

    #[test]
    fn prop_root_is_a_root_labelled_token(doc in arb_document()) {
        let parsed = extract(&doc);

        for analysis in parsed.sentences.values() {
            if let Some(root) = &analysis.root {
                let edge = &analysis.edges[root.seq];
                prop_assert_eq!(edge.class, DependencyClass::Root);
                prop_assert_eq!(edge.token.id, root.token_id);
                prop_assert_eq!(analysis.graph.distance(root.token_id, root.token_id), Some(0));

                let component = mirror_component(analysis, root.token_id);
                for edge in &analysis.edges {
                    let id = edge.token.id;
                    let distance = analysis.graph.distance(id, root.token_id);
                    if !component.contains(&id) {
                        prop_assert_eq!(distance, None);
                    } else if id == root.token_id {
                        prop_assert_eq!(distance, Some(0));
                    } else {
                        prop_assert!(matches!(distance, Some(d) if d >= 1));
                    }
                }
            } else {
                prop_assert_eq!(analysis.root_claims, 0);
            }
        }
    }

    #[test]
    fn prop_constituent_text_is_ordered_subsequence(doc in arb_document()) {
        let parsed = extract(&doc);

        for analysis in parsed.sentences.values() {
            for record in analysis.subject.iter().chain(analysis.object.iter()) {
                prop_assert!(record.closure.contains(&record.anchor_id));

                let mut expected: Vec<(usize, &str)> = analysis
                    .edges
                    .iter()
                    .filter(|e| record.closure.contains(&e.token.id))
                    .map(|e| (e.seq, e.token.text.as_str()))
                    .collect();
                expected.sort();
                let expected: Vec<&str> = expected.into_iter().map(|(_, t)| t).collect();
                prop_assert_eq!(&record.text, &expected.join(" "));

                let anchor_text = &analysis.edges[record.anchor_seq].token.text;
                prop_assert!(record.text.split(' ').any(|w| w == anchor_text.as_str()));
            }
        }
    }

    #[test]
    fn prop_selected_subject_is_most_central(doc in arb_document()) {
        let parsed = extract(&doc);

        for analysis in parsed.sentences.values() {
            let (Some(root), Some(subject)) = (&analysis.root, &analysis.subject) else {
                continue;
            };
            let root_closure = analysis.graph.closure(root.token_id).unwrap();

            for edge in &analysis.edges {
                if edge.class != DependencyClass::Subject || !root_closure.contains(&edge.head.id) {
                    continue;
                }
                if let Some(d) = analysis.graph.distance(edge.token.id, root.token_id) {
                    prop_assert!(subject.distance <= d);
                    if d == subject.distance {
                        prop_assert!(subject.anchor_seq <= edge.seq);
                    }
                }
            }
        }
    }
}
