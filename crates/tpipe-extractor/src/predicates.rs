//! Sentence classification predicates
//!
//! Order-insensitive scans over one sentence's token records, used to tag
//! sentences with structural metadata before more focused processing.

use serde::{Deserialize, Serialize};

use tpipe_core::{DependencyClass, EdgeRecord, OBJECT_LABELS, SUBJECT_LABELS};

const NOMINAL_TAGS: [&str; 3] = ["NOUN", "PROPN", "PRON"];
const VERB_TAGS: [&str; 1] = ["VERB"];
const ROOTED_VERB_TAGS: [&str; 2] = ["VERB", "AUX"];
const QUOTE_MARKS: [char; 6] = ['“', '”', '"', '‘', '’', '\''];

/// POS tags of tokens whose tag is in `tags`, in reading order
pub fn matching_pos<'a>(tokens: &'a [EdgeRecord], tags: &[&str]) -> Vec<&'a str> {
    tokens_with_pos(tokens, tags)
        .into_iter()
        .map(|t| t.token.pos.as_str())
        .collect()
}

/// Dependency labels of tokens whose label is in `labels`, in reading order
pub fn matching_dependencies<'a>(tokens: &'a [EdgeRecord], labels: &[&str]) -> Vec<&'a str> {
    tokens_with_dependency(tokens, labels)
        .into_iter()
        .map(|t| t.dep.as_str())
        .collect()
}

/// Tokens whose POS tag is in `tags`
pub fn tokens_with_pos<'a>(tokens: &'a [EdgeRecord], tags: &[&str]) -> Vec<&'a EdgeRecord> {
    tokens
        .iter()
        .filter(|t| tags.contains(&t.token.pos.as_str()))
        .collect()
}

/// Tokens whose dependency label is in `labels`
pub fn tokens_with_dependency<'a>(
    tokens: &'a [EdgeRecord],
    labels: &[&str],
) -> Vec<&'a EdgeRecord> {
    tokens
        .iter()
        .filter(|t| labels.contains(&t.dep.as_str()))
        .collect()
}

pub fn any_pos(tokens: &[EdgeRecord], tags: &[&str]) -> bool {
    tokens.iter().any(|t| tags.contains(&t.token.pos.as_str()))
}

pub fn all_pos(tokens: &[EdgeRecord], tags: &[&str]) -> bool {
    tokens.iter().all(|t| tags.contains(&t.token.pos.as_str()))
}

pub fn any_dependency(tokens: &[EdgeRecord], labels: &[&str]) -> bool {
    tokens.iter().any(|t| labels.contains(&t.dep.as_str()))
}

pub fn all_dependencies(tokens: &[EdgeRecord], labels: &[&str]) -> bool {
    tokens.iter().all(|t| labels.contains(&t.dep.as_str()))
}

/// Heuristic for a "proper" sentence: at least one nominal and one verb
pub fn is_sentence(tokens: &[EdgeRecord]) -> bool {
    any_pos(tokens, &NOMINAL_TAGS) && any_pos(tokens, &VERB_TAGS)
}

/// A root-labelled token tagged as a verb or auxiliary
pub fn contains_rooted_verb(tokens: &[EdgeRecord]) -> bool {
    tokens
        .iter()
        .filter(|t| t.class == DependencyClass::Root)
        .any(|t| ROOTED_VERB_TAGS.contains(&t.token.pos.as_str()))
}

pub fn contains_subject(tokens: &[EdgeRecord]) -> bool {
    any_dependency(tokens, &SUBJECT_LABELS)
}

pub fn contains_object(tokens: &[EdgeRecord]) -> bool {
    any_dependency(tokens, &OBJECT_LABELS)
}

pub fn contains_appos(tokens: &[EdgeRecord]) -> bool {
    any_dependency(tokens, &["appos"])
}

pub fn contains_pronoun(tokens: &[EdgeRecord]) -> bool {
    any_pos(tokens, &["PRON"])
}

/// The sentence's last visible character is a question mark
pub fn likely_question(tokens: &[EdgeRecord]) -> bool {
    tokens
        .iter()
        .rev()
        .map(|t| t.token.text.trim())
        .find(|text| !text.is_empty())
        .map_or(false, |text| text.ends_with('?'))
}

/// Some token carries a quote mark; apostrophes on particles ("'s") do not count
pub fn contains_quotes(tokens: &[EdgeRecord]) -> bool {
    tokens
        .iter()
        .filter(|t| t.token.pos != "PART")
        .any(|t| t.token.text.contains(&QUOTE_MARKS[..]))
}

/// All boolean predicates evaluated for one sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceProfile {
    pub sentence: usize,
    pub is_sentence: bool,
    pub rooted_verb: bool,
    pub subject: bool,
    pub object: bool,
    pub appos: bool,
    pub pronoun: bool,
    pub question: bool,
    pub quotes: bool,
}

impl SentenceProfile {
    /// Evaluate every predicate over a sentence's tokens
    pub fn from_tokens(sentence: usize, tokens: &[EdgeRecord]) -> Self {
        Self {
            sentence,
            is_sentence: is_sentence(tokens),
            rooted_verb: contains_rooted_verb(tokens),
            subject: contains_subject(tokens),
            object: contains_object(tokens),
            appos: contains_appos(tokens),
            pronoun: contains_pronoun(tokens),
            question: likely_question(tokens),
            quotes: contains_quotes(tokens),
        }
    }
}
