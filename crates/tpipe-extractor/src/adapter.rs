//! Token stream adapter
//!
//! Flattens annotator output into one `EdgeRecord` per token, in
//! (sentence, sequence) order. Downstream tie-breaks rely on this order.

use std::collections::HashMap;

use tpipe_core::{
    AnnotatedDocument, AnnotatedToken, DependencyClass, EdgeRecord, Result, TokenRef, TpipeError,
};

/// Flatten an annotated document into its edge records
pub fn flatten(doc: &AnnotatedDocument) -> Result<Vec<EdgeRecord>> {
    let mut records = Vec::with_capacity(doc.token_count());

    for (sentence, annotated) in doc.sentences.iter().enumerate() {
        let by_offset: HashMap<usize, &AnnotatedToken> =
            annotated.tokens.iter().map(|t| (t.idx, t)).collect();

        for (position, token) in annotated.tokens.iter().enumerate() {
            if token.seq != position {
                return Err(TpipeError::MalformedInput(format!(
                    "sentence {sentence}: token {:?} at position {position} carries sequence {}",
                    token.text, token.seq
                )));
            }

            let head = by_offset.get(&token.head).ok_or_else(|| {
                TpipeError::MalformedInput(format!(
                    "sentence {sentence}: token {:?} (offset {}) has head offset {} outside the sentence",
                    token.text, token.idx, token.head
                ))
            })?;

            records.push(EdgeRecord {
                sentence,
                seq: token.seq,
                token: token_ref(token),
                dep: token.dep.clone(),
                class: DependencyClass::from_label(&token.dep),
                head: token_ref(head),
            });
        }
    }

    Ok(records)
}

fn token_ref(token: &AnnotatedToken) -> TokenRef {
    TokenRef::new(token.idx, &token.text, &token.lemma, &token.pos)
}

/// Split a flat record stream into per-sentence runs, preserving order
pub fn group_by_sentence(records: Vec<EdgeRecord>) -> Vec<(usize, Vec<EdgeRecord>)> {
    let mut groups: Vec<(usize, Vec<EdgeRecord>)> = Vec::new();

    for record in records {
        match groups.last_mut() {
            Some((sentence, run)) if *sentence == record.sentence => run.push(record),
            _ => groups.push((record.sentence, vec![record])),
        }
    }

    groups
}
