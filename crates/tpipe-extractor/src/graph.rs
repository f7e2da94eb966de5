//! Sentence dependency graphs
//!
//! One directed multigraph per sentence: nodes are tokens, each token has
//! one edge pointing at its syntactic head, labelled with the dependency.
//! An undirected mirror of the same graph answers distance queries.
//!
//! Graphs are built through `SentenceGraphBuilder`; only a finished
//! `SentenceGraph` can be queried.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::dijkstra;
use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use petgraph::visit::{Bfs, EdgeRef, Reversed};
use serde::{Deserialize, Serialize};

use tpipe_core::{DependencyClass, EdgeRecord, Result, TpipeError};

/// Token attributes carried by a graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenNode {
    pub id: usize,
    pub seq: usize,
    pub text: String,
    pub lemma: String,
    pub pos: String,
}

/// Dependency carried by a graph edge (dependent -> head)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub label: String,
    pub class: DependencyClass,
}

/// Accumulates the tokens of one sentence
#[derive(Debug)]
pub struct SentenceGraphBuilder {
    sentence: usize,
    graph: DiGraph<TokenNode, DependencyEdge>,
    index_map: HashMap<usize, NodeIndex>,
    pending: Vec<(usize, usize, DependencyEdge)>,
}

impl SentenceGraphBuilder {
    /// Start a graph for the given sentence index
    pub fn new(sentence: usize) -> Self {
        Self {
            sentence,
            graph: DiGraph::new(),
            index_map: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Add a token node and queue its edge to the head.
    ///
    /// Re-adding a known token identity keeps the attributes recorded first.
    pub fn add_record(&mut self, record: &EdgeRecord) -> NodeIndex {
        let idx = match self.index_map.get(&record.token.id) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(TokenNode {
                    id: record.token.id,
                    seq: record.seq,
                    text: record.token.text.clone(),
                    lemma: record.token.lemma.clone(),
                    pos: record.token.pos.clone(),
                });
                self.index_map.insert(record.token.id, idx);
                idx
            }
        };

        self.pending.push((
            record.token.id,
            record.head.id,
            DependencyEdge {
                label: record.dep.clone(),
                class: record.class,
            },
        ));

        idx
    }

    /// Wire up the queued edges and derive the undirected mirror
    pub fn finish(mut self) -> Result<SentenceGraph> {
        for (dependent, head, edge) in std::mem::take(&mut self.pending) {
            let from = self.index_map[&dependent];
            let to = *self.index_map.get(&head).ok_or_else(|| {
                TpipeError::MalformedInput(format!(
                    "sentence {}: head offset {head} of token {dependent} is not a token of the sentence",
                    self.sentence
                ))
            })?;
            self.graph.add_edge(from, to, edge);
        }

        let mut mirror: UnGraph<(), ()> =
            UnGraph::with_capacity(self.graph.node_count(), self.graph.edge_count());
        for node in self.graph.node_indices() {
            let added = mirror.add_node(());
            debug_assert_eq!(added, node);
        }
        for edge in self.graph.edge_references() {
            mirror.add_edge(edge.source(), edge.target(), ());
        }

        Ok(SentenceGraph {
            graph: self.graph,
            mirror,
            index_map: self.index_map,
        })
    }
}

/// A fully built sentence graph and its undirected mirror
#[derive(Debug, Clone)]
pub struct SentenceGraph {
    graph: DiGraph<TokenNode, DependencyEdge>,
    mirror: UnGraph<(), ()>,
    index_map: HashMap<usize, NodeIndex>,
}

impl SentenceGraph {
    /// Build a sentence graph from that sentence's edge records
    pub fn from_records(sentence: usize, records: &[EdgeRecord]) -> Result<Self> {
        let mut builder = SentenceGraphBuilder::new(sentence);
        for record in records {
            builder.add_record(record);
        }
        builder.finish()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn mirror_edge_count(&self) -> usize {
        self.mirror.edge_count()
    }

    /// Look up a token by identity
    pub fn node(&self, id: usize) -> Option<&TokenNode> {
        self.index_map.get(&id).map(|&idx| &self.graph[idx])
    }

    pub fn contains(&self, id: usize) -> bool {
        self.index_map.contains_key(&id)
    }

    /// Tokens in reading order
    pub fn tokens(&self) -> Vec<&TokenNode> {
        let mut tokens: Vec<&TokenNode> = self.graph.node_weights().collect();
        tokens.sort_by_key(|t| t.seq);
        tokens
    }

    /// All edges as (dependent id, head id, dependency)
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, &DependencyEdge)> + '_ {
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].id,
                self.graph[e.target()].id,
                e.weight(),
            )
        })
    }

    /// Every token from which `id` is reachable along dependency edges,
    /// plus `id` itself. `None` if `id` is not in the graph.
    pub fn closure(&self, id: usize) -> Option<BTreeSet<usize>> {
        let start = *self.index_map.get(&id)?;
        let reversed = Reversed(&self.graph);

        let mut closure = BTreeSet::new();
        let mut bfs = Bfs::new(reversed, start);
        while let Some(node) = bfs.next(reversed) {
            closure.insert(self.graph[node].id);
        }

        Some(closure)
    }

    /// Shortest path length between two tokens, ignoring edge direction.
    /// `None` if either token is unknown or they are disconnected.
    pub fn distance(&self, from: usize, to: usize) -> Option<usize> {
        let start = *self.index_map.get(&from)?;
        let goal = *self.index_map.get(&to)?;

        dijkstra(&self.mirror, start, Some(goal), |_| 1usize)
            .get(&goal)
            .copied()
    }

    /// Texts of the given tokens in reading order, single-space joined
    pub fn render(&self, ids: &BTreeSet<usize>) -> String {
        let mut parts: Vec<(usize, &str)> = ids
            .iter()
            .filter_map(|id| self.node(*id))
            .map(|node| (node.seq, node.text.as_str()))
            .collect();
        parts.sort_by_key(|(seq, _)| *seq);

        parts
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::flatten;
    use crate::fixtures::{cat_chased_mouse, document};

    fn cat_graph() -> SentenceGraph {
        let records = flatten(&cat_chased_mouse()).unwrap();
        SentenceGraph::from_records(0, &records).unwrap()
    }

    /// Offsets in "The cat chased the mouse ."
    const THE: usize = 0;
    const CAT: usize = 4;
    const CHASED: usize = 8;
    const THE2: usize = 15;
    const MOUSE: usize = 19;
    const PERIOD: usize = 25;

    #[test]
    fn test_every_token_is_a_node() {
        let graph = cat_graph();
        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.mirror_edge_count(), 6);
        assert_eq!(graph.node(CHASED).unwrap().lemma, "chase");
        assert!(!graph.contains(1));
    }

    #[test]
    fn test_edges_point_at_heads() {
        let graph = cat_graph();
        let cat_edge = graph.edges().find(|(from, ..)| *from == CAT).unwrap();
        assert_eq!(cat_edge.1, CHASED);
        assert_eq!(cat_edge.2.label, "nsubj");
        assert_eq!(cat_edge.2.class, DependencyClass::Subject);

        let root_edge = graph.edges().find(|(from, ..)| *from == CHASED).unwrap();
        assert_eq!(root_edge.1, CHASED);
    }

    #[test]
    fn test_readding_token_keeps_first_attributes() {
        let records = flatten(&cat_chased_mouse()).unwrap();
        let mut builder = SentenceGraphBuilder::new(0);
        for record in &records {
            builder.add_record(record);
        }

        let mut duplicate = records[1].clone();
        duplicate.token.text = "dog".to_string();
        let first = builder.add_record(&records[1]);
        let second = builder.add_record(&duplicate);
        assert_eq!(first, second);

        let graph = builder.finish().unwrap();
        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.node(CAT).unwrap().text, "cat");
        // Parallel edges between the same pair are kept
        assert_eq!(graph.edge_count(), 8);
    }

    #[test]
    fn test_closure_follows_dependents() {
        let graph = cat_graph();

        let subject = graph.closure(CAT).unwrap();
        assert_eq!(subject, BTreeSet::from([THE, CAT]));
        assert_eq!(graph.render(&subject), "The cat");

        let root = graph.closure(CHASED).unwrap();
        assert_eq!(root.len(), 6);
        assert_eq!(graph.render(&root), "The cat chased the mouse .");

        assert_eq!(graph.closure(PERIOD).unwrap(), BTreeSet::from([PERIOD]));
        assert!(graph.closure(999).is_none());
    }

    #[test]
    fn test_distance_ignores_direction() {
        let graph = cat_graph();
        assert_eq!(graph.distance(CHASED, CHASED), Some(0));
        assert_eq!(graph.distance(CAT, CHASED), Some(1));
        assert_eq!(graph.distance(THE, CHASED), Some(2));
        assert_eq!(graph.distance(THE, THE2), Some(4));
        assert_eq!(graph.distance(MOUSE, 999), None);
    }

    #[test]
    fn test_disconnected_tokens_have_no_distance() {
        // "away" governs itself without being the root
        let doc = document(&[&[
            ("Run", "run", "VERB", "ROOT", 0),
            ("away", "away", "ADV", "advmod", 1),
        ]]);
        let records = flatten(&doc).unwrap();
        let graph = SentenceGraph::from_records(0, &records).unwrap();

        assert_eq!(graph.distance(4, 0), None);
        assert_eq!(graph.closure(0).unwrap(), BTreeSet::from([0]));
    }

    #[test]
    fn test_unknown_head_fails_to_build() {
        let mut records = flatten(&cat_chased_mouse()).unwrap();
        records[0].head.id = 77;

        let err = SentenceGraph::from_records(0, &records).unwrap_err();
        assert!(matches!(err, TpipeError::MalformedInput(_)));
    }

    #[test]
    fn test_tokens_in_reading_order() {
        let graph = cat_graph();
        let texts: Vec<&str> = graph.tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["The", "cat", "chased", "the", "mouse", "."]);
    }
}
