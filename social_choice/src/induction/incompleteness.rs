use log::debug;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::ballot_box::BallotBox;
use crate::config::*;
use crate::graph::PreferenceGraph;
use crate::induction::WeightTable;
use crate::ranking::Ranking;
use crate::rng::InductionRng;
use crate::Candidate;

/// Extends an acyclic preference graph so that it covers all the candidates.
///
/// The result is always acyclic and contains every candidate. The strategies that
/// go through a ranking also connect the candidates that were not comparable in
/// the input graph.
#[derive(Debug, Clone)]
pub enum IncompletenessResolver<C> {
    /// Inserts each missing candidate at a random position of the current order.
    PlaceRandomly,
    /// The missing candidates become a tied group above everyone else.
    AddAllAtBeginning,
    /// The missing candidates become a tied group below everyone else.
    AddAllAtEnd,
    /// Connects the unconnected pairs in a random order, without creating cycles.
    AddRandomEdges,
    /// Connects the unconnected pairs by decreasing weight, without creating cycles.
    AddEdgesByWinRatio(Arc<WeightTable<C>>),
}

impl<C: Candidate> IncompletenessResolver<C> {
    pub fn strategy(&self) -> IncompletenessStrategy {
        match self {
            IncompletenessResolver::PlaceRandomly => IncompletenessStrategy::PlaceRandomly,
            IncompletenessResolver::AddAllAtBeginning => IncompletenessStrategy::AddAllAtBeginning,
            IncompletenessResolver::AddAllAtEnd => IncompletenessStrategy::AddAllAtEnd,
            IncompletenessResolver::AddRandomEdges => IncompletenessStrategy::AddRandomEdges,
            IncompletenessResolver::AddEdgesByWinRatio(_) => {
                IncompletenessStrategy::AddEdgesByWinRatio
            }
        }
    }

    /// Panics if the input graph has a cycle.
    pub fn resolve(
        &self,
        graph: &PreferenceGraph<C>,
        candidates: &BTreeSet<C>,
        rng: &mut InductionRng,
    ) -> PreferenceGraph<C> {
        let order: Vec<C> = match graph.topological_sort() {
            Some(order) => order,
            None => panic!(
                "{:?}: the input graph has a cycle: {:?}",
                self.strategy(),
                graph.find_cycle()
            ),
        };
        let missing: Vec<C> = candidates
            .iter()
            .filter(|c| !graph.contains_node(c))
            .cloned()
            .collect();
        debug!("{:?}: missing candidates {:?}", self.strategy(), missing);

        let res = match self {
            IncompletenessResolver::PlaceRandomly => {
                let mut order = order;
                for c in missing {
                    let idx = rng.choose_index(order.len() + 1).unwrap_or(0);
                    order.insert(idx, c);
                }
                Ranking::strict(order).to_graph()
            }
            IncompletenessResolver::AddAllAtBeginning => {
                let mut slots: Vec<Vec<C>> = Vec::new();
                if !missing.is_empty() {
                    slots.push(missing);
                }
                slots.extend(order.into_iter().map(|c| vec![c]));
                Ranking::new(slots).to_graph()
            }
            IncompletenessResolver::AddAllAtEnd => {
                let mut slots: Vec<Vec<C>> = order.into_iter().map(|c| vec![c]).collect();
                if !missing.is_empty() {
                    slots.push(missing);
                }
                Ranking::new(slots).to_graph()
            }
            IncompletenessResolver::AddRandomEdges => {
                let mut g = graph.clone();
                for c in missing {
                    g.add_node(c);
                }
                let mut pairs = ordered_pairs(&g.nodes());
                rng.shuffle(&mut pairs);
                connect_pairs(&mut g, pairs);
                g
            }
            IncompletenessResolver::AddEdgesByWinRatio(weights) => {
                let mut g = graph.clone();
                for c in missing {
                    g.add_node(c);
                }
                let mut pairs = ordered_pairs(&g.nodes());
                weights.sort_by_weight(&mut pairs);
                connect_pairs(&mut g, pairs);
                g
            }
        };

        assert!(
            candidates.iter().all(|c| res.contains_node(c)),
            "{:?} did not place every candidate",
            self.strategy()
        );
        assert!(res.is_acyclic(), "{:?} created a cycle", self.strategy());
        res
    }
}

fn ordered_pairs<C: Candidate>(nodes: &[C]) -> Vec<(C, C)> {
    let mut res: Vec<(C, C)> = Vec::with_capacity(nodes.len() * nodes.len());
    for u in nodes {
        for v in nodes {
            if u != v {
                res.push((u.clone(), v.clone()));
            }
        }
    }
    res
}

// Adds the edges between unconnected candidates, in order, unless they close a cycle.
fn connect_pairs<C: Candidate>(g: &mut PreferenceGraph<C>, pairs: Vec<(C, C)>) {
    for (u, v) in pairs {
        if g.contains_edge(&u, &v) || g.contains_edge(&v, &u) {
            continue;
        }
        g.add_edge_if_acyclic(u, v, ());
    }
}

/// Creates incompleteness resolvers from the votes of a reference ballot box.
#[derive(Debug, Clone)]
pub struct IncompletenessResolverFactory<C> {
    weights: Arc<WeightTable<C>>,
}

impl<C: Candidate> IncompletenessResolverFactory<C> {
    pub fn new<B: BallotBox<C> + ?Sized>(ballot_box: &B) -> IncompletenessResolverFactory<C> {
        IncompletenessResolverFactory {
            weights: Arc::new(WeightTable::from_matchup_graph(&ballot_box.matchup_graph())),
        }
    }

    pub fn weights(&self) -> &WeightTable<C> {
        &self.weights
    }

    pub fn make_place_randomly(&self) -> IncompletenessResolver<C> {
        IncompletenessResolver::PlaceRandomly
    }

    pub fn make_add_all_at_beginning(&self) -> IncompletenessResolver<C> {
        IncompletenessResolver::AddAllAtBeginning
    }

    pub fn make_add_all_at_end(&self) -> IncompletenessResolver<C> {
        IncompletenessResolver::AddAllAtEnd
    }

    pub fn make_add_random_edges(&self) -> IncompletenessResolver<C> {
        IncompletenessResolver::AddRandomEdges
    }

    pub fn make_add_edges_by_win_ratio(&self) -> IncompletenessResolver<C> {
        IncompletenessResolver::AddEdgesByWinRatio(self.weights.clone())
    }

    pub fn make(&self, strategy: IncompletenessStrategy) -> IncompletenessResolver<C> {
        match strategy {
            IncompletenessStrategy::PlaceRandomly => self.make_place_randomly(),
            IncompletenessStrategy::AddAllAtBeginning => self.make_add_all_at_beginning(),
            IncompletenessStrategy::AddAllAtEnd => self.make_add_all_at_end(),
            IncompletenessStrategy::AddRandomEdges => self.make_add_random_edges(),
            IncompletenessStrategy::AddEdgesByWinRatio => self.make_add_edges_by_win_ratio(),
        }
    }
}
