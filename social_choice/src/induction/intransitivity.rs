use log::debug;

use std::sync::Arc;

use crate::ballot_box::BallotBox;
use crate::config::*;
use crate::graph::PreferenceGraph;
use crate::induction::WeightTable;
use crate::rng::InductionRng;
use crate::Candidate;

/// Builds an acyclic preference graph from the votes of one voter.
///
/// The graph has a node for every candidate mentioned in the votes, and an edge
/// winner -> loser for the decisive votes that were kept. Ties never create edges.
#[derive(Debug, Clone)]
pub enum IntransitivityResolver<C> {
    /// While there is a cycle, removes one of its edges at random.
    BreakRandomLink,
    /// While there is a cycle, removes its edge of lowest weight.
    BreakWeakestLink(Arc<WeightTable<C>>),
    /// Adds the votes by decreasing weight, skipping the ones that would close a cycle.
    AddEdgesInOrder(Arc<WeightTable<C>>),
}

fn vote_graph<C: Candidate>(votes: &[PairwiseVote<C>]) -> PreferenceGraph<C> {
    let mut g: PreferenceGraph<C> = PreferenceGraph::new();
    for v in votes {
        g.add_node(v.first.clone());
        g.add_node(v.second.clone());
    }
    g
}

impl<C: Candidate> IntransitivityResolver<C> {
    pub fn strategy(&self) -> IntransitivityStrategy {
        match self {
            IntransitivityResolver::BreakRandomLink => IntransitivityStrategy::BreakRandomLink,
            IntransitivityResolver::BreakWeakestLink(_) => IntransitivityStrategy::BreakWeakestLink,
            IntransitivityResolver::AddEdgesInOrder(_) => IntransitivityStrategy::AddEdgesInOrder,
        }
    }

    pub fn resolve(&self, votes: &[PairwiseVote<C>], rng: &mut InductionRng) -> PreferenceGraph<C> {
        let mut g = vote_graph(votes);
        let mut decisive: Vec<(C, C)> = votes.iter().filter_map(|v| v.winner_loser()).collect();
        match self {
            IntransitivityResolver::BreakRandomLink => {
                for (w, l) in decisive {
                    g.add_edge(w, l, ());
                }
                while let Some(cycle) = g.find_cycle() {
                    let idx = rng.choose_index(cycle.len()).unwrap_or(0);
                    let (u, v) = &cycle[idx];
                    debug!("break_random_link: removing {:?} -> {:?}", u, v);
                    g.remove_edge(u, v);
                }
            }
            IntransitivityResolver::BreakWeakestLink(weights) => {
                for (w, l) in decisive {
                    g.add_edge(w, l, ());
                }
                while let Some(cycle) = g.find_cycle() {
                    let weakest = cycle.iter().min_by(|(u1, v1), (u2, v2)| {
                        weights
                            .weight_or_zero(u1, v1)
                            .total_cmp(&weights.weight_or_zero(u2, v2))
                    });
                    if let Some((u, v)) = weakest {
                        debug!("break_weakest_link: removing {:?} -> {:?}", u, v);
                        g.remove_edge(u, v);
                    }
                }
            }
            IntransitivityResolver::AddEdgesInOrder(weights) => {
                weights.sort_by_weight(&mut decisive);
                for (w, l) in decisive {
                    g.add_edge_if_acyclic(w, l, ());
                }
            }
        }
        assert!(
            g.is_acyclic(),
            "{:?} left a cycle: {:?}",
            self.strategy(),
            g.find_cycle()
        );
        g
    }
}

/// Creates intransitivity resolvers from the votes of a reference ballot box.
///
/// The margins of the matchup graph are computed once, and shared by all the
/// resolvers made by this factory.
#[derive(Debug, Clone)]
pub struct IntransitivityResolverFactory<C> {
    weights: Arc<WeightTable<C>>,
}

impl<C: Candidate> IntransitivityResolverFactory<C> {
    pub fn new<B: BallotBox<C> + ?Sized>(ballot_box: &B) -> IntransitivityResolverFactory<C> {
        IntransitivityResolverFactory {
            weights: Arc::new(WeightTable::from_matchup_graph(&ballot_box.matchup_graph())),
        }
    }

    pub fn weights(&self) -> &WeightTable<C> {
        &self.weights
    }

    pub fn make_break_random_link(&self) -> IntransitivityResolver<C> {
        IntransitivityResolver::BreakRandomLink
    }

    pub fn make_break_weakest_link(&self) -> IntransitivityResolver<C> {
        IntransitivityResolver::BreakWeakestLink(self.weights.clone())
    }

    pub fn make_add_edges_in_order(&self) -> IntransitivityResolver<C> {
        IntransitivityResolver::AddEdgesInOrder(self.weights.clone())
    }

    pub fn make(&self, strategy: IntransitivityStrategy) -> IntransitivityResolver<C> {
        match strategy {
            IntransitivityStrategy::BreakRandomLink => self.make_break_random_link(),
            IntransitivityStrategy::BreakWeakestLink => self.make_break_weakest_link(),
            IntransitivityStrategy::AddEdgesInOrder => self.make_add_edges_in_order(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ballot_box::PairwiseBallotBox;

    fn cycle() -> Vec<PairwiseVote<u32>> {
        vec![
            PairwiseVote::new(1, 2, Outcome::Win),
            PairwiseVote::new(2, 3, Outcome::Win),
            PairwiseVote::new(3, 1, Outcome::Win),
        ]
    }

    fn weights() -> Arc<WeightTable<u32>> {
        Arc::new(WeightTable::from_pairs(vec![
            ((1, 2), 0.9),
            ((2, 3), 0.8),
            ((3, 1), 0.7),
        ]))
    }

    #[test]
    fn break_random_link_keeps_two_edges() {
        for seed in 0..10 {
            let mut rng = InductionRng::from_seed_u64(seed);
            let g = IntransitivityResolver::BreakRandomLink.resolve(&cycle(), &mut rng);
            assert_eq!(g.edge_count(), 2);
            assert_eq!(g.node_count(), 3);
            assert!(g.is_acyclic());
        }
    }

    #[test]
    fn break_weakest_link() {
        let mut rng = InductionRng::from_seed_u64(0);
        let g = IntransitivityResolver::BreakWeakestLink(weights()).resolve(&cycle(), &mut rng);
        assert_eq!(g.edges(), vec![(1, 2), (2, 3)]);
        assert_eq!(g.topological_sort(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn add_edges_in_order() {
        let mut rng = InductionRng::from_seed_u64(0);
        let w = Arc::new(WeightTable::from_pairs(vec![
            ((1, 2), 0.2),
            ((2, 3), 0.8),
            ((3, 1), 0.7),
        ]));
        let g = IntransitivityResolver::AddEdgesInOrder(w).resolve(&cycle(), &mut rng);
        assert_eq!(g.edges(), vec![(2, 3), (3, 1)]);
    }

    #[test]
    fn losses_and_ties() {
        let votes = vec![
            PairwiseVote::new(1, 2, Outcome::Loss),
            PairwiseVote::new(3, 4, Outcome::Tie),
        ];
        let mut rng = InductionRng::from_seed_u64(0);
        for resolver in [
            IntransitivityResolver::BreakRandomLink,
            IntransitivityResolver::BreakWeakestLink(weights()),
            IntransitivityResolver::AddEdgesInOrder(weights()),
        ] {
            let g = resolver.resolve(&votes, &mut rng);
            assert_eq!(g.edges(), vec![(2, 1)]);
            assert_eq!(g.nodes(), vec![1, 2, 3, 4]);
        }
    }

    #[test]
    fn factory_uses_the_margins() {
        let bb = PairwiseBallotBox::new(
            vec![
                PairwiseVote::new(1, 2, Outcome::Win),
                PairwiseVote::new(2, 3, Outcome::Win),
                PairwiseVote::new(2, 3, Outcome::Loss),
                PairwiseVote::new(3, 1, Outcome::Win),
                PairwiseVote::new(3, 1, Outcome::Win),
                PairwiseVote::new(3, 1, Outcome::Loss),
            ],
            None,
        )
        .unwrap();
        let factory = IntransitivityResolverFactory::new(&bb);
        assert_eq!(factory.weights().weight(&2, &3), Some(0.5));
        let resolver = factory.make(IntransitivityStrategy::BreakWeakestLink);
        assert_eq!(resolver.strategy(), IntransitivityStrategy::BreakWeakestLink);
        let mut rng = InductionRng::from_seed_u64(0);
        let g = resolver.resolve(&cycle(), &mut rng);
        // 1 -> 2: 1.0, 2 -> 3: 0.5, 3 -> 1: 2/3
        assert_eq!(g.edges(), vec![(1, 2), (3, 1)]);
        assert_eq!(
            factory.make_break_random_link().strategy(),
            IntransitivityStrategy::BreakRandomLink
        );
    }
}
