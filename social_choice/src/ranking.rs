use std::collections::BTreeSet;

use snafu::prelude::*;

use crate::config::*;
use crate::graph::PreferenceGraph;
use crate::Candidate;

/// An ordering of candidates, best first.
///
/// Each slot holds the candidates that share the same rank. A strict ranking has
/// exactly one candidate per slot.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ranking<C> {
    slots: Vec<Vec<C>>,
}

impl<C: Candidate> Ranking<C> {
    /// A ranking from its slots. The slots are not checked, see `candidate_set`.
    pub fn new(slots: Vec<Vec<C>>) -> Ranking<C> {
        Ranking { slots }
    }

    /// A ranking with one candidate per slot.
    pub fn strict(candidates: Vec<C>) -> Ranking<C> {
        Ranking {
            slots: candidates.into_iter().map(|c| vec![c]).collect(),
        }
    }

    pub fn slots(&self) -> &[Vec<C>] {
        &self.slots
    }

    /// The number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_strict(&self) -> bool {
        self.slots.iter().all(|s| s.len() == 1)
    }

    /// All the candidates, in ranking order.
    pub fn flatten(&self) -> Vec<C> {
        self.slots.iter().flatten().cloned().collect()
    }

    /// The candidates mentioned in this ranking.
    ///
    /// Fails if a candidate appears twice or if a slot is empty.
    pub fn candidate_set(&self) -> Result<BTreeSet<C>, VotingErrors> {
        let mut res: BTreeSet<C> = BTreeSet::new();
        for slot in self.slots.iter() {
            ensure!(
                !slot.is_empty(),
                InvalidBallotDataSnafu {
                    reason: format!("empty rank in ballot {:?}", self.slots),
                }
            );
            for c in slot {
                ensure!(
                    res.insert(c.clone()),
                    InvalidBallotDataSnafu {
                        reason: format!("candidate {:?} repeated in ballot {:?}", c, self.slots),
                    }
                );
            }
        }
        Ok(res)
    }

    /// Expands the ranking into pairwise votes.
    ///
    /// Each candidate wins against every candidate in a later slot, and ties with
    /// the other candidates of its own slot.
    pub fn to_pairwise_votes(&self) -> Vec<PairwiseVote<C>> {
        let mut res: Vec<PairwiseVote<C>> = Vec::new();
        for (idx, slot) in self.slots.iter().enumerate() {
            for (i, c1) in slot.iter().enumerate() {
                for c2 in slot.iter().skip(i + 1) {
                    res.push(PairwiseVote::new(c1.clone(), c2.clone(), Outcome::Tie));
                }
            }
            for later in self.slots.iter().skip(idx + 1) {
                for c1 in slot.iter() {
                    for c2 in later.iter() {
                        res.push(PairwiseVote::new(c1.clone(), c2.clone(), Outcome::Win));
                    }
                }
            }
        }
        res
    }

    /// The preference graph of this ranking: an edge from every candidate to each
    /// candidate of a later slot. Tied candidates are not connected.
    pub fn to_graph(&self) -> PreferenceGraph<C> {
        let mut g: PreferenceGraph<C> = PreferenceGraph::with_nodes(self.slots.iter().flatten());
        for (idx, slot) in self.slots.iter().enumerate() {
            for later in self.slots.iter().skip(idx + 1) {
                for c1 in slot.iter() {
                    for c2 in later.iter() {
                        g.add_edge(c1.clone(), c2.clone(), ());
                    }
                }
            }
        }
        g
    }
}

impl<C: Candidate> From<Vec<C>> for Ranking<C> {
    fn from(candidates: Vec<C>) -> Self {
        Ranking::strict(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairwise_expansion() {
        let r = Ranking::new(vec![vec![1], vec![2, 3], vec![4]]);
        let votes = r.to_pairwise_votes();
        assert_eq!(votes.len(), 6);
        assert!(votes.contains(&PairwiseVote::new(2, 3, Outcome::Tie)));
        assert!(votes.contains(&PairwiseVote::new(1, 4, Outcome::Win)));
        assert!(votes.contains(&PairwiseVote::new(3, 4, Outcome::Win)));
        assert!(!r.is_strict());
        assert_eq!(r.flatten(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn graph_of_a_ranking() {
        let r = Ranking::new(vec![vec![1], vec![2, 3]]);
        let g = r.to_graph();
        assert_eq!(g.edges(), vec![(1, 2), (1, 3)]);
        assert_eq!(g.node_count(), 3);
        let single = Ranking::strict(vec![7]).to_graph();
        assert_eq!(single.nodes(), vec![7]);
        assert_eq!(single.edge_count(), 0);
    }

    #[test]
    fn candidate_set_checks() {
        let r: Ranking<u32> = vec![3, 1, 2].into();
        assert_eq!(r.candidate_set().unwrap().len(), 3);
        let dup = Ranking::new(vec![vec![1], vec![2, 1]]);
        assert!(dup.candidate_set().is_err());
        let empty_slot = Ranking::new(vec![vec![1], vec![]]);
        assert!(empty_slot.candidate_set().is_err());
    }
}
