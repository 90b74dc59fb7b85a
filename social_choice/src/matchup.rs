use log::debug;

use std::collections::{BTreeMap, BTreeSet};

use crate::config::*;
use crate::graph::PreferenceGraph;
use crate::Candidate;

/// The head-to-head record of one candidate against another.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub struct MatchupTally {
    pub wins: u64,
    pub losses: u64,
    pub ties: u64,
}

impl MatchupTally {
    pub const EMPTY: MatchupTally = MatchupTally {
        wins: 0,
        losses: 0,
        ties: 0,
    };

    pub fn total(&self) -> u64 {
        self.wins + self.losses + self.ties
    }

    /// The same record, seen from the opponent.
    pub fn flipped(&self) -> MatchupTally {
        MatchupTally {
            wins: self.losses,
            losses: self.wins,
            ties: self.ties,
        }
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
    }
}

/// The tally for every ordered pair of candidates: `matchups[u][v]` is the record
/// of u against v.
pub type Matchups<C> = BTreeMap<C, BTreeMap<C, MatchupTally>>;

/// The data attached to an edge of the matchup graph.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct MatchupEdge {
    pub wins: u64,
    pub losses: u64,
    pub ties: u64,
    /// wins / (wins + losses + ties)
    pub margin: f64,
}

pub type MatchupGraph<C> = PreferenceGraph<C, MatchupEdge>;

/// Counts the votes for each ordered pair.
///
/// Every ordered pair of distinct candidates is present, with an empty tally when
/// the two candidates were never compared.
pub fn tally_votes<C: Candidate>(
    votes: &[PairwiseVote<C>],
    candidates: &BTreeSet<C>,
) -> Matchups<C> {
    let mut res: Matchups<C> = BTreeMap::new();
    for c1 in candidates.iter() {
        let row = res.entry(c1.clone()).or_default();
        for c2 in candidates.iter() {
            if c1 != c2 {
                row.insert(c2.clone(), MatchupTally::EMPTY);
            }
        }
    }
    for v in votes.iter() {
        res.entry(v.first.clone())
            .or_default()
            .entry(v.second.clone())
            .or_default()
            .record(v.outcome);
        res.entry(v.second.clone())
            .or_default()
            .entry(v.first.clone())
            .or_default()
            .record(v.outcome.flipped());
    }
    res
}

/// The graph of all the matchups that happened at least once.
pub fn matchup_graph<C: Candidate>(matchups: &Matchups<C>) -> MatchupGraph<C> {
    let mut g: MatchupGraph<C> = PreferenceGraph::with_nodes(matchups.keys());
    for (c1, row) in matchups.iter() {
        for (c2, tally) in row.iter() {
            let total = tally.total();
            if total == 0 {
                continue;
            }
            g.add_edge(
                c1.clone(),
                c2.clone(),
                MatchupEdge {
                    wins: tally.wins,
                    losses: tally.losses,
                    ties: tally.ties,
                    margin: tally.wins as f64 / total as f64,
                },
            );
        }
    }
    g
}

/// Keeps the edge u -> v of the matchup graph only if its margin is strictly
/// greater than the margin of v -> u. Equal margins drop both directions.
pub fn victory_graph<C: Candidate>(matchups: &MatchupGraph<C>) -> MatchupGraph<C> {
    let mut g: MatchupGraph<C> = PreferenceGraph::with_nodes(matchups.nodes().iter());
    for (u, v, data) in matchups.weighted_edges() {
        let reverse_margin = matchups.edge_weight(&v, &u).map(|e| e.margin).unwrap_or(0.0);
        if data.margin > reverse_margin {
            g.add_edge(u, v, *data);
        } else {
            debug!(
                "victory_graph: dropping {:?} -> {:?} ({} <= {})",
                u, v, data.margin, reverse_margin
            );
        }
    }
    g
}
