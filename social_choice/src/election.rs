use log::{debug, info};
use snafu::prelude::*;

use std::collections::BTreeMap;

use crate::ballot_box::BallotBox;
use crate::config::*;
use crate::graph::PreferenceGraph;
use crate::induction::{
    induce_orderings, IncompletenessResolver, InductionSettings, IntransitivityResolver,
};
use crate::matchup::MatchupEdge;
use crate::ranking::Ranking;
use crate::Candidate;

/// The output of a ranking method, best first.
///
/// The shape depends on the `RankOptions` the method was called with.
#[derive(PartialEq, Debug, Clone)]
pub enum RankingResult<C> {
    Flat(Vec<C>),
    Scored(Vec<(C, f64)>),
    Grouped(Vec<Vec<C>>),
    GroupedScored(Vec<(Vec<C>, f64)>),
}

impl<C: Candidate> RankingResult<C> {
    /// Shapes scores that are already sorted best first.
    pub fn from_scores(scores: Vec<(C, f64)>, options: &RankOptions) -> RankingResult<C> {
        match (options.include_score, options.group_ties) {
            (false, false) => RankingResult::Flat(scores.into_iter().map(|(c, _)| c).collect()),
            (true, false) => RankingResult::Scored(scores),
            (false, true) => RankingResult::Grouped(
                group_ties(scores).into_iter().map(|(g, _)| g).collect(),
            ),
            (true, true) => RankingResult::GroupedScored(group_ties(scores)),
        }
    }

    /// The candidates, best first.
    pub fn flatten(&self) -> Vec<C> {
        match self {
            RankingResult::Flat(cs) => cs.clone(),
            RankingResult::Scored(cs) => cs.iter().map(|(c, _)| c.clone()).collect(),
            RankingResult::Grouped(gs) => gs.iter().flatten().cloned().collect(),
            RankingResult::GroupedScored(gs) => {
                gs.iter().flat_map(|(g, _)| g.iter().cloned()).collect()
            }
        }
    }

    /// The result as a ranking. Groups become tied slots.
    pub fn to_ranking(&self) -> Ranking<C> {
        match self {
            RankingResult::Grouped(gs) => Ranking::new(gs.clone()),
            RankingResult::GroupedScored(gs) => {
                Ranking::new(gs.iter().map(|(g, _)| g.clone()).collect())
            }
            _ => Ranking::strict(self.flatten()),
        }
    }
}

// Groups the consecutive candidates with the same score.
fn group_ties<C>(scores: Vec<(C, f64)>) -> Vec<(Vec<C>, f64)> {
    let mut res: Vec<(Vec<C>, f64)> = Vec::new();
    for (c, s) in scores {
        match res.last_mut() {
            Some((group, score)) if *score == s => group.push(c),
            _ => res.push((vec![c], s)),
        }
    }
    res
}

// Stable: the candidates with equal scores stay in candidate order.
fn sort_descending<C>(scores: &mut [(C, f64)]) {
    scores.sort_by(|(_, s1), (_, s2)| s2.total_cmp(s1));
}

/// Runs the ranking methods on a ballot box.
///
/// ```
/// use social_choice::*;
///
/// let votes = vec![
///     PairwiseVote::new("Anna", "Bob", Outcome::Win),
///     PairwiseVote::new("Clara", "Bob", Outcome::Win),
/// ];
/// let bb = PairwiseBallotBox::new(votes, None)?;
/// let election = Election::new(&bb);
/// let res = election.rank(RankingMethod::Copeland, &RankOptions::GROUPED)?;
/// assert_eq!(
///     res,
///     RankingResult::Grouped(vec![vec!["Anna", "Clara"], vec!["Bob"]])
/// );
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Election<'a, C: Candidate> {
    ballot_box: &'a dyn BallotBox<C>,
    induced_orderings: Option<Vec<Ranking<C>>>,
}

impl<'a, C: Candidate> Election<'a, C> {
    pub fn new(ballot_box: &'a dyn BallotBox<C>) -> Election<'a, C> {
        Election {
            ballot_box,
            induced_orderings: None,
        }
    }

    pub fn supports_ordering_based_methods(&self) -> bool {
        self.ballot_box.supports_ordering_based_methods() || self.induced_orderings.is_some()
    }

    /// Induces an ordering for each voter of the ballot box, so that the methods
    /// that need orderings (Borda count) become available.
    ///
    /// Returns the seed used for the induction.
    pub fn enable_ordering_based_methods(
        &mut self,
        intransitivity: &IntransitivityResolver<C>,
        incompleteness: &IncompletenessResolver<C>,
        settings: &InductionSettings,
    ) -> u64 {
        let induced = induce_orderings(self.ballot_box, intransitivity, incompleteness, settings);
        info!(
            "enable_ordering_based_methods: {:?} induced orderings",
            induced.orderings.len()
        );
        self.induced_orderings = Some(induced.orderings);
        induced.seed
    }

    fn orderings(&self) -> Option<&[Ranking<C>]> {
        self.ballot_box
            .orderings()
            .or(self.induced_orderings.as_deref())
    }

    /// Runs a ranking method.
    pub fn rank(
        &self,
        method: RankingMethod,
        options: &RankOptions,
    ) -> Result<RankingResult<C>, VotingErrors> {
        let scores = self.scores(method)?;
        Ok(RankingResult::from_scores(scores, options))
    }

    /// The result of a method as a ranking, with the equal scores tied.
    pub fn ranking(&self, method: RankingMethod) -> Result<Ranking<C>, VotingErrors> {
        Ok(self.rank(method, &RankOptions::GROUPED)?.to_ranking())
    }

    /// The score of each candidate, best first.
    ///
    /// For ranked pairs, the order is the order of the locked graph and the score
    /// is the number of candidates below each candidate in that graph.
    pub fn scores(&self, method: RankingMethod) -> Result<Vec<(C, f64)>, VotingErrors> {
        info!("Election: running {}", method);
        let res = match method {
            RankingMethod::RankedPairs => self.ranked_pairs_scores(),
            RankingMethod::Copeland => self.copeland_scores(),
            RankingMethod::Minimax => self.minimax_scores(),
            RankingMethod::WinRatio => self.ratio_scores(false),
            RankingMethod::WinTieRatio => self.ratio_scores(true),
            RankingMethod::Borda => self.borda_scores()?,
        };
        debug!("Election: {} scores: {:?}", method, res);
        Ok(res)
    }

    /// The victories that ranked pairs keeps: all the edges of the victory graph,
    /// by decreasing margin, except the ones that would create a cycle.
    pub fn ranked_pairs_graph(&self) -> PreferenceGraph<C, MatchupEdge> {
        let victories = self.ballot_box.victory_graph();
        let mut edges: Vec<(C, C, MatchupEdge)> = victories
            .weighted_edges()
            .into_iter()
            .map(|(u, v, e)| (u, v, *e))
            .collect();
        edges.sort_by(|x, y| y.2.margin.total_cmp(&x.2.margin));

        let mut locked: PreferenceGraph<C, MatchupEdge> =
            PreferenceGraph::with_nodes(victories.nodes().iter());
        for (u, v, e) in edges {
            if !locked.add_edge_if_acyclic(u.clone(), v.clone(), e) {
                debug!(
                    "ranked_pairs: {:?} -> {:?} (margin {}) would create a cycle",
                    u, v, e.margin
                );
            }
        }
        assert!(locked.is_acyclic());
        locked
    }

    fn ranked_pairs_scores(&self) -> Vec<(C, f64)> {
        let locked = self.ranked_pairs_graph();
        let order = match locked.topological_sort() {
            Some(order) => order,
            None => unreachable!("ranked_pairs: the locked graph has a cycle"),
        };
        order
            .into_iter()
            .map(|c| {
                let s = locked.reachable_count(&c) as f64;
                (c, s)
            })
            .collect()
    }

    fn copeland_scores(&self) -> Vec<(C, f64)> {
        let g = self.ballot_box.victory_graph();
        let mut scores: Vec<(C, f64)> = g
            .nodes()
            .into_iter()
            .map(|c| {
                let s = g.out_degree(&c) as f64 - g.in_degree(&c) as f64;
                (c, s)
            })
            .collect();
        sort_descending(&mut scores);
        scores
    }

    // Smaller is better. A candidate that never lost a comparison scores 0.
    fn minimax_scores(&self) -> Vec<(C, f64)> {
        let g = self.ballot_box.matchup_graph();
        let mut scores: Vec<(C, f64)> = g
            .nodes()
            .into_iter()
            .map(|c| {
                let worst = g
                    .in_edges(&c)
                    .iter()
                    .map(|(_, e)| e.margin)
                    .fold(0.0, f64::max);
                (c, worst)
            })
            .collect();
        scores.sort_by(|(_, s1), (_, s2)| s1.total_cmp(s2));
        scores
    }

    fn ratio_scores(&self, count_ties: bool) -> Vec<(C, f64)> {
        let matchups = self.ballot_box.matchups();
        let mut scores: Vec<(C, f64)> = matchups
            .iter()
            .map(|(c, row)| {
                let (mut won, mut lost) = (0u64, 0u64);
                for t in row.values() {
                    won += t.wins;
                    lost += t.losses;
                    if count_ties {
                        won += t.ties;
                    }
                }
                let ratio = if won + lost == 0 {
                    0.0
                } else {
                    won as f64 / (won + lost) as f64
                };
                (c.clone(), ratio)
            })
            .collect();
        sort_descending(&mut scores);
        scores
    }

    fn borda_scores(&self) -> Result<Vec<(C, f64)>, VotingErrors> {
        let orderings = self.orderings().context(UnsupportedMethodSnafu {
            method: RankingMethod::Borda.name(),
            capability: "complete orderings: use a ranked ballot box or enable_ordering_based_methods",
        })?;
        let mut points: BTreeMap<C, u64> = self
            .ballot_box
            .candidates()
            .iter()
            .map(|c| (c.clone(), 0))
            .collect();
        for ordering in orderings {
            let mut below: u64 = ordering.slots().iter().map(|s| s.len() as u64).sum();
            for slot in ordering.slots() {
                below -= slot.len() as u64;
                for c in slot {
                    *points.entry(c.clone()).or_insert(0) += below;
                }
            }
        }
        let mut scores: Vec<(C, f64)> = points.into_iter().map(|(c, p)| (c, p as f64)).collect();
        sort_descending(&mut scores);
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ballot_box::{PairwiseBallotBox, RankedChoiceBallotBox};

    fn example_box() -> PairwiseBallotBox<u32> {
        PairwiseBallotBox::new(
            vec![
                PairwiseVote::new(0, 1, Outcome::Win),
                PairwiseVote::new(3, 2, Outcome::Loss),
                PairwiseVote::new(2, 3, Outcome::Win),
                PairwiseVote::new(0, 3, Outcome::Tie),
                PairwiseVote::new(3, 0, Outcome::Win),
            ],
            None,
        )
        .unwrap()
    }

    fn ranked_box() -> RankedChoiceBallotBox<u32> {
        let ballots = vec![
            vec![1, 2, 3, 4],
            vec![1, 2, 3, 4],
            vec![1, 3, 2, 4],
            vec![1, 2, 4, 3],
        ];
        RankedChoiceBallotBox::new(
            ballots.into_iter().map(Ranking::strict).collect(),
            None,
            &BallotRules::DEFAULT_RULES,
        )
        .unwrap()
    }

    fn close(res: &RankingResult<u32>, expected: &[(u32, f64)]) -> bool {
        match res {
            RankingResult::Scored(scores) => {
                scores.len() == expected.len()
                    && scores
                        .iter()
                        .zip(expected.iter())
                        .all(|((c1, s1), (c2, s2))| c1 == c2 && (s1 - s2).abs() < 1e-9)
            }
            _ => false,
        }
    }

    #[test]
    fn ranked_pairs() {
        let bb = example_box();
        let e = Election::new(&bb);
        let res = e.rank(RankingMethod::RankedPairs, &RankOptions::DEFAULT).unwrap();
        assert_eq!(res, RankingResult::Flat(vec![2, 3, 0, 1]));
        let scored = e.rank(RankingMethod::RankedPairs, &RankOptions::SCORED).unwrap();
        assert!(close(&scored, &[(2, 3.0), (3, 2.0), (0, 1.0), (1, 0.0)]));
    }

    #[test]
    fn ranked_pairs_skips_the_weakest_victory_of_a_cycle() {
        let mut votes = vec![];
        for (n, a, b) in [(3, 1, 2), (2, 2, 3), (1, 3, 1)] {
            for _ in 0..n {
                votes.push(PairwiseVote::new(a, b, Outcome::Win));
            }
        }
        votes.push(PairwiseVote::new(2, 3, Outcome::Loss));
        votes.push(PairwiseVote::new(3, 1, Outcome::Tie));
        let bb = PairwiseBallotBox::new(votes, None).unwrap();
        let e = Election::new(&bb);
        // margins: 1 -> 2: 1.0, 2 -> 3: 2/3, 3 -> 1: 1/2
        let locked = e.ranked_pairs_graph();
        assert_eq!(locked.edges(), vec![(1, 2), (2, 3)]);
        assert_eq!(
            e.rank(RankingMethod::RankedPairs, &RankOptions::DEFAULT).unwrap().flatten(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn win_ratios() {
        let bb = example_box();
        let e = Election::new(&bb);
        let res = e.rank(RankingMethod::WinRatio, &RankOptions::SCORED).unwrap();
        assert!(close(&res, &[(2, 1.0), (0, 0.5), (3, 1.0 / 3.0), (1, 0.0)]));
        let res = e.rank(RankingMethod::WinTieRatio, &RankOptions::SCORED).unwrap();
        assert!(close(&res, &[(2, 1.0), (0, 2.0 / 3.0), (3, 0.5), (1, 0.0)]));
    }

    #[test]
    fn copeland_groups() {
        let bb = example_box();
        let e = Election::new(&bb);
        let res = e.rank(RankingMethod::Copeland, &RankOptions::GROUPED).unwrap();
        assert_eq!(res, RankingResult::Grouped(vec![vec![2], vec![0, 3], vec![1]]));
        assert_eq!(res.flatten(), vec![2, 0, 3, 1]);
        let both = RankOptions {
            include_score: true,
            group_ties: true,
        };
        let res = e.rank(RankingMethod::Copeland, &both).unwrap();
        assert_eq!(
            res,
            RankingResult::GroupedScored(vec![
                (vec![2], 1.0),
                (vec![0, 3], 0.0),
                (vec![1], -1.0)
            ])
        );
        assert_eq!(res.to_ranking().slots(), &[vec![2], vec![0, 3], vec![1]]);
    }

    #[test]
    fn minimax() {
        let bb = example_box();
        let e = Election::new(&bb);
        let res = e.rank(RankingMethod::Minimax, &RankOptions::SCORED).unwrap();
        assert!(close(&res, &[(2, 0.0), (0, 0.5), (1, 1.0), (3, 1.0)]));
    }

    #[test]
    fn minimax_of_a_candidate_never_compared() {
        let bb = PairwiseBallotBox::new(
            vec![PairwiseVote::new(1, 2, Outcome::Win)],
            Some(vec![1, 2, 3]),
        )
        .unwrap();
        let e = Election::new(&bb);
        let res = e.rank(RankingMethod::Minimax, &RankOptions::SCORED).unwrap();
        // Never beaten, so 3 ties with the winner.
        assert_eq!(res, RankingResult::Scored(vec![(1, 0.0), (3, 0.0), (2, 1.0)]));
    }

    #[test]
    fn results_from_scores() {
        let scores = vec![(4, 3.0), (1, 2.0), (2, 2.0), (3, 0.0)];
        let grouped = RankingResult::from_scores(scores.clone(), &RankOptions::GROUPED);
        assert_eq!(grouped, RankingResult::Grouped(vec![vec![4], vec![1, 2], vec![3]]));
        assert_eq!(grouped.to_ranking().slots(), &[vec![4], vec![1, 2], vec![3]]);
        let flat = RankingResult::from_scores(scores, &RankOptions::DEFAULT);
        assert_eq!(flat.to_ranking().flatten(), vec![4, 1, 2, 3]);
    }

    #[test]
    fn ranked_ballots() {
        let bb = ranked_box();
        let e = Election::new(&bb);
        let res = e.rank(RankingMethod::Copeland, &RankOptions::SCORED).unwrap();
        assert!(close(&res, &[(1, 3.0), (2, 1.0), (3, -1.0), (4, -3.0)]));
        assert_eq!(
            e.rank(RankingMethod::Copeland, &RankOptions::DEFAULT).unwrap(),
            RankingResult::Flat(vec![1, 2, 3, 4])
        );
        let borda = e.rank(RankingMethod::Borda, &RankOptions::SCORED).unwrap();
        assert!(close(&borda, &[(1, 12.0), (2, 7.0), (3, 4.0), (4, 1.0)]));
        assert!(e.supports_ordering_based_methods());
    }

    #[test]
    fn borda_with_ties() {
        let bb = RankedChoiceBallotBox::new(
            vec![Ranking::new(vec![vec![1], vec![2, 3], vec![4]])],
            None,
            &BallotRules::DEFAULT_RULES,
        )
        .unwrap();
        let e = Election::new(&bb);
        let res = e.rank(RankingMethod::Borda, &RankOptions::GROUPED).unwrap();
        assert_eq!(res, RankingResult::Grouped(vec![vec![1], vec![2, 3], vec![4]]));
    }

    #[test]
    fn borda_needs_orderings() {
        let bb = example_box();
        let mut e = Election::new(&bb);
        assert!(!e.supports_ordering_based_methods());
        assert!(matches!(
            e.rank(RankingMethod::Borda, &RankOptions::DEFAULT),
            Err(VotingErrors::UnsupportedMethod { .. })
        ));
        let seed = e.enable_ordering_based_methods(
            &IntransitivityResolver::BreakRandomLink,
            &IncompletenessResolver::AddAllAtEnd,
            &InductionSettings {
                upsampling: Upsampling::None,
                seed: Some(9),
            },
        );
        assert_eq!(seed, 9);
        assert!(e.supports_ordering_based_methods());
        let res = e.rank(RankingMethod::Borda, &RankOptions::DEFAULT).unwrap();
        assert_eq!(res.flatten().len(), 4);
    }

    #[test]
    fn empty_election() {
        let bb: PairwiseBallotBox<u32> = PairwiseBallotBox::new(vec![], None).unwrap();
        let e = Election::new(&bb);
        for m in [
            RankingMethod::RankedPairs,
            RankingMethod::Copeland,
            RankingMethod::Minimax,
            RankingMethod::WinRatio,
            RankingMethod::WinTieRatio,
        ] {
            assert_eq!(
                e.rank(m, &RankOptions::DEFAULT).unwrap(),
                RankingResult::Flat(vec![])
            );
        }
    }
}
