use log::{debug, info};
use snafu::prelude::*;

use std::collections::{BTreeMap, BTreeSet};

use crate::config::*;
use crate::matchup::*;
use crate::ranking::Ranking;
use crate::Candidate;

/// The pairwise votes cast by one voter.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteSet<C> {
    /// None for a single vote that carries no voter.
    pub voter: Option<String>,
    pub votes: Vec<PairwiseVote<C>>,
}

/// A collection of votes that can be tallied.
///
/// The graphs are recomputed on each call and belong to the caller.
pub trait BallotBox<C: Candidate>: Send + Sync {
    /// All the candidates of the election, declared or inferred from the votes.
    fn candidates(&self) -> &BTreeSet<C>;

    /// The votes in pairwise form.
    fn votes(&self) -> &[PairwiseVote<C>];

    /// The votes, grouped by voter. A vote without a voter is a vote set on its own.
    fn vote_sets(&self) -> Vec<VoteSet<C>>;

    /// The complete orderings of the voters, if this ballot box has them.
    fn orderings(&self) -> Option<&[Ranking<C>]> {
        None
    }

    fn supports_ordering_based_methods(&self) -> bool {
        self.orderings().is_some()
    }

    fn matchups(&self) -> Matchups<C> {
        tally_votes(self.votes(), self.candidates())
    }

    fn matchup_graph(&self) -> MatchupGraph<C> {
        matchup_graph(&self.matchups())
    }

    fn victory_graph(&self) -> MatchupGraph<C> {
        victory_graph(&self.matchup_graph())
    }
}

fn declared_candidates<C: Candidate>(candidates: &[C]) -> Result<BTreeSet<C>, VotingErrors> {
    let mut res: BTreeSet<C> = BTreeSet::new();
    for c in candidates {
        ensure!(
            res.insert(c.clone()),
            InvalidElectionDataSnafu {
                reason: format!("candidate {:?} declared more than once", c),
            }
        );
    }
    Ok(res)
}

/// Stores votes of the form "a won / lost / tied against b".
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairwiseBallotBox<C> {
    votes: Vec<PairwiseVote<C>>,
    candidates: BTreeSet<C>,
    declared: bool,
}

impl<C: Candidate> PairwiseBallotBox<C> {
    /// Creates a ballot box.
    ///
    /// Arguments:
    /// * `votes` the pairwise votes
    /// * `candidates` the candidates of the election. If not provided, the candidates
    /// are inferred from the votes. If provided, every vote must only mention
    /// declared candidates.
    pub fn new(
        votes: Vec<PairwiseVote<C>>,
        candidates: Option<Vec<C>>,
    ) -> Result<PairwiseBallotBox<C>, VotingErrors> {
        let mut res = match candidates {
            Some(cs) => PairwiseBallotBox {
                votes: Vec::new(),
                candidates: declared_candidates(&cs)?,
                declared: true,
            },
            None => PairwiseBallotBox {
                votes: Vec::new(),
                candidates: BTreeSet::new(),
                declared: false,
            },
        };
        res.add_votes(votes)?;
        info!(
            "PairwiseBallotBox: {:?} votes, {:?} candidates",
            res.votes.len(),
            res.candidates.len()
        );
        Ok(res)
    }

    /// Appends votes. Nothing is added if one of the votes is invalid.
    pub fn add_votes(&mut self, votes: Vec<PairwiseVote<C>>) -> Result<(), VotingErrors> {
        for v in votes.iter() {
            ensure!(
                v.first != v.second,
                InvalidBallotDataSnafu {
                    reason: format!("vote of candidate {:?} against itself", v.first),
                }
            );
            if self.declared {
                for c in [&v.first, &v.second] {
                    ensure!(
                        self.candidates.contains(c),
                        InvalidBallotDataSnafu {
                            reason: format!("vote {:?} mentions undeclared candidate {:?}", v, c),
                        }
                    );
                }
            }
        }
        if !self.declared {
            for v in votes.iter() {
                self.candidates.insert(v.first.clone());
                self.candidates.insert(v.second.clone());
            }
        }
        debug!("add_votes: adding {:?} votes", votes.len());
        self.votes.extend(votes);
        Ok(())
    }
}

impl PairwiseBallotBox<String> {
    /// Creates a ballot box from raw records.
    ///
    /// Each record is either `[a, b, outcome]` or `[a, b, outcome, voter]`, with the
    /// outcome being one of `win`, `loss` or `tie`.
    pub fn from_records<S: AsRef<str>>(
        records: &[Vec<S>],
        candidates: Option<Vec<String>>,
    ) -> Result<PairwiseBallotBox<String>, VotingErrors> {
        let mut votes: Vec<PairwiseVote<String>> = Vec::with_capacity(records.len());
        for record in records {
            let fields: Vec<&str> = record.iter().map(|s| s.as_ref()).collect();
            let vote = match fields.as_slice() {
                [a, b, o] => PairwiseVote::new(a.to_string(), b.to_string(), Outcome::parse(o)?),
                [a, b, o, voter] => {
                    PairwiseVote::with_voter(a.to_string(), b.to_string(), Outcome::parse(o)?, voter)
                }
                _ => {
                    return InvalidBallotDataSnafu {
                        reason: format!(
                            "expected a vote with 3 or 4 fields, got {:?}",
                            fields
                        ),
                    }
                    .fail()
                }
            };
            votes.push(vote);
        }
        PairwiseBallotBox::new(votes, candidates)
    }
}

impl<C: Candidate> BallotBox<C> for PairwiseBallotBox<C> {
    fn candidates(&self) -> &BTreeSet<C> {
        &self.candidates
    }

    fn votes(&self) -> &[PairwiseVote<C>] {
        &self.votes
    }

    /// The votes of each voter, by voter name, then every vote without a voter
    /// on its own.
    fn vote_sets(&self) -> Vec<VoteSet<C>> {
        let mut by_voter: BTreeMap<String, Vec<PairwiseVote<C>>> = BTreeMap::new();
        let mut anonymous: Vec<VoteSet<C>> = Vec::new();
        for v in self.votes.iter() {
            match &v.voter {
                Some(voter) => by_voter.entry(voter.clone()).or_default().push(v.clone()),
                None => anonymous.push(VoteSet {
                    voter: None,
                    votes: vec![v.clone()],
                }),
            }
        }
        by_voter
            .into_iter()
            .map(|(voter, votes)| VoteSet {
                voter: Some(voter),
                votes,
            })
            .chain(anonymous)
            .collect()
    }
}

/// Stores full or partial rankings, possibly with ties.
///
/// The rankings are expanded into pairwise votes, and all the pairwise queries are
/// answered from them.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankedChoiceBallotBox<C> {
    ballots: Vec<Ranking<C>>,
    pairwise: PairwiseBallotBox<C>,
}

impl<C: Candidate> RankedChoiceBallotBox<C> {
    /// Creates a ballot box.
    ///
    /// Arguments:
    /// * `ballots` the rankings, at least one
    /// * `candidates` the candidates of the election. If not provided, the candidates
    /// are inferred from the ballots.
    /// * `rules` the ballot rules. With `require_full_ballots`, every ballot must
    /// rank exactly the candidates of the election.
    pub fn new(
        ballots: Vec<Ranking<C>>,
        candidates: Option<Vec<C>>,
        rules: &BallotRules,
    ) -> Result<RankedChoiceBallotBox<C>, VotingErrors> {
        ensure!(
            !ballots.is_empty(),
            InvalidBallotDataSnafu {
                reason: "no ballots provided",
            }
        );
        let declared: Option<BTreeSet<C>> = match candidates.as_deref() {
            Some(cs) => Some(declared_candidates(cs)?),
            None => None,
        };

        let mut ballot_sets: Vec<BTreeSet<C>> = Vec::with_capacity(ballots.len());
        for ballot in ballots.iter() {
            let cs = ballot.candidate_set()?;
            if let Some(declared_cs) = declared.as_ref() {
                if let Some(c) = cs.difference(declared_cs).next() {
                    return InvalidBallotDataSnafu {
                        reason: format!("ballot {:?} ranks undeclared candidate {:?}", ballot, c),
                    }
                    .fail();
                }
            }
            ballot_sets.push(cs);
        }

        let all_candidates: BTreeSet<C> = match declared {
            Some(cs) => cs,
            None => ballot_sets.iter().flatten().cloned().collect(),
        };

        if rules.require_full_ballots {
            for (ballot, cs) in ballots.iter().zip(ballot_sets.iter()) {
                ensure!(
                    *cs == all_candidates,
                    InvalidBallotDataSnafu {
                        reason: format!(
                            "ballot {:?} does not rank all the candidates {:?}",
                            ballot, all_candidates
                        ),
                    }
                );
            }
        }

        let votes: Vec<PairwiseVote<C>> =
            ballots.iter().flat_map(|b| b.to_pairwise_votes()).collect();
        debug!(
            "RankedChoiceBallotBox: {:?} ballots expanded into {:?} pairwise votes",
            ballots.len(),
            votes.len()
        );
        let pairwise = PairwiseBallotBox::new(votes, Some(all_candidates.into_iter().collect()))?;
        Ok(RankedChoiceBallotBox { ballots, pairwise })
    }

    pub fn ballots(&self) -> &[Ranking<C>] {
        &self.ballots
    }
}

impl<C: Candidate> BallotBox<C> for RankedChoiceBallotBox<C> {
    fn candidates(&self) -> &BTreeSet<C> {
        self.pairwise.candidates()
    }

    fn votes(&self) -> &[PairwiseVote<C>] {
        self.pairwise.votes()
    }

    /// Each ballot is the vote set of its own anonymous voter.
    fn vote_sets(&self) -> Vec<VoteSet<C>> {
        self.ballots
            .iter()
            .enumerate()
            .map(|(idx, b)| VoteSet {
                voter: Some(format!("ballot-{:08}", idx + 1)),
                votes: b.to_pairwise_votes(),
            })
            .collect()
    }

    fn orderings(&self) -> Option<&[Ranking<C>]> {
        Some(&self.ballots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict(ballots: &[&[u32]]) -> Vec<Ranking<u32>> {
        ballots.iter().map(|b| Ranking::strict(b.to_vec())).collect()
    }

    #[test]
    fn empty_pairwise_box() {
        let bb: PairwiseBallotBox<u32> = PairwiseBallotBox::new(vec![], None).unwrap();
        assert!(bb.matchups().is_empty());
        assert_eq!(bb.victory_graph().node_count(), 0);
        assert!(bb.vote_sets().is_empty());
        assert!(!bb.supports_ordering_based_methods());
    }

    #[test]
    fn pairwise_validation() {
        let self_vote = PairwiseBallotBox::new(vec![PairwiseVote::new(1, 1, Outcome::Win)], None);
        assert!(matches!(
            self_vote,
            Err(VotingErrors::InvalidBallotData { .. })
        ));
        let undeclared = PairwiseBallotBox::new(
            vec![PairwiseVote::new(1, 3, Outcome::Win)],
            Some(vec![1, 2]),
        );
        assert!(matches!(
            undeclared,
            Err(VotingErrors::InvalidBallotData { .. })
        ));
        let dup: Result<PairwiseBallotBox<u32>, _> = PairwiseBallotBox::new(vec![], Some(vec![1, 1]));
        assert!(matches!(dup, Err(VotingErrors::InvalidElectionData { .. })));
    }

    #[test]
    fn records() {
        let recs = vec![
            vec!["a", "b", "win", "v1"],
            vec!["b", "c", "tie", "v1"],
            vec!["c", "a", "loss", "v2"],
            vec!["a", "c", "win"],
            vec!["b", "a", "tie"],
        ];
        let bb = PairwiseBallotBox::from_records(&recs, None).unwrap();
        assert_eq!(bb.candidates().len(), 3);
        let sets = bb.vote_sets();
        assert_eq!(sets.len(), 4);
        assert_eq!(sets[0].voter.as_deref(), Some("v1"));
        assert_eq!(sets[0].votes.len(), 2);
        assert_eq!(sets[1].voter.as_deref(), Some("v2"));
        // Each vote without a voter stands alone.
        assert_eq!(sets[2].voter, None);
        assert_eq!(
            sets[2].votes,
            vec![PairwiseVote::new("a".to_string(), "c".to_string(), Outcome::Win)]
        );
        assert_eq!(sets[3].voter, None);
        assert_eq!(sets[3].votes.len(), 1);

        let bad_outcome = PairwiseBallotBox::from_records(&[vec!["a", "b", "draw"]], None);
        assert!(matches!(
            bad_outcome,
            Err(VotingErrors::InvalidBallotData { .. })
        ));
        let bad_arity = PairwiseBallotBox::from_records(&[vec!["a", "b"]], None);
        assert!(matches!(
            bad_arity,
            Err(VotingErrors::InvalidBallotData { .. })
        ));
    }

    #[test]
    fn appending_votes() {
        let mut bb = PairwiseBallotBox::new(vec![PairwiseVote::new(1, 2, Outcome::Win)], None).unwrap();
        bb.add_votes(vec![PairwiseVote::new(3, 2, Outcome::Loss)]).unwrap();
        assert_eq!(bb.votes().len(), 2);
        assert_eq!(bb.candidates().len(), 3);
        assert_eq!(bb.matchups()[&2][&3].wins, 1);
        assert!(bb.add_votes(vec![PairwiseVote::new(4, 4, Outcome::Tie)]).is_err());
        assert_eq!(bb.votes().len(), 2);
    }

    #[test]
    fn ranked_expansion() {
        let bb = RankedChoiceBallotBox::new(
            vec![Ranking::new(vec![vec![1], vec![2, 3]])],
            None,
            &BallotRules::DEFAULT_RULES,
        )
        .unwrap();
        let m = bb.matchups();
        assert_eq!(m[&1][&2].wins, 1);
        assert_eq!(m[&1][&3].wins, 1);
        assert_eq!(m[&2][&3].ties, 1);
        assert_eq!(bb.orderings().map(|o| o.len()), Some(1));
        assert_eq!(bb.vote_sets()[0].voter.as_deref(), Some("ballot-00000001"));
    }

    #[test]
    fn ranked_validation() {
        let rules = BallotRules::DEFAULT_RULES;
        let empty: Result<RankedChoiceBallotBox<u32>, _> =
            RankedChoiceBallotBox::new(vec![], None, &rules);
        assert!(matches!(empty, Err(VotingErrors::InvalidBallotData { .. })));

        let repeated = RankedChoiceBallotBox::new(strict(&[&[1, 2, 1]]), None, &rules);
        assert!(matches!(repeated, Err(VotingErrors::InvalidBallotData { .. })));

        let tied_repeat = RankedChoiceBallotBox::new(
            vec![Ranking::new(vec![vec![1, 2], vec![2]])],
            None,
            &rules,
        );
        assert!(tied_repeat.is_err());

        let undeclared = RankedChoiceBallotBox::new(strict(&[&[1, 4]]), Some(vec![1, 2, 3]), &rules);
        assert!(matches!(undeclared, Err(VotingErrors::InvalidBallotData { .. })));

        let dup = RankedChoiceBallotBox::new(strict(&[&[1, 2]]), Some(vec![1, 2, 2]), &rules);
        assert!(matches!(dup, Err(VotingErrors::InvalidElectionData { .. })));
    }

    #[test]
    fn full_ballots() {
        let rules = BallotRules {
            require_full_ballots: true,
        };
        let partial = RankedChoiceBallotBox::new(strict(&[&[1, 2, 3], &[1, 2]]), None, &rules);
        assert!(matches!(partial, Err(VotingErrors::InvalidBallotData { .. })));
        let short = RankedChoiceBallotBox::new(strict(&[&[1, 2]]), Some(vec![1, 2, 3]), &rules);
        assert!(short.is_err());
        let ok = RankedChoiceBallotBox::new(strict(&[&[1, 2, 3], &[3, 2, 1]]), None, &rules);
        assert!(ok.is_ok());
        let lenient =
            RankedChoiceBallotBox::new(strict(&[&[1, 2]]), Some(vec![1, 2, 3]), &BallotRules::DEFAULT_RULES)
                .unwrap();
        assert_eq!(lenient.candidates().len(), 3);
        assert_eq!(lenient.matchups()[&3][&1], MatchupTally::EMPTY);
    }
}
