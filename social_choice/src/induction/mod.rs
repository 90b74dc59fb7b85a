//! Vote induction: turning the pairwise votes of a voter into a ranking.
//!
//! The votes of a voter may contradict each other (a > b, b > c, c > a) and usually
//! do not compare every pair of candidates. Induction runs in two steps:
//! 1. an [`IntransitivityResolver`] builds an acyclic graph from the votes
//! 2. an [`IncompletenessResolver`] extends that graph to every candidate
//!
//! The ranking is then read as the topological order of the resulting graph.
//!
//! The resolvers that need weights are built by the factories from a reference
//! ballot box: the weight of an edge `u -> v` is the margin of u against v in the
//! whole population.
//!
//! ```
//! use social_choice::induction::*;
//! use social_choice::*;
//!
//! let bb = PairwiseBallotBox::new(
//!     vec![
//!         PairwiseVote::with_voter(1, 2, Outcome::Win, "anna"),
//!         PairwiseVote::with_voter(2, 3, Outcome::Win, "anna"),
//!         PairwiseVote::with_voter(3, 1, Outcome::Win, "anna"),
//!         PairwiseVote::with_voter(1, 2, Outcome::Win, "bob"),
//!     ],
//!     None,
//! )?;
//! let intransitivity = IntransitivityResolverFactory::new(&bb).make_break_weakest_link();
//! let incompleteness = IncompletenessResolverFactory::new(&bb).make_add_all_at_end();
//! let induced = induce_orderings(
//!     &bb,
//!     &intransitivity,
//!     &incompleteness,
//!     &InductionSettings { upsampling: Upsampling::None, seed: Some(3) },
//! );
//! assert_eq!(induced.orderings.len(), 2);
//! assert_eq!(induced.orderings[1].slots(), &[vec![1], vec![2], vec![3]]);
//! # Ok::<(), VotingErrors>(())
//! ```

mod incompleteness;
mod intransitivity;

pub use incompleteness::*;
pub use intransitivity::*;

use log::{debug, info, warn};
use rayon::prelude::*;

use std::collections::{BTreeMap, BTreeSet};

use crate::ballot_box::{BallotBox, PairwiseBallotBox, RankedChoiceBallotBox, VoteSet};
use crate::config::*;
use crate::election::Election;
use crate::matchup::MatchupGraph;
use crate::ranking::Ranking;
use crate::rng::InductionRng;
use crate::similarity::kendalls_tau;
use crate::Candidate;

/// A weight for each (winner, loser) edge.
#[derive(PartialEq, Debug, Clone)]
pub struct WeightTable<C> {
    weights: BTreeMap<(C, C), f64>,
}

impl<C: Candidate> WeightTable<C> {
    /// The margin of every edge of the matchup graph.
    pub fn from_matchup_graph(g: &MatchupGraph<C>) -> WeightTable<C> {
        WeightTable {
            weights: g
                .weighted_edges()
                .into_iter()
                .map(|(u, v, e)| ((u, v), e.margin))
                .collect(),
        }
    }

    pub fn from_pairs<I>(pairs: I) -> WeightTable<C>
    where
        I: IntoIterator<Item = ((C, C), f64)>,
    {
        WeightTable {
            weights: pairs.into_iter().collect(),
        }
    }

    pub fn weight(&self, winner: &C, loser: &C) -> Option<f64> {
        self.weights.get(&(winner.clone(), loser.clone())).copied()
    }

    /// Edges that were never observed weigh 0.
    pub fn weight_or_zero(&self, winner: &C, loser: &C) -> f64 {
        self.weight(winner, loser).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// The given pairs, heaviest first. Pairs of equal weight keep their order.
    pub fn sort_by_weight(&self, pairs: &mut [(C, C)]) {
        pairs.sort_by(|(a1, b1), (a2, b2)| {
            self.weight_or_zero(a2, b2)
                .total_cmp(&self.weight_or_zero(a1, b1))
        });
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct InductionSettings {
    pub upsampling: Upsampling,
    /// The seed of the run. A random seed is drawn if not provided.
    pub seed: Option<u64>,
}

impl InductionSettings {
    pub const DEFAULT: InductionSettings = InductionSettings {
        upsampling: Upsampling::None,
        seed: None,
    };
}

/// Turns the votes of one voter into a total order over the candidates.
///
/// Panics if one of the resolvers breaks its contract.
pub fn induce_ranking<C: Candidate>(
    votes: &[PairwiseVote<C>],
    candidates: &BTreeSet<C>,
    intransitivity: &IntransitivityResolver<C>,
    incompleteness: &IncompletenessResolver<C>,
    rng: &mut InductionRng,
) -> Ranking<C> {
    let acyclic = intransitivity.resolve(votes, rng);
    let complete = incompleteness.resolve(&acyclic, candidates, rng);
    let order = match complete.topological_sort() {
        Some(order) => order,
        None => panic!(
            "induce_ranking: the resolvers {:?} and {:?} produced a cyclic graph",
            intransitivity.strategy(),
            incompleteness.strategy()
        ),
    };
    assert_eq!(
        order.len(),
        complete.node_count(),
        "induce_ranking: incomplete order"
    );
    Ranking::strict(order)
}

/// The orderings induced from a ballot box.
#[derive(PartialEq, Debug, Clone)]
pub struct InducedBallots<C> {
    /// The vote sets the orderings were induced from. They differ from the vote
    /// sets of the ballot box when the votes are resampled.
    pub vote_sets: Vec<VoteSet<C>>,
    pub orderings: Vec<Ranking<C>>,
    /// The seed of the run, to replay it.
    pub seed: u64,
}

/// Names the random stream of a vote set. Anonymous vote sets are told apart by
/// their position.
fn voter_key(idx: usize, voter: &Option<String>) -> String {
    match voter {
        Some(v) => format!("voter:{}", v),
        None => format!("anonymous:{}", idx),
    }
}

/// Induces one ordering per vote set of the ballot box (or more, see `Upsampling`).
///
/// The vote sets are processed in parallel. Each vote set gets its own random
/// stream derived from the seed of the run and the voter, so that the result does
/// not depend on the scheduling.
pub fn induce_orderings<C, B>(
    ballot_box: &B,
    intransitivity: &IntransitivityResolver<C>,
    incompleteness: &IncompletenessResolver<C>,
    settings: &InductionSettings,
) -> InducedBallots<C>
where
    C: Candidate,
    B: BallotBox<C> + ?Sized,
{
    let seed = settings.seed.unwrap_or_else(InductionRng::entropy_seed);
    let candidates = ballot_box.candidates();
    let num_pairs = candidates.len() * candidates.len().saturating_sub(1) / 2;
    info!(
        "induce_orderings: {:?} candidates, {:?} / {:?}, upsampling {:?}, seed {}",
        candidates.len(),
        intransitivity.strategy(),
        incompleteness.strategy(),
        settings.upsampling,
        seed
    );

    let vote_sets: Vec<VoteSet<C>> = match settings.upsampling {
        Upsampling::ByVoter => ballot_box
            .vote_sets()
            .into_iter()
            .enumerate()
            .map(|(idx, vs)| {
                let key = format!("resample:{}", voter_key(idx, &vs.voter));
                let mut rng = InductionRng::derived(seed, &key);
                VoteSet {
                    votes: rng.sample_with_replacement(&vs.votes, num_pairs),
                    voter: vs.voter,
                }
            })
            .collect(),
        _ => ballot_box.vote_sets(),
    };

    let per_voter: Vec<Vec<Ranking<C>>> = vote_sets
        .par_iter()
        .enumerate()
        .map(|(idx, vs)| {
            let mut rng = InductionRng::derived(seed, &voter_key(idx, &vs.voter));
            let ranking = induce_ranking(
                &vs.votes,
                candidates,
                intransitivity,
                incompleteness,
                &mut rng,
            );
            debug!("induce_orderings: {:?} -> {:?}", vs.voter, ranking.flatten());
            let copies = match settings.upsampling {
                Upsampling::ByVote => vs.votes.len(),
                _ => 1,
            };
            vec![ranking; copies]
        })
        .collect();

    InducedBallots {
        vote_sets,
        orderings: per_voter.into_iter().flatten().collect(),
        seed,
    }
}

/// The same ranking method run on the pairwise votes and on the induced orderings.
#[derive(PartialEq, Debug, Clone)]
pub struct InductionComparison<C> {
    pub method: RankingMethod,
    pub pairwise_ranking: Ranking<C>,
    pub induced_ranking: Ranking<C>,
    /// Kendall's tau between the two rankings. None when it is undefined, which
    /// happens when one of the rankings ties all the candidates.
    pub tau: Option<f64>,
    pub seed: u64,
}

/// Ranks the ballot box directly and through vote induction, and measures how
/// close the two rankings are.
///
/// When the votes are resampled per voter, the direct ranking uses the resampled
/// votes as well. Fails for the methods that need orderings.
pub fn compare_with_induced<C, B>(
    ballot_box: &B,
    method: RankingMethod,
    intransitivity: &IntransitivityResolver<C>,
    incompleteness: &IncompletenessResolver<C>,
    settings: &InductionSettings,
) -> Result<InductionComparison<C>, VotingErrors>
where
    C: Candidate,
    B: BallotBox<C>,
{
    if method.requires_orderings() {
        return UnsupportedMethodSnafu {
            method: method.name(),
            capability: "pairwise votes to compare against",
        }
        .fail();
    }
    let induced = induce_orderings(ballot_box, intransitivity, incompleteness, settings);
    let candidates: Vec<C> = ballot_box.candidates().iter().cloned().collect();

    let pairwise_ranking = match settings.upsampling {
        Upsampling::ByVoter => {
            let votes: Vec<PairwiseVote<C>> = induced
                .vote_sets
                .iter()
                .flat_map(|vs| vs.votes.iter().cloned())
                .collect();
            let resampled = PairwiseBallotBox::new(votes, Some(candidates.clone()))?;
            Election::new(&resampled).ranking(method)?
        }
        _ => Election::new(ballot_box).ranking(method)?,
    };

    let ranked = RankedChoiceBallotBox::new(
        induced.orderings,
        Some(candidates),
        &BallotRules::DEFAULT_RULES,
    )?;
    let induced_ranking = Election::new(&ranked).ranking(method)?;
    let tau = match kendalls_tau(&pairwise_ranking, &induced_ranking) {
        Ok(tau) => Some(tau),
        Err(VotingErrors::UndefinedCorrelation { reason }) => {
            warn!("compare_with_induced: {}: no correlation: {}", method, reason);
            None
        }
        Err(e) => return Err(e),
    };
    info!(
        "compare_with_induced: {}: {:?} vs {:?}: tau={:?}",
        method,
        pairwise_ranking.flatten(),
        induced_ranking.flatten(),
        tau
    );
    Ok(InductionComparison {
        method,
        pairwise_ranking,
        induced_ranking,
        tau,
        seed: induced.seed,
    })
}
