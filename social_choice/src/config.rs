// ********* Input data structures ***********

use snafu::prelude::*;
use std::fmt::Display;
use std::str::FromStr;

/// The result of a pairwise comparison, seen from the first candidate.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Outcome {
    /// Parses the textual form used in vote files: `win`, `loss` or `tie`.
    pub fn parse(s: &str) -> Result<Outcome, VotingErrors> {
        match s.trim().to_lowercase().as_str() {
            "win" => Ok(Outcome::Win),
            "loss" => Ok(Outcome::Loss),
            "tie" => Ok(Outcome::Tie),
            _ => InvalidBallotDataSnafu {
                reason: format!("unknown outcome {:?}, expected win, loss or tie", s),
            }
            .fail(),
        }
    }

    pub fn flipped(self) -> Outcome {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Tie => Outcome::Tie,
        }
    }
}

impl FromStr for Outcome {
    type Err = VotingErrors;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Outcome::parse(s)
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Tie => "tie",
        };
        write!(f, "{}", s)
    }
}

/// A single pairwise comparison: `first` had `outcome` against `second`.
///
/// The voter is optional. A vote without a voter forms a vote set of its own
/// when vote sets are requested.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct PairwiseVote<C> {
    pub first: C,
    pub second: C,
    pub outcome: Outcome,
    pub voter: Option<String>,
}

impl<C: Clone> PairwiseVote<C> {
    pub fn new(first: C, second: C, outcome: Outcome) -> PairwiseVote<C> {
        PairwiseVote {
            first,
            second,
            outcome,
            voter: None,
        }
    }

    pub fn with_voter(first: C, second: C, outcome: Outcome, voter: &str) -> PairwiseVote<C> {
        PairwiseVote {
            first,
            second,
            outcome,
            voter: Some(voter.to_string()),
        }
    }

    /// The (winner, loser) pair, or None for a tie.
    pub fn winner_loser(&self) -> Option<(C, C)> {
        match self.outcome {
            Outcome::Win => Some((self.first.clone(), self.second.clone())),
            Outcome::Loss => Some((self.second.clone(), self.first.clone())),
            Outcome::Tie => None,
        }
    }
}

// ******** Errors *********

/// Errors that prevent a ballot box or an election from being used.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VotingErrors {
    /// A vote or a ballot is malformed.
    #[snafu(display("Invalid ballot data: {reason}"))]
    InvalidBallotData { reason: String },
    /// The declared candidates are malformed.
    #[snafu(display("Invalid election data: {reason}"))]
    InvalidElectionData { reason: String },
    /// The ranking method needs something the ballot box cannot provide.
    #[snafu(display("The method {method} requires {capability}"))]
    UnsupportedMethod { method: String, capability: String },
    #[snafu(display("The rankings cannot be compared: {reason}"))]
    MismatchedRankings { reason: String },
    #[snafu(display("The correlation is undefined: {reason}"))]
    UndefinedCorrelation { reason: String },
    #[snafu(display("Unknown {kind}: {value}"))]
    UnknownOption { kind: String, value: String },
}

// ********* Configuration **********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotRules {
    /// Every ballot must rank every candidate of the election.
    pub require_full_ballots: bool,
}

impl BallotRules {
    pub const DEFAULT_RULES: BallotRules = BallotRules {
        require_full_ballots: false,
    };
}

/// The election methods.
///
/// - RankedPairs locks the victories by decreasing margin, skipping the ones
/// that would create a cycle.
///
/// - Copeland counts victories minus defeats.
///
/// - Minimax ranks by the worst defeat margin, smaller is better.
///
/// - WinRatio and WinTieRatio use the share of won (and tied) comparisons.
///
/// - Borda needs full orderings: either ranked ballots, or induced ones.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RankingMethod {
    RankedPairs,
    Copeland,
    Minimax,
    WinRatio,
    WinTieRatio,
    Borda,
}

impl RankingMethod {
    pub const ALL: [RankingMethod; 6] = [
        RankingMethod::RankedPairs,
        RankingMethod::Copeland,
        RankingMethod::Minimax,
        RankingMethod::WinRatio,
        RankingMethod::WinTieRatio,
        RankingMethod::Borda,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RankingMethod::RankedPairs => "ranked_pairs",
            RankingMethod::Copeland => "copeland",
            RankingMethod::Minimax => "minimax",
            RankingMethod::WinRatio => "win_ratio",
            RankingMethod::WinTieRatio => "win_tie_ratio",
            RankingMethod::Borda => "borda",
        }
    }

    /// True if the method works on complete orderings rather than on the matchups.
    pub fn requires_orderings(&self) -> bool {
        matches!(self, RankingMethod::Borda)
    }
}

impl FromStr for RankingMethod {
    type Err = VotingErrors;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankingMethod::ALL
            .iter()
            .find(|m| m.name() == s)
            .copied()
            .context(UnknownOptionSnafu {
                kind: "ranking method",
                value: s,
            })
    }
}

impl Display for RankingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How the result of a ranking method is presented.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct RankOptions {
    /// Attach the score to each candidate.
    pub include_score: bool,
    /// Group the candidates with equal scores.
    pub group_ties: bool,
}

impl RankOptions {
    pub const DEFAULT: RankOptions = RankOptions {
        include_score: false,
        group_ties: false,
    };
    pub const SCORED: RankOptions = RankOptions {
        include_score: true,
        group_ties: false,
    };
    pub const GROUPED: RankOptions = RankOptions {
        include_score: false,
        group_ties: true,
    };
}

/// How the induced orderings are weighted before being used as ballots.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Upsampling {
    /// One ordering per voter.
    None,
    /// Each voter's votes are resampled with replacement, so that every voter
    /// casts as many votes as there are pairs of candidates.
    ByVoter,
    /// The ordering of a voter is repeated once per vote they cast.
    ByVote,
}

impl FromStr for Upsampling {
    type Err = VotingErrors;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Upsampling::None),
            "by_voter" => Ok(Upsampling::ByVoter),
            "by_vote" => Ok(Upsampling::ByVote),
            _ => UnknownOptionSnafu {
                kind: "upsampling",
                value: s,
            }
            .fail(),
        }
    }
}

impl Display for Upsampling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Upsampling::None => "none",
            Upsampling::ByVoter => "by_voter",
            Upsampling::ByVote => "by_vote",
        };
        write!(f, "{}", name)
    }
}

/// The strategies to turn a cyclic preference graph into an acyclic one.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum IntransitivityStrategy {
    BreakRandomLink,
    BreakWeakestLink,
    AddEdgesInOrder,
}

impl FromStr for IntransitivityStrategy {
    type Err = VotingErrors;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "break_random_link" => Ok(IntransitivityStrategy::BreakRandomLink),
            "break_weakest_link" => Ok(IntransitivityStrategy::BreakWeakestLink),
            "add_edges_in_order" => Ok(IntransitivityStrategy::AddEdgesInOrder),
            _ => UnknownOptionSnafu {
                kind: "intransitivity strategy",
                value: s,
            }
            .fail(),
        }
    }
}

impl Display for IntransitivityStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IntransitivityStrategy::BreakRandomLink => "break_random_link",
            IntransitivityStrategy::BreakWeakestLink => "break_weakest_link",
            IntransitivityStrategy::AddEdgesInOrder => "add_edges_in_order",
        };
        write!(f, "{}", name)
    }
}

/// The strategies to place the candidates a voter never compared.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum IncompletenessStrategy {
    PlaceRandomly,
    AddAllAtBeginning,
    AddAllAtEnd,
    AddRandomEdges,
    AddEdgesByWinRatio,
}

impl FromStr for IncompletenessStrategy {
    type Err = VotingErrors;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "place_randomly" => Ok(IncompletenessStrategy::PlaceRandomly),
            "add_all_at_beginning" => Ok(IncompletenessStrategy::AddAllAtBeginning),
            "add_all_at_end" => Ok(IncompletenessStrategy::AddAllAtEnd),
            "add_random_edges" => Ok(IncompletenessStrategy::AddRandomEdges),
            "add_edges_by_win_ratio" => Ok(IncompletenessStrategy::AddEdgesByWinRatio),
            _ => UnknownOptionSnafu {
                kind: "incompleteness strategy",
                value: s,
            }
            .fail(),
        }
    }
}

impl Display for IncompletenessStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IncompletenessStrategy::PlaceRandomly => "place_randomly",
            IncompletenessStrategy::AddAllAtBeginning => "add_all_at_beginning",
            IncompletenessStrategy::AddAllAtEnd => "add_all_at_end",
            IncompletenessStrategy::AddRandomEdges => "add_random_edges",
            IncompletenessStrategy::AddEdgesByWinRatio => "add_edges_by_win_ratio",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_parsing() {
        assert_eq!(Outcome::parse("win"), Ok(Outcome::Win));
        assert_eq!(Outcome::parse(" Loss "), Ok(Outcome::Loss));
        assert_eq!("tie".parse::<Outcome>(), Ok(Outcome::Tie));
        assert!(matches!(
            Outcome::parse("draw"),
            Err(VotingErrors::InvalidBallotData { .. })
        ));
    }

    #[test]
    fn winner_loser_follows_outcome() {
        assert_eq!(PairwiseVote::new(1, 2, Outcome::Win).winner_loser(), Some((1, 2)));
        assert_eq!(PairwiseVote::new(1, 2, Outcome::Loss).winner_loser(), Some((2, 1)));
        assert_eq!(PairwiseVote::new(1, 2, Outcome::Tie).winner_loser(), None);
    }

    #[test]
    fn method_names() {
        for m in RankingMethod::ALL {
            assert_eq!(m.name().parse::<RankingMethod>(), Ok(m));
        }
        assert!("instant_runoff".parse::<RankingMethod>().is_err());
        assert!(RankingMethod::Borda.requires_orderings());
        assert!(!RankingMethod::Copeland.requires_orderings());
    }

    #[test]
    fn strategy_names() {
        for name in ["break_random_link", "break_weakest_link", "add_edges_in_order"] {
            let s: IntransitivityStrategy = name.parse().unwrap();
            assert_eq!(s.to_string(), name);
        }
        for name in [
            "place_randomly",
            "add_all_at_beginning",
            "add_all_at_end",
            "add_random_edges",
            "add_edges_by_win_ratio",
        ] {
            let s: IncompletenessStrategy = name.parse().unwrap();
            assert_eq!(s.to_string(), name);
        }
        assert_eq!("by_vote".parse::<Upsampling>().unwrap().to_string(), "by_vote");
        assert!(matches!(
            "sometimes".parse::<Upsampling>(),
            Err(VotingErrors::UnknownOption { .. })
        ));
    }
}
