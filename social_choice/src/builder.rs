pub use crate::ballot_box::*;
pub use crate::config::*;
pub use crate::ranking::*;

/// A builder for ranked ballots.
///
/// ```
/// pub use social_choice::builder::Builder;
/// pub use social_choice::{BallotBox, BallotRules, Election, RankingMethod, RankOptions};
/// # use social_choice::VotingErrors;
///
/// let mut builder = Builder::new(&BallotRules::DEFAULT_RULES)?
///     .candidates(&["Anna".to_string(), "Bob".to_string(), "Clara".to_string()])?;
///
/// builder.add_vote_simple(&["Anna".to_string(), "Clara".to_string()])?;
/// builder.add_vote(&[vec!["Bob".to_string()], vec!["Anna".to_string(), "Clara".to_string()]], 2)?;
///
/// let ballot_box = builder.build()?;
/// assert_eq!(ballot_box.candidates().len(), 3);
/// let ranking = Election::new(&ballot_box).rank(RankingMethod::Borda, &RankOptions::DEFAULT)?;
/// assert_eq!(ranking.flatten()[0], "Bob".to_string());
///
/// # Ok::<(), VotingErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: BallotRules,
    pub(crate) _candidates: Option<Vec<String>>,
    pub(crate) _ballots: Vec<Ranking<String>>,
}

impl Builder {
    pub fn new(rules: &BallotRules) -> Result<Builder, VotingErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _candidates: None,
            _ballots: Vec::new(),
        })
    }

    /// Declares the candidates. Ballots that were added before are kept.
    pub fn candidates(self, cands: &[String]) -> Result<Builder, VotingErrors> {
        Ok(Builder {
            _rules: self._rules,
            _candidates: Some(cands.to_vec()),
            _ballots: self._ballots,
        })
    }

    /// Adds a ballot without ties, best choice first.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_vote_simple(&mut self, candidates: &[String]) -> Result<(), VotingErrors> {
        let slots: Vec<Vec<String>> = candidates.iter().map(|c| vec![c.clone()]).collect();
        self.add_vote(&slots, 1)
    }

    /// Adds a ballot, repeated `count` times.
    ///
    /// candidates: the ranks of the ballot, in order. Each rank holds one candidate,
    /// or several tied candidates. The ballot is checked when `build` is called.
    pub fn add_vote(&mut self, candidates: &[Vec<String>], count: u32) -> Result<(), VotingErrors> {
        let ranking = Ranking::new(candidates.to_vec());
        for _ in 0..count {
            self._ballots.push(ranking.clone());
        }
        Ok(())
    }

    pub fn build(self) -> Result<RankedChoiceBallotBox<String>, VotingErrors> {
        RankedChoiceBallotBox::new(self._ballots, self._candidates, &self._rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(x: &str) -> String {
        x.to_string()
    }

    #[test]
    fn build_checks_the_ballots() {
        let mut builder = Builder::new(&BallotRules {
            require_full_ballots: true,
        })
        .unwrap()
        .candidates(&[s("a"), s("b")])
        .unwrap();
        builder.add_vote_simple(&[s("a")]).unwrap();
        assert!(matches!(
            builder.build(),
            Err(VotingErrors::InvalidBallotData { .. })
        ));
    }

    #[test]
    fn counts_repeat_ballots() {
        let mut builder = Builder::new(&BallotRules::DEFAULT_RULES).unwrap();
        builder.add_vote(&[vec![s("a")], vec![s("b")]], 3).unwrap();
        builder.add_vote(&[vec![s("b")], vec![s("a")]], 0).unwrap();
        let bb = builder.build().unwrap();
        assert_eq!(bb.ballots().len(), 3);
        assert_eq!(bb.matchups()[&s("a")][&s("b")].wins, 3);
    }
}
