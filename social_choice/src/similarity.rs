use snafu::prelude::*;

use std::collections::{BTreeMap, BTreeSet};

use crate::config::*;
use crate::ranking::Ranking;
use crate::Candidate;

// The position of each candidate. Tied candidates all get the mean of the
// positions their group spans.
fn positions<C: Candidate>(r: &Ranking<C>) -> Result<BTreeMap<C, f64>, VotingErrors> {
    let mut res: BTreeMap<C, f64> = BTreeMap::new();
    let mut cursor: usize = 0;
    for slot in r.slots() {
        let k = slot.len();
        let pos = cursor as f64 + (k as f64 + 1.0) / 2.0;
        for c in slot {
            ensure!(
                res.insert(c.clone(), pos).is_none(),
                MismatchedRankingsSnafu {
                    reason: format!("candidate {:?} appears twice", c),
                }
            );
        }
        cursor += k;
    }
    Ok(res)
}

/// Kendall's rank correlation (tau-b) between two rankings of the same candidates.
///
/// Ties are allowed: tied candidates are placed at the mean of the positions they
/// occupy. The result is between -1 (reversed) and 1 (identical).
///
/// Fails if the rankings do not contain the same candidates, or if the correlation
/// is undefined (fewer than two candidates, or one ranking ties everything).
pub fn kendalls_tau<C: Candidate>(r1: &Ranking<C>, r2: &Ranking<C>) -> Result<f64, VotingErrors> {
    let p1 = positions(r1)?;
    let p2 = positions(r2)?;
    ensure!(
        p1.keys().eq(p2.keys()),
        MismatchedRankingsSnafu {
            reason: format!(
                "the rankings {:?} and {:?} do not have the same candidates",
                r1, r2
            ),
        }
    );
    let pairs: Vec<(f64, f64)> = p1.iter().map(|(c, x)| (*x, p2[c])).collect();
    let mut concordant: u64 = 0;
    let mut discordant: u64 = 0;
    let mut x_ties: u64 = 0;
    let mut y_ties: u64 = 0;
    let mut total: u64 = 0;
    for (i, (x1, y1)) in pairs.iter().enumerate() {
        for (x2, y2) in pairs.iter().skip(i + 1) {
            total += 1;
            let dx = x1 - x2;
            let dy = y1 - y2;
            if dx == 0.0 {
                x_ties += 1;
            }
            if dy == 0.0 {
                y_ties += 1;
            }
            if dx * dy > 0.0 {
                concordant += 1;
            } else if dx * dy < 0.0 {
                discordant += 1;
            }
        }
    }
    let denominator = ((total - x_ties) as f64 * (total - y_ties) as f64).sqrt();
    ensure!(
        denominator > 0.0,
        UndefinedCorrelationSnafu {
            reason: format!(
                "{} pairs, {} tied in the first ranking, {} tied in the second",
                total, x_ties, y_ties
            ),
        }
    );
    Ok((concordant as f64 - discordant as f64) / denominator)
}

/// The number of pairs that are not in the same order in both orderings.
///
/// [1, 2, 3] and [1, 3, 2] have one inversion, [1, 2, 3] and [3, 1, 2] have two.
pub fn num_inversions<C: Candidate>(o1: &[C], o2: &[C]) -> Result<usize, VotingErrors> {
    let s1: BTreeSet<&C> = o1.iter().collect();
    let s2: BTreeSet<&C> = o2.iter().collect();
    ensure!(
        s1 == s2 && s1.len() == o1.len() && s2.len() == o2.len(),
        MismatchedRankingsSnafu {
            reason: format!("orderings {:?} and {:?} differ", o1, o2),
        }
    );
    let pos2: BTreeMap<&C, usize> = o2.iter().enumerate().map(|(i, c)| (c, i)).collect();
    let mut inversions = 0;
    for (i, c1) in o1.iter().enumerate() {
        for c2 in o1.iter().skip(i + 1) {
            if pos2[c1] > pos2[c2] {
                inversions += 1;
            }
        }
    }
    Ok(inversions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn tau_of_strict_rankings() {
        let a: Ranking<u32> = vec![1, 2, 3].into();
        let b: Ranking<u32> = vec![1, 3, 2].into();
        let c: Ranking<u32> = vec![3, 2, 1].into();
        assert!(close(kendalls_tau(&a, &a).unwrap(), 1.0));
        assert!(close(kendalls_tau(&a, &b).unwrap(), 1.0 / 3.0));
        assert!(close(kendalls_tau(&a, &c).unwrap(), -1.0));
    }

    #[test]
    fn tau_with_ties() {
        let a: Ranking<u32> = vec![1, 2, 3].into();
        let b = Ranking::new(vec![vec![1], vec![2, 3]]);
        // 2 concordant, 1 pair tied in b only: 2 / sqrt(3 * 2)
        assert!(close(kendalls_tau(&a, &b).unwrap(), 2.0 / 6f64.sqrt()));
        let all_tied = Ranking::new(vec![vec![1, 2, 3]]);
        assert!(matches!(
            kendalls_tau(&a, &all_tied),
            Err(VotingErrors::UndefinedCorrelation { .. })
        ));
    }

    #[test]
    fn tau_needs_the_same_candidates() {
        let a: Ranking<u32> = vec![1, 2, 3].into();
        let b: Ranking<u32> = vec![1, 2, 4].into();
        assert!(matches!(
            kendalls_tau(&a, &b),
            Err(VotingErrors::MismatchedRankings { .. })
        ));
        let single: Ranking<u32> = vec![1].into();
        assert!(kendalls_tau(&single, &single).is_err());
    }

    #[test]
    fn inversions() {
        assert_eq!(num_inversions(&[1, 2, 3], &[1, 3, 2]), Ok(1));
        assert_eq!(num_inversions(&[1, 2, 3], &[3, 1, 2]), Ok(2));
        assert_eq!(num_inversions(&[1, 2, 3], &[3, 2, 1]), Ok(3));
        assert!(num_inversions(&[1, 2, 3], &[1, 2]).is_err());
        assert!(num_inversions(&[1, 1, 2], &[1, 2, 2]).is_err());
    }
}
