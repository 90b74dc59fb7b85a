//! Social choice rankings computed from pairwise comparisons and ranked ballots.
//!
//! The crate is organised around the [`BallotBox`] trait: a ballot box turns raw
//! votes into a tally of matchups, from which the [`MatchupGraph`] and the victory
//! graph are derived. An [`Election`] runs the graph-based ranking methods on top of
//! any ballot box.
//!
//! Pairwise data can also be turned into synthetic ranked ballots through vote
//! induction (see the [`induction`] module): each voter's preferences are first made
//! acyclic, then extended to cover every candidate, and finally read back as a total
//! order.
//!
//! Consult the [`manual`] for an overview of the methods and strategies.

mod ballot_box;
pub mod builder;
mod config;
mod election;
mod graph;
pub mod induction;
pub mod manual;
mod matchup;
mod ranking;
mod rng;
mod similarity;

use std::fmt::Debug;
use std::hash::Hash;

pub use crate::ballot_box::*;
pub use crate::config::*;
pub use crate::election::*;
pub use crate::graph::*;
pub use crate::matchup::*;
pub use crate::ranking::*;
pub use crate::rng::InductionRng;
pub use crate::similarity::*;

/// Anything that can stand for a candidate.
///
/// The identifier is opaque to the algorithms: it only needs to be comparable and
/// hashable. The ordering is used to break ties deterministically.
pub trait Candidate: Clone + Eq + Ord + Hash + Debug + Send + Sync {}

impl<T> Candidate for T where T: Clone + Eq + Ord + Hash + Debug + Send + Sync {}
