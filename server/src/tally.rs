//! Vote counting and elimination resolution
//!
//! Ballots are counted in the order they were cast. The winner is the target
//! with the most votes; ties are settled by an explicit [`TieBreak`] policy
//! instead of whatever order a map happens to iterate in.

use rand::seq::SliceRandom;
use rand::Rng;
use shared::{Ballot, PlayerId};

/// How a tie between equally-voted targets is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TieBreak {
    /// The tied target that received its first vote earliest wins
    #[default]
    FirstCast,
    /// Uniformly random among the tied targets
    Random,
}

/// Outcome of a resolved vote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub target: PlayerId,
    pub votes: usize,
    /// All targets that shared the top count, in first-vote order
    pub tied: Vec<PlayerId>,
}

impl Tally {
    pub fn was_tie(&self) -> bool {
        self.tied.len() > 1
    }
}

/// Counts votes per target, listed in the order each target first received a vote.
/// Ballots naming a target outside `eligible` are ignored.
pub fn count_votes(ballots: &[Ballot], eligible: &[PlayerId]) -> Vec<(PlayerId, usize)> {
    let mut counts: Vec<(PlayerId, usize)> = Vec::new();

    for ballot in ballots {
        if !eligible.contains(&ballot.target_id) {
            continue;
        }
        match counts.iter_mut().find(|(target, _)| *target == ballot.target_id) {
            Some((_, n)) => *n += 1,
            None => counts.push((ballot.target_id, 1)),
        }
    }

    counts
}

/// Resolves the plurality target, or None when no ballot names an eligible target
pub fn resolve<R: Rng + ?Sized>(
    ballots: &[Ballot],
    eligible: &[PlayerId],
    policy: TieBreak,
    rng: &mut R,
) -> Option<Tally> {
    let counts = count_votes(ballots, eligible);
    let top = counts.iter().map(|(_, n)| *n).max()?;

    let tied: Vec<PlayerId> = counts
        .iter()
        .filter(|(_, n)| *n == top)
        .map(|(target, _)| *target)
        .collect();

    let target = match policy {
        TieBreak::FirstCast => *tied.first()?,
        TieBreak::Random => *tied.choose(rng)?,
    };

    Some(Tally {
        target,
        votes: top,
        tied,
    })
}
