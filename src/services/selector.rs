//! Reviewer selection.
//!
//! Pure choice over a candidate pool. The randomness source is passed in
//! explicitly; [`ReviewerSelector`] owns a seedable generator for the
//! services that share it across requests.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::models::User;

/// Maximum number of reviewers assigned when a pull request is created.
pub const MAX_REVIEWERS: usize = 2;

/// Choose up to `max` distinct reviewers.
///
/// Returns every candidate, in input order, when there are no more than
/// `max` of them. Otherwise samples `max` candidates uniformly without
/// replacement.
pub fn select_reviewers<R: Rng + ?Sized>(
    candidates: Vec<User>,
    max: usize,
    rng: &mut R,
) -> Vec<User> {
    if candidates.len() <= max {
        return candidates;
    }
    candidates.choose_multiple(rng, max).cloned().collect()
}

/// Choose one replacement reviewer uniformly, or `None` for an empty pool.
pub fn select_replacement<R: Rng + ?Sized>(candidates: &[User], rng: &mut R) -> Option<User> {
    candidates.choose(rng).cloned()
}

/// Shared, seedable selection state.
pub struct ReviewerSelector {
    rng: Mutex<StdRng>,
}

impl ReviewerSelector {
    /// Deterministic selector for a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Selector seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn select_reviewers(&self, candidates: Vec<User>, max: usize) -> Vec<User> {
        // A panic mid-selection leaves the generator in a valid state.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        select_reviewers(candidates, max, &mut *rng)
    }

    pub fn select_replacement(&self, candidates: &[User]) -> Option<User> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        select_replacement(candidates, &mut *rng)
    }
}
