//! Fair rotation over a campaign's winners.
//!
//! Each campaign gets a shuffled permutation of its winner indices and a
//! cursor. Picks walk the permutation; when the cursor wraps, the permutation
//! is reshuffled in place. Within one cycle no winner repeats, and after `k`
//! full cycles every winner has been picked exactly `k` times.
//!
//! State survives re-ingestion as long as the winner membership is the same.
//! If only the row order changed, the permutation is rewritten to point at
//! the new indices and the cursor is kept.

use std::collections::{HashMap, VecDeque};

use igdraw_core::{Campaign, Winner};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Per-campaign rotation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    order: Vec<usize>,
    cursor: usize,
    key: String,
    members: Vec<String>,
}

impl RotationState {
    /// The current permutation of winner indices.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Position in [`Self::order`] of the next pick.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Fingerprint of the membership this state was built for.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// What [`RotationEngine::ensure_rotation`] did to a campaign's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationChange {
    Unchanged,
    Reindexed,
    Reseeded,
}

/// A drawn winner, with its 1-based position in the campaign's winner list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedWinner {
    pub username: String,
    pub profile_url: String,
    pub comment: String,
    pub order: usize,
}

/// Membership fingerprint: sorted `username-profileUrl` pairs joined by `|`.
#[must_use]
pub fn fingerprint(winners: &[Winner]) -> String {
    let mut identities: Vec<String> = winners.iter().map(Winner::identity).collect();
    identities.sort_unstable();
    identities.join("|")
}

/// Fisher–Yates: for `i` from `n-1` down to 1, swap with a uniform `j` in
/// `[0, i]`.
fn shuffle<R: Rng>(order: &mut [usize], rng: &mut R) {
    for i in (1..order.len()).rev() {
        let j = rng.random_range(0..=i);
        order.swap(i, j);
    }
}

/// Maps each entry of `old_order` (indices into `old_members`) onto the index
/// of the same identity in `new_members`. Repeated identities are matched by
/// occurrence.
fn remap_order(
    old_order: &[usize],
    old_members: &[String],
    new_members: &[String],
) -> Option<Vec<usize>> {
    let mut positions: HashMap<&str, VecDeque<usize>> = HashMap::new();
    for (idx, identity) in new_members.iter().enumerate() {
        positions.entry(identity.as_str()).or_default().push_back(idx);
    }

    let mut old_to_new = vec![0usize; old_members.len()];
    for (old_idx, identity) in old_members.iter().enumerate() {
        old_to_new[old_idx] = positions.get_mut(identity.as_str())?.pop_front()?;
    }

    old_order
        .iter()
        .map(|&old_idx| old_to_new.get(old_idx).copied())
        .collect()
}

/// Rotation state for every stored campaign, keyed by shortcode.
#[derive(Debug)]
pub struct RotationEngine<R = StdRng> {
    states: HashMap<String, RotationState>,
    rng: R,
}

impl RotationEngine<StdRng> {
    /// Engine backed by an OS-seeded RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic engine for tests and reproducible draws.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RotationEngine<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RotationEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            states: HashMap::new(),
            rng,
        }
    }

    /// Creates or reconciles the rotation state for `shortcode`.
    ///
    /// An empty winner list leaves any existing state untouched.
    pub fn ensure_rotation(&mut self, shortcode: &str, winners: &[Winner]) -> RotationChange {
        if winners.is_empty() {
            return RotationChange::Unchanged;
        }

        let members: Vec<String> = winners.iter().map(Winner::identity).collect();
        let key = fingerprint(winners);

        if let Some(state) = self.states.get_mut(shortcode) {
            if state.key == key {
                if state.members == members {
                    return RotationChange::Unchanged;
                }
                if let Some(order) = remap_order(&state.order, &state.members, &members) {
                    state.order = order;
                    state.members = members;
                    return RotationChange::Reindexed;
                }
            }
        }

        let mut order: Vec<usize> = (0..winners.len()).collect();
        shuffle(&mut order, &mut self.rng);
        self.states.insert(
            shortcode.to_owned(),
            RotationState {
                order,
                cursor: 0,
                key,
                members,
            },
        );
        RotationChange::Reseeded
    }

    /// Draws the next winner for `campaign`, reconciling its state first.
    ///
    /// Returns `None` only when the campaign has no winners.
    pub fn pick_winner(&mut self, campaign: &Campaign) -> Option<PickedWinner> {
        if campaign.winners.is_empty() {
            return None;
        }
        self.ensure_rotation(&campaign.shortcode, &campaign.winners);

        let Self { states, rng } = self;
        let state = states.get_mut(&campaign.shortcode)?;

        let idx = *state.order.get(state.cursor)?;
        let winner = campaign.winners.get(idx)?;

        state.cursor = (state.cursor + 1) % state.order.len();
        if state.cursor == 0 {
            shuffle(&mut state.order, rng);
        }

        Some(PickedWinner {
            username: winner.username.clone(),
            profile_url: winner.profile_url.clone(),
            comment: winner.comment.clone(),
            order: idx + 1,
        })
    }

    /// Drops state for every shortcode `keep` rejects.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.states.retain(|shortcode, _| keep(shortcode));
    }

    #[must_use]
    pub fn state(&self, shortcode: &str) -> Option<&RotationState> {
        self.states.get(shortcode)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
#[path = "rotation_test.rs"]
mod tests;
