//! Dealing secret roles at the start of a round.
//!
//! The shape of a deal is fixed: `max(floor(n * ratio), 1)` Werewolves,
//! everybody else a Villager. Who gets which role is a uniform random
//! permutation of the roster.

use nightfall_protocol::{Player, Role};
use rand::Rng;
use rand::seq::SliceRandom;

/// Deals and clears roles. Stateless; every function borrows the roster
/// and returns a new one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleAssigner;

impl RoleAssigner {
    /// Number of Werewolves for a roster of `players` at `ratio`.
    ///
    /// Zero for an empty roster, otherwise at least one and never more
    /// than `players`.
    pub fn werewolf_count(players: usize, ratio: f64) -> usize {
        if players == 0 {
            return 0;
        }
        let scaled = (players as f64 * ratio).floor();
        let count = if scaled.is_finite() && scaled >= 1.0 {
            scaled as usize
        } else {
            1
        };
        count.clamp(1, players)
    }

    /// Deals roles using the thread-local RNG.
    pub fn assign(players: &[Player], ratio: f64) -> Vec<Player> {
        Self::assign_with(players, ratio, &mut rand::rng())
    }

    /// Deals roles using `rng`.
    ///
    /// The returned roster keeps the input order; only the roles are
    /// random. An empty roster comes back empty.
    pub fn assign_with<R: Rng + ?Sized>(players: &[Player], ratio: f64, rng: &mut R) -> Vec<Player> {
        let mut dealt = players.to_vec();
        let werewolves = Self::werewolf_count(dealt.len(), ratio);

        let mut order: Vec<usize> = (0..dealt.len()).collect();
        order.shuffle(rng);
        for (rank, &index) in order.iter().enumerate() {
            dealt[index].role = Some(if rank < werewolves {
                Role::Werewolf
            } else {
                Role::Villager
            });
        }
        dealt
    }

    /// Clears every role, order preserved.
    pub fn unassign(players: &[Player]) -> Vec<Player> {
        players
            .iter()
            .map(|player| Player {
                role: None,
                ..player.clone()
            })
            .collect()
    }
}
