//! Deterministic per-agent, per-realisation RNG.
//!
//! # Determinism strategy
//!
//! Each agent gets its own independent `SmallRng` for each realisation,
//! seeded by:
//!
//!   seed = global_seed XOR (realisation * REALISATION_MIX) XOR (agent * AGENT_MIX)
//!
//! Both constants are odd 64-bit mixers (golden ratio and the SplitMix64
//! increment), which spread consecutive ids across the seed space.  This
//! means:
//!
//! - Agents never share RNG state, so the per-agent phase can run on any
//!   number of threads and still produce identical results.
//! - Realisation `r` of a run is reproducible in isolation (`--min r`).

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::AgentId;

/// 64-bit fractional golden-ratio constant for agent seed mixing.
const AGENT_MIX: u64 = 0x9e37_79b9_7f4a_7c15;
/// Second odd mixer so realisation and agent offsets don't cancel.
const REALISATION_MIX: u64 = 0xbf58_476d_1ce4_e5b9;

/// Per-agent deterministic RNG.
///
/// Created on the worker that processes the agent and dropped when the
/// agent's schedule is built; never shared across threads.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run seed, realisation index and agent.
    pub fn new(global_seed: u64, realisation: u32, agent: AgentId) -> Self {
        let seed = global_seed
            ^ (realisation as u64).wrapping_mul(REALISATION_MIX)
            ^ (agent.0 as u64).wrapping_mul(AGENT_MIX);
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types
    /// (`WeightedIndex`, `Uniform`, …).
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }
}
