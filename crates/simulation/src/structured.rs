//! Structured multi-cycle topology from modular stride search.
//!
//! Instead of sampling neighbors by randomness or latency, this strategy
//! derives them from arithmetic on the roster indices: it searches for a
//! set of strides `s` with `gcd(s, n) == 1`, each of which generates a
//! single cycle visiting all `n` nodes, and wires every node to its `+s`
//! and `-s` offsets. The union of `ceil(degree/2)` such cycles is a
//! low-diameter, expander-like graph that stays connected under random
//! node removal.

use crate::strategy::{BindContext, Strategy};
use crate::SimulationError;
use gossipsim_types::NodeId;
use tracing::debug;

/// 2^31 - 1 (Mersenne prime).
const STRIDE_PRIME_A: u64 = 0x7FFF_FFFF;
/// 14! - 1.
const STRIDE_PRIME_B: u64 = 87_178_291_199;

/// Deterministic expander-like neighbor selection.
///
/// Builds `ceil(degree/2)` edge-disjoint cycles through all `n` nodes and
/// takes both cycle neighbors along each, for `2 * ceil(degree/2)`
/// neighbors in the regular case. Small rosters degrade to a single
/// stride-1 cycle rather than failing.
#[derive(Debug)]
pub struct StructuredCycleStrategy {
    degree: usize,
    strides: Vec<u64>,
    neighbors: Vec<NodeId>,
}

impl StructuredCycleStrategy {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            strides: Vec::new(),
            neighbors: Vec::new(),
        }
    }

    /// The accepted strides. Available after binding.
    pub fn strides(&self) -> &[u64] {
        &self.strides
    }
}

impl Strategy for StructuredCycleStrategy {
    fn bind(&mut self, ctx: &mut BindContext<'_>) -> Result<(), SimulationError> {
        let n = ctx.roster.len() as u64;
        if n <= 1 {
            // A roster of one node has no one to gossip with.
            return Ok(());
        }

        let cycle_count = self.degree.div_ceil(2);
        self.strides = search_strides(n, cycle_count);

        debug!(
            node = %ctx.self_id,
            n,
            degree = self.degree,
            strides = ?self.strides,
            "Resolved cycle strides"
        );

        // Neighbors are the +s and -s offsets along every cycle. Offsets
        // can collide for tiny rosters (e.g. 2s == n), so dedupe rather
        // than violate the no-duplicates invariant.
        let own = ctx.self_id.0 as u64;
        let mut neighbors = Vec::with_capacity(self.strides.len() * 2);
        let offsets = self
            .strides
            .iter()
            .map(|s| (own + s) % n)
            .chain(self.strides.iter().map(|s| (own + n - s) % n));
        for offset in offsets {
            let id = NodeId(offset as u32);
            if id != ctx.self_id && !neighbors.contains(&id) {
                neighbors.push(id);
            }
        }
        self.neighbors = neighbors;
        Ok(())
    }

    fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }
}

/// Find up to `count` strides for an `n`-node roster.
///
/// Candidates are `(i * generator) mod half` for `i = 1, 2, ...`, where
/// the generator is one of two fixed primes reduced mod `half` —
/// whichever lands closer to `half/2`, so strides spread across the range
/// instead of clustering near 0 or `half` (which would produce poorly
/// mixing cycles). A candidate with `gcd(candidate, n) == 1` generates a
/// single n-cycle and is accepted; `gcd == 2` generates two disjoint
/// n/2-cycles and is kept as backup in case full cycles are scarce.
///
/// Rosters too small to search (`half < 2`), or generators that never
/// produce a usable candidate, fall back to the trivial stride 1.
fn search_strides(n: u64, count: usize) -> Vec<u64> {
    let half = n / 2;
    if half < 2 {
        return vec![1];
    }

    let goal = half / 2;
    let cp_a = STRIDE_PRIME_A % half;
    let cp_b = STRIDE_PRIME_B % half;
    let generator = if cp_a.abs_diff(goal) < cp_b.abs_diff(goal) {
        cp_a
    } else {
        cp_b
    };

    // Values >= half are equivalent to values below it, in the other
    // direction around the cycle, so the search stops at half.
    let mut primary = Vec::new();
    let mut backup = Vec::new();
    let mut i: u64 = 1;
    while primary.len() < count && i < half {
        let candidate = ((i as u128 * generator as u128) % half as u128) as u64;
        match gcd(candidate, n) {
            1 if !primary.contains(&candidate) => primary.push(candidate),
            2 if !backup.contains(&candidate) => backup.push(candidate),
            _ => {}
        }
        i += 1;
    }

    for stride in backup {
        if primary.len() >= count {
            break;
        }
        primary.push(stride);
    }

    if primary.is_empty() {
        primary.push(1);
    }
    primary
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
