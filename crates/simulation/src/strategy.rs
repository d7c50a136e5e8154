//! Neighbor-selection strategies.
//!
//! A [`Strategy`] decides, once per simulation, which peers a node will
//! forward broadcasts to. Binding happens during `Network::initialize`
//! (never per-packet): the strategy sees the full roster, the latency
//! model, and the network's seeded RNG, and fixes its neighbor list for
//! the rest of the run.
//!
//! All strategies guarantee: the owning node never appears in its own
//! neighbor list, and the list contains no duplicates.

use crate::SimulationError;
use gossipsim_latency::LatencyModel;
use gossipsim_types::{Location, MessageId, NodeId};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Everything a strategy may consult while building its neighbor list.
///
/// Handed to [`Strategy::bind`] exactly once, during network
/// initialization. The RNG is the network's seeded RNG, shared across all
/// bindings in roster order, so neighbor selection is reproducible.
pub struct BindContext<'a> {
    /// The node this strategy belongs to.
    pub self_id: NodeId,
    /// That node's location.
    pub self_location: &'a Location,
    /// The full roster, in network order.
    pub roster: &'a [(NodeId, Location)],
    /// Pairwise latency/loss lookups.
    pub latency: &'a LatencyModel,
    /// Seeded RNG for randomized selection.
    pub rng: &'a mut ChaCha8Rng,
}

impl BindContext<'_> {
    /// Roster entries excluding the owning node.
    pub fn peers(&self) -> impl Iterator<Item = &(NodeId, Location)> + '_ {
        self.roster.iter().filter(|(id, _)| *id != self.self_id)
    }

    /// Number of distinct peers available.
    pub fn peer_count(&self) -> usize {
        self.roster.len().saturating_sub(1)
    }
}

/// A neighbor-selection policy.
///
/// Mutable only during [`bind`](Self::bind); immutable afterward. The
/// forwarding rule is flood-once gossip: forward to every neighbor except
/// the one the message came from.
pub trait Strategy: std::fmt::Debug {
    /// Build the fixed neighbor list. Called exactly once per node.
    fn bind(&mut self, ctx: &mut BindContext<'_>) -> Result<(), SimulationError>;

    /// The resolved neighbor list.
    fn neighbors(&self) -> &[NodeId];

    /// Who to forward a message to.
    ///
    /// `sender` is `None` for the originating broadcast (forward to all
    /// neighbors); otherwise all neighbors except the sender.
    fn forward_list(&self, sender: Option<NodeId>, _message: MessageId) -> Vec<NodeId> {
        match sender {
            None => self.neighbors().to_vec(),
            Some(from) => self
                .neighbors()
                .iter()
                .copied()
                .filter(|&n| n != from)
                .collect(),
        }
    }
}

/// Error unless the roster can supply `degree` distinct neighbors.
fn check_degree(degree: usize, ctx: &BindContext<'_>) -> Result<(), SimulationError> {
    let peers = ctx.peer_count();
    if degree >= peers {
        return Err(SimulationError::DegreeTooLarge { degree, peers });
    }
    Ok(())
}

/// The `count` peers closest to the owning node by latency, excluding any
/// already in `chosen`. Ties broken by roster order (stable sort).
fn closest_peers(ctx: &BindContext<'_>, count: usize, chosen: &[NodeId]) -> Vec<NodeId> {
    let mut candidates: Vec<&(NodeId, Location)> = ctx
        .peers()
        .filter(|(id, _)| !chosen.contains(id))
        .collect();
    candidates.sort_by(|(_, a), (_, b)| {
        let la = ctx.latency.get_latency(ctx.self_location, a);
        let lb = ctx.latency.get_latency(ctx.self_location, b);
        la.total_cmp(&lb)
    });
    candidates.into_iter().take(count).map(|(id, _)| *id).collect()
}

/// `count` peers drawn uniformly without replacement, excluding any
/// already in `chosen`.
fn random_peers(ctx: &mut BindContext<'_>, count: usize, chosen: &[NodeId]) -> Vec<NodeId> {
    let mut candidates: Vec<NodeId> = ctx
        .peers()
        .map(|(id, _)| *id)
        .filter(|id| !chosen.contains(id))
        .collect();
    candidates.shuffle(ctx.rng);
    candidates.truncate(count);
    candidates
}

/// Uniform random neighbor selection.
#[derive(Debug)]
pub struct RandomStrategy {
    degree: usize,
    neighbors: Vec<NodeId>,
}

impl RandomStrategy {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            neighbors: Vec::new(),
        }
    }
}

impl Strategy for RandomStrategy {
    fn bind(&mut self, ctx: &mut BindContext<'_>) -> Result<(), SimulationError> {
        check_degree(self.degree, ctx)?;
        self.neighbors = random_peers(ctx, self.degree, &[]);
        Ok(())
    }

    fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }
}

/// Lowest-latency neighbor selection.
#[derive(Debug)]
pub struct GreedyStrategy {
    degree: usize,
    neighbors: Vec<NodeId>,
}

impl GreedyStrategy {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            neighbors: Vec::new(),
        }
    }
}

impl Strategy for GreedyStrategy {
    fn bind(&mut self, ctx: &mut BindContext<'_>) -> Result<(), SimulationError> {
        check_degree(self.degree, ctx)?;
        self.neighbors = closest_peers(ctx, self.degree, &[]);
        Ok(())
    }

    fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }
}

/// Half nearest-latency, half random.
///
/// `floor(degree/2)` greedy picks plus `ceil(degree/2)` random picks
/// disjoint from the greedy set. Blends the fast local paths of greedy
/// with the long-range links that keep the gossip graph well mixed.
#[derive(Debug)]
pub struct HalfGreedyStrategy {
    degree: usize,
    neighbors: Vec<NodeId>,
}

impl HalfGreedyStrategy {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            neighbors: Vec::new(),
        }
    }
}

impl Strategy for HalfGreedyStrategy {
    fn bind(&mut self, ctx: &mut BindContext<'_>) -> Result<(), SimulationError> {
        check_degree(self.degree, ctx)?;
        let greedy_count = self.degree / 2;
        let random_count = self.degree - greedy_count;

        let mut neighbors = closest_peers(ctx, greedy_count, &[]);
        neighbors.extend(random_peers(ctx, random_count, &neighbors));
        self.neighbors = neighbors;
        Ok(())
    }

    fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }
}
