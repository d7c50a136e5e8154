//! Robustness analysis over resolved gossip topologies.
//!
//! Consumes the adjacency relation a network exposes after initialization
//! (node id to neighbor list) as a plain graph, with no knowledge of how
//! any strategy chose the edges. Forwarding edges are treated as
//! undirected for analysis: a gossip link moves traffic both ways over a
//! run's lifetime.
//!
//! The interesting questions about a topology are all here: is it
//! connected, how many hops across it ([`diameter`]), how short is its
//! shortest cycle ([`girth`]), and how well does it survive random node
//! loss ([`removal_survival_rate`]).

use gossipsim_types::NodeId;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

/// Node id to ordered neighbor list, as produced by `Network::adjacency`.
pub type Adjacency = BTreeMap<NodeId, Vec<NodeId>>;

/// Symmetrized edge view, self-loops dropped.
fn undirected(adjacency: &Adjacency) -> BTreeMap<NodeId, BTreeSet<NodeId>> {
    let mut edges: BTreeMap<NodeId, BTreeSet<NodeId>> = adjacency
        .keys()
        .map(|&id| (id, BTreeSet::new()))
        .collect();
    for (&from, neighbors) in adjacency {
        for &to in neighbors {
            if from != to {
                edges.entry(from).or_default().insert(to);
                edges.entry(to).or_default().insert(from);
            }
        }
    }
    edges
}

fn bfs_distances(
    edges: &BTreeMap<NodeId, BTreeSet<NodeId>>,
    origin: NodeId,
) -> BTreeMap<NodeId, u64> {
    let mut distances = BTreeMap::from([(origin, 0u64)]);
    let mut queue = VecDeque::from([origin]);
    while let Some(current) = queue.pop_front() {
        let depth = distances[&current];
        if let Some(neighbors) = edges.get(&current) {
            for &next in neighbors {
                if !distances.contains_key(&next) {
                    distances.insert(next, depth + 1);
                    queue.push_back(next);
                }
            }
        }
    }
    distances
}

/// Nodes reachable from `origin`, treating edges as undirected.
pub fn reachable_from(adjacency: &Adjacency, origin: NodeId) -> BTreeSet<NodeId> {
    bfs_distances(&undirected(adjacency), origin)
        .into_keys()
        .collect()
}

/// Whether every node can reach every other. Empty graphs are connected.
pub fn is_connected(adjacency: &Adjacency) -> bool {
    let Some(&origin) = adjacency.keys().next() else {
        return true;
    };
    reachable_from(adjacency, origin).len() == adjacency.len()
}

/// Longest shortest path between any two nodes.
///
/// `None` when the graph is disconnected (some pair has no path at all).
pub fn diameter(adjacency: &Adjacency) -> Option<u64> {
    let edges = undirected(adjacency);
    let mut diameter = 0;
    for &origin in adjacency.keys() {
        let distances = bfs_distances(&edges, origin);
        if distances.len() != adjacency.len() {
            return None;
        }
        diameter = diameter.max(distances.into_values().max().unwrap_or(0));
    }
    Some(diameter)
}

/// Length of the shortest cycle, or `None` for acyclic graphs.
///
/// BFS from every node; a non-tree edge `(v, w)` at depths `d(v)` and
/// `d(w)` closes a cycle of length at most `d(v) + d(w) + 1`. The minimum
/// over all roots is exact, because BFS rooted on a shortest cycle finds
/// that cycle.
pub fn girth(adjacency: &Adjacency) -> Option<u64> {
    let edges = undirected(adjacency);
    let mut girth: Option<u64> = None;

    for &root in adjacency.keys() {
        let mut distances = BTreeMap::from([(root, 0u64)]);
        let mut parents: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        let mut queue = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            let depth = distances[&current];
            for &next in &edges[&current] {
                if let Some(&next_depth) = distances.get(&next) {
                    if parents.get(&current) != Some(&next) {
                        let cycle = depth + next_depth + 1;
                        girth = Some(girth.map_or(cycle, |g| g.min(cycle)));
                    }
                } else {
                    distances.insert(next, depth + 1);
                    parents.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
    }
    girth
}

/// Smallest and largest undirected degree, or `None` for an empty graph.
pub fn degree_bounds(adjacency: &Adjacency) -> Option<(usize, usize)> {
    let edges = undirected(adjacency);
    let degrees: Vec<usize> = edges.values().map(|n| n.len()).collect();
    Some((
        *degrees.iter().min()?,
        *degrees.iter().max()?,
    ))
}

/// Monte-Carlo robustness: the fraction of trials in which the graph
/// stays connected after removing `removals` random nodes.
///
/// Sampling is driven by the caller's seeded RNG, so results are
/// reproducible. Removing the whole graph counts as surviving (an empty
/// graph is connected).
pub fn removal_survival_rate(
    adjacency: &Adjacency,
    removals: usize,
    trials: usize,
    rng: &mut ChaCha8Rng,
) -> f64 {
    if trials == 0 {
        return 1.0;
    }
    let ids: Vec<NodeId> = adjacency.keys().copied().collect();

    let mut survived = 0;
    for _ in 0..trials {
        let removed: BTreeSet<NodeId> = ids
            .choose_multiple(rng, removals.min(ids.len()))
            .copied()
            .collect();
        let remaining: Adjacency = adjacency
            .iter()
            .filter(|(id, _)| !removed.contains(id))
            .map(|(&id, neighbors)| {
                let kept: Vec<NodeId> = neighbors
                    .iter()
                    .copied()
                    .filter(|n| !removed.contains(n))
                    .collect();
                (id, kept)
            })
            .collect();
        if is_connected(&remaining) {
            survived += 1;
        }
    }

    let rate = survived as f64 / trials as f64;
    debug!(removals, trials, rate, "Sampled removal survival");
    rate
}
