//! Hopcroft-Karp maximum bipartite matching
//!
//! Breadth-first layering finds the length of the shortest augmenting paths;
//! depth-first search then augments along vertex-disjoint paths of that
//! length. Each phase runs in O(E) and at most O(sqrt(V)) phases are needed,
//! giving O(E * sqrt(V)) overall. With a fixed adjacency order the result is
//! fully deterministic: left nodes are scanned in index order and neighbor
//! lists in their stored order.

use std::collections::VecDeque;

const INF: usize = usize::MAX;

/// A maximum matching over a bipartite graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matching {
    /// Matched right node per left node, if any
    pub pair_left: Vec<Option<usize>>,
    /// Matched left node per right node, if any
    pub pair_right: Vec<Option<usize>>,
}

impl Matching {
    /// Number of matched pairs
    #[must_use]
    pub fn size(&self) -> usize {
        self.pair_left.iter().filter(|p| p.is_some()).count()
    }
}

/// Compute a maximum matching for a bipartite graph given as left-node
/// adjacency lists over right node ids in `0..n_right`
#[must_use]
pub fn maximum_matching(adjacency: &[Vec<usize>], n_right: usize) -> Matching {
    let n_left = adjacency.len();
    let mut pair_left: Vec<Option<usize>> = vec![None; n_left];
    let mut pair_right: Vec<Option<usize>> = vec![None; n_right];
    let mut layer: Vec<usize> = vec![INF; n_left];
    let mut queue: VecDeque<usize> = VecDeque::new();

    loop {
        // BFS phase: layer free left nodes at depth 0 and expand through
        // alternating unmatched/matched edges
        queue.clear();
        for (u, pair) in pair_left.iter().enumerate() {
            if pair.is_none() {
                layer[u] = 0;
                queue.push_back(u);
            } else {
                layer[u] = INF;
            }
        }

        // Depth of the shallowest free right node; layering stops at that
        // depth so the DFS phase only sees shortest augmenting paths, which
        // is what the O(E * sqrt(V)) phase bound rests on
        let mut shortest_free = INF;
        while let Some(u) = queue.pop_front() {
            if layer[u] >= shortest_free {
                continue;
            }
            for &v in &adjacency[u] {
                match pair_right[v] {
                    None => shortest_free = shortest_free.min(layer[u] + 1),
                    Some(next) if layer[next] == INF => {
                        layer[next] = layer[u] + 1;
                        queue.push_back(next);
                    }
                    Some(_) => {}
                }
            }
        }

        if shortest_free == INF {
            break;
        }

        // DFS phase: augment along vertex-disjoint shortest paths
        for u in 0..n_left {
            if pair_left[u].is_none() {
                augment(u, adjacency, &mut pair_left, &mut pair_right, &mut layer);
            }
        }
    }

    Matching {
        pair_left,
        pair_right,
    }
}

/// Try to find an augmenting path from left node `u`, flipping matched edges
/// along the way. Returns true on success. Visited nodes have their layer
/// invalidated so each phase explores vertex-disjoint paths only.
fn augment(
    u: usize,
    adjacency: &[Vec<usize>],
    pair_left: &mut [Option<usize>],
    pair_right: &mut [Option<usize>],
    layer: &mut [usize],
) -> bool {
    for &v in &adjacency[u] {
        let extendable = match pair_right[v] {
            None => true,
            Some(next) => {
                layer[next] == layer[u] + 1
                    && augment(next, adjacency, pair_left, pair_right, layer)
            }
        };
        if extendable {
            pair_left[u] = Some(v);
            pair_right[v] = Some(u);
            return true;
        }
    }
    layer[u] = INF;
    false
}
