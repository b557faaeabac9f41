//! Breadth-first traversal: shortest hop counts and connected components

use std::collections::VecDeque;

use serde::{Serialize, Serializer};

use crate::adjacency::Adjacency;
use crate::error::{GraphError, GraphResult};
use crate::model::NodeId;

/// Hop count between two nodes, or [`UNREACHABLE`].
pub type Distance = i32;

/// Distance sentinel for node pairs with no connecting path.
pub const UNREACHABLE: Distance = -1;

const UNASSIGNED: usize = usize::MAX;

/// Shortest hop counts from `source` to every node.
///
/// Strict FIFO BFS; a node is marked when discovered, so it is enqueued at
/// most once and the walk is O(V + E).
pub fn single_source_shortest_paths(adj: &Adjacency, source: usize) -> GraphResult<Vec<Distance>> {
    let len = adj.node_count();
    if source >= len {
        return Err(GraphError::IndexOutOfRange { index: source, len });
    }
    let mut dist = vec![UNREACHABLE; len];
    bfs_into(adj, source, &mut dist);
    Ok(dist)
}

fn bfs_into(adj: &Adjacency, source: usize, dist: &mut [Distance]) {
    let mut queue = VecDeque::new();
    dist[source] = 0;
    queue.push_back(source);

    while let Some(u) = queue.pop_front() {
        let next = dist[u] + 1;
        for &v in adj.neighbors(u) {
            if dist[v] == UNREACHABLE {
                dist[v] = next;
                queue.push_back(v);
            }
        }
    }
}

/// Distance from a source to one node, keyed by id for collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDistance {
    pub id: NodeId,
    /// `None` when the node is unreachable from the source.
    pub distance: Option<u32>,
}

/// Square matrix of hop counts over node indices, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    size: usize,
    data: Vec<Distance>,
}

impl DistanceMatrix {
    fn filled(size: usize, value: Distance) -> Self {
        DistanceMatrix {
            size,
            data: vec![value; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw entry, [`UNREACHABLE`] for disconnected pairs.
    pub fn raw(&self, i: usize, j: usize) -> Distance {
        self.data[i * self.size + j]
    }

    pub fn get(&self, i: usize, j: usize) -> Option<u32> {
        u32::try_from(self.raw(i, j)).ok()
    }

    pub fn row(&self, i: usize) -> &[Distance] {
        &self.data[i * self.size..(i + 1) * self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Distance]> {
        (0..self.size).map(move |i| self.row(i))
    }

    /// Finite distances over unordered pairs `i < j`.
    pub fn reachable_pairs(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.size)
            .flat_map(move |i| ((i + 1)..self.size).map(move |j| (i, j)))
            .filter_map(move |(i, j)| self.get(i, j))
    }

    fn set(&mut self, i: usize, j: usize, value: Distance) {
        self.data[i * self.size + j] = value;
    }
}

impl Serialize for DistanceMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

/// All-pairs hop counts by running BFS from every node. O(V·(V + E)).
pub fn all_pairs_bfs(adj: &Adjacency) -> DistanceMatrix {
    let n = adj.node_count();
    let mut matrix = DistanceMatrix::filled(n, UNREACHABLE);
    for source in 0..n {
        bfs_into(adj, source, &mut matrix.data[source * n..(source + 1) * n]);
    }
    matrix
}

/// All-pairs hop counts by Floyd–Warshall. O(V³); yields the same matrix as
/// [`all_pairs_bfs`].
pub fn floyd_warshall(adj: &Adjacency) -> DistanceMatrix {
    let n = adj.node_count();
    let mut d = DistanceMatrix::filled(n, UNREACHABLE);
    for i in 0..n {
        d.set(i, i, 0);
        for &j in adj.neighbors(i) {
            if i != j {
                d.set(i, j, 1);
            }
        }
    }

    for k in 0..n {
        for i in 0..n {
            let ik = d.raw(i, k);
            if ik == UNREACHABLE {
                continue;
            }
            for j in 0..n {
                let kj = d.raw(k, j);
                if kj == UNREACHABLE {
                    continue;
                }
                let via = ik + kj;
                let ij = d.raw(i, j);
                if ij == UNREACHABLE || via < ij {
                    d.set(i, j, via);
                }
            }
        }
    }
    d
}

/// Partition of the node indices into connected components.
///
/// Components are numbered in discovery order (by lowest member index); the
/// members of each are sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Components {
    members: Vec<Vec<usize>>,
    #[serde(skip)]
    component_of: Vec<usize>,
}

impl Components {
    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn members(&self) -> &[Vec<usize>] {
        &self.members
    }

    /// Component number of a node index.
    pub fn component_of(&self, index: usize) -> Option<usize> {
        self.component_of.get(index).copied()
    }

    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().map(Vec::len)
    }

    /// Number of the largest component; ties go to the first discovered.
    pub fn largest(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (id, members) in self.members.iter().enumerate() {
            if best.map_or(true, |(_, size)| members.len() > size) {
                best = Some((id, members.len()));
            }
        }
        best.map(|(id, _)| id)
    }
}

/// Discover connected components by BFS from each unvisited node in index
/// order.
pub fn connected_components(adj: &Adjacency) -> Components {
    let n = adj.node_count();
    let mut component_of = vec![UNASSIGNED; n];
    let mut members = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..n {
        if component_of[start] != UNASSIGNED {
            continue;
        }
        let id = members.len();
        let mut component = vec![start];
        component_of[start] = id;
        queue.push_back(start);

        while let Some(u) = queue.pop_front() {
            for &v in adj.neighbors(u) {
                if component_of[v] == UNASSIGNED {
                    component_of[v] = id;
                    component.push(v);
                    queue.push_back(v);
                }
            }
        }

        component.sort_unstable();
        members.push(component);
    }

    Components {
        members,
        component_of,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node};

    fn adjacency(ids: &[&str], edges: &[(&str, &str)]) -> Adjacency {
        let nodes: Vec<Node> = ids.iter().map(|id| Node::new(*id)).collect();
        let edges: Vec<Edge> = edges.iter().map(|(s, t)| Edge::new(*s, *t)).collect();
        Adjacency::build(&nodes, &edges).unwrap()
    }

    #[test]
    fn sssp_on_path_with_isolated_node() {
        let adj = adjacency(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C")]);
        assert_eq!(single_source_shortest_paths(&adj, 0).unwrap(), vec![0, 1, 2, UNREACHABLE]);
        assert_eq!(
            single_source_shortest_paths(&adj, 3).unwrap(),
            vec![UNREACHABLE, UNREACHABLE, UNREACHABLE, 0]
        );
    }

    #[test]
    fn sssp_takes_the_shortcut() {
        // A-B-C-D plus chord A-D
        let adj = adjacency(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "A")],
        );
        assert_eq!(single_source_shortest_paths(&adj, 0).unwrap(), vec![0, 1, 2, 1]);
    }

    #[test]
    fn sssp_rejects_out_of_range_source() {
        let adj = adjacency(&["A"], &[]);
        assert_eq!(
            single_source_shortest_paths(&adj, 5),
            Err(GraphError::IndexOutOfRange { index: 5, len: 1 })
        );
    }

    #[test]
    fn self_loops_do_not_change_distances() {
        let adj = adjacency(&["A", "B"], &[("A", "A"), ("A", "B")]);
        assert_eq!(single_source_shortest_paths(&adj, 0).unwrap(), vec![0, 1]);
    }

    #[test]
    fn components_partition_indices() {
        let adj = adjacency(
            &["A", "B", "C", "D", "E"],
            &[("A", "C"), ("B", "D"), ("E", "B")],
        );
        let comps = connected_components(&adj);
        assert_eq!(comps.count(), 2);
        assert_eq!(comps.members(), &[vec![0, 2], vec![1, 3, 4]]);
        assert_eq!(comps.component_of(4), Some(1));
        assert_eq!(comps.largest(), Some(1));
    }

    #[test]
    fn largest_component_tie_goes_to_first() {
        let adj = adjacency(&["A", "B", "C", "D"], &[("C", "D"), ("A", "B")]);
        let comps = connected_components(&adj);
        assert_eq!(comps.largest(), Some(0));
        assert_eq!(comps.members()[0], vec![0, 1]);
    }

    #[test]
    fn empty_graph_has_no_components() {
        let adj = adjacency(&[], &[]);
        let comps = connected_components(&adj);
        assert_eq!(comps.count(), 0);
        assert_eq!(comps.largest(), None);
        assert_eq!(all_pairs_bfs(&adj).size(), 0);
    }

    #[test]
    fn floyd_warshall_matches_bfs() {
        let adj = adjacency(
            &["A", "B", "C", "D", "E", "F"],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("C", "D"), ("E", "E"), ("E", "F"), ("F", "E")],
        );
        assert_eq!(floyd_warshall(&adj), all_pairs_bfs(&adj));
    }

    #[test]
    fn matrix_serializes_as_rows() {
        let adj = adjacency(&["A", "B", "C"], &[("A", "B")]);
        let json = serde_json::to_string(&all_pairs_bfs(&adj)).unwrap();
        assert_eq!(json, "[[0,1,-1],[1,0,-1],[-1,-1,0]]");
    }

    #[test]
    fn reachable_pairs_skip_disconnected() {
        let adj = adjacency(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C")]);
        let pairs: Vec<u32> = all_pairs_bfs(&adj).reachable_pairs().collect();
        assert_eq!(pairs, vec![1, 2, 1]);
    }
}
