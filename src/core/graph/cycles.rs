//! Cycle detection and dependency chains over `includes` edges.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::{
    algo::{is_cyclic_directed, tarjan_scc},
    graph::NodeIndex,
};

use super::{Cycle, DependencyGraph};

/// One level of the iterative depth-first search.
struct Frame {
    node: NodeIndex,
    successors: Vec<NodeIndex>,
    cursor: usize,
}

impl Frame {
    fn new(graph: &DependencyGraph, node: NodeIndex) -> Self {
        Self {
            node,
            successors: graph.include_successors(node),
            cursor: 0,
        }
    }
}

impl DependencyGraph {
    /// Enumerate cycles formed by `includes` edges.
    ///
    /// Every strongly connected component with more than one node, or with a
    /// self-loop, contributes one cycle traced from its earliest-inserted node.
    /// Each cycle lists node ids without repeating the first node at the end.
    /// If a component cannot be traced, falls back to
    /// [`detect_cycles_manually`](Self::detect_cycles_manually).
    pub fn detect_cycles(&self) -> Vec<Cycle> {
        if !is_cyclic_directed(&self.graph) {
            return Vec::new();
        }

        let mut cycles = Vec::new();

        for component in tarjan_scc(&self.graph) {
            let is_cyclic = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&node| self.include_successors(node).contains(&node));
            if !is_cyclic {
                continue;
            }

            let members: HashSet<NodeIndex> = component.iter().copied().collect();
            let Some(&start) = component.iter().min() else {
                continue;
            };
            match self.trace_cycle(&members, start) {
                Some(path) => cycles.push(path.into_iter().map(|n| self.id_of(n)).collect()),
                None => {
                    tracing::debug!(
                        start = %self.graph[start].id,
                        "could not trace cycle in component, falling back to full search"
                    );
                    return self.detect_cycles_manually();
                }
            }
        }

        // Components come out in reverse topological order; list them by the
        // position of their first node instead.
        cycles.sort_by_key(|cycle: &Cycle| {
            cycle
                .first()
                .and_then(|id| self.index.get(id))
                .map(|idx| idx.index())
        });
        cycles
    }

    /// Shortest `includes` path from `start` back to itself inside a component.
    fn trace_cycle(
        &self,
        members: &HashSet<NodeIndex>,
        start: NodeIndex,
    ) -> Option<Vec<NodeIndex>> {
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            for next in self.include_successors(node) {
                if !members.contains(&next) {
                    continue;
                }
                if next == start {
                    let mut path = vec![node];
                    let mut current = node;
                    while current != start {
                        current = *parent.get(&current)?;
                        path.push(current);
                    }
                    path.reverse();
                    return Some(path);
                }
                if seen.insert(next) {
                    parent.insert(next, node);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    /// Depth-first search reporting every back edge as a cycle.
    ///
    /// Roots are visited in insertion order and successors in edge order. A
    /// back edge to a node on the current path yields the path slice from that
    /// node to the current one.
    pub fn detect_cycles_manually(&self) -> Vec<Cycle> {
        let mut cycles = Vec::new();
        let mut visited: HashSet<NodeIndex> = HashSet::new();

        for root in self.graph.node_indices() {
            if !visited.insert(root) {
                continue;
            }

            let mut path = vec![root];
            let mut on_path = HashSet::from([root]);
            let mut stack = vec![Frame::new(self, root)];

            loop {
                let Some(frame) = stack.last_mut() else {
                    break;
                };
                let next = frame.successors.get(frame.cursor).copied();
                frame.cursor += 1;

                match next {
                    Some(next) if on_path.contains(&next) => {
                        let from = path.iter().position(|&n| n == next).unwrap_or(0);
                        cycles.push(path[from..].iter().map(|&n| self.id_of(n)).collect());
                    }
                    Some(next) => {
                        if visited.insert(next) {
                            path.push(next);
                            on_path.insert(next);
                            stack.push(Frame::new(self, next));
                        }
                    }
                    None => {
                        if let Some(done) = stack.pop() {
                            on_path.remove(&done.node);
                            path.pop();
                        }
                    }
                }
            }
        }

        cycles
    }

    /// Every node reachable from `start` over `includes` edges, in depth-first
    /// pre-order, starting with `start` itself.
    ///
    /// Returns an empty list when `start` is not in the graph.
    pub fn dependency_chain(&self, start: &str) -> Vec<String> {
        let Some(&start) = self.index.get(start) else {
            return Vec::new();
        };

        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            chain.push(self.id_of(node));
            stack.extend(self.include_successors(node).into_iter().rev());
        }

        chain
    }
}
