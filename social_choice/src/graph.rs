use log::debug;
use petgraph::algo::{has_path_connecting, is_cyclic_directed, tarjan_scc};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{Dfs, EdgeRef, IntoEdgeReferences};
use petgraph::Direction;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::Candidate;

/// A directed graph between candidates, with a weight attached to each edge.
///
/// An edge `u -> v` reads "u is preferred to v". There is at most one edge for
/// each ordered pair: adding an existing edge replaces its weight.
///
/// All the functions that list nodes or edges return them sorted by candidate, so
/// that the algorithms built on top of the graph are deterministic.
#[derive(Debug, Clone)]
pub struct PreferenceGraph<C, E = ()> {
    graph: StableDiGraph<C, E>,
    index: BTreeMap<C, NodeIndex>,
}

impl<C: Candidate, E> Default for PreferenceGraph<C, E> {
    fn default() -> Self {
        PreferenceGraph {
            graph: StableDiGraph::default(),
            index: BTreeMap::new(),
        }
    }
}

impl<C: Candidate, E> PreferenceGraph<C, E> {
    pub fn new() -> PreferenceGraph<C, E> {
        Self::default()
    }

    pub fn with_nodes<'a, I>(nodes: I) -> PreferenceGraph<C, E>
    where
        I: IntoIterator<Item = &'a C>,
        C: 'a,
    {
        let mut g = Self::new();
        for c in nodes {
            g.add_node(c.clone());
        }
        g
    }

    /// Adds the candidate if it is not already present.
    pub fn add_node(&mut self, c: C) -> NodeIndex {
        if let Some(idx) = self.index.get(&c) {
            return *idx;
        }
        let idx = self.graph.add_node(c.clone());
        self.index.insert(c, idx);
        idx
    }

    pub fn contains_node(&self, c: &C) -> bool {
        self.index.contains_key(c)
    }

    /// The candidates, in increasing order.
    pub fn nodes(&self) -> Vec<C> {
        self.index.keys().cloned().collect()
    }

    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Adds an edge, creating the endpoints if needed.
    pub fn add_edge(&mut self, from: C, to: C, weight: E) {
        let a = self.add_node(from);
        let b = self.add_node(to);
        self.graph.update_edge(a, b, weight);
    }

    pub fn remove_edge(&mut self, from: &C, to: &C) -> Option<E> {
        let a = *self.index.get(from)?;
        let b = *self.index.get(to)?;
        let e = self.graph.find_edge(a, b)?;
        self.graph.remove_edge(e)
    }

    pub fn contains_edge(&self, from: &C, to: &C) -> bool {
        self.edge_weight(from, to).is_some()
    }

    pub fn edge_weight(&self, from: &C, to: &C) -> Option<&E> {
        let a = *self.index.get(from)?;
        let b = *self.index.get(to)?;
        let e = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(e)
    }

    /// The edges as (source, target) pairs, sorted.
    pub fn edges(&self) -> Vec<(C, C)> {
        let mut res: Vec<(C, C)> = self
            .graph
            .edge_references()
            .map(|e| (self.graph[e.source()].clone(), self.graph[e.target()].clone()))
            .collect();
        res.sort();
        res
    }

    pub fn edge_set(&self) -> BTreeSet<(C, C)> {
        self.edges().into_iter().collect()
    }

    /// The edges with their weights, sorted by (source, target).
    pub fn weighted_edges(&self) -> Vec<(C, C, &E)> {
        let mut res: Vec<(C, C, &E)> = self
            .graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].clone(),
                    self.graph[e.target()].clone(),
                    e.weight(),
                )
            })
            .collect();
        res.sort_by(|x, y| (&x.0, &x.1).cmp(&(&y.0, &y.1)));
        res
    }

    /// The edges pointing to the given candidate, with their weights.
    pub fn in_edges(&self, c: &C) -> Vec<(C, &E)> {
        match self.index.get(c) {
            None => vec![],
            Some(idx) => {
                let mut res: Vec<(C, &E)> = self
                    .graph
                    .edges_directed(*idx, Direction::Incoming)
                    .map(|e| (self.graph[e.source()].clone(), e.weight()))
                    .collect();
                res.sort_by(|x, y| x.0.cmp(&y.0));
                res
            }
        }
    }

    pub fn out_degree(&self, c: &C) -> usize {
        self.degree(c, Direction::Outgoing)
    }

    pub fn in_degree(&self, c: &C) -> usize {
        self.degree(c, Direction::Incoming)
    }

    fn degree(&self, c: &C, dir: Direction) -> usize {
        self.index
            .get(c)
            .map(|idx| self.graph.neighbors_directed(*idx, dir).count())
            .unwrap_or(0)
    }

    /// Builds a graph with the same nodes and edges and transformed weights.
    pub fn map_edges<E2, F>(&self, mut f: F) -> PreferenceGraph<C, E2>
    where
        F: FnMut(&C, &C, &E) -> E2,
    {
        let graph = self.graph.map(
            |_, c| c.clone(),
            |e, w| match self.graph.edge_endpoints(e) {
                Some((a, b)) => f(&self.graph[a], &self.graph[b], w),
                None => unreachable!("edge {:?} without endpoints", e),
            },
        );
        PreferenceGraph {
            graph,
            index: self.index.clone(),
        }
    }

    /// Drops the weights.
    pub fn to_unweighted(&self) -> PreferenceGraph<C> {
        self.map_edges(|_, _, _| ())
    }

    /// True if every pair of distinct candidates is connected by exactly one edge.
    pub fn is_complete(&self) -> bool {
        let nodes = self.nodes();
        for (i, u) in nodes.iter().enumerate() {
            for v in nodes.iter().skip(i + 1) {
                if self.contains_edge(u, v) == self.contains_edge(v, u) {
                    return false;
                }
            }
        }
        true
    }

    pub fn is_acyclic(&self) -> bool {
        !is_cyclic_directed(&self.graph)
    }

    /// Finds one cycle, returned as the list of its edges.
    ///
    /// The cycle starts at the smallest candidate of the first strongly connected
    /// component that contains a cycle, and is one of the shortest cycles through it.
    pub fn find_cycle(&self) -> Option<Vec<(C, C)>> {
        // Self loops are not reported by the component search.
        for (c, idx) in self.index.iter() {
            if self.graph.find_edge(*idx, *idx).is_some() {
                return Some(vec![(c.clone(), c.clone())]);
            }
        }
        for scc in tarjan_scc(&self.graph) {
            if scc.len() < 2 {
                continue;
            }
            let members: HashSet<NodeIndex> = scc.iter().copied().collect();
            let start = match scc.iter().min_by(|a, b| self.graph[**a].cmp(&self.graph[**b])) {
                Some(s) => *s,
                None => continue,
            };
            let mut parents: HashMap<NodeIndex, NodeIndex> = HashMap::new();
            let mut queue: VecDeque<NodeIndex> = VecDeque::from([start]);
            while let Some(n) = queue.pop_front() {
                for m in self.sorted_successors(n) {
                    if !members.contains(&m) {
                        continue;
                    }
                    if m == start {
                        let mut path = vec![n];
                        let mut cur = n;
                        while cur != start {
                            cur = parents[&cur];
                            path.push(cur);
                        }
                        path.reverse();
                        path.push(start);
                        let cycle: Vec<(C, C)> = path
                            .windows(2)
                            .map(|w| (self.graph[w[0]].clone(), self.graph[w[1]].clone()))
                            .collect();
                        debug!("find_cycle: {:?}", cycle);
                        return Some(cycle);
                    }
                    if !parents.contains_key(&m) {
                        parents.insert(m, n);
                        queue.push_back(m);
                    }
                }
            }
        }
        None
    }

    fn sorted_successors(&self, n: NodeIndex) -> Vec<NodeIndex> {
        let mut succ: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(n, Direction::Outgoing)
            .collect();
        succ.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
        succ.dedup();
        succ
    }

    /// A topological order of the candidates, or None if the graph has a cycle.
    ///
    /// Among the candidates that are ready at the same time, the smallest one comes
    /// first.
    pub fn topological_sort(&self) -> Option<Vec<C>> {
        let mut in_degrees: HashMap<NodeIndex, usize> = HashMap::new();
        let mut ready: BTreeSet<C> = BTreeSet::new();
        for (c, idx) in self.index.iter() {
            let d = self
                .graph
                .neighbors_directed(*idx, Direction::Incoming)
                .count();
            if d == 0 {
                ready.insert(c.clone());
            }
            in_degrees.insert(*idx, d);
        }
        let mut res: Vec<C> = Vec::with_capacity(self.index.len());
        while let Some(c) = ready.pop_first() {
            let idx = self.index[&c];
            for m in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                if let Some(d) = in_degrees.get_mut(&m) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(self.graph[m].clone());
                    }
                }
            }
            res.push(c);
        }
        if res.len() == self.index.len() {
            Some(res)
        } else {
            None
        }
    }

    /// The number of candidates reachable from the given one, itself excluded.
    pub fn reachable_count(&self, c: &C) -> usize {
        let start = match self.index.get(c) {
            Some(idx) => *idx,
            None => return 0,
        };
        let mut dfs = Dfs::new(&self.graph, start);
        let mut count = 0;
        while dfs.next(&self.graph).is_some() {
            count += 1;
        }
        count - 1
    }

    /// True if adding `from -> to` would close a cycle.
    pub fn would_create_cycle(&self, from: &C, to: &C) -> bool {
        if from == to {
            return true;
        }
        match (self.index.get(from), self.index.get(to)) {
            (Some(a), Some(b)) => has_path_connecting(&self.graph, *b, *a, None),
            _ => false,
        }
    }

    /// Adds the edge unless it would create a cycle. Returns true if it was added.
    pub fn add_edge_if_acyclic(&mut self, from: C, to: C, weight: E) -> bool {
        if self.would_create_cycle(&from, &to) {
            debug!("add_edge_if_acyclic: skipping {:?} -> {:?}", from, to);
            return false;
        }
        self.add_edge(from, to, weight);
        true
    }
}
