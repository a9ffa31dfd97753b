//! Grid-indexed graph storage module.
//!
//! This module contains the [`Graph`] and [`Node`] types shared by every other part of the crate.
//! Vertices are laid out column-major on a `width` by `height` lattice, so the vertex in column
//! `c` and row `r` has the id `c * height + r`.

use std::fmt;

/// Single vertex of a grid graph.
///
/// A node knows its own id, where it sits on screen and whether it is currently alive. Liveness
/// only changes for graphs driven by a cellular automaton; plain mazes keep every node alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node {
    /// Vertex id of the node, also its index in [`Graph::nodes`].
    id: usize,
    /// Horizontal pixel coordinate.
    x: i32,
    /// Vertical pixel coordinate.
    y: i32,
    /// Whether the node takes part in the navigable graph.
    alive: bool,
}

impl Node {
    /// Creates a new alive node.
    #[must_use]
    pub const fn new(id: usize, x: i32, y: i32) -> Self {
        Self {
            id,
            x,
            y,
            alive: true,
        }
    }

    /// Returns the vertex id of the node.
    #[must_use]
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Returns the horizontal pixel coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Returns the vertical pixel coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns both pixel coordinates as a pair.
    #[must_use]
    pub const fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Returns whether the node is alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Sets the liveness of the node.
    pub fn set_alive(&mut self, alive: bool) {
        self.alive = alive;
    }

    /// Returns the squared euclidean distance from the node to the given point.
    fn squared_distance_to(&self, x: i32, y: i32) -> i64 {
        let dx = i64::from(self.x) - i64::from(x);
        let dy = i64::from(self.y) - i64::from(y);
        dx * dx + dy * dy
    }
}

/// Undirected graph over a rectangular lattice of nodes.
///
/// The adjacency lists are kept symmetric at all times: an edge `(a, b)` is stored once in the
/// list of `a` and once in the list of `b`. Cloning a graph produces a fully independent deep
/// copy, which is what the generators and the automaton rely on when they need scratch state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    /// Number of columns of the lattice.
    width: usize,
    /// Number of rows of the lattice.
    height: usize,
    /// Neighbor ids of each vertex, in insertion order.
    adj: Vec<Vec<usize>>,
    /// Nodes indexed by vertex id.
    nodes: Vec<Node>,
}

impl Graph {
    /// Creates a graph with `width * height` alive nodes at the origin and no edges.
    ///
    /// The topology builders in [`crate::generator`] position the nodes afterwards through
    /// [`Graph::set_node`].
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        let v = width.saturating_mul(height);

        Self {
            width,
            height,
            adj: vec![Vec::new(); v],
            nodes: (0..v).map(|id| Node::new(id, 0, 0)).collect(),
        }
    }

    /// Returns the number of columns of the lattice.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows of the lattice.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of vertices.
    #[must_use]
    pub const fn v(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the nodes indexed by vertex id.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the node with the given id, if any.
    #[must_use]
    pub fn node(&self, id: usize) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Returns the node with the given id mutably, if any.
    pub fn node_mut(&mut self, id: usize) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Returns whether the node with the given id exists and is alive.
    #[must_use]
    pub fn is_alive(&self, id: usize) -> bool {
        self.nodes.get(id).is_some_and(Node::is_alive)
    }

    /// Moves the node with the given id to a new position. Unknown ids are ignored.
    pub fn set_node(&mut self, id: usize, x: i32, y: i32) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.x = x;
            node.y = y;
        }
    }

    /// Returns the neighbor ids of the given vertex, or an empty slice for unknown ids.
    #[must_use]
    pub fn neighbors(&self, id: usize) -> &[usize] {
        self.adj.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns the column and row of the given vertex on the lattice.
    #[must_use]
    pub const fn grid_position(&self, id: usize) -> (usize, usize) {
        match self.height {
            0 => (0, 0),
            height => (id / height, id % height),
        }
    }

    /// Returns the vertex id of the given column and row, if it lies on the lattice.
    #[must_use]
    pub const fn id_at(&self, column: usize, row: usize) -> Option<usize> {
        if column < self.width && row < self.height {
            Some(column * self.height + row)
        } else {
            None
        }
    }

    /// Connects two vertices.
    ///
    /// The edge is recorded in both adjacency lists unless it is already present, so calling this
    /// function repeatedly never creates duplicates. Self loops and unknown ids are ignored.
    pub fn add_edge(&mut self, src: usize, dest: usize) {
        if src == dest || src >= self.v() || dest >= self.v() || self.is_adjacent(src, dest) {
            return;
        }

        if let Some(list) = self.adj.get_mut(src) {
            list.push(dest);
        }
        if let Some(list) = self.adj.get_mut(dest) {
            list.push(src);
        }
    }

    /// Disconnects two vertices. Missing edges are a no-op.
    pub fn remove_edge(&mut self, src: usize, dest: usize) {
        if let Some(list) = self.adj.get_mut(src) {
            list.retain(|&id| id != dest);
        }
        if let Some(list) = self.adj.get_mut(dest) {
            list.retain(|&id| id != src);
        }
    }

    /// Returns whether an edge between the two vertices exists.
    #[must_use]
    pub fn is_adjacent(&self, src: usize, dest: usize) -> bool {
        self.neighbors(src).contains(&dest)
    }

    /// Removes every edge touching the given vertex.
    pub fn isolate(&mut self, id: usize) {
        let neighbors = self.neighbors(id).to_vec();
        for neighbor in neighbors {
            self.remove_edge(id, neighbor);
        }
    }

    /// Removes every edge of the graph while keeping the nodes.
    pub fn strip_edges(&mut self) {
        for list in &mut self.adj {
            list.clear();
        }
    }

    /// Returns every edge once, as `(smaller id, larger id)` pairs in id order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adj.iter().enumerate().flat_map(|(src, list)| {
            list.iter()
                .filter(move |&&dest| src < dest)
                .map(move |&dest| (src, dest))
        })
    }

    /// Returns the number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Returns the number of alive nodes.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.alive).count()
    }

    /// Returns whether every vertex can be reached from vertex 0 along present edges.
    ///
    /// Liveness is ignored here; this is a purely structural check used to validate carved mazes.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let Some(first) = self.nodes.first() else {
            return true;
        };

        let mut visited = vec![false; self.v()];
        let mut stack = vec![first.id];
        let mut reached = 0;

        while let Some(current) = stack.pop() {
            match visited.get_mut(current) {
                Some(seen) if !*seen => *seen = true,
                _ => continue,
            }
            reached += 1;
            stack.extend(self.neighbors(current).iter().copied());
        }

        reached == self.v()
    }

    /// Returns the id of the node closest to the given point.
    ///
    /// Distance is the squared euclidean distance; ties go to the smallest id. `None` is only
    /// returned for a graph without nodes. Points far outside the lattice still map to some node,
    /// so callers are responsible for their own bounds checks.
    #[must_use]
    pub fn get_nearest_node_to(&self, x: i32, y: i32) -> Option<usize> {
        self.nearest_matching(x, y, |_| true)
    }

    /// Returns the id of the alive node closest to the given point.
    ///
    /// This follows the same distance and tie rules as [`Graph::get_nearest_node_to`] but skips
    /// dead nodes. `None` is returned when no node is alive.
    #[must_use]
    pub fn get_nearest_alive_node_to(&self, x: i32, y: i32) -> Option<usize> {
        self.nearest_matching(x, y, Node::is_alive)
    }

    /// Returns the positions of the first and the last node, the usual start and end of a maze.
    #[must_use]
    pub fn endpoints(&self) -> Option<((i32, i32), (i32, i32))> {
        let first = self.nodes.first().map(Node::position)?;
        let last = self.nodes.last().map(Node::position)?;
        Some((first, last))
    }

    /// Deep-copies the graph, nodes and adjacency included.
    #[must_use]
    pub fn create_copy(&self) -> Self {
        self.clone()
    }

    /// Returns a printable view of the adjacency lists, one `id -> neighbors` line per vertex.
    #[must_use]
    pub const fn adjacency_listing(&self) -> AdjacencyListing<'_> {
        AdjacencyListing(self)
    }

    /// Scans the nodes in id order for the closest one accepted by the filter.
    fn nearest_matching<F>(&self, x: i32, y: i32, accept: F) -> Option<usize>
    where
        F: Fn(&Node) -> bool,
    {
        let mut best: Option<(usize, i64)> = None;

        for node in self.nodes.iter().filter(|node| accept(node)) {
            let distance = node.squared_distance_to(x, y);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((node.id, distance));
            }
        }

        best.map(|(id, _)| id)
    }
}

/// Adjacency lists of a graph, displayed one `id -> neighbors` line per vertex.
#[derive(Clone, Copy, Debug)]
pub struct AdjacencyListing<'graph>(&'graph Graph);

impl fmt::Display for AdjacencyListing<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, list) in self.0.adj.iter().enumerate() {
            write!(formatter, "{id} ->")?;
            for neighbor in list {
                write!(formatter, " {neighbor}")?;
            }
            writeln!(formatter)?;
        }
        Ok(())
    }
}
