//! Union-find over vertex ids, used by the biased Kruskal maze generator.

/// Disjoint-set forest with path compression and union by rank.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    /// Parent of each element; roots are their own parent.
    parent: Vec<usize>,
    /// Upper bound on the height of the tree rooted at each element.
    rank: Vec<usize>,
}

impl DisjointSet {
    /// Creates `size` singleton sets.
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    /// Returns the representative of the set containing `x`, compressing the path on the way.
    ///
    /// Elements outside the forest are their own representative.
    pub fn find(&mut self, x: usize) -> usize {
        let Some(&parent) = self.parent.get(x) else {
            return x;
        };
        if parent == x {
            return x;
        }

        let root = self.find(parent);
        if let Some(slot) = self.parent.get_mut(x) {
            *slot = root;
        }
        root
    }

    /// Merges the sets containing `x` and `y`. Already merged sets are left untouched.
    pub fn merge(&mut self, x: usize, y: usize) {
        let x_root = self.find(x);
        let y_root = self.find(y);
        if x_root == y_root {
            return;
        }

        let x_rank = self.rank.get(x_root).copied().unwrap_or_default();
        let y_rank = self.rank.get(y_root).copied().unwrap_or_default();

        let (child, root) = if x_rank < y_rank {
            (x_root, y_root)
        } else {
            (y_root, x_root)
        };
        if let Some(slot) = self.parent.get_mut(child) {
            *slot = root;
        }
        if x_rank == y_rank {
            if let Some(rank) = self.rank.get_mut(root) {
                *rank += 1;
            }
        }
    }

    /// Returns whether `x` and `y` belong to the same set.
    pub fn same_set(&mut self, x: usize, y: usize) -> bool {
        self.find(x) == self.find(y)
    }
}
