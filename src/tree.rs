// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{euclidean_distance, Path, Point, VertexId};

/// Append-only tree of positions, rooted at the start of a route.
///
/// Every vertex has a position, an optional parent (only the root has none)
/// and the cost of reaching it from the root. Vertices are never removed, and their
/// ids are assigned sequentially from 0.
///
/// The tree itself does not enforce any relationship between costs; it's the
/// [Planner](crate::Planner) which keeps `cost[i] == cost[parent[i]] + segment_cost`
/// at the moment of (re)assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningTree {
    position: Vec<Point>,
    parent: Vec<Option<VertexId>>,
    cost: Vec<f64>,
    children: Vec<Vec<VertexId>>,
}

impl PlanningTree {
    /// Creates a tree with a single root vertex (with id 0 and zero cost).
    pub fn new(root: Point) -> Self {
        Self {
            position: vec![root],
            parent: vec![None],
            cost: vec![0.0],
            children: vec![Vec::new()],
        }
    }

    /// Returns the number of vertices in the tree. Always at least 1.
    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn position(&self, id: VertexId) -> Point {
        self.position[id]
    }

    pub fn parent(&self, id: VertexId) -> Option<VertexId> {
        self.parent[id]
    }

    pub fn cost(&self, id: VertexId) -> f64 {
        self.cost[id]
    }

    pub fn children(&self, id: VertexId) -> &[VertexId] {
        &self.children[id]
    }

    /// Returns the cost of a vertex, or None if it doesn't exist.
    pub fn get_cost(&self, id: VertexId) -> Option<f64> {
        self.cost.get(id).copied()
    }

    /// Returns an iterator over all `(position, parent, cost)` triples, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, Option<VertexId>, f64)> + '_ {
        self.position
            .iter()
            .zip(self.parent.iter())
            .zip(self.cost.iter())
            .map(|((&position, &parent), &cost)| (position, parent, cost))
    }

    /// Finds the vertex closest to the given point. Ties are broken by the lowest id.
    ///
    /// This function computes the distance to every vertex in the tree.
    pub fn nearest(&self, p: Point) -> VertexId {
        let mut best = 0;
        let mut best_dist = f64::INFINITY;
        for (id, &position) in self.position.iter().enumerate() {
            let dist = euclidean_distance(p, position);
            if dist < best_dist {
                best = id;
                best_dist = dist;
            }
        }
        best
    }

    /// Finds all vertices at most `radius` away from the given point, in id order.
    pub fn within_radius(&self, p: Point, radius: f64) -> Vec<VertexId> {
        self.position
            .iter()
            .enumerate()
            .filter_map(|(id, &position)| {
                if euclidean_distance(p, position) <= radius {
                    Some(id)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Finds the vertex closest to the goal. Used to extract the best-effort route
    /// when the goal wasn't reached.
    pub fn nearest_to_goal(&self, goal: Point) -> VertexId {
        self.nearest(goal)
    }

    /// Appends a new vertex and returns its id.
    ///
    /// `parent` must be an existing vertex.
    pub fn insert(&mut self, position: Point, parent: VertexId, cost: f64) -> VertexId {
        assert!(parent < self.len(), "parent {} does not exist", parent);

        let id = self.position.len();
        self.position.push(position);
        self.parent.push(Some(parent));
        self.cost.push(cost);
        self.children.push(Vec::new());
        self.children[parent].push(id);
        id
    }

    /// Attaches an existing non-root vertex to a different parent, overwriting its cost.
    ///
    /// Costs of descendants of `id` are not updated. Callers must ensure that
    /// `new_parent` is not a descendant of `id`, as that would introduce a cycle.
    pub fn reparent(&mut self, id: VertexId, new_parent: VertexId, new_cost: f64) {
        assert!(new_parent < self.len(), "parent {} does not exist", new_parent);
        debug_assert!(!self.is_ancestor(id, new_parent), "reparent would create a cycle");

        if let Some(old_parent) = self.parent[id] {
            let siblings = &mut self.children[old_parent];
            if let Some(idx) = siblings.iter().position(|&c| c == id) {
                siblings.swap_remove(idx);
            }
        }

        self.parent[id] = Some(new_parent);
        self.cost[id] = new_cost;
        self.children[new_parent].push(id);
    }

    /// Overwrites the cost of a vertex, keeping its parent.
    pub(crate) fn set_cost(&mut self, id: VertexId, cost: f64) {
        self.cost[id] = cost;
    }

    /// Checks whether `ancestor` lies on the path from the root to `id` (inclusive).
    pub fn is_ancestor(&self, ancestor: VertexId, id: VertexId) -> bool {
        let mut current = Some(id);
        while let Some(v) = current {
            if v == ancestor {
                return true;
            }
            current = self.parent[v];
        }
        false
    }

    /// Returns the positions from the root to the given vertex.
    pub fn path_to(&self, id: VertexId) -> Path {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(v) = current {
            path.push(self.position[v]);
            current = self.parent[v];
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //       3
    //       |
    //   1---0---2
    //       |
    //       4---5
    fn simple_tree() -> PlanningTree {
        let mut t = PlanningTree::new(Point::new(0.0, 0.0));
        assert_eq!(t.insert(Point::new(-1.0, 0.0), 0, 1.0), 1);
        assert_eq!(t.insert(Point::new(1.0, 0.0), 0, 1.0), 2);
        assert_eq!(t.insert(Point::new(0.0, 1.0), 0, 1.0), 3);
        assert_eq!(t.insert(Point::new(0.0, -1.0), 0, 1.0), 4);
        assert_eq!(t.insert(Point::new(1.0, -1.0), 4, 2.0), 5);
        t
    }

    #[test]
    fn new_tree() {
        let t = PlanningTree::new(Point::new(3.0, 4.0));
        assert_eq!(t.len(), 1);
        assert_eq!(t.position(0), Point::new(3.0, 4.0));
        assert_eq!(t.parent(0), None);
        assert_eq!(t.cost(0), 0.0);
        assert_eq!(t.path_to(0), vec![Point::new(3.0, 4.0)]);
    }

    #[test]
    fn nearest() {
        let t = simple_tree();
        assert_eq!(t.nearest(Point::new(0.9, -1.2)), 5);
        assert_eq!(t.nearest(Point::new(-5.0, 0.1)), 1);
        assert_eq!(t.nearest(Point::new(0.1, 0.1)), 0);
        assert_eq!(t.nearest_to_goal(Point::new(0.1, 3.0)), 3);
    }

    #[test]
    fn nearest_ties_prefer_lowest_id() {
        let t = simple_tree();
        // Equidistant from 0, 1 and 3
        assert_eq!(t.nearest(Point::new(-0.5, 0.5)), 0);
        // Equidistant from 0, 2, 4 and 5
        assert_eq!(t.nearest(Point::new(0.5, -0.5)), 0);
        // Equidistant from 1 and 3 only
        assert_eq!(t.nearest(Point::new(-1.0, 1.0)), 1);
    }

    #[test]
    fn within_radius_is_inclusive() {
        let t = simple_tree();
        assert_eq!(t.within_radius(Point::new(0.0, 0.0), 1.0), vec![0, 1, 2, 3, 4]);
        assert_eq!(t.within_radius(Point::new(0.0, 0.0), 0.5), vec![0]);
        assert_eq!(t.within_radius(Point::new(1.0, -0.5), 0.5), vec![2, 5]);
        assert!(t.within_radius(Point::new(10.0, 10.0), 1.0).is_empty());
    }

    #[test]
    fn path_to() {
        let t = simple_tree();
        assert_eq!(
            t.path_to(5),
            vec![Point::new(0.0, 0.0), Point::new(0.0, -1.0), Point::new(1.0, -1.0)]
        );
    }

    #[test]
    fn reparent() {
        let mut t = simple_tree();
        t.reparent(5, 2, 1.5);
        assert_eq!(t.parent(5), Some(2));
        assert_eq!(t.cost(5), 1.5);
        assert_eq!(t.children(2), &[5]);
        assert!(t.children(4).is_empty());
        assert_eq!(
            t.path_to(5),
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, -1.0)]
        );
    }

    #[test]
    fn ancestors() {
        let t = simple_tree();
        assert!(t.is_ancestor(0, 5));
        assert!(t.is_ancestor(4, 5));
        assert!(t.is_ancestor(5, 5));
        assert!(!t.is_ancestor(5, 4));
        assert!(!t.is_ancestor(2, 5));
    }

    #[test]
    fn iter() {
        let t = simple_tree();
        let items: Vec<_> = t.iter().collect();
        assert_eq!(items.len(), 6);
        assert_eq!(items[0], (Point::new(0.0, 0.0), None, 0.0));
        assert_eq!(items[5], (Point::new(1.0, -1.0), Some(4), 2.0));
        assert_eq!(t.get_cost(5), Some(2.0));
        assert_eq!(t.get_cost(6), None);
    }
}
