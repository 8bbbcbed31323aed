//! Region quadtree over bounding-boxed objects.
//!
//! The tree stores any `Copy + Eq + Hash` object and learns each object's
//! bounding box through an accessor supplied at construction. Nodes are kept in
//! an arena and addressed by index; a reverse map from object to node makes
//! removal O(1) to locate.
//!
//! ## Placement
//!
//! An object lives in the deepest node whose region fully contains its
//! bounding box. Children are created lazily: an insertion descends into a
//! quadrant only when that child already exists, or when the current node
//! already holds `capacity` objects. Objects that straddle a split line, or
//! that arrived before the node subdivided, stay in the node's local list.
//! Existing objects are never pushed down when a node subdivides.
//!
//! Objects entirely outside the world are accepted at the root.
//!
//! ## Counting
//!
//! Every node tracks how many objects its strict descendants hold, so a
//! range count can take a whole subtree at once when the query rectangle
//! covers that subtree's region:
//!
//! ```rust
//! use feature_store::compute::quadtree::Quadtree;
//! use feature_types::Envelope;
//!
//! let world = Envelope::new(-180.0, -90.0, 180.0, 90.0);
//! let points = [(10.0, 10.0), (-20.0, 5.0), (100.0, -45.0)];
//! let mut tree = Quadtree::new(world, 4, 19, move |i: &usize| {
//!     let (x, y) = points[*i];
//!     Envelope::from_point(x, y)
//! });
//!
//! for i in 0..points.len() {
//!     tree.add(i);
//! }
//!
//! assert_eq!(tree.size(&world), 3);
//! assert_eq!(tree.size(&Envelope::new(0.0, 0.0, 50.0, 50.0)), 1);
//! ```

use feature_types::Envelope;
use rustc_hash::FxHashMap;
use std::hash::Hash;

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug)]
struct Node<T> {
    bounds: Envelope,
    depth: usize,
    parent: Option<NodeId>,
    children: [Option<NodeId>; 4],
    objects: Vec<T>,
    descendants: usize,
}

impl<T> Node<T> {
    fn new(bounds: Envelope, depth: usize, parent: Option<NodeId>) -> Self {
        Self {
            bounds,
            depth,
            parent,
            children: [None; 4],
            objects: Vec::new(),
            descendants: 0,
        }
    }

    fn subtree_len(&self) -> usize {
        self.objects.len() + self.descendants
    }
}

#[derive(Debug, Clone, Copy)]
struct Location {
    node: NodeId,
    outside: bool,
}

/// Quadrant `q` of `bounds`: 0 = SW, 1 = SE, 2 = NW, 3 = NE.
fn quadrant(bounds: &Envelope, q: usize) -> Envelope {
    let center = bounds.center();
    let (mid_x, mid_y) = (center.x(), center.y());
    match q {
        0 => Envelope::new(bounds.min_x, bounds.min_y, mid_x, mid_y),
        1 => Envelope::new(mid_x, bounds.min_y, bounds.max_x, mid_y),
        2 => Envelope::new(bounds.min_x, mid_y, mid_x, bounds.max_y),
        _ => Envelope::new(mid_x, mid_y, bounds.max_x, bounds.max_y),
    }
}

/// Generic quadtree keyed by object identity.
pub struct Quadtree<T, F = fn(&T) -> Envelope> {
    nodes: Vec<Node<T>>,
    locations: FxHashMap<T, Location>,
    bounds_of: F,
    capacity: usize,
    max_depth: usize,
    /// Root objects whose bounding box is disjoint from the world.
    outside: usize,
}

impl<T, F> Quadtree<T, F>
where
    T: Copy + Eq + Hash,
    F: Fn(&T) -> Envelope,
{
    /// Create an empty tree covering `world`.
    ///
    /// `capacity` is clamped to at least 1.
    pub fn new(world: Envelope, capacity: usize, max_depth: usize, bounds_of: F) -> Self {
        Self {
            nodes: vec![Node::new(world, 0, None)],
            locations: FxHashMap::default(),
            bounds_of,
            capacity: capacity.max(1),
            max_depth,
            outside: 0,
        }
    }

    pub fn world(&self) -> Envelope {
        self.nodes[ROOT].bounds
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, object: &T) -> bool {
        self.locations.contains_key(object)
    }

    /// Number of allocated nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert an object. Returns `false` if it is already tracked.
    pub fn add(&mut self, object: T) -> bool {
        if self.locations.contains_key(&object) {
            return false;
        }

        let bbox = (self.bounds_of)(&object);
        let outside = !self.nodes[ROOT].bounds.intersects(&bbox);
        let node = if outside { ROOT } else { self.descend(&bbox) };

        self.nodes[node].objects.push(object);
        self.adjust_ancestors(node, true);
        self.locations.insert(object, Location { node, outside });
        if outside {
            self.outside += 1;
        }
        true
    }

    /// Remove an object. Returns `false` if it is not tracked.
    pub fn remove(&mut self, object: &T) -> bool {
        let Some(location) = self.locations.remove(object) else {
            return false;
        };

        let objects = &mut self.nodes[location.node].objects;
        if let Some(pos) = objects.iter().position(|o| o == object) {
            objects.swap_remove(pos);
        }
        self.adjust_ancestors(location.node, false);
        if location.outside {
            self.outside -= 1;
        }
        true
    }

    /// Re-position an object after its bounding box changed.
    ///
    /// Untracked objects are inserted.
    pub fn refresh(&mut self, object: T) {
        self.remove(&object);
        self.add(object);
    }

    pub fn clear(&mut self) {
        let world = self.world();
        self.nodes.clear();
        self.nodes.push(Node::new(world, 0, None));
        self.locations.clear();
        self.outside = 0;
    }

    /// Visit every object whose bounding box intersects `rect`.
    pub fn get(&self, rect: &Envelope, mut visitor: impl FnMut(&T)) {
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            for object in &node.objects {
                if (self.bounds_of)(object).intersects(rect) {
                    visitor(object);
                }
            }
            for child in node.children.iter().flatten() {
                let child_node = &self.nodes[*child];
                if child_node.bounds.intersects(rect) && child_node.subtree_len() > 0 {
                    stack.push(*child);
                }
            }
        }
    }

    /// Collect every object whose bounding box intersects `rect`.
    pub fn query(&self, rect: &Envelope) -> Vec<T> {
        let mut out = Vec::new();
        self.get(rect, |o| out.push(*o));
        out
    }

    /// Count the objects whose bounding box intersects `rect`.
    ///
    /// Always equals the number of objects `get` would visit.
    pub fn size(&self, rect: &Envelope) -> usize {
        if self.outside == 0 && rect.contains(&self.world()) {
            return self.len();
        }

        let mut count = 0;
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            count += node
                .objects
                .iter()
                .filter(|o| (self.bounds_of)(*o).intersects(rect))
                .count();

            for child in node.children.iter().flatten() {
                let child_node = &self.nodes[*child];
                if !child_node.bounds.intersects(rect) {
                    continue;
                }
                if rect.contains(&child_node.bounds) {
                    count += child_node.subtree_len();
                } else if child_node.subtree_len() > 0 {
                    stack.push(*child);
                }
            }
        }
        count
    }

    /// Find the node an object with `bbox` belongs in, creating children on
    /// the way down.
    fn descend(&mut self, bbox: &Envelope) -> NodeId {
        let mut current = ROOT;
        loop {
            let node = &self.nodes[current];
            if node.depth >= self.max_depth {
                return current;
            }
            let Some(q) = (0..4).find(|q| quadrant(&node.bounds, *q).contains(bbox)) else {
                return current;
            };

            match node.children[q] {
                Some(child) => current = child,
                None if node.objects.len() >= self.capacity => {
                    let child = self.nodes.len();
                    let bounds = quadrant(&node.bounds, q);
                    let depth = node.depth + 1;
                    self.nodes.push(Node::new(bounds, depth, Some(current)));
                    self.nodes[current].children[q] = Some(child);
                    current = child;
                }
                None => return current,
            }
        }
    }

    fn adjust_ancestors(&mut self, node: NodeId, added: bool) {
        let mut parent = self.nodes[node].parent;
        while let Some(id) = parent {
            let ancestor = &mut self.nodes[id];
            if added {
                ancestor.descendants += 1;
            } else {
                ancestor.descendants -= 1;
            }
            parent = ancestor.parent;
        }
    }
}

impl<T, F> std::fmt::Debug for Quadtree<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Quadtree")
            .field("world", &self.nodes[ROOT].bounds)
            .field("objects", &self.locations.len())
            .field("nodes", &self.nodes.len())
            .field("capacity", &self.capacity)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const WORLD: Envelope = Envelope {
        min_x: -180.0,
        min_y: -90.0,
        max_x: 180.0,
        max_y: 90.0,
    };

    /// Small deterministic generator for test coordinates.
    struct Lcg(u64);

    impl Lcg {
        fn next_f64(&mut self) -> f64 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }

        fn range(&mut self, lo: f64, hi: f64) -> f64 {
            lo + (hi - lo) * self.next_f64()
        }
    }

    fn boxes_tree(
        boxes: &[Envelope],
        capacity: usize,
    ) -> Quadtree<usize, impl Fn(&usize) -> Envelope + '_> {
        Quadtree::new(WORLD, capacity, 19, move |i: &usize| boxes[*i])
    }

    fn random_boxes(rng: &mut Lcg, n: usize) -> Vec<Envelope> {
        (0..n)
            .map(|_| {
                let x = rng.range(-180.0, 180.0);
                let y = rng.range(-90.0, 90.0);
                let w = rng.range(0.0, 5.0);
                let h = rng.range(0.0, 5.0);
                Envelope::new(x, y, (x + w).min(180.0), (y + h).min(90.0))
            })
            .collect()
    }

    #[test]
    fn test_size_matches_get() {
        let mut rng = Lcg(42);
        let boxes = random_boxes(&mut rng, 2_000);
        let mut tree = boxes_tree(&boxes, 8);
        for i in 0..boxes.len() {
            assert!(tree.add(i));
        }
        assert!(tree.node_count() > 1);

        for _ in 0..200 {
            let x = rng.range(-200.0, 200.0);
            let y = rng.range(-100.0, 100.0);
            let rect = Envelope::new(x, y, x + rng.range(0.0, 120.0), y + rng.range(0.0, 60.0));

            let mut visited = 0;
            tree.get(&rect, |_| visited += 1);
            assert_eq!(tree.size(&rect), visited);

            let brute = boxes.iter().filter(|b| b.intersects(&rect)).count();
            assert_eq!(visited, brute);
        }
    }

    #[test]
    fn test_add_remove_restores_size() {
        let mut rng = Lcg(7);
        let boxes = random_boxes(&mut rng, 500);
        let mut tree = boxes_tree(&boxes, 4);
        for i in 0..499 {
            tree.add(i);
        }

        let before = tree.size(&WORLD);
        assert!(tree.add(499));
        assert_eq!(tree.size(&WORLD), before + 1);
        assert!(tree.remove(&499));
        assert_eq!(tree.size(&WORLD), before);
        assert!(!tree.remove(&499));
        assert!(!tree.contains(&499));
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let boxes = [Envelope::from_point(1.0, 1.0)];
        let mut tree = boxes_tree(&boxes, 4);
        assert!(tree.add(0));
        assert!(!tree.add(0));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_refresh_relocates() {
        let positions = Rc::new(RefCell::new(vec![(10.0, 10.0); 50]));
        let lookup = Rc::clone(&positions);
        let mut tree = Quadtree::new(WORLD, 2, 19, move |i: &usize| {
            let (x, y) = lookup.borrow()[*i];
            Envelope::from_point(x, y)
        });
        for i in 0..50 {
            tree.add(i);
        }

        let east = Envelope::new(100.0, -10.0, 120.0, 10.0);
        assert_eq!(tree.size(&east), 0);

        positions.borrow_mut()[3] = (110.0, 0.0);
        tree.refresh(3);

        assert_eq!(tree.query(&east), vec![3]);
        assert_eq!(tree.size(&east), 1);
        assert_eq!(tree.size(&Envelope::from_point(10.0, 10.0)), 49);
        assert_eq!(tree.len(), 50);
    }

    #[test]
    fn test_objects_outside_world_are_kept() {
        let boxes = [
            Envelope::from_point(500.0, 500.0),
            Envelope::from_point(0.0, 0.0),
            Envelope::new(170.0, 0.0, 190.0, 10.0),
        ];
        let mut tree = boxes_tree(&boxes, 1);
        for i in 0..boxes.len() {
            tree.add(i);
        }

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.size(&WORLD), 2);

        let everything = Envelope::new(-1000.0, -1000.0, 1000.0, 1000.0);
        assert_eq!(tree.size(&everything), 3);
        assert_eq!(tree.query(&Envelope::from_point(500.0, 500.0)), vec![0]);

        tree.remove(&0);
        assert_eq!(tree.size(&everything), 2);
        assert_eq!(tree.size(&WORLD), 2);
    }

    #[test]
    fn test_straddling_objects_stay_high() {
        let mut boxes = vec![Envelope::new(-1.0, -1.0, 1.0, 1.0)];
        boxes.extend((0..10).map(|i| Envelope::from_point(10.0 + i as f64, 10.0)));
        let mut tree = boxes_tree(&boxes, 1);
        for i in 0..boxes.len() {
            tree.add(i);
        }

        assert_eq!(tree.query(&Envelope::from_point(0.0, 0.0)), vec![0]);
        assert_eq!(tree.size(&WORLD), 11);
    }

    #[test]
    fn test_depth_cap() {
        let boxes = vec![Envelope::from_point(1.0, 1.0); 100];
        let mut tree = boxes_tree(&boxes, 1);
        // Identical boxes are distinct objects (distinct indices).
        for i in 0..boxes.len() {
            tree.add(i);
        }

        assert!(tree.node_count() <= 20);
        assert_eq!(tree.size(&Envelope::from_point(1.0, 1.0)), 100);
    }

    #[test]
    fn test_clear() {
        let boxes = [Envelope::from_point(1.0, 1.0), Envelope::from_point(400.0, 0.0)];
        let mut tree = boxes_tree(&boxes, 1);
        tree.add(0);
        tree.add(1);
        tree.clear();

        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.size(&WORLD), 0);
        assert_eq!(tree.world(), WORLD);
    }
}
