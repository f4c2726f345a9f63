/// Bounding hierarchical volume over scene instances.
///
/// The world is cut into `divisions × divisions` cells on the ground plane,
/// recursively. Nodes live in one arena and children of a node are stored
/// contiguously, so a node refers to them by a start index and a count.
/// Instances are never moved: the tree keeps its own permutation of
/// instance indices and every node owns a contiguous range of it.
use std::collections::VecDeque;

use glam::{Vec2, Vec3};

use crate::camera::{Camera, CullPlanes, Frustum};
use crate::error::BhvError;
use crate::scene::instance::{ObjectState, SceneInstance};
use crate::{count_call, perf_scope};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BhvConfig {
    /// Cells per axis at each level; the branching factor is its square.
    pub divisions: usize,
    pub max_depth: usize,
    /// Nodes holding this many instances or fewer become leaves.
    pub min_objects: usize,
    /// Half-extent of the root cube, centred on the origin.
    pub world_radius: f32,
}

impl Default for BhvConfig {
    fn default() -> Self {
        Self {
            divisions: 3,
            max_depth: 3,
            min_objects: 2,
            world_radius: 10_000.0,
        }
    }
}

impl BhvConfig {
    pub fn validate(&self) -> Result<(), BhvError> {
        if self.divisions < 2 {
            return Err(BhvError::InvalidDivisions(self.divisions));
        }
        if !(self.world_radius.is_finite() && self.world_radius > 0.0) {
            return Err(BhvError::InvalidWorldRadius(self.world_radius));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BhvNode {
    pub min: Vec3,
    pub max: Vec3,
    /// Range into the tree's instance permutation.
    pub first: usize,
    pub count: usize,
    pub first_child: usize,
    pub child_count: usize,
    pub depth: usize,
    pub culled: bool,
}

impl BhvNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.child_count == 0
    }

    #[inline]
    fn children(&self) -> std::ops::Range<usize> {
        self.first_child..self.first_child + self.child_count
    }

    #[inline]
    fn range(&self) -> std::ops::Range<usize> {
        self.first..self.first + self.count
    }
}

/// Ground-plane square a node was built from.
#[derive(Debug, Clone, Copy)]
struct Region {
    center: Vec2,
    half: f32,
}

impl Region {
    fn cell_of(&self, position: Vec3, divisions: usize) -> usize {
        let cell = self.half * 2.0 / divisions as f32;
        let last = divisions as i64 - 1;
        let axis = |p: f32, c: f32| (((p - (c - self.half)) / cell).floor() as i64).clamp(0, last) as usize;
        axis(position.z, self.center.y) * divisions + axis(position.x, self.center.x)
    }

    fn child(&self, cell: usize, divisions: usize) -> Region {
        let half = self.half / divisions as f32;
        let (row, col) = (cell / divisions, cell % divisions);
        let corner = self.center - Vec2::splat(self.half);
        Region {
            center: corner + Vec2::new(col as f32 * 2.0 + 1.0, row as f32 * 2.0 + 1.0) * half,
            half,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BhvTree {
    config: BhvConfig,
    nodes: Vec<BhvNode>,
    order: Vec<usize>,
    depth: usize,
    nodes_visited: usize,
    culled_count: usize,
}

impl BhvTree {
    /// Build the hierarchy over `instances`. The same input and config
    /// always produce the same tree.
    pub fn build(instances: &[SceneInstance], config: BhvConfig) -> Result<Self, BhvError> {
        perf_scope!("bhv_build");
        config.validate()?;

        let mut tree = Self {
            config,
            nodes: Vec::new(),
            order: (0..instances.len()).collect(),
            depth: 0,
            nodes_visited: 0,
            culled_count: 0,
        };

        let root = Region {
            center: Vec2::ZERO,
            half: config.world_radius,
        };
        let root_node = tree.leaf(instances, 0, instances.len(), 0);
        tree.nodes.push(root_node);

        let mut pending = VecDeque::from([(0usize, root)]);
        while let Some((index, region)) = pending.pop_front() {
            let node = tree.nodes[index];
            tree.depth = tree.depth.max(node.depth);
            if node.depth >= config.max_depth || node.count <= config.min_objects {
                continue;
            }

            let cells = tree.partition(instances, &node, &region);
            let first_child = tree.nodes.len();
            let mut first = node.first;
            for (cell, &count) in cells.iter().enumerate() {
                if count == 0 {
                    continue;
                }
                pending.push_back((tree.nodes.len(), region.child(cell, config.divisions)));
                let child = tree.leaf(instances, first, count, node.depth + 1);
                tree.nodes.push(child);
                first += count;
            }
            tree.nodes[index].first_child = first_child;
            tree.nodes[index].child_count = tree.nodes.len() - first_child;
        }

        log::debug!(
            "BHV built: {} instances, {} nodes, {} leaves, depth {}",
            instances.len(),
            tree.nodes.len(),
            tree.leaf_count(),
            tree.depth
        );
        Ok(tree)
    }

    fn leaf(&self, instances: &[SceneInstance], first: usize, count: usize, depth: usize) -> BhvNode {
        let (min, max) = self.order[first..first + count]
            .iter()
            .map(|&i| instances[i].bounds())
            .reduce(|(amin, amax), (bmin, bmax)| (amin.min(bmin), amax.max(bmax)))
            .unwrap_or((Vec3::ZERO, Vec3::ZERO));
        BhvNode {
            min,
            max,
            first,
            count,
            first_child: 0,
            child_count: 0,
            depth,
            culled: false,
        }
    }

    /// Stably reorder the node's range by cell and return the cell sizes.
    fn partition(&mut self, instances: &[SceneInstance], node: &BhvNode, region: &Region) -> Vec<usize> {
        let divisions = self.config.divisions;
        let range = &mut self.order[node.range()];
        let cell_of = |i: usize| region.cell_of(instances[i].position, divisions);

        let mut counts = vec![0usize; divisions * divisions];
        for &i in range.iter() {
            counts[cell_of(i)] += 1;
        }

        let mut offsets = Vec::with_capacity(counts.len());
        let mut running = 0;
        for &count in &counts {
            offsets.push(running);
            running += count;
        }

        let mut sorted = vec![0usize; range.len()];
        for &i in range.iter() {
            let cell = cell_of(i);
            sorted[offsets[cell]] = i;
            offsets[cell] += 1;
        }
        range.copy_from_slice(&sorted);
        counts
    }

    /// Clear every node's and instance's culled flag.
    pub fn reset(&mut self, instances: &mut [SceneInstance]) {
        for node in &mut self.nodes {
            node.culled = false;
        }
        for &i in &self.order {
            if let Some(instance) = instances.get_mut(i) {
                instance.state.remove(ObjectState::CULLED);
            }
        }
        self.culled_count = 0;
    }

    pub fn frustum_cull(&mut self, camera: &Camera, planes: CullPlanes, instances: &mut [SceneInstance]) -> usize {
        self.cull_frustum(&camera.extract_frustum(), planes, instances)
    }

    /// Flag every instance under a node that lies outside one of the
    /// selected planes. Nodes that pass are descended into; instances
    /// under a passing leaf are left visible without a per-object test.
    /// Returns the number of instances culled by this pass.
    pub fn cull_frustum(&mut self, frustum: &Frustum, planes: CullPlanes, instances: &mut [SceneInstance]) -> usize {
        debug_assert_eq!(
            instances.len(),
            self.order.len(),
            "BHV was built over a different instance set"
        );

        self.nodes_visited = 0;
        let mut culled = 0;
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            let Some(node) = self.nodes.get_mut(index) else {
                continue;
            };
            self.nodes_visited += 1;
            count_call!(bhv_nodes_visited);

            if node.count == 0 {
                continue;
            }
            if !frustum.intersects_aabb_planes(node.min, node.max, planes) {
                node.culled = true;
                count_call!(bhv_nodes_culled);
                for &i in &self.order[node.range()] {
                    if let Some(instance) = instances.get_mut(i) {
                        if !instance.is_culled() {
                            instance.state.insert(ObjectState::CULLED);
                            culled += 1;
                        }
                    }
                }
                continue;
            }
            // reversed so the first child is visited first
            stack.extend(node.children().rev());
        }

        self.culled_count += culled;
        log::trace!(
            "BHV cull: {} nodes visited, {} instances culled",
            self.nodes_visited,
            culled
        );
        culled
    }

    pub fn config(&self) -> &BhvConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[BhvNode] {
        &self.nodes
    }

    /// Instance indices owned by a node.
    pub fn node_instances(&self, node: &BhvNode) -> &[usize] {
        &self.order[node.range()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Deepest level reached; the root is level 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Nodes popped by the last cull pass.
    pub fn nodes_visited(&self) -> usize {
        self.nodes_visited
    }

    /// Instances culled since the last reset.
    pub fn culled_count(&self) -> usize {
        self.culled_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::instance::MeshId;

    fn grid(n: usize, spacing: f32) -> Vec<SceneInstance> {
        let offset = (n as f32 - 1.0) * spacing * 0.5;
        let mut out = Vec::new();
        for z in 0..n {
            for x in 0..n {
                let position = Vec3::new(x as f32 * spacing - offset, 0.0, z as f32 * spacing - offset);
                out.push(SceneInstance::new(MeshId(out.len()), position, 1.0));
            }
        }
        out
    }

    fn small_world() -> BhvConfig {
        BhvConfig {
            world_radius: 100.0,
            ..BhvConfig::default()
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let bad = BhvConfig {
            divisions: 1,
            ..BhvConfig::default()
        };
        assert_eq!(BhvTree::build(&[], bad).unwrap_err(), BhvError::InvalidDivisions(1));

        let bad = BhvConfig {
            world_radius: 0.0,
            ..BhvConfig::default()
        };
        assert!(matches!(
            BhvTree::build(&[], bad),
            Err(BhvError::InvalidWorldRadius(_))
        ));
    }

    #[test]
    fn leaves_partition_every_instance_once() {
        let instances = grid(9, 20.0);
        let tree = BhvTree::build(&instances, small_world()).unwrap();

        let mut seen = vec![0usize; instances.len()];
        for node in tree.nodes().iter().filter(|n| n.is_leaf()) {
            for &i in tree.node_instances(node) {
                seen[i] += 1;
            }
        }
        assert!(seen.iter().all(|&c| c == 1), "every instance belongs to exactly one leaf");
        assert!(tree.depth() <= tree.config().max_depth);
        assert!(tree.node_count() > 1);
    }

    #[test]
    fn children_ranges_tile_their_parent() {
        let instances = grid(9, 20.0);
        let tree = BhvTree::build(&instances, small_world()).unwrap();

        for node in tree.nodes().iter().filter(|n| !n.is_leaf()) {
            let children = &tree.nodes()[node.children()];
            assert_eq!(children[0].first, node.first);
            let total: usize = children.iter().map(|c| c.count).sum();
            assert_eq!(total, node.count);
            for pair in children.windows(2) {
                assert_eq!(pair[0].first + pair[0].count, pair[1].first);
            }
        }
    }

    #[test]
    fn node_bounds_enclose_instance_spheres() {
        let instances = grid(7, 13.0);
        let tree = BhvTree::build(&instances, small_world()).unwrap();

        for node in tree.nodes() {
            for &i in tree.node_instances(node) {
                let (min, max) = instances[i].bounds();
                assert!(node.min.cmple(min).all() && node.max.cmpge(max).all());
            }
        }
    }

    #[test]
    fn small_nodes_stay_leaves() {
        let instances = grid(1, 1.0);
        let tree = BhvTree::build(&instances, BhvConfig::default()).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn instances_outside_world_clamp_to_border_cells() {
        let mut instances = grid(3, 10.0);
        instances.push(SceneInstance::new(MeshId(99), Vec3::new(1.0e6, 0.0, -1.0e6), 1.0));
        let tree = BhvTree::build(&instances, small_world()).unwrap();

        let total: usize = tree.nodes()[tree.nodes()[0].children()].iter().map(|c| c.count).sum();
        assert_eq!(total, instances.len());
    }

    #[test]
    fn build_is_deterministic() {
        let instances = grid(8, 17.0);
        let a = BhvTree::build(&instances, small_world()).unwrap();
        let b = BhvTree::build(&instances, small_world()).unwrap();
        assert_eq!(a.nodes(), b.nodes());
        assert_eq!(a.order, b.order);
    }

    #[test]
    fn culling_away_from_scene_flags_everything_and_reset_clears() {
        let mut instances = grid(6, 10.0);
        let mut tree = BhvTree::build(&instances, small_world()).unwrap();

        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 500.0), 1.0);
        camera.look_at(Vec3::new(0.0, 0.0, 1000.0), Vec3::Y);

        tree.reset(&mut instances);
        let culled = tree.frustum_cull(&camera, CullPlanes::XYZ, &mut instances);
        assert_eq!(culled, instances.len());
        assert!(instances.iter().all(|i| i.is_culled()));
        assert_eq!(tree.nodes_visited(), 1, "root rejection skips the subtree");

        tree.reset(&mut instances);
        assert!(instances.iter().all(|i| !i.is_culled()));
        assert_eq!(tree.culled_count(), 0);
    }

    #[test]
    fn culling_with_scene_in_view_flags_nothing() {
        let mut instances = grid(6, 10.0);
        let mut tree = BhvTree::build(&instances, small_world()).unwrap();

        let mut camera = Camera::new(Vec3::new(0.0, 200.0, 200.0), 1.0);
        camera.look_at(Vec3::ZERO, Vec3::Y);

        tree.reset(&mut instances);
        assert_eq!(tree.frustum_cull(&camera, CullPlanes::XYZ, &mut instances), 0);
        assert_eq!(tree.nodes_visited(), tree.node_count());
    }
}
