// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

const SAH_BUCKETS: usize = 12;
const TRAVERSAL_COST: Float = 1.0;

#[derive(Clone)]
enum BVHNode {
    Leaf { bounds: AABB, start: usize, count: usize },
    Interior { bounds: AABB, left: usize, right: usize, axis: usize },
}

impl BVHNode {
    fn bounds(&self) -> &AABB {
        match self {
            BVHNode::Leaf { bounds, .. } | BVHNode::Interior { bounds, .. } => bounds,
        }
    }
}

/// Bounding volume hierarchy over opaque primitives. The BVH only knows their
/// bounds and centroids; intersection is delegated to caller callbacks.
pub struct BVH {
    nodes: Vec<BVHNode>,
    indices: Vec<usize>,
    max_leaf_size: usize,
}

struct BuildInput<'a> {
    bounds: &'a [AABB],
    centroids: &'a [Vector3f],
}

impl BVH {
    pub fn new(prim_bounds: Vec<AABB>, prim_centroids: Vec<Vector3f>) -> Self {
        Self::with_max_leaf_size(prim_bounds, prim_centroids, 4)
    }

    pub fn with_max_leaf_size(
        prim_bounds: Vec<AABB>,
        prim_centroids: Vec<Vector3f>,
        max_leaf_size: usize,
    ) -> Self {
        let mut bvh = Self {
            nodes: Vec::new(),
            indices: (0..prim_bounds.len()).collect(),
            max_leaf_size: max_leaf_size.max(1),
        };
        if !bvh.indices.is_empty() {
            let input = BuildInput { bounds: &prim_bounds, centroids: &prim_centroids };
            let count = bvh.indices.len();
            bvh.build(&input, 0, count);
        }
        log::debug!("BVH built: {} primitives, {} nodes", bvh.indices.len(), bvh.nodes.len());
        bvh
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn bounds(&self) -> AABB {
        self.nodes.first().map(|n| *n.bounds()).unwrap_or_default()
    }

    /// Closest hit reported by `hit_fn`. The callback receives a copy of the ray
    /// whose `max_t` has been shrunk to the closest hit found so far.
    pub fn ray_intersection<F, T>(&self, ray: &Ray3f, mut hit_fn: F) -> Option<(usize, T)>
    where
        F: FnMut(usize, &Ray3f) -> Option<(T, Float)>,
    {
        let mut closest: Option<(usize, T)> = None;
        let mut search = *ray;
        self.traverse(&mut search, |prim_idx, r| {
            if let Some((hit, t)) = hit_fn(prim_idx, &*r) {
                if r.test_segment(t) {
                    r.max_t = t;
                    closest = Some((prim_idx, hit));
                }
            }
            false
        });
        closest
    }

    /// Any-hit query for shadow rays.
    pub fn ray_intersection_t<F>(&self, ray: &Ray3f, mut hit_fn: F) -> bool
    where
        F: FnMut(usize, &Ray3f) -> bool,
    {
        let mut search = *ray;
        let mut found = false;
        self.traverse(&mut search, |prim_idx, r| {
            found = hit_fn(prim_idx, &*r);
            found
        });
        found
    }

    // Visits leaves front to back, skipping nodes beyond `ray.max_t`. Stops as
    // soon as `visit` returns true.
    fn traverse<V>(&self, ray: &mut Ray3f, mut visit: V)
    where
        V: FnMut(usize, &mut Ray3f) -> bool,
    {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack = vec![0usize];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            match node.bounds().ray_intersect(ray) {
                Some(t_entry) if t_entry <= ray.max_t => {}
                _ => continue,
            }
            match *node {
                BVHNode::Leaf { start, count, .. } => {
                    for i in start..start + count {
                        if visit(self.indices[i], ray) {
                            return;
                        }
                    }
                }
                BVHNode::Interior { left, right, axis, .. } => {
                    // Push the far child first so the near one is popped next.
                    if ray.dir()[axis] >= 0.0 {
                        stack.push(right);
                        stack.push(left);
                    } else {
                        stack.push(left);
                        stack.push(right);
                    }
                }
            }
        }
    }

    fn push_leaf(&mut self, bounds: AABB, start: usize, count: usize) -> usize {
        self.nodes.push(BVHNode::Leaf { bounds, start, count });
        self.nodes.len() - 1
    }

    fn build(&mut self, input: &BuildInput, start: usize, end: usize) -> usize {
        let mut bounds = AABB::default();
        let mut centroid_bounds = AABB::default();
        for &idx in &self.indices[start..end] {
            bounds.expand_by_aabb(&input.bounds[idx]);
            centroid_bounds.expand_by_point(&input.centroids[idx]);
        }

        let count = end - start;
        if count <= self.max_leaf_size {
            return self.push_leaf(bounds, start, count);
        }

        let axis = centroid_bounds.max_extent() as usize;
        let axis_min = centroid_bounds.p_min[axis];
        let extent = centroid_bounds.p_max[axis] - axis_min;
        if extent <= 1e-6 {
            return self.push_leaf(bounds, start, count);
        }
        let bucket_of = |c: &Vector3f| {
            let b = ((c[axis] - axis_min) / extent * SAH_BUCKETS as Float) as usize;
            b.min(SAH_BUCKETS - 1)
        };

        let mut buckets = [(0usize, AABB::default()); SAH_BUCKETS];
        for &idx in &self.indices[start..end] {
            let b = bucket_of(&input.centroids[idx]);
            buckets[b].0 += 1;
            buckets[b].1.expand_by_aabb(&input.bounds[idx]);
        }

        // Sweep from both ends to get the SAH cost of every split plane.
        let inv_area = 1.0 / bounds.surface_area().max(1e-12);
        let mut best = (Float::MAX, 0usize);
        for split in 0..SAH_BUCKETS - 1 {
            let (mut b0, mut b1) = (AABB::default(), AABB::default());
            let (mut n0, mut n1) = (0usize, 0usize);
            for (n, b) in &buckets[..=split] {
                n0 += n;
                b0.expand_by_aabb(b);
            }
            for (n, b) in &buckets[split + 1..] {
                n1 += n;
                b1.expand_by_aabb(b);
            }
            let area0 = if n0 > 0 { b0.surface_area() } else { 0.0 };
            let area1 = if n1 > 0 { b1.surface_area() } else { 0.0 };
            let cost = TRAVERSAL_COST + (n0 as Float * area0 + n1 as Float * area1) * inv_area;
            if cost < best.0 {
                best = (cost, split);
            }
        }

        if best.0 >= count as Float {
            return self.push_leaf(bounds, start, count);
        }

        let mut mid = start;
        for i in start..end {
            if bucket_of(&input.centroids[self.indices[i]]) <= best.1 {
                self.indices.swap(i, mid);
                mid += 1;
            }
        }
        if mid == start || mid == end {
            return self.push_leaf(bounds, start, count);
        }

        let node_idx = self.push_leaf(bounds, start, count);
        let left = self.build(input, start, mid);
        let right = self.build(input, mid, end);
        self.nodes[node_idx] = BVHNode::Interior { bounds, left, right, axis };
        node_idx
    }
}

#[cfg(test)]
mod tests {
    use super::BVH;
    use crate::core::rng::LcgRng;
    use crate::math::constants::{Float, Vector3f};
    use crate::math::ray::Ray3f;
    use crate::shapes::triangle::Triangle;

    fn random_triangles(count: usize) -> Vec<Triangle> {
        let mut rng = LcgRng::new(5);
        (0..count)
            .map(|_| {
                let c = Vector3f::new(rng.next_f32() * 10.0, rng.next_f32() * 10.0, rng.next_f32() * 10.0);
                let jitter = |rng: &mut LcgRng| Vector3f::new(rng.next_f32(), rng.next_f32(), rng.next_f32()) - Vector3f::repeat(0.5);
                Triangle::new(c + jitter(&mut rng), c + jitter(&mut rng), c + jitter(&mut rng))
            })
            .collect()
    }

    fn build(triangles: &[Triangle]) -> BVH {
        let bounds: Vec<_> = triangles.iter().map(|t| t.bounding_box()).collect();
        let centroids = bounds.iter().map(|b| b.center()).collect();
        BVH::new(bounds, centroids)
    }

    fn naive_closest(triangles: &[Triangle], ray: &Ray3f) -> Option<(usize, Float)> {
        let mut best: Option<(usize, Float)> = None;
        for (idx, tri) in triangles.iter().enumerate() {
            if let Some(hit) = tri.ray_intersection(ray) {
                if best.map_or(true, |(_, t)| hit.t < t) {
                    best = Some((idx, hit.t));
                }
            }
        }
        best
    }

    #[test]
    fn test_bvh_vs_naive_triangles() {
        let triangles = random_triangles(300);
        let bvh = build(&triangles);
        assert!(bvh.node_count() > 1);

        let mut rng = LcgRng::new(17);
        for _ in 0..500 {
            let origin = Vector3f::new(rng.next_f32() * 10.0, rng.next_f32() * 10.0, -5.0);
            let target = Vector3f::new(rng.next_f32() * 10.0, rng.next_f32() * 10.0, 15.0);
            let ray = Ray3f::new(origin, target - origin, None, None);

            let bvh_hit = bvh.ray_intersection(&ray, |prim_idx, r| {
                triangles[prim_idx].ray_intersection(r).map(|h| (h.t, h.t))
            });
            let naive = naive_closest(&triangles, &ray);
            match (bvh_hit, naive) {
                (None, None) => {}
                (Some((_, t_bvh)), Some((_, t_naive))) => assert!((t_bvh - t_naive).abs() < 1e-4),
                other => panic!("BVH and naive traversal disagree: {:?}", other),
            }

            let any = bvh.ray_intersection_t(&ray, |prim_idx, r| triangles[prim_idx].ray_intersection_t(r));
            assert_eq!(any, naive.is_some());
        }
    }

    #[test]
    fn test_empty_bvh_misses() {
        let bvh = BVH::new(Vec::new(), Vec::new());
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::z(), None, None);
        let hit: Option<(usize, Float)> = bvh.ray_intersection(&ray, |_, _| Some((0.0, 1.0)));
        assert!(hit.is_none());
        assert!(!bvh.ray_intersection_t(&ray, |_, _| true));
    }
}
