use super::tree::{AggregationOp, GenotypeTree, Node, TreeBounds};
use rand::Rng;
use std::collections::BTreeSet;

/// Random tree grown top-down.
///
/// A node at depth `d` becomes a leaf with probability `d / max_depth` and always at
/// `max_depth`. Leaves pick pool indices uniformly until `n_max` distinct references
/// are in use, then reuse one of those.
pub fn create_random<R: Rng>(bounds: &TreeBounds, rng: &mut R) -> GenotypeTree {
    let mut used = BTreeSet::new();
    let root = grow(0, bounds, &mut used, rng);
    GenotypeTree::from_root_unchecked(root)
}

/// Generate `size` random trees.
pub fn initialize_population<R: Rng>(size: usize, bounds: &TreeBounds, rng: &mut R) -> Vec<GenotypeTree> {
    (0..size).map(|_| create_random(bounds, rng)).collect()
}

/// Random subtree whose root sits at `depth`.
///
/// `used` holds the references already present elsewhere in the tree and is extended
/// with the new leaves.
pub(crate) fn grow<R: Rng>(
    depth: usize,
    bounds: &TreeBounds,
    used: &mut BTreeSet<usize>,
    rng: &mut R,
) -> Node {
    if depth >= bounds.max_depth || rng.gen::<f64>() < leaf_probability(depth, bounds.max_depth) {
        return Node::Leaf(pick_leaf(bounds, used, rng));
    }

    let num_children = rng.gen_range(1..=bounds.max_children);
    let op = random_op(rng);
    let children = (0..num_children)
        .map(|_| grow(depth + 1, bounds, used, rng))
        .collect();

    Node::Internal { op, children }
}

fn random_op<R: Rng>(rng: &mut R) -> AggregationOp {
    AggregationOp::ALL[rng.gen_range(0..AggregationOp::ALL.len())]
}

/// Pool index for a new leaf that keeps `used` within `n_max`
pub(crate) fn pick_leaf<R: Rng>(bounds: &TreeBounds, used: &mut BTreeSet<usize>, rng: &mut R) -> usize {
    let index = if used.len() < bounds.n_max {
        rng.gen_range(0..bounds.pool_size)
    } else {
        let k = rng.gen_range(0..used.len());
        match used.iter().nth(k) {
            Some(&i) => i,
            None => rng.gen_range(0..bounds.pool_size),
        }
    };
    used.insert(index);
    index
}

fn leaf_probability(depth: usize, max_depth: usize) -> f64 {
    if max_depth == 0 {
        return 1.0;
    }
    depth as f64 / max_depth as f64
}
