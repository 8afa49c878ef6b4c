use super::initializer::grow;
use super::tree::{AggregationOp, GenotypeTree, Node, TreeBounds};
use crate::error::{EnsembleError, Result};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

/// Tournament selection: index of the best of K random candidates
pub fn tournament_selection<R: Rng>(
    fitness: &[f64],
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    let mut best_idx = rng.gen_range(0..fitness.len());
    let mut best_fitness = fitness[best_idx];

    for _ in 1..tournament_size {
        let idx = rng.gen_range(0..fitness.len());
        if fitness[idx] > best_fitness {
            best_idx = idx;
            best_fitness = fitness[idx];
        }
    }

    best_idx
}

/// Subtree crossover: swap one uniformly chosen node of each parent.
///
/// A swap that breaks `bounds` in either child is discarded and a new pair of nodes
/// is drawn, up to `retries` times. If every attempt fails the children are copies of
/// the parents. Children never share nodes with the parents.
pub fn crossover<R: Rng>(
    parent1: &GenotypeTree,
    parent2: &GenotypeTree,
    bounds: &TreeBounds,
    retries: usize,
    rng: &mut R,
) -> (GenotypeTree, GenotypeTree) {
    for attempt in 0..retries {
        let i = rng.gen_range(0..parent1.node_count());
        let j = rng.gen_range(0..parent2.node_count());

        match swap_subtrees(parent1, parent2, i, j, bounds) {
            Ok(children) => return children,
            Err(e) => log::trace!("Crossover attempt {} rejected: {}", attempt + 1, e),
        }
    }

    log::debug!(
        "No valid crossover between {} and {} in {} attempts, keeping parents",
        parent1,
        parent2,
        retries
    );
    (parent1.clone(), parent2.clone())
}

fn swap_subtrees(
    parent1: &GenotypeTree,
    parent2: &GenotypeTree,
    i: usize,
    j: usize,
    bounds: &TreeBounds,
) -> Result<(GenotypeTree, GenotypeTree)> {
    let from1 = parent1.node(i).cloned().ok_or_else(|| missing_node(i))?;
    let from2 = parent2.node(j).cloned().ok_or_else(|| missing_node(j))?;

    let mut child1 = parent1.clone();
    let mut child2 = parent2.clone();
    child1.replace_subtree(i, from2);
    child2.replace_subtree(j, from1);

    child1.validate(bounds)?;
    child2.validate(bounds)?;
    Ok((child1, child2))
}

/// Local change applied by [`mutate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    /// Point a leaf at a different pool classifier
    ReplaceLeaf,
    ChangeOperator,
    AddChild,
    RemoveChild,
    /// Replace the subtree with a fresh random one
    Regrow,
}

const INTERNAL_ACTIONS: [MutationAction; 4] = [
    MutationAction::ChangeOperator,
    MutationAction::AddChild,
    MutationAction::RemoveChild,
    MutationAction::Regrow,
];

/// Mutate one uniformly chosen node.
///
/// Leaves get a different classifier reference. Internal nodes get a random action
/// from [`INTERNAL_ACTIONS`]. An action that is not applicable or would break
/// `bounds` is skipped and another node/action is drawn, up to `attempts` times,
/// after which an unchanged copy is returned.
pub fn mutate<R: Rng>(
    tree: &GenotypeTree,
    bounds: &TreeBounds,
    attempts: usize,
    rng: &mut R,
) -> GenotypeTree {
    for attempt in 0..attempts {
        let index = rng.gen_range(0..tree.node_count());
        let action = match tree.node(index) {
            Some(Node::Leaf(_)) => MutationAction::ReplaceLeaf,
            Some(Node::Internal { .. }) => INTERNAL_ACTIONS[rng.gen_range(0..INTERNAL_ACTIONS.len())],
            None => continue,
        };

        match apply_mutation(tree, index, action, bounds, rng) {
            Ok(mutated) => return mutated,
            Err(e) => log::trace!("Mutation attempt {} ({:?} at node {}) skipped: {}", attempt + 1, action, index, e),
        }
    }

    log::debug!("No applicable mutation for {} in {} attempts", tree, attempts);
    tree.clone()
}

/// Apply `action` at pre-order position `index`; the input tree is left untouched.
pub fn apply_mutation<R: Rng>(
    tree: &GenotypeTree,
    index: usize,
    action: MutationAction,
    bounds: &TreeBounds,
    rng: &mut R,
) -> Result<GenotypeTree> {
    let depth = tree.node_depth(index).ok_or_else(|| missing_node(index))?;
    let target = tree.node(index).ok_or_else(|| missing_node(index))?;
    let mut mutated = tree.clone();

    match (action, target) {
        (MutationAction::ReplaceLeaf, Node::Leaf(current)) => {
            let remaining = references_without(tree, index);
            let candidates: Vec<usize> = if remaining.len() < bounds.n_max {
                (0..bounds.pool_size).filter(|c| c != current).collect()
            } else {
                remaining.into_iter().filter(|c| c != current).collect()
            };
            if candidates.is_empty() {
                return Err(EnsembleError::StructuralBoundViolation(
                    "No alternative classifier reference within n_max".to_string(),
                ));
            }
            let pick = candidates[rng.gen_range(0..candidates.len())];
            mutated.replace_subtree(index, Node::Leaf(pick));
        }
        (MutationAction::ChangeOperator, Node::Internal { op, .. }) => {
            let alternatives: Vec<AggregationOp> =
                AggregationOp::ALL.into_iter().filter(|o| o != op).collect();
            let new_op = alternatives[rng.gen_range(0..alternatives.len())];
            if let Some(Node::Internal { op, .. }) = mutated.node_mut(index) {
                *op = new_op;
            }
        }
        (MutationAction::AddChild, Node::Internal { children, .. }) => {
            if children.len() >= bounds.max_children {
                return Err(EnsembleError::StructuralBoundViolation(format!(
                    "Node already has {} children",
                    children.len()
                )));
            }
            if depth + 1 > bounds.max_depth {
                return Err(EnsembleError::StructuralBoundViolation(
                    "New child would exceed the maximum depth".to_string(),
                ));
            }
            let mut used = tree.distinct_leaves();
            let child = grow(depth + 1, bounds, &mut used, rng);
            if let Some(Node::Internal { children, .. }) = mutated.node_mut(index) {
                children.push(child);
            }
        }
        (MutationAction::RemoveChild, Node::Internal { children, .. }) => {
            if children.len() <= 1 {
                return Err(EnsembleError::StructuralBoundViolation(
                    "Cannot remove the only child".to_string(),
                ));
            }
            let victim = rng.gen_range(0..children.len());
            if let Some(Node::Internal { children, .. }) = mutated.node_mut(index) {
                children.remove(victim);
            }
        }
        (MutationAction::Regrow, Node::Internal { .. }) => {
            let mut used = references_without(tree, index);
            let subtree = grow(depth, bounds, &mut used, rng);
            mutated.replace_subtree(index, subtree);
        }
        (action, node) => {
            return Err(EnsembleError::StructuralBoundViolation(format!(
                "{:?} does not apply to {}",
                action, node
            )));
        }
    }

    mutated.validate(bounds)?;
    Ok(mutated)
}

/// Distinct references left in `tree` once the subtree at `index` is removed
fn references_without(tree: &GenotypeTree, index: usize) -> BTreeSet<usize> {
    let mut counts = BTreeMap::new();
    count_leaves(tree.root(), &mut counts);
    if let Some(subtree) = tree.node(index) {
        let mut removed = BTreeMap::new();
        count_leaves(subtree, &mut removed);
        for (leaf, n) in removed {
            if let Some(count) = counts.get_mut(&leaf) {
                *count -= n;
            }
        }
    }
    counts
        .into_iter()
        .filter(|&(_, n)| n > 0)
        .map(|(leaf, _)| leaf)
        .collect()
}

fn count_leaves(node: &Node, counts: &mut BTreeMap<usize, usize>) {
    match node {
        Node::Leaf(index) => *counts.entry(*index).or_insert(0) += 1,
        Node::Internal { children, .. } => {
            for child in children {
                count_leaves(child, counts);
            }
        }
    }
}

fn missing_node(index: usize) -> EnsembleError {
    EnsembleError::StructuralBoundViolation(format!("No node at position {}", index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn bounds() -> TreeBounds {
        TreeBounds {
            max_depth: 3,
            max_children: 2,
            n_max: 3,
            pool_size: 6,
        }
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let fitness = vec![0.1, 0.9, 0.2];
        let mut rng = StdRng::seed_from_u64(0);
        let picks: Vec<usize> = (0..200).map(|_| tournament_selection(&fitness, 3, &mut rng)).collect();
        let best = picks.iter().filter(|&&i| i == 1).count();
        assert!(best > 100);
    }

    #[test]
    fn test_references_without_subtree() {
        let tree = GenotypeTree::parse("(MV 0 (AVG 0 2))", &bounds()).unwrap();
        assert_eq!(references_without(&tree, 2), BTreeSet::from([0]));
        assert_eq!(references_without(&tree, 1), BTreeSet::from([0, 2]));
    }

    #[test]
    fn test_replace_leaf_respects_n_max() {
        let b = bounds();
        let tree = GenotypeTree::parse("(MV (AVG 0 1) (AVG 2 0))", &b).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let mutated = apply_mutation(&tree, 2, MutationAction::ReplaceLeaf, &b, &mut rng).unwrap();
            match mutated.node(2) {
                Some(Node::Leaf(i)) => assert!(*i == 1 || *i == 2),
                other => panic!("unexpected node {:?}", other),
            }
        }
    }

    #[test]
    fn test_action_on_wrong_node_kind_fails() {
        let b = bounds();
        let tree = GenotypeTree::parse("(MV 0 1)", &b).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(apply_mutation(&tree, 1, MutationAction::ChangeOperator, &b, &mut rng).is_err());
        assert!(apply_mutation(&tree, 0, MutationAction::ReplaceLeaf, &b, &mut rng).is_err());
        assert!(apply_mutation(&tree, 0, MutationAction::AddChild, &b, &mut rng).is_err());
    }

    #[test]
    fn test_change_operator_and_remove_child() {
        let b = bounds();
        let tree = GenotypeTree::parse("(MV 0 1)", &b).unwrap();
        let mut rng = StdRng::seed_from_u64(2);

        let changed = apply_mutation(&tree, 0, MutationAction::ChangeOperator, &b, &mut rng).unwrap();
        assert_eq!(changed.to_string(), "(AVG 0 1)");

        let removed = apply_mutation(&tree, 0, MutationAction::RemoveChild, &b, &mut rng).unwrap();
        assert_eq!(removed.leaf_count(), 1);
        assert_eq!(removed.node_count(), 2);
    }
}
