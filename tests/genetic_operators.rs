use gpensemble::engines::generation::{
    apply_mutation, create_random, crossover, initialize_population, mutate, tournament_selection,
    MutationAction,
};
use gpensemble::{GenotypeTree, Node, TreeBounds};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn bounds() -> TreeBounds {
    TreeBounds {
        max_depth: 4,
        max_children: 2,
        n_max: 5,
        pool_size: 10,
    }
}

fn random_bounds(rng: &mut StdRng) -> TreeBounds {
    let pool_size = rng.gen_range(1..12);
    TreeBounds {
        max_depth: rng.gen_range(0..5),
        max_children: rng.gen_range(1..4),
        n_max: rng.gen_range(1..=pool_size),
        pool_size,
    }
}

#[test]
fn test_initializer_respects_bounds() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
        let b = random_bounds(&mut rng);
        for tree in initialize_population(10, &b, &mut rng) {
            tree.validate(&b).unwrap();
            assert!(tree.depth() <= b.max_depth);
            assert!(tree.distinct_leaf_count() <= b.n_max);
            assert!(tree.leaf_count() >= 1);
        }
    }
}

#[test]
fn test_crossover_respects_bounds_and_leaves_parents_alone() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..300 {
        let b = random_bounds(&mut rng);
        let p1 = create_random(&b, &mut rng);
        let p2 = create_random(&b, &mut rng);
        let (p1_before, p2_before) = (p1.clone(), p2.clone());

        let (c1, c2) = crossover(&p1, &p2, &b, 10, &mut rng);

        c1.validate(&b).unwrap();
        c2.validate(&b).unwrap();
        assert_eq!(p1, p1_before);
        assert_eq!(p2, p2_before);
        // subtrees are exchanged, never created or lost
        assert_eq!(c1.node_count() + c2.node_count(), p1.node_count() + p2.node_count());
    }
}

#[test]
fn test_crossover_falls_back_to_parents() {
    // n_max = 1 and depth 1: only a root-for-root swap is valid
    let b = TreeBounds {
        max_depth: 1,
        max_children: 2,
        n_max: 1,
        pool_size: 2,
    };
    let p1 = GenotypeTree::parse("(MV 0 0)", &b).unwrap();
    let p2 = GenotypeTree::parse("(AVG 1 1)", &b).unwrap();

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (c1, c2) = crossover(&p1, &p2, &b, 3, &mut rng);
        let kept = c1 == p1 && c2 == p2;
        let swapped = c1 == p2 && c2 == p1;
        assert!(kept || swapped, "unexpected children {} / {}", c1, c2);
    }
}

#[test]
fn test_crossover_with_zero_retries_copies_parents() {
    let b = bounds();
    let mut rng = StdRng::seed_from_u64(3);
    let p1 = create_random(&b, &mut rng);
    let p2 = create_random(&b, &mut rng);

    let (c1, c2) = crossover(&p1, &p2, &b, 0, &mut rng);
    assert_eq!(c1, p1);
    assert_eq!(c2, p2);
}

#[test]
fn test_mutation_respects_bounds() {
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..300 {
        let b = random_bounds(&mut rng);
        let tree = create_random(&b, &mut rng);
        let before = tree.clone();

        let mutated = mutate(&tree, &b, 10, &mut rng);

        mutated.validate(&b).unwrap();
        assert_eq!(tree, before);
    }
}

#[test]
fn test_leaf_mutation_changes_only_that_leaf() {
    let b = bounds();
    let tree = GenotypeTree::parse("(MV (AVG 0 1) (MV 2 (AVG 3 0)))", &b).unwrap();

    for seed in 0..30 {
        let mut rng = StdRng::seed_from_u64(seed);
        let leaf_positions: Vec<usize> = (0..tree.node_count())
            .filter(|&i| matches!(tree.node(i), Some(Node::Leaf(_))))
            .collect();
        let target = leaf_positions[rng.gen_range(0..leaf_positions.len())];

        let mutated = apply_mutation(&tree, target, MutationAction::ReplaceLeaf, &b, &mut rng).unwrap();

        assert_eq!(mutated.node_count(), tree.node_count());
        assert_ne!(mutated.node(target), tree.node(target));
        for i in 0..tree.node_count() {
            if i == target {
                continue;
            }
            match (tree.node(i).unwrap(), mutated.node(i).unwrap()) {
                (Node::Leaf(old), Node::Leaf(new)) => assert_eq!(old, new),
                (
                    Node::Internal { op, children },
                    Node::Internal {
                        op: new_op,
                        children: new_children,
                    },
                ) => {
                    assert_eq!(op, new_op);
                    assert_eq!(children.len(), new_children.len());
                }
                (old, new) => panic!("node {} changed kind: {} -> {}", i, old, new),
            }
        }
        mutated.validate(&b).unwrap();
    }
}

#[test]
fn test_inapplicable_mutation_is_an_error() {
    let b = bounds();
    let mut rng = StdRng::seed_from_u64(5);
    let tree = GenotypeTree::parse("(MV 0 1)", &b).unwrap();

    // root already has max_children children
    assert!(apply_mutation(&tree, 0, MutationAction::AddChild, &b, &mut rng).is_err());
    // operator change does not apply to a leaf
    assert!(apply_mutation(&tree, 1, MutationAction::ChangeOperator, &b, &mut rng).is_err());
    // no such node
    assert!(apply_mutation(&tree, 7, MutationAction::Regrow, &b, &mut rng).is_err());
}

#[test]
fn test_single_leaf_tree_with_single_slot_pool_is_left_unchanged() {
    let b = TreeBounds {
        max_depth: 0,
        max_children: 1,
        n_max: 1,
        pool_size: 1,
    };
    let tree = GenotypeTree::parse("0", &b).unwrap();
    let mut rng = StdRng::seed_from_u64(6);
    assert_eq!(mutate(&tree, &b, 5, &mut rng), tree);
}

#[test]
fn test_operators_are_reproducible_from_seed() {
    let b = bounds();
    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let p1 = create_random(&b, &mut rng);
        let p2 = create_random(&b, &mut rng);
        let (c1, c2) = crossover(&p1, &p2, &b, 10, &mut rng);
        let m = mutate(&c1, &b, 10, &mut rng);
        (c1, c2, m)
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn test_tournament_returns_valid_index() {
    let mut rng = StdRng::seed_from_u64(7);
    let fitness = [0.3, 0.9, 0.1, 0.5];
    for _ in 0..100 {
        assert!(tournament_selection(&fitness, 3, &mut rng) < fitness.len());
    }
    // a tournament over the whole population with many draws finds the best
    let wins = (0..200)
        .filter(|_| tournament_selection(&fitness, 20, &mut rng) == 1)
        .count();
    assert!(wins > 190);
}
