use crate::error::{EnsembleError, Result};
use crate::types::LabelConfidences;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// How an internal node combines the outputs of its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationOp {
    /// Fraction of covering children voting positive; a tie (0.5) counts as positive
    MajorityVote,
    /// Mean confidence of covering children
    AverageConfidence,
}

impl AggregationOp {
    pub const ALL: [AggregationOp; 2] = [AggregationOp::MajorityVote, AggregationOp::AverageConfidence];

    pub fn symbol(&self) -> &'static str {
        match self {
            AggregationOp::MajorityVote => "MV",
            AggregationOp::AverageConfidence => "AVG",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Combine per label over the children covering that label.
    /// Labels no child covers stay uncovered.
    pub fn combine(&self, children: &[LabelConfidences]) -> LabelConfidences {
        let width = children.iter().map(|c| c.len()).max().unwrap_or(0);
        let mut out = LabelConfidences::uncovered(width);

        for position in 0..width {
            let votes: Vec<f64> = children.iter().filter_map(|c| c.get(position)).collect();
            if votes.is_empty() {
                continue;
            }
            let value = match self {
                AggregationOp::MajorityVote => {
                    votes.iter().filter(|&&v| v >= 0.5).count() as f64 / votes.len() as f64
                }
                AggregationOp::AverageConfidence => votes.iter().sum::<f64>() / votes.len() as f64,
            };
            out.set(position, value);
        }

        out
    }
}

/// Genotype tree node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Node {
    /// Reference to a pool classifier by index
    Leaf(usize),
    Internal {
        op: AggregationOp,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn internal(op: AggregationOp, children: Vec<Node>) -> Self {
        Node::Internal { op, children }
    }

    /// Longest root-to-leaf edge count; a leaf has height 0
    pub fn height(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Internal { children, .. } => {
                1 + children.iter().map(Node::height).max().unwrap_or(0)
            }
        }
    }

    /// Number of nodes in this subtree
    pub fn size(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Internal { children, .. } => 1 + children.iter().map(Node::size).sum::<usize>(),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Internal { children, .. } => children.iter().map(Node::leaf_count).sum(),
        }
    }

    pub fn collect_leaves(&self, out: &mut BTreeSet<usize>) {
        match self {
            Node::Leaf(index) => {
                out.insert(*index);
            }
            Node::Internal { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    pub fn distinct_leaves(&self) -> BTreeSet<usize> {
        let mut out = BTreeSet::new();
        self.collect_leaves(&mut out);
        out
    }

    fn check_shape(&self) -> Result<()> {
        match self {
            Node::Leaf(_) => Ok(()),
            Node::Internal { children, .. } if children.is_empty() => Err(
                EnsembleError::StructuralBoundViolation("Internal node has no children".to_string()),
            ),
            Node::Internal { children, .. } => children.iter().try_for_each(Node::check_shape),
        }
    }

    fn check(&self, depth: usize, bounds: &TreeBounds) -> Result<()> {
        if depth > bounds.max_depth {
            return Err(EnsembleError::StructuralBoundViolation(format!(
                "Node at depth {} exceeds maximum depth {}",
                depth, bounds.max_depth
            )));
        }
        match self {
            Node::Leaf(index) => {
                if *index >= bounds.pool_size {
                    return Err(EnsembleError::StructuralBoundViolation(format!(
                        "Leaf references classifier {} but the pool has {}",
                        index, bounds.pool_size
                    )));
                }
                Ok(())
            }
            Node::Internal { children, .. } => {
                if children.is_empty() || children.len() > bounds.max_children {
                    return Err(EnsembleError::StructuralBoundViolation(format!(
                        "Internal node has {} children, allowed 1..={}",
                        children.len(),
                        bounds.max_children
                    )));
                }
                children.iter().try_for_each(|c| c.check(depth + 1, bounds))
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(index) => write!(f, "{}", index),
            Node::Internal { op, children } => {
                write!(f, "({}", op.symbol())?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Parses the s-expression form produced by `Display`, e.g. `(MV 0 (AVG 3 4))`.
impl FromStr for Node {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self> {
        let spaced = s.replace('(', " ( ").replace(')', " ) ");
        let tokens: Vec<&str> = spaced.split_whitespace().collect();
        let mut position = 0;
        let node = parse_node(&tokens, &mut position)?;
        if position != tokens.len() {
            return Err(EnsembleError::Parse(format!(
                "Unexpected trailing input after token {}",
                position
            )));
        }
        Ok(node)
    }
}

fn parse_node(tokens: &[&str], position: &mut usize) -> Result<Node> {
    let token = tokens
        .get(*position)
        .ok_or_else(|| EnsembleError::Parse("Unexpected end of input".to_string()))?;
    *position += 1;

    if *token != "(" {
        return token
            .parse::<usize>()
            .map(Node::Leaf)
            .map_err(|_| EnsembleError::Parse(format!("Expected classifier index, got '{}'", token)));
    }

    let symbol = tokens
        .get(*position)
        .ok_or_else(|| EnsembleError::Parse("Missing operator".to_string()))?;
    let op = AggregationOp::from_symbol(symbol)
        .ok_or_else(|| EnsembleError::Parse(format!("Unknown operator '{}'", symbol)))?;
    *position += 1;

    let mut children = Vec::new();
    loop {
        match tokens.get(*position) {
            Some(&")") => {
                *position += 1;
                return Ok(Node::Internal { op, children });
            }
            Some(_) => children.push(parse_node(tokens, position)?),
            None => return Err(EnsembleError::Parse("Unclosed parenthesis".to_string())),
        }
    }
}

/// Structural limits every genotype tree must respect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeBounds {
    /// Maximum node depth (root = 0)
    pub max_depth: usize,
    pub max_children: usize,
    /// Maximum number of distinct classifier references
    pub n_max: usize,
    pub pool_size: usize,
}

impl TreeBounds {
    /// Bounds under which a valid tree always exists
    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 || self.max_children == 0 {
            return Err(EnsembleError::Configuration(
                "Pool size and max children must be at least 1".to_string(),
            ));
        }
        if self.n_max == 0 || self.n_max > self.pool_size {
            return Err(EnsembleError::Configuration(format!(
                "n_max must be between 1 and {}, got {}",
                self.pool_size, self.n_max
            )));
        }
        Ok(())
    }
}

/// An individual of the ensemble search.
///
/// Serializes as its root node. Deserializing runs the structural checks of
/// [`GenotypeTree::validate_structure`]; bound checks need a [`TreeBounds`] and stay
/// with [`GenotypeTree::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Node", into = "Node")]
pub struct GenotypeTree {
    root: Node,
}

impl TryFrom<Node> for GenotypeTree {
    type Error = EnsembleError;

    fn try_from(root: Node) -> Result<Self> {
        let tree = Self { root };
        tree.validate_structure()?;
        Ok(tree)
    }
}

impl From<GenotypeTree> for Node {
    fn from(tree: GenotypeTree) -> Self {
        tree.root
    }
}

impl GenotypeTree {
    /// Wrap `root`, rejecting trees that break `bounds`.
    pub fn new(root: Node, bounds: &TreeBounds) -> Result<Self> {
        let tree = Self { root };
        tree.validate(bounds)?;
        Ok(tree)
    }

    /// Parse the s-expression form and validate it.
    pub fn parse(s: &str, bounds: &TreeBounds) -> Result<Self> {
        Self::new(s.parse()?, bounds)
    }

    /// Callers must validate before handing the tree out.
    pub(crate) fn from_root_unchecked(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn depth(&self) -> usize {
        self.root.height()
    }

    pub fn node_count(&self) -> usize {
        self.root.size()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    pub fn distinct_leaves(&self) -> BTreeSet<usize> {
        self.root.distinct_leaves()
    }

    pub fn distinct_leaf_count(&self) -> usize {
        self.distinct_leaves().len()
    }

    /// At least one leaf and no childless internal node
    pub fn validate_structure(&self) -> Result<()> {
        if self.leaf_count() == 0 {
            return Err(EnsembleError::EmptyGenotype);
        }
        self.root.check_shape()
    }

    pub fn validate(&self, bounds: &TreeBounds) -> Result<()> {
        self.validate_structure()?;
        self.root.check(0, bounds)?;

        let distinct = self.distinct_leaf_count();
        if distinct > bounds.n_max {
            return Err(EnsembleError::StructuralBoundViolation(format!(
                "{} distinct classifier references exceed n_max {}",
                distinct, bounds.n_max
            )));
        }
        Ok(())
    }

    /// Node at a pre-order position (root = 0)
    pub fn node(&self, index: usize) -> Option<&Node> {
        locate(&self.root, index, 0, &mut 0).map(|(node, _)| node)
    }

    /// Depth of the node at a pre-order position
    pub fn node_depth(&self, index: usize) -> Option<usize> {
        locate(&self.root, index, 0, &mut 0).map(|(_, depth)| depth)
    }

    pub(crate) fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        locate_mut(&mut self.root, index, &mut 0)
    }

    /// Swap in `subtree` at a pre-order position, returning the node it replaced.
    pub(crate) fn replace_subtree(&mut self, index: usize, subtree: Node) -> Option<Node> {
        self.node_mut(index)
            .map(|slot| std::mem::replace(slot, subtree))
    }
}

impl fmt::Display for GenotypeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

fn locate<'a>(node: &'a Node, target: usize, depth: usize, counter: &mut usize) -> Option<(&'a Node, usize)> {
    if *counter == target {
        return Some((node, depth));
    }
    *counter += 1;
    if let Node::Internal { children, .. } = node {
        for child in children {
            if let Some(found) = locate(child, target, depth + 1, counter) {
                return Some(found);
            }
        }
    }
    None
}

fn locate_mut<'a>(node: &'a mut Node, target: usize, counter: &mut usize) -> Option<&'a mut Node> {
    if *counter == target {
        return Some(node);
    }
    *counter += 1;
    if let Node::Internal { children, .. } = node {
        for child in children.iter_mut() {
            if let Some(found) = locate_mut(child, target, counter) {
                return Some(found);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> TreeBounds {
        TreeBounds {
            max_depth: 3,
            max_children: 3,
            n_max: 3,
            pool_size: 5,
        }
    }

    #[test]
    fn test_parse_and_display() {
        let tree = GenotypeTree::parse("(MV 0 (AVG 3 4) 0)", &bounds()).unwrap();
        assert_eq!(tree.to_string(), "(MV 0 (AVG 3 4) 0)");
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.node_count(), 6);
        assert_eq!(tree.leaf_count(), 4);
        assert_eq!(tree.distinct_leaf_count(), 3);
    }

    #[test]
    fn test_preorder_addressing() {
        let tree = GenotypeTree::parse("(MV 0 (AVG 3 4) 4)", &bounds()).unwrap();
        assert_eq!(tree.node(0), Some(tree.root()));
        assert_eq!(tree.node(1), Some(&Node::Leaf(0)));
        assert_eq!(tree.node(3), Some(&Node::Leaf(3)));
        assert_eq!(tree.node(5), Some(&Node::Leaf(4)));
        assert_eq!(tree.node(6), None);
        assert_eq!(tree.node_depth(2), Some(1));
        assert_eq!(tree.node_depth(4), Some(2));
    }

    #[test]
    fn test_bounds_are_enforced() {
        let b = bounds();
        assert!(matches!(
            GenotypeTree::parse("(MV 0 1 2 3)", &b),
            Err(EnsembleError::StructuralBoundViolation(_))
        ));
        assert!(matches!(
            GenotypeTree::parse("(MV (MV (MV (MV 0))))", &b),
            Err(EnsembleError::StructuralBoundViolation(_))
        ));
        assert!(matches!(
            GenotypeTree::parse("(MV 0 1 (AVG 2 3))", &b),
            Err(EnsembleError::StructuralBoundViolation(_))
        ));
        assert!(matches!(
            GenotypeTree::parse("(MV 9)", &b),
            Err(EnsembleError::StructuralBoundViolation(_))
        ));
        assert!(matches!(GenotypeTree::parse("(MV)", &b), Err(EnsembleError::EmptyGenotype)));
    }

    #[test]
    fn test_json_roundtrip() {
        let tree = GenotypeTree::parse("(MV 0 (AVG 3 4))", &bounds()).unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        let back: GenotypeTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_deserialize_rejects_malformed_trees() {
        let empty = r#"{"Internal":{"op":"MajorityVote","children":[]}}"#;
        assert!(serde_json::from_str::<GenotypeTree>(empty).is_err());

        let hollow_child = r#"{"Internal":{"op":"MajorityVote","children":[
            {"Leaf":0},
            {"Internal":{"op":"AverageConfidence","children":[]}}
        ]}}"#;
        assert!(serde_json::from_str::<GenotypeTree>(hollow_child).is_err());

        let leaf: GenotypeTree = serde_json::from_str(r#"{"Leaf":2}"#).unwrap();
        assert_eq!(leaf.leaf_count(), 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!("(MV 0".parse::<Node>().is_err());
        assert!("(XX 0)".parse::<Node>().is_err());
        assert!("0 1".parse::<Node>().is_err());
        assert!("(MV a)".parse::<Node>().is_err());
    }

    #[test]
    fn test_majority_vote_tie_is_positive() {
        let a = LabelConfidences::from_values(vec![None, Some(1.0), None, Some(0.0)]);
        let b = LabelConfidences::from_values(vec![None, Some(1.0), None, Some(1.0)]);
        let combined = AggregationOp::MajorityVote.combine(&[a, b]);
        assert_eq!(combined.bipartition(), vec![false, true, false, true]);
        assert_eq!(combined.get(0), None);
        assert_eq!(combined.get(3), Some(0.5));
    }

    #[test]
    fn test_average_ignores_uncovered_children() {
        let a = LabelConfidences::from_values(vec![Some(0.2), None]);
        let b = LabelConfidences::from_values(vec![Some(0.6), Some(0.4)]);
        let combined = AggregationOp::AverageConfidence.combine(&[a, b]);
        assert!((combined.get(0).unwrap() - 0.4).abs() < 1e-12);
        assert_eq!(combined.get(1), Some(0.4));
        assert_eq!(combined.bipartition(), vec![false, false]);
    }
}
