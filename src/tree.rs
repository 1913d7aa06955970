//! Huffman tree construction.
//!
//! Nodes live in an arena owned by [`HuffmanTree`] and refer to their children
//! by [`NodeId`]. Dropping the tree drops every node at once.

use derivative::Derivative;
use tracing::debug;

use crate::error::Result;
use crate::frequency::FrequencyTable;
use crate::heap::MinHeap;

/// Index of a node inside its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    weight: u64,
    symbol: Option<u8>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl Node {
    fn leaf(symbol: u8, weight: u64) -> Self {
        Self {
            weight,
            symbol: Some(symbol),
            left: None,
            right: None,
        }
    }

    fn internal(left: NodeId, right: NodeId, weight: u64) -> Self {
        Self {
            weight,
            symbol: None,
            left: Some(left),
            right: Some(right),
        }
    }

    pub fn weight(&self) -> u64 {
        self.weight
    }

    /// Present exactly when the node is a leaf.
    pub fn symbol(&self) -> Option<u8> {
        self.symbol
    }

    pub fn left(&self) -> Option<NodeId> {
        self.left
    }

    pub fn right(&self) -> Option<NodeId> {
        self.right
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

// Heap slot: ordered by weight only so that equal weights fall back on the
// heap's insertion-order behavior.
#[derive(Debug, Clone, Copy, Derivative)]
#[derivative(PartialEq, PartialOrd)]
struct Pending {
    weight: u64,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    id: NodeId,
}

#[derive(Debug, Clone, Default)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl HuffmanTree {
    /// Builds the tree for `freq`.
    ///
    /// Leaves are inserted in ascending symbol order. Each round extracts the
    /// minimum `a`; if the heap is then empty `a` is the root, otherwise the
    /// next minimum `b` is extracted and `{left: a, right: b}` is inserted.
    /// Ties between equal weights resolve through the heap's sift rules, so
    /// the same table always yields the same tree.
    pub fn build(freq: &FrequencyTable) -> Result<Self> {
        let distinct = freq.distinct();
        let mut tree = Self {
            nodes: Vec::with_capacity(2 * distinct.max(1) - 1),
            root: None,
        };
        let mut heap = MinHeap::new();

        for (symbol, count) in freq.present() {
            let id = tree.push(Node::leaf(symbol, u64::from(count)));
            heap.insert(Pending {
                weight: u64::from(count),
                id,
            });
        }

        while !heap.is_empty() {
            let a = heap.extract_min()?;
            if heap.is_empty() {
                tree.root = Some(a.id);
                break;
            }
            let b = heap.extract_min()?;
            let weight = a.weight + b.weight;
            let id = tree.push(Node::internal(a.id, b.id, weight));
            heap.insert(Pending { weight, id });
        }

        debug!(
            distinct,
            nodes = tree.nodes.len(),
            total_weight = tree.total_weight(),
            "built huffman tree"
        );
        debug_assert!(tree.validate());
        Ok(tree)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// `None` when the frequency table was empty.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Weight of the root, which is the number of symbols the tree encodes.
    pub fn total_weight(&self) -> u64 {
        self.root.map_or(0, |id| self.node(id).weight)
    }

    /// Every node reachable from the root, children before parents.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root else {
            return order;
        };

        // (node, children already pushed)
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            let node = self.node(id);
            if expanded || node.is_leaf() {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            if let Some(right) = node.right {
                stack.push((right, false));
            }
            if let Some(left) = node.left {
                stack.push((left, false));
            }
        }
        order
    }

    /// Checks the structural invariants: every node is either a leaf with a
    /// symbol or has two children summing to its weight, and every arena node
    /// is reachable exactly once.
    pub fn validate(&self) -> bool {
        let order = self.post_order();
        if order.len() != self.nodes.len() {
            return false;
        }
        let mut seen = vec![false; self.nodes.len()];
        for id in order {
            if std::mem::replace(&mut seen[id.0], true) {
                return false;
            }
            let node = self.node(id);
            let ok = match (node.left, node.right, node.symbol) {
                (None, None, Some(_)) => true,
                (Some(l), Some(r), None) => {
                    self.node(l).weight + self.node(r).weight == node.weight
                }
                _ => false,
            };
            if !ok {
                return false;
            }
        }
        true
    }
}
