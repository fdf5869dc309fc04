//! Arena-backed search tree used by the MCTS engine.
//!
//! Nodes live in a contiguous `Vec` and reference each other by index,
//! so parent back-links need no shared ownership and the whole tree is
//! dropped wholesale when a search finishes. A node's [`NodeId`] is its
//! arena index, which doubles as the stable per-tree identity exposed to
//! external renderers.

use serde::Serialize;

use crate::board::{Board, Move, Side};
use crate::rules;

/// Index of a node within its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub u32);

/// A single node: one reachable board state plus its visit statistics.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    /// Arena index of the node that produced this state, None for the root
    pub parent: Option<NodeId>,
    /// Move that led here from the parent, None for the root
    pub mv: Option<Move>,
    /// Owned copy of the board at this node
    pub state: Board,
    /// Side to move in `state`
    pub to_move: Side,
    /// Number of backpropagation passes through this node
    pub visits: u64,
    /// Accumulated reward, recorded from the searching side's perspective
    pub wins: f64,
    /// Legal moves not yet expanded into children; shrinks to empty
    pub untried: Vec<Move>,
    /// Children in insertion order; at most one child per move
    pub children: Vec<(Move, NodeId)>,
}

impl Node {
    fn new(parent: Option<NodeId>, mv: Option<Move>, state: Board, to_move: Side) -> Self {
        // Terminal positions get no untried moves, so selection stops at
        // them instead of attempting an expansion.
        let untried = if rules::is_terminal(&state) {
            Vec::new()
        } else {
            rules::empty_cells(&state)
        };
        Node {
            parent,
            mv,
            state,
            to_move,
            visits: 0,
            wins: 0.0,
            untried,
            children: Vec::new(),
        }
    }

    /// Win ratio of this node, or None if it was never visited.
    ///
    /// An unvisited node has no defined ratio; 0.0 would be a real,
    /// meaningfully different score. Callers must branch on the Option
    /// rather than substitute a sentinel.
    pub fn ratio(&self) -> Option<f64> {
        if self.visits > 0 {
            Some(self.wins / self.visits as f64)
        } else {
            None
        }
    }

    /// Look up the child reached by a move, if it has been expanded
    pub fn child(&self, mv: Move) -> Option<NodeId> {
        self.children
            .iter()
            .find(|(m, _)| *m == mv)
            .map(|(_, id)| *id)
    }

    /// Whether this node's position is terminal
    pub fn is_terminal(&self) -> bool {
        rules::is_terminal(&self.state)
    }
}

/// Partially-built game tree rooted at the position under search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SearchTree {
    /// Create a tree holding only the root position
    pub fn new(root_state: Board, to_move: Side) -> Self {
        SearchTree {
            nodes: vec![Node::new(None, None, root_state, to_move)],
            root: NodeId(0),
        }
    }

    /// Arena index of the root node
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// The root node
    pub fn root(&self) -> &Node {
        self.node(self.root)
    }

    /// Get a node by id
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0 as usize]
    }

    /// Total number of nodes in the tree; never zero, since a tree is
    /// created with its root already in place
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Add a child reached from `parent` by `mv`, returning its id.
    ///
    /// If a child for `mv` already exists this is a no-op returning the
    /// existing id: the random-walk variant revisits known moves and must
    /// not duplicate nodes or reset their statistics. The move is removed
    /// from the parent's untried set either way.
    pub fn add_child(&mut self, parent: NodeId, mv: Move, state: Board) -> NodeId {
        if let Some(existing) = self.node(parent).child(mv) {
            return existing;
        }

        let to_move = self.node(parent).to_move.opponent();
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(Some(parent), Some(mv), state, to_move));

        let parent_node = self.node_mut(parent);
        parent_node.untried.retain(|m| *m != mv);
        parent_node.children.push((mv, id));
        id
    }

    /// Backpropagate one playout result from `leaf` up to the root.
    ///
    /// Every node on the path has its visit count incremented and the
    /// same `reward` added to its win score. The reward is from a single
    /// fixed perspective (the searching side), not flipped per ply; the
    /// selection formula's perspective flip accounts for that.
    pub fn backpropagate(&mut self, leaf: NodeId, reward: f64) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = self.node_mut(id);
            node.visits += 1;
            node.wins += reward;
            current = node.parent;
        }
    }

    /// Move to the root child with the highest win ratio.
    ///
    /// Unvisited children have no ratio and are never candidates. Ties go
    /// to the earliest-inserted child. Returns None when no child has
    /// been visited (e.g. an exhausted-before-start budget).
    pub fn best_move(&self) -> Option<Move> {
        let mut best: Option<(Move, f64)> = None;
        for &(mv, child_id) in &self.root().children {
            let Some(ratio) = self.node(child_id).ratio() else {
                continue;
            };
            match best {
                Some((_, best_ratio)) if ratio <= best_ratio => {}
                _ => best = Some((mv, ratio)),
            }
        }
        best.map(|(mv, _)| mv)
    }

    /// Serialize the whole tree to JSON for external renderers.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String, crate::Error> {
        Ok(serde_json::to_string(self)?)
    }
}
