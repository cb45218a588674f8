//! A hand-built game tree used to check search results against minimax values
//! worked out on paper.

use crate::error::SearchError;
use crate::game::{Evaluator, MoveSource, Position};
use crate::types::{Score, Side};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Node {
    children: Vec<usize>,
    /// Static value from `Side::First`'s point of view.
    value: Score,
    /// Enumerating moves for this side reports a king capture.
    king_capturer: Option<Side>,
}

#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new(root_value: Score) -> Self {
        let mut tree = Tree::default();
        tree.add_root(root_value);
        tree
    }

    fn add_root(&mut self, value: Score) {
        self.nodes.push(Node {
            children: Vec::new(),
            value,
            king_capturer: None,
        });
    }

    pub fn child(&mut self, parent: usize, value: Score) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            children: Vec::new(),
            value,
            king_capturer: None,
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub fn set_king_capturer(&mut self, node: usize, side: Side) {
        self.nodes[node].king_capturer = Some(side);
    }

    pub fn root(&self) -> TreePos {
        self.at(0)
    }

    pub fn at(&self, id: usize) -> TreePos {
        TreePos {
            id,
            tree: Arc::new(self.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreePos {
    pub id: usize,
    tree: Arc<Tree>,
}

impl Position for TreePos {
    type Move = usize;
    type Key = usize;

    fn apply_move(&self, mv: &usize) -> Self {
        TreePos {
            id: *mv,
            tree: self.tree.clone(),
        }
    }

    fn canonical_key(&self) -> usize {
        self.id
    }
}

#[derive(Debug, Default)]
pub struct TreeMoves;

impl MoveSource<TreePos> for TreeMoves {
    fn moves_for_side(&self, pos: &TreePos, side: Side) -> Result<Vec<usize>, SearchError> {
        let node = &pos.tree.nodes[pos.id];
        if node.king_capturer == Some(side) {
            return Err(SearchError::IllegalKingCapture);
        }
        Ok(node.children.clone())
    }
}

#[derive(Debug, Default)]
pub struct TreeEval {
    calls: AtomicUsize,
}

impl TreeEval {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Evaluator<TreePos> for TreeEval {
    fn evaluate(&self, pos: &TreePos, side: Side) -> Score {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let value = pos.tree.nodes[pos.id].value;
        match side {
            Side::First => value,
            Side::Second => -value,
        }
    }
}

pub fn collaborators() -> (Arc<TreeMoves>, Arc<TreeEval>) {
    (Arc::new(TreeMoves), Arc::new(TreeEval::default()))
}

/// Root `0` with moves to `A = 1` and `B = 2`.
///
/// ```text
///             root
///        A(4)        B(7)
///    A1(2)  A2(8)  B1(-3)  B2(1)
///    3  5   6  9   1  2    0  -1
/// ```
///
/// Values are from the first player's view. Minimax for the first player:
/// depth 1 picks B (7), depth 2 picks A (2), depth 3 picks A (5).
pub fn sample_tree() -> Tree {
    let mut tree = Tree::new(0.0);
    let a = tree.child(0, 4.0);
    let b = tree.child(0, 7.0);
    let a1 = tree.child(a, 2.0);
    let a2 = tree.child(a, 8.0);
    let b1 = tree.child(b, -3.0);
    let b2 = tree.child(b, 1.0);
    for (parent, leaves) in [(a1, [3.0, 5.0]), (a2, [6.0, 9.0]), (b1, [1.0, 2.0]), (b2, [0.0, -1.0])] {
        for value in leaves {
            tree.child(parent, value);
        }
    }
    tree
}

pub const MOVE_A: usize = 1;
pub const MOVE_B: usize = 2;

/// Root (first player to move) with two replies: one lands in a checkmate of
/// the second player, the other in a stalemate.
///
/// * `1`: the second player is mated. Every reply leaves its king en prise,
///   and the first player can capture the king from node `1`.
/// * `2`: the second player has no moves and is not in check.
pub fn mate_or_stalemate_tree() -> Tree {
    let mut tree = Tree::new(0.0);
    let mated = tree.child(0, 50.0);
    tree.child(0, 80.0);
    tree.set_king_capturer(mated, Side::First);

    let reply = tree.child(mated, 0.0);
    tree.set_king_capturer(reply, Side::First);
    tree
}
