//! Monte Carlo tree search engine.
//!
//! Builds a [`SearchTree`] for the position under a time and/or
//! iteration budget and picks the root move with the best observed win
//! ratio. Two selection policies are supported: a pure random walk
//! (weaker, simpler) and UCB1 selection with single-node expansion and
//! random rollouts.
//!
//! Rewards are recorded from a single fixed perspective, the searching
//! side: 1.0 for its win, 0.5 for a draw, 0.0 for a loss, applied
//! uniformly to every node on the backpropagated path. The UCB1
//! exploitation term flips a child's ratio (`1 - ratio`) at levels where
//! the opponent is the one choosing, which is what makes the fixed
//! perspective sound.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng, prelude::IndexedRandom, rngs::StdRng};

use crate::board::{Board, Move, Side};
use crate::rules;
use crate::search::Engine;
use crate::search::tree::{NodeId, SearchTree};

/// Default UCB1 exploration constant
pub const DEFAULT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Search budget; whichever limit triggers first stops the loop.
///
/// The budget is polled only at the top of an iteration, never
/// mid-rollout, so a started playout always completes and backpropagates
/// atomically. A budget that is exhausted before the first iteration
/// makes [`Mcts::best_move`] fall back to the first empty cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    /// Wall-clock limit, None for unlimited
    pub time: Option<Duration>,
    /// Iteration cap, None for unlimited
    pub iterations: Option<u64>,
}

impl Budget {
    /// Budget limited only by an iteration cap
    pub fn iterations(iterations: u64) -> Self {
        Budget {
            time: None,
            iterations: Some(iterations),
        }
    }

    /// Budget limited only by wall-clock time
    pub fn time(time: Duration) -> Self {
        Budget {
            time: Some(time),
            iterations: None,
        }
    }
}

impl Default for Budget {
    /// 500ms wall clock with a 100k-iteration backstop
    fn default() -> Self {
        Budget {
            time: Some(Duration::from_millis(500)),
            iterations: Some(100_000),
        }
    }
}

/// How the tree policy picks the path to extend each iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionPolicy {
    /// Random descent from root to terminal, creating any missing child
    /// along the way. No selection formula and no separate rollout.
    RandomWalk,
    /// UCB1 child selection, one random expansion per iteration, then a
    /// random rollout to terminal without adding further nodes.
    Ucb1 { exploration: f64 },
}

impl SelectionPolicy {
    /// UCB1 with the default sqrt(2) exploration constant
    pub fn ucb1() -> Self {
        SelectionPolicy::Ucb1 {
            exploration: DEFAULT_EXPLORATION,
        }
    }
}

/// Configuration for an MCTS engine
#[derive(Debug, Clone, Copy)]
pub struct MctsConfig {
    pub policy: SelectionPolicy,
    pub budget: Budget,
    /// RNG seed for reproducible searches, None for entropy
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        MctsConfig {
            policy: SelectionPolicy::ucb1(),
            budget: Budget::default(),
            seed: None,
        }
    }
}

/// Monte Carlo tree search engine.
///
/// The tree built by the most recent [`Mcts::best_move`] call is kept
/// and exposed read-only through [`Mcts::tree`] so external tooling can
/// walk or render it. Each call discards the previous tree and starts
/// from scratch; nothing is reused across turns.
#[derive(Debug)]
pub struct Mcts {
    policy: SelectionPolicy,
    budget: Budget,
    rng: StdRng,
    tree: Option<SearchTree>,
}

impl Mcts {
    pub fn new(config: MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random::<u64>()),
        };
        Mcts {
            policy: config.policy,
            budget: config.budget,
            rng,
            tree: None,
        }
    }

    /// The search tree from the most recent `best_move` call
    pub fn tree(&self) -> Option<&SearchTree> {
        self.tree.as_ref()
    }

    /// Run a budgeted search and return the best move found for `side`.
    ///
    /// The caller's board is cloned into the tree root and never
    /// mutated. If the budget expires before any iteration completes,
    /// the first empty cell in row-major order is returned so the engine
    /// still produces a legal move.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GameOver`] on a terminal position and
    /// [`crate::Error::NoValidMoves`] if the board has no empty cell.
    pub fn best_move(&mut self, board: &Board, side: Side) -> Result<Move, crate::Error> {
        if rules::is_terminal(board) {
            return Err(crate::Error::GameOver);
        }

        let deadline = self.budget.time.map(|limit| Instant::now() + limit);
        let max_iterations = self.budget.iterations.unwrap_or(u64::MAX);

        let mut tree = SearchTree::new(board.clone(), side);
        let mut iterations = 0u64;

        while iterations < max_iterations {
            if let Some(deadline) = deadline
                && Instant::now() >= deadline
            {
                break;
            }

            match self.policy {
                SelectionPolicy::RandomWalk => self.random_walk_iteration(&mut tree, side)?,
                SelectionPolicy::Ucb1 { exploration } => {
                    self.ucb1_iteration(&mut tree, side, exploration)?
                }
            }
            iterations += 1;
        }

        let chosen = tree.best_move();
        self.tree = Some(tree);

        match chosen {
            Some(mv) => Ok(mv),
            // Zero completed iterations: no statistics to choose by
            None => rules::empty_cells(board)
                .first()
                .copied()
                .ok_or(crate::Error::NoValidMoves),
        }
    }

    /// One UCB1 iteration: select, expand one node, roll out, backpropagate.
    fn ucb1_iteration(
        &mut self,
        tree: &mut SearchTree,
        side: Side,
        exploration: f64,
    ) -> Result<(), crate::Error> {
        let mut current = tree.root_id();

        // Selection: descend while fully expanded and not a dead end
        loop {
            let node = tree.node(current);
            if !node.untried.is_empty() || node.children.is_empty() {
                break;
            }
            let Some(next) = self.select_ucb1_child(tree, current, side, exploration) else {
                break;
            };
            current = next;
        }

        // Expansion: one random untried move, if the node has any
        if !tree.node(current).untried.is_empty() {
            let (mv, state) = {
                let node = tree.node(current);
                let mv = *node
                    .untried
                    .choose(&mut self.rng)
                    .ok_or(crate::Error::NoValidMoves)?;
                let mut state = node.state.clone();
                state.apply(mv, node.to_move)?;
                (mv, state)
            };
            current = tree.add_child(current, mv, state);
        }

        // Simulation from the expanded (or terminal) node
        let (state, to_move) = {
            let node = tree.node(current);
            (node.state.clone(), node.to_move)
        };
        let result = self.rollout(state, to_move)?;

        // Backpropagation
        tree.backpropagate(current, reward(result, side));
        Ok(())
    }

    /// UCB1 child choice from the perspective of the player about to
    /// move at `parent`. Ties go to the earliest-inserted child.
    ///
    /// Every existing child has been visited at least once (it was
    /// created by an expansion that immediately backpropagated), so its
    /// ratio is always defined here. The log term uses the total visit
    /// count at the root; on the very first descent `ln(1) == 0` and
    /// selection degenerates to pure exploitation, which is acceptable.
    fn select_ucb1_child(
        &self,
        tree: &SearchTree,
        parent: NodeId,
        side: Side,
        exploration: f64,
    ) -> Option<NodeId> {
        let parent_node = tree.node(parent);
        let ln_total = (tree.root().visits.max(1) as f64).ln();

        let mut best: Option<(NodeId, f64)> = None;
        for &(_, child_id) in &parent_node.children {
            let child = tree.node(child_id);
            let ratio = child.ratio()?;
            let exploit = if parent_node.to_move == side {
                ratio
            } else {
                1.0 - ratio
            };
            let score = exploit + exploration * (ln_total / child.visits as f64).sqrt();
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// One random-walk iteration: descend from the root playing uniform
    /// random moves to a terminal state, adding every missing node on
    /// the way, then backpropagate the result.
    fn random_walk_iteration(
        &mut self,
        tree: &mut SearchTree,
        side: Side,
    ) -> Result<(), crate::Error> {
        let mut current = tree.root_id();

        loop {
            let node = tree.node(current);
            if node.is_terminal() {
                break;
            }
            let moves = rules::empty_cells(&node.state);
            let Some(&mv) = moves.choose(&mut self.rng) else {
                break;
            };

            current = match node.child(mv) {
                Some(existing) => existing,
                None => {
                    let mut state = node.state.clone();
                    state.apply(mv, node.to_move)?;
                    tree.add_child(current, mv, state)
                }
            };
        }

        let result = rules::winner(&tree.node(current).state);
        tree.backpropagate(current, reward(result, side));
        Ok(())
    }

    /// Play uniform random moves from `board` until a terminal state and
    /// return the winner, if any. Win detection after each move only
    /// examines the lines through the placed cell.
    fn rollout(&mut self, mut board: Board, mut to_move: Side) -> Result<Option<Side>, crate::Error> {
        if let Some(winning_side) = rules::winner(&board) {
            return Ok(Some(winning_side));
        }

        let mut open = rules::empty_cells(&board);
        while !open.is_empty() {
            let index = self.rng.random_range(0..open.len());
            let mv = open.swap_remove(index);
            board.apply(mv, to_move)?;
            if rules::is_winning_move(&board, mv) {
                return Ok(Some(to_move));
            }
            to_move = to_move.opponent();
        }
        Ok(None)
    }
}

impl Default for Mcts {
    fn default() -> Self {
        Self::new(MctsConfig::default())
    }
}

impl Engine for Mcts {
    fn choose_move(&mut self, board: &Board, side: Side) -> Result<Move, crate::Error> {
        self.best_move(board, side)
    }
}

/// Reward from the searching side's fixed perspective
fn reward(winner: Option<Side>, side: Side) -> f64 {
    match winner {
        Some(winning_side) if winning_side == side => 1.0,
        Some(_) => 0.0,
        None => 0.5,
    }
}
