//! `h(S) = assignment_cost + frozen_penalty + room_penalty`, the unassigned-
//! greedy Manhattan lower bound plus the two dynamic-deadlock penalties.
//!
//! Grounded on the teacher's `heuristic.rs` `Cost` newtype and
//! `Cost::UNSOLVABLE` sentinel pattern, but not its push-distance BFS tables
//! or Hungarian/greedy matching — exact matching is explicitly not required,
//! so the scoring here is the much simpler unassigned sum of nearest-goal
//! distances.

use std::collections::HashMap;

use crate::bits::Cell;
use crate::board::Board;
use crate::frozen;
use crate::state::State;

/// Bound on the memoization cache; once full, new entries simply stop being
/// cached rather than evicting anything — a single-run CLI has no need for
/// LRU bookkeeping.
pub const CACHE_CAPACITY: usize = 1 << 20;

/// Default multiplier on the Manhattan assignment sum, overridable from the
/// CLI (`--heuristic-weight`) for experimentation, mirroring the teacher's
/// `SolverOpts`-exposed solver knobs. The frozen-box term has no analogous
/// weight: it is a hard deadlock signal, not an additive score, so scaling it
/// would be meaningless.
pub const DEFAULT_MANHATTAN_WEIGHT: u32 = 1;

/// Estimated cost returned by heuristic computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cost(pub u32);

impl Cost {
    pub const INFINITE: Cost = Cost(u32::MAX);

    pub fn is_infinite(self) -> bool {
        self == Cost::INFINITE
    }
}

fn manhattan(a: Cell, b: Cell, width: usize) -> u32 {
    let (ar, ac) = ((a.0 as usize) / width, (a.0 as usize) % width);
    let (br, bc) = ((b.0 as usize) / width, (b.0 as usize) % width);
    (ar.abs_diff(br) + ac.abs_diff(bc)) as u32
}

/// Sum, over each box, of its distance to the nearest goal. Not an optimal
/// assignment — boxes may share a "nearest" goal — but a valid lower bound
/// and cheap to compute.
fn assignment_cost(board: &Board, boxes: &[Cell], weight: u32) -> u32 {
    let mut total = 0u32;
    for &b in boxes {
        let nearest = board
            .goal_list()
            .iter()
            .map(|&g| manhattan(b, g, board.width()))
            .min()
            .unwrap_or(0);
        total += nearest;
    }
    total * weight
}

/// `None` signals a hard deadlock: some box is frozen (immovable on both
/// axes) and not on a goal. A box frozen while already on a goal is
/// satisfied, not deadlocked, and contributes nothing.
fn frozen_penalty(board: &Board, boxes: &[Cell]) -> Option<()> {
    let frozen = frozen::compute_frozen_boxes(board, boxes);
    for idx in frozen.iter() {
        let cell = boxes[idx.0 as usize];
        if !board.is_goal(cell) {
            return None;
        }
    }
    Some(())
}

/// `None` signals a room overload: some room holds more boxes than it has
/// goals, which can never be resolved, so the caller should treat this as
/// `Cost::INFINITE`.
fn room_penalty(board: &Board, boxes: &[Cell]) -> Option<()> {
    let mut counts: HashMap<u32, u32> = HashMap::new();
    for &b in boxes {
        if let Some(room) = board.room_of(b) {
            *counts.entry(room).or_insert(0) += 1;
        }
    }
    for (room, count) in counts {
        if count > board.room_goal_count(room) {
            return None;
        }
    }
    Some(())
}

/// Bounded memoization cache keyed by a state's Zobrist hash.
pub struct HeuristicCache {
    cache: HashMap<u64, Cost>,
    weight: u32,
}

impl HeuristicCache {
    pub fn new() -> Self {
        Self::with_weight(DEFAULT_MANHATTAN_WEIGHT)
    }

    pub fn with_weight(weight: u32) -> Self {
        HeuristicCache {
            cache: HashMap::new(),
            weight,
        }
    }

    pub fn compute(&mut self, board: &Board, state: &State) -> Cost {
        if let Some(&cost) = self.cache.get(&state.zobrist()) {
            return cost;
        }

        let cost = Self::compute_uncached(board, state, self.weight);

        if self.cache.len() < CACHE_CAPACITY {
            self.cache.insert(state.zobrist(), cost);
        }
        cost
    }

    fn compute_uncached(board: &Board, state: &State, weight: u32) -> Cost {
        if room_penalty(board, state.boxes()).is_none() {
            return Cost::INFINITE;
        }
        if frozen_penalty(board, state.boxes()).is_none() {
            return Cost::INFINITE;
        }
        Cost(assignment_cost(board, state.boxes(), weight))
    }
}

impl Default for HeuristicCache {
    fn default() -> Self {
        Self::new()
    }
}
