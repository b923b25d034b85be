//! Greedy best-first search driver (spec §4.6): one frontier ordered by
//! `(h, path length, insertion sequence)`, one visited set of Zobrist keys.
//!
//! Grounded on the teacher's `solver.rs::Searcher::expand_node` control flow
//! (pop, check closed, expand, filter deadlocks, score, push) and
//! `pqueue.rs`'s bucketed-priority-queue concept — but reimplemented over a
//! `std::collections::BinaryHeap` rather than the teacher's fixed 4096-bucket
//! array, since the heuristic here can exceed that range on a 10,000-cell
//! board and a fixed bucket count would silently truncate or panic. The
//! teacher's bidirectional forward/reverse search and PI-corral pruning
//! (`corral.rs`) have no counterpart in this single-directional driver and
//! are not carried forward.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::time::Instant;

use tracing::{debug, info};

use crate::board::{Board, Direction};
use crate::heuristic::HeuristicCache;
use crate::state::State;

/// Default frontier-pop cap applied by the CLI shell when `--max-nodes` is
/// not given, mirroring the teacher's `max_nodes_explored` default — the
/// library driver itself imposes no cap unless `SolveLimits.max_nodes` is
/// `Some`.
pub const DEFAULT_MAX_NODES: u64 = 10_000_000;

/// Outcome of a solve attempt. `NoSolution` and `Cancelled` are both
/// ordinary, successful returns (spec §7): the caller cannot and need not
/// distinguish them from the emitted output alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Solved(Vec<Direction>),
    NoSolution,
    Cancelled,
}

/// Optional resource limits the driver checks once per frontier pop (not
/// per successor, to keep the check cheap).
#[derive(Default)]
pub struct SolveLimits<'a> {
    pub max_nodes: Option<u64>,
    pub deadline: Option<Instant>,
    pub poll: Option<&'a dyn Fn() -> bool>,
    /// Multiplier on the Manhattan assignment term of the heuristic.
    /// `None` uses `heuristic::DEFAULT_MANHATTAN_WEIGHT`.
    pub heuristic_weight: Option<u32>,
}

struct FrontierEntry {
    h: u32,
    path_len: usize,
    sequence: u64,
    state: State,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        (self.h, self.path_len, self.sequence) == (other.h, other.path_len, other.sequence)
    }
}
impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // BinaryHeap is a max-heap; reverse so the smallest (h, path_len,
        // sequence) triple is popped first, matching spec's ordering.
        (self.h, self.path_len, self.sequence).cmp(&(other.h, other.path_len, other.sequence))
    }
}

pub fn solve(board: &Board, limits: &SolveLimits) -> SolveOutcome {
    let mut cache = match limits.heuristic_weight {
        Some(weight) => HeuristicCache::with_weight(weight),
        None => HeuristicCache::new(),
    };
    let mut frontier: BinaryHeap<Reverse<FrontierEntry>> = BinaryHeap::new();
    let mut visited: HashSet<u64> = HashSet::new();
    let mut sequence = 0u64;
    let mut nodes_popped = 0u64;

    let mut initial = State::initial(board);
    let h0 = cache.compute(board, &initial);
    if h0.is_infinite() {
        debug!("initial state is a hard deadlock, no solution possible");
        return SolveOutcome::NoSolution;
    }
    initial.set_h(h0);
    frontier.push(Reverse(FrontierEntry {
        h: h0.0,
        path_len: initial.path().len(),
        sequence,
        state: initial,
    }));
    sequence += 1;

    while let Some(Reverse(entry)) = frontier.pop() {
        if let Some(poll) = limits.poll {
            if poll() {
                info!(nodes_popped, "cancelled via poll callback");
                return SolveOutcome::Cancelled;
            }
        }
        if let Some(deadline) = limits.deadline {
            if Instant::now() >= deadline {
                info!(nodes_popped, "cancelled, deadline reached");
                return SolveOutcome::Cancelled;
            }
        }
        if let Some(max_nodes) = limits.max_nodes {
            if nodes_popped >= max_nodes {
                info!(nodes_popped, max_nodes, "cancelled, node cap reached");
                return SolveOutcome::Cancelled;
            }
        }
        nodes_popped += 1;

        let state = entry.state;
        if state.is_solved(board) {
            info!(nodes_popped, path_len = state.path().len(), "solution found");
            return SolveOutcome::Solved(state.path().to_vec());
        }
        if visited.contains(&state.zobrist()) {
            debug!(nodes_popped, "skipping already-visited state");
            continue;
        }
        visited.insert(state.zobrist());

        for mut successor in state.expand(board) {
            if visited.contains(&successor.zobrist()) {
                continue;
            }
            let h = cache.compute(board, &successor);
            if h.is_infinite() {
                debug!(nodes_popped, "pruning hard-deadlock successor");
                continue;
            }
            successor.set_h(h);
            frontier.push(Reverse(FrontierEntry {
                h: h.0,
                path_len: successor.path().len(),
                sequence,
                state: successor,
            }));
            sequence += 1;
        }
    }

    info!(nodes_popped, "frontier exhausted, no solution");
    SolveOutcome::NoSolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn solves_single_push() {
        let board = Board::from_text("#####\n#@$.#\n#####").unwrap();
        let outcome = solve(&board, &SolveLimits::default());
        assert_eq!(outcome, SolveOutcome::Solved(vec![Direction::Right]));
    }

    #[test]
    fn solves_walk_then_push() {
        let board = Board::from_text("######\n#@ $.#\n######").unwrap();
        let outcome = solve(&board, &SolveLimits::default());
        assert_eq!(
            outcome,
            SolveOutcome::Solved(vec![Direction::Right, Direction::Right])
        );
    }

    #[test]
    fn already_solved_returns_empty_path() {
        let board = Board::from_text("####\n#@*#\n####").unwrap();
        let outcome = solve(&board, &SolveLimits::default());
        assert_eq!(outcome, SolveOutcome::Solved(vec![]));
    }

    #[test]
    fn unsolvable_corner_returns_no_solution() {
        let board = Board::from_text("#####\n#$ .#\n# @ #\n#####").unwrap();
        let outcome = solve(&board, &SolveLimits::default());
        assert_eq!(outcome, SolveOutcome::NoSolution);
    }

    #[test]
    fn node_cap_yields_cancelled() {
        let board = Board::from_text(
            "########\n\
             #@     #\n\
             #  $   #\n\
             #    . #\n\
             #      #\n\
             ########",
        )
        .unwrap();
        let limits = SolveLimits {
            max_nodes: Some(0),
            ..Default::default()
        };
        let outcome = solve(&board, &limits);
        assert_eq!(outcome, SolveOutcome::Cancelled);
    }
}
