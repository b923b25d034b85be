//! Immutable-feeling search state: pusher cell, sorted box positions, a
//! running Zobrist hash, the move path so far, and expansion into successors.
//!
//! Grounded on the teacher's `game.rs` (`push`/`move_position`/`player_dfs`)
//! for the push mechanics and reachability-walk shape, adapted from the
//! teacher's mutate-in-place `Game` (with checkpoint/undo via `push`/`pull`)
//! to values constructed fresh per successor, since the search driver here
//! enqueues whole states rather than backtracking over one shared board.

use crate::bits::Cell;
use crate::board::{ALL_DIRECTIONS, Board, Direction};
use crate::heuristic::Cost;

/// A search state. `zobrist` is kept as the XOR of a box component and a
/// player component so that successor construction can update either half
/// independently, mirroring the teacher's incremental `z' = z XOR ...`
/// update on push.
#[derive(Debug, Clone)]
pub struct State {
    player: Cell,
    boxes: Vec<Cell>,
    box_term: u64,
    player_term: u64,
    path: Vec<Direction>,
    h: Cost,
}

fn is_box(boxes: &[Cell], cell: Cell) -> Option<usize> {
    boxes.binary_search(&cell).ok()
}

/// Lexicographically smallest cell reachable by the pusher from `start`
/// without moving any box — the canonical representative folded into the
/// player component of the Zobrist key (spec's player-reach normalization).
fn reachable_representative(board: &Board, boxes: &[Cell], start: Cell) -> Cell {
    let mut visited = crate::bits::CellSet::new(board.num_cells());
    let mut stack = vec![start];
    visited.set(start);
    let mut best = start;

    while let Some(c) = stack.pop() {
        if c.0 < best.0 {
            best = c;
        }
        for &dir in &ALL_DIRECTIONS {
            let Some(n) = board.neighbor(c, dir) else {
                continue;
            };
            if board.is_wall(n) || visited.get(n) || is_box(boxes, n).is_some() {
                continue;
            }
            visited.set(n);
            stack.push(n);
        }
    }

    best
}

impl State {
    /// The initial state constructed from a board's starting configuration.
    pub fn initial(board: &Board) -> State {
        let boxes: Vec<Cell> = board.initial_boxes().to_vec();
        let player = board.initial_player();

        let mut box_term = 0u64;
        for &b in &boxes {
            box_term ^= board.zobrist().box_hash(b);
        }
        let representative = reachable_representative(board, &boxes, player);
        let player_term = board.zobrist().player_hash(representative);

        State {
            player,
            boxes,
            box_term,
            player_term,
            path: Vec::new(),
            h: Cost(0),
        }
    }

    pub fn player(&self) -> Cell {
        self.player
    }

    pub fn boxes(&self) -> &[Cell] {
        &self.boxes
    }

    pub fn zobrist(&self) -> u64 {
        self.box_term ^ self.player_term
    }

    pub fn path(&self) -> &[Direction] {
        &self.path
    }

    pub fn h(&self) -> Cost {
        self.h
    }

    pub fn set_h(&mut self, h: Cost) {
        self.h = h;
    }

    pub fn is_solved(&self, board: &Board) -> bool {
        self.boxes.iter().all(|&b| board.is_goal(b))
    }

    /// Four-direction successor generation (spec §4.3): walk onto open
    /// floor, or push a box one cell further in the same direction when the
    /// destination is clear and not a static-deadlock square.
    pub fn expand(&self, board: &Board) -> Vec<State> {
        let mut out = Vec::with_capacity(4);

        for &dir in &ALL_DIRECTIONS {
            let Some(next) = board.neighbor(self.player, dir) else {
                continue;
            };
            if board.is_wall(next) {
                continue;
            }

            if let Some(box_idx) = is_box(&self.boxes, next) {
                let Some(beyond) = board.neighbor(next, dir) else {
                    continue;
                };
                if board.is_wall(beyond) || is_box(&self.boxes, beyond).is_some() {
                    continue;
                }
                if board.is_dead(beyond) && !board.is_goal(beyond) {
                    continue;
                }

                let mut boxes = self.boxes.clone();
                boxes.remove(box_idx);
                let insert_at = boxes.partition_point(|&c| c < beyond);
                boxes.insert(insert_at, beyond);

                let box_term =
                    self.box_term ^ board.zobrist().box_hash(next) ^ board.zobrist().box_hash(beyond);
                let representative = reachable_representative(board, &boxes, next);
                let player_term = board.zobrist().player_hash(representative);

                let mut path = self.path.clone();
                path.push(dir);

                out.push(State {
                    player: next,
                    boxes,
                    box_term,
                    player_term,
                    path,
                    h: Cost(0),
                });
            } else {
                let representative = reachable_representative(board, &self.boxes, next);
                let player_term = board.zobrist().player_hash(representative);

                let mut path = self.path.clone();
                path.push(dir);

                out.push(State {
                    player: next,
                    boxes: self.boxes.clone(),
                    box_term: self.box_term,
                    player_term,
                    path,
                    h: Cost(0),
                });
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn initial_state_matches_board() {
        let board = Board::from_text("#####\n#@$.#\n#####").unwrap();
        let state = State::initial(&board);
        assert_eq!(state.player(), board.initial_player());
        assert_eq!(state.boxes(), board.initial_boxes());
    }

    #[test]
    fn pushing_box_onto_goal_solves() {
        let board = Board::from_text("#####\n#@$.#\n#####").unwrap();
        let state = State::initial(&board);
        let successors = state.expand(&board);
        let solved = successors.iter().find(|s| s.is_solved(&board));
        assert!(solved.is_some());
        assert_eq!(solved.unwrap().path(), &[Direction::Right]);
    }

    #[test]
    fn boxes_stay_sorted_after_push() {
        let board = Board::from_text("########\n#@$ $..#\n########").unwrap();
        let state = State::initial(&board);
        for s in state.expand(&board) {
            let mut sorted = s.boxes().to_vec();
            sorted.sort();
            assert_eq!(s.boxes(), sorted.as_slice());
        }
    }

    #[test]
    fn walking_without_pushing_leaves_boxes_unchanged() {
        // The box sits far enough from the pusher that every legal move
        // from the initial state is a walk onto open floor, never a push.
        let board = Board::from_text("#####\n#@  #\n#  $#\n#  .#\n#####").unwrap();
        let state = State::initial(&board);
        let successors = state.expand(&board);
        assert!(!successors.is_empty());
        for s in successors {
            assert_eq!(s.boxes(), state.boxes());
        }
    }

    #[test]
    fn walking_back_and_forth_restores_zobrist() {
        let board = Board::from_text("#####\n#@  #\n#  .#\n#$  #\n#####").unwrap();
        let initial = State::initial(&board);
        let stepped_right = initial
            .expand(&board)
            .into_iter()
            .find(|s| s.path() == [Direction::Right])
            .expect("right is not a wall");
        let back = stepped_right
            .expand(&board)
            .into_iter()
            .find(|s| s.path() == [Direction::Right, Direction::Left])
            .expect("left is not a wall");
        assert_eq!(back.zobrist(), initial.zobrist());
    }

    #[test]
    fn push_into_wall_is_not_a_successor() {
        // Box at row1,col3 has a wall directly to its right; no successor
        // may place a box on that wall cell.
        let board = Board::from_text("#####\n# @$#\n#.  #\n#####").unwrap();
        let state = State::initial(&board);
        let successors = state.expand(&board);
        for s in &successors {
            for &b in s.boxes() {
                assert!(!board.is_wall(b));
            }
        }
    }
}
