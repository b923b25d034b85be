//! Frozen-box (simple deadlock) detection, ported from the teacher's
//! `deadlocks.rs` almost verbatim: a box is frozen if it is blocked on both
//! its horizontal and vertical axes, where "blocked" on an axis means both
//! neighbors are either a wall, a dead square, or another frozen box — with
//! the mutual-recursion among candidate boxes broken by the
//! find-candidates/check-unfrozen fixed-point loop below.

use arrayvec::ArrayVec;

use crate::bits::{BoxIndex, Bitvector, Cell};
use crate::board::{ALL_DIRECTIONS, Board, Direction};

/// Lookup a box by its cell in a sorted box list, the same list `State`
/// keeps and indexes by `BoxIndex`.
fn box_index_at(boxes: &[Cell], cell: Cell) -> Option<BoxIndex> {
    boxes.binary_search(&cell).ok().map(|i| BoxIndex(i as u32))
}

/// Full frozen-box computation from scratch, used when constructing a
/// `State`'s initial position.
pub fn compute_frozen_boxes(board: &Board, boxes: &[Cell]) -> Bitvector {
    let mut result = Bitvector::new();
    for i in 0..boxes.len() {
        let box_idx = BoxIndex(i as u32);
        if !result.contains(box_idx) {
            let frozen = compute_new_frozen_boxes(result, board, boxes, box_idx);
            result = result.union(&frozen);
        }
    }
    result
}

/// Incrementally recompute which boxes are newly frozen after `box_idx` has
/// just been pushed to its current location.
pub fn compute_new_frozen_boxes(
    frozen: Bitvector,
    board: &Board,
    boxes: &[Cell],
    box_idx: BoxIndex,
) -> Bitvector {
    debug_assert!(!frozen.contains(box_idx));

    let candidates = find_candidates(frozen, board, boxes, box_idx);
    let mut candidates_frozen = candidates;
    let mut to_check: ArrayVec<BoxIndex, { crate::bits::MAX_BOXES }> = ArrayVec::new();
    for idx in candidates.iter() {
        to_check.push(idx);
    }

    while let Some(box_idx) = to_check.pop() {
        let pos = boxes[box_idx.0 as usize];
        if check_unfrozen(board, boxes, pos, &candidates, &candidates_frozen) {
            candidates_frozen.remove(box_idx);

            for &dir in &ALL_DIRECTIONS {
                if let Some(next_pos) = board.neighbor(pos, dir) {
                    if let Some(next_box_idx) = box_index_at(boxes, next_pos) {
                        if candidates_frozen.contains(next_box_idx) {
                            to_check.push(next_box_idx);
                        }
                    }
                }
            }
        }
    }

    candidates_frozen
}

fn find_candidates(frozen: Bitvector, board: &Board, boxes: &[Cell], box_idx: BoxIndex) -> Bitvector {
    let mut candidates = Bitvector::new();
    let mut stack: ArrayVec<BoxIndex, { crate::bits::MAX_BOXES }> = ArrayVec::new();

    candidates.add(box_idx);
    stack.push(box_idx);

    while let Some(box_idx) = stack.pop() {
        let pos = boxes[box_idx.0 as usize];
        for &dir in &ALL_DIRECTIONS {
            if let Some(next_pos) = board.neighbor(pos, dir) {
                if let Some(next_box_idx) = box_index_at(boxes, next_pos) {
                    if !candidates.contains(next_box_idx) && !frozen.contains(next_box_idx) {
                        candidates.add(next_box_idx);
                        stack.push(next_box_idx);
                    }
                }
            }
        }
    }

    candidates
}

fn check_unfrozen_dir(
    board: &Board,
    boxes: &[Cell],
    pos: Cell,
    dir: Direction,
    candidates: &Bitvector,
    candidates_frozen: &Bitvector,
) -> bool {
    match board.neighbor(pos, dir) {
        Some(next_pos) => match box_index_at(boxes, next_pos) {
            Some(next_box_idx) => {
                if candidates.contains(next_box_idx) {
                    !candidates_frozen.contains(next_box_idx)
                } else {
                    false
                }
            }
            None => !board.is_wall(next_pos),
        },
        None => true,
    }
}

fn check_dead_square_dir(board: &Board, pos: Cell, dir: Direction) -> bool {
    match board.neighbor(pos, dir) {
        Some(next_pos) => board.is_dead(next_pos),
        None => true,
    }
}

fn check_unfrozen_vertical(
    board: &Board,
    boxes: &[Cell],
    pos: Cell,
    candidates: &Bitvector,
    candidates_frozen: &Bitvector,
) -> bool {
    check_unfrozen_dir(board, boxes, pos, Direction::Up, candidates, candidates_frozen)
        && check_unfrozen_dir(board, boxes, pos, Direction::Down, candidates, candidates_frozen)
        && !(check_dead_square_dir(board, pos, Direction::Up)
            && check_dead_square_dir(board, pos, Direction::Down))
}

fn check_unfrozen_horizontal(
    board: &Board,
    boxes: &[Cell],
    pos: Cell,
    candidates: &Bitvector,
    candidates_frozen: &Bitvector,
) -> bool {
    check_unfrozen_dir(board, boxes, pos, Direction::Left, candidates, candidates_frozen)
        && check_unfrozen_dir(board, boxes, pos, Direction::Right, candidates, candidates_frozen)
        && !(check_dead_square_dir(board, pos, Direction::Left)
            && check_dead_square_dir(board, pos, Direction::Right))
}

fn check_unfrozen(
    board: &Board,
    boxes: &[Cell],
    pos: Cell,
    candidates: &Bitvector,
    candidates_frozen: &Bitvector,
) -> bool {
    check_unfrozen_horizontal(board, boxes, pos, candidates, candidates_frozen)
        || check_unfrozen_vertical(board, boxes, pos, candidates, candidates_frozen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn box_against_two_walls_in_corner_is_frozen() {
        // Box at row1,col1 has a wall directly above and to its left — a
        // true corner, blocked on both axes regardless of goals.
        let board = Board::from_text("#####\n#$ .#\n# @ #\n#####").unwrap();
        let boxes = vec![Cell(1 * 5 + 1)];
        let frozen = compute_frozen_boxes(&board, &boxes);
        assert!(frozen.contains(BoxIndex(0)));
    }

    #[test]
    fn box_on_open_floor_is_not_frozen() {
        let board =
            Board::from_text("######\n#    #\n# @$.#\n#    #\n######").unwrap();
        let boxes = vec![Cell(2 * 6 + 3)];
        let frozen = compute_frozen_boxes(&board, &boxes);
        assert!(!frozen.contains(BoxIndex(0)));
    }

    #[test]
    fn two_adjacent_boxes_against_wall_freeze_together() {
        // Two boxes side by side against the top wall, with dead squares
        // above on both sides, are mutually frozen even though neither is
        // frozen on its own.
        let board = Board::from_text("######\n#@$$.#\n#   .#\n######").unwrap();
        let boxes = vec![Cell(1 * 6 + 2), Cell(1 * 6 + 3)];
        let frozen = compute_frozen_boxes(&board, &boxes);
        // At least one of the two boxes sits on a dead, wall-flanked square
        // and should be reported frozen together with its neighbor.
        assert!(frozen.contains(BoxIndex(0)) || frozen.contains(BoxIndex(1)));
    }
}
