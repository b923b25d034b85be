//! Parsing and preprocessing: text → `Board`, plus the static-deadlock mask,
//! room partition, and Zobrist table derived from it.

use std::rc::Rc;

use tracing::{debug, info};

use crate::bits::{Cell, CellSet};
use crate::error::ParseError;
use crate::zobrist::Zobrist;

/// Maximum grid area the parser will accept.
pub const MAX_CELLS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Lowercase move character.
    pub fn to_char(self) -> char {
        match self {
            Direction::Up => 'u',
            Direction::Down => 'd',
            Direction::Left => 'l',
            Direction::Right => 'r',
        }
    }
}

/// Static, preprocessed puzzle geometry.
pub struct Board {
    width: usize,
    height: usize,
    walls: CellSet,
    goals: CellSet,
    goal_list: Vec<Cell>,
    dead: CellSet,
    room_of: Vec<Option<u32>>,
    room_goal_count: Vec<u32>,
    // Held behind `Rc` so that future multi-board batch tooling could share
    // one table without recomputing it per board, mirroring the teacher's
    // `Rc<Zobrist>` sharing pattern.
    zobrist: Rc<Zobrist>,
    initial_player: Cell,
    initial_boxes: Vec<Cell>,
}

impl Board {
    /// Parse a puzzle in standard Sokoban notation.
    ///
    /// Ragged lines are right-padded with floor to the width of the longest
    /// line.
    pub fn from_text(text: &str) -> Result<Board, ParseError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return Err(ParseError::EmptyGrid);
        }

        let height = lines.len();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if width == 0 {
            return Err(ParseError::EmptyGrid);
        }
        if width * height > MAX_CELLS {
            return Err(ParseError::GridTooLarge { width, height });
        }

        let num_cells = width * height;
        let mut walls = CellSet::new(num_cells);
        let mut goals = CellSet::new(num_cells);
        let mut goal_list = Vec::new();
        let mut boxes = Vec::new();
        let mut player: Option<Cell> = None;

        for (row, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            for col in 0..width {
                let ch = chars.get(col).copied().unwrap_or(' ');
                let cell = Cell((row * width + col) as u32);
                match ch {
                    '#' => walls.set(cell),
                    ' ' => {}
                    '.' => {
                        goals.set(cell);
                        goal_list.push(cell);
                    }
                    '$' => boxes.push(cell),
                    '*' => {
                        goals.set(cell);
                        goal_list.push(cell);
                        boxes.push(cell);
                    }
                    '@' => {
                        if player.is_some() {
                            return Err(ParseError::MultiplePlayers);
                        }
                        player = Some(cell);
                    }
                    '+' => {
                        if player.is_some() {
                            return Err(ParseError::MultiplePlayers);
                        }
                        player = Some(cell);
                        goals.set(cell);
                        goal_list.push(cell);
                    }
                    other => {
                        return Err(ParseError::UnrecognizedChar {
                            ch: other,
                            row,
                            col,
                        });
                    }
                }
            }
        }

        let player = player.ok_or(ParseError::NoPlayer)?;

        if boxes.len() != goal_list.len() {
            return Err(ParseError::BoxGoalMismatch {
                boxes: boxes.len(),
                goals: goal_list.len(),
            });
        }
        if boxes.len() > crate::bits::MAX_BOXES {
            return Err(ParseError::TooManyBoxes { count: boxes.len() });
        }

        boxes.sort();

        let mut board = Board {
            width,
            height,
            walls,
            goals,
            goal_list,
            dead: CellSet::new(num_cells),
            room_of: vec![None; num_cells],
            room_goal_count: Vec::new(),
            zobrist: Rc::new(Zobrist::new(num_cells)),
            initial_player: player,
            initial_boxes: boxes,
        };
        board.compute_dead_squares();
        board.compute_rooms();
        info!(
            width,
            height,
            boxes = board.initial_boxes.len(),
            rooms = board.room_goal_count.len(),
            "parsed and preprocessed board"
        );
        Ok(board)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_cells(&self) -> usize {
        self.width * self.height
    }

    pub fn is_wall(&self, cell: Cell) -> bool {
        self.walls.get(cell)
    }

    pub fn is_goal(&self, cell: Cell) -> bool {
        self.goals.get(cell)
    }

    pub fn is_dead(&self, cell: Cell) -> bool {
        self.dead.get(cell)
    }

    pub fn goal_list(&self) -> &[Cell] {
        &self.goal_list
    }

    pub fn room_of(&self, cell: Cell) -> Option<u32> {
        self.room_of[cell.0 as usize]
    }

    pub fn room_goal_count(&self, room: u32) -> u32 {
        self.room_goal_count[room as usize]
    }

    pub fn zobrist(&self) -> &Zobrist {
        &self.zobrist
    }

    pub fn initial_player(&self) -> Cell {
        self.initial_player
    }

    pub fn initial_boxes(&self) -> &[Cell] {
        &self.initial_boxes
    }

    /// Neighbor of `cell` one step in `dir`, or `None` at the grid edge.
    pub fn neighbor(&self, cell: Cell, dir: Direction) -> Option<Cell> {
        let row = (cell.0 as usize) / self.width;
        let col = (cell.0 as usize) % self.width;
        let (row, col) = match dir {
            Direction::Up => (row.checked_sub(1)?, col),
            Direction::Down => {
                let r = row + 1;
                if r >= self.height {
                    return None;
                }
                (r, col)
            }
            Direction::Left => (row, col.checked_sub(1)?),
            Direction::Right => {
                let c = col + 1;
                if c >= self.width {
                    return None;
                }
                (row, c)
            }
        };
        Some(Cell((row * self.width + col) as u32))
    }

    /// Reverse-pull flood fill to a fixed point: a cell is alive if a box
    /// there can eventually be pushed to some goal. Anything left over (and
    /// not itself a wall or goal) is `dead`.
    fn compute_dead_squares(&mut self) {
        let mut alive = CellSet::new(self.num_cells());
        let mut stack: Vec<Cell> = Vec::new();
        for &g in &self.goal_list {
            alive.set(g);
            stack.push(g);
        }

        while let Some(c) = stack.pop() {
            for &dir in &ALL_DIRECTIONS {
                let Some(n) = self.neighbor(c, dir) else {
                    continue;
                };
                if self.walls.get(n) || alive.get(n) {
                    continue;
                }
                // Box sitting at `n` could be pushed to `c` (direction
                // `dir.opposite()`) iff the pusher has room to stand behind
                // it, at one further step in `dir`.
                let Some(player_pos) = self.neighbor(n, dir) else {
                    continue;
                };
                if self.walls.get(player_pos) {
                    continue;
                }
                alive.set(n);
                stack.push(n);
            }
        }

        for i in 0..self.num_cells() {
            let cell = Cell(i as u32);
            if !self.walls.get(cell) && !self.goals.get(cell) && !alive.get(cell) {
                self.dead.set(cell);
            }
        }
        debug!(dead = self.dead.iter().count(), "computed static deadlock mask");
    }

    /// A non-wall cell whose two opposite neighbors (on either axis) are
    /// both walls (or off the grid) — a one-wide corridor cell.
    fn is_corridor(&self, cell: Cell) -> bool {
        let blocked = |c: Cell, dir: Direction| -> bool {
            match self.neighbor(c, dir) {
                Some(n) => self.walls.get(n),
                None => true,
            }
        };
        (blocked(cell, Direction::Up) && blocked(cell, Direction::Down))
            || (blocked(cell, Direction::Left) && blocked(cell, Direction::Right))
    }

    /// Connected components under 4-adjacency, with corridor cells excluded
    /// entirely from room accounting (`room_of` stays `None` for them) —
    /// per §3's data model, a narrow connecting passage is not a
    /// capacity-bounded room at all, so it must not count against, or
    /// receive, a `room_goal_count`.
    fn compute_rooms(&mut self) {
        let n = self.num_cells();
        let corridor: Vec<bool> = (0..n).map(|i| self.is_corridor(Cell(i as u32))).collect();

        for start in 0..n {
            let start_cell = Cell(start as u32);
            if self.walls.get(start_cell) || corridor[start] || self.room_of[start].is_some() {
                continue;
            }

            let room_id = self.room_goal_count.len() as u32;
            self.room_goal_count.push(0);
            self.room_of[start] = Some(room_id);
            if self.goals.get(start_cell) {
                self.room_goal_count[room_id as usize] += 1;
            }

            let mut stack = vec![start_cell];
            while let Some(c) = stack.pop() {
                for &dir in &ALL_DIRECTIONS {
                    let Some(nb) = self.neighbor(c, dir) else {
                        continue;
                    };
                    let nbi = nb.0 as usize;
                    if self.walls.get(nb) || self.room_of[nbi].is_some() || corridor[nbi] {
                        continue;
                    }
                    self.room_of[nbi] = Some(room_id);
                    if self.goals.get(nb) {
                        self.room_goal_count[room_id as usize] += 1;
                    }
                    stack.push(nb);
                }
            }
        }
        debug!(
            rooms = self.room_goal_count.len(),
            corridor_cells = corridor.iter().filter(|&&c| c).count(),
            "computed room partition"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_board() {
        let board = Board::from_text("#####\n#@$.#\n#####").unwrap();
        assert_eq!(board.width(), 5);
        assert_eq!(board.height(), 3);
        assert_eq!(board.initial_boxes().len(), 1);
        assert_eq!(board.goal_list().len(), 1);
    }

    #[test]
    fn ragged_lines_are_padded_with_floor() {
        let board = Board::from_text("#####\n#@$.\n#####").unwrap();
        assert_eq!(board.width(), 5);
        assert!(!board.is_wall(Cell((1 * 5 + 4) as u32)));
    }

    #[test]
    fn no_player_is_malformed() {
        assert!(matches!(
            Board::from_text("####\n#  #\n####"),
            Err(ParseError::NoPlayer)
        ));
    }

    #[test]
    fn multiple_players_is_malformed() {
        assert!(matches!(
            Board::from_text("####\n#@@#\n####"),
            Err(ParseError::MultiplePlayers)
        ));
    }

    #[test]
    fn box_goal_mismatch_is_malformed() {
        assert!(matches!(
            Board::from_text("####\n#$$#\n#.@#\n####"),
            Err(ParseError::BoxGoalMismatch { .. })
        ));
    }

    #[test]
    fn unrecognized_char_is_malformed() {
        assert!(matches!(
            Board::from_text("####\n#@%#\n####"),
            Err(ParseError::UnrecognizedChar { ch: '%', .. })
        ));
    }

    #[test]
    fn corner_cell_with_no_path_to_goal_is_dead() {
        let board = Board::from_text("#####\n#$ .#\n# @ #\n#####").unwrap();
        let corner = Cell((1 * 5 + 1) as u32);
        assert!(board.is_dead(corner));
    }

    #[test]
    fn goal_cells_are_never_dead() {
        let board = Board::from_text("#####\n#@$.#\n#####").unwrap();
        for &g in board.goal_list() {
            assert!(!board.is_dead(g));
        }
    }

    #[test]
    fn corridor_cell_splits_rooms() {
        let board = Board::from_text(
            "#######\n\
             #@ # .#\n\
             #   $ #\n\
             # .# $#\n\
             #######",
        )
        .unwrap();
        let corridor_cell = Cell((2 * 7 + 3) as u32);
        assert!(board.is_corridor(corridor_cell));
        // A corridor cell is excluded from room accounting entirely, not
        // given a singleton room of its own.
        assert_eq!(board.room_of(corridor_cell), None);
    }

    #[test]
    fn single_row_interior_has_no_rooms() {
        // Every floor cell in a one-cell-thick interior row is blocked above
        // and below by the border wall, so all of them are corridor cells;
        // none may be assigned a room, or a single push would be misjudged
        // as filling a zero-goal room and reported as a hard deadlock.
        let board = Board::from_text("#####\n#@$.#\n#####").unwrap();
        for col in 1..4 {
            let cell = Cell((5 + col) as u32);
            assert_eq!(board.room_of(cell), None);
        }
    }

    #[test]
    fn room_goal_counts_account_for_non_corridor_goals() {
        let board = Board::from_text(
            "########\n\
             #@$$ . #\n\
             ### ####\n\
             #  .   #\n\
             ########",
        )
        .unwrap();
        let total: u32 = (0..board.room_goal_count.len() as u32)
            .map(|r| board.room_goal_count(r))
            .sum();
        let corridor_goals = board
            .goal_list()
            .iter()
            .filter(|&&g| board.room_of(g).is_none())
            .count() as u32;
        assert_eq!(total + corridor_goals, board.goal_list().len() as u32);
    }

    #[test]
    fn neighbor_out_of_bounds_is_none() {
        let board = Board::from_text("###\n#@#\n###").unwrap();
        assert_eq!(board.neighbor(Cell(0), Direction::Up), None);
        assert_eq!(board.neighbor(Cell(0), Direction::Left), None);
    }
}
