//! Cell storage shared by the generator, the planner and the game driver.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Open,
    Pip,
    Player,
    Adversary,
    /// An adversary standing on a cell whose pip is still uneaten.
    AdversaryOnPip,
}

impl Cell {
    pub fn is_wall(self) -> bool {
        self == Cell::Wall
    }

    pub fn has_pip(self) -> bool {
        matches!(self, Cell::Pip | Cell::AdversaryOnPip)
    }

    pub fn has_adversary(self) -> bool {
        matches!(self, Cell::Adversary | Cell::AdversaryOnPip)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn distance(self, other: Pos) -> f64 {
        let dr = self.row as f64 - other.row as f64;
        let dc = self.col as f64 - other.col as f64;
        (dr * dr + dc * dc).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Fixed expansion order; pursuit tie-breaks depend on it.
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    /// `(row, col)` offset of a single step.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (-1, 0),
            Dir::Down => (1, 0),
            Dir::Left => (0, -1),
            Dir::Right => (0, 1),
        }
    }

    /// Direction of a single orthogonal step from `from` to `to`.
    pub fn between(from: Pos, to: Pos) -> Option<Dir> {
        let dr = to.row as isize - from.row as isize;
        let dc = to.col as isize - from.col as isize;
        Dir::ALL.into_iter().find(|dir| dir.delta() == (dr, dc))
    }
}

/// A position with the direction it last moved in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mover {
    pub pos: Pos,
    pub dir: Option<Dir>,
}

impl Mover {
    pub const fn new(pos: Pos, dir: Option<Dir>) -> Self {
        Self { pos, dir }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn filled(height: usize, width: usize, cell: Cell) -> Self {
        Self {
            height,
            width,
            cells: vec![cell; height * width],
        }
    }

    /// Builds a grid from one string per row: `#` wall, `.` pip, anything else open.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        let mut grid = Grid::filled(height, width, Cell::Open);
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate().take(width) {
                let cell = match ch {
                    '#' => Cell::Wall,
                    '.' => Cell::Pip,
                    _ => Cell::Open,
                };
                grid.set(Pos::new(row, col), cell);
            }
        }
        grid
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn in_bounds(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    pub fn is_passable(&self, row: isize, col: isize) -> bool {
        self.in_bounds(row, col) && !self.cells[self.index(row as usize, col as usize)].is_wall()
    }

    pub fn is_passable_at(&self, pos: Pos) -> bool {
        self.is_passable(pos.row as isize, pos.col as isize)
    }

    pub fn is_border(&self, pos: Pos) -> bool {
        pos.row == 0 || pos.col == 0 || pos.row + 1 == self.height || pos.col + 1 == self.width
    }

    /// Panics when `pos` is outside the grid.
    pub fn get(&self, pos: Pos) -> Cell {
        self.cells[self.index(pos.row, pos.col)]
    }

    pub fn set(&mut self, pos: Pos, cell: Cell) {
        let idx = self.index(pos.row, pos.col);
        self.cells[idx] = cell;
    }

    /// The neighbour of `pos` along `dir`, if it lies inside the grid.
    pub fn step(&self, pos: Pos, dir: Dir) -> Option<Pos> {
        let (dr, dc) = dir.delta();
        let row = pos.row as isize + dr;
        let col = pos.col as isize + dc;
        if self.in_bounds(row, col) {
            Some(Pos::new(row as usize, col as usize))
        } else {
            None
        }
    }

    /// Passable neighbours of `pos` in `Dir::ALL` order.
    pub fn passable_neighbours(&self, pos: Pos) -> impl Iterator<Item = (Dir, Pos)> + '_ {
        Dir::ALL.into_iter().filter_map(move |dir| {
            self.step(pos, dir)
                .filter(|next| self.is_passable_at(*next))
                .map(|next| (dir, next))
        })
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |col| Pos::new(row, col)))
    }

    /// Every cell except the outer ring, row-major.
    pub fn interior(&self) -> impl Iterator<Item = Pos> + '_ {
        let rows = 1..self.height.saturating_sub(1);
        rows.flat_map(move |row| (1..self.width.saturating_sub(1)).map(move |col| Pos::new(row, col)))
    }

    pub fn count(&self, pred: impl Fn(Cell) -> bool) -> usize {
        self.cells.iter().filter(|cell| pred(**cell)).count()
    }

    pub(crate) fn index_of(&self, pos: Pos) -> usize {
        self.index(pos.row, pos.col)
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_and_passability() {
        let grid = Grid::from_rows(&["###", "#.#", "###"]);
        assert!(grid.in_bounds(0, 0));
        assert!(!grid.in_bounds(-1, 0));
        assert!(!grid.in_bounds(3, 1));
        assert!(grid.is_passable(1, 1));
        assert!(!grid.is_passable(0, 1));
        assert!(!grid.is_passable(1, 5));
    }

    #[test]
    fn step_stops_at_edges() {
        let grid = Grid::filled(2, 2, Cell::Open);
        assert_eq!(grid.step(Pos::new(0, 0), Dir::Up), None);
        assert_eq!(grid.step(Pos::new(0, 0), Dir::Right), Some(Pos::new(0, 1)));
        assert_eq!(grid.step(Pos::new(1, 1), Dir::Down), None);
    }

    #[test]
    fn neighbours_follow_fixed_order() {
        let grid = Grid::from_rows(&["#####", "#   #", "#   #", "#   #", "#####"]);
        let dirs: Vec<Dir> = grid.passable_neighbours(Pos::new(2, 2)).map(|(d, _)| d).collect();
        assert_eq!(dirs, Dir::ALL.to_vec());
        let corner: Vec<Dir> = grid.passable_neighbours(Pos::new(1, 1)).map(|(d, _)| d).collect();
        assert_eq!(corner, vec![Dir::Down, Dir::Right]);
    }

    #[test]
    fn between_recovers_direction() {
        let a = Pos::new(3, 3);
        for dir in Dir::ALL {
            let grid = Grid::filled(7, 7, Cell::Open);
            let b = grid.step(a, dir).unwrap();
            assert_eq!(Dir::between(a, b), Some(dir));
        }
        assert_eq!(Dir::between(a, Pos::new(5, 3)), None);
    }

    #[test]
    fn interior_skips_outer_ring() {
        let grid = Grid::filled(5, 6, Cell::Wall);
        let interior: Vec<Pos> = grid.interior().collect();
        assert_eq!(interior.len(), 3 * 4);
        assert!(interior.iter().all(|p| !grid.is_border(*p)));
    }
}
