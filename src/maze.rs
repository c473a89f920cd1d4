//! Procedural maze generation.
//!
//! A maze starts as solid wall. Ring-shaped templates are stamped at random
//! interior offsets to open up passages, the player and adversaries are
//! dropped onto open cells, and any pocket the player cannot reach is joined
//! to the rest by carving the shortest corridor through the walls between
//! them. Every open cell ends up carrying a pip.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace};

use crate::error::MazeError;
use crate::grid::{Cell, Dir, Grid, Mover, Pos};
use crate::spawn;

pub const MIN_SIDE: usize = 5;

/// A fixed stamp; bit `width - 1 - col` of `rows[row]` marks a carved cell.
struct Template {
    height: usize,
    width: usize,
    rows: &'static [u8],
}

impl Template {
    fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width)
                .filter(move |col| self.rows[row] >> (self.width - 1 - col) & 1 == 1)
                .map(move |col| (row, col))
        })
    }
}

static TEMPLATES: [Template; 3] = [
    Template {
        height: 3,
        width: 5,
        rows: &[0b11111, 0b10001, 0b11111],
    },
    Template {
        height: 4,
        width: 5,
        rows: &[0b11111, 0b10001, 0b11011, 0b01110],
    },
    Template {
        height: 4,
        width: 3,
        rows: &[0b111, 0b101, 0b101, 0b111],
    },
];

/// A freshly generated level: the grid plus where everyone starts.
#[derive(Clone, Debug)]
pub struct Maze {
    pub grid: Grid,
    pub player: Mover,
    pub adversaries: Vec<Mover>,
}

pub fn generate(
    rng: &mut impl Rng,
    height: usize,
    width: usize,
    adversary_count: usize,
    min_separation: f64,
) -> Result<Maze, MazeError> {
    if height < MIN_SIDE || width < MIN_SIDE {
        return Err(MazeError::InvalidDimensions { height, width });
    }
    if !min_separation.is_finite() || min_separation < 0.0 {
        return Err(MazeError::InvalidSeparation(min_separation));
    }

    let mut grid = Grid::filled(height, width, Cell::Wall);
    let stamped = carve(&mut grid, rng);
    if grid.count(|c| c == Cell::Open) == 0 {
        open_interior(&mut grid);
    }

    // The interior of a valid grid always has an open cell by now.
    let start = spawn::place_player(&mut grid, rng)
        .ok_or(MazeError::InvalidDimensions { height, width })?;
    let adversaries = spawn::place_adversaries(&mut grid, rng, adversary_count);
    let start = spawn::separate_player(&mut grid, rng, start, &adversaries, min_separation);
    let player = Mover::new(start, Some(spawn::initial_direction(&grid, start)));

    let corridors = repair_connectivity(&mut grid, start);
    let pips = lay_pips(&mut grid);

    debug!(
        height,
        width,
        stamped,
        corridors,
        pips,
        adversaries = adversaries.len(),
        "maze generated"
    );
    Ok(Maze {
        grid,
        player,
        adversaries,
    })
}

/// Number of template placements attempted for a grid of this size.
pub fn carve_count(height: usize, width: usize) -> usize {
    let count = (height * width) as f64 / 15.0 - height as f64 / 5.0;
    count.max(0.0).floor() as usize
}

fn carve(grid: &mut Grid, rng: &mut impl Rng) -> usize {
    let mut stamped = 0;
    for _ in 0..carve_count(grid.height(), grid.width()) {
        if let Some(template) = TEMPLATES.choose(rng) {
            if try_stamp(grid, rng, template) {
                stamped += 1;
            }
        }
    }
    stamped
}

/// One random offset per template; on overlap the placement is dropped.
fn try_stamp(grid: &mut Grid, rng: &mut impl Rng, template: &Template) -> bool {
    let (height, width) = (grid.height(), grid.width());
    if height < template.height + 2 || width < template.width + 2 {
        return false;
    }
    let row0 = rng.gen_range(1..=(height - template.height - 2).max(1));
    let col0 = rng.gen_range(1..=(width - template.width - 2).max(1));

    let overlaps = template
        .cells()
        .any(|(r, c)| grid.get(Pos::new(row0 + r, col0 + c)) == Cell::Open);
    if overlaps {
        return false;
    }
    for (r, c) in template.cells() {
        grid.set(Pos::new(row0 + r, col0 + c), Cell::Open);
    }
    true
}

fn open_interior(grid: &mut Grid) {
    let interior: Vec<Pos> = grid.interior().collect();
    for pos in interior {
        grid.set(pos, Cell::Open);
    }
}

/// Cells reachable from `start` through non-wall cells, indexed row-major.
pub fn reachable_from(grid: &Grid, start: Pos) -> Vec<bool> {
    let mut seen = vec![false; grid.len()];
    flood(grid, start, &mut seen);
    seen
}

fn flood(grid: &Grid, start: Pos, seen: &mut [bool]) {
    if !grid.is_passable_at(start) {
        return;
    }
    let mut queue = VecDeque::new();
    seen[grid.index_of(start)] = true;
    queue.push_back(start);
    while let Some(pos) = queue.pop_front() {
        for (_, next) in grid.passable_neighbours(pos) {
            let idx = grid.index_of(next);
            if !seen[idx] {
                seen[idx] = true;
                queue.push_back(next);
            }
        }
    }
}

/// Joins every open pocket the player cannot reach. Returns the number of
/// corridors carved.
pub fn repair_connectivity(grid: &mut Grid, start: Pos) -> usize {
    let mut reached = reachable_from(grid, start);
    let mut corridors = 0;
    let interior: Vec<Pos> = grid.interior().collect();
    for pos in interior {
        if grid.get(pos) == Cell::Wall || reached[grid.index_of(pos)] {
            continue;
        }
        // Never None: the search crosses interior walls and the start is reached.
        let Some(path) = corridor_to_reached(grid, pos, &reached) else {
            continue;
        };
        trace!(?pos, length = path.len(), "carving corridor");
        for cell in &path {
            if grid.get(*cell) == Cell::Wall {
                grid.set(*cell, Cell::Open);
            }
            reached[grid.index_of(*cell)] = true;
        }
        flood(grid, pos, &mut reached);
        corridors += 1;
    }
    corridors
}

/// Shortest run of interior cells from `from` up to, but excluding, the
/// nearest reached cell. Walls may be crossed; the outer ring may not.
fn corridor_to_reached(grid: &Grid, from: Pos, reached: &[bool]) -> Option<Vec<Pos>> {
    let mut came_from: Vec<Option<Pos>> = vec![None; grid.len()];
    let mut seen = vec![false; grid.len()];
    let mut queue = VecDeque::new();
    seen[grid.index_of(from)] = true;
    queue.push_back(from);

    while let Some(pos) = queue.pop_front() {
        if reached[grid.index_of(pos)] {
            let mut path = Vec::new();
            let mut cursor = came_from[grid.index_of(pos)];
            while let Some(cell) = cursor {
                path.push(cell);
                cursor = came_from[grid.index_of(cell)];
            }
            path.reverse();
            return Some(path);
        }
        for dir in Dir::ALL {
            let Some(next) = grid.step(pos, dir) else {
                continue;
            };
            let idx = grid.index_of(next);
            if grid.is_border(next) || seen[idx] {
                continue;
            }
            seen[idx] = true;
            came_from[idx] = Some(pos);
            queue.push_back(next);
        }
    }
    None
}

fn lay_pips(grid: &mut Grid) -> usize {
    let open: Vec<Pos> = grid.positions().filter(|p| grid.get(*p) == Cell::Open).collect();
    for pos in &open {
        grid.set(*pos, Cell::Pip);
    }
    open.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rejects_tiny_grids() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            generate(&mut rng, 4, 10, 1, 0.0).unwrap_err(),
            MazeError::InvalidDimensions { height: 4, width: 10 }
        );
        assert!(generate(&mut rng, 10, 2, 1, 0.0).is_err());
    }

    #[test]
    fn rejects_bad_separation() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            generate(&mut rng, 10, 10, 1, -1.0),
            Err(MazeError::InvalidSeparation(_))
        ));
        assert!(generate(&mut rng, 10, 10, 1, f64::NAN).is_err());
    }

    #[test]
    fn carve_count_matches_density_formula() {
        assert_eq!(carve_count(5, 5), 0);
        assert_eq!(carve_count(10, 15), 8);
        assert_eq!(carve_count(15, 20), 17);
    }

    #[test]
    fn templates_are_closed_rings() {
        let sizes: Vec<usize> = TEMPLATES.iter().map(|t| t.cells().count()).collect();
        assert_eq!(sizes, vec![12, 14, 10]);
    }

    #[test]
    fn stamping_skips_overlap() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut grid = Grid::filled(7, 7, Cell::Wall);
        open_interior(&mut grid);
        let before = grid.clone();
        assert!(!try_stamp(&mut grid, &mut rng, &TEMPLATES[0]));
        assert_eq!(grid, before);
    }

    #[test]
    fn stamping_skips_oversized_template() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut grid = Grid::filled(5, 5, Cell::Wall);
        assert!(!try_stamp(&mut grid, &mut rng, &TEMPLATES[1]));
        assert_eq!(grid.count(|c| c == Cell::Open), 0);
    }

    #[test]
    fn repair_joins_walled_pocket() {
        let mut grid = Grid::from_rows(&[
            "#######", //
            "#  #  #", //
            "#  #  #", //
            "#######",
        ]);
        let start = Pos::new(1, 1);
        let corridors = repair_connectivity(&mut grid, start);
        assert_eq!(corridors, 1);
        let reached = reachable_from(&grid, start);
        for pos in grid.positions() {
            if grid.get(pos) != Cell::Wall {
                assert!(reached[grid.index_of(pos)], "{pos:?} unreachable");
            }
        }
        assert_eq!(grid.count(|c| c == Cell::Wall), 7 * 4 - 10 + 1);
    }

    #[test]
    fn repair_is_noop_on_connected_grid() {
        let mut grid = Grid::from_rows(&["#####", "#   #", "# # #", "#   #", "#####"]);
        let before = grid.clone();
        assert_eq!(repair_connectivity(&mut grid, Pos::new(1, 1)), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn smallest_maze_opens_whole_interior() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let maze = generate(&mut rng, 5, 5, 0, 0.0).unwrap();
        assert!(maze.adversaries.is_empty());
        assert_eq!(maze.grid.get(maze.player.pos), Cell::Player);
        assert_eq!(maze.grid.count(|c| c == Cell::Pip), 8);
    }

    #[test]
    fn open_cells_all_carry_pips() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let maze = generate(&mut rng, 15, 20, 2, 50.0).unwrap();
        assert_eq!(maze.grid.count(|c| c == Cell::Open), 0);
        assert!(maze.grid.count(|c| c == Cell::Pip) > 0);
        assert_eq!(maze.grid.count(|c| c == Cell::Adversary), maze.adversaries.len());
    }
}
