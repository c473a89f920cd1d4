//! Start placement for the player and the adversaries.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{trace, warn};

use crate::grid::{Cell, Dir, Grid, Mover, Pos};

/// Separation rounds before the required distance starts halving.
const RELAX_AFTER: u32 = 20;
/// Hard cap on separation rounds; whatever placement exists then is kept.
const MAX_SEPARATION_ROUNDS: u32 = 30;
/// Heading given to every freshly spawned adversary.
pub const ADVERSARY_START_DIR: Dir = Dir::Up;

/// Uniform pick among interior `Open` cells.
pub fn random_open_cell(grid: &Grid, rng: &mut impl Rng) -> Option<Pos> {
    let candidates: Vec<Pos> = grid.interior().filter(|p| grid.get(*p) == Cell::Open).collect();
    candidates.choose(rng).copied()
}

/// Picks the player start and marks it on the grid.
pub fn place_player(grid: &mut Grid, rng: &mut impl Rng) -> Option<Pos> {
    let pos = random_open_cell(grid, rng)?;
    grid.set(pos, Cell::Player);
    Some(pos)
}

/// Picks up to `count` distinct adversary starts, marking each as it goes.
pub fn place_adversaries(grid: &mut Grid, rng: &mut impl Rng, count: usize) -> Vec<Mover> {
    let mut adversaries = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(pos) = random_open_cell(grid, rng) else {
            warn!(
                requested = count,
                placed = adversaries.len(),
                "ran out of open cells for adversaries"
            );
            break;
        };
        grid.set(pos, Cell::Adversary);
        adversaries.push(Mover::new(pos, Some(ADVERSARY_START_DIR)));
    }
    adversaries
}

fn too_close(player: Pos, adversaries: &[Mover], min_separation: f64) -> bool {
    adversaries
        .iter()
        .any(|adversary| player.distance(adversary.pos) < min_separation)
}

/// Redraws the player start until it clears `min_separation` from every
/// adversary. The distance halves after `RELAX_AFTER` rounds and the search
/// gives up after `MAX_SEPARATION_ROUNDS`.
pub fn separate_player(
    grid: &mut Grid,
    rng: &mut impl Rng,
    player: Pos,
    adversaries: &[Mover],
    min_separation: f64,
) -> Pos {
    let mut player = player;
    let mut range = min_separation;
    for round in 0..MAX_SEPARATION_ROUNDS {
        if !too_close(player, adversaries, range) {
            return player;
        }
        if let Some(next) = random_open_cell(grid, rng) {
            grid.set(player, Cell::Open);
            grid.set(next, Cell::Player);
            trace!(round, range, from = ?player, to = ?next, "player start too close, redrawn");
            player = next;
        }
        if round >= RELAX_AFTER {
            range /= 2.0;
        }
    }
    player
}

/// First direction in `Dir::ALL` order that leads onto an `Open` cell.
pub fn initial_direction(grid: &Grid, pos: Pos) -> Dir {
    Dir::ALL
        .into_iter()
        .find(|dir| {
            grid.step(pos, *dir)
                .map_or(false, |next| grid.get(next) == Cell::Open)
        })
        .unwrap_or(Dir::Right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn open_room(height: usize, width: usize) -> Grid {
        let mut grid = Grid::filled(height, width, Cell::Wall);
        let interior: Vec<Pos> = grid.interior().collect();
        for pos in interior {
            grid.set(pos, Cell::Open);
        }
        grid
    }

    #[test]
    fn adversaries_never_share_a_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut grid = open_room(6, 6);
        let player = place_player(&mut grid, &mut rng).unwrap();
        let adversaries = place_adversaries(&mut grid, &mut rng, 10);
        assert_eq!(adversaries.len(), 10);
        for (i, a) in adversaries.iter().enumerate() {
            assert_ne!(a.pos, player);
            assert_eq!(grid.get(a.pos), Cell::Adversary);
            assert!(adversaries[i + 1..].iter().all(|b| b.pos != a.pos));
        }
    }

    #[test]
    fn adversary_count_is_capped_by_free_cells() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut grid = open_room(4, 4);
        place_player(&mut grid, &mut rng).unwrap();
        let adversaries = place_adversaries(&mut grid, &mut rng, 9);
        assert_eq!(adversaries.len(), 3);
    }

    #[test]
    fn separation_moves_player_away() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut grid = open_room(12, 12);
        let player = Pos::new(1, 1);
        grid.set(player, Cell::Player);
        let adversary = Mover::new(Pos::new(1, 2), Some(ADVERSARY_START_DIR));
        grid.set(adversary.pos, Cell::Adversary);

        let placed = separate_player(&mut grid, &mut rng, player, &[adversary], 5.0);
        assert_eq!(grid.get(placed), Cell::Player);
        assert_eq!(grid.count(|c| c == Cell::Player), 1);
        assert!(placed.distance(adversary.pos) >= 5.0);
    }

    #[test]
    fn unreachable_separation_terminates() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut grid = open_room(5, 5);
        let player = place_player(&mut grid, &mut rng).unwrap();
        let adversaries = place_adversaries(&mut grid, &mut rng, 2);
        let placed = separate_player(&mut grid, &mut rng, player, &adversaries, 1_000.0);
        assert_eq!(grid.get(placed), Cell::Player);
    }

    #[test]
    fn initial_direction_scans_up_down_left_right() {
        let grid = Grid::from_rows(&["#####", "#   #", "#   #", "#####"]);
        assert_eq!(initial_direction(&grid, Pos::new(1, 1)), Dir::Down);
        assert_eq!(initial_direction(&grid, Pos::new(2, 2)), Dir::Up);
        let boxed = Grid::from_rows(&["###", "# #", "###"]);
        assert_eq!(initial_direction(&boxed, Pos::new(1, 1)), Dir::Right);
    }
}
