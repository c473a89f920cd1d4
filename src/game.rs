//! Level state and the per-tick update that drives it.

use rand::Rng;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::MazeError;
use crate::grid::{Cell, Dir, Grid, Mover};
use crate::maze::{self, Maze};
use crate::planner::{self, Strategy};

pub const PIP_SCORE: u32 = 10;
/// Growth applied to both grid dimensions on every level transition.
pub const LEVEL_GROWTH: usize = 5;

/// Adversaries wander on the first level and hunt from then on.
pub fn strategy_for_level(level: u32) -> Strategy {
    if level <= 1 {
        Strategy::RandomWalk
    } else {
        Strategy::Pursuit
    }
}

pub struct Game {
    base: Settings,
    level: u32,
    height: usize,
    width: usize,
    adversary_count: usize,
    grid: Grid,
    player: Mover,
    adversaries: Vec<Mover>,
    score: u32,
    over: bool,
}

impl Game {
    pub fn new(settings: &Settings, rng: &mut impl Rng) -> Result<Self, MazeError> {
        let maze = maze::generate(
            rng,
            settings.base_height,
            settings.base_width,
            settings.base_adversaries,
            settings.min_separation,
        )?;
        info!(
            height = settings.base_height,
            width = settings.base_width,
            adversaries = settings.base_adversaries,
            "new game"
        );
        Ok(Self::with_maze(settings, maze))
    }

    /// Starts level 1 on an already built maze.
    pub fn with_maze(settings: &Settings, maze: Maze) -> Self {
        Self {
            base: settings.clone(),
            level: 1,
            height: maze.grid.height(),
            width: maze.grid.width(),
            adversary_count: settings.base_adversaries,
            grid: maze.grid,
            player: maze.player,
            adversaries: maze.adversaries,
            score: 0,
            over: false,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> Mover {
        self.player
    }

    pub fn adversaries(&self) -> &[Mover] {
        &self.adversaries
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn pips_left(&self) -> usize {
        self.grid.count(Cell::has_pip)
    }

    /// Buffers a new heading for the player if the cell that way is open.
    pub fn steer(&mut self, dir: Dir) -> bool {
        if self.over {
            return false;
        }
        let legal = self
            .grid
            .step(self.player.pos, dir)
            .map_or(false, |next| self.grid.is_passable_at(next));
        if legal {
            self.player.dir = Some(dir);
        }
        legal
    }

    pub fn tick(&mut self, rng: &mut impl Rng) -> Result<(), MazeError> {
        if self.over {
            return Ok(());
        }
        self.move_player();
        if self.over {
            return Ok(());
        }
        self.move_adversaries(rng);
        if self.adversaries.iter().any(|a| a.pos == self.player.pos) {
            self.catch();
        }
        if !self.over && self.pips_left() == 0 {
            self.next_level(rng)?;
        }
        Ok(())
    }

    fn move_player(&mut self) {
        let Some(dir) = self.player.dir else {
            return;
        };
        let Some(next) = self.grid.step(self.player.pos, dir) else {
            return;
        };
        if !self.grid.is_passable_at(next) {
            return;
        }
        let entered = self.grid.get(next);
        self.grid.set(self.player.pos, Cell::Open);
        self.player.pos = next;
        if entered.has_adversary() {
            self.catch();
            return;
        }
        if entered == Cell::Pip {
            self.score += PIP_SCORE;
        }
        self.grid.set(next, Cell::Player);
    }

    /// Adversaries move one at a time; each plans around the markers left by
    /// those before it.
    fn move_adversaries(&mut self, rng: &mut impl Rng) {
        let strategy = strategy_for_level(self.level);
        let target = self.player.pos;
        for idx in 0..self.adversaries.len() {
            let current = self.adversaries[idx];
            let planned = planner::plan(strategy, &self.grid, current, target, rng);
            if planned.pos == current.pos {
                self.adversaries[idx] = planned;
                continue;
            }
            let dest = self.grid.get(planned.pos);
            let vacated = if self.grid.get(current.pos) == Cell::AdversaryOnPip {
                Cell::Pip
            } else {
                Cell::Open
            };
            self.grid.set(current.pos, vacated);
            let occupied = if dest == Cell::Pip {
                Cell::AdversaryOnPip
            } else {
                Cell::Adversary
            };
            self.grid.set(planned.pos, occupied);
            self.adversaries[idx] = planned;
            if dest == Cell::Player {
                self.catch();
            }
        }
    }

    fn catch(&mut self) {
        if !self.over {
            info!(level = self.level, score = self.score, "player caught");
        }
        self.over = true;
    }

    pub fn next_level(&mut self, rng: &mut impl Rng) -> Result<(), MazeError> {
        let height = self.height + LEVEL_GROWTH;
        let width = self.width + LEVEL_GROWTH;
        let adversary_count = self.adversary_count + 1;
        let maze = maze::generate(rng, height, width, adversary_count, self.base.min_separation)?;
        self.level += 1;
        self.height = height;
        self.width = width;
        self.adversary_count = adversary_count;
        self.load(maze);
        debug!(level = self.level, height, width, adversary_count, "level advanced");
        Ok(())
    }

    /// Skipping is only offered on the first level.
    pub fn skip_level(&mut self, rng: &mut impl Rng) -> Result<bool, MazeError> {
        if self.level != 1 || self.over {
            return Ok(false);
        }
        self.next_level(rng)?;
        Ok(true)
    }

    pub fn restart(&mut self, rng: &mut impl Rng) -> Result<(), MazeError> {
        let base = self.base.clone();
        *self = Game::new(&base, rng)?;
        Ok(())
    }

    fn load(&mut self, maze: Maze) {
        self.grid = maze.grid;
        self.player = maze.player;
        self.adversaries = maze.adversaries;
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}
