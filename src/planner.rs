//! Per-tick adversary movement.
//!
//! Both planners are pure: they read the grid as it stands, pick one step and
//! leave the bookkeeping of cell markers to the caller. Adversaries are
//! planned one after another so each sees the markers left by the previous.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grid::{Dir, Grid, Mover, Pos};

/// How adversaries move on a given level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Keep heading the same way until blocked, then turn at random.
    RandomWalk,
    /// Take the first step of a shortest path to the target.
    Pursuit,
}

/// One step of a wander that keeps its heading while it can.
///
/// Returns `mover` unchanged when every neighbour is blocked.
pub fn plan_random_walk(grid: &Grid, mover: Mover, rng: &mut impl Rng) -> Mover {
    walk(grid, mover, rng, |pos| grid.is_passable_at(pos))
}

fn walk(grid: &Grid, mover: Mover, rng: &mut impl Rng, open: impl Fn(Pos) -> bool) -> Mover {
    if let Some(dir) = mover.dir {
        if let Some(next) = grid.step(mover.pos, dir) {
            if open(next) {
                return Mover::new(next, Some(dir));
            }
        }
    }

    let options: Vec<(Dir, Pos)> = neighbours(grid, mover.pos, &open).collect();
    match options.choose(rng) {
        Some(&(dir, next)) => Mover::new(next, Some(dir)),
        None => mover,
    }
}

fn neighbours<'a>(
    grid: &'a Grid,
    pos: Pos,
    open: &'a impl Fn(Pos) -> bool,
) -> impl Iterator<Item = (Dir, Pos)> + 'a {
    Dir::ALL.into_iter().filter_map(move |dir| {
        grid.step(pos, dir)
            .filter(|next| open(*next))
            .map(|next| (dir, next))
    })
}

/// First step along a shortest path from `from` to `target`.
///
/// Neighbours are expanded in `Dir::ALL` order, so among equally short paths
/// the first one discovered wins. Returns `from` when the target is
/// unreachable or already reached.
pub fn plan_pursuit(grid: &Grid, from: Pos, target: Pos) -> Pos {
    pursue(grid, from, target, |pos| grid.is_passable_at(pos))
}

fn pursue(grid: &Grid, from: Pos, target: Pos, open: impl Fn(Pos) -> bool) -> Pos {
    if !open(from) || !open(target) {
        return from;
    }
    let mut came_from: Vec<Option<Pos>> = vec![None; grid.len()];
    let mut seen = vec![false; grid.len()];
    let mut queue = VecDeque::new();
    seen[grid.index_of(from)] = true;
    queue.push_back(from);

    while let Some(pos) = queue.pop_front() {
        if pos == target {
            return first_step(grid, &came_from, from, target);
        }
        for (_, next) in neighbours(grid, pos, &open) {
            let idx = grid.index_of(next);
            if !seen[idx] {
                seen[idx] = true;
                came_from[idx] = Some(pos);
                queue.push_back(next);
            }
        }
    }
    from
}

fn first_step(grid: &Grid, came_from: &[Option<Pos>], from: Pos, target: Pos) -> Pos {
    let mut step = target;
    while let Some(prev) = came_from[grid.index_of(step)] {
        if prev == from {
            return step;
        }
        step = prev;
    }
    from
}

/// Plans one adversary move under `strategy`. `target` is only consulted
/// when pursuing.
///
/// Cells holding another adversary count as blocked, so a walker turns away
/// from them and a pursuer routes around them.
pub fn plan(
    strategy: Strategy,
    grid: &Grid,
    mover: Mover,
    target: Pos,
    rng: &mut impl Rng,
) -> Mover {
    let open = |pos: Pos| {
        pos == mover.pos || (grid.is_passable_at(pos) && !grid.get(pos).has_adversary())
    };
    match strategy {
        Strategy::RandomWalk => walk(grid, mover, rng, open),
        Strategy::Pursuit => {
            let next = pursue(grid, mover.pos, target, open);
            Mover::new(next, Dir::between(mover.pos, next).or(mover.dir))
        }
    }
}
