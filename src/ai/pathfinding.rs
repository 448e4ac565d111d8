//! A* pathfinding over a platform grid
//!
//! The level is cut into square cells. Only the interior of each platform is
//! blocked (from a few pixels under its top edge down to its bottom), so the
//! walkable surface stays open. Besides the four cardinal moves, every cell
//! has direct "jump" edges up to 2-5 cells higher and at most one cell to
//! either side. A jump arc therefore costs the same as a single step.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use glam::Vec2;

use crate::sim::geometry::Rect;

/// Default cell edge length in pixels
pub const DEFAULT_CELL_SIZE: f32 = 20.0;
/// Pixels below a platform's top edge that stay walkable
pub const OBSTACLE_INSET: f32 = 5.0;
/// Upper bound on grid columns and rows
pub const MAX_CELLS_PER_AXIS: i32 = 4096;

const CARDINAL: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const JUMP_OFFSETS: [i32; 3] = [-1, 0, 1];
const JUMP_HEIGHTS: std::ops::RangeInclusive<i32> = 2..=5;

/// Grid coordinate (column, row)
pub type Cell = (i32, i32);

/// Entry in the open set: ordered by f-score, then by insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    seq: u64,
    cell: Cell,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f.cmp(&other.f).then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Obstacle grid built from a level's platforms
#[derive(Debug, Clone)]
pub struct NavGrid {
    cell_size: f32,
    columns: i32,
    rows: i32,
    blocked: Vec<bool>,
}

impl NavGrid {
    /// Empty grid covering `width` x `height` pixels
    ///
    /// Each axis is capped at [`MAX_CELLS_PER_AXIS`]; degenerate sizes give an
    /// empty grid on which every search fails.
    pub fn new(width: f32, height: f32, cell_size: f32) -> Self {
        let cells = |extent: f32| (extent / cell_size).floor().clamp(0.0, MAX_CELLS_PER_AXIS as f32) as i32;
        let (columns, rows) = if cell_size.is_finite() && cell_size > 0.0 {
            (cells(width), cells(height))
        } else {
            (0, 0)
        };
        Self {
            cell_size,
            columns,
            rows,
            blocked: vec![false; columns as usize * rows as usize],
        }
    }

    /// Grid with the given platforms marked as obstacles
    pub fn from_platforms(width: f32, height: f32, cell_size: f32, platforms: &[Rect]) -> Self {
        let mut grid = Self::new(width, height, cell_size);
        grid.set_obstacles(platforms);
        grid
    }

    /// Replace the obstacle set with the interiors of `platforms`
    pub fn set_obstacles(&mut self, platforms: &[Rect]) {
        self.blocked.iter_mut().for_each(|b| *b = false);
        for platform in platforms {
            let x0 = self.to_cell_coord(platform.left()).max(0);
            let x1 = self.to_cell_coord(platform.right()).min(self.columns - 1);
            let y0 = self.to_cell_coord(platform.top() + OBSTACLE_INSET).max(0);
            let y1 = self.to_cell_coord(platform.bottom()).min(self.rows - 1);
            for x in x0..=x1 {
                for y in y0..=y1 {
                    if let Some(i) = self.index((x, y)) {
                        self.blocked[i] = true;
                    }
                }
            }
        }
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    fn to_cell_coord(&self, px: f32) -> i32 {
        (px / self.cell_size).floor() as i32
    }

    /// Cell containing a pixel position
    pub fn cell_at(&self, p: Vec2) -> Cell {
        (self.to_cell_coord(p.x), self.to_cell_coord(p.y))
    }

    /// Pixel center of a cell
    pub fn cell_center(&self, cell: Cell) -> Vec2 {
        Vec2::new(
            (cell.0 as f32 + 0.5) * self.cell_size,
            (cell.1 as f32 + 0.5) * self.cell_size,
        )
    }

    fn index(&self, (x, y): Cell) -> Option<usize> {
        (x >= 0 && x < self.columns && y >= 0 && y < self.rows).then(|| (y * self.columns + x) as usize)
    }

    /// In bounds and not inside a platform
    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| !self.blocked[i])
    }

    pub fn is_obstacle(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|i| self.blocked[i])
    }

    /// Cardinal moves followed by jump edges, all walkable
    pub fn neighbors(&self, (x, y): Cell) -> Vec<Cell> {
        let mut out = Vec::with_capacity(CARDINAL.len() + JUMP_OFFSETS.len() * 4);
        for (dx, dy) in CARDINAL {
            let next = (x + dx, y + dy);
            if self.is_walkable(next) {
                out.push(next);
            }
        }
        for dx in JUMP_OFFSETS {
            for height in JUMP_HEIGHTS {
                let next = (x + dx, y - height);
                if self.is_walkable(next) {
                    out.push(next);
                }
            }
        }
        out
    }

    /// Shortest route between two pixel positions as cell-center waypoints.
    ///
    /// The start cell is not included; the goal cell is last. Returns an empty
    /// vector when both points share a cell, when either end is outside the
    /// grid, when the goal cell is blocked, or when no route exists.
    pub fn find_path(&self, start_px: Vec2, goal_px: Vec2) -> Vec<Vec2> {
        self.find_cell_path(self.cell_at(start_px), self.cell_at(goal_px))
            .into_iter()
            .map(|cell| self.cell_center(cell))
            .collect()
    }

    /// Cell-level A*. Same contract as [`NavGrid::find_path`].
    pub fn find_cell_path(&self, start: Cell, goal: Cell) -> Vec<Cell> {
        if start == goal || self.index(start).is_none() || !self.is_walkable(goal) {
            return Vec::new();
        }

        let mut open = BinaryHeap::new();
        let mut came_from: HashMap<Cell, Cell> = HashMap::new();
        let mut g_score: HashMap<Cell, u32> = HashMap::new();
        let mut seq = 0u64;

        g_score.insert(start, 0);
        open.push(Reverse(OpenNode {
            f: manhattan(start, goal),
            seq,
            cell: start,
        }));

        while let Some(Reverse(node)) = open.pop() {
            let current = node.cell;
            if current == goal {
                return reconstruct(&came_from, current);
            }

            let current_g = g_score.get(&current).copied().unwrap_or(u32::MAX);
            // Stale heap entry
            if node.f > current_g.saturating_add(manhattan(current, goal)) {
                continue;
            }

            for next in self.neighbors(current) {
                let tentative = current_g + 1;
                if g_score.get(&next).is_none_or(|&g| tentative < g) {
                    came_from.insert(next, current);
                    g_score.insert(next, tentative);
                    seq += 1;
                    open.push(Reverse(OpenNode {
                        f: tentative + manhattan(next, goal),
                        seq,
                        cell: next,
                    }));
                }
            }
        }

        Vec::new()
    }
}

/// Manhattan distance between cells
#[inline]
pub fn manhattan(a: Cell, b: Cell) -> u32 {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, mut current: Cell) -> Vec<Cell> {
    let mut path = Vec::new();
    while let Some(&prev) = came_from.get(&current) {
        path.push(current);
        current = prev;
    }
    path.reverse();
    path
}
