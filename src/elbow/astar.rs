//! A* search over the sparse routing grid.
//!
//! The grid is not uniform: its lines are the edges of the routing boxes plus
//! the coordinates of both endpoints, so every node is a candidate corner. The
//! search penalizes each change of direction by `d³` (with `d` the manhattan
//! distance between start and end) and never lets a segment double back.

#[cfg(test)]
#[path = "astar_test.rs"]
mod astar_test;

use crate::geometry::{Bounds, Point};
use crate::heading::Heading;

/// Neighbor order: up, right, down, left.
const NEIGHBOR_HEADINGS: [Heading; 4] = [Heading::Up, Heading::Right, Heading::Down, Heading::Left];

#[derive(Debug, Clone, Copy)]
pub(crate) struct Node {
    pub pos: Point,
    pub col: usize,
    pub row: usize,
    f: f64,
    g: f64,
    h: f64,
    pub closed: bool,
    visited: bool,
    parent: Option<usize>,
}

/// Nodes at every intersection of the column and row lines, row-major.
#[derive(Debug, Clone)]
pub(crate) struct Grid {
    pub cols: usize,
    pub rows: usize,
    pub nodes: Vec<Node>,
}

impl Grid {
    /// Build a grid from distinct, sorted column (x) and row (y) coordinates.
    pub fn new(columns: &[f64], rows: &[f64]) -> Self {
        let nodes = rows
            .iter()
            .enumerate()
            .flat_map(|(row, &y)| {
                columns.iter().enumerate().map(move |(col, &x)| Node {
                    pos: Point::new(x, y),
                    col,
                    row,
                    f: 0.0,
                    g: 0.0,
                    h: 0.0,
                    closed: false,
                    visited: false,
                    parent: None,
                })
            })
            .collect();
        Self { cols: columns.len(), rows: rows.len(), nodes }
    }

    fn index(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.cols && row < self.rows).then(|| row * self.cols + col)
    }

    /// Node sitting exactly on `p`.
    pub fn find(&self, p: Point) -> Option<usize> {
        (0..self.cols)
            .flat_map(|col| (0..self.rows).map(move |row| (col, row)))
            .filter_map(|(col, row)| self.index(col, row))
            .find(|&i| self.nodes[i].pos == p)
    }

    fn neighbors(&self, idx: usize) -> [Option<usize>; 4] {
        let Node { col, row, .. } = self.nodes[idx];
        [
            row.checked_sub(1).and_then(|r| self.index(col, r)),
            self.index(col + 1, row),
            self.index(col, row + 1),
            col.checked_sub(1).and_then(|c| self.index(c, row)),
        ]
    }
}

// =============================================================================
// Open set
// =============================================================================

/// Binary min-heap of node indices keyed by the node's `f` score.
///
/// Ties keep insertion-dependent order, which the route shape depends on,
/// so the sift rules only swap on strictly smaller scores.
#[derive(Debug, Default)]
struct OpenSet {
    items: Vec<usize>,
}

impl OpenSet {
    fn push(&mut self, node: usize, nodes: &[Node]) {
        self.items.push(node);
        self.sift_up(self.items.len() - 1, nodes);
    }

    fn pop(&mut self, nodes: &[Node]) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        let top = self.items.swap_remove(0);
        if !self.items.is_empty() {
            self.sift_down(0, nodes);
        }
        Some(top)
    }

    fn rescore(&mut self, node: usize, nodes: &[Node]) {
        if let Some(pos) = self.items.iter().position(|&n| n == node) {
            self.sift_up(pos, nodes);
        }
    }

    fn sift_up(&mut self, mut n: usize, nodes: &[Node]) {
        let score = nodes[self.items[n]].f;
        while n > 0 {
            let parent = ((n + 1) >> 1) - 1;
            if score < nodes[self.items[parent]].f {
                self.items.swap(n, parent);
                n = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut n: usize, nodes: &[Node]) {
        let len = self.items.len();
        let score = nodes[self.items[n]].f;
        loop {
            let right = (n + 1) << 1;
            let left = right - 1;
            let mut swap = None;
            let mut left_score = 0.0;
            if left < len {
                left_score = nodes[self.items[left]].f;
                if left_score < score {
                    swap = Some(left);
                }
            }
            if right < len {
                let right_score = nodes[self.items[right]].f;
                if right_score < if swap.is_none() { score } else { left_score } {
                    swap = Some(right);
                }
            }
            match swap {
                Some(s) => {
                    self.items.swap(n, s);
                    n = s;
                }
                None => break,
            }
        }
    }
}

// =============================================================================
// Search
// =============================================================================

/// Shortest orthogonal node path from `start` to `end`, or `None` when the
/// boxes wall the end off.
///
/// A grid segment whose midpoint lies strictly inside any of `obstacles` is
/// impassable. The path leaves `start` along `start_heading` and arrives at
/// `end` against `end_heading`.
pub(crate) fn astar(
    grid: &mut Grid,
    start: usize,
    end: usize,
    start_heading: Heading,
    end_heading: Heading,
    obstacles: &[Bounds],
) -> Option<Vec<Point>> {
    let end_pos = grid.nodes[end].pos;
    let bend = grid.nodes[start].pos.manhattan(end_pos);
    let mut open = OpenSet::default();
    open.push(start, &grid.nodes);

    while let Some(current) = open.pop(&grid.nodes) {
        let node = grid.nodes[current];
        if node.closed {
            continue;
        }
        if current == end {
            return Some(path_to(grid, start, current));
        }
        grid.nodes[current].closed = true;

        let previous = node.parent.map_or(start_heading, |p| Heading::from_vector(node.pos - grid.nodes[p].pos));

        for (neighbor, heading) in grid.neighbors(current).into_iter().zip(NEIGHBOR_HEADINGS) {
            let Some(neighbor) = neighbor else {
                continue;
            };
            let next = grid.nodes[neighbor];
            if next.closed {
                continue;
            }
            let half = next.pos.scale_from(node.pos, 0.5);
            if obstacles.iter().any(|b| b.contains_strict(half)) {
                continue;
            }
            let reverse = previous.flip() == heading
                || (neighbor == start && heading == start_heading)
                || (neighbor == end && heading == end_heading);
            if reverse {
                continue;
            }

            let turn = if previous == heading { 0.0 } else { bend.powi(3) };
            let g = node.g + next.pos.manhattan(node.pos) + turn;
            if !next.visited || g < next.g {
                let segments = estimate_segment_count(next.pos, end_pos, heading, end_heading);
                let slot = &mut grid.nodes[neighbor];
                slot.visited = true;
                slot.parent = Some(current);
                slot.h = end_pos.manhattan(next.pos) + f64::from(segments) * bend.powi(2);
                slot.g = g;
                slot.f = slot.g + slot.h;
                if next.visited {
                    open.rescore(neighbor, &grid.nodes);
                } else {
                    open.push(neighbor, &grid.nodes);
                }
            }
        }
    }
    None
}

fn path_to(grid: &Grid, start: usize, node: usize) -> Vec<Point> {
    let mut path = Vec::new();
    let mut current = node;
    while let Some(parent) = grid.nodes[current].parent {
        path.push(grid.nodes[current].pos);
        current = parent;
        if path.len() > grid.nodes.len() {
            break;
        }
    }
    path.push(grid.nodes[start].pos);
    path.reverse();
    path
}

/// Lower bound on the segments between a node left along `start_heading`
/// and the end entered against `end_heading`.
#[must_use]
pub(crate) fn estimate_segment_count(start: Point, end: Point, start_heading: Heading, end_heading: Heading) -> u8 {
    use Heading::{Down, Left, Right, Up};

    match (end_heading, start_heading) {
        (Right, Right) => {
            if start.x >= end.x {
                4
            } else if start.y == end.y {
                0
            } else {
                2
            }
        }
        (Right, Up) => {
            if start.y > end.y && start.x < end.x {
                1
            } else {
                3
            }
        }
        (Right, Down) => {
            if start.y < end.y && start.x < end.x {
                1
            } else {
                3
            }
        }
        (Right, Left) | (Left, Right) => {
            if start.y == end.y {
                4
            } else {
                2
            }
        }
        (Left, Up) => {
            if start.y > end.y && start.x > end.x {
                1
            } else {
                3
            }
        }
        (Left, Down) => {
            if start.y < end.y && start.x > end.x {
                1
            } else {
                3
            }
        }
        (Left, Left) => {
            if start.x <= end.x {
                4
            } else if start.y == end.y {
                0
            } else {
                2
            }
        }
        (Up, Right) => {
            if start.y > end.y && start.x < end.x {
                1
            } else {
                3
            }
        }
        (Up, Up) => {
            if start.y >= end.y {
                4
            } else if start.x == end.x {
                0
            } else {
                2
            }
        }
        (Up, Down) | (Down, Up) => {
            if start.x == end.x {
                4
            } else {
                2
            }
        }
        (Up, Left) => {
            if start.y > end.y && start.x > end.x {
                1
            } else {
                3
            }
        }
        (Down, Right) => {
            if start.y < end.y && start.x < end.x {
                1
            } else {
                3
            }
        }
        (Down, Down) => {
            if start.y <= end.y {
                4
            } else if start.x == end.x {
                0
            } else {
                2
            }
        }
        (Down, Left) => {
            if start.y < end.y && start.x > end.x {
                1
            } else {
                3
            }
        }
    }
}
