use std::cmp::Ordering;
use std::sync::{Mutex, PoisonError};

use glam::Vec3;
use grid_util::Point;
use log::{debug, warn};

use crate::config::SearchConfig;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::heap::{HeapItem, PriorityHeap};
use crate::{simplify_path, C, D, E};

const NO_PARENT: usize = usize::MAX;

/// Open set entry for a cell.
#[derive(Clone, Copy, Debug)]
struct OpenNode {
    index: usize,
    g_cost: i32,
    h_cost: i32,
}

impl OpenNode {
    fn f_cost(&self) -> i32 {
        self.g_cost.saturating_add(self.h_cost)
    }
}

impl Eq for OpenNode {}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lowest estimated total cost ranks highest. Ties go to the node closer to the goal, then
        // to the lower cell index so that the expansion order is fully determined.
        other
            .f_cost()
            .cmp(&self.f_cost())
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl HeapItem for OpenNode {
    fn heap_key(&self) -> usize {
        self.index
    }
}

/// Scratch state of a single query, indexed by cell. A context can be reused for any number of
/// queries against grids of the same size; it is reset at the start of each one.
#[derive(Clone, Debug)]
pub struct SearchContext {
    g_cost: Vec<i32>,
    h_cost: Vec<i32>,
    parent: Vec<usize>,
    closed: Vec<bool>,
    open: PriorityHeap<OpenNode>,
}

impl SearchContext {
    pub fn new(max_size: usize) -> SearchContext {
        SearchContext {
            g_cost: vec![0; max_size],
            h_cost: vec![0; max_size],
            parent: vec![NO_PARENT; max_size],
            closed: vec![false; max_size],
            open: PriorityHeap::with_capacity(max_size),
        }
    }

    fn reset(&mut self, max_size: usize) {
        if self.open.capacity() != max_size {
            *self = SearchContext::new(max_size);
            return;
        }
        self.g_cost.fill(0);
        self.h_cost.fill(0);
        self.parent.fill(NO_PARENT);
        self.closed.fill(false);
        self.open.clear();
    }
}

/// A path through the grid, from the start cell to the goal cell, both included.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    pub cells: Vec<Point>,
    /// World-space centres of `cells`.
    pub positions: Vec<Vec3>,
    /// Sum of move costs and destination penalties over all steps.
    pub cost: i32,
}

impl Path {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells at which the path changes direction, plus both ends.
    pub fn waypoints(&self) -> Vec<Point> {
        simplify_path(&self.cells)
    }
}

/// Octile distance in cost units: as many diagonal steps as possible, then straight.
fn octile_distance(dx: i32, dy: i32) -> i32 {
    // Formula from https://github.com/riscy/a_star_on_grids
    (E * (dx - dy).abs() + D * (dx + dy)) / 2
}

/// A* search over a [Grid]. Moves go to any of the 8 surrounding walkable cells, costing [C]
/// straight or [D] diagonally plus the destination's movement penalty.
///
/// [find_path](Self::find_path) takes `&self` and runs on an internal [SearchContext] guarded by
/// a mutex, so concurrent calls are serialised. Callers that want queries to run in parallel can
/// give each thread its own context and use [find_path_with](Self::find_path_with).
#[derive(Debug)]
pub struct Pathfinder {
    grid: Grid,
    config: SearchConfig,
    context: Mutex<SearchContext>,
}

impl Pathfinder {
    pub fn new(grid: Grid, config: SearchConfig) -> Pathfinder {
        let context = Mutex::new(SearchContext::new(grid.max_size()));
        Pathfinder {
            grid,
            config,
            context,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// A context sized for this pathfinder's grid.
    pub fn new_context(&self) -> SearchContext {
        SearchContext::new(self.grid.max_size())
    }

    /// Computes the cheapest path between the cells nearest to `start` and `target`.
    pub fn find_path(&self, start: Vec3, target: Vec3) -> Result<Path> {
        // The context is reset before use, so a panic in an earlier query leaves nothing behind
        let mut ct = self.context.lock().unwrap_or_else(PoisonError::into_inner);
        self.find_path_with(&mut ct, start, target)
    }

    /// Like [find_path](Self::find_path), but with caller-owned scratch state.
    pub fn find_path_with(
        &self,
        ctx: &mut SearchContext,
        start: Vec3,
        target: Vec3,
    ) -> Result<Path> {
        let start_ix = self.grid.cell_index_at(start);
        let target_ix = self.grid.cell_index_at(target);
        if !self.grid.connected(start_ix, target_ix) {
            debug!(
                "{:?} is not reachable from {:?}",
                self.point(target_ix),
                self.point(start_ix)
            );
            return Err(self.no_path(start_ix, target_ix));
        }
        let goal = self.point(target_ix);
        self.search(
            ctx,
            start_ix,
            target_ix,
            |p| octile_distance((p.x - goal.x).abs(), (p.y - goal.y).abs()),
            |ix| ix == target_ix,
        )
    }

    /// Computes a path that ends on the target cell or on any cell next to it. Useful when the
    /// target itself is blocked, such as when walking up to an obstacle.
    pub fn find_path_approximate(&self, start: Vec3, target: Vec3) -> Result<Path> {
        let mut ct = self.context.lock().unwrap_or_else(PoisonError::into_inner);
        self.find_path_approximate_with(&mut ct, start, target)
    }

    pub fn find_path_approximate_with(
        &self,
        ctx: &mut SearchContext,
        start: Vec3,
        target: Vec3,
    ) -> Result<Path> {
        let start_ix = self.grid.cell_index_at(start);
        let target_ix = self.grid.cell_index_at(target);
        let reachable = self.grid.connected(start_ix, target_ix)
            || self
                .grid
                .neighbor_indices(target_ix)
                .into_iter()
                .any(|n| self.grid.connected(start_ix, n));
        if !reachable {
            debug!(
                "No cell around {:?} is reachable from {:?}",
                self.point(target_ix),
                self.point(start_ix)
            );
            return Err(self.no_path(start_ix, target_ix));
        }
        let goal = self.point(target_ix);
        // Distance to the nearest cell of the 3x3 block around the goal
        self.search(
            ctx,
            start_ix,
            target_ix,
            |p| {
                let dx = ((p.x - goal.x).abs() - 1).max(0);
                let dy = ((p.y - goal.y).abs() - 1).max(0);
                octile_distance(dx, dy)
            },
            |ix| {
                let p = self.point(ix);
                (p.x - goal.x).abs() <= 1 && (p.y - goal.y).abs() <= 1
            },
        )
    }

    fn point(&self, ix: usize) -> Point {
        self.grid.node_by_index(ix).point()
    }

    fn no_path(&self, start_ix: usize, target_ix: usize) -> Error {
        Error::NoPathFound {
            start: self.point(start_ix),
            target: self.point(target_ix),
        }
    }

    fn search<FH, FS>(
        &self,
        ctx: &mut SearchContext,
        start: usize,
        target: usize,
        heuristic: FH,
        success: FS,
    ) -> Result<Path>
    where
        FH: Fn(Point) -> i32,
        FS: Fn(usize) -> bool,
    {
        let grid = &self.grid;
        let scaled_heuristic =
            |ix: usize| (heuristic(self.point(ix)) as f32 * self.config.heuristic_factor) as i32;
        ctx.reset(grid.max_size());

        let h = scaled_heuristic(start);
        ctx.h_cost[start] = h;
        ctx.open.insert(OpenNode {
            index: start,
            g_cost: 0,
            h_cost: h,
        })?;

        let mut expansions = 0;
        while let Some(current) = ctx.open.extract_top() {
            let ci = current.index;
            ctx.closed[ci] = true;
            if success(ci) {
                debug!("Found path after {} expansions", expansions);
                return Ok(self.reconstruct_path(ctx, start, ci));
            }
            if let Some(budget) = self.config.max_expansions {
                if expansions >= budget {
                    warn!("Search budget of {} expansions exhausted", budget);
                    return Err(Error::BudgetExhausted { expansions });
                }
            }
            expansions += 1;

            let current_node = grid.node_by_index(ci);
            for ni in grid.neighbor_indices(ci) {
                let neighbor = grid.node_by_index(ni);
                if !neighbor.walkable || ctx.closed[ni] {
                    continue;
                }
                let step = if current_node.is_diagonal_to(neighbor) { D } else { C };
                let new_cost = current.g_cost.saturating_add(step + neighbor.movement_penalty);
                let in_open = ctx.open.contains(ni);
                if in_open && new_cost >= ctx.g_cost[ni] {
                    continue;
                }
                ctx.g_cost[ni] = new_cost;
                ctx.h_cost[ni] = scaled_heuristic(ni);
                ctx.parent[ni] = ci;
                let entry = OpenNode {
                    index: ni,
                    g_cost: new_cost,
                    h_cost: ctx.h_cost[ni],
                };
                if in_open {
                    ctx.open.reprioritize(entry);
                } else {
                    ctx.open.insert(entry)?;
                }
            }
        }
        warn!(
            "Open set exhausted after {} expansions, is the component check correct?",
            expansions
        );
        Err(self.no_path(start, target))
    }

    fn reconstruct_path(&self, ctx: &SearchContext, start: usize, end: usize) -> Path {
        let mut indices: Vec<usize> =
            std::iter::successors(Some(end), |&ix| (ix != start).then(|| ctx.parent[ix]))
                .collect();
        indices.reverse();
        let nodes = indices.iter().map(|&ix| self.grid.node_by_index(ix));
        Path {
            cells: nodes.clone().map(|n| n.point()).collect(),
            positions: nodes.map(|n| n.world_position).collect(),
            cost: ctx.g_cost[end],
        }
    }
}
