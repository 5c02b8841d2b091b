//! The search driver: incremental `init` / `step` / `finish` plus the
//! one-shot `find_path` wrapper.

use crate::heuristic;
use crate::node::{NodeArena, NodeIdx};
use crate::node_map::NodeMap;
use crate::pqueue::OpenList;
use crate::{Grid, OutOfMemory, Pos, PosType, SearchFlag, SearchFlags, SearchResult};

/// A reusable pathfinding context over a caller-supplied grid oracle.
///
/// The node arena, the position map and the open list are cleared — but not
/// freed — between searches, so a long-lived searcher stops allocating once
/// it has seen its largest search. [`Searcher::free_memory`] returns
/// everything to the system if that matters; it is never required.
///
/// A searcher is not reentrant and must not be shared between threads while
/// a search runs. Independent searchers over the same read-only grid can run
/// in parallel.
///
/// # Incremental searches
///
/// [`Searcher::find_path`] computes a whole path in one call. To spread the
/// work over several frames instead, call [`Searcher::init`], then
/// [`Searcher::step`] with a step budget until it stops returning
/// [`SearchResult::NeedMoreSteps`], then [`Searcher::finish`]:
///
/// ```
/// use gridjump::{Pos, Searcher, SearchFlag, SearchResult};
///
/// let grid = |x: u32, y: u32| x < 64 && y < 64;
/// let mut searcher = Searcher::new(grid);
///
/// let mut res = searcher.init(Pos::new(0, 0), Pos::new(63, 20), SearchFlag::NoGreedy.into());
/// while res == SearchResult::NeedMoreSteps {
///     res = searcher.step(100);
/// }
/// assert_eq!(res, SearchResult::FoundPath);
///
/// let mut path = Vec::new();
/// assert_eq!(searcher.finish(&mut path, 0), SearchResult::FoundPath);
/// assert_eq!(path.last(), Some(&Pos::new(63, 20)));
/// ```
///
/// The grid must not change between `step` calls; a path computed across a
/// mutation may cross cells that are no longer walkable.
pub struct Searcher<G> {
    pub(crate) grid: G,
    pub(crate) storage: NodeArena,
    pub(crate) open: OpenList,
    pub(crate) map: NodeMap,
    pub(crate) end_pos: Pos,
    pub(crate) end_idx: Option<NodeIdx>,
    pub(crate) flags: SearchFlags,
    pub(crate) steps_remain: i64,
    pub(crate) steps_done: usize,
}

impl<G: Grid> Searcher<G> {
    pub fn new(grid: G) -> Self {
        Searcher {
            grid,
            storage: NodeArena::new(),
            open: OpenList::new(),
            map: NodeMap::new(),
            end_pos: Pos::new(PosType::MAX, PosType::MAX),
            end_idx: None,
            flags: SearchFlags::new(),
            steps_remain: 0,
            steps_done: 0,
        }
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    fn clear(&mut self) {
        self.open.clear();
        self.map.clear();
        self.storage.clear();
        self.end_idx = None;
        self.steps_done = 0;
    }

    /// Starts a search, aborting any search already in flight.
    ///
    /// Returns [`SearchResult::NeedMoreSteps`] when the main loop has work
    /// to do, or a terminal result right away: the greedy shortcut may find
    /// the path immediately, start == end yields
    /// [`SearchResult::EmptyPath`], and a blocked endpoint (without the
    /// corresponding no-check flag) yields [`SearchResult::NoPath`].
    pub fn init(&mut self, start: Pos, end: Pos, flags: SearchFlags) -> SearchResult {
        self.clear();
        self.flags = flags;
        self.end_pos = end;

        if start == end && flags.is_disjoint(SearchFlag::NoStartCheck | SearchFlag::NoEndCheck) {
            // The start cell is omitted from the output, so there is nothing
            // to emit; the only question is whether the one cell is walkable.
            return if self.grid.walkable(end.x, end.y) {
                SearchResult::EmptyPath
            } else {
                SearchResult::NoPath
            };
        }

        if !flags.contains(SearchFlag::NoStartCheck) && !self.grid.walkable(start.x, start.y) {
            return SearchResult::NoPath;
        }
        if !flags.contains(SearchFlag::NoEndCheck) && !self.grid.walkable(end.x, end.y) {
            return SearchResult::NoPath;
        }

        let Ok(end_idx) = self.map.lookup_or_create(&mut self.storage, end) else {
            return SearchResult::OutOfMemory;
        };
        self.end_idx = Some(end_idx);
        let Ok(start_idx) = self.map.lookup_or_create(&mut self.storage, start) else {
            return SearchResult::OutOfMemory;
        };

        if start != end
            && !flags.contains(SearchFlag::NoGreedy)
            && self.find_path_greedy(start_idx, end_idx)
        {
            return SearchResult::FoundPath;
        }

        if self.open.push(&self.storage, start_idx).is_err() {
            return SearchResult::OutOfMemory;
        }
        self.storage.get_mut(start_idx).set_open();
        SearchResult::NeedMoreSteps
    }

    /// Runs the main loop until the search terminates or the step budget is
    /// spent. `limit == 0` means no budget: run to a terminal result in this
    /// call. The budget is measured in scanned cells (or expanded
    /// neighborhoods in A* mode), not popped nodes; tune it against
    /// [`Searcher::steps_done`] from representative searches.
    pub fn step(&mut self, limit: u32) -> SearchResult {
        self.steps_remain = i64::from(limit);
        loop {
            let Some(idx) = self.open.pop(&self.storage) else {
                return SearchResult::NoPath;
            };
            self.storage.get_mut(idx).set_closed();
            if self.storage.get(idx).pos == self.end_pos {
                return SearchResult::FoundPath;
            }
            if self.identify_successors(idx).is_err() {
                return SearchResult::OutOfMemory;
            }
            if limit != 0 && self.steps_remain < 0 {
                return SearchResult::NeedMoreSteps;
            }
        }
    }

    /// Relaxes the edge from `parent` to the jump point `succ`.
    pub(crate) fn relax(&mut self, succ: NodeIdx, parent: NodeIdx) -> Result<(), OutOfMemory> {
        let parent_node = *self.storage.get(parent);
        let node = self.storage.get(succ);
        let new_g = parent_node.g + heuristic::accurate(node.pos, parent_node.pos);
        if !node.is_open() || new_g < node.g {
            let pos = node.pos;
            let was_open = node.is_open();
            let node = self.storage.get_mut(succ);
            node.g = new_g;
            node.f = new_g + heuristic::estimate(pos, self.end_pos);
            self.storage.set_parent(succ, parent);
            if was_open {
                self.open.fix(&self.storage, succ);
            } else {
                self.open.push(&self.storage, succ)?;
                self.storage.get_mut(succ).set_open();
            }
        }
        Ok(())
    }

    /// Emits the found path into `path`, appending to its existing contents.
    ///
    /// The start cell is omitted; the end cell is the last element.
    /// `stride == 0` emits waypoints only. `stride == k > 0` additionally
    /// emits a cell every `k` steps along each straight run (waypoints are
    /// always emitted regardless).
    ///
    /// Returns [`SearchResult::NoPath`] when no completed search is
    /// available, and [`SearchResult::OutOfMemory`] when `path` cannot grow
    /// — in that case `path` is untouched and `finish` can be retried.
    pub fn finish(&self, path: &mut Vec<Pos>, stride: u32) -> SearchResult {
        let Some(end_idx) = self.end_idx else {
            return SearchResult::NoPath;
        };
        if self.storage.parent_of(end_idx).is_none() {
            return SearchResult::NoPath;
        }

        // Count first so the whole reservation can fail before anything is
        // appended.
        let mut count = 0usize;
        self.walk_path(end_idx, stride, &mut |_| count += 1);
        if path.try_reserve(count).is_err() {
            return SearchResult::OutOfMemory;
        }

        let offset = path.len();
        self.walk_path(end_idx, stride, &mut |pos| path.push(pos));
        // The parent chain runs goal-to-start.
        path[offset..].reverse();
        SearchResult::FoundPath
    }

    /// Walks the parent chain from the goal, feeding `emit` each output cell
    /// in goal-to-start order.
    fn walk_path(&self, end_idx: NodeIdx, stride: u32, emit: &mut impl FnMut(Pos)) {
        if stride == 0 {
            let mut next = end_idx;
            while let Some(prev) = self.storage.parent_of(next) {
                emit(self.storage.get(next).pos);
                next = prev;
            }
            return;
        }

        let mut next = end_idx;
        let Some(mut prev) = self.storage.parent_of(next) else {
            return;
        };
        loop {
            let npos = self.storage.get(next).pos;
            let ppos = self.storage.get(prev).pos;
            let dx = i64::from(ppos.x) - i64::from(npos.x);
            let dy = i64::from(ppos.y) - i64::from(npos.y);
            // Runs between waypoints are straight: axis-aligned or exactly
            // diagonal.
            debug_assert!(dx == 0 || dy == 0 || dx.abs() == dy.abs());
            let steps = dx.abs().max(dy.abs());
            let step_x = dx.signum() * i64::from(stride);
            let step_y = dy.signum() * i64::from(stride);
            let (mut off_x, mut off_y) = (0i64, 0i64);
            let mut i = 0i64;
            while i < steps {
                emit(Pos::new(
                    (i64::from(npos.x) + off_x) as PosType,
                    (i64::from(npos.y) + off_y) as PosType,
                ));
                off_x += step_x;
                off_y += step_y;
                i += i64::from(stride);
            }
            next = prev;
            match self.storage.parent_of(next) {
                Some(p) => prev = p,
                None => break,
            }
        }
    }

    /// Computes a whole path in one call; see [`crate::find_path`] for the
    /// output conventions. Returns true when a path was found, including the
    /// empty start-equals-end path (which appends nothing).
    pub fn find_path(
        &mut self,
        path: &mut Vec<Pos>,
        start: Pos,
        end: Pos,
        stride: u32,
        flags: SearchFlags,
    ) -> bool {
        let mut res = self.init(start, end, flags);
        if res == SearchResult::EmptyPath {
            return true;
        }
        loop {
            match res {
                SearchResult::NeedMoreSteps => res = self.step(0),
                SearchResult::FoundPath => {
                    return self.finish(path, stride) == SearchResult::FoundPath
                }
                _ => return false,
            }
        }
    }

    /// Releases all internal memory, aborting any in-flight search. Never
    /// required — the next search simply reallocates.
    pub fn free_memory(&mut self) {
        self.open.release();
        self.map.release();
        self.storage.release();
        self.end_idx = None;
        self.steps_done = 0;
    }

    /// Cells scanned by the jump scanners (plus 8 per A*-mode expansion)
    /// since the last `init`. The unit in which [`Searcher::step`] budgets
    /// work.
    pub fn steps_done(&self) -> usize {
        self.steps_done
    }

    /// Nodes materialized in the arena by the current search.
    pub fn nodes_expanded(&self) -> usize {
        self.storage.len()
    }

    /// Bytes held by the arena, the position map and the open list.
    pub fn total_memory_in_use(&self) -> usize {
        self.storage.mem_size() + self.map.mem_size() + self.open.mem_size()
    }
}
