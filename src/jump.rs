//! Successor enumeration and the jump scanners.
//!
//! JPS expands a node into jump points rather than adjacent cells: for each
//! pruned neighbor direction, a scanner walks the grid in a straight line
//! until it hits the goal, a cell with a forced neighbor, or an obstacle.
//! Only the first two become successors. The scanners account every cell
//! they visit against the searcher's step budget, which is what makes
//! incremental stepping possible.

use smallvec::SmallVec;

use crate::node::NodeIdx;
use crate::searcher::Searcher;
use crate::{Grid, OutOfMemory, Pos, SearchFlag};

type NeighborBuf = SmallVec<[Pos; 8]>;

impl<G: Grid> Searcher<G> {
    #[inline(always)]
    fn walk(&self, p: Pos, dx: i32, dy: i32) -> bool {
        let q = p.offset(dx, dy);
        self.grid.walkable(q.x, q.y)
    }

    /// Expands a freshly popped node: enumerates its pruned neighbors, jump
    /// scans each of them, and relaxes every successor that is not closed.
    pub(crate) fn identify_successors(&mut self, idx: NodeIdx) -> Result<(), OutOfMemory> {
        let pos = self.storage.get(idx).pos;
        let astar = self.flags.contains(SearchFlag::AStarOnly);

        let mut buf = NeighborBuf::new();
        if astar {
            self.neighbors_astar(pos, &mut buf);
        } else {
            self.neighbors_jps(idx, &mut buf);
        }

        for &neighbor in &buf {
            // Neighbors are emitted walkable, so the scanners may start
            // from them directly.
            let target = if astar { Some(neighbor) } else { self.jump(neighbor, pos) };
            let Some(jp) = target else { continue };

            let succ = self.map.lookup_or_create(&mut self.storage, jp)?;
            debug_assert_ne!(succ, idx, "a jump scan returned its own origin");
            if !self.storage.get(succ).is_closed() {
                self.relax(succ, idx)?;
            }
        }
        Ok(())
    }

    /// The pruned neighbor set of `idx`, derived from the direction the node
    /// was reached from.
    fn neighbors_jps(&self, idx: NodeIdx, out: &mut NeighborBuf) {
        let pos = self.storage.get(idx).pos;

        let Some(parent) = self.storage.parent_of(idx) else {
            // Start node: every walkable neighbor. Diagonals additionally
            // need a walkable flanking cardinal so the first move cannot
            // cut a corner.
            for (dx, dy) in [(-1, 0), (0, -1), (0, 1), (1, 0)] {
                if self.walk(pos, dx, dy) {
                    out.push(pos.offset(dx, dy));
                }
            }
            for (dx, dy) in [(-1, -1), (-1, 1), (1, -1), (1, 1)] {
                if (self.walk(pos, dx, 0) || self.walk(pos, 0, dy)) && self.walk(pos, dx, dy) {
                    out.push(pos.offset(dx, dy));
                }
            }
            return;
        };

        let ppos = self.storage.get(parent).pos;
        let dx = (i64::from(pos.x) - i64::from(ppos.x)).signum() as i32;
        let dy = (i64::from(pos.y) - i64::from(ppos.y)).signum() as i32;

        if dx != 0 && dy != 0 {
            // Natural neighbors of a diagonal move.
            let walk_x = self.walk(pos, dx, 0);
            if walk_x {
                out.push(pos.offset(dx, 0));
            }
            let walk_y = self.walk(pos, 0, dy);
            if walk_y {
                out.push(pos.offset(0, dy));
            }
            if (walk_x || walk_y) && self.walk(pos, dx, dy) {
                out.push(pos.offset(dx, dy));
            }
            // Forced neighbors appear where a blocked cell sits against the
            // travel direction.
            if walk_y && !self.walk(pos, -dx, 0) && self.walk(pos, -dx, dy) {
                out.push(pos.offset(-dx, dy));
            }
            if walk_x && !self.walk(pos, 0, -dy) && self.walk(pos, dx, -dy) {
                out.push(pos.offset(dx, -dy));
            }
        } else if dx != 0 {
            if self.walk(pos, dx, 0) {
                out.push(pos.offset(dx, 0));
                if !self.walk(pos, 0, 1) && self.walk(pos, dx, 1) {
                    out.push(pos.offset(dx, 1));
                }
                if !self.walk(pos, 0, -1) && self.walk(pos, dx, -1) {
                    out.push(pos.offset(dx, -1));
                }
            }
        } else if dy != 0 {
            if self.walk(pos, 0, dy) {
                out.push(pos.offset(0, dy));
                if !self.walk(pos, 1, 0) && self.walk(pos, 1, dy) {
                    out.push(pos.offset(1, dy));
                }
                if !self.walk(pos, -1, 0) && self.walk(pos, -1, dy) {
                    out.push(pos.offset(-1, dy));
                }
            }
        }
    }

    /// Plain A* mode: the full 8-neighborhood, with the same anti-tunneling
    /// rule on diagonals.
    fn neighbors_astar(&mut self, pos: Pos, out: &mut NeighborBuf) {
        for (dx, dy) in [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ] {
            if dx != 0 && dy != 0 && !(self.walk(pos, dx, 0) || self.walk(pos, 0, dy)) {
                continue;
            }
            if self.walk(pos, dx, dy) {
                out.push(pos.offset(dx, dy));
            }
        }
        self.steps_done += 8;
        self.steps_remain -= 8;
    }

    /// Scans from the walkable cell `p` away from `src` for the next jump
    /// point; `None` when the scan dead-ends first.
    fn jump(&mut self, p: Pos, src: Pos) -> Option<Pos> {
        let dx = (i64::from(p.x) - i64::from(src.x)).signum() as i32;
        let dy = (i64::from(p.y) - i64::from(src.y)).signum() as i32;
        debug_assert!(dx != 0 || dy != 0);

        if dx != 0 && dy != 0 {
            self.jump_diag(p, dx, dy)
        } else if dx != 0 {
            self.jump_x(p, dx)
        } else {
            self.jump_y(p, dy)
        }
    }

    /// Cardinal scan along the x axis.
    ///
    /// `a` holds, inverted, the walkability of the two cells perpendicular
    /// to the direction at the current column; `b` holds it for the next
    /// column. A bit set in `a & b` means a perpendicular neighbor opens up
    /// right after being blocked — the current cell has a forced neighbor
    /// and the scan stops there.
    fn jump_x(&mut self, mut p: Pos, dx: i32) -> Option<Pos> {
        debug_assert!(dx == -1 || dx == 1);
        let mut steps = 0usize;
        let mut a = !(self.walk(p, 0, 1) as u32 | (self.walk(p, 0, -1) as u32) << 1);

        let found = loop {
            let b = self.walk(p, dx, 1) as u32 | (self.walk(p, dx, -1) as u32) << 1;
            if a & b != 0 || p == self.end_pos {
                break Some(p);
            }
            if !self.walk(p, dx, 0) {
                break None;
            }
            p = p.offset(dx, 0);
            a = !b;
            steps += 1;
        };

        self.steps_done += steps;
        self.steps_remain -= steps as i64;
        found
    }

    /// Cardinal scan along the y axis; mirror of [`Searcher::jump_x`].
    fn jump_y(&mut self, mut p: Pos, dy: i32) -> Option<Pos> {
        debug_assert!(dy == -1 || dy == 1);
        let mut steps = 0usize;
        let mut a = !(self.walk(p, 1, 0) as u32 | (self.walk(p, -1, 0) as u32) << 1);

        let found = loop {
            let b = self.walk(p, 1, dy) as u32 | (self.walk(p, -1, dy) as u32) << 1;
            if a & b != 0 || p == self.end_pos {
                break Some(p);
            }
            if !self.walk(p, 0, dy) {
                break None;
            }
            p = p.offset(0, dy);
            a = !b;
            steps += 1;
        };

        self.steps_done += steps;
        self.steps_remain -= steps as i64;
        found
    }

    /// Diagonal scan. The current cell is a jump point when a forced
    /// pattern appears beside it, or when a cardinal sub-scan along either
    /// axis can reach one from it. Advancing requires the diagonal target
    /// and at least one flanking cardinal to be walkable, so the scan can
    /// never slip between two touching corners.
    fn jump_diag(&mut self, mut p: Pos, dx: i32, dy: i32) -> Option<Pos> {
        debug_assert!((dx == -1 || dx == 1) && (dy == -1 || dy == 1));
        let mut steps = 0usize;

        let found = loop {
            if p == self.end_pos {
                break Some(p);
            }
            steps += 1;

            if (self.walk(p, -dx, dy) && !self.walk(p, -dx, 0))
                || (self.walk(p, dx, -dy) && !self.walk(p, 0, -dy))
            {
                break Some(p);
            }

            let walk_x = self.walk(p, dx, 0);
            let walk_y = self.walk(p, 0, dy);
            if walk_x && self.jump_x(p.offset(dx, 0), dx).is_some() {
                break Some(p);
            }
            if walk_y && self.jump_y(p.offset(0, dy), dy).is_some() {
                break Some(p);
            }

            if (walk_x || walk_y) && self.walk(p, dx, dy) {
                p = p.offset(dx, dy);
            } else {
                break None;
            }
        };

        self.steps_done += steps;
        self.steps_remain -= steps as i64;
        found
    }
}
