//! The greedy straight-line shortcut attempted before opening the search.
//!
//! Most queries on live maps are short hops with nothing in the way; walking
//! the direct line first avoids JPS's area scans entirely for those. The
//! walk goes diagonally until aligned with the goal, then straight along the
//! remaining axis — the same shape an optimal unobstructed path has, so
//! taking it never loses optimality.

use crate::node::NodeIdx;
use crate::searcher::Searcher;
use crate::{Grid, Pos, PosType};

impl<G: Grid> Searcher<G> {
    /// Walks the direct line from start to end, checking every cell. On
    /// success, links `start → (corner) → end` through parent offsets,
    /// materializing at most one corner node, and returns true. Any blocked
    /// cell — or a failed corner-node allocation — returns false, and the
    /// caller falls back to the full search.
    pub(crate) fn find_path_greedy(&mut self, start_idx: NodeIdx, end_idx: NodeIdx) -> bool {
        let start = self.storage.get(start_idx).pos;
        let end = self.storage.get(end_idx).pos;
        debug_assert_ne!(start, end);

        let mut x = start.x;
        let mut y = start.y;
        let dx = (i64::from(end.x) - i64::from(x)).signum() as i32;
        let dy = (i64::from(end.y) - i64::from(y)).signum() as i32;
        let mut corner: Option<Pos> = None;

        // Diagonal leg, until aligned with the goal on one axis.
        if x != end.x && y != end.y {
            let diag_len = end.x.abs_diff(x).min(end.y.abs_diff(y));
            let tx = (i64::from(x) + i64::from(dx) * i64::from(diag_len)) as PosType;
            while x != tx {
                if self.grid.walkable(x, y)
                    && (self.grid.walkable(x.wrapping_add_signed(dx), y)
                        || self.grid.walkable(x, y.wrapping_add_signed(dy)))
                {
                    x = x.wrapping_add_signed(dx);
                    y = y.wrapping_add_signed(dy);
                } else {
                    return false;
                }
            }
            if !self.grid.walkable(x, y) {
                return false;
            }
            corner = Some(Pos::new(x, y));
        }

        // Cardinal leg along whichever axis still differs.
        if !(x == end.x && y == end.y) {
            while x != end.x {
                x = x.wrapping_add_signed(dx);
                if !self.grid.walkable(x, y) {
                    return false;
                }
            }
            while y != end.y {
                y = y.wrapping_add_signed(dy);
                if !self.grid.walkable(x, y) {
                    return false;
                }
            }
        }

        match corner {
            Some(corner) => {
                // A purely diagonal line ends at the goal itself; the lookup
                // then returns the end node and only the start link is set.
                let Ok(mid_idx) = self.map.lookup_or_create(&mut self.storage, corner) else {
                    return false;
                };
                self.storage.set_parent(mid_idx, start_idx);
                if mid_idx != end_idx {
                    self.storage.set_parent(end_idx, mid_idx);
                }
            }
            None => self.storage.set_parent(end_idx, start_idx),
        }
        true
    }
}
