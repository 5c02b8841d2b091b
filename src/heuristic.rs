//! Distance heuristics.
//!
//! Two roles: `accurate` scores edges already taken (the real cost between a
//! node and the jump point reached from it), `estimate` orders the open list
//! by guessed remaining cost. An estimate larger than the true remaining
//! cost can make the search return a slightly non-optimal path; the default
//! pairing (Chebyshev accurate, Manhattan estimate) accepts that trade for
//! speed, like most uniform-grid pathfinders do.

use crate::{Pos, Score};

#[inline(always)]
pub(crate) fn manhattan(a: Pos, b: Pos) -> Score {
    (a.x.abs_diff(b.x) + a.y.abs_diff(b.y)) as Score
}

#[cfg(not(feature = "float-score"))]
#[inline(always)]
pub(crate) fn chebyshev(a: Pos, b: Pos) -> Score {
    a.x.abs_diff(b.x).max(a.y.abs_diff(b.y)) as Score
}

#[cfg(feature = "float-score")]
#[inline(always)]
pub(crate) fn euclidean(a: Pos, b: Pos) -> Score {
    let dx = a.x.abs_diff(b.x) as f32;
    let dy = a.y.abs_diff(b.y) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// Exact cost of the straight run between two aligned cells.
#[inline(always)]
pub(crate) fn accurate(a: Pos, b: Pos) -> Score {
    #[cfg(not(feature = "float-score"))]
    {
        chebyshev(a, b)
    }
    #[cfg(feature = "float-score")]
    {
        euclidean(a, b)
    }
}

/// Remaining-cost guess used to order the open list.
#[inline(always)]
pub(crate) fn estimate(a: Pos, b: Pos) -> Score {
    manhattan(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_sums_axes() {
        assert_eq!(manhattan(Pos::new(1, 2), Pos::new(4, 0)), 5 as Score);
        assert_eq!(manhattan(Pos::new(4, 0), Pos::new(1, 2)), 5 as Score);
    }

    #[cfg(not(feature = "float-score"))]
    #[test]
    fn chebyshev_takes_longer_axis() {
        assert_eq!(chebyshev(Pos::new(1, 2), Pos::new(4, 0)), 3);
        assert_eq!(chebyshev(Pos::new(0, 0), Pos::new(2, 7)), 7);
    }

    #[test]
    fn accurate_never_exceeds_estimate() {
        let cells = [
            Pos::new(0, 0),
            Pos::new(3, 1),
            Pos::new(7, 7),
            Pos::new(2, 9),
        ];
        for a in cells {
            for b in cells {
                assert!(accurate(a, b) <= estimate(a, b));
            }
        }
    }
}
