/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Grid cursors.
//!
//! A cursor is mutable traversal state bound to one [`Grid`] and one
//! [`Region`]. It is always in exactly one of two observable states:
//! on a position of the region, or past the last one ("at end").
//! Cursor kinds differ in *which* positions they visit and in which
//! order:
//!
//! | kind                     | order                                   | reverse |
//! |--------------------------|-----------------------------------------|---------|
//! | [`Linear`]               | row-major                               | yes     |
//! | [`Sequential`]           | row-major                               | no      |
//! | [`Scanline`]             | row-major, line by line                 | yes     |
//! | [`Subsampled<STEP>`]     | every `STEP`-th coordinate on each axis | yes     |
//! | [`RandomSample`]         | seeded draws with replacement           | yes     |
//! | [`RandomPermutation`]    | seeded permutation of the region        | yes     |
//!
//! Reverse movement is a separate capability, [`ReverseCursor`], so a
//! forward-only kind cannot be used where reverse traversal is
//! required; this is checked by the compiler rather than at run time.
//!
//! Each cursor also reports an *ordinal*: the number of steps from
//! the beginning of its traversal to its current state. Two cursors
//! of the same kind bound to the same region visit the same sequence
//! of positions, so equal ordinals imply equal positions.

use num_traits::Zero;

use crate::Point;
use crate::Region;
use crate::RegionError;
use crate::grid::Grid;
use crate::grid::GridMut;

pub mod linear;
pub mod random;
pub mod scanline;
pub mod subsampled;

pub use linear::Linear;
pub use linear::LinearCursor;
pub use linear::Sequential;
pub use linear::SequentialCursor;
pub use random::RandomPermutation;
pub use random::RandomSample;
pub use random::SampledCursor;
pub use scanline::Scanline;
pub use scanline::ScanlineCursor;
pub use subsampled::Subsampled;
pub use subsampled::SubsampledCursor;

/// The type of error for cursor binding and movement.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CursorError {
    #[error("cannot advance past the end of the traversal")]
    PastEnd,

    #[error("cannot retreat before the beginning of the traversal")]
    BeforeBegin,

    #[error(transparent)]
    RegionError(#[from] RegionError),
}

/// Forward traversal over the positions of a region.
///
/// `advance` at end is a no-op. Implementations must keep
/// `is_at_end` and `position` free of side effects.
pub trait GridCursor: Sized {
    /// The grid handle this cursor reads (and possibly writes).
    type Grid: Grid;

    /// Bind a new cursor to `region` of `grid`. The region must lie
    /// within the grid. The cursor's state is unspecified until
    /// [`GridCursor::go_to_begin`] or [`GridCursor::go_to_end`] is
    /// called.
    fn bind(grid: Self::Grid, region: &Region) -> Result<Self, CursorError>;

    /// The region this cursor walks.
    fn region(&self) -> &Region;

    /// The grid this cursor is bound to.
    fn grid(&self) -> &Self::Grid;

    /// Move to the first position, or to the end when there is none.
    fn go_to_begin(&mut self);

    /// Move past the last position.
    fn go_to_end(&mut self);

    /// Move to the next position.
    fn advance(&mut self);

    /// Whether the cursor is past the last position.
    fn is_at_end(&self) -> bool;

    /// The current position, or `None` at end.
    fn position(&self) -> Option<&Point>;

    /// Steps taken from the beginning of the traversal. Equals
    /// [`GridCursor::len`] at end.
    fn ordinal(&self) -> usize;

    /// The number of steps in a full traversal.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the cursor is on the first step of its own traversal.
    fn is_at_begin(&self) -> bool {
        !self.is_at_end() && self.ordinal() == 0
    }

    /// The value under the cursor.
    fn value(&self) -> Option<&<Self::Grid as Grid>::Value> {
        self.position().and_then(|p| self.grid().get(p))
    }

    /// Mutable access to the value under the cursor.
    fn value_mut(&mut self) -> Option<&mut <Self::Grid as Grid>::Value>
    where
        Self::Grid: GridMut;

    /// Whether the value under the cursor is zero. Positions without
    /// a value count as zero.
    fn value_is_zero(&self) -> bool
    where
        <Self::Grid as Grid>::Value: Zero,
    {
        self.value().map_or(true, Zero::is_zero)
    }
}

/// Backward movement. Retreating from the first step is a no-op.
pub trait ReverseCursor: GridCursor {
    /// Move to the previous position. From the end this is the last
    /// position.
    fn retreat(&mut self);
}

/// A family of cursors sharing one traversal order.
///
/// Kinds are zero-sized markers; the cursor for a particular grid
/// handle is `K::Cursor<G>`. Parameterising over the kind rather than
/// the cursor type ties the cursors of one traversal to the same
/// order, whatever grids they are bound to.
pub trait CursorKind {
    /// A short name for diagnostics.
    const NAME: &'static str;

    type Cursor<G: Grid>: GridCursor<Grid = G>;
}

/// Check that `region` is addressable in `grid`.
pub(crate) fn check_bounds<G: Grid>(grid: &G, region: &Region) -> Result<(), CursorError> {
    region.enforce_within(grid.sizes())?;
    Ok(())
}
