/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Masked traversal of N-dimensional grids.
//!
//! Provides [`MaskedCursor`], which decorates any grid cursor so that
//! it visits only the positions of a [`Region`] where a companion
//! mask grid is non-zero. See [`MaskedCursor`] for more details.
//!
//! The building blocks are:
//! - [`Point`] and [`Region`]: coordinates and rectangular regions,
//!   ordered row-major;
//! - [`Grid`] and [`GridMut`]: read and write access to grids, with
//!   [`Image`] as a dense in-memory grid;
//! - [`GridCursor`], [`ReverseCursor`] and [`CursorKind`]: traversal
//!   state and the kinds of traversal on offer (see [`cursor`]).

mod point;
pub use point::Point;

mod region;
pub use region::Region;
pub use region::RegionError;
pub use region::RegionIterator;

/// Grid access traits and a dense grid.
pub mod grid;
pub use grid::Grid;
pub use grid::GridError;
pub use grid::GridMut;
pub use grid::Image;

/// Cursors and cursor kinds.
pub mod cursor;
pub use cursor::CursorError;
pub use cursor::CursorKind;
pub use cursor::GridCursor;
pub use cursor::Linear;
pub use cursor::RandomPermutation;
pub use cursor::RandomSample;
pub use cursor::ReverseCursor;
pub use cursor::Scanline;
pub use cursor::Sequential;
pub use cursor::Subsampled;

/// The masked traversal adapter.
pub mod masked;
pub use masked::MaskedCursor;

/// Traversal configuration.
pub mod config;
pub use config::TraversalConfig;

/// Property-based generators for randomized test input.
#[cfg(test)]
pub mod strategy;
