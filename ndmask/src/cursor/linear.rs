/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use super::CursorError;
use super::CursorKind;
use super::GridCursor;
use super::ReverseCursor;
use super::check_bounds;
use crate::Point;
use crate::Region;
use crate::grid::Grid;
use crate::grid::GridMut;

/// Row-major traversal, forward and reverse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Linear;

impl CursorKind for Linear {
    const NAME: &'static str = "linear";
    type Cursor<G: Grid> = LinearCursor<G>;
}

/// Row-major traversal, forward only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sequential;

impl CursorKind for Sequential {
    const NAME: &'static str = "sequential";
    type Cursor<G: Grid> = SequentialCursor<G>;
}

/// Walks a region in row-major order by stepping an odometer over
/// the region's coordinates.
#[derive(Clone, Debug)]
pub struct LinearCursor<G> {
    grid: G,
    region: Region,
    len: usize,
    ordinal: usize,
    point: Point,
}

impl<G: Grid> GridCursor for LinearCursor<G> {
    type Grid = G;

    fn bind(grid: G, region: &Region) -> Result<Self, CursorError> {
        check_bounds(&grid, region)?;
        let len = region.len();
        Ok(Self {
            grid,
            region: region.clone(),
            len,
            ordinal: len,
            point: region.start().clone(),
        })
    }

    fn region(&self) -> &Region {
        &self.region
    }

    fn grid(&self) -> &G {
        &self.grid
    }

    fn go_to_begin(&mut self) {
        self.ordinal = 0;
        self.point = self.region.start().clone();
    }

    fn go_to_end(&mut self) {
        self.ordinal = self.len;
    }

    fn advance(&mut self) {
        if self.ordinal >= self.len {
            return;
        }
        self.ordinal += 1;
        self.region.step_forward(&mut self.point);
    }

    fn is_at_end(&self) -> bool {
        self.ordinal >= self.len
    }

    fn position(&self) -> Option<&Point> {
        (!self.is_at_end()).then_some(&self.point)
    }

    fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn len(&self) -> usize {
        self.len
    }

    fn value_mut(&mut self) -> Option<&mut G::Value>
    where
        G: GridMut,
    {
        if self.is_at_end() {
            return None;
        }
        self.grid.get_mut(&self.point)
    }
}

impl<G: Grid> ReverseCursor for LinearCursor<G> {
    fn retreat(&mut self) {
        if self.ordinal == 0 {
            return;
        }
        if self.ordinal >= self.len {
            self.ordinal = self.len - 1;
            if let Some(last) = self.region.last() {
                self.point = last;
            }
            return;
        }
        self.ordinal -= 1;
        self.region.step_backward(&mut self.point);
    }
}

/// A [`LinearCursor`] without reverse movement.
#[derive(Clone, Debug)]
pub struct SequentialCursor<G>(LinearCursor<G>);

impl<G: Grid> GridCursor for SequentialCursor<G> {
    type Grid = G;

    fn bind(grid: G, region: &Region) -> Result<Self, CursorError> {
        LinearCursor::bind(grid, region).map(Self)
    }

    fn region(&self) -> &Region {
        self.0.region()
    }

    fn grid(&self) -> &G {
        self.0.grid()
    }

    fn go_to_begin(&mut self) {
        self.0.go_to_begin();
    }

    fn go_to_end(&mut self) {
        self.0.go_to_end();
    }

    fn advance(&mut self) {
        self.0.advance();
    }

    fn is_at_end(&self) -> bool {
        self.0.is_at_end()
    }

    fn position(&self) -> Option<&Point> {
        self.0.position()
    }

    fn ordinal(&self) -> usize {
        self.0.ordinal()
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn value_mut(&mut self) -> Option<&mut G::Value>
    where
        G: GridMut,
    {
        self.0.value_mut()
    }
}
