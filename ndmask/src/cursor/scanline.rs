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

/// Line-by-line traversal along the last axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scanline;

impl CursorKind for Scanline {
    const NAME: &'static str = "scanline";
    type Cursor<G: Grid> = ScanlineCursor<G>;
}

/// Walks a region one line at a time, where a line is a run of
/// positions along the last axis. Stepping off the end of a line
/// moves to the start of the next, so the overall order is
/// row-major; the line structure is exposed through
/// [`ScanlineCursor::next_line`] and friends.
#[derive(Clone, Debug)]
pub struct ScanlineCursor<G> {
    grid: G,
    region: Region,
    line_len: usize,
    lines: usize,
    line: usize,
    column: usize,
    point: Point,
}

impl<G: Grid> ScanlineCursor<G> {
    /// The number of positions in each line.
    pub fn line_len(&self) -> usize {
        self.line_len
    }

    /// The index of the current line; equals the number of lines at
    /// end.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Whether the cursor is on the last position of its line.
    pub fn is_at_end_of_line(&self) -> bool {
        !self.is_at_end() && self.column + 1 == self.line_len
    }

    /// Move to the start of the next line, or to the end after the
    /// last line.
    pub fn next_line(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.line += 1;
        self.column = 0;
        if self.line < self.lines {
            self.region
                .decode_into(self.line * self.line_len, &mut self.point);
        }
    }

    /// Move to the start of the current line.
    pub fn go_to_begin_of_line(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.column = 0;
        self.seek_column();
    }

    fn seek_column(&mut self) {
        let axis = self.region.num_dim() - 1;
        self.point.coords_mut()[axis] = self.region.start()[axis] + self.column;
    }
}

impl<G: Grid> GridCursor for ScanlineCursor<G> {
    type Grid = G;

    fn bind(grid: G, region: &Region) -> Result<Self, CursorError> {
        check_bounds(&grid, region)?;
        let line_len = region.sizes().last().copied().unwrap_or(0);
        let lines = if line_len == 0 {
            0
        } else {
            region.len() / line_len
        };
        Ok(Self {
            grid,
            region: region.clone(),
            line_len,
            lines,
            line: lines,
            column: 0,
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
        self.line = 0;
        self.column = 0;
        self.point = self.region.start().clone();
    }

    fn go_to_end(&mut self) {
        self.line = self.lines;
        self.column = 0;
    }

    fn advance(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.column += 1;
        if self.column == self.line_len {
            self.next_line();
        } else {
            self.seek_column();
        }
    }

    fn is_at_end(&self) -> bool {
        self.line >= self.lines
    }

    fn position(&self) -> Option<&Point> {
        (!self.is_at_end()).then_some(&self.point)
    }

    fn ordinal(&self) -> usize {
        self.line * self.line_len + self.column
    }

    fn len(&self) -> usize {
        self.lines * self.line_len
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

impl<G: Grid> ReverseCursor for ScanlineCursor<G> {
    fn retreat(&mut self) {
        if self.ordinal() == 0 {
            return;
        }
        if self.column > 0 && !self.is_at_end() {
            self.column -= 1;
            self.seek_column();
            return;
        }
        self.line -= 1;
        self.column = self.line_len - 1;
        self.region
            .decode_into(self.line * self.line_len + self.column, &mut self.point);
    }
}
