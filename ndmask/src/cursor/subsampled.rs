/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use itertools::izip;

use super::CursorError;
use super::CursorKind;
use super::GridCursor;
use super::ReverseCursor;
use super::check_bounds;
use crate::Point;
use crate::Region;
use crate::grid::Grid;
use crate::grid::GridMut;

/// Row-major traversal of every `STEP`-th coordinate on each axis,
/// counted from the region start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Subsampled<const STEP: usize>;

impl<const STEP: usize> CursorKind for Subsampled<STEP> {
    const NAME: &'static str = "subsampled";
    type Cursor<G: Grid> = SubsampledCursor<G, STEP>;
}

/// Walks the lattice `start + STEP * k` of a region.
///
/// The cursor keeps an odometer over the lattice (whose extent on
/// each axis is `⌈size / STEP⌉`) and maps it to grid coordinates.
#[derive(Clone, Debug)]
pub struct SubsampledCursor<G, const STEP: usize> {
    grid: G,
    region: Region,
    lattice: Region,
    ordinal: usize,
    sub: Point,
    point: Point,
}

impl<G: Grid, const STEP: usize> SubsampledCursor<G, STEP> {
    const NONZERO_STEP: () = assert!(STEP > 0, "subsampling step must be positive");

    /// The subsampling step.
    pub fn step(&self) -> usize {
        STEP
    }

    fn sync_point(&mut self) {
        for (p, s, k) in izip!(
            self.point.coords_mut().iter_mut(),
            self.region.start().iter(),
            self.sub.iter()
        ) {
            *p = s + k * STEP;
        }
    }
}

impl<G: Grid, const STEP: usize> GridCursor for SubsampledCursor<G, STEP> {
    type Grid = G;

    fn bind(grid: G, region: &Region) -> Result<Self, CursorError> {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_STEP;
        check_bounds(&grid, region)?;
        let lattice = Region::from_sizes(
            region
                .sizes()
                .iter()
                .map(|n| n.div_ceil(STEP))
                .collect::<Vec<_>>(),
        )?;
        let ordinal = lattice.len();
        Ok(Self {
            grid,
            region: region.clone(),
            sub: lattice.start().clone(),
            lattice,
            ordinal,
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
        self.sub = self.lattice.start().clone();
        self.point = self.region.start().clone();
    }

    fn go_to_end(&mut self) {
        self.ordinal = self.lattice.len();
    }

    fn advance(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.ordinal += 1;
        self.lattice.step_forward(&mut self.sub);
        self.sync_point();
    }

    fn is_at_end(&self) -> bool {
        self.ordinal >= self.lattice.len()
    }

    fn position(&self) -> Option<&Point> {
        (!self.is_at_end()).then_some(&self.point)
    }

    fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn len(&self) -> usize {
        self.lattice.len()
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

impl<G: Grid, const STEP: usize> ReverseCursor for SubsampledCursor<G, STEP> {
    fn retreat(&mut self) {
        if self.ordinal == 0 {
            return;
        }
        if self.is_at_end() {
            self.ordinal = self.lattice.len() - 1;
            if let Some(last) = self.lattice.last() {
                self.sub = last;
            }
        } else {
            self.ordinal -= 1;
            self.lattice.step_backward(&mut self.sub);
        }
        self.sync_point();
    }
}
