/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Randomised traversals.
//!
//! Random cursors draw their whole visiting order when bound, from a
//! generator seeded by [`crate::config::global`]. The order is kept,
//! so a random traversal can be replayed backwards, and two cursors
//! bound to regions of the same size draw the same sequence.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use super::CursorError;
use super::CursorKind;
use super::GridCursor;
use super::ReverseCursor;
use super::check_bounds;
use crate::Point;
use crate::Region;
use crate::config;
use crate::config::TraversalConfig;
use crate::grid::Grid;
use crate::grid::GridMut;

/// How a random kind orders the row-major indices of a region.
pub trait Sampling: fmt::Debug {
    const NAME: &'static str;

    /// The visiting order: row-major indices into a region of `len`
    /// positions.
    fn draw(len: usize, config: &TraversalConfig) -> Vec<usize>;
}

/// Uniform draws with replacement. Unless configured otherwise, as
/// many positions are drawn as the region holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RandomSample;

impl Sampling for RandomSample {
    const NAME: &'static str = "random-sample";

    fn draw(len: usize, config: &TraversalConfig) -> Vec<usize> {
        if len == 0 {
            return Vec::new();
        }
        let mut rng = SmallRng::seed_from_u64(config.random_seed);
        let samples = config.random_samples.unwrap_or(len);
        (0..samples).map(|_| rng.gen_range(0..len)).collect()
    }
}

impl CursorKind for RandomSample {
    const NAME: &'static str = <Self as Sampling>::NAME;
    type Cursor<G: Grid> = SampledCursor<G, Self>;
}

/// Every position of the region exactly once, in shuffled order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RandomPermutation;

impl Sampling for RandomPermutation {
    const NAME: &'static str = "random-permutation";

    fn draw(len: usize, config: &TraversalConfig) -> Vec<usize> {
        let mut rng = SmallRng::seed_from_u64(config.random_seed);
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut rng);
        order
    }
}

impl CursorKind for RandomPermutation {
    const NAME: &'static str = <Self as Sampling>::NAME;
    type Cursor<G: Grid> = SampledCursor<G, Self>;
}

/// Walks a region in a recorded order.
#[derive(Clone, Debug)]
pub struct SampledCursor<G, S> {
    grid: G,
    region: Region,
    order: Arc<[usize]>,
    ordinal: usize,
    point: Point,
    sampling: PhantomData<S>,
}

impl<G: Grid, S: Sampling> SampledCursor<G, S> {
    /// Bind with an explicit configuration rather than the global one.
    pub fn bind_with(
        grid: G,
        region: &Region,
        config: &TraversalConfig,
    ) -> Result<Self, CursorError> {
        check_bounds(&grid, region)?;
        let order: Arc<[usize]> = S::draw(region.len(), config).into();
        tracing::trace!(
            kind = S::NAME,
            %region,
            seed = config.random_seed,
            steps = order.len(),
            "drew traversal order"
        );
        Ok(Self {
            grid,
            region: region.clone(),
            ordinal: order.len(),
            order,
            point: region.start().clone(),
            sampling: PhantomData,
        })
    }

    /// The row-major region indices this cursor visits, in order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    fn seek(&mut self) {
        if let Some(&index) = self.order.get(self.ordinal) {
            self.region.decode_into(index, &mut self.point);
        }
    }
}

impl<G: Grid, S: Sampling> GridCursor for SampledCursor<G, S> {
    type Grid = G;

    fn bind(grid: G, region: &Region) -> Result<Self, CursorError> {
        Self::bind_with(grid, region, config::global())
    }

    fn region(&self) -> &Region {
        &self.region
    }

    fn grid(&self) -> &G {
        &self.grid
    }

    fn go_to_begin(&mut self) {
        self.ordinal = 0;
        self.seek();
    }

    fn go_to_end(&mut self) {
        self.ordinal = self.order.len();
    }

    fn advance(&mut self) {
        if self.is_at_end() {
            return;
        }
        self.ordinal += 1;
        self.seek();
    }

    fn is_at_end(&self) -> bool {
        self.ordinal >= self.order.len()
    }

    fn position(&self) -> Option<&Point> {
        (!self.is_at_end()).then_some(&self.point)
    }

    fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn len(&self) -> usize {
        self.order.len()
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

impl<G: Grid, S: Sampling> ReverseCursor for SampledCursor<G, S> {
    fn retreat(&mut self) {
        if self.ordinal == 0 {
            return;
        }
        self.ordinal -= 1;
        self.seek();
    }
}
