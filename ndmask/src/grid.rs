/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Grids: indexable N-dimensional collections of values.
//!
//! Cursors never own the storage they walk. They bind to a *handle*
//! implementing [`Grid`], which is usually a borrow: `&G` for
//! read-only traversal and `&mut G` when the cursor must write
//! values back. [`Image`] is a dense row-major grid for callers that
//! do not bring their own storage.

use std::iter::zip;

use crate::Point;
use crate::Region;
use crate::RegionError;

/// The type of error for grid construction.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GridError {
    #[error("data length {got} does not match extent {sizes:?} ({expected} values)")]
    LengthMismatch {
        sizes: Vec<usize>,
        expected: usize,
        got: usize,
    },

    #[error(transparent)]
    RegionError(#[from] RegionError),
}

/// Read access to an N-dimensional grid.
pub trait Grid {
    type Value;

    /// The extent of the grid along each axis.
    fn sizes(&self) -> &[usize];

    /// The value at `point`, or `None` outside the grid.
    fn get(&self, point: &[usize]) -> Option<&Self::Value>;

    /// The region covering the whole grid.
    fn region(&self) -> Result<Region, RegionError> {
        Region::from_sizes(self.sizes())
    }
}

/// Write access to an N-dimensional grid.
pub trait GridMut: Grid {
    fn get_mut(&mut self, point: &[usize]) -> Option<&mut Self::Value>;
}

impl<G: Grid + ?Sized> Grid for &G {
    type Value = G::Value;

    fn sizes(&self) -> &[usize] {
        (**self).sizes()
    }

    fn get(&self, point: &[usize]) -> Option<&Self::Value> {
        (**self).get(point)
    }
}

impl<G: Grid + ?Sized> Grid for &mut G {
    type Value = G::Value;

    fn sizes(&self) -> &[usize] {
        (**self).sizes()
    }

    fn get(&self, point: &[usize]) -> Option<&Self::Value> {
        (**self).get(point)
    }
}

impl<G: GridMut + ?Sized> GridMut for &mut G {
    fn get_mut(&mut self, point: &[usize]) -> Option<&mut Self::Value> {
        (**self).get_mut(point)
    }
}

/// Dense N-dimensional grid in row-major layout.
#[derive(Clone, PartialEq, Debug)]
pub struct Image<T> {
    sizes: Vec<usize>,
    strides: Vec<usize>,
    data: Vec<T>,
}

fn row_major_strides(sizes: &[usize]) -> Vec<usize> {
    let mut strides = sizes.to_vec();
    let _ = strides.iter_mut().rev().fold(1, |acc, n| {
        let next = *n * acc;
        *n = acc;
        next
    });
    strides
}

impl<T> Image<T> {
    /// Wrap `data`, laid out in row-major order, as a grid of the
    /// given sizes.
    pub fn from_vec(sizes: impl Into<Vec<usize>>, data: Vec<T>) -> Result<Self, GridError> {
        let sizes = sizes.into();
        let expected = sizes.iter().product();
        if data.len() != expected {
            return Err(GridError::LengthMismatch {
                sizes,
                expected,
                got: data.len(),
            });
        }
        let strides = row_major_strides(&sizes);
        Ok(Self {
            sizes,
            strides,
            data,
        })
    }

    /// Build a grid by evaluating `f` at every point, in row-major
    /// order.
    pub fn from_fn(
        sizes: impl Into<Vec<usize>>,
        mut f: impl FnMut(&Point) -> T,
    ) -> Result<Self, GridError> {
        let sizes = sizes.into();
        let region = Region::from_sizes(sizes.clone())?;
        let data = region.iter().map(|p| f(&p)).collect();
        Self::from_vec(sizes, data)
    }

    /// The flat offset of `point` in the backing storage.
    pub fn offset(&self, point: &[usize]) -> Option<usize> {
        if point.len() != self.sizes.len() || zip(point, &self.sizes).any(|(p, n)| p >= n) {
            return None;
        }
        Some(zip(point, &self.strides).map(|(p, s)| p * s).sum())
    }

    /// Store `value` at `point`. Returns false, storing nothing, when
    /// the point is outside the grid.
    pub fn set(&mut self, point: &[usize], value: T) -> bool {
        match self.offset(point) {
            Some(i) => {
                self.data[i] = value;
                true
            }
            None => false,
        }
    }

    /// The backing storage in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T: Clone> Image<T> {
    /// A grid of the given sizes with every value set to `value`.
    pub fn new(sizes: impl Into<Vec<usize>>, value: T) -> Self {
        let sizes = sizes.into();
        let data = vec![value; sizes.iter().product()];
        let strides = row_major_strides(&sizes);
        Self {
            sizes,
            strides,
            data,
        }
    }

    /// Set every value to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> Grid for Image<T> {
    type Value = T;

    fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    fn get(&self, point: &[usize]) -> Option<&T> {
        self.offset(point).map(|i| &self.data[i])
    }
}

impl<T> GridMut for Image<T> {
    fn get_mut(&mut self, point: &[usize]) -> Option<&mut T> {
        self.offset(point).map(|i| &mut self.data[i])
    }
}
